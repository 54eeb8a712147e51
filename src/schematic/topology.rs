use log::{debug, trace};

use super::{
    cell::{Cell, Motif},
    grid::{Coord, Grid},
};
use crate::{
    batch::consts::MAX_INPUTS,
    error::{Error, Result},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bridge {
    /// Join a gate with the next gate to its right.
    Pair,
    /// Feed a gate into both of its neighbours.
    Fork,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
}

impl Direction {
    /// Curve drawn behind the far gate of a gap.
    const fn far_curve(&self) -> Motif {
        match self {
            Self::Right => Motif::CurveDown,
            Self::Left => Motif::CurveUp,
        }
    }
}

/// Number of bits needed to write `value`.
fn bit_length(value: usize) -> usize {
    (usize::BITS - value.leading_zeros()) as usize
}

/// Rows needed for `inputs` inputs: the input row plus a wiring and a gate row per halving.
pub fn grid_height(inputs: usize) -> usize {
    2 * bit_length(inputs.saturating_sub(1)) + 1
}

/// Lays out the reduction tree for `inputs` inputs. The result holds placeholders in every gate
/// slot and is the same for every call with the same input count.
pub fn build_topology(inputs: usize) -> Result<Grid> {
    TopologyBuilder::new(inputs)?.build()
}

struct TopologyBuilder {
    grid: Grid,
    /// Center-most input column, used for every centering tie-break.
    center: usize,
}

impl TopologyBuilder {
    fn new(inputs: usize) -> Result<Self> {
        if !(2..=MAX_INPUTS).contains(&inputs) {
            return Err(Error::InvalidInputCount(inputs));
        }

        let mut grid = Grid::new(inputs, grid_height(inputs));
        for column in 0..inputs {
            grid[(0, column)] = Cell::Input(inputs - 1 - column);
        }

        Ok(Self {
            grid,
            center: (inputs - 1) / 2,
        })
    }

    fn build(mut self) -> Result<Grid> {
        let overflow = Error::GridOverflow {
            inputs: self.grid.width(),
            height: self.grid.height(),
        };

        self.wire_inputs()?;

        let mut row = 2;
        loop {
            if row >= self.grid.height() {
                return Err(overflow);
            }

            self.place_gates(row);
            let gates = self.grid.gates_in_row(row);
            debug!("row {}: {} gates", row, gates);

            if gates == 1 {
                break;
            }
            if gates == 0 || row + 2 >= self.grid.height() {
                return Err(overflow);
            }

            self.wire_gates(row)?;
            row += 2;
        }

        Ok(self.grid)
    }

    fn set_wire(&mut self, coord: Coord, motif: Motif) {
        trace!("{:?} at {:?}", motif, coord);
        self.grid[coord] = Cell::Wire(motif);
    }

    fn wire_inputs(&mut self) -> Result<()> {
        let inputs = self.grid.width();

        if inputs % 2 != 0 {
            // Odd counts fork one input into both of its neighbours
            let fork = if ((inputs - 1) / 2) % 2 != 0 {
                self.center
            } else {
                self.center + 1
            };
            self.set_wire((1, fork), Motif::Fork);
            self.set_wire((1, fork + 1), Motif::DualUp);
            self.set_wire((1, fork - 1), Motif::DualDown);
        }

        for column in 0..inputs {
            if self.grid[(1, column)] != Cell::Blank {
                continue;
            }
            if column + 1 >= inputs {
                return Err(Error::UnpairedGate { coord: (0, column) });
            }

            if column > self.center {
                self.set_wire((1, column), Motif::DualDown);
                self.set_wire((1, column + 1), Motif::CurveDown);
            } else {
                self.set_wire((1, column), Motif::CurveUp);
                self.set_wire((1, column + 1), Motif::DualUp);
            }
        }

        Ok(())
    }

    fn place_gates(&mut self, row: usize) {
        for column in 0..self.grid.width() {
            if let Cell::Wire(motif) = self.grid[(row - 1, column)] {
                if motif.is_connection_point() {
                    self.grid[(row, column)] = Cell::Placeholder;
                }
            }
        }
    }

    fn wire_gates(&mut self, gate_row: usize) -> Result<()> {
        let wire_row = gate_row + 1;
        let gates: Vec<usize> = (0..self.grid.width())
            .filter(|&column| self.grid[(gate_row, column)].is_gate_slot())
            .collect();

        if gates.len() % 2 != 0 {
            let half = (gates.len() - 1) / 2;
            // 1-based position of the gate to fork
            let mut target = half + 1;
            if half % 2 == 0 {
                target += 1;
            }
            let column = *gates
                .get(target - 1)
                .ok_or(Error::UnpairedGate { coord: (gate_row, gates[0]) })?;
            self.bridge(gate_row, column, Bridge::Fork)?;
        }

        for &column in &gates {
            if self.grid[(wire_row, column)] == Cell::Blank {
                self.bridge(gate_row, column, Bridge::Pair)?;
            }
        }

        Ok(())
    }

    fn bridge(&mut self, gate_row: usize, column: usize, action: Bridge) -> Result<()> {
        let wire_row = gate_row + 1;

        match action {
            Bridge::Pair => {
                self.set_wire((wire_row, column), Motif::CurveUp);
                self.connect(gate_row, column, Direction::Right, action)
            }
            Bridge::Fork => {
                self.set_wire((wire_row, column), Motif::Fork);
                self.connect(gate_row, column, Direction::Right, action)?;
                self.connect(gate_row, column, Direction::Left, action)
            }
        }
    }

    fn next_gate(&self, row: usize, from: usize, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Right => (from + 1..self.grid.width())
                .find(|&column| self.grid[(row, column)].is_gate_slot()),
            Direction::Left => (0..from)
                .rev()
                .find(|&column| self.grid[(row, column)].is_gate_slot()),
        }
    }

    /// Column of the merge between two gates: the midpoint, or the middle column closest to the
    /// center when the gap has two.
    fn merge_column(&self, a: usize, b: usize) -> usize {
        let (low, high) = (a.min(b), a.max(b));
        let distance = high - low;

        if distance % 2 == 0 {
            return low + distance / 2;
        }

        let (lower, upper) = (low + distance / 2, low + distance / 2 + 1);
        if self.center.abs_diff(upper) < self.center.abs_diff(lower) {
            upper
        } else {
            lower
        }
    }

    fn connect(
        &mut self,
        gate_row: usize,
        from: usize,
        direction: Direction,
        action: Bridge,
    ) -> Result<()> {
        let wire_row = gate_row + 1;
        let to = self
            .next_gate(gate_row, from, direction)
            .ok_or(Error::UnpairedGate { coord: (gate_row, from) })?;

        if from.abs_diff(to) == 1 {
            match (action, direction) {
                (Bridge::Pair, _) => {
                    if self.center.abs_diff(from) > self.center.abs_diff(to) {
                        self.set_wire((wire_row, from), Motif::DualBendDown);
                        self.set_wire((wire_row, to), Motif::CurveDown);
                    } else {
                        self.set_wire((wire_row, from), Motif::CurveUp);
                        self.set_wire((wire_row, to), Motif::DualBendUp);
                    }
                }
                (Bridge::Fork, Direction::Right) => {
                    self.set_wire((wire_row, to), Motif::DualBendUp)
                }
                (Bridge::Fork, Direction::Left) => {
                    self.set_wire((wire_row, to), Motif::DualBendDown)
                }
            }
            return Ok(());
        }

        let merge = self.merge_column(from, to);
        self.set_wire((wire_row, merge), Motif::Merge);
        self.set_wire((wire_row, to), direction.far_curve());

        for column in from.min(to)..from.max(to) {
            if self.grid[(wire_row, column)] == Cell::Blank {
                self.set_wire((wire_row, column), Motif::Run);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::cell::Motif::*;

    fn wires(grid: &Grid, row: usize) -> Vec<Option<Motif>> {
        grid.row(row)
            .iter()
            .map(|c| match c {
                Cell::Wire(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    fn gate_columns(grid: &Grid, row: usize) -> Vec<usize> {
        (0..grid.width())
            .filter(|&c| grid[(row, c)] == Cell::Placeholder)
            .collect()
    }

    #[test]
    fn test_grid_height() {
        assert_eq!(grid_height(2), 3);
        assert_eq!(grid_height(3), 5);
        assert_eq!(grid_height(4), 5);
        assert_eq!(grid_height(5), 7);
        assert_eq!(grid_height(8), 7);
        assert_eq!(grid_height(9), 9);
    }

    #[test]
    fn test_rejects_small_input_counts() {
        assert!(matches!(build_topology(0), Err(Error::InvalidInputCount(0))));
        assert!(matches!(build_topology(1), Err(Error::InvalidInputCount(1))));
    }

    #[test]
    fn test_rejects_large_input_counts() {
        assert!(build_topology(MAX_INPUTS).is_ok());
        assert!(matches!(build_topology(26), Err(Error::InvalidInputCount(26))));
        assert!(matches!(build_topology(130), Err(Error::InvalidInputCount(130))));
    }

    #[test]
    fn test_two_inputs() {
        let grid = build_topology(2).unwrap();
        assert_eq!(grid.row(0), &[Cell::Input(1), Cell::Input(0)]);
        assert_eq!(wires(&grid, 1), vec![Some(CurveUp), Some(DualUp)]);
        assert_eq!(gate_columns(&grid, 2), vec![1]);
        assert_eq!(grid.count_gates(), 1);
    }

    #[test]
    fn test_three_inputs() {
        let grid = build_topology(3).unwrap();
        assert_eq!(wires(&grid, 1), vec![Some(DualDown), Some(Fork), Some(DualUp)]);
        assert_eq!(gate_columns(&grid, 2), vec![0, 2]);
        assert_eq!(wires(&grid, 3), vec![Some(CurveUp), Some(Merge), Some(CurveDown)]);
        assert_eq!(gate_columns(&grid, 4), vec![1]);
        assert_eq!(grid.count_gates(), 3);
    }

    #[test]
    fn test_four_inputs() {
        let grid = build_topology(4).unwrap();
        assert_eq!(
            wires(&grid, 1),
            vec![Some(CurveUp), Some(DualUp), Some(DualDown), Some(CurveDown)]
        );
        assert_eq!(gate_columns(&grid, 2), vec![1, 2]);
        assert_eq!(wires(&grid, 3), vec![None, Some(CurveUp), Some(DualBendUp), None]);
        assert_eq!(gate_columns(&grid, 4), vec![2]);
        assert_eq!(grid.count_gates(), 3);
    }

    #[test]
    fn test_five_inputs() {
        let grid = build_topology(5).unwrap();
        assert_eq!(grid.height(), 7);
        assert_eq!(
            wires(&grid, 1),
            vec![Some(CurveUp), Some(DualUp), Some(DualDown), Some(Fork), Some(DualUp)]
        );
        assert_eq!(gate_columns(&grid, 2), vec![1, 2, 4]);
        assert_eq!(
            wires(&grid, 3),
            vec![None, Some(DualBendDown), Some(Fork), Some(Merge), Some(CurveDown)]
        );
        assert_eq!(gate_columns(&grid, 4), vec![1, 3]);
        assert_eq!(
            wires(&grid, 5),
            vec![None, Some(CurveUp), Some(Merge), Some(CurveDown), None]
        );
        assert_eq!(gate_columns(&grid, 6), vec![2]);
        assert_eq!(grid.count_gates(), 6);
    }

    #[test]
    fn test_seven_inputs_uses_runs() {
        let grid = build_topology(7).unwrap();
        assert_eq!(
            wires(&grid, 3),
            vec![None, Some(DualBendDown), Some(CurveDown), None, Some(CurveUp), Some(DualBendUp), None]
        );
        assert_eq!(
            wires(&grid, 5),
            vec![None, Some(CurveUp), Some(Run), Some(Merge), Some(Run), Some(CurveDown), None]
        );
        assert_eq!(grid.count_gates(), 7);
    }

    #[test]
    fn test_single_gate_in_final_row() {
        for inputs in 2..=MAX_INPUTS {
            let grid = build_topology(inputs).unwrap();
            let last = grid.height() - 1;
            assert_eq!(grid.gates_in_row(last), 1, "inputs = {}", inputs);
            for row in (2..last).step_by(2) {
                assert!(grid.gates_in_row(row) > 1, "inputs = {}", inputs);
            }
        }
    }

    #[test]
    fn test_no_blank_wiring_behind_gates() {
        for inputs in 2..=MAX_INPUTS {
            let grid = build_topology(inputs).unwrap();
            for (row, column) in grid.gate_coords() {
                assert!(matches!(grid[(row - 1, column)], Cell::Wire(_)));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for inputs in 2..=20 {
            assert_eq!(build_topology(inputs).unwrap(), build_topology(inputs).unwrap());
        }
    }
}
