use super::{
    cell::{Cell, Motif},
    grid::{Coord, Grid},
};
use crate::error::{Error, Result};

/// The two cells feeding the gate at `gate`, read off the wiring directly behind it. Feeders
/// are either gate slots or inputs, two rows back.
pub fn feeders(grid: &Grid, gate: Coord) -> Result<[Coord; 2]> {
    let (row, column) = gate;
    if row < 2 {
        return Err(Error::NotAGate {
            coord: gate,
            found: grid.get(gate).map_or(' ', |c| c.glyph()),
        });
    }

    let wire_row = row - 1;
    let feeder_row = row - 2;
    let unresolved = |coord: Coord| Error::UnresolvedMotif {
        coord: gate,
        found: grid.get(coord).map_or(' ', |c| c.glyph()),
    };

    let motif = match grid.get((wire_row, column)) {
        Some(Cell::Wire(motif)) => motif,
        _ => return Err(unresolved((wire_row, column))),
    };

    match motif {
        Motif::DualUp | Motif::DualBendUp => {
            let left = column
                .checked_sub(1)
                .ok_or_else(|| unresolved((wire_row, column)))?;
            Ok([(feeder_row, column), (feeder_row, left)])
        }
        Motif::DualDown | Motif::DualBendDown => {
            if column + 1 >= grid.width() {
                return Err(unresolved((wire_row, column)));
            }
            Ok([(feeder_row, column), (feeder_row, column + 1)])
        }
        Motif::Merge => {
            let left = walk_runs(grid, wire_row, column, false)
                .ok_or_else(|| unresolved((wire_row, column)))?;
            let right = walk_runs(grid, wire_row, column, true)
                .ok_or_else(|| unresolved((wire_row, column)))?;
            Ok([(feeder_row, left), (feeder_row, right)])
        }
        Motif::Fork | Motif::Run | Motif::CurveUp | Motif::CurveDown => {
            Err(unresolved((wire_row, column)))
        }
    }
}

/// Follows straight runs away from a merge and returns the column where the wire bends back to
/// its gate. Leftwards that is a curve-up or a fork, rightwards a curve-down or a fork.
fn walk_runs(grid: &Grid, wire_row: usize, merge: usize, rightwards: bool) -> Option<usize> {
    let mut column = merge;
    loop {
        column = if rightwards {
            Some(column + 1).filter(|&c| c < grid.width())?
        } else {
            column.checked_sub(1)?
        };

        match grid[(wire_row, column)] {
            Cell::Wire(Motif::Run) => continue,
            Cell::Wire(Motif::Fork) => return Some(column),
            Cell::Wire(Motif::CurveUp) if !rightwards => return Some(column),
            Cell::Wire(Motif::CurveDown) if rightwards => return Some(column),
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::topology::build_topology;

    #[test]
    fn test_dual_motifs() {
        let grid = build_topology(4).unwrap();
        assert_eq!(feeders(&grid, (2, 1)).unwrap(), [(0, 1), (0, 0)]);
        assert_eq!(feeders(&grid, (2, 2)).unwrap(), [(0, 2), (0, 3)]);
        assert_eq!(feeders(&grid, (4, 2)).unwrap(), [(2, 2), (2, 1)]);
    }

    #[test]
    fn test_merge_through_fork() {
        let grid = build_topology(5).unwrap();
        assert_eq!(feeders(&grid, (6, 2)).unwrap(), [(4, 1), (4, 3)]);
        assert_eq!(feeders(&grid, (4, 1)).unwrap(), [(2, 1), (2, 2)]);
        assert_eq!(feeders(&grid, (4, 3)).unwrap(), [(2, 2), (2, 4)]);
    }

    #[test]
    fn test_merge_over_runs() {
        let grid = build_topology(7).unwrap();
        assert_eq!(feeders(&grid, (6, 3)).unwrap(), [(4, 1), (4, 5)]);
    }

    #[test]
    fn test_unresolvable_wiring() {
        let grid = build_topology(3).unwrap();
        // Behind an input-row cell
        assert!(matches!(feeders(&grid, (0, 1)), Err(Error::NotAGate { .. })));
        // Fork behind an empty gate slot
        assert!(matches!(
            feeders(&grid, (2, 1)),
            Err(Error::UnresolvedMotif { coord: (2, 1), found: '┤' })
        ));
    }

    #[test]
    fn test_every_gate_resolves() {
        for inputs in 2..=crate::batch::consts::MAX_INPUTS {
            let grid = build_topology(inputs).unwrap();
            for gate in grid.gate_coords() {
                let pair = feeders(&grid, gate).unwrap();
                for feeder in pair {
                    let cell = grid[feeder];
                    if feeder.0 == 0 {
                        assert!(matches!(cell, Cell::Input(_)), "inputs = {}", inputs);
                    } else {
                        assert!(cell.is_gate_slot(), "inputs = {}, gate = {:?}", inputs, gate);
                    }
                }
            }
        }
    }
}
