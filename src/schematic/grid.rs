use std::{
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

use super::cell::{Cell, GateType};
use crate::error::{Error, Result};

/// `(row, column)` position in a [`Grid`].
pub type Coord = (usize, usize);

/// Schematic cells stored row-major. Row 0 holds the inputs, odd rows hold wiring and even rows
/// hold gates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Blank; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, (row, column): Coord) -> Option<Cell> {
        if row < self.height && column < self.width {
            Some(self.cells[row * self.width + column])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Number of gate slots in `row`.
    pub fn gates_in_row(&self, row: usize) -> usize {
        self.row(row).iter().filter(|c| c.is_gate_slot()).count()
    }

    /// Gate slots in row-major order. This is the canonical order of a gate assignment.
    pub fn gate_coords(&self) -> Vec<Coord> {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |column| (row, column)))
            .filter(|&coord| self[coord].is_gate_slot())
            .collect()
    }

    pub fn count_gates(&self) -> usize {
        self.cells.iter().filter(|c| c.is_gate_slot()).count()
    }

    /// The output gate, which is the last gate slot in scan order.
    pub fn final_gate(&self) -> Option<Coord> {
        self.gate_coords().last().copied()
    }

    /// Like [`Grid::final_gate`], failing on a grid without gate slots.
    pub fn output_gate(&self) -> Result<Coord> {
        self.final_gate()
            .ok_or(Error::MissingOutputGate { width: self.width })
    }

    /// Copy of this grid with `gates[i]` placed at `coords[i]`.
    pub fn with_gates(&self, coords: &[Coord], gates: &[GateType]) -> Self {
        let mut grid = self.clone();
        coords
            .iter()
            .zip(gates)
            .for_each(|(&coord, &gate)| grid[coord] = Cell::Gate(gate));
        grid
    }

    /// Gate types in scan order; placeholders are skipped.
    pub fn gate_order(&self) -> Vec<GateType> {
        self.cells
            .iter()
            .filter_map(|c| match c {
                Cell::Gate(g) => Some(*g),
                _ => None,
            })
            .collect()
    }

    /// Glyph lines of the grid turned a quarter counter-clockwise, so inputs run down the left
    /// edge and the output sits on the right. Every glyph is repeated `scale` times in both
    /// directions.
    pub fn rotated_lines(&self, scale: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.width * scale);
        for column in (0..self.width).rev() {
            let line: String = (0..self.height)
                .flat_map(|row| std::iter::repeat(self[(row, column)].glyph()).take(scale))
                .collect();
            lines.extend(std::iter::repeat(line).take(scale));
        }
        lines
    }
}

impl Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, (row, column): Coord) -> &Self::Output {
        &self.cells[row * self.width + column]
    }
}

impl IndexMut<Coord> for Grid {
    fn index_mut(&mut self, (row, column): Coord) -> &mut Self::Output {
        &mut self.cells[row * self.width + column]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            let line: String = self.row(row).iter().map(Cell::glyph).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
