use std::fmt;

use serde::{Deserialize, Serialize};

use super::{gray::gray_code, tree::OutputTrees};
use crate::{
    error::Result,
    schematic::{input_label, Grid},
};

/// Splits inputs across the two axes. The left (row) axis takes the larger half.
pub fn split_inputs(inputs: usize) -> (usize, usize) {
    let top = inputs / 2;
    (inputs - top, top)
}

/// Truth table of one schematic. Rows are labelled with the first inputs, columns with the
/// rest, both in Gray-code order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarnaughMap {
    left_index: Vec<String>,
    top_index: Vec<String>,
    cells: Vec<Vec<bool>>,
}

impl KarnaughMap {
    /// Empty map for `inputs` inputs, with every output false.
    pub fn new(inputs: usize) -> Self {
        let (left, top) = split_inputs(inputs);
        let left_index = gray_code(left);
        let top_index = gray_code(top);
        let cells = vec![vec![false; top_index.len()]; left_index.len()];

        Self {
            left_index,
            top_index,
            cells,
        }
    }

    pub fn left_bits(&self) -> usize {
        self.left_index[0].len()
    }

    pub fn top_bits(&self) -> usize {
        self.top_index[0].len()
    }

    pub fn rows(&self) -> usize {
        self.left_index.len()
    }

    pub fn columns(&self) -> usize {
        self.top_index.len()
    }

    pub fn left_index(&self) -> &[String] {
        &self.left_index
    }

    pub fn top_index(&self) -> &[String] {
        &self.top_index
    }

    pub fn get(&self, row: usize, column: usize) -> bool {
        self.cells[row][column]
    }

    pub fn cells(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Input labels along the rows.
    pub fn left_inputs(&self) -> Vec<char> {
        (0..self.left_bits()).map(input_label).collect()
    }

    /// Input labels along the columns.
    pub fn top_inputs(&self) -> Vec<char> {
        (self.left_bits()..self.left_bits() + self.top_bits())
            .map(input_label)
            .collect()
    }

    /// Value of every input at a cell; entry `i` belongs to input `i`.
    pub fn input_bits(&self, row: usize, column: usize) -> Vec<bool> {
        self.left_index[row]
            .chars()
            .chain(self.top_index[column].chars())
            .map(|c| c == '1')
            .collect()
    }

    /// Copy of this map holding the outputs of `grid`.
    pub fn populate(&self, grid: &Grid, trees: &OutputTrees) -> Result<Self> {
        let mut map = self.clone();
        for row in 0..self.rows() {
            for column in 0..self.columns() {
                map.cells[row][column] = trees.get(row, column).evaluate(grid)?;
            }
        }
        Ok(map)
    }
}

fn pad(f: &mut fmt::Formatter<'_>, value: &str, width: usize) -> fmt::Result {
    write!(f, "{}{}", value, " ".repeat(width - value.len() + 1))
}

fn join_labels(labels: &[char]) -> String {
    labels
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for KarnaughMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Left side inputs: {}", join_labels(&self.left_inputs()))?;
        writeln!(f, "Top side inputs: {}", join_labels(&self.top_inputs()))?;
        writeln!(f)?;

        // Row labels are the widest values
        let width = self.left_bits();

        pad(f, "#", width)?;
        for label in &self.top_index {
            pad(f, label, width)?;
        }
        writeln!(f)?;

        for (label, row) in self.left_index.iter().zip(&self.cells) {
            pad(f, label, width)?;
            for &value in row {
                pad(f, if value { "1" } else { "0" }, width)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
