use std::collections::{HashMap, HashSet, VecDeque};

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use super::map::KarnaughMap;
use crate::{
    error::{Error, Result},
    schematic::{feeders, Cell, Coord, GateType, Grid},
};

/// Child of a gate in an [`OutputTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    Gate(Coord),
    Input(bool),
}

/// Everything feeding the output gate for one fixed input assignment. Entries are in
/// breadth-first order from the root, so every gate comes after the gates it feeds. The tree
/// only encodes structure; the gate types come from the grid it is evaluated against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTree {
    root: Coord,
    entries: Vec<(Coord, [Node; 2])>,
}

fn gate_type(grid: &Grid, coord: Coord) -> Result<GateType> {
    match grid.get(coord) {
        Some(Cell::Gate(gate)) => Ok(gate),
        other => Err(Error::NotAGate {
            coord,
            found: other.map_or(' ', |c| c.glyph()),
        }),
    }
}

fn resolve(values: &HashMap<Coord, bool>, node: &Node) -> Option<bool> {
    match node {
        Node::Input(value) => Some(*value),
        Node::Gate(coord) => values.get(coord).copied(),
    }
}

impl OutputTree {
    /// Walks back from `root` until every branch ends in an input. `bits[i]` is the value of
    /// input `i`; inputs sit reversed along the input row.
    pub fn build(grid: &Grid, root: Coord, bits: &[bool]) -> Result<Self> {
        let width = grid.width();
        if bits.len() != width {
            return Err(Error::InputWidth {
                expected: width,
                got: bits.len(),
            });
        }

        let mut entries = vec![];
        let mut queue = VecDeque::from([root]);
        let mut queued = HashSet::from([root]);

        while let Some(gate) = queue.pop_front() {
            match grid.get(gate) {
                Some(cell) if cell.is_gate_slot() => {}
                other => {
                    return Err(Error::NotAGate {
                        coord: gate,
                        found: other.map_or(' ', |c| c.glyph()),
                    })
                }
            }

            let children = feeders(grid, gate)?.map(|(row, column)| {
                if row == 0 {
                    Node::Input(bits[width - 1 - column])
                } else {
                    if queued.insert((row, column)) {
                        queue.push_back((row, column));
                    }
                    Node::Gate((row, column))
                }
            });
            entries.push((gate, children));
        }

        Ok(Self { root, entries })
    }

    pub fn root(&self) -> Coord {
        self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn children(&self, gate: Coord) -> Option<[Node; 2]> {
        self.entries
            .iter()
            .find(|(coord, _)| *coord == gate)
            .map(|(_, children)| *children)
    }

    /// Output of the root gate when every gate takes its type from `grid`. Gates are evaluated
    /// from the inputs upward, as soon as both children are known.
    pub fn evaluate(&self, grid: &Grid) -> Result<bool> {
        let mut values: HashMap<Coord, bool> = HashMap::with_capacity(self.entries.len());
        let mut pending: Vec<&(Coord, [Node; 2])> = self.entries.iter().rev().collect();

        while !pending.is_empty() {
            let mut remaining = Vec::with_capacity(pending.len());

            for entry in pending.iter().copied() {
                let (gate, [a, b]) = entry;
                match (resolve(&values, a), resolve(&values, b)) {
                    (Some(a), Some(b)) => {
                        let result = gate_type(grid, *gate)?.evaluate(a, b);
                        values.insert(*gate, result);
                    }
                    _ => remaining.push(entry),
                }
            }

            if remaining.len() == pending.len() {
                return Err(Error::StalledEvaluation { root: self.root });
            }
            pending = remaining;
        }

        values
            .get(&self.root)
            .copied()
            .ok_or(Error::StalledEvaluation { root: self.root })
    }
}

/// One output tree per cell of a Karnaugh map, shared by every version of a topology.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputTrees {
    columns: usize,
    trees: Vec<OutputTree>,
}

impl OutputTrees {
    pub fn build(grid: &Grid, root: Coord, map: &KarnaughMap) -> Result<Self> {
        let columns = map.columns();
        let trees = (0..map.rows() * columns)
            .into_par_iter()
            .map(|i| OutputTree::build(grid, root, &map.input_bits(i / columns, i % columns)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, trees })
    }

    pub fn get(&self, row: usize, column: usize) -> &OutputTree {
        &self.trees[row * self.columns + column]
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::build_topology;

    fn uniform(grid: &Grid, gate: GateType) -> Grid {
        let coords = grid.gate_coords();
        grid.with_gates(&coords, &vec![gate; coords.len()])
    }

    #[test]
    fn test_two_input_tree() {
        let grid = build_topology(2).unwrap();
        let root = grid.final_gate().unwrap();
        // a = 1, b = 0; column 0 holds b
        let tree = OutputTree::build(&grid, root, &[true, false]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.children(root),
            Some([Node::Input(true), Node::Input(false)])
        );
    }

    #[test]
    fn test_shared_gate_appears_once() {
        let grid = build_topology(5).unwrap();
        let root = grid.final_gate().unwrap();
        let tree = OutputTree::build(&grid, root, &[false; 5]).unwrap();
        assert_eq!(tree.len(), grid.count_gates());
        assert_eq!(tree.root(), (6, 2));
        assert_eq!(
            tree.children((4, 3)),
            Some([Node::Gate((2, 2)), Node::Gate((2, 4))])
        );
    }

    #[test]
    fn test_input_width_mismatch() {
        let grid = build_topology(3).unwrap();
        let root = grid.final_gate().unwrap();
        assert!(matches!(
            OutputTree::build(&grid, root, &[true, false]),
            Err(Error::InputWidth { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_evaluate_placeholder_fails() {
        let grid = build_topology(2).unwrap();
        let root = grid.final_gate().unwrap();
        let tree = OutputTree::build(&grid, root, &[true, true]).unwrap();
        assert!(matches!(tree.evaluate(&grid), Err(Error::NotAGate { .. })));
    }

    #[test]
    fn test_evaluate_uniform_gates() {
        // A tree of ANDs is the conjunction of all inputs, a tree of XORs with a forked input
        // counts that input twice.
        let grid = build_topology(4).unwrap();
        let root = grid.final_gate().unwrap();
        let and_grid = uniform(&grid, GateType::AND);
        let or_grid = uniform(&grid, GateType::OR);

        for i in 0..16u32 {
            let bits: Vec<bool> = (0..4).map(|b| i & (1 << b) != 0).collect();
            let tree = OutputTree::build(&grid, root, &bits).unwrap();
            assert_eq!(tree.evaluate(&and_grid).unwrap(), bits.iter().all(|&b| b));
            assert_eq!(tree.evaluate(&or_grid).unwrap(), bits.iter().any(|&b| b));
        }

        let grid = build_topology(3).unwrap();
        let root = grid.final_gate().unwrap();
        let xor_grid = uniform(&grid, GateType::XOR);
        for i in 0..8u32 {
            let bits: Vec<bool> = (0..3).map(|b| i & (1 << b) != 0).collect();
            let tree = OutputTree::build(&grid, root, &bits).unwrap();
            // b is forked into both first-level gates and cancels out
            assert_eq!(tree.evaluate(&xor_grid).unwrap(), bits[0] ^ bits[2]);
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let grid = build_topology(6).unwrap();
        let root = grid.final_gate().unwrap();
        let version = uniform(&grid, GateType::NAND);
        let tree = OutputTree::build(&grid, root, &[true, false, true, true, false, true]).unwrap();
        let snapshot = tree.clone();

        let first = tree.evaluate(&version).unwrap();
        let second = tree.evaluate(&version).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree, snapshot);
    }

    #[test]
    fn test_mixed_gates() {
        // Four inputs: (a ? b) and (c ? d) meet at the final gate
        let grid = build_topology(4).unwrap();
        let root = grid.final_gate().unwrap();
        let coords = grid.gate_coords();
        assert_eq!(coords, vec![(2, 1), (2, 2), (4, 2)]);
        let version = grid.with_gates(&coords, &[GateType::AND, GateType::OR, GateType::XOR]);

        for i in 0..16u32 {
            let bits: Vec<bool> = (0..4).map(|b| i & (1 << b) != 0).collect();
            let (a, b, c, d) = (bits[0], bits[1], bits[2], bits[3]);
            // (2, 1) reads columns 1 and 0, holding c and d; (2, 2) reads columns 2 and 3,
            // holding b and a
            let expected = (c & d) ^ (b | a);
            let tree = OutputTree::build(&grid, root, &bits).unwrap();
            assert_eq!(tree.evaluate(&version).unwrap(), expected);
        }
    }
}
