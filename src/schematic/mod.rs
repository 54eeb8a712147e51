pub mod adjacency;
pub mod cell;
pub mod grid;
pub mod topology;

pub use adjacency::feeders;
pub use cell::{input_label, Cell, GateType, Motif};
pub use grid::{Coord, Grid};
pub use topology::build_topology;
