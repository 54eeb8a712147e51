/// Largest supported input count; each input keeps its own letter and the Karnaugh map
/// stays small enough to hold in memory
pub const MAX_INPUTS: usize = 25;

/// Share of the assignment space above which duplicate rejection starts to dominate
pub const NEAR_EXHAUSTION_RATIO: f64 = 0.8;
/// Input counts above this one are warned about near exhaustion
pub const NEAR_EXHAUSTION_MIN_INPUTS: usize = 5;
/// Default number of draws per version before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000_000;

/// Default root of everything a batch writes
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Karnaugh map text files, under the output directory
pub const KMAP_DIR: &str = "kmaps";
/// Schematic text files, under the output directory
pub const SCHEMATIC_DIR: &str = "schematics";
