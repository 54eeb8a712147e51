use thiserror::Error;

use crate::schematic::Coord;

/// The result of a schematic or batch operation.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A schematic needs at least two inputs to have a single gate.
    #[error(
        "a schematic needs between 2 and {} inputs (got {0})",
        crate::batch::consts::MAX_INPUTS
    )]
    InvalidInputCount(usize),

    #[error("version count must be greater than 0")]
    InvalidVersionCount,

    #[error("scale factor must be greater than 0")]
    InvalidScale,

    #[error("file name must not be empty")]
    EmptyFileName,

    /// More versions were requested than there are gate assignments.
    #[error(
        "requested {requested} versions, but a schematic with {inputs} inputs only contains \
         {gates} gates, so only {maximum} different versions can be created (6^gates)"
    )]
    Infeasible {
        requested: usize,
        maximum: u128,
        gates: usize,
        inputs: usize,
    },

    #[error("no unique gate assignment found after {attempts} attempts")]
    AttemptsExhausted { attempts: usize },

    #[error("generation aborted after near-exhaustion warning")]
    Aborted,

    /// The wiring behind a gate does not match any motif the builder produces.
    #[error("unresolvable wiring '{found}' behind gate at {coord:?}")]
    UnresolvedMotif { coord: Coord, found: char },

    #[error("expected a gate at {coord:?}, found '{found}'")]
    NotAGate { coord: Coord, found: char },

    #[error("gate at {coord:?} has no partner to wire to")]
    UnpairedGate { coord: Coord },

    #[error("topology for {inputs} inputs does not fit in {height} rows")]
    GridOverflow { inputs: usize, height: usize },

    #[error("layout of width {width} has no output gate")]
    MissingOutputGate { width: usize },

    #[error("output tree rooted at {root:?} could not be fully evaluated")]
    StalledEvaluation { root: Coord },

    #[error("expected {expected} input bits, got {got}")]
    InputWidth { expected: usize, got: usize },

    #[error("batch contains {0} duplicate gate assignments")]
    Duplicates(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),
}
