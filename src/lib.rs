pub mod batch;
pub mod error;
pub mod karnaugh;
pub mod schematic;

pub use error::{Error, Result};
