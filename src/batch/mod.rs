pub mod config;
pub mod consts;
pub mod generator;
pub mod job;
pub mod output;
pub mod validate;

pub use config::{BatchConfig, ConfirmPolicy, SamplingStrategy};
pub use generator::{AssignmentGenerator, Version};
pub use job::{Batch, BatchJob};
pub use validate::{validate_version_count, Feasibility};
