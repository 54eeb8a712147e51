use std::{fs::File, io::BufReader};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::consts::{DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_DIR, MAX_INPUTS};
use crate::error::{Error, Result};

/// How unique gate assignments are drawn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SamplingStrategy {
    /// Draw a random assignment and redraw on duplicates.
    Reject,
    /// Draw distinct indexes into the space of assignments.
    Enumerate,
}

impl SamplingStrategy {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Reject),
            1 => Some(Self::Enumerate),
            _ => None,
        }
    }
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Reject
    }
}

/// What to do when the requested versions nearly exhaust the assignment space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmPolicy {
    /// Ask on stdin.
    Prompt,
    Proceed,
    Abort,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self::Prompt
    }
}

fn default_scale() -> usize {
    1
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_owned()
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of inputs of the schematic
    pub inputs: usize,
    /// Number of unique versions to generate
    pub versions: usize,
    /// Scale factor for written schematics
    #[serde(default = "default_scale")]
    pub scale: usize,
    /// Base name of every written file
    pub file_name: String,
    /// Directory all outputs are written under
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub strategy: SamplingStrategy,
    #[serde(default)]
    pub confirm: ConfirmPolicy,
    /// Max draws per version before failing
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Seed for reproducible batches, OS entropy otherwise
    #[serde(default)]
    pub seed: Option<u64>,
    /// Whether versions and maps are computed on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Whether to write maps, schematics and the snapshot
    #[serde(default = "default_true")]
    pub save: bool,
    /// Whether to empty the output directory first
    #[serde(default)]
    pub clear: bool,
}

impl BatchConfig {
    pub fn new(inputs: usize, versions: usize, file_name: &str) -> Self {
        Self {
            inputs,
            versions,
            scale: default_scale(),
            file_name: file_name.to_owned(),
            output_dir: default_output_dir(),
            strategy: SamplingStrategy::default(),
            confirm: ConfirmPolicy::default(),
            max_attempts: default_max_attempts(),
            seed: None,
            parallel: true,
            save: true,
            clear: false,
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Rejects configurations before anything is built.
    pub fn validate(&self) -> Result<()> {
        if !(2..=MAX_INPUTS).contains(&self.inputs) {
            return Err(Error::InvalidInputCount(self.inputs));
        }
        if self.versions == 0 {
            return Err(Error::InvalidVersionCount);
        }
        if self.scale == 0 {
            return Err(Error::InvalidScale);
        }
        if self.save && self.file_name.is_empty() {
            return Err(Error::EmptyFileName);
        }
        Ok(())
    }
}
