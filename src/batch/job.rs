use std::{io::BufRead, path::Path, time::Instant};

use log::{info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use super::{
    config::{BatchConfig, ConfirmPolicy},
    generator::{AssignmentGenerator, Version},
    output,
    validate::{validate_version_count, Feasibility},
};
use crate::{
    error::{Error, Result},
    karnaugh::{KarnaughMap, OutputTrees},
    schematic::{build_topology, Grid},
};

/// Everything a batch produced: the shared layout, every version and its truth table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub inputs: usize,
    pub base: Grid,
    pub versions: Vec<Version>,
    pub maps: Vec<KarnaughMap>,
}

impl Batch {
    pub fn load_from_binary(path: &str) -> Result<Self> {
        Ok(bincode::deserialize(&std::fs::read(path)?)?)
    }

    pub fn save_as_binary(&self, path: &str) -> Result<()> {
        std::fs::write(path, bincode::serialize(self)?)?;
        Ok(())
    }

    pub fn save_as_json(&self, path: &str) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub struct BatchJob {
    config: BatchConfig,
}

impl BatchJob {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn load(path: &str) -> Result<Self> {
        Ok(Self::new(BatchConfig::load_from_file(path)?))
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Builds the layout, generates the versions and derives their Karnaugh maps. Fails before
    /// any version is generated if the configuration or version count is unusable.
    pub fn execute(&self) -> Result<Batch> {
        let config = &self.config;
        config.validate()?;
        let start = Instant::now();

        if config.clear {
            output::clear_output(Path::new(&config.output_dir));
        }

        let base = build_topology(config.inputs)?;
        let gate_count = base.count_gates();
        info!(
            "Grid layout created: {} inputs, {} gates, {} rows",
            config.inputs,
            gate_count,
            base.height()
        );

        if let Feasibility::NearExhaustion { requested, maximum } =
            validate_version_count(config.versions, gate_count, config.inputs)?
        {
            self.confirm(requested, maximum)?;
        }

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        let generator = AssignmentGenerator::new(&base, config.max_attempts);
        let versions =
            generator.generate_batch(config.versions, config.strategy, config.parallel, &mut rng)?;

        #[cfg(feature = "correctness")]
        {
            let orders: Vec<_> = versions.iter().map(|v| v.gates.clone()).collect();
            let duplicates = super::generator::count_duplicates(&orders);
            if duplicates != 0 {
                return Err(Error::Duplicates(duplicates));
            }
        }

        let template = KarnaughMap::new(config.inputs);
        let root = base.output_gate()?;
        let trees = OutputTrees::build(&base, root, &template)?;
        info!("Built {} output trees", trees.len());

        let maps = if config.parallel {
            versions
                .par_iter()
                .map(|version| template.populate(&version.grid, &trees))
                .collect::<Result<Vec<_>>>()?
        } else {
            versions
                .iter()
                .map(|version| template.populate(&version.grid, &trees))
                .collect::<Result<Vec<_>>>()?
        };
        info!("Populated {} Karnaugh maps", maps.len());

        let batch = Batch {
            inputs: config.inputs,
            base,
            versions,
            maps,
        };

        if config.save {
            output::save_batch(&batch, config)?;
        }

        info!("Generation completed in {:.2?}", start.elapsed());
        Ok(batch)
    }

    fn confirm(&self, requested: usize, maximum: u128) -> Result<()> {
        match self.config.confirm {
            ConfirmPolicy::Proceed => {
                warn!("Continuing with {} of {} versions", requested, maximum);
                Ok(())
            }
            ConfirmPolicy::Abort => Err(Error::Aborted),
            ConfirmPolicy::Prompt => {
                eprintln!(
                    "Generating {} of {} possible versions randomly may take a long time.",
                    requested, maximum
                );
                eprintln!("Press enter to continue, or type 'n' to stop.");

                let mut answer = String::new();
                std::io::stdin().lock().read_line(&mut answer)?;
                match answer.trim() {
                    "n" | "N" | "no" => Err(Error::Aborted),
                    _ => Ok(()),
                }
            }
        }
    }
}
