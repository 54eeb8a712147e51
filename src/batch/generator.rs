use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use log::{debug, info};
use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use super::{config::SamplingStrategy, validate::possible_versions};
use crate::{
    error::{Error, Result},
    schematic::{Coord, GateType, Grid},
};

/// One schematic of a batch: the shared topology with a unique set of gate types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub index: usize,
    /// Gate types in scan order of the gate slots
    pub gates: Vec<GateType>,
    pub grid: Grid,
}

/// Hands out gate assignments for a base grid, never the same one twice. The set of produced
/// assignments lives as long as the generator and is shared by every worker drawing from it.
pub struct AssignmentGenerator<'a> {
    base: &'a Grid,
    gate_coords: Vec<Coord>,
    produced: Mutex<HashSet<Vec<GateType>>>,
    max_attempts: usize,
}

/// Assignment number `index` of the `6^gates` possible ones, first gate most significant.
pub fn decode_assignment(mut index: usize, gates: usize) -> Vec<GateType> {
    let base = GateType::COUNT as usize;
    let mut order = vec![GateType::AND; gates];
    for slot in order.iter_mut().rev() {
        *slot = GateType::from_u8((index % base) as u8);
        index /= base;
    }
    order
}

/// Number of assignments in `orders` that repeat an earlier one.
pub fn count_duplicates(orders: &[Vec<GateType>]) -> usize {
    let unique: HashSet<&Vec<GateType>> = orders.iter().collect();
    orders.len() - unique.len()
}

impl<'a> AssignmentGenerator<'a> {
    pub fn new(base: &'a Grid, max_attempts: usize) -> Self {
        Self {
            base,
            gate_coords: base.gate_coords(),
            produced: Mutex::new(HashSet::new()),
            max_attempts,
        }
    }

    pub fn gate_coords(&self) -> &[Coord] {
        &self.gate_coords
    }

    /// Number of assignments handed out so far.
    pub fn produced(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Vec<GateType>>> {
        self.produced
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `order` unless it was already handed out.
    fn accept(&self, order: &[GateType]) -> bool {
        let mut produced = self.lock();
        if produced.contains(order) {
            false
        } else {
            produced.insert(order.to_vec())
        }
    }

    /// Draws uniform gate types until the assignment is new.
    pub fn random_assignment<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<GateType>> {
        for attempt in 0..self.max_attempts {
            let order: Vec<GateType> = self
                .gate_coords
                .iter()
                .map(|_| GateType::random(rng))
                .collect();

            if self.accept(&order) {
                if attempt > 0 {
                    debug!("unique assignment after {} rejected draws", attempt);
                }
                return Ok(order);
            }
        }

        Err(Error::AttemptsExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Draws `count` distinct assignments by index, without replacement. Falls back to
    /// rejection when the space of assignments is too large to index.
    pub fn sample_distinct<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<GateType>>> {
        let gates = self.gate_coords.len();
        let maximum = possible_versions(gates);

        if count as u128 > maximum {
            return Err(Error::Infeasible {
                requested: count,
                maximum,
                gates,
                inputs: self.base.width(),
            });
        }

        let total = match usize::try_from(maximum) {
            Ok(total) if maximum != u128::MAX => total,
            _ => {
                debug!("{} gates are too many to index, drawing at random", gates);
                return (0..count).map(|_| self.random_assignment(rng)).collect();
            }
        };

        index::sample(rng, total, count)
            .into_iter()
            .map(|i| {
                let order = decode_assignment(i, gates);
                if self.accept(&order) {
                    Ok(order)
                } else {
                    self.random_assignment(rng)
                }
            })
            .collect()
    }

    /// The base grid with `gates` filled into its slots.
    pub fn materialize(&self, index: usize, gates: Vec<GateType>) -> Version {
        Version {
            index,
            grid: self.base.with_gates(&self.gate_coords, &gates),
            gates,
        }
    }

    /// Generates `count` unique versions. With `parallel`, every version draws from its own
    /// generator seeded from `rng`.
    pub fn generate_batch<R: Rng + ?Sized>(
        &self,
        count: usize,
        strategy: SamplingStrategy,
        parallel: bool,
        rng: &mut R,
    ) -> Result<Vec<Version>> {
        let orders = match strategy {
            SamplingStrategy::Enumerate => self.sample_distinct(count, rng)?,
            SamplingStrategy::Reject if parallel => {
                let seeds: Vec<u64> = (0..count).map(|_| rng.random()).collect();
                seeds
                    .into_par_iter()
                    .map(|seed| self.random_assignment(&mut ChaCha8Rng::seed_from_u64(seed)))
                    .collect::<Result<Vec<_>>>()?
            }
            SamplingStrategy::Reject => (0..count)
                .map(|_| self.random_assignment(rng))
                .collect::<Result<Vec<_>>>()?,
        };

        info!("Generated {} unique gate assignments", orders.len());

        Ok(orders
            .into_iter()
            .enumerate()
            .map(|(index, gates)| self.materialize(index, gates))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::{build_topology, Cell};

    #[test]
    fn test_decode_assignment() {
        assert_eq!(decode_assignment(0, 2), vec![GateType::AND, GateType::AND]);
        assert_eq!(decode_assignment(5, 1), vec![GateType::XOR]);
        assert_eq!(decode_assignment(7, 2), vec![GateType::NAND, GateType::NAND]);
        assert_eq!(
            decode_assignment(6 * 6 * 2 + 3, 3),
            vec![GateType::OR, GateType::AND, GateType::NOR]
        );
    }

    #[test]
    fn test_count_duplicates() {
        let a = vec![GateType::AND];
        let b = vec![GateType::OR];
        assert_eq!(count_duplicates(&[a.clone(), b.clone()]), 0);
        assert_eq!(count_duplicates(&[a.clone(), b, a.clone(), a]), 2);
    }

    #[test]
    fn test_exhausts_single_gate() {
        let base = build_topology(2).unwrap();
        let generator = AssignmentGenerator::new(&base, 10_000);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let versions = generator
            .generate_batch(6, SamplingStrategy::Reject, false, &mut rng)
            .unwrap();
        let orders: Vec<Vec<GateType>> = versions.iter().map(|v| v.gates.clone()).collect();
        assert_eq!(count_duplicates(&orders), 0);
        assert_eq!(generator.produced(), 6);

        // Nothing left to hand out
        assert!(matches!(
            generator.random_assignment(&mut rng),
            Err(Error::AttemptsExhausted { attempts: 10_000 })
        ));
    }

    #[test]
    fn test_versions_fill_every_slot() {
        let base = build_topology(5).unwrap();
        let generator = AssignmentGenerator::new(&base, 1000);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let versions = generator
            .generate_batch(20, SamplingStrategy::Reject, true, &mut rng)
            .unwrap();

        assert_eq!(versions.len(), 20);
        for (i, version) in versions.iter().enumerate() {
            assert_eq!(version.index, i);
            assert_eq!(version.gates.len(), base.count_gates());
            assert_eq!(version.grid.gate_order(), version.gates);
            assert!(!version.grid.row(version.grid.height() - 1).contains(&Cell::Placeholder));
        }
    }

    #[test]
    fn test_parallel_batch_is_unique() {
        let base = build_topology(3).unwrap();
        let generator = AssignmentGenerator::new(&base, 100_000);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        // 200 of the 216 assignments of three gates
        let versions = generator
            .generate_batch(200, SamplingStrategy::Reject, true, &mut rng)
            .unwrap();
        let orders: Vec<Vec<GateType>> = versions.into_iter().map(|v| v.gates).collect();
        assert_eq!(orders.len(), 200);
        assert_eq!(count_duplicates(&orders), 0);
    }

    #[test]
    fn test_enumerate_whole_space() {
        let base = build_topology(4).unwrap();
        let generator = AssignmentGenerator::new(&base, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let versions = generator
            .generate_batch(216, SamplingStrategy::Enumerate, false, &mut rng)
            .unwrap();
        let orders: Vec<Vec<GateType>> = versions.into_iter().map(|v| v.gates).collect();
        assert_eq!(count_duplicates(&orders), 0);

        let fresh = AssignmentGenerator::new(&base, 1);
        assert!(matches!(
            fresh.sample_distinct(217, &mut rng),
            Err(Error::Infeasible { maximum: 216, .. })
        ));
    }

    #[test]
    fn test_seeded_batches_repeat() {
        let base = build_topology(6).unwrap();
        let draw = |seed| {
            let generator = AssignmentGenerator::new(&base, 1000);
            generator
                .generate_batch(
                    15,
                    SamplingStrategy::Reject,
                    false,
                    &mut ChaCha8Rng::seed_from_u64(seed),
                )
                .unwrap()
        };
        assert_eq!(draw(42), draw(42));
    }
}
