use log::warn;

use super::consts::{NEAR_EXHAUSTION_MIN_INPUTS, NEAR_EXHAUSTION_RATIO};
use crate::{
    error::{Error, Result},
    schematic::GateType,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feasibility {
    Feasible,
    /// Enough assignments exist, but most draws will be duplicates.
    NearExhaustion { requested: usize, maximum: u128 },
}

/// Number of distinct gate assignments for `gates` gates, `6^gates`, saturating at `u128::MAX`.
pub fn possible_versions(gates: usize) -> u128 {
    u32::try_from(gates)
        .ok()
        .and_then(|gates| (GateType::COUNT as u128).checked_pow(gates))
        .unwrap_or(u128::MAX)
}

/// Checks that `versions` unique versions can exist for a schematic with `gates` gates.
pub fn validate_version_count(versions: usize, gates: usize, inputs: usize) -> Result<Feasibility> {
    let maximum = possible_versions(gates);

    if versions as u128 > maximum {
        return Err(Error::Infeasible {
            requested: versions,
            maximum,
            gates,
            inputs,
        });
    }

    if versions as f64 > maximum as f64 * NEAR_EXHAUSTION_RATIO
        && inputs > NEAR_EXHAUSTION_MIN_INPUTS
    {
        warn!(
            "{} of {} possible versions requested; many duplicates will be drawn and rejected",
            versions, maximum
        );
        return Ok(Feasibility::NearExhaustion {
            requested: versions,
            maximum,
        });
    }

    Ok(Feasibility::Feasible)
}
