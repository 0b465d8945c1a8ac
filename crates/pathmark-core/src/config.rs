use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{AttributionError, AttributionResult};

/// Markov attribution model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovConfig {
    /// Markov memory length: how many preceding touches form one state.
    pub order: usize,
    /// Channel separator in raw path strings.
    pub separator: char,
    /// Number of simulated walks. 0 uses [`constants::DEFAULT_N_SIMULATIONS`].
    pub n_simulations: u64,
    /// Per-walk step cap. 0 uses [`constants::MAX_STEP_FACTOR`] times the
    /// state count. A walk that exhausts the cap counts as a non-conversion.
    pub max_step: u64,
    /// Whether to compute removal effects and export the transition
    /// probabilities alongside the attributed totals.
    pub return_transition_probs: bool,
    /// Whether a state may transition to itself. When off, consecutive
    /// repeats of the same state collapse into a single visit.
    pub loops: bool,
    /// Seed for the simulation RNG. Fits with the same seed, dataset, and
    /// configuration are bit-identical; unseeded fits may vary.
    pub random_state: Option<u64>,
}

impl Default for MarkovConfig {
    fn default() -> Self {
        Self {
            order: 1,
            separator: constants::DEFAULT_SEPARATOR,
            n_simulations: 0,
            max_step: 0,
            return_transition_probs: true,
            loops: false,
            random_state: None,
        }
    }
}

impl MarkovConfig {
    pub fn validate(&self) -> AttributionResult<()> {
        if self.order == 0 {
            return Err(AttributionError::InvalidOrder { order: self.order });
        }
        Ok(())
    }
}

/// Heuristic attribution model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Channel separator in raw path strings.
    pub separator: char,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            separator: constants::DEFAULT_SEPARATOR,
        }
    }
}
