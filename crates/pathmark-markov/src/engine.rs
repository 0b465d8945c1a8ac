//! Fit orchestration: encode, build matrices, simulate, attribute.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use pathmark_core::constants::{DEFAULT_N_SIMULATIONS, MAX_STEP_FACTOR};
use pathmark_core::{AttributionResult, MarkovConfig, PathRecord};

use crate::encode::{encode, EncodedPath, StateSpace, START_STATE};
use crate::export::{transition_probabilities, TransitionProbability};
use crate::matrix::TransitionMatrix;
use crate::removal::{attribute, AttributionRow, RemovalEffectRow};
use crate::revenue::RevenueTable;
use crate::simulate::{simulate, RevenueModel, SimulationOutcome, SimulationParams};

/// Fitted model outputs. Channel ordering in every table is first-seen
/// vocabulary order.
#[derive(Debug, Clone, Serialize)]
pub struct MarkovResult {
    /// Per-channel attributed conversions (and revenue, when modelled).
    pub attribution: Vec<AttributionRow>,
    /// Per-channel removal effects; present when
    /// `return_transition_probs` is on.
    pub removal_effects: Option<Vec<RemovalEffectRow>>,
    /// Exported transition-probability triples; present when
    /// `return_transition_probs` is on.
    pub transition_matrix: Option<Vec<TransitionProbability>>,
}

/// Markov attribution engine. One engine holds one validated
/// configuration; each [`MarkovEngine::fit`] call is independent and
/// builds all of its state fresh.
pub struct MarkovEngine {
    config: MarkovConfig,
}

impl MarkovEngine {
    pub fn new(config: MarkovConfig) -> AttributionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MarkovConfig {
        &self.config
    }

    /// Fit the model over one dataset.
    ///
    /// A dataset with no learnable transitions (no records, or only
    /// zero-count records) is a valid degenerate model: the result carries
    /// all-zero tables and the simulation is skipped.
    pub fn fit(&self, records: &[PathRecord]) -> AttributionResult<MarkovResult> {
        let encoding = encode(records, &self.config)?;
        let space = &encoding.space;
        debug!(
            channels = space.channel_count(),
            states = space.state_count(),
            paths = encoding.paths.len(),
            order = self.config.order,
            "encoded dataset"
        );

        let has_revenue = records.iter().any(|r| r.revenue.is_some());
        let (mut matrix, mut revenue) =
            build_matrices(space, &encoding.paths, self.config.loops, has_revenue);
        debug!(
            edges = matrix.edge_count(),
            total_weight = matrix.total_weight(),
            "built transition matrix"
        );

        let transition_matrix = self
            .config
            .return_transition_probs
            .then(|| transition_probabilities(&matrix, space.state_names()));

        matrix.finalize();
        if let Some((revenue_matrix, _)) = revenue.as_mut() {
            revenue_matrix.finalize();
        }

        let outcome = if matrix.out_degree(START_STATE) == 0 {
            debug!("no learnable transitions, skipping simulation");
            SimulationOutcome::zeroed(space.channel_count())
        } else {
            let params = SimulationParams {
                n_walks: match self.config.n_simulations {
                    0 => DEFAULT_N_SIMULATIONS,
                    n => n,
                },
                max_steps: match self.config.max_step {
                    0 => MAX_STEP_FACTOR * space.state_count() as u64,
                    n => n,
                },
                seed: self
                    .config
                    .random_state
                    .unwrap_or_else(|| rand::thread_rng().gen()),
            };
            info!(
                walks = params.n_walks,
                max_steps = params.max_steps,
                "running simulation"
            );
            simulate(
                space,
                &matrix,
                revenue.as_ref().map(|(matrix, table)| RevenueModel {
                    matrix,
                    table,
                }),
                &params,
            )
        };
        debug!(
            simulated_conversions = outcome.conversions,
            simulated_revenue = outcome.simulated_revenue,
            "simulation complete"
        );

        let (attribution, removal_effects) = attribute(
            space,
            &outcome,
            records,
            has_revenue,
            self.config.return_transition_probs,
        );

        Ok(MarkovResult {
            attribution,
            removal_effects,
            transition_matrix,
        })
    }
}

/// Build the transition matrix (and the revenue-bucket matrix, when
/// revenue is modelled) from the encoded paths.
///
/// Interior edges carry `conversions + nulls`; terminal edges split into
/// the conversion and null sentinels by their respective counts. With
/// `loops` off, consecutive repeats of a state collapse into one visit.
fn build_matrices(
    space: &StateSpace,
    paths: &[EncodedPath],
    loops: bool,
    has_revenue: bool,
) -> (TransitionMatrix, Option<(TransitionMatrix, RevenueTable)>) {
    let mut matrix = TransitionMatrix::new(space.state_count());
    let mut revenue =
        has_revenue.then(|| (TransitionMatrix::new(space.state_count()), RevenueTable::new()));

    for path in paths {
        let weight = path.conversions + path.nulls;
        let mut prev = START_STATE;
        for &state in &path.states[1..] {
            if !loops && state == prev {
                continue;
            }
            if weight > 0 {
                matrix.add(prev, state, weight);
            }
            prev = state;
        }

        if path.conversions > 0 {
            matrix.add(prev, space.conversion_state(), path.conversions);
            if let Some((revenue_matrix, table)) = revenue.as_mut() {
                let per_unit = path.revenue.unwrap_or(0.0) / path.conversions as f64;
                let bucket = table.intern(per_unit);
                revenue_matrix.add(prev, bucket, path.conversions);
            }
        }
        if path.nulls > 0 {
            matrix.add(prev, space.null_state(), path.nulls);
        }
    }

    (matrix, revenue)
}
