//! Monte Carlo simulation over the finalized transition matrices.
//!
//! Walks are partitioned into fixed-size batches. Each batch owns a
//! private uniform stream (seeded from the fit seed plus the batch index)
//! and private accumulators; batch results are folded sequentially, so a
//! seeded fit is bit-identical under any worker count.

use rayon::prelude::*;

use crate::encode::{StateId, StateSpace, START_STATE};
use crate::matrix::TransitionMatrix;
use crate::revenue::RevenueTable;
use crate::sampler::{self, UniformStream};

/// Walks per parallel batch. Fixed so the seed-to-walk assignment does not
/// depend on the worker count.
const WALK_BATCH: u64 = 65_536;

/// Resolved simulation parameters (defaults already applied).
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub n_walks: u64,
    pub max_steps: u64,
    pub seed: u64,
}

/// Revenue-side inputs to the simulation, when revenue is modelled.
#[derive(Clone, Copy)]
pub struct RevenueModel<'a> {
    pub matrix: &'a TransitionMatrix,
    pub table: &'a RevenueTable,
}

/// Totals accumulated across all simulated walks.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// Walks that reached the conversion state.
    pub conversions: u64,
    /// Per-channel count of converted walks that touched the channel at
    /// least once. Indexed by channel id; sentinels stay zero.
    pub touches: Vec<u64>,
    /// Per-channel revenue credited from converted walks.
    pub revenue_touches: Vec<f64>,
    /// Total revenue drawn across converted walks.
    pub simulated_revenue: f64,
}

impl SimulationOutcome {
    pub(crate) fn zeroed(channels: usize) -> Self {
        Self {
            conversions: 0,
            touches: vec![0; channels],
            revenue_touches: vec![0.0; channels],
            simulated_revenue: 0.0,
        }
    }

    fn absorb(&mut self, batch: SimulationOutcome) {
        self.conversions += batch.conversions;
        self.simulated_revenue += batch.simulated_revenue;
        for (t, b) in self.touches.iter_mut().zip(&batch.touches) {
            *t += b;
        }
        for (v, b) in self.revenue_touches.iter_mut().zip(&batch.revenue_touches) {
            *v += b;
        }
    }
}

/// Run `params.n_walks` independent walks from the start state and
/// aggregate per-channel touch counts over the converted ones.
pub fn simulate(
    space: &StateSpace,
    matrix: &TransitionMatrix,
    revenue: Option<RevenueModel<'_>>,
    params: &SimulationParams,
) -> SimulationOutcome {
    let n_batches = params.n_walks.div_ceil(WALK_BATCH);
    let batches: Vec<SimulationOutcome> = (0..n_batches)
        .into_par_iter()
        .map(|batch| {
            let walks = WALK_BATCH.min(params.n_walks - batch * WALK_BATCH);
            run_batch(space, matrix, revenue, params, batch, walks)
        })
        .collect();

    let mut outcome = SimulationOutcome::zeroed(space.channel_count());
    for batch in batches {
        outcome.absorb(batch);
    }
    outcome
}

/// How a single walk ended.
enum Terminal {
    /// Reached the conversion state; `last_state` is the state the walk
    /// converted from, the origin for the revenue draw.
    Conversion { last_state: StateId },
    /// Reached the null state, hit the step cap, or landed on an absorbing
    /// row. All three discard the walk.
    Null,
}

fn run_batch(
    space: &StateSpace,
    matrix: &TransitionMatrix,
    revenue: Option<RevenueModel<'_>>,
    params: &SimulationParams,
    batch: u64,
    walks: u64,
) -> SimulationOutcome {
    let mut uniforms = UniformStream::seeded(params.seed.wrapping_add(batch));
    let mut outcome = SimulationOutcome::zeroed(space.channel_count());

    // Scratch reused across this batch's walks: a visited flag per channel
    // plus the list of flags to clear afterwards.
    let mut visited = vec![false; space.channel_count()];
    let mut touched: Vec<StateId> = Vec::new();

    for _ in 0..walks {
        let terminal = walk(
            space,
            matrix,
            params.max_steps,
            &mut uniforms,
            &mut visited,
            &mut touched,
        );

        if let Terminal::Conversion { last_state } = terminal {
            outcome.conversions += 1;
            let walk_revenue = revenue
                .map(|model| {
                    sampler::sample(model.matrix, last_state, uniforms.next_uniform())
                        .map(|bucket| model.table.value(bucket))
                        .unwrap_or(0.0)
                })
                .unwrap_or(0.0);
            outcome.simulated_revenue += walk_revenue;

            for &channel in &touched {
                outcome.touches[channel as usize] += 1;
                outcome.revenue_touches[channel as usize] += walk_revenue;
            }
        }

        for &channel in &touched {
            visited[channel as usize] = false;
        }
        touched.clear();
    }

    outcome
}

/// One random walk from the start state. Marks every constituent channel
/// of each visited state in `visited`/`touched`.
fn walk(
    space: &StateSpace,
    matrix: &TransitionMatrix,
    max_steps: u64,
    uniforms: &mut UniformStream,
    visited: &mut [bool],
    touched: &mut Vec<StateId>,
) -> Terminal {
    let conversion = space.conversion_state();
    let null = space.null_state();

    let mut state = START_STATE;
    let mut last_state = START_STATE;
    let mut steps = 0u64;

    while steps <= max_steps {
        let Some(next) = sampler::sample(matrix, state, uniforms.next_uniform()) else {
            return Terminal::Null;
        };
        if next == conversion {
            return Terminal::Conversion { last_state };
        }
        if next == null {
            return Terminal::Null;
        }

        for &channel in space.constituents(next) {
            if !visited[channel as usize] {
                visited[channel as usize] = true;
                touched.push(channel);
            }
        }

        last_state = next;
        state = next;
        steps += 1;
    }

    // Step cap exhausted: same as reaching null.
    Terminal::Null
}
