//! Attribution totals and removal effects from the simulation
//! accumulators.

use serde::Serialize;

use pathmark_core::PathRecord;

use crate::encode::StateSpace;
use crate::simulate::SimulationOutcome;

/// Conversions (and revenue, when modelled) attributed to one channel,
/// rescaled onto the observed totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRow {
    pub channel: String,
    pub conversions: f64,
    pub revenue: Option<f64>,
}

/// Fraction of simulated conversions (and revenue) that passed through one
/// channel: the estimated loss if the channel were removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovalEffectRow {
    pub channel: String,
    pub conversions: f64,
    pub revenue: Option<f64>,
}

/// Normalize the per-channel touch accumulators into attributed totals
/// and, when requested, removal effects.
///
/// Channels are emitted in first-seen vocabulary order; start and the
/// sentinels are excluded. A simulation with no converted walks (or no
/// touched channels) yields all-zero rows rather than a division error.
pub fn attribute(
    space: &StateSpace,
    outcome: &SimulationOutcome,
    records: &[PathRecord],
    has_revenue: bool,
    include_removal: bool,
) -> (Vec<AttributionRow>, Option<Vec<RemovalEffectRow>>) {
    let observed_conversions: f64 = records.iter().map(|r| r.conversions as f64).sum();
    let observed_revenue: f64 = records.iter().filter_map(|r| r.revenue).sum();

    let touch_sum: f64 = space
        .real_channels()
        .map(|ch| outcome.touches[ch as usize] as f64)
        .sum();
    let revenue_sum: f64 = space
        .real_channels()
        .map(|ch| outcome.revenue_touches[ch as usize])
        .sum();

    let simulated_conversions = outcome.conversions as f64;
    let simulated_revenue = outcome.simulated_revenue;

    let mut attribution = Vec::with_capacity(space.real_channels().len());
    let mut removal = include_removal.then(|| Vec::with_capacity(space.real_channels().len()));

    for ch in space.real_channels() {
        let channel = space.channel_names()[ch as usize].clone();
        let touches = outcome.touches[ch as usize] as f64;
        let revenue_touches = outcome.revenue_touches[ch as usize];

        let conversions = if touch_sum > 0.0 {
            touches / touch_sum * observed_conversions
        } else {
            0.0
        };
        let revenue = has_revenue.then(|| {
            if revenue_sum > 0.0 {
                revenue_touches / revenue_sum * observed_revenue
            } else {
                0.0
            }
        });
        attribution.push(AttributionRow {
            channel: channel.clone(),
            conversions,
            revenue,
        });

        if let Some(removal) = removal.as_mut() {
            let conversions = if simulated_conversions > 0.0 {
                touches / simulated_conversions
            } else {
                0.0
            };
            let revenue = has_revenue.then(|| {
                if simulated_revenue > 0.0 {
                    revenue_touches / simulated_revenue
                } else {
                    0.0
                }
            });
            removal.push(RemovalEffectRow {
                channel,
                conversions,
                revenue,
            });
        }
    }

    (attribution, removal)
}
