//! Heuristic model fitting: one pass over the aggregated records,
//! accumulating per-channel credit under each rule.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use pathmark_core::{
    aggregate_paths, AttributionError, AttributionResult, HeuristicConfig, PathRecord,
};

/// Share of the credit given to each end of a path by the position-based
/// rule; the remainder is split across interior touches.
const POSITION_END_SHARE: f64 = 0.4;

/// Per-channel credit under each heuristic rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicRow {
    pub channel: String,
    pub first_touch: f64,
    pub last_touch: f64,
    pub linear_touch: f64,
    pub position_based: f64,
}

/// Fitted heuristic outputs: one conversions table, and a revenue table
/// when any record carries revenue. Channel order is first-seen order.
#[derive(Debug, Clone, Serialize)]
pub struct HeuristicReport {
    pub conversions: Vec<HeuristicRow>,
    pub revenue: Option<Vec<HeuristicRow>>,
}

/// Heuristic attribution engine.
pub struct HeuristicEngine {
    config: HeuristicConfig,
}

impl HeuristicEngine {
    pub fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Fit all four heuristics over one dataset.
    ///
    /// Identical paths are aggregated first; every rule is linear in the
    /// counts, so aggregation only speeds things up.
    pub fn fit(&self, records: &[PathRecord]) -> AttributionResult<HeuristicReport> {
        let aggregated = aggregate_paths(records);
        let has_revenue = aggregated.iter().any(|r| r.revenue.is_some());
        debug!(
            rows = records.len(),
            distinct_paths = aggregated.len(),
            has_revenue,
            "fitting heuristic models"
        );

        let mut channels: Vec<String> = Vec::new();
        let mut channel_ids: HashMap<String, usize> = HashMap::new();
        let mut conversions = Accumulator::default();
        let mut revenue = Accumulator::default();

        for (row, record) in aggregated.iter().enumerate() {
            if let Some(value) = record.revenue {
                if !value.is_finite() || value < 0.0 {
                    return Err(AttributionError::InvalidRevenue { row, value });
                }
            }

            let touches: Vec<usize> = record
                .path
                .split(self.config.separator)
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| intern(token, &mut channels, &mut channel_ids))
                .collect();
            if touches.is_empty() {
                return Err(AttributionError::EmptyPath { row });
            }

            conversions.grow(channels.len());
            conversions.credit(&touches, record.conversions as f64);
            if has_revenue {
                revenue.grow(channels.len());
                revenue.credit(&touches, record.revenue.unwrap_or(0.0));
            }
        }

        Ok(HeuristicReport {
            conversions: conversions.into_rows(&channels),
            revenue: has_revenue.then(|| revenue.into_rows(&channels)),
        })
    }
}

fn intern(token: &str, channels: &mut Vec<String>, ids: &mut HashMap<String, usize>) -> usize {
    if let Some(&id) = ids.get(token) {
        return id;
    }
    let id = channels.len();
    channels.push(token.to_string());
    ids.insert(token.to_string(), id);
    id
}

/// Parallel per-channel credit arrays for one metric (conversions or
/// revenue).
#[derive(Debug, Default)]
struct Accumulator {
    first: Vec<f64>,
    last: Vec<f64>,
    linear: Vec<f64>,
    position: Vec<f64>,
}

impl Accumulator {
    fn grow(&mut self, channels: usize) {
        self.first.resize(channels, 0.0);
        self.last.resize(channels, 0.0);
        self.linear.resize(channels, 0.0);
        self.position.resize(channels, 0.0);
    }

    /// Credit one path's touches with `amount` under every rule.
    fn credit(&mut self, touches: &[usize], amount: f64) {
        let len = touches.len();
        self.first[touches[0]] += amount;
        self.last[touches[len - 1]] += amount;

        let per_touch = amount / len as f64;
        for &ch in touches {
            self.linear[ch] += per_touch;
        }

        if len < 3 {
            // Too short for end-weighting: collapses to the linear split.
            for &ch in touches {
                self.position[ch] += per_touch;
            }
        } else {
            self.position[touches[0]] += POSITION_END_SHARE * amount;
            self.position[touches[len - 1]] += POSITION_END_SHARE * amount;
            let interior = (1.0 - 2.0 * POSITION_END_SHARE) * amount / (len - 2) as f64;
            for &ch in &touches[1..len - 1] {
                self.position[ch] += interior;
            }
        }
    }

    fn into_rows(self, channels: &[String]) -> Vec<HeuristicRow> {
        channels
            .iter()
            .enumerate()
            .map(|(id, channel)| HeuristicRow {
                channel: channel.clone(),
                first_touch: self.first[id],
                last_touch: self.last[id],
                linear_touch: self.linear[id],
                position_based: self.position[id],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(records: &[PathRecord]) -> HeuristicReport {
        HeuristicEngine::new(HeuristicConfig::default())
            .fit(records)
            .unwrap()
    }

    #[test]
    fn first_and_last_touch_credit_the_path_ends() {
        let records = vec![PathRecord::new("A > B > C", 2)];
        let report = fit(&records);
        let rows = &report.conversions;
        assert_eq!(rows[0].first_touch, 2.0);
        assert_eq!(rows[0].last_touch, 0.0);
        assert_eq!(rows[2].first_touch, 0.0);
        assert_eq!(rows[2].last_touch, 2.0);
    }

    #[test]
    fn linear_touch_credits_every_occurrence() {
        // A appears twice in a three-touch path.
        let records = vec![PathRecord::new("A > B > A", 3)];
        let report = fit(&records);
        let rows = &report.conversions;
        assert!((rows[0].linear_touch - 2.0).abs() < 1e-12);
        assert!((rows[1].linear_touch - 1.0).abs() < 1e-12);
    }

    #[test]
    fn position_based_weights_the_ends_at_forty_percent() {
        let records = vec![PathRecord::new("A > B > C > D", 10)];
        let report = fit(&records);
        let rows = &report.conversions;
        assert!((rows[0].position_based - 4.0).abs() < 1e-12);
        assert!((rows[3].position_based - 4.0).abs() < 1e-12);
        assert!((rows[1].position_based - 1.0).abs() < 1e-12);
        assert!((rows[2].position_based - 1.0).abs() < 1e-12);
    }

    #[test]
    fn short_paths_fall_back_to_linear_for_position_based() {
        let records = vec![PathRecord::new("A > B", 1)];
        let report = fit(&records);
        let rows = &report.conversions;
        assert!((rows[0].position_based - 0.5).abs() < 1e-12);
        assert!((rows[1].position_based - 0.5).abs() < 1e-12);
    }

    #[test]
    fn repeated_end_channel_collects_both_end_shares() {
        let records = vec![PathRecord::new("A > B > A", 10)];
        let report = fit(&records);
        let rows = &report.conversions;
        assert!((rows[0].position_based - 8.0).abs() < 1e-12);
        assert!((rows[1].position_based - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_path_is_an_input_error() {
        let records = vec![PathRecord::new("  ", 1)];
        let result = HeuristicEngine::new(HeuristicConfig::default()).fit(&records);
        assert!(matches!(result, Err(AttributionError::EmptyPath { .. })));
    }
}
