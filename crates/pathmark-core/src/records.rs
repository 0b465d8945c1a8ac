use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One observed path: an ordered sequence of channel touches together with
/// its conversion / non-conversion outcome counts.
///
/// Records are read-only input; models transform them but never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Raw path string, channel tokens joined by the separator.
    pub path: String,
    /// Number of conversions observed at the end of this path.
    pub conversions: u64,
    /// Total revenue across this path's conversions.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Non-converting repetitions of this path.
    #[serde(default)]
    pub nulls: u64,
}

impl PathRecord {
    pub fn new(path: impl Into<String>, conversions: u64) -> Self {
        Self {
            path: path.into(),
            conversions,
            revenue: None,
            nulls: 0,
        }
    }

    #[must_use]
    pub fn with_revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    #[must_use]
    pub fn with_nulls(mut self, nulls: u64) -> Self {
        self.nulls = nulls;
        self
    }
}

/// Group identical path strings, summing conversions, nulls, and revenue.
///
/// Output order is the first-seen order of each distinct path. The
/// heuristic models consume aggregated records; the Markov flow feeds
/// records through unaggregated, matching the original pipelines.
pub fn aggregate_paths(records: &[PathRecord]) -> Vec<PathRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<PathRecord> = Vec::new();

    for record in records {
        match index.get(record.path.as_str()) {
            Some(&i) => {
                let merged = &mut out[i];
                merged.conversions += record.conversions;
                merged.nulls += record.nulls;
                merged.revenue = match (merged.revenue, record.revenue) {
                    (Some(a), Some(b)) => Some(a + b),
                    (Some(a), None) => Some(a),
                    (None, b) => b,
                };
            }
            None => {
                index.insert(record.path.clone(), out.len());
                out.push(record.clone());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_duplicate_paths_in_first_seen_order() {
        let records = vec![
            PathRecord::new("A > B", 1).with_revenue(10.0),
            PathRecord::new("C", 2),
            PathRecord::new("A > B", 3).with_revenue(5.0).with_nulls(4),
        ];
        let agg = aggregate_paths(&records);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].path, "A > B");
        assert_eq!(agg[0].conversions, 4);
        assert_eq!(agg[0].revenue, Some(15.0));
        assert_eq!(agg[0].nulls, 4);
        assert_eq!(agg[1].path, "C");
        assert_eq!(agg[1].conversions, 2);
        assert_eq!(agg[1].revenue, None);
    }

    #[test]
    fn aggregation_of_distinct_paths_is_identity() {
        let records = vec![PathRecord::new("A", 1), PathRecord::new("B", 1)];
        assert_eq!(aggregate_paths(&records), records);
    }
}
