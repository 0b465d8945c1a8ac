//! Transition-probability export for reporting.

use serde::Serialize;

use crate::matrix::TransitionMatrix;

/// One exported edge: origin label, destination label, and the edge's
/// share of its origin row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionProbability {
    pub from: String,
    pub to: String,
    pub probability: f64,
}

/// Convert the raw count matrix into `(from, to, probability)` triples.
///
/// Absorbing rows emit nothing; for every other origin the emitted
/// probabilities sum to 1. Works on the raw weights, so it may run before
/// or after finalization.
pub fn transition_probabilities(
    matrix: &TransitionMatrix,
    labels: &[String],
) -> Vec<TransitionProbability> {
    let mut out = Vec::with_capacity(matrix.edge_count());
    for origin in 0..matrix.origin_count() as u32 {
        let row_weight = matrix.row_weight(origin);
        if row_weight == 0 {
            continue;
        }
        for (dest, weight) in matrix.row_edges(origin) {
            out.push(TransitionProbability {
                from: labels[origin as usize].clone(),
                to: labels[dest as usize].clone(),
                probability: weight as f64 / row_weight as f64,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exported_rows_sum_to_one() {
        let mut matrix = TransitionMatrix::new(3);
        matrix.add(0, 1, 3);
        matrix.add(0, 2, 1);
        matrix.add(1, 2, 5);
        let triples =
            transition_probabilities(&matrix, &labels(&["(start)", "A", "(conversion)"]));

        let start_sum: f64 = triples
            .iter()
            .filter(|t| t.from == "(start)")
            .map(|t| t.probability)
            .sum();
        assert!((start_sum - 1.0).abs() < 1e-12);

        let a_to_conv = triples
            .iter()
            .find(|t| t.from == "A" && t.to == "(conversion)")
            .unwrap();
        assert!((a_to_conv.probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn absorbing_rows_are_omitted() {
        let mut matrix = TransitionMatrix::new(2);
        matrix.add(0, 1, 2);
        let triples = transition_probabilities(&matrix, &labels(&["s", "t"]));
        assert_eq!(triples.len(), 1);
        assert!(triples.iter().all(|t| t.from != "t"));
    }
}
