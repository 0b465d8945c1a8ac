//! Weighted destination sampling: a batched uniform stream and the
//! inverse-CDF search over a finalized matrix row.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::encode::StateId;
use crate::matrix::TransitionMatrix;

/// Uniform draws per refill of the stream buffer.
const UNIFORM_BATCH: usize = 8192;

/// Batched stream of uniform draws in `[0, 1)` from a seeded generator.
///
/// Each simulation batch owns one stream seeded from the fit seed plus the
/// batch index, so results are reproducible under any worker count.
pub struct UniformStream {
    rng: StdRng,
    buf: Vec<f64>,
    pos: usize,
}

impl UniformStream {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            buf: Vec::new(),
            pos: 0,
        }
    }

    pub fn next_uniform(&mut self) -> f64 {
        if self.pos == self.buf.len() {
            self.refill();
        }
        let u = self.buf[self.pos];
        self.pos += 1;
        u
    }

    fn refill(&mut self) {
        self.buf.clear();
        self.buf
            .extend((0..UNIFORM_BATCH).map(|_| self.rng.gen::<f64>()));
        self.pos = 0;
    }
}

/// Draw a destination from `origin`'s finalized row by inverse-CDF search:
/// the first cumulative entry at or above `floor(u * total) + 1`.
///
/// Returns `None` for an absorbing (zero out-degree) row. A miss on a
/// non-empty row cannot happen with `u` in `[0, 1)`; it is asserted in
/// debug builds and treated as "no transition" in release, which the
/// simulation reads as a null termination.
pub fn sample(matrix: &TransitionMatrix, origin: StateId, u: f64) -> Option<StateId> {
    let (dests, cum, total) = matrix.cum_row(origin);
    if total == 0 {
        return None;
    }
    let target = (u * total as f64) as u64 + 1;
    for (i, &bound) in cum.iter().enumerate() {
        if bound >= target {
            return Some(dests[i]);
        }
    }
    debug_assert!(false, "no cumulative entry >= {target} in row {origin}");
    None
}
