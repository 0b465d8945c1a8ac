//! # pathmark-markov
//!
//! Markov-chain attribution engine: models observed multi-touch paths as a
//! discrete-time Markov chain over channels (plus synthetic start,
//! conversion, and null states), estimates transition weights empirically,
//! and runs Monte Carlo walks over the chain to credit conversions and
//! revenue to channels and to estimate per-channel removal effects.
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Path encoding + k-gram expansion | [`encode`] |
//! | Sparse transition-weight arena | [`matrix`] |
//! | Revenue bucket table | [`revenue`] |
//! | Uniform stream + inverse-CDF draw | [`sampler`] |
//! | Monte Carlo walks | [`simulate`] |
//! | Attributed totals + removal effects | [`removal`] |
//! | Probability export | [`export`] |
//!
//! [`MarkovEngine::fit`] wires the stages together; everything it builds
//! lives for one fit and is dropped afterwards. Seeded fits are
//! bit-identical regardless of worker count.

pub mod encode;
pub mod engine;
pub mod export;
pub mod matrix;
pub mod removal;
pub mod revenue;
pub mod sampler;
pub mod simulate;

pub use encode::{StateId, StateSpace, START_STATE};
pub use engine::{MarkovEngine, MarkovResult};
pub use export::TransitionProbability;
pub use matrix::TransitionMatrix;
pub use removal::{AttributionRow, RemovalEffectRow};
pub use simulate::{SimulationOutcome, SimulationParams};
