//! # pathmark-heuristics
//!
//! Rule-based attribution models computed by a single aggregation pass over
//! the path records: first touch, last touch, linear touch, and
//! position-based (U-shaped) touch. No simulation is involved; these are
//! the quick baselines next to the Markov engine.

pub mod models;

pub use models::{HeuristicEngine, HeuristicReport, HeuristicRow};
