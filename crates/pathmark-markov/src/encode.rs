//! Path encoding: channel vocabulary, k-gram state expansion, and the
//! sentinel states driving the simulation.

use std::collections::HashMap;

use pathmark_core::constants::{
    COMPOSITE_LABEL_SEPARATOR, CONVERSION_LABEL, NULL_LABEL, START_LABEL,
};
use pathmark_core::{AttributionError, AttributionResult, MarkovConfig, PathRecord};

/// Dense id of a channel or simulation state.
pub type StateId = u32;

/// The synthetic start state. Id 0 in both the channel vocabulary and the
/// simulation-state space.
pub const START_STATE: StateId = 0;

/// Channel vocabulary and simulation-state space owned by one model fit.
///
/// Channel ids are assigned in first-seen order and never re-sorted; output
/// tables follow this order. The conversion and null sentinels are appended
/// after every real channel, so real channels occupy the contiguous range
/// `1..conversion_channel`.
#[derive(Debug, Clone)]
pub struct StateSpace {
    /// Channel labels: `(start)`, real channels, `(conversion)`, `(null)`.
    channel_names: Vec<String>,
    /// Simulation-state labels. Identical to `channel_names` for order 1;
    /// comma-joined composite labels for higher orders.
    state_names: Vec<String>,
    /// Per-state constituent channel ids. A real order-1 state maps to
    /// itself; a k-gram maps to its (up to k) underlying channels; start
    /// and the sentinels map to nothing.
    constituents: Vec<Vec<StateId>>,
    conversion_state: StateId,
    null_state: StateId,
    conversion_channel: StateId,
    order: usize,
}

impl StateSpace {
    /// Number of entries in the channel vocabulary, sentinels included.
    pub fn channel_count(&self) -> usize {
        self.channel_names.len()
    }

    /// Number of simulation states, sentinels included.
    pub fn state_count(&self) -> usize {
        self.state_names.len()
    }

    pub fn channel_names(&self) -> &[String] {
        &self.channel_names
    }

    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    /// Ids of the real channels, excluding start and the sentinels.
    pub fn real_channels(&self) -> std::ops::Range<StateId> {
        1..self.conversion_channel
    }

    /// Channel ids credited when a walk visits `state`.
    pub fn constituents(&self, state: StateId) -> &[StateId] {
        &self.constituents[state as usize]
    }

    pub fn conversion_state(&self) -> StateId {
        self.conversion_state
    }

    pub fn null_state(&self) -> StateId {
        self.null_state
    }

    pub fn order(&self) -> usize {
        self.order
    }
}

/// One input row encoded onto the simulation-state space. `states` begins
/// with the start state; terminal transitions are derived from the counts
/// rather than in-band end markers.
#[derive(Debug, Clone)]
pub struct EncodedPath {
    pub states: Vec<StateId>,
    pub conversions: u64,
    pub nulls: u64,
    pub revenue: Option<f64>,
}

/// Result of encoding a dataset: the state space plus one encoded sequence
/// per input row.
#[derive(Debug)]
pub struct Encoding {
    pub space: StateSpace,
    pub paths: Vec<EncodedPath>,
}

/// Encode raw path records for the configured Markov order.
///
/// Tokens are trimmed; empty segments (doubled separators, stray
/// whitespace) are skipped. A path with no surviving tokens is an input
/// error, as is a non-finite or negative revenue value.
pub fn encode(records: &[PathRecord], config: &MarkovConfig) -> AttributionResult<Encoding> {
    let mut builder = SpaceBuilder::new(config.order);
    let mut paths = Vec::with_capacity(records.len());

    for (row, record) in records.iter().enumerate() {
        if let Some(value) = record.revenue {
            if !value.is_finite() || value < 0.0 {
                return Err(AttributionError::InvalidRevenue { row, value });
            }
        }

        let channels = builder.tokenize(&record.path, config.separator);
        if channels.is_empty() {
            return Err(AttributionError::EmptyPath { row });
        }

        let mut states = Vec::with_capacity(channels.len() + 1);
        states.push(START_STATE);
        if config.order == 1 {
            states.extend_from_slice(&channels);
        } else {
            builder.expand_windows(&channels, config.order, &mut states);
        }

        paths.push(EncodedPath {
            states,
            conversions: record.conversions,
            nulls: record.nulls,
            revenue: record.revenue,
        });
    }

    Ok(Encoding {
        space: builder.finish(),
        paths,
    })
}

/// Incremental vocabulary construction while records stream through.
struct SpaceBuilder {
    order: usize,
    channel_names: Vec<String>,
    channel_ids: HashMap<String, StateId>,
    // Composite side, used only for order > 1.
    state_names: Vec<String>,
    state_ids: HashMap<Vec<StateId>, StateId>,
    constituents: Vec<Vec<StateId>>,
}

impl SpaceBuilder {
    fn new(order: usize) -> Self {
        let mut builder = Self {
            order,
            channel_names: vec![START_LABEL.to_string()],
            channel_ids: HashMap::new(),
            state_names: Vec::new(),
            state_ids: HashMap::new(),
            constituents: Vec::new(),
        };
        if order > 1 {
            builder.state_names.push(START_LABEL.to_string());
            builder.constituents.push(Vec::new());
        }
        builder
    }

    /// Split a raw path on the separator, interning each trimmed non-empty
    /// token into the channel vocabulary.
    fn tokenize(&mut self, path: &str, separator: char) -> Vec<StateId> {
        path.split(separator)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| self.intern_channel(token))
            .collect()
    }

    fn intern_channel(&mut self, token: &str) -> StateId {
        if let Some(&id) = self.channel_ids.get(token) {
            return id;
        }
        let id = self.channel_names.len() as StateId;
        self.channel_names.push(token.to_string());
        self.channel_ids.insert(token.to_string(), id);
        id
    }

    /// Slide a window of width `order` across the channel sequence and emit
    /// one composite state per window. A path shorter than the order forms
    /// a single short window.
    fn expand_windows(&mut self, channels: &[StateId], order: usize, states: &mut Vec<StateId>) {
        if channels.len() > order - 1 {
            for window in channels.windows(order) {
                states.push(self.intern_window(window));
            }
        } else {
            states.push(self.intern_window(channels));
        }
    }

    fn intern_window(&mut self, window: &[StateId]) -> StateId {
        if let Some(&id) = self.state_ids.get(window) {
            return id;
        }
        let id = self.state_names.len() as StateId;
        let label = window
            .iter()
            .map(|&ch| self.channel_names[ch as usize].as_str())
            .collect::<Vec<_>>()
            .join(&COMPOSITE_LABEL_SEPARATOR.to_string());
        self.state_names.push(label);
        self.state_ids.insert(window.to_vec(), id);
        self.constituents.push(window.to_vec());
        id
    }

    /// Append the conversion and null sentinels and freeze the space.
    fn finish(mut self) -> StateSpace {
        let conversion_channel = self.channel_names.len() as StateId;
        self.channel_names.push(CONVERSION_LABEL.to_string());
        self.channel_names.push(NULL_LABEL.to_string());

        if self.order == 1 {
            // The state space is the channel space: each real channel is
            // its own single constituent.
            let state_names = self.channel_names.clone();
            let mut constituents = vec![Vec::new(); state_names.len()];
            for id in 1..conversion_channel {
                constituents[id as usize] = vec![id];
            }
            StateSpace {
                channel_names: self.channel_names,
                state_names,
                constituents,
                conversion_state: conversion_channel,
                null_state: conversion_channel + 1,
                conversion_channel,
                order: self.order,
            }
        } else {
            let conversion_state = self.state_names.len() as StateId;
            self.state_names.push(CONVERSION_LABEL.to_string());
            self.state_names.push(NULL_LABEL.to_string());
            self.constituents.push(Vec::new());
            self.constituents.push(Vec::new());
            StateSpace {
                channel_names: self.channel_names,
                state_names: self.state_names,
                constituents: self.constituents,
                conversion_state,
                null_state: conversion_state + 1,
                conversion_channel,
                order: self.order,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(order: usize) -> MarkovConfig {
        MarkovConfig {
            order,
            ..Default::default()
        }
    }

    #[test]
    fn assigns_channel_ids_in_first_seen_order() {
        let records = vec![
            PathRecord::new("B > A", 1),
            PathRecord::new("A > C > B", 1),
        ];
        let encoding = encode(&records, &config(1)).unwrap();
        let names = encoding.space.channel_names();
        assert_eq!(
            names,
            &["(start)", "B", "A", "C", "(conversion)", "(null)"]
        );
        assert_eq!(encoding.paths[0].states, vec![0, 1, 2]);
        assert_eq!(encoding.paths[1].states, vec![0, 2, 3, 1]);
    }

    #[test]
    fn trims_tokens_and_skips_empty_segments() {
        let records = vec![PathRecord::new("  A  >> B >  ", 1)];
        let encoding = encode(&records, &config(1)).unwrap();
        assert_eq!(
            encoding.space.channel_names(),
            &["(start)", "A", "B", "(conversion)", "(null)"]
        );
    }

    #[test]
    fn empty_path_is_an_input_error() {
        let records = vec![PathRecord::new(" > > ", 1)];
        assert!(matches!(
            encode(&records, &config(1)),
            Err(AttributionError::EmptyPath { row: 0 })
        ));
    }

    #[test]
    fn negative_revenue_is_an_input_error() {
        let records = vec![PathRecord::new("A", 1).with_revenue(-3.0)];
        assert!(matches!(
            encode(&records, &config(1)),
            Err(AttributionError::InvalidRevenue { row: 0, .. })
        ));
    }

    #[test]
    fn order_one_constituents_are_the_identity() {
        let records = vec![PathRecord::new("A > B", 1)];
        let encoding = encode(&records, &config(1)).unwrap();
        let space = &encoding.space;
        for id in space.real_channels() {
            assert_eq!(space.constituents(id), &[id]);
        }
        assert!(space.constituents(START_STATE).is_empty());
        assert!(space.constituents(space.conversion_state()).is_empty());
    }

    #[test]
    fn order_two_builds_composite_windows() {
        let records = vec![PathRecord::new("A > B > C", 1)];
        let encoding = encode(&records, &config(2)).unwrap();
        let space = &encoding.space;
        // start + "A,B" + "B,C" + sentinels
        assert_eq!(space.state_count(), 5);
        assert_eq!(space.state_names()[1], "A,B");
        assert_eq!(space.state_names()[2], "B,C");
        assert_eq!(space.constituents(1), &[1, 2]);
        assert_eq!(space.constituents(2), &[2, 3]);
        assert_eq!(encoding.paths[0].states, vec![0, 1, 2]);
    }

    #[test]
    fn path_shorter_than_order_forms_one_window() {
        let records = vec![PathRecord::new("A", 1)];
        let encoding = encode(&records, &config(3)).unwrap();
        let space = &encoding.space;
        assert_eq!(encoding.paths[0].states, vec![0, 1]);
        assert_eq!(space.state_names()[1], "A");
        assert_eq!(space.constituents(1), &[1]);
    }

    #[test]
    fn repeated_windows_share_one_state() {
        let records = vec![PathRecord::new("A > B > A > B", 1)];
        let encoding = encode(&records, &config(2)).unwrap();
        // Windows: A,B / B,A / A,B; the repeat reuses the first id.
        assert_eq!(encoding.paths[0].states, vec![0, 1, 2, 1]);
    }
}
