/// Pathmark toolkit version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Label of the synthetic start state prepended to every path.
pub const START_LABEL: &str = "(start)";

/// Label of the absorbing conversion state.
pub const CONVERSION_LABEL: &str = "(conversion)";

/// Label of the absorbing null (non-conversion) state.
pub const NULL_LABEL: &str = "(null)";

/// Walk count used when `n_simulations` is configured as 0.
pub const DEFAULT_N_SIMULATIONS: u64 = 1_000_000;

/// Step-cap multiplier applied to the state count when `max_step` is 0.
pub const MAX_STEP_FACTOR: u64 = 10;

/// Default channel separator in raw path strings.
pub const DEFAULT_SEPARATOR: char = '>';

/// Separator between channel names in composite-state labels.
pub const COMPOSITE_LABEL_SEPARATOR: char = ',';
