//! Tabu Search configuration.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Configuration parameters for the routing tabu search.
///
/// Tenure and phase thresholds are drawn from bands expressed as fractions
/// of the stop count `N`, so one configuration scales across instance sizes.
///
/// # Examples
///
/// ```
/// use tabu_routing::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_stall_factor(20)
///     .with_max_iterations(5_000)
///     .with_seed(7);
/// assert_eq!(config.stall_limit(10), 200);
/// assert_eq!(config.tenure_range(10), 4..=6);
/// assert_eq!(config.threshold_range(10), 6..=11);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabuConfig {
    /// Iterations without a new best, per stop, before stopping.
    pub stall_factor: usize,
    /// Hard cap on iterations (None for stall-limited only).
    pub max_iterations: Option<usize>,
    /// Default proximity width per vehicle.
    pub neighborhood_factor: usize,
    /// Tabu tenure band as fractions of the stop count.
    pub tenure_band: (f64, f64),
    /// Phase length band as fractions of the stop count.
    pub threshold_band: (f64, f64),
    /// Every k-th diversification is followed by an intensification.
    pub intensify_every: usize,
    /// Whether swaps inside a route are generated while diversifying.
    pub intra_swaps_while_diversifying: bool,
    /// Stall length after which the best routes are resequenced (None to disable).
    pub resequence_after: Option<usize>,
    /// Random seed (None for the default seed 42).
    pub seed: Option<u64>,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            stall_factor: 100,
            max_iterations: None,
            neighborhood_factor: 2,
            tenure_band: (0.4, 0.6),
            threshold_band: (0.6, 1.1),
            intensify_every: 10,
            intra_swaps_while_diversifying: false,
            resequence_after: Some(2000),
            seed: None,
        }
    }
}

impl TabuConfig {
    /// Sets the stall factor.
    pub fn with_stall_factor(mut self, factor: usize) -> Self {
        self.stall_factor = factor;
        self
    }

    /// Sets a hard iteration cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the default proximity width per vehicle.
    pub fn with_neighborhood_factor(mut self, factor: usize) -> Self {
        self.neighborhood_factor = factor;
        self
    }

    /// Sets the tenure band (fractions of the stop count).
    pub fn with_tenure_band(mut self, low: f64, high: f64) -> Self {
        self.tenure_band = (low, high);
        self
    }

    /// Sets the phase length band (fractions of the stop count).
    pub fn with_threshold_band(mut self, low: f64, high: f64) -> Self {
        self.threshold_band = (low, high);
        self
    }

    /// Sets how often diversification is followed by intensification.
    pub fn with_intensify_every(mut self, k: usize) -> Self {
        self.intensify_every = k;
        self
    }

    /// Enables or disables intra-route swaps while diversifying.
    pub fn with_intra_swaps_while_diversifying(mut self, on: bool) -> Self {
        self.intra_swaps_while_diversifying = on;
        self
    }

    /// Sets the stall length that triggers resequencing (None to disable).
    pub fn with_resequence_after(mut self, after: Option<usize>) -> Self {
        self.resequence_after = after;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Iterations without a new best before stopping, for `n` stops.
    pub fn stall_limit(&self, n: usize) -> usize {
        self.stall_factor.saturating_mul(n).max(1)
    }

    /// Tenure range for `n` stops.
    pub fn tenure_range(&self, n: usize) -> RangeInclusive<usize> {
        band(self.tenure_band, n)
    }

    /// Phase length range for `n` stops.
    pub fn threshold_range(&self, n: usize) -> RangeInclusive<usize> {
        band(self.threshold_band, n)
    }

    /// Default proximity width for a fleet of `vehicles`.
    pub fn default_width(&self, vehicles: usize) -> usize {
        self.neighborhood_factor.saturating_mul(vehicles).max(1)
    }
}

fn band((low, high): (f64, f64), n: usize) -> RangeInclusive<usize> {
    let lo = ((low * n as f64).floor() as usize).max(1);
    let hi = ((high * n as f64).floor() as usize).max(lo);
    lo..=hi
}
