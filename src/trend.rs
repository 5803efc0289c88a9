//! Trend predicates over a [`SampleWindow`].

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::window::SampleWindow;

/// How a window of altitude samples is judged to be decreasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPolicy {
    /// Every adjacent pair must be non-increasing. Only suitable for small windows, a single
    /// noisy step keeps it from firing.
    #[default]
    Strict,
    /// More than `N / 2` of the `N - 1` adjacent pairs must be strictly descending.
    Majority,
}

impl TrendPolicy {
    pub fn is_decreasing<const N: usize>(&self, window: &SampleWindow<N>) -> bool {
        match self {
            TrendPolicy::Strict => window.pairs().all(|(older, newer)| older >= newer),
            TrendPolicy::Majority => descending_steps(window) > N / 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrendPolicy::Strict => "strict",
            TrendPolicy::Majority => "majority",
        }
    }
}

/// Number of adjacent pairs where the older sample is strictly greater than the newer one.
pub fn descending_steps<const N: usize>(window: &SampleWindow<N>) -> usize {
    window
        .pairs()
        .filter(|(older, newer)| older > newer)
        .count()
}

impl fmt::Display for TrendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrendPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(TrendPolicy::Strict),
            "majority" => Ok(TrendPolicy::Majority),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}
