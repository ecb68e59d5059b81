//! Technical indicator implementations.
//!
//! This module provides the shared output types for chart overlays:
//! - `ChannelPoint`: a single timestamped value of an overlay line
//! - `Trend`: direction of the channel center line at a point
//!
//! and the calculations themselves:
//! - [`true_range`]: per-candle volatility measure
//! - [`gaussian`]: recursive Gaussian channel (center line plus bands)
//! - [`segment`]: splitting channel lines into same-trend runs

pub mod gaussian;
pub mod segment;
pub mod true_range;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelPoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Trend of `current` relative to `previous`; a flat line stays bullish.
    pub fn between(previous: f64, current: f64) -> Self {
        if current >= previous {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
        }
    }
}
