//! Trend segmentation of a Gaussian channel for rendering.
//!
//! Consecutive points with the same trend form one segment. When the trend
//! flips, the first point of the new run is also appended to the previous run
//! so adjacent segments share an endpoint.

use serde::Serialize;

use crate::domain::indicator::gaussian::GaussianChannel;
use crate::domain::indicator::{ChannelPoint, Trend};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSegment {
    pub trend: Trend,
    pub filter: Vec<ChannelPoint>,
    pub upper_band: Vec<ChannelPoint>,
    pub lower_band: Vec<ChannelPoint>,
}

impl TrendSegment {
    fn new(trend: Trend) -> Self {
        Self {
            trend,
            filter: Vec::new(),
            upper_band: Vec::new(),
            lower_band: Vec::new(),
        }
    }

    fn push(&mut self, channel: &GaussianChannel, i: usize) {
        self.filter.push(channel.filter[i]);
        self.upper_band.push(channel.upper_band[i]);
        self.lower_band.push(channel.lower_band[i]);
    }

    pub fn len(&self) -> usize {
        self.filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
    }
}

pub fn segment_by_trend(channel: &GaussianChannel) -> Vec<TrendSegment> {
    let mut segments: Vec<TrendSegment> = Vec::new();

    for (i, &trend) in channel.trends.iter().enumerate() {
        let continues = segments.last().is_some_and(|s| s.trend == trend);
        if !continues {
            if let Some(previous) = segments.last_mut() {
                previous.push(channel, i);
            }
            segments.push(TrendSegment::new(trend));
        }
        if let Some(current) = segments.last_mut() {
            current.push(channel, i);
        }
    }

    segments
}
