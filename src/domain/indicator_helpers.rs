//! Input validation and overlay assembly for the Gaussian channel.

use crate::domain::error::ChannelError;
use crate::domain::indicator::gaussian::{calculate_gaussian_channel, ChannelConfig, GaussianChannel};
use crate::domain::indicator::segment::{segment_by_trend, TrendSegment};
use crate::domain::price_point::PricePoint;

pub const MIN_CHANNEL_CANDLES: usize = 10;

pub fn validate_candles(candles: &[PricePoint]) -> Result<(), ChannelError> {
    if candles.len() < MIN_CHANNEL_CANDLES {
        return Err(ChannelError::InsufficientData {
            have: candles.len(),
            need: MIN_CHANNEL_CANDLES,
        });
    }

    match candles.iter().position(|c| !c.is_finite()) {
        Some(index) => Err(ChannelError::NonFiniteCandle { index }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct ChannelOverlay {
    pub channel: GaussianChannel,
    pub segments: Vec<TrendSegment>,
}

/// Validates `candles`, computes the channel and splits it into trend segments.
pub fn channel_overlay(
    candles: &[PricePoint],
    config: &ChannelConfig,
) -> Result<ChannelOverlay, ChannelError> {
    validate_candles(candles)?;
    let channel = calculate_gaussian_channel(candles, config)?;
    let segments = segment_by_trend(&channel);
    Ok(ChannelOverlay { channel, segments })
}
