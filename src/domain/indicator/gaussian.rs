//! Recursive Gaussian channel.
//!
//! The center line is the typical price smoothed by `poles` chained single-pole
//! IIR stages, each `y[i] = alpha*x[i] + (1-alpha)*y[i-1]` with `y[0] = alpha*x[0]`.
//! Every stage restarts from zero state and feeds the next one. The bands are the
//! center line plus/minus the identically filtered true range times `multiplier`.
//!
//! beta  = (1 - cos(2*pi/period)) / (2^(1/poles) - 1)
//! alpha = -beta + sqrt(beta^2 + 2*beta)
//!
//! Defaults: poles=4, period=144, multiplier=1.414.

use std::f64::consts::PI;

use tracing::debug;

use crate::domain::error::ChannelError;
use crate::domain::indicator::true_range::calculate_true_range;
use crate::domain::indicator::{ChannelPoint, Trend};
use crate::domain::price_point::PricePoint;

pub const DEFAULT_POLES: usize = 4;
pub const MAX_POLES: usize = 9;
pub const DEFAULT_PERIOD: usize = 144;
pub const DEFAULT_MULTIPLIER: f64 = 1.414;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelConfig {
    pub poles: usize,
    pub period: usize,
    pub multiplier: f64,
    pub reduced_lag: bool,
    pub fast_response: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            poles: DEFAULT_POLES,
            period: DEFAULT_PERIOD,
            multiplier: DEFAULT_MULTIPLIER,
            reduced_lag: false,
            fast_response: false,
        }
    }
}

impl ChannelConfig {
    /// Pole count actually used; anything outside 1..=9 falls back to 4.
    pub fn effective_poles(&self) -> usize {
        if (1..=MAX_POLES).contains(&self.poles) {
            self.poles
        } else {
            DEFAULT_POLES
        }
    }

    /// floor((period - 1) / (2 * poles))
    pub fn lag(&self) -> usize {
        self.period.saturating_sub(1) / (2 * self.effective_poles())
    }
}

/// Returns `(alpha, beta)` for the given period and pole count.
pub fn filter_coefficients(period: usize, poles: usize) -> (f64, f64) {
    let numerator = 1.0 - (2.0 * PI / period as f64).cos();
    let denominator = 2.0_f64.powf(1.0 / poles as f64) - 1.0;
    let beta = numerator / denominator;
    let alpha = -beta + (beta * beta + 2.0 * beta).sqrt();
    (alpha, beta)
}

/// Applies `poles` chained single-pole stages to `source`.
pub fn recursive_filter(alpha: f64, source: &[f64], poles: usize) -> Vec<f64> {
    let decay = 1.0 - alpha;
    let mut filtered = source.to_vec();

    for _ in 0..poles {
        let mut prev = 0.0;
        for value in filtered.iter_mut() {
            prev = alpha * *value + decay * prev;
            *value = prev;
        }
    }

    filtered
}

/// v[i] + (v[i] - v[i-lag]) for i >= lag, unchanged before.
pub fn apply_lag(values: &[f64], lag: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| if lag > 0 && i >= lag { v + (v - values[i - lag]) } else { v })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussianChannel {
    pub alpha: f64,
    pub filter: Vec<ChannelPoint>,
    pub upper_band: Vec<ChannelPoint>,
    pub lower_band: Vec<ChannelPoint>,
    pub filtered_true_range: Vec<f64>,
    pub trends: Vec<Trend>,
}

impl GaussianChannel {
    fn empty(alpha: f64) -> Self {
        Self {
            alpha,
            filter: Vec::new(),
            upper_band: Vec::new(),
            lower_band: Vec::new(),
            filtered_true_range: Vec::new(),
            trends: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
    }
}

pub fn calculate_gaussian_channel(
    candles: &[PricePoint],
    config: &ChannelConfig,
) -> Result<GaussianChannel, ChannelError> {
    let poles = config.effective_poles();
    let (alpha, beta) = filter_coefficients(config.period, poles);

    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(ChannelError::InvalidAlpha { alpha, beta });
    }

    debug!(poles, period = config.period, alpha, beta, "gaussian channel coefficients");

    if candles.is_empty() {
        return Ok(GaussianChannel::empty(alpha));
    }

    let typical: Vec<f64> = candles.iter().map(PricePoint::typical_price).collect();
    let true_range = calculate_true_range(candles);

    let lag = config.lag();
    let (source, tr_source) = if config.reduced_lag && lag > 0 {
        (apply_lag(&typical, lag), apply_lag(&true_range, lag))
    } else {
        (typical, true_range)
    };

    let mut filter = recursive_filter(alpha, &source, poles);
    let mut filtered_tr = recursive_filter(alpha, &tr_source, poles);

    if config.fast_response && poles > 1 {
        let filter_1 = recursive_filter(alpha, &source, 1);
        let filtered_tr_1 = recursive_filter(alpha, &tr_source, 1);

        for (v, one) in filter.iter_mut().zip(&filter_1) {
            *v = (*v + one) / 2.0;
        }
        for (v, one) in filtered_tr.iter_mut().zip(&filtered_tr_1) {
            *v = (*v + one) / 2.0;
        }
    }

    let mut filter_line = Vec::with_capacity(candles.len());
    let mut upper_band = Vec::with_capacity(candles.len());
    let mut lower_band = Vec::with_capacity(candles.len());
    let mut trends = Vec::with_capacity(candles.len());

    for (i, candle) in candles.iter().enumerate() {
        let width = filtered_tr[i] * config.multiplier;
        filter_line.push(ChannelPoint {
            time: candle.time,
            value: filter[i],
        });
        upper_band.push(ChannelPoint {
            time: candle.time,
            value: filter[i] + width,
        });
        lower_band.push(ChannelPoint {
            time: candle.time,
            value: filter[i] - width,
        });
        trends.push(if i == 0 {
            Trend::Bullish
        } else {
            Trend::between(filter[i - 1], filter[i])
        });
    }

    Ok(GaussianChannel {
        alpha,
        filter: filter_line,
        upper_band,
        lower_band,
        filtered_true_range: filtered_tr,
        trends,
    })
}
