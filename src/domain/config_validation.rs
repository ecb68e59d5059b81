//! Configuration validation.
//!
//! Validates every config section before a command runs.

use crate::domain::date_range::DateRange;
use crate::domain::error::ChartfolioError;
use crate::domain::indicator::gaussian::{
    ChannelConfig, DEFAULT_MULTIPLIER, DEFAULT_PERIOD, DEFAULT_POLES, MAX_POLES,
};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const PROVIDERS: [&str; 2] = ["csv", "simulated"];

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    let provider = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "csv".to_string());
    let provider = provider.trim().to_lowercase();

    if !PROVIDERS.contains(&provider.as_str()) {
        return Err(ChartfolioError::ConfigInvalid {
            section: "data".to_string(),
            key: "provider".to_string(),
            reason: format!("unknown provider '{}', expected csv or simulated", provider),
        });
    }

    if provider == "csv" {
        match config.get_string("data", "csv_dir") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(ChartfolioError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                })
            }
        }
    }
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    match config.get_string("portfolio", "path") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(ChartfolioError::ConfigMissing {
            section: "portfolio".to_string(),
            key: "path".to_string(),
        }),
    }
}

pub fn validate_channel_config(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    validate_poles(config)?;
    validate_period(config)?;
    validate_multiplier(config)?;
    Ok(())
}

pub fn validate_index_config(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    load_index_range(config).map(|_| ())
}

/// Reads `[channel]`, falling back to the defaults for missing keys.
pub fn load_channel_config(config: &dyn ConfigPort) -> Result<ChannelConfig, ChartfolioError> {
    validate_channel_config(config)?;
    Ok(ChannelConfig {
        poles: channel_int(config, "poles", DEFAULT_POLES as i64)? as usize,
        period: channel_int(config, "period", DEFAULT_PERIOD as i64)? as usize,
        multiplier: channel_double(config, "multiplier", DEFAULT_MULTIPLIER)?,
        reduced_lag: config.get_bool("channel", "reduced_lag", false),
        fast_response: config.get_bool("channel", "fast_response", false),
    })
}

/// Reads `[index]`; a missing `range` means the trailing year.
pub fn load_index_range(config: &dyn ConfigPort) -> Result<DateRange, ChartfolioError> {
    let range = config
        .get_string("index", "range")
        .unwrap_or_else(|| "1y".to_string());
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;

    DateRange::parse(&range, start, end).map_err(|e| ChartfolioError::ConfigInvalid {
        section: "index".to_string(),
        key: "range".to_string(),
        reason: e.to_string(),
    })
}

/// `[channel]` key as an integer; present but non-numeric is an error.
fn channel_int(config: &dyn ConfigPort, key: &str, default: i64) -> Result<i64, ChartfolioError> {
    match config.get_string("channel", key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ChartfolioError::ConfigInvalid {
            section: "channel".to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not an integer", raw.trim()),
        }),
    }
}

fn channel_double(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, ChartfolioError> {
    match config.get_string("channel", key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ChartfolioError::ConfigInvalid {
            section: "channel".to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not a number", raw.trim()),
        }),
    }
}

fn validate_poles(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    let value = channel_int(config, "poles", DEFAULT_POLES as i64)?;
    if value < 1 || value > MAX_POLES as i64 {
        return Err(ChartfolioError::ConfigInvalid {
            section: "channel".to_string(),
            key: "poles".to_string(),
            reason: format!("poles must be between 1 and {}", MAX_POLES),
        });
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    let value = channel_int(config, "period", DEFAULT_PERIOD as i64)?;
    if value < 2 {
        return Err(ChartfolioError::ConfigInvalid {
            section: "channel".to_string(),
            key: "period".to_string(),
            reason: "period must be at least 2".to_string(),
        });
    }
    Ok(())
}

fn validate_multiplier(config: &dyn ConfigPort) -> Result<(), ChartfolioError> {
    let value = channel_double(config, "multiplier", DEFAULT_MULTIPLIER)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ChartfolioError::ConfigInvalid {
            section: "channel".to_string(),
            key: "multiplier".to_string(),
            reason: "multiplier must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, field: &str) -> Result<Option<NaiveDate>, ChartfolioError> {
    config
        .get_date("index", field)
        .transpose()
        .map_err(|raw| ChartfolioError::ConfigInvalid {
            section: "index".to_string(),
            key: field.to_string(),
            reason: format!("invalid {} '{}', expected YYYY-MM-DD", field, raw),
        })
}
