//! Domain error types.

/// Reasons a Gaussian channel overlay cannot be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid filter coefficient: alpha={alpha}, beta={beta}")]
    InvalidAlpha { alpha: f64, beta: f64 },

    #[error("insufficient data: have {have} candles, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("candle {index} has a non-finite high, low or close")]
    NonFiniteCandle { index: usize },
}

/// Top-level error type for chartfolio.
#[derive(Debug, thiserror::Error)]
pub enum ChartfolioError {
    #[error("price provider error for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("portfolio store error: {reason}")]
    Store { reason: String },

    #[error("portfolio entry not found: {id}")]
    EntryNotFound { id: String },

    #[error("invalid portfolio entry: {reason}")]
    InvalidEntry { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid date range: {reason}")]
    InvalidRange { reason: String },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ChartfolioError> for std::process::ExitCode {
    fn from(err: &ChartfolioError) -> Self {
        let code: u8 = match err {
            ChartfolioError::Io(_) | ChartfolioError::Csv(_) => 1,
            ChartfolioError::ConfigParse { .. }
            | ChartfolioError::ConfigMissing { .. }
            | ChartfolioError::ConfigInvalid { .. }
            | ChartfolioError::InvalidRange { .. } => 2,
            ChartfolioError::Store { .. } | ChartfolioError::Json(_) => 3,
            ChartfolioError::EntryNotFound { .. } | ChartfolioError::InvalidEntry { .. } => 4,
            ChartfolioError::Provider { .. } | ChartfolioError::Channel(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
