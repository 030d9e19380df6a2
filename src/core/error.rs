use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("years must be between 1 and 10.")]
    InvalidYears(u32),

    #[error("Unsupported asset.")]
    UnsupportedAsset(String),

    #[error("Unsupported currency.")]
    UnsupportedCurrency(String),

    /// The upstream provider yielded no series for `symbol`.
    #[error("Failed to fetch prices for {symbol}.")]
    UpstreamUnavailable { symbol: String, reason: String },
}

impl HistoryError {
    pub fn upstream(symbol: &str, reason: impl Into<String>) -> Self {
        HistoryError::UpstreamUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
