use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

/// Failures surfaced by a single-series fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Server returned {status}")]
    Transport { code: String, status: u16 },

    #[error("Request for {code} failed: {source}")]
    Network {
        code: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for {code} timed out after {seconds}s")]
    Timeout { code: String, seconds: u64 },

    #[error("No data returned for {code}")]
    EmptyResult { code: String },

    /// Non-fatal: the point keeps the raw string as its timestamp.
    #[error("Unparseable date '{raw}' in {code}")]
    MalformedTimestamp { code: String, raw: String },
}

impl FetchError {
    pub fn code(&self) -> &str {
        match self {
            FetchError::Transport { code, .. }
            | FetchError::Network { code, .. }
            | FetchError::Timeout { code, .. }
            | FetchError::EmptyResult { code }
            | FetchError::MalformedTimestamp { code, .. } => code,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Transport { .. } | FetchError::Network { .. } | FetchError::Timeout { .. }
        )
    }
}
