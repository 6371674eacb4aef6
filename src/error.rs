use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to extract text from {path}: {detail}")]
    Extraction { path: String, detail: String },

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited by API: {0}")]
    RateLimit(String),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ScreenerError {
    /// Stable kind label used in CSV error rows and report files.
    pub fn kind(&self) -> &'static str {
        match self {
            ScreenerError::UnsupportedFormat(_) => "unsupported_format",
            ScreenerError::Extraction { .. } => "extraction",
            ScreenerError::EmptyInput(_) => "empty_input",
            ScreenerError::Authentication(_) => "authentication",
            ScreenerError::RateLimit(_) => "rate_limit",
            ScreenerError::Api { .. } => "api",
            ScreenerError::MalformedResponse(_) => "malformed_response",
            ScreenerError::Network(_) => "network",
            ScreenerError::Io(_) => "io",
            ScreenerError::Csv(_) => "csv",
            ScreenerError::Config(_) => "config",
        }
    }
}
