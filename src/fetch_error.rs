#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Irradiance provider returned {status}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Failed to parse provider response: {0}")]
    Format(#[from] serde_json::Error),
}

impl FetchError {
    /// Transport failures and 5xx responses are worth retrying; 4xx and bad bodies are not
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status, .. } => status.is_server_error(),
            FetchError::Format(_) => false,
        }
    }
}
