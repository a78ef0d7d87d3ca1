// src/error.rs

/// Everything that can end a fetch → unwrap → aggregate run.
#[derive(thiserror::Error, Debug)]
pub enum SheetError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("response body is not valid JSON: {0}")]
    Parse(String),

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl SheetError {
    pub fn is_network(&self) -> bool {
        matches!(self, SheetError::Network { .. } | SheetError::Status { .. })
    }
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;
