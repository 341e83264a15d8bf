use ncm_core::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, NcmError>;

/// Non-success `code` returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: Option<i64>,
    pub message: Option<String>,
    #[serde(rename = "msg")]
    pub err_msg: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "code({}) {}",
            self.code.unwrap_or(-1),
            self.message
                .as_ref()
                .or(self.err_msg.as_ref())
                .map(String::as_str)
                .unwrap_or("")
        )
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Error)]
pub enum NcmError {
    #[error("invalid input: {0}")]
    InvalidInput(#[source] serde_json::Error),
    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),
    #[error("malformed response: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
        raw: Vec<u8>,
    },
    #[error("unexpected response shape: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("upstream: {0}")]
    Upstream(#[from] ApiError),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl NcmError {
    pub fn code(&self) -> Option<i64> {
        match self {
            NcmError::Upstream(e) => e.code,
            _ => None,
        }
    }
}
