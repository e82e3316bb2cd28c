use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong inside a client call. Never leaves the
/// client: operations convert it to an `Envelope` failure or an empty list.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("backend rejected request: {message}")]
    Rejected { message: String },

    #[error("cannot read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message shown to the user. Server-provided messages win; local file
    /// errors describe themselves; everything else gets `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            }
            | ApiError::Rejected { message }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            ApiError::File { .. } | ApiError::InvalidUrl(_) => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Pull a non-empty `message` string out of a JSON body, if there is one.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    message_field(&value)
}

pub(crate) fn message_field(value: &serde_json::Value) -> Option<String> {
    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
