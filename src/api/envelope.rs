use serde::{Serialize, Serializer};

use super::error::ApiError;

/// Outcome of a fallible backend call.
///
/// A success always carries its payload and a failure always carries a
/// user-facing message. On the wire (and in `--json` output) this becomes
/// `{"success": true, ...payload}` or `{"success": false, "message": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure { message: String },
}

impl<T> Envelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Envelope::Failure {
            message: message.into(),
        }
    }

    /// Convert an internal result, using `fallback` when the error carries
    /// no server-provided message.
    pub fn from_result(result: Result<T, ApiError>, fallback: &str) -> Self {
        match result {
            Ok(payload) => Envelope::Success(payload),
            Err(err) => Envelope::failure(err.user_message(fallback)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Envelope::Success(payload) => Some(payload),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure { message } => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Envelope::Success(payload) => Ok(payload),
            Envelope::Failure { message } => Err(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Success(payload) => Envelope::Success(f(payload)),
            Envelope::Failure { message } => Envelope::Failure { message },
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a, P> {
            success: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<&'a str>,
            #[serde(flatten)]
            payload: Option<&'a P>,
        }

        let wire = match self {
            Envelope::Success(payload) => Wire {
                success: true,
                message: None,
                payload: Some(payload),
            },
            Envelope::Failure { message } => Wire {
                success: false,
                message: Some(message.as_str()),
                payload: None,
            },
        };
        wire.serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_data_id: Option<String>,
    /// The backend found an earlier analysis and returned its id instead of
    /// recomputing.
    pub already_processed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Updated {
    pub message: String,
}
