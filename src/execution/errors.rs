use serde_json::Value;
use thiserror::Error;

// ==================================================
// CAPABILITY ERRORS
// ==================================================

/// Failure reported by a [`Fetcher`](crate::client::Fetcher).
#[derive(Debug, Error)]
pub enum FetcherError {
    /// Non-2xx response. `body` is the backend payload, untouched.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: Value },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl FetcherError {
    /// Machine-readable error code from the backend payload, if any.
    pub fn code(&self) -> Option<String> {
        match self {
            FetcherError::Http { body, .. } => match body.get("code") {
                Some(Value::String(code)) => Some(code.clone()),
                Some(Value::Number(code)) => Some(code.to_string()),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetcherError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message, preferring the backend's `error` field.
    pub fn message(&self) -> String {
        match self {
            FetcherError::Http { status, body } => body
                .get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(|msg| format!("{} (HTTP {})", msg, status))
                .unwrap_or_else(|| self.to_string()),
            other => other.to_string(),
        }
    }
}

/// Failure reported by a [`ContractCaller`](crate::execution::ContractCaller).
#[derive(Debug, Error)]
pub enum ContractCallError {
    #[error("transaction reverted: {0}")]
    Revert(String),
    #[error("chain unreachable: {0}")]
    Transport(String),
    #[error("signer error: {0}")]
    Signer(String),
    #[error("abi error: {0}")]
    Abi(String),
}

// ==================================================
// SDK ERRORS
// ==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Signing,
    Submission,
    Execution,
    Configuration,
}

#[derive(Debug, Error)]
pub enum SdkError {
    /// Malformed or missing order fields. Raised before any network or chain call.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    /// The backend rejected the request or could not be reached.
    #[error("Submission error: {message}")]
    Submission {
        message: String,
        code: Option<String>,
        source: Option<FetcherError>,
    },

    #[error("Execution error: {0}")]
    Execution(#[from] ContractCallError),

    /// A composed method was invoked without a capability (or method) it needs.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Validation(_) => ErrorKind::Validation,
            SdkError::Signing(_) => ErrorKind::Signing,
            SdkError::Submission { .. } => ErrorKind::Submission,
            SdkError::Execution(_) => ErrorKind::Execution,
            SdkError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Backend error code carried by a submission failure.
    pub fn code(&self) -> Option<&str> {
        match self {
            SdkError::Submission { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        SdkError::Validation(msg.into())
    }

    pub(crate) fn submission(msg: impl Into<String>) -> Self {
        SdkError::Submission {
            message: msg.into(),
            code: None,
            source: None,
        }
    }
}

impl From<FetcherError> for SdkError {
    fn from(err: FetcherError) -> Self {
        SdkError::Submission {
            message: err.message(),
            code: err.code(),
            source: Some(err),
        }
    }
}
