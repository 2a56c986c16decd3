use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the futures position services and the signed-call transport.
///
/// Collaborator errors are passed through unchanged; a decode failure never
/// carries a partially decoded value.
#[derive(Debug, Error)]
pub enum FuturesError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest_middleware::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Binance API error (status {status}): code={code}, msg={message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("Missing API credentials for {endpoint}")]
    MissingCredentials { endpoint: String },

    #[error("Failed to sign request: {0}")]
    Signing(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid value for field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

impl FuturesError {
    /// Exchange error code, if the remote rejected the request.
    pub fn api_code(&self) -> Option<i64> {
        match self {
            FuturesError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, FuturesError::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_formatting() {
        let error = FuturesError::Api {
            status: 400,
            code: -4046,
            message: "No need to change margin type.".to_string(),
        };

        let msg = error.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("-4046"));
        assert!(msg.contains("No need to change margin type."));
        assert_eq!(error.api_code(), Some(-4046));
    }

    #[test]
    fn test_invalid_parameter_formatting() {
        let error = FuturesError::InvalidParameter {
            name: "type",
            reason: "unknown action code 3".to_string(),
        };

        assert_eq!(error.to_string(), "Invalid parameter type: unknown action code 3");
        assert_eq!(error.api_code(), None);
        assert!(!error.is_decode());
    }

    #[test]
    fn test_decode_error_is_flagged() {
        let inner = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = FuturesError::from(inner);
        assert!(error.is_decode());
    }
}
