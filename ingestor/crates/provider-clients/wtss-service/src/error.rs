use std::time::Duration;

use ingestor_provider_client_interface::ProviderError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum WtssError {
    /// Network/transport errors (connection refused, reset, incomplete body, ...)
    #[error("Network error during {operation}: {message}")]
    NetworkError { operation: String, message: String },

    #[error("Request timed out during {operation} after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    /// WTSS answered with a 4xx/5xx status
    #[error("WTSS API error during {operation} (status {status}): {message}")]
    ApiError { operation: String, status: StatusCode, message: String },

    #[error("Failed to parse response during {operation}: {message}")]
    ParseError { operation: String, message: String },

    /// A series whose value array does not line up with its timeline
    #[error("Attribute {attribute} has {values} values for a timeline of {timeline} dates")]
    InconsistentSeries { attribute: String, timeline: usize, values: usize },

    #[error("Failed to build URL for {operation}: {message}")]
    UrlError { operation: String, message: String },
}

impl WtssError {
    pub fn from_reqwest_error(operation: impl Into<String>, source: reqwest::Error, timeout: Duration) -> Self {
        let operation = operation.into();
        if source.is_timeout() {
            WtssError::Timeout { operation, timeout }
        } else if let Some(status) = source.status() {
            WtssError::ApiError { operation, status, message: source.to_string() }
        } else if source.is_decode() {
            WtssError::ParseError { operation, message: source.to_string() }
        } else {
            WtssError::NetworkError { operation, message: source.to_string() }
        }
    }

    pub fn parse_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        WtssError::ParseError { operation: operation.into(), message: message.into() }
    }
}

impl From<WtssError> for ProviderError {
    fn from(value: WtssError) -> Self {
        match value {
            WtssError::NetworkError { .. } => ProviderError::Transport(value.to_string()),
            WtssError::Timeout { timeout, .. } => ProviderError::Timeout(timeout),
            WtssError::ApiError { status, message, .. } => ProviderError::Status { status: status.as_u16(), message },
            WtssError::ParseError { .. } | WtssError::InconsistentSeries { .. } => {
                ProviderError::Data(value.to_string())
            }
            WtssError::UrlError { .. } => ProviderError::Internal(Box::new(value)),
        }
    }
}
