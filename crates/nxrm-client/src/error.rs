//! Error types for upstream API calls

use thiserror::Error;

/// Upstream API errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a status the endpoint does not accept
    #[error("HTTP {status} {status_text}: {message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
    },

    #[error("Connection to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("Invalid provider configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type for upstream API calls
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// A 404 for entities only reachable through a listing
    pub fn not_found(message: impl Into<String>) -> Self {
        ClientError::Api {
            status: 404,
            status_text: "Not Found".to_string(),
            message: message.into(),
        }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }

    /// The structured error message from the response body, or the error text
    pub fn message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(ToString::to_string).unwrap_or_default();
        if e.is_decode() {
            ClientError::Decode {
                what: url,
                message: e.to_string(),
            }
        } else {
            ClientError::Transport {
                url,
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode {
            what: "response body".to_string(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_helpers() {
        let err = ClientError::Api {
            status: 404,
            status_text: "Not Found".to_string(),
            message: String::new(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_server_error());

        let err = ClientError::Api {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            message: "boom".to_string(),
        };
        assert!(err.is_server_error());
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "HTTP 500 Internal Server Error: boom");

        let err = ClientError::Timeout { seconds: 30 };
        assert_eq!(err.status(), None);
    }
}
