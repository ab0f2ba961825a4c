//! Command failures and their exit codes

use miette::Diagnostic;
use nxrm_provider::ProviderError;
use thiserror::Error;

use crate::exit_codes;

/// Why a command failed
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Planning or validation reported errors
    #[error("Validation failed with {errors} error(s)")]
    #[diagnostic(code(nxrm::cli::validation))]
    Validation { errors: usize },

    /// An apply, refresh, destroy or import reported errors
    #[error("{operation} failed with {errors} error(s)")]
    #[diagnostic(code(nxrm::cli::apply))]
    Apply { operation: String, errors: usize },

    /// Provider configuration or the version check failed
    #[error("Unable to configure the provider")]
    #[diagnostic(
        code(nxrm::cli::connection),
        help("Set --url, --username and --password or the NXRM_SERVER_* environment variables")
    )]
    Connection,

    /// Resource or data source type not registered
    #[error("Unknown {what} type: {name}")]
    #[diagnostic(code(nxrm::cli::unknown_type))]
    UnknownType {
        what: &'static str,
        name: String,
        #[help]
        help: Option<String>,
    },

    /// Input or state document could not be read or parsed
    #[error("Invalid document {path}: {message}")]
    #[diagnostic(code(nxrm::cli::document))]
    Document { path: String, message: String },

    /// A document or state file could not be read or written
    #[error("File access failed: {message}")]
    #[diagnostic(code(nxrm::cli::io))]
    Io { message: String },

    /// Unexpected failure inside the driver
    #[error("Internal error: {message}")]
    #[diagnostic(code(nxrm::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Apply { .. } => exit_codes::APPLY_ERROR,
            CliError::Connection => exit_codes::CONNECTION_ERROR,
            CliError::UnknownType { .. } => exit_codes::USAGE_ERROR,
            CliError::Document { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn document(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Document {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn apply(operation: impl Into<String>, errors: usize) -> Self {
        Self::Apply {
            operation: operation.into(),
            errors,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownResourceType { name } => CliError::UnknownType {
                what: "resource",
                name,
                help: None,
            },
            ProviderError::UnknownDataSource { name } => CliError::UnknownType {
                what: "data source",
                name,
                help: None,
            },
            ProviderError::NotConfigured => CliError::Connection,
            other => CliError::internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Validation { errors: 1 }.exit_code(), 2);
        assert_eq!(CliError::apply("Apply", 1).exit_code(), 3);
        assert_eq!(CliError::Connection.exit_code(), 4);
        assert_eq!(
            CliError::from(ProviderError::UnknownDataSource {
                name: "nxrm_nope".to_string()
            })
            .exit_code(),
            64
        );
    }
}
