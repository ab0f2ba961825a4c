//! Error types for provider dispatch
//!
//! Reconcile operations never fail with these: they report diagnostics. These
//! errors cover calls the host runtime should not have made at all.

use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("unknown resource type '{name}'")]
    UnknownResourceType { name: String },

    #[error("unknown data source '{name}'")]
    UnknownDataSource { name: String },

    #[error("provider is not configured; call configure first")]
    NotConfigured,

    #[error(transparent)]
    Client(#[from] nxrm_client::ClientError),

    #[error(transparent)]
    Core(#[from] nxrm_core::CoreError),
}
