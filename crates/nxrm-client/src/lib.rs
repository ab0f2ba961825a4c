//! nxrm Client - Sonatype Nexus Repository admin REST API
//!
//! A thin, typed layer over the `/service/rest` endpoints used by the
//! provider:
//!
//! - **Client**: HTTP Basic authenticated requests with a per-request timeout
//! - **Config**: connection settings with `NXRM_SERVER_*` environment fallbacks
//! - **Wire types**: camelCase request and response records per API area
//! - **Errors**: status-aware errors carrying the server's error message
//!
//! ## Example
//!
//! ```rust,no_run
//! use nxrm_client::{ClientConfig, NxrmClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("http://localhost:8081", "admin", "admin123");
//! let client = NxrmClient::new(config)?;
//!
//! if let Some(version) = client.server_version().await? {
//!     println!("server {}", version);
//! }
//! for repo in client.list_repositories().await? {
//!     println!("{} ({} {})", repo.name, repo.format, repo.kind);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use api::*;
pub use client::{ApiResponse, NxrmClient};
pub use config::{ClientConfig, DEFAULT_API_BASE_PATH, DEFAULT_TIMEOUT, ENV_PASSWORD, ENV_URL, ENV_USERNAME};
pub use error::{ClientError, Result};
