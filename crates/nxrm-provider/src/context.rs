//! Per-provider state shared by every reconcile call

use std::sync::Arc;

use nxrm_client::NxrmClient;
use nxrm_core::ServerVersion;

/// Configured client plus the detected server version
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub client: Arc<NxrmClient>,
    /// `None` when the server did not report a recognizable version
    pub version: Option<ServerVersion>,
}

impl ProviderContext {
    pub fn new(client: NxrmClient, version: Option<ServerVersion>) -> Self {
        Self {
            client: Arc::new(client),
            version,
        }
    }

    pub fn client(&self) -> &NxrmClient {
        &self.client
    }

    pub fn version(&self) -> Option<&ServerVersion> {
        self.version.as_ref()
    }
}
