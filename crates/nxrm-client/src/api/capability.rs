//! Capability wire types and endpoints

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::NxrmClient;
use crate::error::Result;

/// Capability as created, updated and listed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub notes: String,
    pub enabled: bool,
    pub properties: BTreeMap<String, String>,
}

impl CapabilityApi {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            enabled: true,
            ..Self::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

impl NxrmClient {
    /// `GET /v1/capabilities`; the only read the server offers
    pub async fn list_capabilities(&self) -> Result<Vec<CapabilityApi>> {
        self.get_json("/v1/capabilities", "capability list").await
    }

    /// Find one capability by id in the listing
    pub async fn get_capability(&self, id: &str) -> Result<Option<CapabilityApi>> {
        Ok(self
            .list_capabilities()
            .await?
            .into_iter()
            .find(|c| c.id.as_deref() == Some(id)))
    }

    /// `POST /v1/capabilities`; the response carries the assigned id
    pub async fn create_capability(&self, body: &CapabilityApi, success: &[u16]) -> Result<CapabilityApi> {
        self.post_json("/v1/capabilities", body)
            .await?
            .expect(success)?
            .json("created capability")
    }

    /// `PUT /v1/capabilities/{id}`
    pub async fn update_capability(&self, id: &str, body: &CapabilityApi) -> Result<()> {
        self.put_json(&format!("/v1/capabilities/{}", id), body)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/capabilities/{id}`
    pub async fn delete_capability(&self, id: &str) -> Result<()> {
        self.delete(&format!("/v1/capabilities/{}", id))
            .await?
            .expect(&[204])?;
        Ok(())
    }
}
