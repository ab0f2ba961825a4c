//! Routing rule wire types and endpoints

use serde::{Deserialize, Serialize};

use crate::client::NxrmClient;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingRuleApi {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `ALLOW` or `BLOCK`
    pub mode: String,
    pub matchers: Vec<String>,
}

impl NxrmClient {
    /// `GET /v1/routing-rules`
    pub async fn list_routing_rules(&self) -> Result<Vec<RoutingRuleApi>> {
        self.get_json("/v1/routing-rules", "routing rule list").await
    }

    /// `GET /v1/routing-rules/{name}`
    pub async fn get_routing_rule(&self, name: &str) -> Result<RoutingRuleApi> {
        self.get_json(&format!("/v1/routing-rules/{}", name), "routing rule")
            .await
    }

    /// `POST /v1/routing-rules`
    pub async fn create_routing_rule(&self, body: &RoutingRuleApi) -> Result<()> {
        self.post_json("/v1/routing-rules", body)
            .await?
            .expect(&[200, 201, 204])?;
        Ok(())
    }

    /// `PUT /v1/routing-rules/{name}`
    pub async fn update_routing_rule(&self, name: &str, body: &RoutingRuleApi) -> Result<()> {
        self.put_json(&format!("/v1/routing-rules/{}", name), body)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/routing-rules/{name}`
    pub async fn delete_routing_rule(&self, name: &str) -> Result<()> {
        self.delete(&format!("/v1/routing-rules/{}", name))
            .await?
            .expect(&[204])?;
        Ok(())
    }
}
