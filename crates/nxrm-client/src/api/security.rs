//! Security wire types and endpoints: roles, users, realms, anonymous access
//! and content selectors

use serde::{Deserialize, Serialize};

use crate::client::NxrmClient;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleApi {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing)]
    pub source: Option<String>,
    pub privileges: Vec<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserApi {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    /// Only sent on create; passwords are changed through a dedicated endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// `active`, `locked`, `disabled` or `changepassword`
    pub status: String,
    pub read_only: bool,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnonymousAccessApi {
    pub enabled: bool,
    pub user_id: String,
    pub realm_name: String,
}

/// Entry of `GET /v1/security/realms/available`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealmApi {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentSelectorApi {
    pub name: String,
    #[serde(rename = "type", skip_serializing)]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub expression: String,
}

#[derive(Serialize)]
struct ContentSelectorUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    expression: &'a str,
}

impl NxrmClient {
    // Roles

    /// `GET /v1/security/roles`
    pub async fn list_roles(&self) -> Result<Vec<RoleApi>> {
        self.get_json("/v1/security/roles", "role list").await
    }

    /// `GET /v1/security/roles/{id}`
    pub async fn get_role(&self, id: &str) -> Result<RoleApi> {
        self.get_json(&format!("/v1/security/roles/{}", id), "role").await
    }

    /// `POST /v1/security/roles`
    pub async fn create_role(&self, body: &RoleApi) -> Result<RoleApi> {
        self.post_json("/v1/security/roles", body)
            .await?
            .expect(&[200, 201])?
            .json("created role")
    }

    /// `PUT /v1/security/roles/{id}`
    pub async fn update_role(&self, id: &str, body: &RoleApi) -> Result<()> {
        self.put_json(&format!("/v1/security/roles/{}", id), body)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/security/roles/{id}`
    pub async fn delete_role(&self, id: &str) -> Result<()> {
        self.delete(&format!("/v1/security/roles/{}", id))
            .await?
            .expect(&[204])?;
        Ok(())
    }

    // Users

    /// `GET /v1/security/users`, optionally restricted to one source
    pub async fn list_users(&self, source: Option<&str>) -> Result<Vec<UserApi>> {
        let response = match source {
            Some(s) => self.get_with_query("/v1/security/users", &[("source", s)]).await?,
            None => self.get("/v1/security/users").await?,
        };
        response.expect(&[200])?.json("user list")
    }

    /// Exact lookup of one user.
    ///
    /// The search endpoint matches user ids by prefix, so the result is
    /// filtered down to the exact id.
    pub async fn find_user(&self, user_id: &str, source: &str) -> Result<Option<UserApi>> {
        let users: Vec<UserApi> = self
            .get_with_query(
                "/v1/security/users",
                &[("userId", user_id), ("source", source)],
            )
            .await?
            .expect(&[200])?
            .json("user search")?;
        Ok(users.into_iter().find(|u| u.user_id == user_id))
    }

    /// `POST /v1/security/users`
    pub async fn create_user(&self, body: &UserApi) -> Result<UserApi> {
        self.post_json("/v1/security/users", body)
            .await?
            .expect(&[200, 201])?
            .json("created user")
    }

    /// `PUT /v1/security/users/{id}`
    pub async fn update_user(&self, user_id: &str, body: &UserApi) -> Result<()> {
        self.put_json(&format!("/v1/security/users/{}", user_id), body)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `PUT /v1/security/users/{id}/change-password` with a plain-text body
    pub async fn change_password(&self, user_id: &str, password: &str) -> Result<()> {
        self.put_text(
            &format!("/v1/security/users/{}/change-password", user_id),
            password,
        )
        .await?
        .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/security/users/{id}?realm=`
    pub async fn delete_user(&self, user_id: &str, realm: Option<&str>) -> Result<()> {
        let path = format!("/v1/security/users/{}", user_id);
        let response = match realm {
            Some(r) => self.delete_with_query(&path, &[("realm", r)]).await?,
            None => self.delete(&path).await?,
        };
        response.expect(&[204])?;
        Ok(())
    }

    // Realms

    /// `GET /v1/security/realms/active`
    pub async fn get_active_realms(&self) -> Result<Vec<String>> {
        self.get_json("/v1/security/realms/active", "active realms").await
    }

    /// `PUT /v1/security/realms/active`
    pub async fn set_active_realms(&self, realms: &[String]) -> Result<()> {
        self.put_json("/v1/security/realms/active", realms)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `GET /v1/security/realms/available`
    pub async fn list_available_realms(&self) -> Result<Vec<RealmApi>> {
        self.get_json("/v1/security/realms/available", "available realms")
            .await
    }

    // Anonymous access

    /// `GET /v1/security/anonymous`
    pub async fn get_anonymous_access(&self) -> Result<AnonymousAccessApi> {
        self.get_json("/v1/security/anonymous", "anonymous access").await
    }

    /// `PUT /v1/security/anonymous`; answers with the stored settings
    pub async fn update_anonymous_access(&self, body: &AnonymousAccessApi) -> Result<AnonymousAccessApi> {
        self.put_json("/v1/security/anonymous", body)
            .await?
            .expect(&[200])?
            .json("anonymous access")
    }

    // Content selectors

    /// `GET /v1/security/content-selectors`
    pub async fn list_content_selectors(&self) -> Result<Vec<ContentSelectorApi>> {
        self.get_json("/v1/security/content-selectors", "content selector list")
            .await
    }

    /// `GET /v1/security/content-selectors/{name}`
    pub async fn get_content_selector(&self, name: &str) -> Result<ContentSelectorApi> {
        self.get_json(
            &format!("/v1/security/content-selectors/{}", name),
            "content selector",
        )
        .await
    }

    /// `POST /v1/security/content-selectors`
    pub async fn create_content_selector(&self, body: &ContentSelectorApi) -> Result<()> {
        self.post_json("/v1/security/content-selectors", body)
            .await?
            .expect(&[200, 201, 204])?;
        Ok(())
    }

    /// `PUT /v1/security/content-selectors/{name}`; the name itself is immutable
    pub async fn update_content_selector(&self, body: &ContentSelectorApi) -> Result<()> {
        let update = ContentSelectorUpdate {
            description: body.description.as_deref(),
            expression: &body.expression,
        };
        self.put_json(
            &format!("/v1/security/content-selectors/{}", body.name),
            &update,
        )
        .await?
        .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/security/content-selectors/{name}`
    pub async fn delete_content_selector(&self, name: &str) -> Result<()> {
        self.delete(&format!("/v1/security/content-selectors/{}", name))
            .await?
            .expect(&[204])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_find_user_filters_prefix_matches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/security/users"))
            .and(query_param("userId", "jdoe"))
            .and(query_param("source", "default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"userId": "jdoe2", "source": "default", "status": "active", "roles": []},
                {"userId": "jdoe", "firstName": "John", "source": "default", "status": "active", "roles": ["nx-admin"]}
            ])))
            .mount(&server)
            .await;

        let client = NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap();
        let user = client.find_user("jdoe", "default").await.unwrap().unwrap();
        assert_eq!(user.first_name, "John");
        assert_eq!(user.roles, vec!["nx-admin".to_string()]);
    }

    #[tokio::test]
    async fn test_content_selector_update_omits_name() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/service/rest/v1/security/content-selectors/raw-only"))
            .and(body_json(json!({"expression": "format == \"raw\""})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap();
        let selector = ContentSelectorApi {
            name: "raw-only".to_string(),
            expression: "format == \"raw\"".to_string(),
            ..Default::default()
        };
        client.update_content_selector(&selector).await.unwrap();
    }

    #[test]
    fn test_user_body_skips_read_only_fields() {
        let user = UserApi {
            user_id: "jdoe".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email_address: "jdoe@example.com".to_string(),
            password: Some("s3cret".to_string()),
            status: "active".to_string(),
            roles: vec!["nx-admin".to_string()],
            ..Default::default()
        };
        let body = serde_json::to_value(&user).unwrap();
        assert!(body.get("source").is_none());
        assert!(body.get("externalRoles").is_none());
        assert_eq!(body["password"], "s3cret");
    }
}
