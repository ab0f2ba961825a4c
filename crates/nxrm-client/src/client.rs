//! Authenticated HTTP client for the admin REST API

use std::time::Duration;

use nxrm_core::ServerVersion;
use reqwest::header::{CONTENT_TYPE, SERVER};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// A response whose status has not been judged yet
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    /// Value of the `Server` header, when present
    pub server: Option<String>,
    pub body: String,
}

#[derive(Deserialize)]
struct ValidationEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode {
            what: what.to_string(),
            message: e.to_string(),
        })
    }

    /// The error message carried by the body.
    ///
    /// The server answers with a list of validation entries, an object with a
    /// `message`, or plain text.
    pub fn error_message(&self) -> String {
        let body = self.body.trim();
        if let Ok(entries) = serde_json::from_str::<Vec<ValidationEntry>>(body) {
            return entries
                .into_iter()
                .map(|e| match e.id {
                    Some(id) if !id.is_empty() && id != "*" => format!("{}: {}", id, e.message),
                    _ => e.message,
                })
                .collect::<Vec<_>>()
                .join("; ");
        }
        if let Ok(object) = serde_json::from_str::<MessageBody>(body) {
            return object.message;
        }
        body.to_string()
    }

    pub fn into_error(self) -> ClientError {
        ClientError::Api {
            message: self.error_message(),
            status: self.status,
            status_text: self.status_text,
        }
    }

    /// Accept only the listed statuses
    pub fn expect(self, codes: &[u16]) -> Result<Self> {
        if codes.contains(&self.status) {
            Ok(self)
        } else {
            Err(self.into_error())
        }
    }
}

/// Request body
enum Body<'a, B: Serialize + ?Sized> {
    None,
    Json(&'a B),
    Text(&'a str),
}

/// Client for one server
#[derive(Debug, Clone)]
pub struct NxrmClient {
    http: reqwest::Client,
    config: ClientConfig,
    root: String,
}

impl NxrmClient {
    /// Create a client; the configuration is validated first
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(concat!("nxrm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidConfig {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            root: config.api_root(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for an API path such as `/v1/repositories`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Body<'_, B>,
    ) -> Result<ApiResponse> {
        let mut request = self.request(method.clone(), path);
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match body {
            Body::None => request,
            Body::Json(value) => request.json(value),
            Body::Text(text) => request
                .header(CONTENT_TYPE, "text/plain")
                .body(text.to_string()),
        };

        tracing::debug!(%method, path, "sending request");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    seconds: self.config.timeout,
                }
            } else {
                ClientError::from(e)
            }
        })?;

        let status = response.status();
        let server = response
            .headers()
            .get(SERVER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        tracing::debug!(%method, path, status = status.as_u16(), "received response");

        Ok(ApiResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            server,
            body,
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send::<()>(Method::GET, path, &[], Body::None).await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        self.send::<()>(Method::GET, path, query, Body::None).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(Method::POST, path, &[], Body::Json(body)).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(Method::PUT, path, &[], Body::Json(body)).await
    }

    pub async fn put_text(&self, path: &str, body: &str) -> Result<ApiResponse> {
        self.send::<()>(Method::PUT, path, &[], Body::Text(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send::<()>(Method::DELETE, path, &[], Body::None).await
    }

    pub async fn delete_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        self.send::<()>(Method::DELETE, path, query, Body::None).await
    }

    /// GET a JSON document, accepting only 200
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        self.get(path).await?.expect(&[200])?.json(what)
    }

    /// Read the server version from the `Server` header of `GET /v1/status`.
    ///
    /// Returns `None` when the header is missing or unrecognized; callers
    /// treat an undetected version as "no gate applies".
    pub async fn server_version(&self) -> Result<Option<ServerVersion>> {
        let response = self.get("/v1/status").await?;
        if response.status == 401 || response.status == 403 {
            return Err(response.into_error());
        }
        let version = response
            .server
            .as_deref()
            .and_then(|header| ServerVersion::parse_header(header).ok());
        match &version {
            Some(v) => tracing::debug!(version = %v, "detected server version"),
            None => tracing::warn!("server did not report a recognizable version"),
        }
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            status_text: String::new(),
            server: None,
            body: body.to_string(),
        }
    }

    async fn client(server: &MockServer) -> NxrmClient {
        NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap()
    }

    #[test]
    fn test_error_message_validation_list() {
        let r = response(
            400,
            r#"[{"id":"PARAMETER name","message":"must not be empty"},{"id":"*","message":"bad request"}]"#,
        );
        assert_eq!(r.error_message(), "PARAMETER name: must not be empty; bad request");
    }

    #[test]
    fn test_error_message_object_and_text() {
        assert_eq!(response(500, r#"{"message":"oops"}"#).error_message(), "oops");
        assert_eq!(response(500, "Blob store in use").error_message(), "Blob store in use");
    }

    #[test]
    fn test_expect() {
        assert!(response(204, "").expect(&[204]).is_ok());
        let err = response(409, "conflict").expect(&[201]).unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.message(), "conflict");
    }

    #[tokio::test]
    async fn test_basic_auth_and_api_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/security/realms/active"))
            .and(basic_auth("admin", "admin123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(["NexusAuthenticatingRealm"]))
            .expect(1)
            .mount(&server)
            .await;

        let realms: Vec<String> = client(&server)
            .await
            .get_json("/v1/security/realms/active", "active realms")
            .await
            .unwrap();
        assert_eq!(realms, vec!["NexusAuthenticatingRealm".to_string()]);
    }

    #[tokio::test]
    async fn test_server_version_from_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/status"))
            .respond_with(ResponseTemplate::new(200).insert_header("Server", "Nexus/3.76.0-03 (PRO)"))
            .mount(&server)
            .await;

        let version = client(&server).await.server_version().await.unwrap().unwrap();
        assert_eq!(version.to_string(), "3.76.0-03");
        assert!(version.is_pro());
    }

    #[tokio::test]
    async fn test_server_version_missing_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/status"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(client(&server).await.server_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_text_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/service/rest/v1/security/users/jdoe/change-password"))
            .and(header("content-type", "text/plain"))
            .and(body_string("s3cret"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/service/rest/v1/security/users/jdoe"))
            .and(query_param("realm", "default"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let c = client(&server).await;
        let r = c
            .put_text("/v1/security/users/jdoe/change-password", "s3cret")
            .await
            .unwrap();
        assert_eq!(r.status, 204);
        let r = c
            .delete_with_query("/v1/security/users/jdoe", &[("realm", "default")])
            .await
            .unwrap();
        assert_eq!(r.status, 204);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let config = ClientConfig::new("http://127.0.0.1:9", "admin", "admin123");
        let err = NxrmClient::new(config).unwrap().get("/v1/status").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
