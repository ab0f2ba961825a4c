//! End-to-end lifecycle tests against a mocked server

use nxrm_client::ClientConfig;
use nxrm_provider::Provider;
use serde_json::{json, Value as JsonValue};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API: &str = "/service/rest";

/// Mock server reporting the given version on the status endpoint
async fn server_at(version: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/v1/status", API)))
        .respond_with(ResponseTemplate::new(200).insert_header("Server", format!("Nexus/{} (PRO)", version)))
        .mount(&server)
        .await;
    server
}

async fn server() -> MockServer {
    server_at("3.84.0-03").await
}

async fn provider(server: &MockServer) -> Provider {
    let mut provider = Provider::new();
    let diags = provider
        .configure_client(ClientConfig::new(server.uri(), "admin", "admin123"))
        .await;
    assert!(!diags.has_error(), "{:?}", diags);
    provider
}

fn planned(provider: &Provider, type_name: &str, prior: Option<&JsonValue>, config: JsonValue) -> JsonValue {
    let plan = provider.plan(type_name, prior, &config).unwrap();
    assert!(!plan.diagnostics.has_error(), "{:?}", plan.diagnostics);
    plan.planned_state
}

fn api(p: &str) -> String {
    format!("{}{}", API, p)
}

mod configure {
    use super::*;

    #[tokio::test]
    async fn test_configure_reads_version() {
        let server = server().await;
        let mut provider = Provider::new();
        let diags = provider
            .configure(&json!({
                "url": server.uri(),
                "username": "admin",
                "password": "admin123"
            }))
            .await;
        assert!(!diags.has_error(), "{:?}", diags);
        let version = provider.version().unwrap();
        assert_eq!((version.major, version.minor), (3, 84));
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(api("/v1/status")))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let mut provider = Provider::new();
        let diags = provider
            .configure_client(ClientConfig::new(server.uri(), "admin", "wrong"))
            .await;
        assert!(diags.has_error());
        assert!(provider.version().is_none());
    }
}

mod file_blob_store {
    use super::*;

    const TYPE: &str = "nxrm_blob_store_file";

    fn read_body(p: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"path": p}))
    }

    async fn create(server: &MockServer, provider: &Provider) -> JsonValue {
        Mock::given(method("POST"))
            .and(path(api("/v1/blobstores/file")))
            .and(body_json(json!({"name": "bs-a", "path": "/data/a"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("/v1/blobstores/file/bs-a")))
            .respond_with(read_body("/data/a"))
            .mount(server)
            .await;

        let plan = planned(provider, TYPE, None, json!({"name": "bs-a", "path": "/data/a"}));
        let response = provider.create(TYPE, &plan).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        response.state.unwrap()
    }

    #[tokio::test]
    async fn test_create() {
        let server = server().await;
        let provider = provider(&server).await;
        let state = create(&server, &provider).await;

        assert_eq!(state["name"], "bs-a");
        assert_eq!(state["path"], "/data/a");
        assert!(state["soft_quota"].is_null());
        assert!(!state["last_updated"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_read_after_create_is_stable() {
        let server = server().await;
        let provider = provider(&server).await;
        let state = create(&server, &provider).await;

        let read = provider.read(TYPE, &state).await.unwrap();
        assert!(read.diagnostics.is_empty());
        assert_eq!(read.state.unwrap(), state);

        let plan = provider
            .plan(TYPE, Some(&state), &json!({"name": "bs-a", "path": "/data/a"}))
            .unwrap();
        assert!(!plan.has_changes);
    }

    #[tokio::test]
    async fn test_update_path() {
        let server = server().await;
        let provider = provider(&server).await;
        let prior = create(&server, &provider).await;
        server.reset().await;

        Mock::given(method("PUT"))
            .and(path(api("/v1/blobstores/file/bs-a")))
            .and(body_json(json!({"name": "bs-a", "path": "/data/a2"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("/v1/blobstores/file/bs-a")))
            .respond_with(read_body("/data/a2"))
            .mount(&server)
            .await;

        let plan = planned(&provider, TYPE, Some(&prior), json!({"name": "bs-a", "path": "/data/a2"}));
        let response = provider.update(TYPE, &plan, &prior).await.unwrap();
        assert!(!response.diagnostics.has_error(), "{:?}", response.diagnostics);
        assert_eq!(response.state.unwrap()["path"], "/data/a2");
    }

    #[tokio::test]
    async fn test_delete_twice_warns() {
        let server = server().await;
        let provider = provider(&server).await;
        Mock::given(method("DELETE"))
            .and(path(api("/v1/blobstores/bs-a")))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(api("/v1/blobstores/bs-a")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let state = json!({"name": "bs-a", "path": "/data/a", "soft_quota": null, "last_updated": "x"});
        let first = provider.delete(TYPE, &state).await.unwrap();
        assert!(first.diagnostics.is_empty());

        let second = provider.delete(TYPE, &state).await.unwrap();
        assert!(!second.diagnostics.has_error());
        assert_eq!(second.diagnostics.warnings().count(), 1);
    }

    #[tokio::test]
    async fn test_vanished_upstream_drops_state() {
        let server = server().await;
        let provider = provider(&server).await;
        Mock::given(method("GET"))
            .and(path(api("/v1/blobstores/file/bs-a")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let state = json!({"name": "bs-a", "path": "/data/a", "soft_quota": null, "last_updated": "x"});
        let read = provider.read(TYPE, &state).await.unwrap();
        assert!(read.state.is_none());
        assert!(!read.diagnostics.has_error());
        assert!(read.diagnostics.contains("removed from state"));
    }

    // Real clock: a paused one auto-advances past the request timeout while
    // the mock response is in flight.
    #[tokio::test]
    async fn test_delete_retried_on_server_error() {
        let server = server().await;
        let provider = provider(&server).await;
        Mock::given(method("DELETE"))
            .and(path(api("/v1/blobstores/bs-a")))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(api("/v1/blobstores/bs-a")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let state = json!({"name": "bs-a", "path": "/data/a", "soft_quota": null, "last_updated": "x"});
        let response = provider.delete(TYPE, &state).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    }

    #[tokio::test]
    async fn test_lookup_data_source() {
        let server = server().await;
        let provider = provider(&server).await;
        Mock::given(method("GET"))
            .and(path(api("/v1/blobstores/file/bs-a")))
            .respond_with(read_body("/data/a"))
            .mount(&server)
            .await;

        let read = provider
            .read_data_source(TYPE, &json!({"name": "bs-a"}))
            .await
            .unwrap();
        assert!(!read.diagnostics.has_error(), "{:?}", read.diagnostics);
        assert_eq!(read.state.unwrap()["path"], "/data/a");
    }
}

mod group_blob_store {
    use super::*;

    #[test]
    fn test_empty_members_rejected_at_plan() {
        let provider = Provider::new();
        let plan = provider
            .plan(
                "nxrm_blob_store_group",
                None,
                &json!({"name": "bs-g", "fill_policy": "roundRobin", "members": []}),
            )
            .unwrap();
        assert!(plan.diagnostics.has_error());
        assert!(plan.diagnostics.contains("cannot be empty"));
    }
}

mod maven_hosted {
    use super::*;

    const TYPE: &str = "nxrm_repository_maven_hosted";

    fn config() -> JsonValue {
        json!({
            "name": "mvn-h",
            "online": true,
            "storage": {"blob_store_name": "default", "write_policy": "ALLOW_ONCE"},
            "maven": {
                "version_policy": "RELEASE",
                "layout_policy": "STRICT",
                "content_disposition": "ATTACHMENT"
            }
        })
    }

    #[tokio::test]
    async fn test_create() {
        let server = server().await;
        let provider = provider(&server).await;
        Mock::given(method("POST"))
            .and(path(api("/v1/repositories/maven/hosted")))
            .and(body_json(json!({
                "name": "mvn-h",
                "online": true,
                "storage": {"blobStoreName": "default", "strictContentTypeValidation": true, "writePolicy": "ALLOW_ONCE"},
                "component": {"proprietaryComponents": false},
                "maven": {"versionPolicy": "RELEASE", "layoutPolicy": "STRICT", "contentDisposition": "ATTACHMENT"}
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("/v1/repositories/maven/hosted/mvn-h")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "mvn-h",
                "format": "maven2",
                "type": "hosted",
                "url": format!("{}/repository/mvn-h", server.uri()),
                "online": true,
                "storage": {"blobStoreName": "default", "strictContentTypeValidation": true, "writePolicy": "ALLOW_ONCE"},
                "cleanup": null,
                "component": {"proprietaryComponents": false},
                "maven": {"versionPolicy": "RELEASE", "layoutPolicy": "STRICT", "contentDisposition": "ATTACHMENT"}
            })))
            .mount(&server)
            .await;

        let plan = planned(&provider, TYPE, None, config());
        let response = provider.create(TYPE, &plan).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state.unwrap();

        assert_eq!(state["name"], "mvn-h");
        assert_eq!(state["online"], true);
        assert_eq!(state["format"], "maven2");
        assert_eq!(state["type"], "hosted");
        assert_eq!(state["storage"]["blob_store_name"], "default");
        assert_eq!(state["storage"]["write_policy"], "ALLOW_ONCE");
        assert_eq!(state["component"]["proprietary_components"], false);
        assert_eq!(state["maven"]["version_policy"], "RELEASE");
        assert_eq!(state["maven"]["layout_policy"], "STRICT");
        assert_eq!(state["maven"]["content_disposition"], "ATTACHMENT");
    }

    #[test]
    fn test_rename_replaces() {
        let provider = Provider::new();
        let prior = json!({
            "name": "mvn-h",
            "online": true,
            "format": "maven2",
            "type": "hosted",
            "url": "http://localhost:8081/repository/mvn-h",
            "storage": {"blob_store_name": "default", "strict_content_type_validation": true, "write_policy": "ALLOW_ONCE"},
            "cleanup": null,
            "component": {"proprietary_components": false},
            "maven": {"version_policy": "RELEASE", "layout_policy": "STRICT", "content_disposition": "ATTACHMENT"},
            "last_updated": "Monday, 12-Oct-26 09:00:00 UTC"
        });
        let mut config = config();
        config["name"] = json!("mvn-h2");
        let plan = provider.plan(TYPE, Some(&prior), &config).unwrap();
        assert!(plan.requires_replace.iter().any(|p| p == "name"));
    }
}

mod npm_proxy_firewall {
    use super::*;

    const TYPE: &str = "nxrm_repository_npm_proxy";
    const CAPABILITY: &str = "firewall.audit-quarantine";

    fn config(firewall: Option<JsonValue>) -> JsonValue {
        let mut config = json!({
            "name": "npm-p",
            "storage": {"blob_store_name": "default"},
            "proxy": {
                "remote_url": "https://registry.npmjs.org",
                "content_max_age": 1440,
                "metadata_max_age": 1440
            },
            "negative_cache": {"enabled": true, "time_to_live": 1440},
            "http_client": {"blocked": false, "auto_block": true}
        });
        if let Some(block) = firewall {
            config["firewall_audit_and_quarantine"] = block;
        }
        config
    }

    fn capability(quarantine: &str) -> JsonValue {
        json!({
            "id": "cap-1",
            "type": CAPABILITY,
            "notes": "",
            "enabled": true,
            "properties": {"repository": "npm-p", "quarantine": quarantine, "pccsEnabled": "false"}
        })
    }

    async fn mount_repository_read(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(api("/v1/repositories/npm/proxy/npm-p")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "npm-p",
                "format": "npm",
                "type": "proxy",
                "url": "http://localhost:8081/repository/npm-p",
                "online": true,
                "storage": {"blobStoreName": "default", "strictContentTypeValidation": true},
                "cleanup": null,
                "proxy": {"remoteUrl": "https://registry.npmjs.org", "contentMaxAge": 1440, "metadataMaxAge": 1440},
                "negativeCache": {"enabled": true, "timeToLive": 1440},
                "httpClient": {"blocked": false, "autoBlock": true, "connection": null, "authentication": null},
                "routingRuleName": null,
                "npm": {"removeQuarantined": false}
            })))
            .mount(server)
            .await;
    }

    async fn create(server: &MockServer, provider: &Provider) -> JsonValue {
        Mock::given(method("POST"))
            .and(path(api("/v1/repositories/npm/proxy")))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("/v1/capabilities")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path(api("/v1/capabilities")))
            .respond_with(ResponseTemplate::new(201).set_body_json(capability("true")))
            .expect(1)
            .mount(server)
            .await;
        mount_repository_read(server).await;

        let plan = planned(
            provider,
            TYPE,
            None,
            config(Some(json!({"enabled": true, "quarantine": true, "pccs_enabled": false}))),
        );
        let response = provider.create(TYPE, &plan).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        response.state.unwrap()
    }

    #[tokio::test]
    async fn test_create_pairs_capability() {
        let server = server().await;
        let provider = provider(&server).await;
        let state = create(&server, &provider).await;

        let firewall = &state["firewall_audit_and_quarantine"];
        assert_eq!(firewall["capability_id"], "cap-1");
        assert_eq!(firewall["quarantine"], true);
        assert_eq!(firewall["pccs_enabled"], false);

        let requests = server.received_requests().await.unwrap();
        let position = |m: &str, p: &str| {
            requests
                .iter()
                .position(|r| r.method.as_str() == m && r.url.path() == api(p))
                .unwrap()
        };
        assert!(position("POST", "/v1/repositories/npm/proxy") < position("POST", "/v1/capabilities"));
    }

    #[tokio::test]
    async fn test_quarantine_change_updates_capability() {
        let server = server().await;
        let provider = provider(&server).await;
        let prior = create(&server, &provider).await;
        server.reset().await;

        Mock::given(method("PUT"))
            .and(path(api("/v1/repositories/npm/proxy/npm-p")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("/v1/capabilities")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([capability("true")])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(api("/v1/capabilities/cap-1")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(api("/v1/capabilities")))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        mount_repository_read(&server).await;

        let plan = planned(
            &provider,
            TYPE,
            Some(&prior),
            config(Some(json!({"enabled": true, "quarantine": false, "pccs_enabled": false}))),
        );
        let response = provider.update(TYPE, &plan, &prior).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let firewall = &response.state.unwrap()["firewall_audit_and_quarantine"];
        assert_eq!(firewall["quarantine"], false);
        assert_eq!(firewall["capability_id"], "cap-1");
    }

    #[tokio::test]
    async fn test_removing_block_deletes_capability_only() {
        let server = server().await;
        let provider = provider(&server).await;
        let prior = create(&server, &provider).await;
        server.reset().await;

        Mock::given(method("PUT"))
            .and(path(api("/v1/repositories/npm/proxy/npm-p")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(api("/v1/capabilities/cap-1")))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(api("/v1/repositories/npm-p")))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;
        mount_repository_read(&server).await;

        let plan = planned(&provider, TYPE, Some(&prior), config(None));
        let response = provider.update(TYPE, &plan, &prior).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state.unwrap();
        assert_eq!(state["name"], "npm-p");
        assert!(state["firewall_audit_and_quarantine"].is_null());
    }
}

mod version_gates {
    use super::*;

    #[tokio::test]
    async fn test_gated_field_rejected_without_upstream_call() {
        let server = server_at("3.76.0-03").await;
        let provider = provider(&server).await;

        let plan = provider
            .plan(
                "nxrm_repository_docker_hosted",
                None,
                &json!({
                    "name": "docker-h",
                    "storage": {"blob_store_name": "default"},
                    "docker": {"path_enabled": true}
                }),
            )
            .unwrap();
        assert!(plan.diagnostics.has_error());
        assert!(plan.diagnostics.contains("docker.path_enabled"));

        // Only the version check reached the server
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resource_below_minimum_version() {
        let server = server_at("3.76.0-03").await;
        let provider = provider(&server).await;

        let plan = provider
            .plan(
                "nxrm_task_blobstore_compact",
                None,
                &json!({
                    "name": "compact-default",
                    "frequency": {"schedule": "manual"},
                    "properties": {"blob_store_name": "default"}
                }),
            )
            .unwrap();
        assert!(plan.diagnostics.has_error());
        assert!(plan.diagnostics.contains("is not supported by this server"));
    }
}

mod compact_task {
    use super::*;

    const TYPE: &str = "nxrm_task_blobstore_compact";

    #[tokio::test]
    async fn test_create_with_cron_schedule() {
        let server = server().await;
        let provider = provider(&server).await;
        let task = json!({
            "id": "task-1",
            "type": "blobstore.compact",
            "name": "compact-default",
            "enabled": true,
            "notificationCondition": "FAILURE",
            "frequency": {"schedule": "cron", "cronExpression": "0 0 3 * * ?"},
            "properties": {"blobstoreName": "default", "blobsOlderThan": "8"}
        });
        Mock::given(method("POST"))
            .and(path(api("/v1/tasks")))
            .respond_with(ResponseTemplate::new(201).set_body_json(task.clone()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(api("/v1/tasks/task-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(task))
            .mount(&server)
            .await;

        let plan = planned(
            &provider,
            TYPE,
            None,
            json!({
                "name": "compact-default",
                "frequency": {"schedule": "cron", "cron_expression": "0 0 3 * * ?"},
                "properties": {"blob_store_name": "default", "blobs_older_than": 8}
            }),
        );
        let response = provider.create(TYPE, &plan).await.unwrap();
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state.unwrap();
        assert_eq!(state["id"], "task-1");
        assert_eq!(state["frequency"]["schedule"], "cron");
        assert_eq!(state["frequency"]["cron_expression"], "0 0 3 * * ?");
        assert_eq!(state["properties"]["blob_store_name"], "default");
        assert_eq!(state["properties"]["blobs_older_than"], 8);
    }
}

mod user {
    use super::*;

    const TYPE: &str = "nxrm_user";

    async fn mount_alice(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(api("/v1/security/users")))
            .and(query_param("userId", "alice"))
            .and(query_param("source", "default"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "userId": "alice",
                "firstName": "Alice",
                "lastName": "Liddell",
                "emailAddress": "alice@example.com",
                "source": "default",
                "status": "active",
                "readOnly": false,
                "roles": ["nx-admin"],
                "externalRoles": []
            }])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_import_by_id_and_source() {
        let server = server().await;
        let provider = provider(&server).await;
        mount_alice(&server).await;

        let imported = provider.import(TYPE, "alice,default").await.unwrap();
        assert!(imported.diagnostics.is_empty(), "{:?}", imported.diagnostics);
        let state = imported.state.unwrap();
        assert_eq!(state["user_id"], "alice");
        assert_eq!(state["source"], "default");
        assert_eq!(state["email"], "alice@example.com");
        assert_eq!(state["roles"], json!(["nx-admin"]));
        assert!(state["password"].is_null());

        let refreshed = provider.read(TYPE, &state).await.unwrap();
        assert_eq!(refreshed.state.unwrap(), state);
    }

    #[tokio::test]
    async fn test_refresh_keeps_password() {
        let server = server().await;
        let provider = provider(&server).await;
        mount_alice(&server).await;

        let state = json!({
            "user_id": "alice",
            "first_name": "Alice",
            "last_name": "Liddell",
            "email": "alice@example.com",
            "password": "s3cret",
            "status": "active",
            "source": "default",
            "roles": ["nx-admin"],
            "read_only": false
        });
        let read = provider.read(TYPE, &state).await.unwrap();
        assert_eq!(read.state.unwrap()["password"], "s3cret");
    }

    #[test]
    fn test_identity_change_forces_replacement() {
        let provider = Provider::new();
        let prior = json!({
            "user_id": "alice",
            "first_name": "Alice",
            "last_name": "Liddell",
            "email": "alice@example.com",
            "password": "s3cret",
            "status": "active",
            "source": "default",
            "roles": ["nx-admin"],
            "read_only": false
        });
        let config = |user_id: &str, source: &str| {
            json!({
                "user_id": user_id,
                "first_name": "Alice",
                "last_name": "Liddell",
                "email": "alice@example.com",
                "password": "s3cret",
                "source": source,
                "roles": ["nx-admin"]
            })
        };

        let unchanged = provider.plan(TYPE, Some(&prior), &config("alice", "default")).unwrap();
        assert!(!unchanged.diagnostics.has_error(), "{:?}", unchanged.diagnostics);
        assert!(unchanged.requires_replace.is_empty());

        let moved = provider.plan(TYPE, Some(&prior), &config("alice", "ldap")).unwrap();
        assert!(!moved.diagnostics.has_error(), "{:?}", moved.diagnostics);
        assert!(moved.has_changes);
        assert_eq!(moved.requires_replace, vec!["source".to_string()]);

        let renamed = provider.plan(TYPE, Some(&prior), &config("alice2", "default")).unwrap();
        assert_eq!(renamed.requires_replace, vec!["user_id".to_string()]);
    }

    #[tokio::test]
    async fn test_import_missing_user_fails() {
        let server = server().await;
        let provider = provider(&server).await;
        Mock::given(method("GET"))
            .and(path(api("/v1/security/users")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let imported = provider.import(TYPE, "bob,default").await.unwrap();
        assert!(imported.state.is_none());
        assert!(imported.diagnostics.contains("Cannot import non-existent remote object"));
    }
}
