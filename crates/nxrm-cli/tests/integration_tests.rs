//! Integration tests for CLI commands

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to run nxrm without any server settings from the environment
fn nxrm(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nxrm"))
        .args(args)
        .env_remove("NXRM_SERVER_URL")
        .env_remove("NXRM_SERVER_USERNAME")
        .env_remove("NXRM_SERVER_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute nxrm")
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let file = dir.path().join(name);
    fs::write(&file, content).unwrap();
    file.display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

mod resources_command {
    use super::*;

    #[test]
    fn test_lists_resource_types() {
        let output = nxrm(&["resources"]);
        assert!(output.status.success());
        let out = stdout(&output);
        assert!(out.contains("nxrm_repository_maven_hosted"));
        assert!(out.contains("nxrm_blob_store_file"));
        assert!(!out.contains("nxrm_repositories"));
    }

    #[test]
    fn test_filter_and_data_sources() {
        let output = nxrm(&["resources", "--data-sources", "--filter", "repositories"]);
        assert!(output.status.success());
        let out = stdout(&output);
        assert!(out.contains("nxrm_repositories"));
        assert!(!out.contains("nxrm_blob_store_file"));
    }
}

mod schema_command {
    use super::*;

    #[test]
    fn test_schema_is_json() {
        let output = nxrm(&["schema", "nxrm_blob_store_file"]);
        assert!(output.status.success(), "{}", stderr(&output));
        let schema: serde_json::Value =
            serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");
        assert!(schema["attributes"].get("name").is_some());
        assert!(schema["attributes"].get("path").is_some());
    }

    #[test]
    fn test_unknown_type_suggests() {
        let output = nxrm(&["schema", "nxrm_blob_store_fil"]);
        assert_eq!(output.status.code(), Some(64));
        assert!(stderr(&output).contains("nxrm_blob_store_file"));
    }
}

mod plan_command {
    use super::*;

    #[test]
    fn test_offline_create_plan() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "bs.yaml", "name: bs-a\npath: /data/a\n");

        let output = nxrm(&["plan", "nxrm_blob_store_file", "-f", &config]);
        assert!(output.status.success(), "{}", stderr(&output));
        let out = stdout(&output);
        assert!(out.contains("will"));
        assert!(out.contains("/data/a"));
    }

    #[test]
    fn test_no_changes_against_state() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "bs.yaml", "name: bs-a\npath: /data/a\n");
        let state = write(
            &dir,
            "state.json",
            r#"{"name": "bs-a", "path": "/data/a", "soft_quota": null, "last_updated": "Friday, 16-Oct-26 10:00:00 UTC"}"#,
        );

        let output = nxrm(&["plan", "nxrm_blob_store_file", "-f", &config, "-s", &state, "--json"]);
        assert!(output.status.success(), "{}", stderr(&output));
        let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
        assert_eq!(plan["has_changes"], false);
    }

    #[test]
    fn test_invalid_document_exits_with_validation_error() {
        let dir = TempDir::new().unwrap();
        let config = write(&dir, "group.yaml", "name: bs-g\nfill_policy: roundRobin\nmembers: []\n");

        let output = nxrm(&["plan", "nxrm_blob_store_group", "-f", &config]);
        assert_eq!(output.status.code(), Some(2));
        assert!(stderr(&output).contains("cannot be empty"));
    }
}

mod apply_command {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/status"))
            .respond_with(ResponseTemplate::new(200).insert_header("Server", "Nexus/3.84.0-03 (PRO)"))
            .mount(&server)
            .await;
        server
    }

    fn connected(server: &MockServer, args: &[&str]) -> Output {
        let uri = server.uri();
        let mut all = vec!["--url", uri.as_str(), "--username", "admin", "--password", "admin123"];
        all.extend_from_slice(args);
        nxrm(&all)
    }

    fn state_of(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_apply_then_destroy() {
        let server = server().await;
        Mock::given(method("POST"))
            .and(path("/service/rest/v1/blobstores/file"))
            .and(body_json(json!({"name": "bs-a", "path": "/data/a"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/blobstores/file/bs-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"path": "/data/a"})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/service/rest/v1/blobstores/bs-a"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = write(&dir, "bs.yaml", "name: bs-a\npath: /data/a\n");
        let state_path = dir.path().join("state.json");
        let state = state_path.display().to_string();

        let output = connected(&server, &["apply", "nxrm_blob_store_file", "-f", &config, "-s", &state]);
        assert!(output.status.success(), "{}", stderr(&output));
        let recorded = state_of(&state_path);
        assert_eq!(recorded["name"], "bs-a");
        assert_eq!(recorded["path"], "/data/a");

        // Second apply converges without another POST
        let output = connected(&server, &["apply", "nxrm_blob_store_file", "-f", &config, "-s", &state]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stdout(&output).contains("No changes"));

        let output = connected(&server, &["destroy", "nxrm_blob_store_file", "-s", &state]);
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(!state_path.exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unreachable_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/status"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let output = connected(&server, &["data", "nxrm_repositories"]);
        assert_eq!(output.status.code(), Some(4));
    }
}
