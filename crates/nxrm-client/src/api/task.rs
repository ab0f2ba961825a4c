//! Scheduled task wire types and endpoints

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::NxrmClient;
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskFrequency {
    pub schedule: String,
    /// Epoch seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone_offset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_days: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
}

/// Task template as created, updated and read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    /// Absent from single-task reads on some server versions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<TaskFrequency>,
    pub properties: BTreeMap<String, String>,
    #[serde(skip_serializing)]
    pub current_state: Option<String>,
    #[serde(skip_serializing)]
    pub last_run_result: Option<String>,
    #[serde(skip_serializing)]
    pub next_run: Option<String>,
    #[serde(skip_serializing)]
    pub last_run: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TaskPage {
    items: Vec<TaskApi>,
    continuation_token: Option<String>,
}

impl NxrmClient {
    /// `GET /v1/tasks`, following continuation tokens
    pub async fn list_tasks(&self) -> Result<Vec<TaskApi>> {
        let mut tasks = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let response = match &token {
                Some(t) => self.get_with_query("/v1/tasks", &[("continuationToken", t.as_str())]).await?,
                None => self.get("/v1/tasks").await?,
            };
            let page: TaskPage = response.expect(&[200])?.json("task list")?;
            tasks.extend(page.items);
            match page.continuation_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }
        Ok(tasks)
    }

    /// `GET /v1/tasks/{id}`
    pub async fn get_task(&self, id: &str) -> Result<TaskApi> {
        self.get_json(&format!("/v1/tasks/{}", id), "task").await
    }

    /// `POST /v1/tasks`; the response carries the assigned id
    pub async fn create_task(&self, body: &TaskApi) -> Result<TaskApi> {
        self.post_json("/v1/tasks", body)
            .await?
            .expect(&[200, 201])?
            .json("created task")
    }

    /// `PUT /v1/tasks/{id}`
    pub async fn update_task(&self, id: &str, body: &TaskApi) -> Result<()> {
        self.put_json(&format!("/v1/tasks/{}", id), body)
            .await?
            .expect(&[204])?;
        Ok(())
    }

    /// `DELETE /v1/tasks/{id}`
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        self.delete(&format!("/v1/tasks/{}", id))
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
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_tasks_follows_continuation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/tasks"))
            .and(query_param("continuationToken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "t2", "type": "tasklog.cleanup", "name": "cleanup"}],
                "continuationToken": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/service/rest/v1/tasks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "t1", "type": "blobstore.compact", "name": "compact", "currentState": "WAITING"}],
                "continuationToken": "page2"
            })))
            .mount(&server)
            .await;

        let client = NxrmClient::new(ClientConfig::new(server.uri(), "admin", "admin123")).unwrap();
        let tasks = client.list_tasks().await.unwrap();
        let ids: Vec<_> = tasks.iter().filter_map(|t| t.id.as_deref()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
        assert_eq!(tasks[0].current_state.as_deref(), Some("WAITING"));
    }

    #[test]
    fn test_frequency_body() {
        let task = TaskApi {
            kind: "blobstore.compact".to_string(),
            name: "compact".to_string(),
            enabled: Some(true),
            frequency: Some(TaskFrequency {
                schedule: "cron".to_string(),
                cron_expression: Some("0 0 1 * * ?".to_string()),
                ..Default::default()
            }),
            current_state: Some("WAITING".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "type": "blobstore.compact",
                "name": "compact",
                "enabled": true,
                "frequency": {"schedule": "cron", "cronExpression": "0 0 1 * * ?"},
                "properties": {}
            })
        );
    }
}
