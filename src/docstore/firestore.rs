//! Firestore REST v1 client
//!
//! Tasks live in `artifacts/{app_id}/public/data/tasks`, one document per
//! task, with the field names the existing web front end reads
//! (`user_id`, `description`, `done`, `priority`).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use super::TaskStore;
use crate::error::{Result, TickError};
use crate::model::{NewTask, Priority, WebTask};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const COLLECTION_ID: &str = "tasks";
/// Firestore rejects longer document ids.
const MAX_ID_BYTES: usize = 1500;
/// Title shown for stored documents that carry no description.
const UNTITLED: &str = "Untitled task";

/// Firestore document as returned by the REST API
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
    #[serde(default, skip_serializing)]
    create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    update_time: Option<DateTime<Utc>>,
}

/// One element of a `:runQuery` response stream
#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    document: Option<Document>,
}

pub struct FirestoreStore {
    client: reqwest::Client,
    /// `.../documents/artifacts/{app_id}/public/data`
    parent_url: Url,
    access_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(
        base_url: &str,
        project_id: &str,
        app_id: &str,
        access_token: Option<String>,
    ) -> Result<Self> {
        let parent_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents/artifacts/{}/public/data",
            base_url.trim_end_matches('/'),
            project_id,
            app_id
        );
        let parent_url = Url::parse(&parent_url)
            .map_err(|e| TickError::config(format!("invalid firestore url '{}': {}", base_url, e)))?;
        if parent_url.cannot_be_a_base() {
            return Err(TickError::config(format!(
                "invalid firestore url '{}': not a hierarchical url",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TickError::config(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            client,
            parent_url,
            access_token,
        })
    }

    fn collection_url(&self) -> Url {
        self.child_url(&[COLLECTION_ID])
    }

    /// `None` for ids Firestore would never have assigned; such a document
    /// cannot exist.
    fn document_url(&self, id: &str) -> Option<Url> {
        is_valid_document_id(id).then(|| self.child_url(&[COLLECTION_ID, id]))
    }

    fn child_url(&self, segments: &[&str]) -> Url {
        let mut url = self.parent_url.clone();
        // `new` rejected cannot-be-a-base urls, so this always applies.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn query_url(&self) -> String {
        format!("{}:runQuery", self.parent_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl TaskStore for FirestoreStore {
    async fn insert(&self, owner: &str, new: NewTask) -> Result<WebTask> {
        // Firestore assigns the id; the placeholder is replaced from `name`.
        let draft = WebTask::new(String::new(), owner, new);
        let response = self
            .authed(self.client.post(self.collection_url()))
            .json(&to_document(&draft))
            .send()
            .await?;
        let response = check(response, "create").await?;
        let doc: Document = response.json().await?;
        from_document(doc)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<WebTask>> {
        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": COLLECTION_ID }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": "user_id" },
                        "op": "EQUAL",
                        "value": { "stringValue": owner }
                    }
                }
            }
        });

        let response = self
            .authed(self.client.post(self.query_url()))
            .json(&query)
            .send()
            .await?;
        let response = check(response, "query").await?;
        let results: Vec<QueryResult> = response.json().await?;

        results
            .into_iter()
            .filter_map(|r| r.document)
            .map(from_document)
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Option<WebTask>> {
        let Some(url) = self.document_url(id) else {
            return Ok(None);
        };
        let response = self
            .authed(self.client.get(url))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response, "get").await?;
        let doc: Document = response.json().await?;
        from_document(doc).map(Some)
    }

    async fn put(&self, task: &WebTask) -> Result<()> {
        let Some(url) = self.document_url(&task.id) else {
            return Err(TickError::not_found(format!("task {}", task.id)));
        };
        let response = self
            .authed(self.client.patch(url))
            .query(&[("currentDocument.exists", "true")])
            .json(&to_document(task))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(TickError::not_found(format!("task {}", task.id)));
        }
        check(response, "update").await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let Some(url) = self.document_url(id) else {
            return Ok(false);
        };
        let response = self
            .authed(self.client.delete(url))
            .query(&[("currentDocument.exists", "true")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check(response, "delete").await?;
        Ok(true)
    }
}

async fn check(response: reqwest::Response, op: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, op, body = %body, "firestore request failed");
    Err(TickError::upstream(format!("firestore {} returned {}", op, status)))
}

/// Firestore document id rules: no `/`, not `.` or `..`, not `__*__`,
/// at most 1500 bytes.
fn is_valid_document_id(id: &str) -> bool {
    let reserved = id.len() >= 4 && id.starts_with("__") && id.ends_with("__");
    !id.is_empty()
        && id.len() <= MAX_ID_BYTES
        && id != "."
        && id != ".."
        && !id.contains('/')
        && !reserved
}

fn to_document(task: &WebTask) -> Document {
    let mut fields = HashMap::new();
    fields.insert("user_id".to_string(), json!({ "stringValue": task.owner }));
    fields.insert("description".to_string(), json!({ "stringValue": task.title }));
    fields.insert("done".to_string(), json!({ "booleanValue": task.completed }));
    fields.insert(
        "priority".to_string(),
        json!({ "stringValue": task.priority.as_str() }),
    );
    fields.insert(
        "created_at".to_string(),
        json!({ "timestampValue": task.created_at.to_rfc3339() }),
    );
    fields.insert(
        "updated_at".to_string(),
        json!({ "timestampValue": task.updated_at.to_rfc3339() }),
    );

    Document {
        name: String::new(),
        fields,
        create_time: None,
        update_time: None,
    }
}

fn string_field<'a>(fields: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key)?.get("stringValue")?.as_str()
}

fn bool_field(fields: &HashMap<String, Value>, key: &str) -> Option<bool> {
    fields.get(key)?.get("booleanValue")?.as_bool()
}

fn time_field(fields: &HashMap<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.get("timestampValue")?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn from_document(doc: Document) -> Result<WebTask> {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TickError::upstream("firestore document without a name"))?
        .to_string();

    let fields = &doc.fields;
    let owner = string_field(fields, "user_id")
        .ok_or_else(|| TickError::upstream(format!("document {} has no user_id", id)))?
        .to_string();
    let title = match string_field(fields, "description").map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => {
            tracing::warn!(task_id = %id, "stored task has no description");
            UNTITLED.to_string()
        }
    };
    let completed = bool_field(fields, "done").unwrap_or(false);
    // Rows written by older front ends may carry anything here.
    let priority = string_field(fields, "priority")
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    let now = Utc::now();
    let created_at = time_field(fields, "created_at")
        .or(doc.create_time)
        .unwrap_or(now);
    let updated_at = time_field(fields, "updated_at")
        .or(doc.update_time)
        .unwrap_or(created_at);

    Ok(WebTask {
        id,
        owner,
        title,
        completed,
        priority,
        created_at,
        updated_at,
    })
}
