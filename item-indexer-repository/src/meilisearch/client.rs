//! Meilisearch client implementation.
//!
//! This module provides the concrete implementation of `IndexBackend` on top
//! of the Meilisearch HTTP API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::BackendConfig;
use crate::errors::BackendError;
use crate::interfaces::IndexBackend;
use crate::meilisearch::routes;
use item_indexer_shared::{IndexInfo, Record, TaskHandle, TaskInfo, TaskUid};

/// Meilisearch client implementation.
///
/// # Example
///
/// ```ignore
/// let config = BackendConfig::new("http://127.0.0.1:7700").with_api_key("masterKey");
/// let client = MeilisearchClient::new(&config)?;
///
/// let task = client.add_documents("products", &records).await?;
/// let outcome = client
///     .wait_for_task(task.task_uid, Duration::from_secs(120), Duration::from_secs(1))
///     .await?;
/// ```
pub struct MeilisearchClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl MeilisearchClient {
    /// Create a new client for the service at `config.url`.
    ///
    /// No request is made here; use `health_check` to verify the service is
    /// reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(MeilisearchClient)` - A new client instance
    /// * `Err(BackendError)` - If the URL is invalid or the HTTP client cannot be built
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = Self::normalize_base_url(&config.url)?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::configuration(e.to_string()))?;

        info!(
            url = %base_url,
            authenticated = config.api_key.is_some(),
            "Created Meilisearch client"
        );

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Parse the base URL and make sure its path ends with a slash so that
    /// relative routes are appended rather than replacing the last segment.
    fn normalize_base_url(url: &str) -> Result<Url, BackendError> {
        let mut parsed = Url::parse(url)
            .map_err(|e| BackendError::configuration(format!("Invalid URL '{}': {}", url, e)))?;

        if parsed.cannot_be_a_base() {
            return Err(BackendError::configuration(format!(
                "URL '{}' cannot be used as a base URL",
                url
            )));
        }

        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }

        Ok(parsed)
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::configuration(format!("Invalid path '{}': {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);

        Ok(match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::connection(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::parse_api_error(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::parse(e.to_string()))
    }

    async fn read_task_handle(response: Response) -> Result<TaskHandle, BackendError> {
        let body: Value = Self::read_json(response).await?;
        Self::parse_task_handle(body)
    }

    /// Parse the summarized task returned by every write endpoint.
    fn parse_task_handle(body: Value) -> Result<TaskHandle, BackendError> {
        if body.get("taskUid").and_then(Value::as_u64).is_none() {
            return Err(BackendError::missing_task_uid(body.to_string()));
        }

        serde_json::from_value(body).map_err(|e| BackendError::parse(e.to_string()))
    }

    /// Build an error from a non-success response.
    ///
    /// Meilisearch error bodies look like
    /// `{"message": ..., "code": ..., "type": ..., "link": ...}`; anything else
    /// is kept verbatim as the message.
    fn parse_api_error(status: StatusCode, body: &str) -> BackendError {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        debug!(status = %status, code = %code, "Meilisearch request failed");
        BackendError::api(status.as_u16(), code, message)
    }
}

#[async_trait]
impl IndexBackend for MeilisearchClient {
    #[instrument(skip(self))]
    async fn get_index(&self, index_uid: &str) -> Result<Option<IndexInfo>, BackendError> {
        let request = self.request(Method::GET, &routes::index(index_uid))?;

        match self.send(request).await {
            Ok(response) => Ok(Some(Self::read_json(response).await?)),
            Err(e) if e.is_not_found() => {
                debug!(index_uid, "Index does not exist");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn create_index(
        &self,
        index_uid: &str,
        primary_key: Option<&str>,
    ) -> Result<TaskHandle, BackendError> {
        let mut body = json!({ "uid": index_uid });
        if let Some(primary_key) = primary_key {
            body["primaryKey"] = json!(primary_key);
        }

        let request = self.request(Method::POST, routes::INDEXES)?.json(&body);
        let response = self.send(request).await?;
        Self::read_task_handle(response).await
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add_documents(
        &self,
        index_uid: &str,
        documents: &[Record],
    ) -> Result<TaskHandle, BackendError> {
        let body =
            serde_json::to_vec(documents).map_err(|e| BackendError::serialization(e.to_string()))?;

        let request = self
            .request(Method::POST, &routes::documents(index_uid))?
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let response = self.send(request).await?;
        Self::read_task_handle(response).await
    }

    #[instrument(skip(self, settings))]
    async fn update_settings(
        &self,
        index_uid: &str,
        settings: &Map<String, Value>,
    ) -> Result<TaskHandle, BackendError> {
        let request = self
            .request(Method::PATCH, &routes::settings(index_uid))?
            .json(settings);
        let response = self.send(request).await?;
        Self::read_task_handle(response).await
    }

    async fn get_task(&self, task_uid: TaskUid) -> Result<TaskInfo, BackendError> {
        let request = self.request(Method::GET, &routes::task(task_uid))?;
        let response = self.send(request).await?;
        Self::read_json(response).await
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        let request = self.request(Method::GET, routes::HEALTH)?;
        let response = self.send(request).await?;
        let body: Value = Self::read_json(response).await?;

        Ok(body.get("status").and_then(Value::as_str) == Some("available"))
    }
}
