//! HTTP client for the drone daemon

use crate::error::{CliError, CliResult};
use drone_types::{Action, Envelope};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Content type of uploaded source archives
pub const ARCHIVE_CONTENT_TYPE: &str = "application/x-gzip";

/// HTTP client for communicating with the drone daemon
pub struct DroneClient {
    client: Client,
    base_url: Url,
}

impl DroneClient {
    /// Create a client for `http://<host>:<port>`
    pub fn new(host: &str, port: u16, timeout: Duration) -> CliResult<Self> {
        Self::with_endpoint(&format!("http://{}:{}", host, port), timeout)
    }

    /// Create a client for an explicit base URL
    pub fn with_endpoint(endpoint: &str, timeout: Duration) -> CliResult<Self> {
        let base_url = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| CliError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CliError::Config(format!(
                "invalid endpoint '{}': not a base URL",
                endpoint
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    // ========== Query API ==========

    /// Get the daemon version
    pub async fn version(&self) -> CliResult<Value> {
        self.get(&["version"]).await
    }

    /// List all apps with their drones
    pub async fn list_drones(&self) -> CliResult<Value> {
        self.get(&["drones"]).await
    }

    /// List running drones
    pub async fn running_drones(&self) -> CliResult<Value> {
        self.get(&["drones", "running"]).await
    }

    /// Get details of one app
    pub async fn get_drone(&self, name: &str) -> CliResult<Value> {
        self.get(&["drones", name]).await
    }

    // ========== Lifecycle API ==========

    /// Send a lifecycle action for `name`, wrapping `payload` in its envelope
    pub async fn drone_action<P: Serialize>(
        &self,
        name: &str,
        action: Action,
        payload: &P,
    ) -> CliResult<Value> {
        self.post(
            &["drones", name, action.as_str()],
            &Envelope::new(action, payload),
        )
        .await
    }

    /// Upload a source archive for `user`/`name`
    pub async fn deploy(&self, user: &str, name: &str, archive: &Path) -> CliResult<Value> {
        self.post_file(&["deploy", user, name], archive).await
    }

    // ========== Internal HTTP helpers ==========

    /// Build a URL from path segments, percent-encoding each one
    pub fn url(&self, segments: &[&str]) -> CliResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CliError::Config(format!("invalid endpoint '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str]) -> CliResult<Value> {
        let url = self.url(segments)?;
        debug!(method = "GET", url = %url, "Sending request");
        let response = self.client.get(url.clone()).send().await?;
        handle_response(&url, response).await
    }

    async fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> CliResult<Value> {
        let url = self.url(segments)?;
        debug!(method = "POST", url = %url, "Sending request");
        let response = self.client.post(url.clone()).json(body).send().await?;
        handle_response(&url, response).await
    }

    async fn post_file(&self, segments: &[&str], path: &Path) -> CliResult<Value> {
        let url = self.url(segments)?;
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();

        debug!(method = "POST", url = %url, bytes = length, "Uploading archive");
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, ARCHIVE_CONTENT_TYPE)
            .header(CONTENT_LENGTH, length)
            .body(Body::from(file))
            .send()
            .await?;
        handle_response(&url, response).await
    }
}

async fn handle_response(url: &Url, response: reqwest::Response) -> CliResult<Value> {
    let status = response.status();
    debug!(status = status.as_u16(), url = %url, "Received response");

    if status.is_success() {
        let text = response.text().await?;
        Ok(parse_body(&text))
    } else if status == StatusCode::NOT_FOUND {
        Err(CliError::NotFound(url.path().to_string()))
    } else {
        let text = response.text().await.unwrap_or_default();
        Err(CliError::Api {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }
}

/// Decode a success body: JSON when possible, otherwise the raw text
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Pick the most useful message out of an error body
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<Value>(text) {
        let candidates = [
            body.pointer("/error/message"),
            body.get("message"),
            body.get("error"),
        ];
        if let Some(message) = candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str())
        {
            return message.to_string();
        }
    }

    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        text.to_string()
    }
}
