use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};

use crate::models::{JobInfo, QueueListing, QueueName};

pub struct HTTPClient {
    pub base_url: String,
    pub token: Option<String>,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.to_string(),
            token,
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn list(&self, queue: QueueName) -> Result<QueueListing, String> {
        let value = self.send(Method::GET, queue.path(), None)?;
        serde_json::from_value(value).map_err(|err| err.to_string())
    }

    pub fn enqueue(&self, queue: QueueName, body: Value) -> Result<JobInfo, String> {
        let value = self.send(Method::POST, queue.path(), Some(body))?;
        serde_json::from_value(value).map_err(|err| err.to_string())
    }

    /// POSTs `/<queue>/<id>/<action>` and decodes the returned job.
    pub fn job_action(
        &self,
        queue: QueueName,
        id: &str,
        action: &str,
        body: Option<Value>,
    ) -> Result<JobInfo, String> {
        let path = format!("{}/{}/{}", queue.path(), id, action);
        let value = self.send(Method::POST, &path, body)?;
        serde_json::from_value(value).map_err(|err| err.to_string())
    }

    pub fn start(&self, queue: QueueName, id: &str) -> Result<Value, String> {
        let path = format!("{}/{}/start", queue.path(), id);
        self.send(Method::POST, &path, None)
    }

    pub fn remove(&self, queue: QueueName, id: &str) -> Result<JobInfo, String> {
        let path = format!("{}/{}", queue.path(), id);
        let value = self.send(Method::DELETE, &path, None)?;
        serde_json::from_value(value).map_err(|err| err.to_string())
    }

    pub fn clear(&self, queue: QueueName, scope: &str) -> Result<Value, String> {
        let path = format!("{}/clear", queue.path());
        self.send(Method::POST, &path, Some(json!({ "scope": scope })))
    }

    pub fn process(&self, queue: QueueName, ids: Vec<String>) -> Result<Value, String> {
        let path = format!("{}/process", queue.path());
        self.send(Method::POST, &path, Some(json!({ "ids": ids })))
    }

    pub fn set_paused(&self, queue: QueueName, paused: bool) -> Result<Value, String> {
        let action = if paused { "pause" } else { "resume" };
        let path = format!("{}/{}", queue.path(), action);
        self.send(Method::POST, &path, None)
    }

    pub fn health(&self) -> Result<Value, String> {
        self.send(Method::GET, "health", None)
    }

    fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, String> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut req = self.client.request(method, url).headers(self.headers());
        if let Some(body) = body {
            req = req.json(&body);
        }
        read(req)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            let value = format!("Bearer {}", token);
            if let Ok(header) = HeaderValue::from_str(&value) {
                headers.insert(AUTHORIZATION, header);
            }
        }
        headers
    }
}

fn read(req: RequestBuilder) -> Result<Value, String> {
    let resp = req.send().map_err(|err| err.to_string())?;
    let status = resp.status();
    if status.is_success() {
        return resp.json::<Value>().map_err(|err| err.to_string());
    }
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    Err(format!("http {}: {}", status.as_u16(), message))
}
