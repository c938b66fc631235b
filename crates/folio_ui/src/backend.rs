use async_trait::async_trait;
use folio_forms::{ActionDescriptor, HttpMethod, ModalDescriptor, OptionMap, PropertyPageConfig, RestError};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use ureq::Agent;
use ureq::tls::{TlsConfig, TlsProvider};

use crate::config::ClientConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server responded with status {status}: {message}")]
    Status { status: u16, message: String, path: String },

    #[error("cannot decode response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Server-provided reason, when the error body carried one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            BackendError::Status { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    pub fn to_rest_error(&self, path: &str) -> RestError {
        match self {
            BackendError::Status {
                status,
                message,
                path: server_path,
            } => RestError {
                status: *status,
                message: message.clone(),
                path: if server_path.is_empty() {
                    path.to_string()
                } else {
                    server_path.clone()
                },
            },
            other => RestError {
                status: 0,
                message: other.to_string(),
                path: path.to_string(),
            },
        }
    }
}

/// Server side of the modal flow.
#[async_trait]
pub trait ModalBackend: Send + Sync {
    /// `GET /modal/{action}`
    async fn fetch_modal(&self, action: &str) -> Result<ModalDescriptor, BackendError>;

    /// `POST /modal/page/{resource}`
    async fn resolve_page(&self, resource: &str, body: &Value) -> Result<PropertyPageConfig, BackendError>;

    /// `{method} {endpoint}` of the terminal action.
    async fn submit(&self, action: &ActionDescriptor, body: &Value) -> Result<(), BackendError>;

    /// `POST /dictionary/{type}`
    async fn reload_dictionary(&self, dictionary_type: &str, body: &Value) -> Result<OptionMap, BackendError>;
}

/// `ModalBackend` speaking JSON over HTTP. Requests run on the blocking pool.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .tls_config(TlsConfig::builder().provider(TlsProvider::NativeTls).build())
            .build()
            .into();
        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn request(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<Value, BackendError> {
        let agent = self.agent.clone();
        let url = self.url(path);
        tokio::task::spawn_blocking(move || blocking_request(&agent, method, &url, body))
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, BackendError> {
        let value = self.request(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

fn blocking_request(agent: &Agent, method: HttpMethod, url: &str, body: Option<Value>) -> Result<Value, BackendError> {
    debug!("{} {}", method.as_str(), url);
    let body = body.unwrap_or_else(|| Value::Object(Map::new()));
    let result = match method {
        HttpMethod::Get => agent.get(url).call(),
        HttpMethod::Delete => agent.delete(url).call(),
        HttpMethod::Post => agent.post(url).send_json(&body),
        HttpMethod::Put => agent.put(url).send_json(&body),
        HttpMethod::Patch => agent.patch(url).send_json(&body),
    };
    let mut response = result.map_err(|e| BackendError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !(200..300).contains(&status) {
        let error: RestError = serde_json::from_str(&text).unwrap_or_default();
        debug!("{} {} failed with {}: {}", method.as_str(), url, status, error.message);
        return Err(BackendError::Status {
            status,
            message: error.message,
            path: error.path,
        });
    }
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl ModalBackend for HttpBackend {
    async fn fetch_modal(&self, action: &str) -> Result<ModalDescriptor, BackendError> {
        self.request_json(HttpMethod::Get, &format!("/modal/{action}"), None).await
    }

    async fn resolve_page(&self, resource: &str, body: &Value) -> Result<PropertyPageConfig, BackendError> {
        self.request_json(HttpMethod::Post, &format!("/modal/page/{resource}"), Some(body.clone()))
            .await
    }

    async fn submit(&self, action: &ActionDescriptor, body: &Value) -> Result<(), BackendError> {
        self.request(action.method, &action.endpoint, Some(body.clone()))
            .await
            .map(|_| ())
    }

    async fn reload_dictionary(&self, dictionary_type: &str, body: &Value) -> Result<OptionMap, BackendError> {
        self.request_json(HttpMethod::Post, &format!("/dictionary/{dictionary_type}"), Some(body.clone()))
            .await
    }
}
