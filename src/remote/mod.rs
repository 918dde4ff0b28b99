// ANI Desktop - Remote workflow server (n8n REST API) abstraction

pub mod http;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

pub use http::N8nClient;

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Error, Debug)]
pub enum RemoteError {
    /// Non-2xx response. `body` is the parsed response (or `{"raw": text}`).
    #[error("HTTP {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: Value,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL {0:?} cannot carry a path")]
    CannotBeABase(String),
}

impl RemoteError {
    /// Response body of an HTTP failure, if any.
    pub fn detail(&self) -> Option<&Value> {
        match self {
            RemoteError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// API trait
// ---------------------------------------------------------------------------

/// The three workflow calls the importer needs. Each is a single attempt.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Whatever the server returns: a bare array or `{ "data": [...] }`.
    async fn list_workflows(&self) -> Result<Value, RemoteError>;

    async fn create_workflow(&self, workflow: &Value) -> Result<Value, RemoteError>;

    async fn update_workflow(&self, id: &Value, workflow: &Value) -> Result<Value, RemoteError>;
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Parse a response body. Empty text is `{}`; non-JSON text is kept as
/// `{"raw": text}`.
pub fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// Workflow entries of a listing, accepting both response shapes.
pub fn listing_entries(listing: &Value) -> &[Value] {
    listing
        .as_array()
        .or_else(|| listing.get("data").and_then(|d| d.as_array()))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Id of a freshly created workflow: `id`, else `data.id`.
pub fn created_id(response: &Value) -> Option<Value> {
    response
        .get("id")
        .or_else(|| response.get("data").and_then(|d| d.get("id")))
        .filter(|id| !id.is_null())
        .cloned()
}

/// Render a workflow id as a URL path segment.
pub fn id_segment(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
