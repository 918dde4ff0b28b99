// ANI Desktop - HTTP client for the n8n REST API

use super::*;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use url::Url;

const WORKFLOWS_PATH: [&str; 2] = ["rest", "workflows"];

/// Authenticated JSON client bound to one server and API key.
///
/// No timeout is configured: a hung server stalls the call.
pub struct N8nClient {
    api_key: String,
    workflows_url: Url,
    client: Client,
}

impl N8nClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, RemoteError> {
        let workflows_url = endpoint(base_url, &WORKFLOWS_PATH)?;
        let client = Client::builder()
            .user_agent(concat!("ani-desktop/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            workflows_url,
            client,
        })
    }

    pub fn workflows_url(&self) -> &Url {
        &self.workflows_url
    }

    /// Send one JSON request and parse the response body.
    pub async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value, RemoteError> {
        tracing::debug!(method = %method, url = %url, "Sending workflow API request");

        let mut req = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let parsed = parse_body(&text);

        if !status.is_success() {
            tracing::warn!(method = %method, url = %url, status = %status, "Workflow API error");
            return Err(RemoteError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                body: parsed,
            });
        }

        tracing::debug!(status = %status, body_len = text.len(), "Workflow API response received");
        Ok(parsed)
    }
}

#[async_trait]
impl WorkflowApi for N8nClient {
    async fn list_workflows(&self) -> Result<Value, RemoteError> {
        self.request(Method::GET, self.workflows_url.clone(), None)
            .await
    }

    async fn create_workflow(&self, workflow: &Value) -> Result<Value, RemoteError> {
        self.request(Method::POST, self.workflows_url.clone(), Some(workflow))
            .await
    }

    async fn update_workflow(&self, id: &Value, workflow: &Value) -> Result<Value, RemoteError> {
        let mut url = self.workflows_url.clone();
        // Cannot fail: `endpoint` already checked the URL can carry a path.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id_segment(id));
        }
        self.request(Method::PATCH, url, Some(workflow)).await
    }
}

/// Join path segments onto a base URL, ignoring trailing slashes on the base.
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, RemoteError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let mut url = Url::parse(trimmed).map_err(|source| RemoteError::InvalidUrl {
        url: base_url.to_string(),
        source,
    })?;

    url.path_segments_mut()
        .map_err(|_| RemoteError::CannotBeABase(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
