// ANI Desktop - Request/response bridge between the UI layer and the backend

use crate::config::{AppConfig, DEFAULT_N8N_PORT, DEFAULT_OLLAMA_PORT};
use crate::settings::{Settings, SettingsPatch, SettingsSource, SettingsStore};
use crate::workflow::{ImportResult, WorkflowImporter};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Every operation the UI may invoke. Serialized as
/// `{"op": "<name>", "args": {...}}`; `args` is omitted for operations without
/// arguments and optional for `workflows:import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args")]
pub enum BridgeRequest {
    #[serde(rename = "env.get")]
    EnvGet,
    #[serde(rename = "settings:get")]
    SettingsGet,
    #[serde(rename = "settings:save")]
    SettingsSave(SettingsPatch),
    /// Fields present in the patch override the stored settings for this run.
    #[serde(rename = "workflows:import")]
    WorkflowsImport(Option<SettingsPatch>),
}

impl BridgeRequest {
    pub fn op(&self) -> &'static str {
        match self {
            BridgeRequest::EnvGet => "env.get",
            BridgeRequest::SettingsGet => "settings:get",
            BridgeRequest::SettingsSave(_) => "settings:save",
            BridgeRequest::WorkflowsImport(_) => "workflows:import",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BridgePayload {
    Env {
        n8n: String,
        ollama: String,
    },
    Settings {
        settings: Settings,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<SettingsSource>,
    },
    Import {
        results: Vec<ImportResult>,
    },
}

/// `{ "ok": true, ...payload }` or `{ "ok": false, "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeResponse {
    pub ok: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub payload: Option<BridgePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn success(payload: BridgePayload) -> Self {
        Self {
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            payload: None,
            error: Some(error.to_string()),
        }
    }
}

/// One line of the stdio transport: an optional correlation id plus the request.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<Value>,
    #[serde(flatten)]
    request: BridgeRequest,
}

#[derive(Debug, Serialize)]
struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(flatten)]
    response: BridgeResponse,
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

pub struct Bridge {
    settings: SettingsStore,
    importer: WorkflowImporter,
}

impl Bridge {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            settings: SettingsStore::new(&config.settings_path),
            importer: WorkflowImporter::new(&config.workflows_dir),
        }
    }

    /// Run one operation. Never fails; errors come back as `ok: false`.
    pub async fn handle(&self, request: BridgeRequest) -> BridgeResponse {
        let op = request.op();
        tracing::debug!(op = %op, "Bridge request");

        let response = match request {
            BridgeRequest::EnvGet => {
                let (n8n, ollama) = env_ports(|k| std::env::var(k).ok());
                BridgeResponse::success(BridgePayload::Env { n8n, ollama })
            }
            BridgeRequest::SettingsGet => {
                let loaded = self.settings.load().await;
                BridgeResponse::success(BridgePayload::Settings {
                    settings: loaded.settings,
                    source: Some(loaded.source),
                })
            }
            BridgeRequest::SettingsSave(patch) => match self.settings.save(patch).await {
                Ok(settings) => BridgeResponse::success(BridgePayload::Settings {
                    settings,
                    source: None,
                }),
                Err(e) => BridgeResponse::failure(e),
            },
            BridgeRequest::WorkflowsImport(overrides) => {
                let settings = self
                    .settings
                    .load()
                    .await
                    .settings
                    .overridden_by(overrides.unwrap_or_default());
                match self.importer.import(&settings).await {
                    Ok(results) => BridgeResponse::success(BridgePayload::Import { results }),
                    Err(e) => BridgeResponse::failure(e),
                }
            }
        };

        if let Some(ref error) = response.error {
            tracing::error!(op = %op, error = %error, "Bridge request failed");
        }
        response
    }

    /// Serve newline-delimited JSON requests until `reader` hits EOF.
    ///
    /// Every non-blank line gets exactly one reply line, including lines that
    /// are not UTF-8 or not a valid request.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let reply = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.reply_to(line.trim()).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Bridge request is not UTF-8");
                    Reply {
                        id: None,
                        response: BridgeResponse::failure(format!("invalid request: {}", e)),
                    }
                }
            };

            let mut out = serde_json::to_string(&reply).map_err(std::io::Error::other)?;
            out.push('\n');
            writer.write_all(out.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok(())
    }

    async fn reply_to(&self, line: &str) -> Reply {
        match serde_json::from_str::<Envelope>(line) {
            Ok(envelope) => Reply {
                id: envelope.id,
                response: self.handle(envelope.request).await,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Malformed bridge request");
                // Keep the correlation id when the line is JSON but not a known request.
                let id = serde_json::from_str::<Value>(line)
                    .ok()
                    .and_then(|v| v.get("id").cloned())
                    .filter(|id| !id.is_null());
                Reply {
                    id,
                    response: BridgeResponse::failure(format!("invalid request: {}", e)),
                }
            }
        }
    }
}

/// Ports of the companion services, from `PORT_N8N` and `PORT_OLLAMA`.
fn env_ports(lookup: impl Fn(&str) -> Option<String>) -> (String, String) {
    let n8n = lookup("PORT_N8N")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_N8N_PORT.to_string());
    let ollama = lookup("PORT_OLLAMA")
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_OLLAMA_PORT.to_string());
    (n8n, ollama)
}
