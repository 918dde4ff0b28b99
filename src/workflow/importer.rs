// ANI Desktop - Reconcile local workflow files with the n8n server

use super::loader::{list_workflow_files, DocumentError, WorkflowFile};
use super::{ImportError, ImportResult};
use crate::remote::{created_id, listing_entries, N8nClient, RemoteError, WorkflowApi};
use crate::settings::{Settings, DEFAULT_BASE_URL};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a single file failed. Recorded in its result, never propagated.
#[derive(Error, Debug)]
enum FileError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl FileError {
    fn detail(&self) -> Option<Value> {
        match self {
            FileError::Remote(e) => e.detail().cloned(),
            FileError::Document(_) => None,
        }
    }
}

pub struct WorkflowImporter {
    workflows_dir: PathBuf,
}

impl WorkflowImporter {
    pub fn new(workflows_dir: impl Into<PathBuf>) -> Self {
        Self {
            workflows_dir: workflows_dir.into(),
        }
    }

    pub fn workflows_dir(&self) -> &Path {
        &self.workflows_dir
    }

    /// Import every local workflow into the server described by `settings`.
    pub async fn import(&self, settings: &Settings) -> Result<Vec<ImportResult>, ImportError> {
        self.import_with(settings, N8nClient::new).await
    }

    /// Same as [`import`](Self::import) but with a caller-supplied client
    /// constructor, called with the trimmed base URL and key once all local
    /// preconditions hold.
    pub async fn import_with<A, F>(
        &self,
        settings: &Settings,
        connect: F,
    ) -> Result<Vec<ImportResult>, ImportError>
    where
        A: WorkflowApi,
        F: FnOnce(&str, &str) -> Result<A, RemoteError>,
    {
        let base_url = match settings.base_url.trim() {
            "" => DEFAULT_BASE_URL,
            url => url,
        };
        let api_key = settings.api_key.trim();
        if api_key.is_empty() {
            return Err(ImportError::MissingApiKey);
        }

        let files = list_workflow_files(&self.workflows_dir).await?;
        let api = connect(base_url, api_key)?;

        tracing::info!(base_url = %base_url, files = files.len(), "Starting workflow import");
        let listing = api.list_workflows().await?;
        let by_name = index_by_name(&listing);

        let mut results = Vec::with_capacity(files.len());
        for wf in &files {
            let result = match import_one(&api, &by_name, wf).await {
                Ok(result) => {
                    tracing::info!(file = %wf.file, action = ?result.action, "Workflow imported");
                    result
                }
                Err(e) => {
                    tracing::warn!(file = %wf.file, error = %e, "Workflow import failed");
                    ImportResult::failed(&wf.file, e.to_string(), e.detail())
                }
            };
            results.push(result);
        }

        Ok(results)
    }
}

/// Name -> id over one listing snapshot. Later entries overwrite earlier ones.
/// Entries without a name or an id cannot be updated and are skipped.
fn index_by_name(listing: &Value) -> HashMap<String, Value> {
    let mut by_name = HashMap::new();
    for entry in listing_entries(listing) {
        let Some(name) = entry.get("name").and_then(|n| n.as_str()) else {
            continue;
        };
        let Some(id) = entry.get("id").filter(|id| !id.is_null()) else {
            tracing::debug!(name = %name, "Skipping listed workflow without id");
            continue;
        };
        if name.is_empty() {
            continue;
        }
        by_name.insert(name.to_string(), id.clone());
    }
    by_name
}

async fn import_one<A: WorkflowApi>(
    api: &A,
    by_name: &HashMap<String, Value>,
    wf: &WorkflowFile,
) -> Result<ImportResult, FileError> {
    let (name, document) = wf.read_document().await?;
    let document = Value::Object(document);

    match by_name.get(&name) {
        Some(id) => {
            api.update_workflow(id, &document).await?;
            Ok(ImportResult::updated(&wf.file, id.clone()))
        }
        None => {
            let created = api.create_workflow(&document).await?;
            Ok(ImportResult::created(&wf.file, created_id(&created)))
        }
    }
}
