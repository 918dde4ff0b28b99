// ANI Desktop - Local workflow definitions and import results

pub mod importer;
pub mod loader;

use crate::remote::RemoteError;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

pub use importer::WorkflowImporter;
pub use loader::{list_workflow_files, WorkflowFile};

/// Errors that abort a whole import run. Per-file failures never surface
/// here; they end up in that file's [`ImportResult`].
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("workflow directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),
    #[error("no .json workflows in {0:?}")]
    NoWorkflows(PathBuf),
    #[error("failed to read workflow directory {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    Created,
    Updated,
    Error,
}

/// Outcome for one local workflow file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResult {
    pub file: String,
    pub action: ImportAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ImportResult {
    pub fn created(file: impl Into<String>, id: Option<Value>) -> Self {
        Self::succeeded(file, ImportAction::Created, id)
    }

    pub fn updated(file: impl Into<String>, id: Value) -> Self {
        Self::succeeded(file, ImportAction::Updated, Some(id))
    }

    fn succeeded(file: impl Into<String>, action: ImportAction, id: Option<Value>) -> Self {
        Self {
            file: file.into(),
            action,
            id,
            ok: true,
            message: None,
            detail: None,
        }
    }

    pub fn failed(file: impl Into<String>, message: impl Into<String>, detail: Option<Value>) -> Self {
        Self {
            file: file.into(),
            action: ImportAction::Error,
            id: None,
            ok: false,
            message: Some(message.into()),
            detail,
        }
    }
}
