// ANI Desktop - Workflow directory listing and document loading

use super::ImportError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A `*.json` file in the workflow directory. Content is read lazily so a
/// broken file only affects its own import result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowFile {
    pub file: String,
    pub path: PathBuf,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} is not a JSON object")]
    NotAnObject(String),
}

impl WorkflowFile {
    /// File name without its extension; the fallback workflow name.
    pub fn stem(&self) -> String {
        Path::new(&self.file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.clone())
    }

    /// Read and parse the document, then pin its `name`: the document's own
    /// non-empty `name` string, else the file stem. Returns the name used.
    pub async fn read_document(&self) -> Result<(String, Map<String, Value>), DocumentError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| DocumentError::Read {
                path: self.path.clone(),
                source,
            })?;

        let value: Value = serde_json::from_str(&raw).map_err(|source| DocumentError::Parse {
            file: self.file.clone(),
            source,
        })?;
        let Value::Object(mut document) = value else {
            return Err(DocumentError::NotAnObject(self.file.clone()));
        };

        let name = document
            .get("name")
            .and_then(|n| n.as_str())
            .filter(|n| !n.is_empty())
            .map(String::from)
            .unwrap_or_else(|| self.stem());
        document.insert("name".to_string(), Value::String(name.clone()));

        Ok((name, document))
    }
}

/// List the `*.json` files of `dir`, sorted by file name.
///
/// Fails if the directory is missing or holds no matching files.
pub async fn list_workflow_files(dir: &Path) -> Result<Vec<WorkflowFile>, ImportError> {
    let fs_err = |source: std::io::Error| ImportError::Filesystem {
        path: dir.to_path_buf(),
        source,
    };

    if !tokio::fs::try_exists(dir).await.map_err(fs_err)? {
        return Err(ImportError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(fs_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(fs_err)? {
        let file = entry.file_name().to_string_lossy().into_owned();
        if !file.to_lowercase().ends_with(".json") {
            continue;
        }
        files.push(WorkflowFile {
            path: entry.path(),
            file,
        });
    }

    if files.is_empty() {
        return Err(ImportError::NoWorkflows(dir.to_path_buf()));
    }

    files.sort_by(|a, b| a.file.cmp(&b.file));
    tracing::debug!(dir = ?dir, count = files.len(), "Found workflow files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let err = list_workflow_files(&tmp.path().join("workflows"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::DirectoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_directory_without_json_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("README.md"), "# flows").unwrap();
        let err = list_workflow_files(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ImportError::NoWorkflows(_)));
    }

    #[tokio::test]
    async fn test_lists_json_files_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.json", "A.JSON", "notes.txt", "c.json"] {
            std::fs::write(tmp.path().join(name), "{}").unwrap();
        }

        let files = list_workflow_files(tmp.path()).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(names, ["A.JSON", "b.json", "c.json"]);
    }

    #[tokio::test]
    async fn test_document_name_falls_back_to_stem() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("daily-report.json");
        std::fs::write(&path, r#"{"nodes": []}"#).unwrap();

        let wf = WorkflowFile {
            file: "daily-report.json".into(),
            path,
        };
        let (name, doc) = wf.read_document().await.unwrap();
        assert_eq!(name, "daily-report");
        assert_eq!(doc.get("name"), Some(&json!("daily-report")));
        assert_eq!(doc.get("nodes"), Some(&json!([])));
    }

    #[tokio::test]
    async fn test_document_keeps_own_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("x.json");
        std::fs::write(&path, r#"{"name": "Ingest KB"}"#).unwrap();

        let wf = WorkflowFile {
            file: "x.json".into(),
            path,
        };
        let (name, _) = wf.read_document().await.unwrap();
        assert_eq!(name, "Ingest KB");
    }

    #[tokio::test]
    async fn test_document_must_be_object() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("list.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let wf = WorkflowFile {
            file: "list.json".into(),
            path,
        };
        assert!(matches!(
            wf.read_document().await,
            Err(DocumentError::NotAnObject(_))
        ));
    }
}
