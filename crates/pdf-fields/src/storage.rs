//! Field persistence
//!
//! The engine only talks to storage through [`FieldStorage`]. Saves never
//! touch in-memory state, so a failed save can simply be retried.

use crate::record::FieldRecord;
use crate::types::*;
use std::future::Future;
use std::path::{Path, PathBuf};

pub trait FieldStorage: Send + Sync {
    /// Replace the stored records of a document
    fn save_fields(
        &self,
        pdf_id: &str,
        records: &[FieldRecord],
    ) -> impl Future<Output = Result<()>> + Send;

    /// Stored records of a document; empty if nothing was saved yet
    fn load_fields(&self, pdf_id: &str) -> impl Future<Output = Result<Vec<FieldRecord>>> + Send;
}

/// Stores each document's records as `<root>/<pdf_id>.json`
#[derive(Debug, Clone)]
pub struct JsonDirStorage {
    root: PathBuf,
}

impl JsonDirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, pdf_id: &str) -> Result<PathBuf> {
        let valid = !pdf_id.is_empty()
            && pdf_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !pdf_id.starts_with('.');
        if !valid {
            return Err(SignError::Persistence {
                pdf_id: pdf_id.to_string(),
                message: "document id is not a valid file name".to_string(),
            });
        }
        Ok(self.root.join(format!("{}.json", pdf_id)))
    }
}

impl FieldStorage for JsonDirStorage {
    async fn save_fields(&self, pdf_id: &str, records: &[FieldRecord]) -> Result<()> {
        let path = self.path_for(pdf_id)?;
        let json = serde_json::to_string_pretty(records)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| persistence_error(pdf_id, e))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| persistence_error(pdf_id, e))?;
        log::debug!("Saved {} field(s) for {}", records.len(), pdf_id);
        Ok(())
    }

    async fn load_fields(&self, pdf_id: &str) -> Result<Vec<FieldRecord>> {
        let path = self.path_for(pdf_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(persistence_error(pdf_id, e)),
        }
    }
}

fn persistence_error(pdf_id: &str, error: std::io::Error) -> SignError {
    SignError::Persistence {
        pdf_id: pdf_id.to_string(),
        message: error.to_string(),
    }
}
