use std::path::PathBuf;

mod handlers;
mod worker;

// Re-export types from the engine crate
pub use pdf_fields::{DocumentInfo, EngineOptions, FieldRecord, FieldStorage, JsonDirStorage};
pub use worker::worker_task;

/// Commands sent from the editor to the worker
#[derive(Debug)]
pub enum SignCommand {
    /// Replace the stored fields of a document.
    ///
    /// Queued saves for the same document collapse into the newest one.
    SaveFields {
        pdf_id: String,
        records: Vec<FieldRecord>,
    },
    LoadFields {
        pdf_id: String,
    },
    LoadDocument {
        path: PathBuf,
    },
    LoadConfig {
        path: PathBuf,
    },
}

/// Updates sent from the worker to the editor
#[derive(Debug, Clone)]
pub enum SignUpdate {
    FieldsSaved {
        pdf_id: String,
        count: usize,
    },
    /// The save did not reach storage; in-memory fields are unchanged and
    /// the save can be retried
    SaveFailed {
        pdf_id: String,
        message: String,
    },
    FieldsLoaded {
        pdf_id: String,
        records: Vec<FieldRecord>,
    },
    DocumentLoaded {
        path: PathBuf,
        info: DocumentInfo,
    },
    ConfigLoaded {
        options: EngineOptions,
    },
    Error {
        message: String,
    },
}
