use crate::SignUpdate;
use pdf_fields::{EngineOptions, FieldRecord, FieldStorage, load_document_info};
use std::path::PathBuf;
use tokio::sync::mpsc;

pub async fn handle_save_fields(
    storage: &impl FieldStorage,
    pdf_id: String,
    records: Vec<FieldRecord>,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    match storage.save_fields(&pdf_id, &records).await {
        Ok(()) => {
            let _ = update_tx.send(SignUpdate::FieldsSaved {
                pdf_id,
                count: records.len(),
            });
        }
        Err(e) => {
            log::warn!("Saving fields for {} failed: {}", pdf_id, e);
            let _ = update_tx.send(SignUpdate::SaveFailed {
                pdf_id,
                message: e.to_string(),
            });
        }
    }
}

pub async fn handle_load_fields(
    storage: &impl FieldStorage,
    pdf_id: String,
    update_tx: &mpsc::UnboundedSender<SignUpdate>,
) {
    match storage.load_fields(&pdf_id).await {
        Ok(records) => {
            let _ = update_tx.send(SignUpdate::FieldsLoaded { pdf_id, records });
        }
        Err(e) => {
            let _ = update_tx.send(SignUpdate::Error {
                message: format!("Failed to load fields for {pdf_id}: {e}"),
            });
        }
    }
}

pub async fn handle_load_document(path: PathBuf, update_tx: &mpsc::UnboundedSender<SignUpdate>) {
    match load_document_info(&path).await {
        Ok(info) => {
            log::info!("Loaded {} ({} pages)", path.display(), info.page_count);
            let _ = update_tx.send(SignUpdate::DocumentLoaded { path, info });
        }
        Err(e) => {
            let _ = update_tx.send(SignUpdate::Error {
                message: format!("Failed to load PDF: {e}"),
            });
        }
    }
}

pub async fn handle_load_config(path: PathBuf, update_tx: &mpsc::UnboundedSender<SignUpdate>) {
    match EngineOptions::load(&path).await {
        Ok(options) => {
            let _ = update_tx.send(SignUpdate::ConfigLoaded { options });
        }
        Err(e) => {
            let _ = update_tx.send(SignUpdate::Error {
                message: format!("Failed to load config: {e}"),
            });
        }
    }
}
