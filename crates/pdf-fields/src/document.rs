//! Page information of source PDFs

use crate::types::*;
use lopdf::{Document, Object};
use std::path::Path;

/// Page size in points, from the page's MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// One entry per page; `None` when the page inherits its MediaBox
    pub page_sizes: Vec<Option<PageSize>>,
}

/// Load a PDF and report its pages
pub async fn load_document_info(path: impl AsRef<Path>) -> Result<DocumentInfo> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    let info = tokio::task::spawn_blocking(move || {
        let doc = Document::load_mem(&bytes)?;
        Ok::<_, SignError>(document_info(&doc))
    })
    .await??;
    Ok(info)
}

/// Page count and sizes of an already loaded document
pub fn document_info(doc: &Document) -> DocumentInfo {
    let pages = doc.get_pages();
    let page_sizes = pages
        .values()
        .map(|page_id| {
            doc.get_dictionary(*page_id)
                .ok()
                .and_then(|page| page.get(b"MediaBox").ok())
                .and_then(media_box_size)
        })
        .collect();

    DocumentInfo {
        page_count: pages.len() as u32,
        page_sizes,
    }
}

fn media_box_size(media_box: &Object) -> Option<PageSize> {
    let values = media_box
        .as_array()
        .ok()?
        .iter()
        .map(|v| v.as_float().ok())
        .collect::<Option<Vec<f32>>>()?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Some(PageSize {
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }),
        _ => None,
    }
}
