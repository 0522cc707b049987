//! Persisted field records
//!
//! One record per field, exchanged with the storage service as camelCase
//! JSON. Geometry is always relative, so records are independent of the
//! zoom level they were authored at.

use crate::geometry::RelativeRect;
use crate::store::FieldStore;
use crate::template::Template;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub field_name: String,
    pub relative_x: f64,
    pub relative_y: f64,
    pub relative_width: f64,
    pub relative_height: f64,
    pub page: u32,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_code_id: Option<String>,
}

impl From<&Field> for FieldRecord {
    fn from(field: &Field) -> Self {
        let (confirm_text, description, format_code_id) = match &field.kind {
            FieldKind::Text {
                description,
                format_code,
            } => (None, description.clone(), format_code.clone()),
            FieldKind::ConfirmText { template } => (Some(template.clone()), None, None),
            FieldKind::Signature | FieldKind::Checkbox => (None, None, None),
        };

        Self {
            id: field.key.clone(),
            field_type: field.field_type(),
            field_name: field.field_name(),
            relative_x: field.rect.x,
            relative_y: field.rect.y,
            relative_width: field.rect.width,
            relative_height: field.rect.height,
            page: field.page,
            value: field.value.clone(),
            confirm_text,
            description,
            format_code_id,
        }
    }
}

impl FieldRecord {
    /// Build the in-memory field under an already allocated handle
    fn into_field(self, id: FieldId) -> Field {
        let kind = match self.field_type {
            FieldType::Text => FieldKind::Text {
                description: self.description,
                format_code: self.format_code_id,
            },
            FieldType::Signature => FieldKind::Signature,
            FieldType::Checkbox => FieldKind::Checkbox,
            FieldType::ConfirmText => FieldKind::ConfirmText {
                template: self.confirm_text.unwrap_or_default(),
            },
        };

        let field = Field {
            id,
            key: self.id,
            page: self.page,
            rect: RelativeRect::new(
                self.relative_x,
                self.relative_y,
                self.relative_width,
                self.relative_height,
            ),
            value: self.value,
            kind,
        };

        if !self.field_name.is_empty() && self.field_name != field.field_name() {
            log::warn!(
                "Record {:?} carries field name {:?}, expected {:?}",
                field.key,
                self.field_name,
                field.field_name()
            );
        }
        field
    }
}

impl FieldStore {
    /// Build a store from persisted records
    pub fn from_records(records: impl IntoIterator<Item = FieldRecord>) -> Result<Self> {
        let mut store = FieldStore::new();
        for record in records {
            store.insert_record(record)?;
        }
        Ok(store)
    }

    /// Hydrate one persisted record, keeping its id unchanged
    pub fn insert_record(&mut self, record: FieldRecord) -> Result<FieldId> {
        let id = self.allocate_handle()?;
        self.insert(record.into_field(id))?;
        Ok(id)
    }

    /// Records for every field, by page then insertion order
    pub fn to_records(&self) -> Vec<FieldRecord> {
        self.all_fields().map(FieldRecord::from).collect()
    }

    /// Check every field references a page that exists in the document
    pub fn check_pages(&self, page_count: u32) -> Result<()> {
        match self.pages().find(|page| *page > page_count) {
            Some(page) => Err(SignError::PageOutOfRange { page, page_count }),
            None => Ok(()),
        }
    }
}

/// A whole template as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub pdf_id: String,
    pub name: String,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub fields: Vec<FieldRecord>,
}

impl TemplateRecord {
    /// Load a template record from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Save the template record to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

impl TryFrom<TemplateRecord> for Template {
    type Error = SignError;

    fn try_from(record: TemplateRecord) -> Result<Self> {
        let fields = FieldStore::from_records(record.fields)?;
        Ok(Template::new(record.pdf_id, record.name, record.position).with_fields(fields))
    }
}

impl From<&Template> for TemplateRecord {
    fn from(template: &Template) -> Self {
        Self {
            pdf_id: template.pdf_id.clone(),
            name: template.name.clone(),
            position: template.position,
            fields: template.fields.to_records(),
        }
    }
}
