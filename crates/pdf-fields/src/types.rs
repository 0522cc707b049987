use crate::geometry::RelativeRect;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Page {page} is outside the document ({page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("Unknown field: {0}")]
    UnknownField(FieldId),
    #[error("Field {0} is not a confirm-text field")]
    NotConfirmText(FieldId),
    #[error("Confirm-text template must not be empty")]
    EmptyTemplate,
    #[error("Option group {group} has no choice {choice}")]
    OptionOutOfRange { group: usize, choice: usize },
    #[error("Typed confirmation does not match at character {position}")]
    ConfirmTextMismatch { position: usize },
    #[error("Typed confirmation is incomplete ({typed} of {expected} characters)")]
    ConfirmTextIncomplete { typed: usize, expected: usize },

    #[error("Template {index} ({name}) still has {remaining} empty field(s)")]
    TemplateIncomplete {
        index: usize,
        name: String,
        remaining: usize,
    },
    #[error("Cannot skip template {index} ({name}): {remaining} empty field(s)")]
    SkippedIncomplete {
        index: usize,
        name: String,
        remaining: usize,
    },
    #[error("Template index {index} is out of range ({len} templates)")]
    TemplateOutOfRange { index: usize, len: usize },
    #[error("Already at the first template")]
    AtFirstTemplate,
    #[error("Already at the last template")]
    AtLastTemplate,

    #[error("No field ids left to allocate")]
    IdsExhausted,
    #[error("Invalid field record: {0}")]
    InvalidRecord(String),
    #[error("Failed to persist fields for {pdf_id}: {message}")]
    Persistence { pdf_id: String, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(#[from] crate::session::AuthFailure),
    #[error("Signing session is sealed")]
    Sealed,
    #[error("Verified identity {verified:?} does not match expected signer {expected:?}")]
    IdentityMismatch { expected: String, verified: String },
    #[error("Templates not complete: {incomplete:?}")]
    NotReadyToFinalize { incomplete: Vec<usize> },
    #[error("Required attachments are missing")]
    AttachmentsMissing,
    #[error(
        "Consistency check failed: {conflicts} conflicting classifier(s), {identity_mismatches} identity mismatch(es)"
    )]
    ConsistencyBlocked {
        conflicts: usize,
        identity_mismatches: usize,
    },
}

pub type Result<T> = std::result::Result<T, SignError>;

/// In-memory handle of a field, allocated by its store. Never reused within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u64);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Trailing run of digits of a persisted id.
///
/// `"field-17"`, `"17"` and `"sig_17"` all yield 17. Returns `None` when the
/// id has no trailing digits or they do not fit in a `u64`.
pub fn numeric_suffix(raw: &str) -> Option<u64> {
    let digits_start = raw
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    raw[digits_start..].parse().ok()
}

/// The closed set of field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Signature,
    Checkbox,
    ConfirmText,
}

impl FieldType {
    pub const ALL: [FieldType; 4] = [
        FieldType::Text,
        FieldType::Signature,
        FieldType::Checkbox,
        FieldType::ConfirmText,
    ];

    /// Name used in persisted records and derived field names
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Signature => "signature",
            FieldType::Checkbox => "checkbox",
            FieldType::ConfirmText => "confirmText",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-specific payload of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text with an optional prompt and semantic format classifier
    Text {
        description: Option<String>,
        format_code: Option<String>,
    },
    /// Encoded signature image
    Signature,
    /// Boolean-like value
    Checkbox,
    /// Typed confirmation of an authored template
    ConfirmText { template: String },
}

impl FieldKind {
    /// Empty payload for a freshly placed field
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text {
                description: None,
                format_code: None,
            },
            FieldType::Signature => FieldKind::Signature,
            FieldType::Checkbox => FieldKind::Checkbox,
            FieldType::ConfirmText => FieldKind::ConfirmText {
                template: String::new(),
            },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Signature => FieldType::Signature,
            FieldKind::Checkbox => FieldType::Checkbox,
            FieldKind::ConfirmText { .. } => FieldType::ConfirmText,
        }
    }
}

/// A typed annotation placed on one page of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: FieldId,
    /// Persisted id, opaque and kept unchanged for the field's lifetime
    pub key: String,
    /// 1-based page number
    pub page: u32,
    /// Position and size as fractions of the logical page
    pub rect: RelativeRect,
    /// Signer-entered content
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Stable name derived from the type and the key's numeric suffix, e.g. `text12`
    pub fn field_name(&self) -> String {
        let suffix = numeric_suffix(&self.key).unwrap_or(self.id.0);
        format!("{}{}", self.field_type().name(), suffix)
    }

    /// Whether the signer has filled this field
    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }

    pub fn format_code(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Text { format_code, .. } => format_code.as_deref(),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Text { description, .. } => description.as_deref(),
            _ => None,
        }
    }

    pub fn confirm_template(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::ConfirmText { template } => Some(template),
            _ => None,
        }
    }

    /// A confirm-text field whose template has not been committed yet
    pub fn is_provisional(&self) -> bool {
        matches!(&self.kind, FieldKind::ConfirmText { template } if template.trim().is_empty())
    }
}
