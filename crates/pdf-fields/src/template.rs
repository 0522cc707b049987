use crate::store::FieldStore;

/// One document in a signer's sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub pdf_id: String,
    pub name: String,
    /// Position within the signer's sequence
    pub position: usize,
    pub fields: FieldStore,
}

impl Template {
    pub fn new(pdf_id: impl Into<String>, name: impl Into<String>, position: usize) -> Self {
        Self {
            pdf_id: pdf_id.into(),
            name: name.into(),
            position,
            fields: FieldStore::new(),
        }
    }

    pub fn with_fields(mut self, fields: FieldStore) -> Self {
        self.fields = fields;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.fields.is_complete()
    }

    pub fn remaining(&self) -> usize {
        self.fields.len() - self.fields.filled_count()
    }

    /// Share of filled fields; a template without fields counts as done
    pub fn completion_ratio(&self) -> f64 {
        let total = self.fields.len();
        if total == 0 {
            1.0
        } else {
            self.fields.filled_count() as f64 / total as f64
        }
    }
}
