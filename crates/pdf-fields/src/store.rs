//! Page-partitioned field storage
//!
//! The store holds the single authoritative copy of every field in one
//! document. Fields are grouped by page and keep their insertion order within
//! a page. Geometry is kept in relative coordinates; screen input is
//! converted through a [`Normalizer`] at the call site's current scale.

use crate::constants::{
    CHECKBOX_MIN_SIDE, CONFIRM_TEXT_MIN_SIZE, LogicalSize, PAGE_HEIGHT, PAGE_WIDTH,
    SIGNATURE_MIN_SIDE, TEXT_MIN_SIZE, default_size,
};
use crate::geometry::{LogicalRect, Normalizer, PagePoint, RelativeRect, ScreenDelta};
use crate::types::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldStore {
    pages: BTreeMap<u32, Vec<Field>>,
    /// Last handle handed out
    last_handle: u64,
    /// Highest numeric suffix of any persisted id seen or allocated
    last_suffix: u64,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a default-sized field centred on `point`.
    ///
    /// The box is shifted so its top-left corner never goes negative.
    pub fn place(
        &mut self,
        field_type: FieldType,
        page: u32,
        point: PagePoint,
        normalizer: &Normalizer,
    ) -> Result<&Field> {
        if page == 0 {
            return Err(SignError::PageOutOfRange {
                page,
                page_count: self.pages.keys().last().copied().unwrap_or(0),
            });
        }

        let center = normalizer.page_to_logical(point);
        let size = default_size(field_type);
        let logical = LogicalRect::new(
            (center.x - size.width / 2.0).max(0.0),
            (center.y - size.height / 2.0).max(0.0),
            size.width,
            size.height,
        );

        let suffix = self
            .last_suffix
            .checked_add(1)
            .ok_or(SignError::IdsExhausted)?;
        let id = self.allocate_handle()?;
        self.last_suffix = suffix;
        let field = Field {
            id,
            key: format!("field-{}", suffix),
            page,
            rect: Normalizer::logical_to_relative(logical),
            value: String::new(),
            kind: FieldKind::empty(field_type),
        };
        log::debug!("Placed {} {} on page {}", field_type, field.key, page);

        let fields = self.pages.entry(page).or_default();
        fields.push(field);
        Ok(&fields[fields.len() - 1])
    }

    pub(crate) fn allocate_handle(&mut self) -> Result<FieldId> {
        self.last_handle = self
            .last_handle
            .checked_add(1)
            .ok_or(SignError::IdsExhausted)?;
        Ok(FieldId(self.last_handle))
    }

    /// Insert a hydrated field whose handle came from [`Self::allocate_handle`].
    ///
    /// Fails if the persisted id is already present, lacks a numeric suffix,
    /// or the geometry is invalid. The suffix allocator is advanced past the
    /// inserted id.
    pub(crate) fn insert(&mut self, field: Field) -> Result<()> {
        if self.find_by_key(&field.key).is_some() {
            return Err(SignError::InvalidRecord(format!(
                "duplicate field id {:?}",
                field.key
            )));
        }
        let suffix = numeric_suffix(&field.key).ok_or_else(|| {
            SignError::InvalidRecord(format!("id {:?} has no numeric suffix", field.key))
        })?;
        if field.page == 0 {
            return Err(SignError::InvalidRecord(format!(
                "field {:?} has page 0",
                field.key
            )));
        }
        if !field.rect.is_valid() {
            return Err(SignError::InvalidRecord(format!(
                "field {:?} has invalid geometry {:?}",
                field.key, field.rect
            )));
        }

        self.last_suffix = self.last_suffix.max(suffix);
        self.pages.entry(field.page).or_default().push(field);
        Ok(())
    }

    /// Look up a field by its persisted id
    pub fn find_by_key(&self, key: &str) -> Option<&Field> {
        self.all_fields().find(|f| f.key == key)
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.all_fields().find(|f| f.id == id)
    }

    fn get_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.pages
            .values_mut()
            .flat_map(|fields| fields.iter_mut())
            .find(|f| f.id == id)
    }

    /// Move a field by a screen displacement. Returns false for unknown ids.
    pub fn move_by(&mut self, id: FieldId, delta: ScreenDelta, normalizer: &Normalizer) -> bool {
        let Some(field) = self.get_mut(id) else {
            return false;
        };
        let (dx, dy) = normalizer.delta_to_logical(delta);
        field.rect.x = (field.rect.x + dx / PAGE_WIDTH).max(0.0);
        field.rect.y = (field.rect.y + dy / PAGE_HEIGHT).max(0.0);
        true
    }

    /// Put a field back at previously recorded geometry. Returns false for unknown ids.
    pub fn set_rect(&mut self, id: FieldId, rect: RelativeRect) -> bool {
        let Some(field) = self.get_mut(id) else {
            return false;
        };
        field.rect = rect;
        true
    }

    /// Grow or shrink a field by a screen displacement of its bottom-right corner
    pub fn resize_by(&mut self, id: FieldId, delta: ScreenDelta, normalizer: &Normalizer) -> bool {
        let Some(current) = self.logical_size(id) else {
            return false;
        };
        let (dx, dy) = normalizer.delta_to_logical(delta);
        self.resize_to(
            id,
            LogicalSize::new(current.width + dx, current.height + dy),
        )
    }

    /// Resize to a requested logical size, applying the type's minimums.
    ///
    /// Signatures and checkboxes stay square, using the larger requested side.
    pub fn resize_to(&mut self, id: FieldId, requested: LogicalSize) -> bool {
        let Some(field) = self.get_mut(id) else {
            return false;
        };
        let size = clamp_size(field.field_type(), requested);
        field.rect.width = size.width / PAGE_WIDTH;
        field.rect.height = size.height / PAGE_HEIGHT;
        true
    }

    /// Current size of a field in logical units
    pub fn logical_size(&self, id: FieldId) -> Option<LogicalSize> {
        self.get(id).map(|f| {
            let logical = Normalizer::relative_to_logical(f.rect);
            LogicalSize::new(logical.width, logical.height)
        })
    }

    /// Remove a field. Deleting an unknown id is a no-op.
    pub fn delete(&mut self, id: FieldId) -> Option<Field> {
        let (page, index) = self.pages.iter().find_map(|(page, fields)| {
            fields
                .iter()
                .position(|f| f.id == id)
                .map(|index| (*page, index))
        })?;

        let fields = self.pages.get_mut(&page)?;
        let removed = fields.remove(index);
        if fields.is_empty() {
            self.pages.remove(&page);
        }
        log::debug!("Deleted {} from page {}", id, page);
        Some(removed)
    }

    pub fn set_value(&mut self, id: FieldId, value: impl Into<String>) -> Result<()> {
        let field = self.get_mut(id).ok_or(SignError::UnknownField(id))?;
        field.value = value.into();
        Ok(())
    }

    /// Commit an authored confirm-text template
    pub fn set_confirm_template(&mut self, id: FieldId, text: &str) -> Result<()> {
        let field = self.get_mut(id).ok_or(SignError::UnknownField(id))?;
        match &mut field.kind {
            FieldKind::ConfirmText { template } => {
                if text.trim().is_empty() {
                    return Err(SignError::EmptyTemplate);
                }
                *template = text.to_string();
                Ok(())
            }
            _ => Err(SignError::NotConfirmText(id)),
        }
    }

    /// Set the prompt and format classifier of a text field
    pub fn set_text_details(
        &mut self,
        id: FieldId,
        description: Option<String>,
        format_code: Option<String>,
    ) -> Result<()> {
        let field = self.get_mut(id).ok_or(SignError::UnknownField(id))?;
        match &mut field.kind {
            FieldKind::Text {
                description: d,
                format_code: c,
            } => {
                *d = description;
                *c = format_code;
                Ok(())
            }
            _ => Err(SignError::InvalidRecord(format!(
                "{} is not a text field",
                id
            ))),
        }
    }

    /// Drop a confirm-text field whose template was never committed.
    ///
    /// Returns true if the field was removed.
    pub fn discard_if_provisional(&mut self, id: FieldId) -> bool {
        let provisional = self.get(id).is_some_and(Field::is_provisional);
        if provisional {
            self.delete(id);
        }
        provisional
    }

    pub fn fields_on_page(&self, page: u32) -> &[Field] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All fields, by page then insertion order
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.pages.values().flatten()
    }

    /// Pages that currently hold at least one field
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Fields the signer still has to fill
    pub fn missing_fields(&self) -> Vec<&Field> {
        self.all_fields().filter(|f| !f.is_filled()).collect()
    }

    pub fn filled_count(&self) -> usize {
        self.all_fields().filter(|f| f.is_filled()).count()
    }

    /// Every field has a value (vacuously true for an empty store)
    pub fn is_complete(&self) -> bool {
        self.all_fields().all(Field::is_filled)
    }
}

fn clamp_size(field_type: FieldType, requested: LogicalSize) -> LogicalSize {
    match field_type {
        FieldType::Text => LogicalSize::new(
            requested.width.max(TEXT_MIN_SIZE.width),
            requested.height.max(TEXT_MIN_SIZE.height),
        ),
        FieldType::ConfirmText => LogicalSize::new(
            requested.width.max(CONFIRM_TEXT_MIN_SIZE.width),
            requested.height.max(CONFIRM_TEXT_MIN_SIZE.height),
        ),
        FieldType::Signature => square(requested, SIGNATURE_MIN_SIDE),
        FieldType::Checkbox => square(requested, CHECKBOX_MIN_SIDE),
    }
}

fn square(requested: LogicalSize, min_side: f64) -> LogicalSize {
    let side = requested.width.max(requested.height).max(min_side);
    LogicalSize::new(side, side)
}
