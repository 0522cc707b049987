//! Shared constants for field placement
//!
//! This module centralizes the page geometry, default field sizes and
//! interaction thresholds used throughout the engine.

use crate::types::FieldType;

// =============================================================================
// Logical Page
// =============================================================================

/// Logical page width (A4 in points)
pub const PAGE_WIDTH: f64 = 595.28;

/// Logical page height (A4 in points)
pub const PAGE_HEIGHT: f64 = 841.89;

/// Height-to-width ratio of the logical page (≈ 1.414)
pub const PAGE_ASPECT: f64 = PAGE_HEIGHT / PAGE_WIDTH;

// =============================================================================
// Render Scale
// =============================================================================

/// Smallest supported render scale (screen units per logical unit)
pub const MIN_SCALE: f64 = 0.6;

/// Largest supported render scale
pub const MAX_SCALE: f64 = 2.5;

/// Share of the viewport width a page occupies at the default scale
pub const VIEWPORT_FILL: f64 = 0.9;

// =============================================================================
// Interaction
// =============================================================================

/// Maximum pointer displacement (screen pixels, per axis) still treated as a click
pub const CLICK_THRESHOLD_PX: f64 = 3.0;

/// Edge length of the square resize handle at a field's bottom-right corner
pub const RESIZE_HANDLE_PX: f64 = 10.0;

// =============================================================================
// Field Sizes (logical units)
// =============================================================================

/// Width and height in logical units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub const CHECKBOX_SIZE: LogicalSize = LogicalSize::new(20.0, 20.0);

/// Nominal signature box. The aspect lock replaces the height with the width.
pub const SIGNATURE_SIZE: LogicalSize = LogicalSize::new(100.0, 60.0);

pub const TEXT_SIZE: LogicalSize = LogicalSize::new(150.0, 30.0);

pub const CONFIRM_TEXT_SIZE: LogicalSize = LogicalSize::new(250.0, 50.0);

pub const TEXT_MIN_SIZE: LogicalSize = LogicalSize::new(30.0, 10.0);

pub const CONFIRM_TEXT_MIN_SIZE: LogicalSize = LogicalSize::new(100.0, 30.0);

pub const CHECKBOX_MIN_SIDE: f64 = 10.0;

pub const SIGNATURE_MIN_SIDE: f64 = 30.0;

/// Size a freshly placed field gets
pub fn default_size(field_type: FieldType) -> LogicalSize {
    match field_type {
        FieldType::Checkbox => CHECKBOX_SIZE,
        // Square in logical units so it renders square on the 1:1.414 page
        FieldType::Signature => LogicalSize::new(SIGNATURE_SIZE.width, SIGNATURE_SIZE.width),
        FieldType::Text => TEXT_SIZE,
        FieldType::ConfirmText => CONFIRM_TEXT_SIZE,
    }
}
