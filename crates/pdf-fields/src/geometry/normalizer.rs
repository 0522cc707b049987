//! Conversion between screen, logical and relative coordinates
//!
//! The render scale maps logical units to screen pixels. Persisted field
//! geometry is relative to the logical page, so it survives any zoom level:
//!
//! ```text
//! screen --(÷ scale)--> logical --(÷ page size)--> relative
//! ```

use super::{
    LogicalPoint, LogicalRect, PageBounds, PagePoint, RelativeRect, ScreenDelta, ScreenRect,
};
use crate::constants::{MAX_SCALE, MIN_SCALE, PAGE_HEIGHT, PAGE_WIDTH, VIEWPORT_FILL};
use serde::{Deserialize, Serialize};

/// Inclusive bounds for the render scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            min: MIN_SCALE,
            max: MAX_SCALE,
        }
    }
}

impl ScaleRange {
    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }
}

/// Screen pixels per logical unit, always within a [`ScaleRange`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderScale(f64);

impl RenderScale {
    /// Create a scale, clamping it into `range`. Non-finite input falls back to 1.0.
    pub fn new(scale: f64, range: &ScaleRange) -> Self {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        Self(range.clamp(scale))
    }

    /// Default scale for a viewport: the page fills `fill` of the available width
    pub fn fit_viewport(viewport_width: f64, fill: f64, range: &ScaleRange) -> Self {
        Self::new(viewport_width * fill / PAGE_WIDTH, range)
    }

    /// Default scale with the standard viewport fill factor
    pub fn for_viewport(viewport_width: f64) -> Self {
        Self::fit_viewport(viewport_width, VIEWPORT_FILL, &ScaleRange::default())
    }

    /// Scale implied by a rendered page's on-screen width
    pub fn from_page_bounds(bounds: &PageBounds, range: &ScaleRange) -> Self {
        Self::new(bounds.width / PAGE_WIDTH, range)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for RenderScale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Converts geometry between coordinate spaces at a fixed render scale
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Normalizer {
    scale: RenderScale,
}

impl Normalizer {
    pub fn new(scale: RenderScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> RenderScale {
        self.scale
    }

    /// Rendered page size in screen pixels
    pub fn page_size_px(&self) -> (f64, f64) {
        (PAGE_WIDTH * self.scale.0, PAGE_HEIGHT * self.scale.0)
    }

    pub fn page_to_logical(&self, point: PagePoint) -> LogicalPoint {
        LogicalPoint {
            x: point.x / self.scale.0,
            y: point.y / self.scale.0,
        }
    }

    /// Screen displacement expressed in logical units
    pub fn delta_to_logical(&self, delta: ScreenDelta) -> (f64, f64) {
        (delta.dx / self.scale.0, delta.dy / self.scale.0)
    }

    pub fn logical_to_relative(rect: LogicalRect) -> RelativeRect {
        RelativeRect {
            x: rect.x / PAGE_WIDTH,
            y: rect.y / PAGE_HEIGHT,
            width: rect.width / PAGE_WIDTH,
            height: rect.height / PAGE_HEIGHT,
        }
    }

    pub fn relative_to_logical(rect: RelativeRect) -> LogicalRect {
        LogicalRect {
            x: rect.x * PAGE_WIDTH,
            y: rect.y * PAGE_HEIGHT,
            width: rect.width * PAGE_WIDTH,
            height: rect.height * PAGE_HEIGHT,
        }
    }

    /// Page-local screen rectangle for persisted geometry
    pub fn relative_to_screen(&self, rect: RelativeRect) -> ScreenRect {
        let (page_w, page_h) = self.page_size_px();
        ScreenRect {
            x: rect.x * page_w,
            y: rect.y * page_h,
            width: rect.width * page_w,
            height: rect.height * page_h,
        }
    }

    pub fn screen_to_relative(&self, rect: ScreenRect) -> RelativeRect {
        let (page_w, page_h) = self.page_size_px();
        RelativeRect {
            x: rect.x / page_w,
            y: rect.y / page_h,
            width: rect.width / page_w,
            height: rect.height / page_h,
        }
    }
}
