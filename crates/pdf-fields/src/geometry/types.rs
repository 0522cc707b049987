//! Geometry data types
//!
//! All rectangles use a top-left origin with y growing downwards, matching
//! how rendered pages are laid out on screen.

/// A point in viewport coordinates (screen pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Displacement from `origin` to this point
    pub fn delta_from(self, origin: ScreenPoint) -> ScreenDelta {
        ScreenDelta::new(self.x - origin.x, self.y - origin.y)
    }
}

/// A point in screen pixels relative to a rendered page's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePoint {
    pub x: f64,
    pub y: f64,
}

impl PagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A displacement in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenDelta {
    pub dx: f64,
    pub dy: f64,
}

impl ScreenDelta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// True when neither axis moved further than `threshold`
    pub fn within(self, threshold: f64) -> bool {
        self.dx.abs() <= threshold && self.dy.abs() <= threshold
    }
}

/// A rectangle in page-local screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: PagePoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// A point in logical page units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalPoint {
    pub x: f64,
    pub y: f64,
}

/// A rectangle in logical page units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Position and size as fractions of the logical page
///
/// `x` and `y` are never negative and `width`/`height` are positive; the
/// right and bottom edges may run past 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelativeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RelativeRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the persisted-coordinate invariants
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Bounding box of a rendered page in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PageBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }

    /// Translate a viewport point into page-local pixels, if it lies on the page
    pub fn to_local(&self, point: ScreenPoint) -> Option<PagePoint> {
        self.contains(point)
            .then(|| PagePoint::new(point.x - self.left, point.y - self.top))
    }
}
