//! Pointer-driven placement, dragging and resizing of fields
//!
//! A single [`Gesture`] value describes what the pointer is doing:
//!
//! ```text
//! Idle --select_tool(t)--> Placing(t) --down on page--> Idle (field placed)
//!   |                         \--select_tool(t)--> Idle
//!   |--down on field body--> Dragging --up--> Idle (click or drag)
//!   \--down on resize handle--> Resizing --up--> Idle
//! ```
//!
//! Move and up events only matter while a drag or resize is active, and
//! only one such gesture can be active at a time. A drag whose total
//! displacement stays within the click threshold on both axes is reported
//! as a click, which activates the field instead.

use crate::constants::LogicalSize;
use crate::geometry::{Normalizer, PageBounds, RelativeRect, RenderScale, ScreenPoint};
use crate::options::EngineOptions;
use crate::store::FieldStore;
use crate::types::*;

/// Rendered page geometry, provided by the document renderer
pub trait PageLayout {
    fn page_count(&self) -> u32;

    /// Bounding box of a rendered page, `None` if it is not rendered yet
    fn page_bounds(&self, page: u32) -> Option<PageBounds>;
}

/// What a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Outside,
    Page(u32),
    Field(FieldId),
    ResizeHandle(FieldId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Placing(FieldType),
    Dragging {
        field: FieldId,
        /// Pointer-down position, for click detection
        origin: ScreenPoint,
        /// Position of the previous move event
        last: ScreenPoint,
        /// Geometry before the drag, restored if it turns out to be a click
        start_rect: RelativeRect,
    },
    Resizing {
        field: FieldId,
        anchor: ScreenPoint,
        anchor_size: LogicalSize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: ScreenPoint,
        target: PointerTarget,
    },
    Move {
        position: ScreenPoint,
    },
    Up {
        position: ScreenPoint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Move or up without an active drag/resize
    NoActiveGesture,
    /// Another drag/resize is still in progress
    GestureInProgress,
    /// Pointer-down while placing did not hit a page
    OutsidePage,
    /// Pointer-down in idle on empty page area
    NothingHit,
    UnknownField,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEffect {
    ToolSelected(FieldType),
    ToolCleared,
    /// A new field was placed; confirm-text fields still await their template
    Placed {
        field: FieldId,
        awaiting_template: bool,
    },
    /// The target page has no bounding box yet; nothing was created
    PlacementRejected {
        page: u32,
    },
    DragStarted(FieldId),
    Moved(FieldId),
    ResizeStarted(FieldId),
    Resized(FieldId),
    /// Pointer released within the click threshold: open the field's editor
    Activated(FieldId),
    DragCommitted(FieldId),
    ResizeCommitted(FieldId),
    Canceled,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone)]
pub struct PlacementController {
    gesture: Gesture,
    normalizer: Normalizer,
    click_threshold_px: f64,
    resize_handle_px: f64,
    options: EngineOptions,
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new(&EngineOptions::default())
    }
}

impl PlacementController {
    pub fn new(options: &EngineOptions) -> Self {
        Self {
            gesture: Gesture::Idle,
            normalizer: Normalizer::default(),
            click_threshold_px: options.click_threshold_px,
            resize_handle_px: options.resize_handle_px,
            options: options.clone(),
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Update the render scale, clamped to the configured range
    pub fn set_scale(&mut self, scale: f64) {
        self.normalizer = Normalizer::new(RenderScale::new(scale, &self.options.scale_range));
    }

    /// Derive the render scale from the viewport width
    pub fn fit_viewport(&mut self, viewport_width: f64) {
        self.normalizer = Normalizer::new(RenderScale::fit_viewport(
            viewport_width,
            self.options.viewport_fill,
            &self.options.scale_range,
        ));
    }

    /// Whether move/up events need to be delivered (a drag or resize is active)
    pub fn tracks_pointer(&self) -> bool {
        matches!(
            self.gesture,
            Gesture::Dragging { .. } | Gesture::Resizing { .. }
        )
    }

    /// Pick a tool. Selecting the active tool again puts it away.
    pub fn select_tool(&mut self, field_type: FieldType) -> ControllerEffect {
        match self.gesture {
            Gesture::Placing(current) if current == field_type => {
                self.gesture = Gesture::Idle;
                ControllerEffect::ToolCleared
            }
            Gesture::Idle | Gesture::Placing(_) => {
                self.gesture = Gesture::Placing(field_type);
                ControllerEffect::ToolSelected(field_type)
            }
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => {
                ControllerEffect::Ignored(IgnoreReason::GestureInProgress)
            }
        }
    }

    /// Abandon the current gesture without activating anything
    pub fn cancel(&mut self) -> ControllerEffect {
        if self.gesture == Gesture::Idle {
            return ControllerEffect::Ignored(IgnoreReason::NoActiveGesture);
        }
        self.gesture = Gesture::Idle;
        ControllerEffect::Canceled
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        store: &mut FieldStore,
        layout: &impl PageLayout,
    ) -> ControllerEffect {
        match event {
            PointerEvent::Down { position, target } => {
                self.pointer_down(position, target, store, layout)
            }
            PointerEvent::Move { position } => self.pointer_move(position, store),
            PointerEvent::Up { position } => self.pointer_up(position, store),
        }
    }

    pub fn pointer_down(
        &mut self,
        position: ScreenPoint,
        target: PointerTarget,
        store: &mut FieldStore,
        layout: &impl PageLayout,
    ) -> ControllerEffect {
        match self.gesture {
            Gesture::Dragging { .. } | Gesture::Resizing { .. } => {
                ControllerEffect::Ignored(IgnoreReason::GestureInProgress)
            }
            Gesture::Placing(field_type) => {
                let page = match target {
                    PointerTarget::Page(page) => Some(page),
                    PointerTarget::Field(id) | PointerTarget::ResizeHandle(id) => {
                        store.get(id).map(|f| f.page)
                    }
                    PointerTarget::Outside => None,
                };
                match page {
                    Some(page) => self.place(field_type, page, position, store, layout),
                    None => ControllerEffect::Ignored(IgnoreReason::OutsidePage),
                }
            }
            Gesture::Idle => match target {
                PointerTarget::Field(field) => {
                    let Some(start_rect) = store.get(field).map(|f| f.rect) else {
                        return ControllerEffect::Ignored(IgnoreReason::UnknownField);
                    };
                    self.gesture = Gesture::Dragging {
                        field,
                        origin: position,
                        last: position,
                        start_rect,
                    };
                    ControllerEffect::DragStarted(field)
                }
                PointerTarget::ResizeHandle(field) => {
                    let Some(anchor_size) = store.logical_size(field) else {
                        return ControllerEffect::Ignored(IgnoreReason::UnknownField);
                    };
                    self.gesture = Gesture::Resizing {
                        field,
                        anchor: position,
                        anchor_size,
                    };
                    ControllerEffect::ResizeStarted(field)
                }
                PointerTarget::Page(_) | PointerTarget::Outside => {
                    ControllerEffect::Ignored(IgnoreReason::NothingHit)
                }
            },
        }
    }

    fn place(
        &mut self,
        field_type: FieldType,
        page: u32,
        position: ScreenPoint,
        store: &mut FieldStore,
        layout: &impl PageLayout,
    ) -> ControllerEffect {
        let bounds = (page <= layout.page_count())
            .then(|| layout.page_bounds(page))
            .flatten();
        let Some(bounds) = bounds else {
            log::debug!("Rejected placement on page {}: no bounding box", page);
            return ControllerEffect::PlacementRejected { page };
        };
        let Some(local) = bounds.to_local(position) else {
            return ControllerEffect::Ignored(IgnoreReason::OutsidePage);
        };

        match store.place(field_type, page, local, &self.normalizer) {
            Ok(field) => {
                let effect = ControllerEffect::Placed {
                    field: field.id,
                    awaiting_template: field.is_provisional(),
                };
                self.gesture = Gesture::Idle;
                effect
            }
            Err(_) => ControllerEffect::PlacementRejected { page },
        }
    }

    pub fn pointer_move(&mut self, position: ScreenPoint, store: &mut FieldStore) -> ControllerEffect {
        match self.gesture {
            Gesture::Dragging {
                field,
                origin,
                last,
                start_rect,
            } => {
                store.move_by(field, position.delta_from(last), &self.normalizer);
                self.gesture = Gesture::Dragging {
                    field,
                    origin,
                    last: position,
                    start_rect,
                };
                ControllerEffect::Moved(field)
            }
            Gesture::Resizing {
                field,
                anchor,
                anchor_size,
            } => {
                self.resize_from_anchor(field, anchor, anchor_size, position, store);
                ControllerEffect::Resized(field)
            }
            Gesture::Idle | Gesture::Placing(_) => {
                ControllerEffect::Ignored(IgnoreReason::NoActiveGesture)
            }
        }
    }

    pub fn pointer_up(&mut self, position: ScreenPoint, store: &mut FieldStore) -> ControllerEffect {
        match self.gesture {
            Gesture::Dragging {
                field,
                origin,
                last,
                start_rect,
            } => {
                self.gesture = Gesture::Idle;
                if position.delta_from(origin).within(self.click_threshold_px) {
                    // A click leaves the field where it was
                    store.set_rect(field, start_rect);
                    ControllerEffect::Activated(field)
                } else {
                    store.move_by(field, position.delta_from(last), &self.normalizer);
                    ControllerEffect::DragCommitted(field)
                }
            }
            Gesture::Resizing {
                field,
                anchor,
                anchor_size,
            } => {
                self.gesture = Gesture::Idle;
                self.resize_from_anchor(field, anchor, anchor_size, position, store);
                ControllerEffect::ResizeCommitted(field)
            }
            Gesture::Idle | Gesture::Placing(_) => {
                ControllerEffect::Ignored(IgnoreReason::NoActiveGesture)
            }
        }
    }

    fn resize_from_anchor(
        &self,
        field: FieldId,
        anchor: ScreenPoint,
        anchor_size: LogicalSize,
        position: ScreenPoint,
        store: &mut FieldStore,
    ) {
        let (dw, dh) = self.normalizer.delta_to_logical(position.delta_from(anchor));
        store.resize_to(
            field,
            LogicalSize::new(anchor_size.width + dw, anchor_size.height + dh),
        );
    }

    /// Find what lies under a viewport point.
    ///
    /// Later fields are drawn on top, so they are tested first. The resize
    /// handle is the square at a field's bottom-right corner.
    pub fn hit_test(
        &self,
        position: ScreenPoint,
        store: &FieldStore,
        layout: &impl PageLayout,
    ) -> PointerTarget {
        for page in 1..=layout.page_count() {
            let Some(bounds) = layout.page_bounds(page) else {
                continue;
            };
            let Some(local) = bounds.to_local(position) else {
                continue;
            };

            for field in store.fields_on_page(page).iter().rev() {
                let rect = self.normalizer.relative_to_screen(field.rect);
                if !rect.contains(local) {
                    continue;
                }
                let on_handle = local.x >= rect.right() - self.resize_handle_px
                    && local.y >= rect.bottom() - self.resize_handle_px;
                return if on_handle {
                    PointerTarget::ResizeHandle(field.id)
                } else {
                    PointerTarget::Field(field.id)
                };
            }
            return PointerTarget::Page(page);
        }
        PointerTarget::Outside
    }
}
