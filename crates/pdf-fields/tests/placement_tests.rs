use pdf_fields::constants::{PAGE_HEIGHT, PAGE_WIDTH};
use pdf_fields::geometry::*;
use pdf_fields::*;

/// Pages stacked vertically at scale 1.0 with a 20px gap; `rendered` pages have bounds
struct TestLayout {
    page_count: u32,
    rendered: Vec<u32>,
}

impl TestLayout {
    fn new(page_count: u32) -> Self {
        Self {
            page_count,
            rendered: (1..=page_count).collect(),
        }
    }
}

impl PageLayout for TestLayout {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_bounds(&self, page: u32) -> Option<PageBounds> {
        self.rendered.contains(&page).then(|| {
            PageBounds::new(
                0.0,
                (page - 1) as f64 * (PAGE_HEIGHT + 20.0),
                PAGE_WIDTH,
                PAGE_HEIGHT,
            )
        })
    }
}

fn controller() -> PlacementController {
    let mut controller = PlacementController::default();
    controller.set_scale(1.0);
    controller
}

fn place_text(
    controller: &mut PlacementController,
    store: &mut FieldStore,
    layout: &TestLayout,
) -> FieldId {
    controller.select_tool(FieldType::Text);
    match controller.pointer_down(
        ScreenPoint::new(200.0, 200.0),
        PointerTarget::Page(1),
        store,
        layout,
    ) {
        ControllerEffect::Placed { field, .. } => field,
        other => panic!("Expected Placed, got {:?}", other),
    }
}

#[test]
fn test_select_tool_toggles() {
    let mut c = controller();
    assert_eq!(
        c.select_tool(FieldType::Signature),
        ControllerEffect::ToolSelected(FieldType::Signature)
    );
    assert_eq!(c.gesture(), Gesture::Placing(FieldType::Signature));

    // Switching tools stays in placing mode
    c.select_tool(FieldType::Checkbox);
    assert_eq!(c.gesture(), Gesture::Placing(FieldType::Checkbox));

    assert_eq!(
        c.select_tool(FieldType::Checkbox),
        ControllerEffect::ToolCleared
    );
    assert_eq!(c.gesture(), Gesture::Idle);
}

#[test]
fn test_place_on_page_returns_to_idle() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(2);

    c.select_tool(FieldType::Checkbox);
    let y = PAGE_HEIGHT + 20.0 + 100.0;
    let effect = c.pointer_down(
        ScreenPoint::new(100.0, y),
        PointerTarget::Page(2),
        &mut store,
        &layout,
    );

    let ControllerEffect::Placed {
        field,
        awaiting_template,
    } = effect
    else {
        panic!("Expected Placed, got {:?}", effect);
    };
    assert!(!awaiting_template);
    assert_eq!(c.gesture(), Gesture::Idle);

    let placed = store.get(field).unwrap();
    assert_eq!(placed.page, 2);
    // Centred on the page-local point (100, 100)
    assert!((placed.rect.x - 90.0 / PAGE_WIDTH).abs() < 1e-9);
    assert!((placed.rect.y - 90.0 / PAGE_HEIGHT).abs() < 1e-9);
}

#[test]
fn test_place_outside_page_is_ignored() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);

    c.select_tool(FieldType::Text);
    let effect = c.pointer_down(
        ScreenPoint::new(-50.0, 10.0),
        PointerTarget::Outside,
        &mut store,
        &layout,
    );
    assert_eq!(effect, ControllerEffect::Ignored(IgnoreReason::OutsidePage));
    assert_eq!(c.gesture(), Gesture::Placing(FieldType::Text));
    assert!(store.is_empty());
}

#[test]
fn test_place_on_unrendered_page_is_rejected() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout {
        page_count: 3,
        rendered: vec![1],
    };

    c.select_tool(FieldType::Text);
    let effect = c.pointer_down(
        ScreenPoint::new(100.0, 2000.0),
        PointerTarget::Page(3),
        &mut store,
        &layout,
    );
    assert_eq!(effect, ControllerEffect::PlacementRejected { page: 3 });
    assert!(store.is_empty());
    assert_eq!(c.gesture(), Gesture::Placing(FieldType::Text));
}

#[test]
fn test_confirm_text_placement_awaits_template() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);

    c.select_tool(FieldType::ConfirmText);
    let effect = c.pointer_down(
        ScreenPoint::new(300.0, 300.0),
        PointerTarget::Page(1),
        &mut store,
        &layout,
    );
    let ControllerEffect::Placed {
        field,
        awaiting_template: true,
    } = effect
    else {
        panic!("Expected provisional placement, got {:?}", effect);
    };

    // Author closes the editor without committing
    assert!(store.discard_if_provisional(field));
    assert!(store.is_empty());
}

#[test]
fn test_drag_moves_by_delta_since_last_move() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let id = place_text(&mut c, &mut store, &layout);
    let start = store.get(id).unwrap().rect;

    assert_eq!(
        c.pointer_down(
            ScreenPoint::new(200.0, 200.0),
            PointerTarget::Field(id),
            &mut store,
            &layout
        ),
        ControllerEffect::DragStarted(id)
    );
    assert!(c.tracks_pointer());

    c.pointer_move(ScreenPoint::new(210.0, 200.0), &mut store);
    c.pointer_move(ScreenPoint::new(230.0, 215.0), &mut store);
    assert_eq!(
        c.pointer_up(ScreenPoint::new(230.0, 215.0), &mut store),
        ControllerEffect::DragCommitted(id)
    );
    assert!(!c.tracks_pointer());

    let end = store.get(id).unwrap().rect;
    assert!((end.x - start.x - 30.0 / PAGE_WIDTH).abs() < 1e-9);
    assert!((end.y - start.y - 15.0 / PAGE_HEIGHT).abs() < 1e-9);
}

#[test]
fn test_release_at_threshold_is_click() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let id = place_text(&mut c, &mut store, &layout);
    let before = store.get(id).unwrap().rect;

    c.pointer_down(
        ScreenPoint::new(200.0, 200.0),
        PointerTarget::Field(id),
        &mut store,
        &layout,
    );
    c.pointer_move(ScreenPoint::new(203.0, 203.0), &mut store);
    assert_ne!(store.get(id).unwrap().rect, before);
    assert_eq!(
        c.pointer_up(ScreenPoint::new(203.0, 203.0), &mut store),
        ControllerEffect::Activated(id)
    );
    assert_eq!(c.gesture(), Gesture::Idle);
    assert_eq!(store.get(id).unwrap().rect, before);
}

#[test]
fn test_release_past_threshold_is_drag() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let id = place_text(&mut c, &mut store, &layout);

    c.pointer_down(
        ScreenPoint::new(200.0, 200.0),
        PointerTarget::Field(id),
        &mut store,
        &layout,
    );
    assert_eq!(
        c.pointer_up(ScreenPoint::new(200.0, 203.01), &mut store),
        ControllerEffect::DragCommitted(id)
    );
}

#[test]
fn test_only_one_active_gesture() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let first = place_text(&mut c, &mut store, &layout);
    c.select_tool(FieldType::Checkbox);
    let ControllerEffect::Placed { field: second, .. } = c.pointer_down(
        ScreenPoint::new(400.0, 600.0),
        PointerTarget::Page(1),
        &mut store,
        &layout,
    ) else {
        panic!("Expected Placed");
    };

    c.pointer_down(
        ScreenPoint::new(200.0, 200.0),
        PointerTarget::Field(first),
        &mut store,
        &layout,
    );
    assert_eq!(
        c.pointer_down(
            ScreenPoint::new(400.0, 600.0),
            PointerTarget::Field(second),
            &mut store,
            &layout
        ),
        ControllerEffect::Ignored(IgnoreReason::GestureInProgress)
    );
    assert_eq!(
        c.select_tool(FieldType::Text),
        ControllerEffect::Ignored(IgnoreReason::GestureInProgress)
    );

    c.pointer_up(ScreenPoint::new(250.0, 250.0), &mut store);
    assert_eq!(
        c.pointer_down(
            ScreenPoint::new(400.0, 600.0),
            PointerTarget::Field(second),
            &mut store,
            &layout
        ),
        ControllerEffect::DragStarted(second)
    );
}

#[test]
fn test_moves_without_gesture_are_ignored() {
    let mut c = controller();
    let mut store = FieldStore::new();
    assert_eq!(
        c.pointer_move(ScreenPoint::new(1.0, 1.0), &mut store),
        ControllerEffect::Ignored(IgnoreReason::NoActiveGesture)
    );
    assert_eq!(
        c.pointer_up(ScreenPoint::new(1.0, 1.0), &mut store),
        ControllerEffect::Ignored(IgnoreReason::NoActiveGesture)
    );
}

#[test]
fn test_resize_from_handle() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let id = place_text(&mut c, &mut store, &layout);
    let start_rect = store.get(id).unwrap().rect;

    assert_eq!(
        c.pointer_down(
            ScreenPoint::new(274.0, 214.0),
            PointerTarget::ResizeHandle(id),
            &mut store,
            &layout
        ),
        ControllerEffect::ResizeStarted(id)
    );
    c.pointer_move(ScreenPoint::new(300.0, 230.0), &mut store);
    assert_eq!(
        c.pointer_up(ScreenPoint::new(324.0, 234.0), &mut store),
        ControllerEffect::ResizeCommitted(id)
    );

    let size = store.logical_size(id).unwrap();
    assert!((size.width - 200.0).abs() < 1e-9);
    assert!((size.height - 50.0).abs() < 1e-9);
    // Position is untouched by a resize
    assert_eq!(store.get(id).unwrap().rect.x, start_rect.x);
}

#[test]
fn test_resize_below_minimum_clamps() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let id = place_text(&mut c, &mut store, &layout);

    c.pointer_down(
        ScreenPoint::new(274.0, 214.0),
        PointerTarget::ResizeHandle(id),
        &mut store,
        &layout,
    );
    c.pointer_up(ScreenPoint::new(0.0, 0.0), &mut store);
    let size = store.logical_size(id).unwrap();
    assert!((size.width - 30.0).abs() < 1e-9);
    assert!((size.height - 10.0).abs() < 1e-9);
}

#[test]
fn test_cancel_drops_gesture_without_activation() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(1);
    let id = place_text(&mut c, &mut store, &layout);

    c.pointer_down(
        ScreenPoint::new(200.0, 200.0),
        PointerTarget::Field(id),
        &mut store,
        &layout,
    );
    assert_eq!(c.cancel(), ControllerEffect::Canceled);
    assert!(!c.tracks_pointer());
    assert_eq!(
        c.pointer_up(ScreenPoint::new(200.0, 200.0), &mut store),
        ControllerEffect::Ignored(IgnoreReason::NoActiveGesture)
    );
}

#[test]
fn test_hit_test_finds_fields_and_handles() {
    let mut c = controller();
    let mut store = FieldStore::new();
    let layout = TestLayout::new(2);
    // Text field spans (125, 185)..(275, 215) on page 1
    let id = place_text(&mut c, &mut store, &layout);

    assert_eq!(
        c.hit_test(ScreenPoint::new(150.0, 200.0), &store, &layout),
        PointerTarget::Field(id)
    );
    assert_eq!(
        c.hit_test(ScreenPoint::new(272.0, 212.0), &store, &layout),
        PointerTarget::ResizeHandle(id)
    );
    assert_eq!(
        c.hit_test(ScreenPoint::new(500.0, 500.0), &store, &layout),
        PointerTarget::Page(1)
    );
    assert_eq!(
        c.hit_test(
            ScreenPoint::new(100.0, PAGE_HEIGHT + 30.0),
            &store,
            &layout
        ),
        PointerTarget::Page(2)
    );
    assert_eq!(
        c.hit_test(ScreenPoint::new(100.0, PAGE_HEIGHT + 10.0), &store, &layout),
        PointerTarget::Outside
    );
}

#[test]
fn test_scale_is_clamped_by_options() {
    let mut c = controller();
    c.set_scale(10.0);
    assert_eq!(c.normalizer().scale().value(), 2.5);
    c.fit_viewport(100.0);
    assert_eq!(c.normalizer().scale().value(), 0.6);
}
