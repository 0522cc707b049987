use pdf_fields::geometry::*;
use pdf_fields::*;

/// Text fields on page 1, filled with the given values ("" leaves a field empty)
fn store_with(values: &[&str]) -> FieldStore {
    let mut store = FieldStore::new();
    let normalizer = Normalizer::default();
    for (i, value) in values.iter().enumerate() {
        let id = store
            .place(
                FieldType::Text,
                1,
                PagePoint::new(200.0, 50.0 + 40.0 * i as f64),
                &normalizer,
            )
            .unwrap()
            .id;
        store.set_value(id, *value).unwrap();
    }
    store
}

fn templates(specs: &[(&str, &[&str])]) -> Vec<Template> {
    specs
        .iter()
        .enumerate()
        .map(|(i, (name, values))| {
            Template::new(format!("pdf-{}", i), *name, i).with_fields(store_with(values))
        })
        .collect()
}

fn fill_all(template: &mut Template) {
    let ids: Vec<FieldId> = template.fields.all_fields().map(|f| f.id).collect();
    for id in ids {
        template.fields.set_value(id, "filled").unwrap();
    }
}

#[test]
fn test_jump_past_incomplete_names_it() {
    let mut templates = templates(&[("A", &["x", ""]), ("B", &["y"]), ("C", &[""])]);
    let mut sequencer = TemplateSequencer::new(&templates);

    match sequencer.jump_to(&templates, 2) {
        Err(SignError::SkippedIncomplete {
            index,
            name,
            remaining,
        }) => {
            assert_eq!(index, 0);
            assert_eq!(name, "A");
            assert_eq!(remaining, 1);
        }
        other => panic!("Expected SkippedIncomplete, got {:?}", other),
    }
    assert_eq!(sequencer.current(), 0);

    fill_all(&mut templates[0]);
    assert_eq!(sequencer.jump_to(&templates, 2).unwrap(), 2);
    assert_eq!(sequencer.current(), 2);
}

#[test]
fn test_jump_names_first_incomplete_in_between() {
    let templates = templates(&[("A", &["x"]), ("B", &[""]), ("C", &[""]), ("D", &[])]);
    let mut sequencer = TemplateSequencer::new(&templates);

    let err = sequencer.jump_to(&templates, 3).unwrap_err();
    assert!(matches!(err, SignError::SkippedIncomplete { index: 1, .. }));
}

#[test]
fn test_backward_jump_always_allowed() {
    let templates = templates(&[("A", &["x"]), ("B", &["y"]), ("C", &[""])]);
    let mut sequencer = TemplateSequencer::new(&templates);

    sequencer.jump_to(&templates, 2).unwrap();
    // C is incomplete, but going back never needs it
    assert_eq!(sequencer.jump_to(&templates, 0).unwrap(), 0);
    assert_eq!(sequencer.jump_to(&templates, 0).unwrap(), 0);
}

#[test]
fn test_jump_out_of_range() {
    let templates = templates(&[("A", &["x"])]);
    let mut sequencer = TemplateSequencer::new(&templates);
    assert!(matches!(
        sequencer.jump_to(&templates, 1),
        Err(SignError::TemplateOutOfRange { index: 1, len: 1 })
    ));
}

#[test]
fn test_advance_requires_complete_template() {
    let mut templates = templates(&[("A", &["", ""]), ("B", &["y"])]);
    let mut sequencer = TemplateSequencer::new(&templates);

    assert!(matches!(
        sequencer.advance(&templates),
        Err(SignError::TemplateIncomplete {
            index: 0,
            remaining: 2,
            ..
        })
    ));

    fill_all(&mut templates[0]);
    assert_eq!(sequencer.advance(&templates).unwrap(), 1);
    assert!(matches!(
        sequencer.advance(&templates),
        Err(SignError::AtLastTemplate)
    ));
}

#[test]
fn test_retreat_stops_at_first() {
    let templates = templates(&[("A", &["x"]), ("B", &[])]);
    let mut sequencer = TemplateSequencer::new(&templates);

    assert!(matches!(sequencer.retreat(), Err(SignError::AtFirstTemplate)));
    sequencer.advance(&templates).unwrap();
    assert_eq!(sequencer.retreat().unwrap(), 0);
}

#[test]
fn test_template_without_fields_is_complete() {
    let templates = templates(&[("Cover", &[]), ("Body", &[""])]);
    let mut sequencer = TemplateSequencer::new(&templates);

    assert!(sequencer.is_completed(0));
    assert_eq!(sequencer.advance(&templates).unwrap(), 1);
}

#[test]
fn test_completion_follows_field_events() {
    let mut templates = templates(&[("A", &[""]), ("B", &["y"])]);
    let mut sequencer = TemplateSequencer::new(&templates);
    assert_eq!(sequencer.completed().len(), 1);

    let field = templates[0].fields.all_fields().next().unwrap().id;
    templates[0].fields.set_value(field, "done").unwrap();
    let event = SessionEvent::FieldValueChanged { template: 0, field };
    assert_eq!(
        sequencer.on_event(&event, &templates),
        Some(SessionEvent::TemplateCompleted { template: 0 })
    );
    assert!(sequencer.all_complete());

    // Same state again produces no follow-up
    assert_eq!(sequencer.on_event(&event, &templates), None);

    templates[0].fields.set_value(field, "").unwrap();
    assert_eq!(
        sequencer.on_event(&event, &templates),
        Some(SessionEvent::TemplateReopened { template: 0 })
    );
}

#[test]
fn test_progress_ratios() {
    let templates = templates(&[("A", &["x", "", "z", ""]), ("B", &[])]);
    let sequencer = TemplateSequencer::new(&templates);
    let progress = sequencer.progress(&templates);

    assert_eq!(progress.len(), 2);
    assert_eq!(progress[0].name, "A");
    assert_eq!(progress[0].filled, 2);
    assert_eq!(progress[0].total, 4);
    assert!((progress[0].ratio - 0.5).abs() < 1e-12);
    assert!(!progress[0].complete);
    assert_eq!(progress[1].ratio, 1.0);
    assert!(progress[1].complete);
}
