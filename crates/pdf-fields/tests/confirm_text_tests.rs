use pdf_fields::confirm_text::validate_authoring;
use pdf_fields::geometry::*;
use pdf_fields::*;

#[test]
fn test_render_selected_choice() {
    let mut template = ConfirmTemplate::parse("본인은 {A/B} 입니다");
    assert_eq!(template.render(), "본인은 A 입니다");

    template.select(0, 1).unwrap();
    assert_eq!(template.render(), "본인은 B 입니다");
}

#[test]
fn test_verify_complete_and_mismatch() {
    let mut template = ConfirmTemplate::parse("본인은 {A/B} 입니다");
    template.select(0, 1).unwrap();

    let ok = template.verify("본인은 B 입니다");
    assert!(ok.is_complete());
    assert!(ok.chars.iter().all(|c| c.is_correct()));

    let wrong = template.verify("본인은 A 입니다");
    assert_eq!(wrong.status, MatchStatus::Mismatch { position: 4 });
    assert_eq!(wrong.error_position(), Some(4));
    assert!(wrong.chars[4].is_error());
    assert!(wrong.chars[3].is_correct());
}

#[test]
fn test_partial_input_is_correct_so_far() {
    let template = ConfirmTemplate::parse("I accept");
    assert_eq!(template.verify("").status, MatchStatus::Empty);
    assert_eq!(template.verify("I acc").status, MatchStatus::CorrectSoFar);

    // Remaining rendered characters are pending, not errors
    let partial = template.verify("I acc");
    assert!(partial.chars[5..].iter().all(|c| !c.is_error()));
}

#[test]
fn test_input_longer_than_rendered_is_mismatch() {
    let template = ConfirmTemplate::parse("yes");
    assert_eq!(
        template.verify("yess").status,
        MatchStatus::Mismatch { position: 3 }
    );
}

#[test]
fn test_trailing_whitespace_still_completes() {
    let template = ConfirmTemplate::parse("I agree");
    assert!(template.verify("I agree  ").is_complete());
}

#[test]
fn test_template_without_groups_is_literal() {
    let template = ConfirmTemplate::parse("plain sentence");
    assert!(template.groups().is_empty());
    assert_eq!(template.render(), "plain sentence");
}

#[test]
fn test_select_out_of_range() {
    let mut template = ConfirmTemplate::parse("{a/b} and {c/d/e}");
    assert!(matches!(
        template.select(1, 3),
        Err(SignError::OptionOutOfRange { group: 1, choice: 3 })
    ));
    assert!(matches!(
        template.select(2, 0),
        Err(SignError::OptionOutOfRange { group: 2, choice: 0 })
    ));
    template.select(1, 2).unwrap();
    assert_eq!(template.render(), "a and e");
}

#[test]
fn test_changing_selection_keeps_input() {
    let mut entry = ConfirmTextEntry::new(ConfirmTemplate::parse("I am the {buyer/seller}"));
    assert!(entry.set_input("I am the seller").status != MatchStatus::Complete);

    let verification = entry.select(0, 1).unwrap();
    assert_eq!(entry.input(), "I am the seller");
    assert!(verification.is_complete());
    assert_eq!(entry.submit().unwrap(), "I am the seller");
}

#[test]
fn test_submit_rejects_incomplete_and_wrong_input() {
    let mut entry = ConfirmTextEntry::new(ConfirmTemplate::parse("agree"));

    assert!(matches!(
        entry.submit(),
        Err(SignError::ConfirmTextIncomplete {
            typed: 0,
            expected: 5
        })
    ));

    entry.set_input("agr");
    assert!(matches!(
        entry.submit(),
        Err(SignError::ConfirmTextIncomplete {
            typed: 3,
            expected: 5
        })
    ));

    entry.set_input("agrie");
    assert!(matches!(
        entry.submit(),
        Err(SignError::ConfirmTextMismatch { position: 3 })
    ));

    entry.set_input(" agree ");
    assert_eq!(entry.submit().unwrap(), "agree");
}

#[test]
fn test_entry_for_field() {
    let mut store = FieldStore::new();
    let normalizer = Normalizer::default();
    let confirm = store
        .place(
            FieldType::ConfirmText,
            1,
            PagePoint::new(200.0, 200.0),
            &normalizer,
        )
        .unwrap()
        .id;
    let text = store
        .place(FieldType::Text, 1, PagePoint::new(300.0, 300.0), &normalizer)
        .unwrap()
        .id;

    // Provisional field has no template yet
    assert!(ConfirmTextEntry::for_field(store.get(confirm).unwrap()).is_err());

    store
        .set_confirm_template(confirm, "I read {all/part} of it")
        .unwrap();
    let entry = ConfirmTextEntry::for_field(store.get(confirm).unwrap()).unwrap();
    assert_eq!(entry.template().render(), "I read all of it");

    assert!(matches!(
        ConfirmTextEntry::for_field(store.get(text).unwrap()),
        Err(SignError::NotConfirmText(id)) if id == text
    ));
}

#[test]
fn test_authoring_accepts_any_text() {
    assert!(validate_authoring("no groups at all").is_ok());
    assert!(validate_authoring("{unclosed").is_ok());
    assert!(matches!(
        validate_authoring(" \n "),
        Err(SignError::EmptyTemplate)
    ));
}
