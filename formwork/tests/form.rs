//! Tests for the form container and data aggregation.

use formwork::prelude::*;

fn text_element(name: &str, rules: Rules) -> InputElement<String> {
    let rules: SharedValidator<String> = std::sync::Arc::new(rules);
    let settings = InputElementSettings::new("value", move || {
        ValidationSettings::shared(std::sync::Arc::clone(&rules))
    })
    .reset_value_property("defaultValue")
    .input_selector("input");
    let element = InputElement::new(settings, String::new());
    element.set_name(Some(name.to_string()));
    element
}

#[test]
fn test_data_collects_named_participants() {
    let form = Form::new("create-key");
    let key_name = text_element("keyName", Rules::new());
    key_name.attach(&form);
    key_name.set_value("my-key".to_string());

    let region = NativeInput::with_value("region", "eu-west-1");
    form.register(FormParticipant::Native(region));
    form.register(FormParticipant::Native(NativeInput::unnamed()));

    let data = form.data();
    assert_eq!(form.len(), 3);
    assert_eq!(data.len(), 2);
    assert_eq!(data.text("keyName"), Some("my-key"));
    assert_eq!(data.text("region"), Some("eu-west-1"));
}

#[test]
fn test_data_is_recomputed_on_every_call() {
    let form = Form::new("f");
    let input = NativeInput::new("size");
    form.register(FormParticipant::Native(input.clone()));

    assert_eq!(form.data().text("size"), Some(""));
    input.set_value("42");
    assert_eq!(form.data().text("size"), Some("42"));
}

#[test]
fn test_duplicate_names_last_registered_wins() {
    let form = Form::new("f");
    form.register(FormParticipant::Native(NativeInput::with_value("tag", "first")));
    form.register(FormParticipant::Native(NativeInput::with_value("tag", "second")));
    assert_eq!(form.data().text("tag"), Some("second"));
}

#[test]
fn test_disabled_participants_are_excluded() {
    let form = Form::new("f");
    let input = NativeInput::with_value("note", "hello");
    input.set_disabled(true);
    form.register(FormParticipant::Native(input));

    let element = text_element("name", Rules::new().required("empty"));
    element.attach(&form);
    element.set_disabled(true);
    element.update();

    assert!(form.data().is_empty());
    assert!(form.check_validity());
    assert_eq!(form.submit(), Submission::Accepted(FormData::new()));
}

#[test]
fn test_cross_field_rule_sees_sibling_changes() {
    let form = Form::new("rename");
    let field_a = text_element("A", Rules::new());
    let field_b = text_element(
        "B",
        Rules::new().differs_from_field("A", "same-as-a"),
    );
    field_a.attach(&form);
    field_b.attach(&form);

    field_b.set_value("alpha".to_string());
    field_b.update();
    assert!(field_b.check_validity());

    field_a.set_value("alpha".to_string());
    field_a.update();
    assert!(field_b.check_validity());

    assert_eq!(field_b.validate(false), Validity::invalid("same-as-a"));
    assert!(!field_b.check_validity());
}

#[test]
fn test_detached_element_validates_against_empty_data() {
    let element = text_element("B", Rules::new().matches_field("A", "mismatch"));
    element.set_value("x".to_string());
    assert_eq!(element.validate(false), Validity::invalid("mismatch"));
    assert!(element.form_data().is_empty());
}

#[test]
fn test_submit_blocked_reports_invalid_participants() {
    let form = Form::new("f");
    let name = text_element("name", Rules::new().required("empty").message("empty", "Enter a name."));
    let note = text_element("note", Rules::new());
    name.attach(&form);
    note.attach(&form);
    name.update();
    note.update();

    let required = NativeInput::new("owner");
    required.set_required(true);
    form.register(FormParticipant::Native(required.clone()));

    assert!(!form.check_validity());
    assert_eq!(name.error_message(), None);

    let submission = form.submit();
    assert_eq!(
        submission,
        Submission::Blocked {
            invalid: vec![name.id(), required.id()]
        }
    );
    assert!(!submission.is_accepted());
    assert_eq!(name.error_message(), Some("Enter a name.".into()));
    assert!(name.take_focus_request());
    assert!(!note.take_focus_request());
    assert!(required.validity().value_missing);
    assert_eq!(required.validation_message(), "Please fill out this field.");
}

#[test]
fn test_submit_uses_published_values() {
    let form = Form::new("f");
    let name = text_element("name", Rules::new());
    name.attach(&form);
    name.set_value("published".to_string());
    name.update();

    name.set_value("pending".to_string());
    assert_eq!(form.data().text("name"), Some("pending"));

    match form.submit() {
        Submission::Accepted(data) => assert_eq!(data.text("name"), Some("published")),
        other => panic!("unexpected submission: {:?}", other),
    }
}

#[test]
fn test_reset_restores_every_participant() {
    let form = Form::new("f");
    let name = text_element("name", Rules::new().min_length(3, "too-short"));
    name.set_reset_value("default".to_string());
    name.attach(&form);
    name.set_value("ab".to_string());
    name.update();
    name.validate(true);
    assert_eq!(name.error_message(), Some("too-short".into()));

    let native = NativeInput::with_value("region", "eu-west-1");
    native.set_value("us-east-1");
    form.register(FormParticipant::Native(native.clone()));

    form.reset();

    assert_eq!(name.value(), "default");
    assert_eq!(name.error_message(), None);
    assert!(name.check_validity());
    assert_eq!(native.value(), "eu-west-1");
    assert_eq!(form.data().text("name"), Some("default"));
}

#[test]
fn test_attach_moves_between_forms() {
    let first = Form::new("first");
    let second = Form::new("second");
    let element = text_element("name", Rules::new());

    element.attach(&first);
    assert!(first.contains(element.id()));

    element.attach(&second);
    assert!(!first.contains(element.id()));
    assert!(second.contains(element.id()));
    assert!(element.form().is_some_and(|form| form.ptr_eq(&second)));

    element.attach(&second);
    assert_eq!(second.len(), 1);

    element.detach();
    assert!(second.is_empty());
    assert!(element.form().is_none());
}

#[test]
fn test_dropped_form_detaches_element() {
    let element = text_element("name", Rules::new());
    {
        let form = Form::new("temporary");
        element.attach(&form);
        assert!(element.form().is_some());
    }
    assert!(element.form().is_none());
    assert!(element.validate(false).is_valid());
}

#[test]
fn test_report_validity_visits_every_participant() {
    let form = Form::new("f");
    let first = text_element("first", Rules::new().required("empty"));
    let second = text_element("second", Rules::new().required("empty"));
    first.attach(&form);
    second.attach(&form);
    first.update();
    second.update();

    assert!(!form.report_validity());
    assert!(first.take_focus_request());
    assert!(second.take_focus_request());
}

#[test]
fn test_native_custom_validity() {
    let input = NativeInput::with_value("name", "taken");
    assert!(input.check_validity());
    input.set_custom_validity("Already in use");
    assert!(!input.check_validity());
    assert!(input.validity().custom_error);
    assert_eq!(input.validation_message(), "Already in use");
    input.set_custom_validity("");
    assert!(input.report_validity());
}

#[test]
fn test_form_data_serializes_flat() {
    let form = Form::new("f");
    form.register(FormParticipant::Native(NativeInput::with_value("b", "2")));
    form.register(FormParticipant::Native(NativeInput::with_value("a", "1")));

    let json = serde_json::to_string(&form.data()).unwrap();
    assert_eq!(json, r#"{"a":"1","b":"2"}"#);
}

#[test]
fn test_file_and_nested_contributions() {
    let file = FileBlob {
        name: "id_ed25519.pub".to_string(),
        content_type: "text/plain".to_string(),
        bytes: b"ssh-ed25519 AAAA".to_vec(),
    };
    assert_eq!(Some(file.clone()).to_form_value(), Some(FormValue::File(file)));
    assert_eq!(None::<FileBlob>.to_form_value(), None);

    let nested: FormData = [("start", FormValue::from("1")), ("end", FormValue::from("9"))]
        .into_iter()
        .collect();
    assert_eq!(nested.to_form_value(), Some(FormValue::Entries(nested.clone())));
}
