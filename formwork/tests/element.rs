//! Tests for the input element state machine.

use std::sync::{Arc, Mutex};

use formwork::prelude::*;

/// Treats `"invalid"` as invalid, everything else (including empty) as valid.
fn rule() -> impl Validator<String> {
    validator_fn(|value: &String, _: &FormData| {
        if value == "invalid" {
            Validity::invalid("invalid")
        } else {
            Validity::Valid
        }
    })
}

fn settings(messages: ErrorMessageMap) -> InputElementSettings<String> {
    InputElementSettings::new("value", move || {
        ValidationSettings::new(rule()).error_messages(messages.clone())
    })
    .reset_value_property("defaultValue")
    .input_selector("input")
    .error_selector(".error")
    .reactive_property("format")
}

fn element() -> InputElement<String> {
    let element = InputElement::new(settings(ErrorMessageMap::new()), String::new());
    element.update();
    element
}

#[test]
fn test_pristine_element_is_valid_before_first_update() {
    let element = InputElement::new(settings(ErrorMessageMap::new()), "invalid".to_string());
    assert!(element.validity().valid);
    assert!(element.pending_changes().contains(&Property::Value));

    assert_eq!(
        element.update(),
        UpdateOutcome::Revalidated(Validity::invalid("invalid"))
    );
    assert!(!element.validity().valid);
    assert_eq!(element.error_message(), None);
}

#[test]
fn test_update_without_changes_is_unchanged() {
    let element = element();
    assert_eq!(element.update(), UpdateOutcome::Unchanged);
}

#[test]
fn test_empty_value_is_valid_for_optional_rule() {
    let element = element();
    element.set_value(String::new());
    assert_eq!(element.validate(false), Validity::Valid);
    assert!(element.validity().valid);
    assert!(element.check_validity());
}

#[test]
fn test_silent_validation_leaves_error_message_untouched() {
    let element = element();
    element.set_value("invalid".to_string());

    assert_eq!(element.validate(false), Validity::invalid("invalid"));
    assert!(!element.validity().valid);
    assert!(element.validity().custom_error);
    assert_eq!(element.validation_message(), "invalid");
    assert_eq!(element.error_message(), None);
}

#[test]
fn test_silent_validation_keeps_previous_message() {
    let element = element();
    element.set_error_message(Some("Earlier message".into()));
    element.update();

    element.set_value("invalid".to_string());
    element.validate(false);
    assert_eq!(element.error_message(), Some("Earlier message".into()));
}

#[test]
fn test_valid_result_never_touches_error_message() {
    let element = element();
    element.set_value("invalid".to_string());
    element.validate(true);
    assert_eq!(element.error_message(), Some("invalid".into()));

    element.set_value("fine".to_string());
    assert!(element.validate(true).is_valid());
    assert_eq!(element.error_message(), Some("invalid".into()));
}

#[test]
fn test_report_falls_back_to_code() {
    let element = element();
    element.set_value("invalid".to_string());
    element.validate(true);
    assert_eq!(element.error_message(), Some(ErrorMessage::from("invalid")));
}

#[test]
fn test_report_uses_instance_override() {
    let element = element();
    element.set_custom_error_messages(Some(
        ErrorMessageMap::new().with("invalid", "Translated message"),
    ));
    element.set_value("invalid".to_string());
    element.validate(true);
    assert_eq!(
        element.error_message(),
        Some(ErrorMessage::from("Translated message"))
    );
}

#[test]
fn test_instance_override_wins_over_settings_messages() {
    let element = InputElement::new(
        settings(ErrorMessageMap::new().with("invalid", "Default message")),
        "invalid".to_string(),
    );
    element.validate(true);
    assert_eq!(element.error_message(), Some("Default message".into()));

    element.set_custom_error_messages(Some(ErrorMessageMap::new().with("invalid", "Override")));
    element.validate(true);
    assert_eq!(element.error_message(), Some("Override".into()));
}

#[test]
fn test_report_only_signals_when_message_changes() {
    let element = element();
    element.set_value("invalid".to_string());
    element.validate(true);
    element.update();
    element.clear_dirty();

    element.validate(true);
    assert!(element.pending_changes().is_empty());
    assert!(!element.is_dirty());
}

#[test]
fn test_silent_validation_is_idempotent() {
    let element = element();
    element.set_value("invalid".to_string());
    element.update();

    let first = element.validate(false);
    let second = element.validate(false);
    assert_eq!(first, second);
    assert_eq!(element.error_message(), None);
    assert!(element.pending_changes().is_empty());
}

#[test]
fn test_value_change_revalidates_and_publishes() {
    let element = element();
    element.set_value("invalid".to_string());

    assert_eq!(
        element.update(),
        UpdateOutcome::Revalidated(Validity::invalid("invalid"))
    );
    assert_eq!(element.submission_value(), Some(FormValue::from("invalid")));
}

#[test]
fn test_setting_same_value_records_nothing() {
    let element = element();
    element.set_value(String::new());
    assert_eq!(element.update(), UpdateOutcome::Unchanged);
}

#[test]
fn test_reactive_property_revalidates() {
    let element = element();
    element.request_update("format");
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));

    element.request_update("placeholder");
    assert_eq!(element.update(), UpdateOutcome::Skipped);
}

#[test]
fn test_request_update_of_value_property_publishes() {
    let element = element();
    element.request_update("value");
    assert!(element.pending_changes().contains(&Property::Value));
    assert!(matches!(element.update(), UpdateOutcome::Revalidated(_)));
}

#[test]
fn test_custom_validator_replaces_default_and_revalidates() {
    let element = element();
    element.set_value("anything".to_string());
    element.update();
    assert!(element.check_validity());

    element.set_custom_validator(validator_fn(|value: &String, _: &FormData| {
        if value.len() > 3 {
            Validity::invalid("too-long")
        } else {
            Validity::Valid
        }
    }));
    assert!(element.has_custom_validator());
    assert_eq!(
        element.update(),
        UpdateOutcome::Revalidated(Validity::invalid("too-long"))
    );

    element.set_shared_custom_validator(None);
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));
}

#[test]
fn test_custom_error_messages_change_revalidates() {
    let element = element();
    element.set_custom_error_messages(Some(ErrorMessageMap::new().with("invalid", "Nope")));
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));
}

#[test]
fn test_non_empty_error_message_forces_invalid() {
    let element = element();
    assert!(element.check_validity());

    element.set_error_message(Some("Name already taken".into()));
    assert_eq!(
        element.update(),
        UpdateOutcome::Overridden("Name already taken".to_string())
    );
    assert!(!element.validity().valid);
    assert_eq!(element.validation_message(), "Name already taken");
}

#[test]
fn test_error_message_override_wins_over_value_change_in_same_batch() {
    let element = element();
    element.set_value("fine".to_string());
    element.set_error_message(Some("Server rejected".into()));

    assert_eq!(
        element.update(),
        UpdateOutcome::Overridden("Server rejected".to_string())
    );
    assert!(!element.check_validity());
    assert_eq!(element.submission_value(), Some(FormValue::from("fine")));
}

#[test]
fn test_clearing_error_message_restores_rule_validity() {
    let element = element();
    element.set_error_message(Some("Server rejected".into()));
    element.update();
    assert!(!element.check_validity());

    element.set_error_message(None);
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));
    assert!(element.check_validity());
    assert_eq!(element.validation_message(), "");
}

#[test]
fn test_empty_string_error_message_also_revalidates() {
    let element = element();
    element.set_value("invalid".to_string());
    element.set_error_message(Some("Server rejected".into()));
    element.update();

    element.set_error_message(Some("".into()));
    assert_eq!(
        element.update(),
        UpdateOutcome::Revalidated(Validity::invalid("invalid"))
    );
    assert_eq!(element.validation_message(), "invalid");
}

#[test]
fn test_set_custom_validity() {
    let element = element();
    element.set_custom_validity("Quota exceeded");
    assert!(!element.check_validity());
    assert_eq!(element.validation_message(), "Quota exceeded");
    assert_eq!(element.error_message(), None);

    element.set_custom_validity("");
    assert!(element.check_validity());
}

#[test]
fn test_report_validity_requests_focus_and_exposes_message() {
    let element = element();
    element.set_custom_error_messages(Some(ErrorMessageMap::new().with("invalid", "Bad value")));
    element.set_value("invalid".to_string());
    element.update();
    assert!(!element.take_focus_request());

    assert!(!element.report_validity());
    assert!(element.take_focus_request());
    assert_eq!(element.focus_target(), Some("input"));
    assert_eq!(element.error_message(), Some("Bad value".into()));
}

#[test]
fn test_report_validity_keeps_imperative_message() {
    let element = element();
    element.set_error_message(Some("Server rejected".into()));
    element.update();

    assert!(!element.report_validity());
    assert_eq!(element.error_message(), Some("Server rejected".into()));
}

#[test]
fn test_report_validity_exposes_custom_validity_over_rule_message() {
    let element = element();
    element.set_value("invalid".to_string());
    element.update();
    assert_eq!(element.validation_message(), "invalid");

    element.set_custom_validity("Server rejected the key");
    assert!(!element.report_validity());
    assert_eq!(
        element.error_message(),
        Some("Server rejected the key".into())
    );
}

#[test]
fn test_empty_node_error_message_still_has_native_message() {
    let element = element();
    element.set_error_message(Some(ErrorMessage::node(RichMessage::new())));
    assert_eq!(
        element.update(),
        UpdateOutcome::Overridden("Invalid value".to_string())
    );
    assert!(!element.validity().valid);
    assert_eq!(element.validation_message(), "Invalid value");
}

#[test]
fn test_every_custom_override_call_counts_as_change() {
    let element = element();
    let messages = ErrorMessageMap::new().with("invalid", "Nope");
    element.set_custom_error_messages(Some(messages.clone()));
    element.update();

    element.set_custom_error_messages(Some(messages));
    assert!(
        element
            .pending_changes()
            .contains(&Property::CustomErrorMessages)
    );
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));

    element.set_shared_custom_validator(None);
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));
}

#[test]
fn test_report_validity_on_valid_element() {
    let element = element();
    assert!(element.report_validity());
    assert!(!element.take_focus_request());
    assert_eq!(element.error_message(), None);
}

#[test]
fn test_disabled_element_passes_checks() {
    let element = element();
    element.set_value("invalid".to_string());
    element.update();
    assert!(!element.check_validity());

    element.set_disabled(true);
    assert!(!element.will_validate());
    assert!(element.check_validity());
    assert!(element.report_validity());
}

#[test]
fn test_reset_without_form() {
    let element = element();
    element.set_reset_value("default".to_string());
    element.set_value("invalid".to_string());
    element.validate(true);
    assert!(element.error_message().is_some());

    element.form_reset();
    assert_eq!(element.value(), "default");
    assert_eq!(element.error_message(), None);
    assert!(element.check_validity());
    assert_eq!(element.submission_value(), Some(FormValue::from("default")));
}

#[test]
fn test_reset_without_reset_property_keeps_value() {
    let settings = InputElementSettings::new("value", || ValidationSettings::new(rule()));
    let element = InputElement::new(settings, "start".to_string());
    element.set_value("invalid".to_string());
    element.validate(true);

    element.form_reset();
    assert_eq!(element.value(), "invalid");
    assert_eq!(element.error_message(), None);
    assert!(!element.check_validity());
}

#[test]
fn test_node_message_exposed_on_report() {
    let node = ErrorMessage::node(RichMessage::new().text("Bad. ").link("Help", "https://example.com"));
    let element = element();
    element.set_custom_error_messages(Some(ErrorMessageMap::new().with("invalid", node.clone())));
    element.set_value("invalid".to_string());
    element.validate(true);

    assert_eq!(element.error_message(), Some(node));
    assert_eq!(element.validation_message(), "Bad. Help");
}

#[test]
fn test_custom_value_type_with_input_data_provider() {
    #[derive(Debug, Clone, PartialEq)]
    struct Port(u16);

    let settings = InputElementSettings::with_provider(
        "port",
        |port: &Port| Some(FormValue::Text(port.0.to_string())),
        || {
            ValidationSettings::new(validator_fn(|port: &Port, _: &FormData| {
                if port.0 < 1024 {
                    Validity::invalid("privileged")
                } else {
                    Validity::Valid
                }
            }))
        },
    );
    let element = InputElement::new(settings, Port(8080));
    assert_eq!(element.update(), UpdateOutcome::Revalidated(Validity::Valid));
    assert_eq!(element.submission_value(), Some(FormValue::from("8080")));

    element.set_value(Port(22));
    assert_eq!(
        element.update(),
        UpdateOutcome::Revalidated(Validity::invalid("privileged"))
    );
}

/// Registry that records every published form value.
struct RecordingRegistry {
    inner: ElementInternals,
    published: Arc<Mutex<Vec<Option<FormValue>>>>,
}

impl FormParticipantRegistry for RecordingRegistry {
    fn register(&mut self, form: &Form, participant: FormParticipant) {
        self.inner.register(form, participant);
    }

    fn unregister(&mut self, id: ParticipantId) {
        self.inner.unregister(id);
    }

    fn form(&self) -> Option<Form> {
        self.inner.form()
    }

    fn set_validity(&mut self, validity: NativeValidity) {
        self.inner.set_validity(validity);
    }

    fn set_form_value(&mut self, value: Option<FormValue>) {
        self.published
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(value.clone());
        self.inner.set_form_value(value);
    }

    fn validity(&self) -> ValidityState {
        self.inner.validity()
    }

    fn validation_message(&self) -> String {
        self.inner.validation_message()
    }

    fn anchor(&self) -> Option<String> {
        self.inner.anchor()
    }

    fn form_value(&self) -> Option<FormValue> {
        self.inner.form_value()
    }
}

#[test]
fn test_injected_registry_receives_form_values() {
    let published = Arc::new(Mutex::new(Vec::new()));
    let registry = RecordingRegistry {
        inner: ElementInternals::new(),
        published: Arc::clone(&published),
    };
    let element = InputElement::with_registry(
        settings(ErrorMessageMap::new()),
        "first".to_string(),
        Box::new(registry),
    );

    element.update();
    element.set_value("second".to_string());
    element.update();
    element.update();

    let published = published.lock().unwrap().clone();
    assert_eq!(
        published,
        vec![Some(FormValue::from("first")), Some(FormValue::from("second"))]
    );
}

#[test]
fn test_invalid_anchor_comes_from_error_selector() {
    let published = Arc::new(Mutex::new(Vec::new()));
    let registry = RecordingRegistry {
        inner: ElementInternals::new(),
        published,
    };
    let element = InputElement::with_registry(
        settings(ErrorMessageMap::new()),
        "invalid".to_string(),
        Box::new(registry),
    );
    element.update();
    assert!(element.validity().custom_error);
    assert_eq!(element.validation_message(), "invalid");
    assert_eq!(element.validation_anchor(), Some(".error".to_string()));

    element.set_value("fine".to_string());
    element.update();
    assert_eq!(element.validation_anchor(), None);
}
