//! Tests for the confirmation field widget.

use console_widgets::{ConfirmationField, FormWidget, TextField, WidgetError};
use formwork::prelude::*;

fn passphrase_form() -> (Form, TextField, ConfirmationField) {
    let form = Form::new("passphrase");
    let passphrase = TextField::new("passphrase", Rules::new().required("empty")).unwrap();
    let confirm = ConfirmationField::new("confirm", "passphrase").unwrap();
    passphrase.attach(&form);
    confirm.attach(&form);
    (form, passphrase, confirm)
}

#[test]
fn test_empty_target_rejected() {
    let err = ConfirmationField::new("confirm", "").unwrap_err();
    assert!(matches!(err, WidgetError::Form(FormError::EmptyFieldName)));
}

#[test]
fn test_matching_values() {
    let (_form, passphrase, confirm) = passphrase_form();
    assert_eq!(confirm.target(), "passphrase");

    passphrase.set_value("hunter2");
    passphrase.update();

    confirm.set_value("hunter3");
    assert_eq!(
        confirm.update(),
        UpdateOutcome::Revalidated(Validity::invalid("mismatch"))
    );
    assert_eq!(
        confirm.element().validation_message(),
        "The values do not match."
    );

    confirm.set_value("hunter2");
    assert_eq!(confirm.update(), UpdateOutcome::Revalidated(Validity::Valid));
}

#[test]
fn test_empty_confirmation_is_a_mismatch() {
    let (_form, passphrase, confirm) = passphrase_form();
    passphrase.set_value("hunter2");
    passphrase.update();
    assert_eq!(
        confirm.update(),
        UpdateOutcome::Revalidated(Validity::invalid("mismatch"))
    );
}

#[test]
fn test_sibling_edit_caught_at_submit() {
    let (form, passphrase, confirm) = passphrase_form();
    passphrase.set_value("hunter2");
    passphrase.update();
    confirm.set_value("hunter2");
    confirm.update();
    assert!(form.check_validity());

    passphrase.set_value("changed");
    passphrase.update();
    assert!(confirm.check_validity());

    assert_eq!(
        confirm.element().validate(false),
        Validity::invalid("mismatch")
    );
    assert_eq!(
        form.submit(),
        Submission::Blocked {
            invalid: vec![confirm.element().id()]
        }
    );
    assert_eq!(confirm.error_message(), Some("The values do not match.".into()));
}
