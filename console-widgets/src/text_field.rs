//! Text field widget.

use std::sync::Arc;

use formwork::element::InputElement;
use formwork::error::FormError;
use formwork::rules::Rules;
use formwork::settings::{InputElementSettings, ValidationSettings};
use formwork::validator::SharedValidator;

use crate::ERROR_SELECTOR;
use crate::error::WidgetError;
use crate::traits::FormWidget;

/// A single-line text field validated by [`Rules`].
///
/// The value is restored from `defaultValue` on form reset.
///
/// # Example
///
/// ```ignore
/// let key_name = TextField::new(
///     "keyName",
///     Rules::new().required("empty").max_length(64, "too-long"),
/// )?;
/// key_name.attach(&form);
/// key_name.set_value("deploy-key");
/// key_name.update();
/// ```
#[derive(Debug, Clone)]
pub struct TextField {
    element: InputElement<String>,
}

impl TextField {
    /// Create a named text field.
    pub fn new(name: impl Into<String>, rules: Rules) -> Result<Self, WidgetError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FormError::EmptyFieldName.into());
        }

        let rules: SharedValidator<String> = Arc::new(rules);
        let settings = InputElementSettings::new("value", move || {
            ValidationSettings::shared(Arc::clone(&rules))
        })
        .reset_value_property("defaultValue")
        .input_selector("input")
        .error_selector(ERROR_SELECTOR);

        let element = InputElement::new(settings, String::new());
        element.set_name(Some(name));
        Ok(Self { element })
    }

    /// Get the current text
    pub fn value(&self) -> String {
        self.element.value()
    }

    /// Replace the text (as if typed)
    pub fn set_value(&self, value: impl Into<String>) {
        self.element.set_value(value.into());
    }

    /// Get the text restored on reset
    pub fn default_value(&self) -> String {
        self.element.reset_value()
    }

    /// Set the text restored on reset
    pub fn set_default_value(&self, value: impl Into<String>) {
        self.element.set_reset_value(value.into());
    }

    /// Clear the text
    pub fn clear(&self) {
        self.element.set_value(String::new());
    }
}

impl FormWidget for TextField {
    type Value = String;

    fn element(&self) -> &InputElement<String> {
        &self.element
    }
}
