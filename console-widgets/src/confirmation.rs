//! Confirmation field widget.

use formwork::element::InputElement;
use formwork::error::FormError;
use formwork::rules::Rules;

use crate::error::WidgetError;
use crate::text_field::TextField;
use crate::traits::FormWidget;

/// A text field that must repeat a sibling field's value, such as a
/// "confirm passphrase" box.
///
/// The sibling is looked up by name in the owning form's data on every
/// validation, so the check follows edits made to either field. An
/// empty confirmation against a non-empty sibling is a mismatch.
#[derive(Debug, Clone)]
pub struct ConfirmationField {
    field: TextField,
    target: String,
}

impl ConfirmationField {
    /// Create a field named `name` that must equal the field named `target`.
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Result<Self, WidgetError> {
        let target = target.into();
        if target.is_empty() {
            return Err(FormError::EmptyFieldName.into());
        }

        let rules = Rules::new()
            .matches_field(target.as_str(), "mismatch")
            .message("mismatch", "The values do not match.");
        let field = TextField::new(name, rules)?;
        Ok(Self { field, target })
    }

    /// Name of the field this one must match
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn value(&self) -> String {
        self.field.value()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.field.set_value(value);
    }
}

impl FormWidget for ConfirmationField {
    type Value = String;

    fn element(&self) -> &InputElement<String> {
        self.field.element()
    }
}
