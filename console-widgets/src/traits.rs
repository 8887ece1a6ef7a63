//! Shared trait for form widgets.
//!
//! Widgets own their [`InputElement`]; this trait exposes the element and
//! forwards the form-facing operations to it, so callers can drive any
//! widget the same way.

use formwork::element::{FieldValue, InputElement, UpdateOutcome};
use formwork::form::Form;
use formwork::message::ErrorMessage;

/// Trait for widgets that take part in a form.
///
/// # Example
///
/// ```ignore
/// impl FormWidget for MyWidget {
///     type Value = String;
///
///     fn element(&self) -> &InputElement<String> {
///         &self.element
///     }
/// }
/// ```
pub trait FormWidget {
    /// Value type held by the widget's element.
    type Value: FieldValue;

    /// The element backing this widget.
    fn element(&self) -> &InputElement<Self::Value>;

    // =========================================================================
    // Provided Methods
    // =========================================================================

    /// Get the unique ID as a string (for node binding).
    fn id_string(&self) -> String {
        self.element().id_string()
    }

    /// Register with a form.
    fn attach(&self, form: &Form) {
        self.element().attach(form);
    }

    /// Flush pending property changes.
    fn update(&self) -> UpdateOutcome {
        self.element().update()
    }

    /// Check validity without user-visible effects.
    fn check_validity(&self) -> bool {
        self.element().check_validity()
    }

    /// Check validity and surface the error if invalid.
    fn report_validity(&self) -> bool {
        self.element().report_validity()
    }

    /// Externally visible error message.
    fn error_message(&self) -> Option<ErrorMessage> {
        self.element().error_message()
    }

    /// Check if the widget state has changed and needs re-render.
    fn is_dirty(&self) -> bool {
        self.element().is_dirty()
    }

    /// Clear the dirty flag after rendering.
    fn clear_dirty(&self) {
        self.element().clear_dirty();
    }
}
