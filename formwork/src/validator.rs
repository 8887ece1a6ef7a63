//! The validator contract.

use std::collections::HashMap;
use std::sync::Arc;

use crate::form::FormData;
use crate::message::ErrorMessage;
use crate::validity::Validity;

/// A validation rule for values of type `V`.
///
/// `validate` must be a pure function of the value and the form data:
/// no mutation, same answer for the same inputs. `form_data` is a fresh
/// snapshot of every named participant of the owning form, or empty when
/// the element is not attached to one. Single-field rules ignore it;
/// cross-field rules read siblings from it.
pub trait Validator<V>: Send + Sync {
    /// Check the value.
    fn validate(&self, value: &V, form_data: &FormData) -> Validity;

    /// Fallback message for a code, consulted when no message map entry
    /// exists for it.
    fn error_message(&self, code: &str) -> Option<ErrorMessage> {
        let _ = code;
        None
    }
}

/// Shared, type-erased validator.
pub type SharedValidator<V> = Arc<dyn Validator<V>>;

impl<V, T> Validator<V> for Arc<T>
where
    T: Validator<V> + ?Sized,
{
    fn validate(&self, value: &V, form_data: &FormData) -> Validity {
        (**self).validate(value, form_data)
    }

    fn error_message(&self, code: &str) -> Option<ErrorMessage> {
        (**self).error_message(code)
    }
}

/// A validator that accepts every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<V> Validator<V> for AcceptAll {
    fn validate(&self, _value: &V, _form_data: &FormData) -> Validity {
        Validity::Valid
    }
}

/// A validator backed by a closure.
///
/// Created with [`validator_fn`].
pub struct FnValidator<F> {
    check: F,
    messages: HashMap<String, ErrorMessage>,
}

impl<F> FnValidator<F> {
    /// Add a fallback message for a code.
    pub fn message(mut self, code: impl Into<String>, message: impl Into<ErrorMessage>) -> Self {
        self.messages.insert(code.into(), message.into());
        self
    }
}

impl<V, F> Validator<V> for FnValidator<F>
where
    F: Fn(&V, &FormData) -> Validity + Send + Sync,
{
    fn validate(&self, value: &V, form_data: &FormData) -> Validity {
        (self.check)(value, form_data)
    }

    fn error_message(&self, code: &str) -> Option<ErrorMessage> {
        self.messages.get(code).cloned()
    }
}

/// Wrap a closure as a [`Validator`].
///
/// # Example
///
/// ```
/// use formwork::form::FormData;
/// use formwork::validator::{Validator, validator_fn};
/// use formwork::validity::Validity;
///
/// let even = validator_fn(|value: &u32, _: &FormData| {
///     if value % 2 == 0 { Validity::Valid } else { Validity::invalid("odd") }
/// })
/// .message("odd", "Pick an even number");
///
/// assert!(even.validate(&4u32, &FormData::new()).is_valid());
/// assert_eq!(even.validate(&3u32, &FormData::new()).code(), Some("odd"));
/// ```
pub fn validator_fn<V, F>(check: F) -> FnValidator<F>
where
    F: Fn(&V, &FormData) -> Validity + Send + Sync,
{
    FnValidator {
        check,
        messages: HashMap::new(),
    }
}
