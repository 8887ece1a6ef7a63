//! The form-association capability a custom control registers through.
//!
//! In a browser this is `ElementInternals`. Here it is an explicit
//! [`FormParticipantRegistry`] handed to each element at construction;
//! [`ElementInternals`] is the in-memory implementation.

use crate::form::{Form, FormParticipant, FormRef, FormValue, ParticipantId};
use crate::validity::ValidityState;

/// Native validity as last set by the element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeValidity {
    /// Constraint-validation flags.
    pub state: ValidityState,
    /// Validation message; empty when valid.
    pub message: String,
    /// Selector of the element the message is anchored to.
    pub anchor: Option<String>,
}

impl NativeValidity {
    /// No flags raised.
    pub fn valid() -> Self {
        Self::default()
    }

    /// Custom error with a message, anchored to `anchor`.
    pub fn custom_error(message: impl Into<String>, anchor: Option<String>) -> Self {
        Self {
            state: ValidityState::CUSTOM_ERROR,
            message: message.into(),
            anchor,
        }
    }
}

/// Form association for a single element.
///
/// Each element owns its registry exclusively.
pub trait FormParticipantRegistry: Send + Sync {
    /// Associate with `form`, registering `participant` there. Any
    /// previous association with a different form is dropped first.
    fn register(&mut self, form: &Form, participant: FormParticipant);

    /// Drop the form association, if any.
    fn unregister(&mut self, id: ParticipantId);

    /// The associated form, if it is still alive.
    fn form(&self) -> Option<Form>;

    /// Replace the native validity.
    fn set_validity(&mut self, validity: NativeValidity);

    /// Publish the element's contribution to its form.
    fn set_form_value(&mut self, value: Option<FormValue>);

    /// Current constraint-validation flags.
    fn validity(&self) -> ValidityState;

    /// Current validation message.
    fn validation_message(&self) -> String;

    /// Selector the current message is anchored to.
    fn anchor(&self) -> Option<String>;

    /// Last published contribution.
    fn form_value(&self) -> Option<FormValue>;
}

/// In-memory form association.
///
/// Holds the form weakly: forms own their participants, not the other
/// way round.
#[derive(Debug, Default)]
pub struct ElementInternals {
    form: Option<FormRef>,
    validity: NativeValidity,
    form_value: Option<FormValue>,
}

impl ElementInternals {
    /// Create an unassociated registry with valid state.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FormParticipantRegistry for ElementInternals {
    fn register(&mut self, form: &Form, participant: FormParticipant) {
        let id = participant.id();
        if let Some(previous) = self.form()
            && !previous.ptr_eq(form)
        {
            previous.unregister(id);
        }
        form.register(participant);
        self.form = Some(form.downgrade());
    }

    fn unregister(&mut self, id: ParticipantId) {
        if let Some(form) = self.form.take().and_then(|form| form.upgrade()) {
            form.unregister(id);
        }
    }

    fn form(&self) -> Option<Form> {
        self.form.as_ref().and_then(FormRef::upgrade)
    }

    fn set_validity(&mut self, validity: NativeValidity) {
        self.validity = validity;
    }

    fn set_form_value(&mut self, value: Option<FormValue>) {
        self.form_value = value;
    }

    fn validity(&self) -> ValidityState {
        self.validity.state
    }

    fn validation_message(&self) -> String {
        self.validity.message.clone()
    }

    fn anchor(&self) -> Option<String> {
        self.validity.anchor.clone()
    }

    fn form_value(&self) -> Option<FormValue> {
        self.form_value.clone()
    }
}
