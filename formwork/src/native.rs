//! Built-in form inputs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::form::{FormValue, ParticipantId};
use crate::validity::ValidityState;

const VALUE_MISSING_MESSAGE: &str = "Please fill out this field.";

/// Internal state for a native input
#[derive(Debug, Default)]
struct NativeInputInner {
    /// Form field name
    name: Option<String>,
    /// Current value
    value: String,
    /// Value restored on form reset
    default_value: String,
    /// Empty values are invalid when set
    required: bool,
    /// Excluded from validation and submission when set
    disabled: bool,
    /// Message set through `set_custom_validity`
    custom_validity: String,
}

/// A built-in text input taking part in a form.
///
/// Its constraint validation is the native one: `required` plus an
/// optional custom validity message.
#[derive(Debug, Clone)]
pub struct NativeInput {
    id: ParticipantId,
    inner: Arc<RwLock<NativeInputInner>>,
    dirty: Arc<AtomicBool>,
}

impl NativeInput {
    /// Create an empty input with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ParticipantId::new(),
            inner: Arc::new(RwLock::new(NativeInputInner {
                name: Some(name.into()),
                ..Default::default()
            })),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create an input whose value and default value are `value`.
    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            id: ParticipantId::new(),
            inner: Arc::new(RwLock::new(NativeInputInner {
                name: Some(name.into()),
                default_value: value.clone(),
                value,
                ..Default::default()
            })),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create an input without a name. It never contributes form data.
    pub fn unnamed() -> Self {
        Self {
            id: ParticipantId::new(),
            inner: Arc::new(RwLock::new(NativeInputInner::default())),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, NativeInputInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NativeInputInner> {
        self.dirty.store(true, Ordering::SeqCst);
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the unique ID for this input
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Get the field name
    pub fn name(&self) -> Option<String> {
        self.read().name.clone()
    }

    /// Get the current value
    pub fn value(&self) -> String {
        self.read().value.clone()
    }

    /// Set the current value
    pub fn set_value(&self, value: impl Into<String>) {
        self.write().value = value.into();
    }

    /// Get the value restored on reset
    pub fn default_value(&self) -> String {
        self.read().default_value.clone()
    }

    /// Set the value restored on reset
    pub fn set_default_value(&self, value: impl Into<String>) {
        self.write().default_value = value.into();
    }

    /// Mark the input as required
    pub fn set_required(&self, required: bool) {
        self.write().required = required;
    }

    /// Enable or disable the input
    pub fn set_disabled(&self, disabled: bool) {
        self.write().disabled = disabled;
    }

    /// Check if the input is disabled
    pub fn is_disabled(&self) -> bool {
        self.read().disabled
    }

    /// Force a custom error. An empty message clears it.
    pub fn set_custom_validity(&self, message: impl Into<String>) {
        self.write().custom_validity = message.into();
    }

    /// Check if the input takes part in constraint validation
    pub fn will_validate(&self) -> bool {
        !self.is_disabled()
    }

    /// Current constraint-validation flags
    pub fn validity(&self) -> ValidityState {
        let inner = self.read();
        if !inner.custom_validity.is_empty() {
            ValidityState::CUSTOM_ERROR
        } else if inner.required && inner.value.is_empty() {
            ValidityState::VALUE_MISSING
        } else {
            ValidityState::VALID
        }
    }

    /// Message describing the current validity failure, empty if valid
    pub fn validation_message(&self) -> String {
        let validity = self.validity();
        if validity.custom_error {
            self.read().custom_validity.clone()
        } else if validity.value_missing {
            VALUE_MISSING_MESSAGE.to_string()
        } else {
            String::new()
        }
    }

    /// Check validity
    pub fn check_validity(&self) -> bool {
        !self.will_validate() || self.validity().valid
    }

    /// Check validity, logging the failure
    pub fn report_validity(&self) -> bool {
        let valid = self.check_validity();
        if !valid {
            log::debug!("Native input {}: {}", self.id, self.validation_message());
        }
        valid
    }

    /// Restore the default value
    pub fn reset(&self) {
        let mut inner = self.write();
        inner.value = inner.default_value.clone();
    }

    /// The input's contribution to its form
    pub fn form_value(&self) -> Option<FormValue> {
        Some(FormValue::Text(self.value()))
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the input state has changed
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}
