//! The form-participant state machine every custom input is built on.
//!
//! An [`InputElement`] owns a widget's value, the consumer's validation
//! overrides, and the externally visible error message. It keeps the
//! native validity of its [`FormParticipantRegistry`] in step with its
//! rule so that form-level `check_validity`, `report_validity` and
//! `submit` treat it like a built-in input.
//!
//! Property setters only record what changed. [`InputElement::update`]
//! flushes one batch of changes and decides, once, whether to revalidate:
//!
//! 1. the value changed: publish the form contribution, revalidate;
//! 2. a reactive widget property changed: revalidate;
//! 3. the custom validator or custom messages changed: revalidate;
//! 4. the error message was cleared: revalidate;
//! 5. the error message was set to something non-empty: force a custom
//!    error with that message instead of running the rule.
//!
//! Revalidation from `update` is always silent (`report = false`): it
//! gates the native validity flag but never makes error text appear.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

use crate::form::{CustomParticipant, Form, FormData, FormParticipant, FormValue, ParticipantId};
use crate::internals::{ElementInternals, FormParticipantRegistry, NativeValidity};
use crate::message::{ErrorMessage, ErrorMessageMap};
use crate::resolver::resolve_error_message;
use crate::settings::InputElementSettings;
use crate::validator::{SharedValidator, Validator};
use crate::validity::{Validity, ValidityState};

/// Native message used when a forced error message has no text.
const FALLBACK_MESSAGE: &str = "Invalid value";

/// Bounds required of a value held by an [`InputElement`].
pub trait FieldValue: Clone + PartialEq + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Send + Sync + 'static> FieldValue for T {}

/// A property of an input element whose change is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Property {
    Value,
    ResetValue,
    Name,
    Disabled,
    CustomValidator,
    CustomErrorMessages,
    ErrorMessage,
    /// A property owned by the widget, announced with
    /// [`InputElement::request_update`].
    Widget(String),
}

/// Properties changed since the last update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedProperties {
    properties: HashSet<Property>,
}

impl ChangedProperties {
    /// Record a change.
    pub fn insert(&mut self, property: Property) {
        self.properties.insert(property);
    }

    /// Check if a property changed.
    pub fn contains(&self, property: &Property) -> bool {
        self.properties.contains(property)
    }

    /// Check if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of changed properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Iterate over the changed properties.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }
}

/// What [`InputElement::update`] did with a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing was pending.
    Unchanged,
    /// Changes were flushed but none of them triggers validation.
    Skipped,
    /// The rule ran silently with this result.
    Revalidated(Validity),
    /// A non-empty error message was forced as a custom error.
    Overridden(String),
}

/// Internal state for an input element
struct ElementInner<V> {
    /// Current value
    value: V,
    /// Value restored on form reset
    reset_value: V,
    /// Form field name
    name: Option<String>,
    /// Excluded from validation and submission when set
    disabled: bool,
    /// Consumer-supplied rule replacing the default one
    custom_validator: Option<SharedValidator<V>>,
    /// Consumer-supplied messages merged over the default ones
    custom_error_messages: Option<ErrorMessageMap>,
    /// Externally visible error message
    error_message: Option<ErrorMessage>,
    /// Message resolved by the last failing validation
    last_resolved: Option<ErrorMessage>,
    /// Changes not yet flushed by `update`
    changed: ChangedProperties,
    /// Form association and native validity
    internals: Box<dyn FormParticipantRegistry>,
}

/// A custom control taking part in a form.
///
/// Cloning yields another handle to the same element.
///
/// # Example
///
/// ```ignore
/// let settings = InputElementSettings::new("value", || {
///     ValidationSettings::new(Rules::new().required("empty"))
/// });
/// let element = InputElement::new(settings, String::new());
/// element.set_name(Some("keyName".into()));
/// element.attach(&form);
///
/// element.set_value("my-key".to_string());
/// element.update();
/// assert!(element.check_validity());
/// ```
pub struct InputElement<V> {
    id: ParticipantId,
    settings: Arc<InputElementSettings<V>>,
    inner: Arc<RwLock<ElementInner<V>>>,
    dirty: Arc<AtomicBool>,
    focus_requested: Arc<AtomicBool>,
}

impl<V: FieldValue> InputElement<V> {
    /// Create an element with the in-memory form association.
    pub fn new(settings: InputElementSettings<V>, value: V) -> Self {
        Self::with_registry(settings, value, Box::new(ElementInternals::new()))
    }

    /// Create an element with a custom form association.
    pub fn with_registry(
        settings: InputElementSettings<V>,
        value: V,
        registry: Box<dyn FormParticipantRegistry>,
    ) -> Self {
        Self::from_shared(Arc::new(settings), value, registry)
    }

    /// Create an element from settings shared with other instances.
    pub fn from_shared(
        settings: Arc<InputElementSettings<V>>,
        value: V,
        registry: Box<dyn FormParticipantRegistry>,
    ) -> Self {
        // The initial value counts as a change so the first update
        // validates and publishes it.
        let mut changed = ChangedProperties::default();
        changed.insert(Property::Value);

        Self {
            id: ParticipantId::new(),
            settings,
            inner: Arc::new(RwLock::new(ElementInner {
                reset_value: value.clone(),
                value,
                name: None,
                disabled: false,
                custom_validator: None,
                custom_error_messages: None,
                error_message: None,
                last_resolved: None,
                changed,
                internals: registry,
            })),
            dirty: Arc::new(AtomicBool::new(true)),
            focus_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ElementInner<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ElementInner<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mark_changed(&self, inner: &mut ElementInner<V>, property: Property) {
        inner.changed.insert(property);
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Get the unique ID for this element
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// Get the ID as a string (for node binding)
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }

    /// Get the widget settings
    pub fn settings(&self) -> &InputElementSettings<V> {
        &self.settings
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    /// Get the current value
    pub fn value(&self) -> V {
        self.read().value.clone()
    }

    /// Set the current value
    pub fn set_value(&self, value: V) {
        let mut inner = self.write();
        if inner.value != value {
            inner.value = value;
            self.mark_changed(&mut inner, Property::Value);
        }
    }

    /// Get the value restored on form reset
    pub fn reset_value(&self) -> V {
        self.read().reset_value.clone()
    }

    /// Set the value restored on form reset
    pub fn set_reset_value(&self, value: V) {
        let mut inner = self.write();
        if inner.reset_value != value {
            inner.reset_value = value;
            self.mark_changed(&mut inner, Property::ResetValue);
        }
    }

    /// Get the form field name
    pub fn name(&self) -> Option<String> {
        self.read().name.clone()
    }

    /// Set the form field name
    pub fn set_name(&self, name: Option<String>) {
        let mut inner = self.write();
        if inner.name != name {
            inner.name = name;
            self.mark_changed(&mut inner, Property::Name);
        }
    }

    /// Check if the element is disabled
    pub fn is_disabled(&self) -> bool {
        self.read().disabled
    }

    /// Enable or disable the element
    pub fn set_disabled(&self, disabled: bool) {
        let mut inner = self.write();
        if inner.disabled != disabled {
            inner.disabled = disabled;
            self.mark_changed(&mut inner, Property::Disabled);
        }
    }

    /// Check if a custom validator is set
    pub fn has_custom_validator(&self) -> bool {
        self.read().custom_validator.is_some()
    }

    /// Replace the default rule
    pub fn set_custom_validator(&self, validator: impl Validator<V> + 'static) {
        self.set_shared_custom_validator(Some(Arc::new(validator)));
    }

    /// Replace or restore the default rule.
    ///
    /// Every call counts as a change, even with the same validator.
    pub fn set_shared_custom_validator(&self, validator: Option<SharedValidator<V>>) {
        let mut inner = self.write();
        inner.custom_validator = validator;
        self.mark_changed(&mut inner, Property::CustomValidator);
    }

    /// Get the custom message overrides
    pub fn custom_error_messages(&self) -> Option<ErrorMessageMap> {
        self.read().custom_error_messages.clone()
    }

    /// Set the custom message overrides.
    ///
    /// Every call counts as a change, even with an equal map.
    pub fn set_custom_error_messages(&self, messages: Option<ErrorMessageMap>) {
        let mut inner = self.write();
        inner.custom_error_messages = messages;
        self.mark_changed(&mut inner, Property::CustomErrorMessages);
    }

    /// Get the externally visible error message
    pub fn error_message(&self) -> Option<ErrorMessage> {
        self.read().error_message.clone()
    }

    /// Set the externally visible error message.
    ///
    /// A non-empty message is authoritative on the next update: the
    /// element becomes invalid with exactly that message. Clearing it
    /// lets the rule decide again.
    pub fn set_error_message(&self, message: Option<ErrorMessage>) {
        let mut inner = self.write();
        if inner.error_message != message {
            inner.error_message = message;
            self.mark_changed(&mut inner, Property::ErrorMessage);
        }
    }

    /// Announce a change to a widget-owned property.
    ///
    /// The value and reset-value property names map to their own
    /// properties; anything else is recorded as a widget property.
    pub fn request_update(&self, name: &str) {
        let property = if name == self.settings.value_property {
            Property::Value
        } else if self.settings.reset_value_property == Some(name) {
            Property::ResetValue
        } else {
            Property::Widget(name.to_string())
        };
        let mut inner = self.write();
        self.mark_changed(&mut inner, property);
    }

    /// Get the changes not yet flushed
    pub fn pending_changes(&self) -> ChangedProperties {
        self.read().changed.clone()
    }

    // -------------------------------------------------------------------------
    // Reactive update
    // -------------------------------------------------------------------------

    /// Flush pending changes and revalidate if they call for it.
    ///
    /// Makes at most one validation decision per call.
    pub fn update(&self) -> UpdateOutcome {
        let (changed, error_message) = {
            let mut inner = self.write();
            let changed = std::mem::take(&mut inner.changed);
            if changed.is_empty() {
                return UpdateOutcome::Unchanged;
            }
            if changed.contains(&Property::Value) {
                let contribution = self.settings.form_value_of(&inner.value);
                inner.internals.set_form_value(contribution);
            }
            (changed, inner.error_message.clone())
        };

        if changed.contains(&Property::ErrorMessage)
            && let Some(message) = error_message.filter(|message| !message.is_empty())
        {
            let mut text = message.text_content();
            if text.is_empty() {
                text = FALLBACK_MESSAGE.to_string();
            }
            debug!("{}: error message set, forcing custom error", self.id);
            let anchor = self.settings.error_selector.clone();
            self.write()
                .internals
                .set_validity(NativeValidity::custom_error(text.clone(), anchor));
            return UpdateOutcome::Overridden(text);
        }

        let triggered = changed.iter().any(|property| match property {
            Property::Value
            | Property::CustomValidator
            | Property::CustomErrorMessages
            | Property::ErrorMessage => true,
            Property::Widget(name) => self.settings.is_reactive(name),
            Property::ResetValue | Property::Name | Property::Disabled => false,
        });

        if triggered {
            debug!("{}: revalidating after {} change(s)", self.id, changed.len());
            UpdateOutcome::Revalidated(self.validate(false))
        } else {
            UpdateOutcome::Skipped
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Run the effective rule against the current value.
    ///
    /// Always updates the native validity. When `report` is set and the
    /// value is invalid, the resolved message also becomes the visible
    /// error message if it differs from the current one. A valid result
    /// never touches the visible error message.
    pub fn validate(&self, report: bool) -> Validity {
        let (value, custom_validator, custom_messages, form) = {
            let inner = self.read();
            (
                inner.value.clone(),
                inner.custom_validator.clone(),
                inner.custom_error_messages.clone(),
                inner.internals.form(),
            )
        };

        let defaults = self.settings.validation_settings();
        let validator = custom_validator.unwrap_or(defaults.validator);
        let messages = match &custom_messages {
            Some(overrides) => defaults.error_messages.merged(overrides),
            None => defaults.error_messages,
        };
        let form_data = form.map(|form| form.data()).unwrap_or_default();

        let validity = validator.validate(&value, &form_data);
        trace!("{}: validate(report = {}) -> {:?}", self.id, report, validity);

        match &validity {
            Validity::Valid => {
                let mut inner = self.write();
                inner.last_resolved = None;
                inner.internals.set_validity(NativeValidity::valid());
            }
            Validity::Invalid { code } => {
                let message = resolve_error_message(code, &messages, validator.as_ref());
                let mut native_message = message.text_content();
                if native_message.is_empty() {
                    native_message = code.clone();
                }
                let anchor = self.settings.error_selector.clone();

                let mut inner = self.write();
                inner
                    .internals
                    .set_validity(NativeValidity::custom_error(native_message, anchor));
                inner.last_resolved = Some(message.clone());
                if report && inner.error_message.as_ref() != Some(&message) {
                    inner.error_message = Some(message);
                    self.mark_changed(&mut inner, Property::ErrorMessage);
                }
            }
        }

        validity
    }

    /// Force the native validity, bypassing the rule.
    ///
    /// An empty message makes the element valid; anything else makes it
    /// invalid with exactly that message.
    pub fn set_custom_validity(&self, message: &str) {
        let validity = if message.is_empty() {
            NativeValidity::valid()
        } else {
            NativeValidity::custom_error(message, self.settings.error_selector.clone())
        };
        let mut inner = self.write();
        inner.last_resolved = None;
        inner.internals.set_validity(validity);
    }

    /// Check if the element takes part in constraint validation
    pub fn will_validate(&self) -> bool {
        !self.is_disabled()
    }

    /// Current native validity flags
    pub fn validity(&self) -> ValidityState {
        self.read().internals.validity()
    }

    /// Current native validation message
    pub fn validation_message(&self) -> String {
        self.read().internals.validation_message()
    }

    /// Selector the current validation message is anchored to
    pub fn validation_anchor(&self) -> Option<String> {
        self.read().internals.anchor()
    }

    /// Check native validity without user-visible effects
    pub fn check_validity(&self) -> bool {
        !self.will_validate() || self.validity().valid
    }

    /// Check native validity, surfacing the error if invalid.
    ///
    /// An invalid element requests focus and, if no error message is
    /// visible yet, exposes the message its last validation resolved, or
    /// the native message after [`set_custom_validity`].
    ///
    /// [`set_custom_validity`]: InputElement::set_custom_validity
    pub fn report_validity(&self) -> bool {
        if self.check_validity() {
            return true;
        }

        self.focus_requested.store(true, Ordering::SeqCst);
        let mut inner = self.write();
        if inner.error_message.as_ref().is_none_or(ErrorMessage::is_empty) {
            let message = inner
                .last_resolved
                .clone()
                .unwrap_or_else(|| ErrorMessage::Text(inner.internals.validation_message()));
            inner.error_message = Some(message);
            self.mark_changed(&mut inner, Property::ErrorMessage);
        }
        debug!("{}: reported invalid", self.id);
        false
    }

    // -------------------------------------------------------------------------
    // Form association
    // -------------------------------------------------------------------------

    /// Register with a form, leaving any previous form.
    pub fn attach(&self, form: &Form) {
        let participant = FormParticipant::Custom(Arc::new(self.clone()));
        self.write().internals.register(form, participant);
        debug!("{}: attached to form '{}'", self.id, form.name());
    }

    /// Leave the current form, if any.
    pub fn detach(&self) {
        self.write().internals.unregister(self.id);
    }

    /// Get the associated form
    pub fn form(&self) -> Option<Form> {
        self.read().internals.form()
    }

    /// Contribution computed from the current value
    pub fn form_value(&self) -> Option<FormValue> {
        let value = self.value();
        self.settings.form_value_of(&value)
    }

    /// Contribution last published to the form
    pub fn submission_value(&self) -> Option<FormValue> {
        self.read().internals.form_value()
    }

    /// Form data of the associated form, or empty when detached
    pub fn form_data(&self) -> FormData {
        self.form().map(|form| form.data()).unwrap_or_default()
    }

    /// Handle a reset of the owning form.
    ///
    /// Restores the value from the reset-value property (when the widget
    /// declares one), revalidates silently, and clears a visible error
    /// message.
    pub fn form_reset(&self) {
        {
            let mut inner = self.write();
            if self.settings.reset_value_property.is_some() && inner.value != inner.reset_value {
                inner.value = inner.reset_value.clone();
                self.mark_changed(&mut inner, Property::Value);
            }
            let contribution = self.settings.form_value_of(&inner.value);
            inner.internals.set_form_value(contribution);
        }

        self.validate(false);

        let mut inner = self.write();
        if inner.error_message.is_some() {
            inner.error_message = None;
            self.mark_changed(&mut inner, Property::ErrorMessage);
        }
        debug!("{}: reset", self.id);
    }

    // -------------------------------------------------------------------------
    // Focus control
    // -------------------------------------------------------------------------

    /// Selector of the element that should receive focus
    pub fn focus_target(&self) -> Option<&str> {
        self.settings.input_selector.as_deref()
    }

    /// Check and clear the focus request (called by the host)
    pub fn take_focus_request(&self) -> bool {
        self.focus_requested.swap(false, Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------------

    /// Check if the element state has changed
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<V> Clone for InputElement<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            settings: Arc::clone(&self.settings),
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            focus_requested: Arc::clone(&self.focus_requested),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for InputElement<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("InputElement")
            .field("id", &self.id)
            .field("name", &inner.name)
            .field("value", &inner.value)
            .field("error_message", &inner.error_message)
            .field("validity", &inner.internals.validity())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Form participation
// -----------------------------------------------------------------------------

impl<V: FieldValue> CustomParticipant for InputElement<V> {
    fn participant_id(&self) -> ParticipantId {
        self.id
    }

    fn name(&self) -> Option<String> {
        InputElement::name(self)
    }

    fn is_disabled(&self) -> bool {
        InputElement::is_disabled(self)
    }

    fn form_value(&self) -> Option<FormValue> {
        InputElement::form_value(self)
    }

    fn submission_value(&self) -> Option<FormValue> {
        InputElement::submission_value(self)
    }

    fn check_validity(&self) -> bool {
        InputElement::check_validity(self)
    }

    fn report_validity(&self) -> bool {
        InputElement::report_validity(self)
    }

    fn form_reset(&self) {
        InputElement::form_reset(self)
    }
}
