//! Per-widget input element configuration.

use std::fmt;
use std::sync::Arc;

use crate::form::{FormValue, ToFormValue};
use crate::message::ErrorMessageMap;
use crate::validator::{SharedValidator, Validator};

/// Produces the value submitted as a field's form contribution.
pub type InputDataProvider<V> = Arc<dyn Fn(&V) -> Option<FormValue> + Send + Sync>;

/// Produces the default rule and its message map.
///
/// Called on every validation so it may read widget state that changes
/// over time (bounds, allowed formats).
pub type ValidationSettingsProvider<V> = Arc<dyn Fn() -> ValidationSettings<V> + Send + Sync>;

/// A rule and its own message map.
pub struct ValidationSettings<V> {
    /// The default validator.
    pub validator: SharedValidator<V>,
    /// Messages for the validator's codes.
    pub error_messages: ErrorMessageMap,
}

impl<V> ValidationSettings<V> {
    /// Settings for a validator, with an empty message map.
    pub fn new(validator: impl Validator<V> + 'static) -> Self {
        Self {
            validator: Arc::new(validator),
            error_messages: ErrorMessageMap::new(),
        }
    }

    /// Settings for an already shared validator.
    pub fn shared(validator: SharedValidator<V>) -> Self {
        Self {
            validator,
            error_messages: ErrorMessageMap::new(),
        }
    }

    /// Set the message map.
    pub fn error_messages(mut self, messages: ErrorMessageMap) -> Self {
        self.error_messages = messages;
        self
    }
}

impl<V> Clone for ValidationSettings<V> {
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            error_messages: self.error_messages.clone(),
        }
    }
}

/// Configuration shared by every instance of a widget.
///
/// # Example
///
/// ```ignore
/// let settings = InputElementSettings::new("value", || {
///     ValidationSettings::new(Rules::new().required("empty"))
///         .error_messages(ErrorMessageMap::new().with("empty", "Enter a name."))
/// })
/// .reset_value_property("defaultValue")
/// .input_selector("input")
/// .error_selector(".error")
/// .reactive_property("pattern");
/// ```
pub struct InputElementSettings<V> {
    /// Name of the property holding the value.
    pub value_property: &'static str,
    /// Name of the property holding the value restored on reset.
    pub reset_value_property: Option<&'static str>,
    /// Produces the form contribution from the value.
    pub input_data_provider: InputDataProvider<V>,
    /// Selector of the focus target used when reporting.
    pub input_selector: Option<String>,
    /// Selector of the element error messages are anchored to.
    pub error_selector: Option<String>,
    /// Produces the default rule and its messages.
    pub validation_settings_provider: ValidationSettingsProvider<V>,
    /// Widget properties whose change triggers revalidation.
    pub reactive_validation_properties: Vec<&'static str>,
}

impl<V: ToFormValue + 'static> InputElementSettings<V> {
    /// Create settings for a value that is submitted as-is.
    pub fn new<P>(value_property: &'static str, validation: P) -> Self
    where
        P: Fn() -> ValidationSettings<V> + Send + Sync + 'static,
    {
        Self::with_provider(value_property, V::to_form_value, validation)
    }
}

impl<V: 'static> InputElementSettings<V> {
    /// Create settings with an explicit input data provider.
    pub fn with_provider<D, P>(value_property: &'static str, input_data: D, validation: P) -> Self
    where
        D: Fn(&V) -> Option<FormValue> + Send + Sync + 'static,
        P: Fn() -> ValidationSettings<V> + Send + Sync + 'static,
    {
        Self {
            value_property,
            reset_value_property: None,
            input_data_provider: Arc::new(input_data),
            input_selector: None,
            error_selector: None,
            validation_settings_provider: Arc::new(validation),
            reactive_validation_properties: Vec::new(),
        }
    }

    /// Replace the input data provider.
    pub fn input_data_provider<D>(mut self, input_data: D) -> Self
    where
        D: Fn(&V) -> Option<FormValue> + Send + Sync + 'static,
    {
        self.input_data_provider = Arc::new(input_data);
        self
    }

    /// Restore the value from this property on form reset.
    pub fn reset_value_property(mut self, name: &'static str) -> Self {
        self.reset_value_property = Some(name);
        self
    }

    /// Set the focus target selector.
    pub fn input_selector(mut self, selector: impl Into<String>) -> Self {
        self.input_selector = Some(selector.into());
        self
    }

    /// Set the error anchor selector.
    pub fn error_selector(mut self, selector: impl Into<String>) -> Self {
        self.error_selector = Some(selector.into());
        self
    }

    /// Revalidate when this widget property changes.
    pub fn reactive_property(mut self, name: &'static str) -> Self {
        if !self.reactive_validation_properties.contains(&name) {
            self.reactive_validation_properties.push(name);
        }
        self
    }
}

impl<V> InputElementSettings<V> {
    /// Check if a property change triggers revalidation.
    pub fn is_reactive(&self, name: &str) -> bool {
        self.reactive_validation_properties
            .iter()
            .any(|property| *property == name)
    }

    /// Get the current default rule and messages.
    pub fn validation_settings(&self) -> ValidationSettings<V> {
        (self.validation_settings_provider)()
    }

    /// Contribution for a value.
    pub fn form_value_of(&self, value: &V) -> Option<FormValue> {
        (self.input_data_provider)(value)
    }
}

impl<V> fmt::Debug for InputElementSettings<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputElementSettings")
            .field("value_property", &self.value_property)
            .field("reset_value_property", &self.reset_value_property)
            .field("input_selector", &self.input_selector)
            .field("error_selector", &self.error_selector)
            .field(
                "reactive_validation_properties",
                &self.reactive_validation_properties,
            )
            .finish_non_exhaustive()
    }
}
