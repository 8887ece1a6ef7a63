//! Numeric range selector widget.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use formwork::element::InputElement;
use formwork::error::FormError;
use formwork::form::{FormData, FormValue};
use formwork::message::ErrorMessageMap;
use formwork::settings::{InputElementSettings, ValidationSettings};
use formwork::validator::{SharedValidator, Validator};
use formwork::validity::Validity;
use serde::{Deserialize, Serialize};

use crate::ERROR_SELECTOR;
use crate::error::WidgetError;
use crate::traits::FormWidget;

/// Reactive property holding the lower bound.
pub const MIN: &str = "min";
/// Reactive property holding the upper bound.
pub const MAX: &str = "max";

/// A closed range of whole numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeValue {
    pub start: i64,
    pub end: i64,
}

impl RangeValue {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Number of values covered, zero when start is after end.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            self.end.abs_diff(self.start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min: i64,
    max: i64,
}

impl Bounds {
    fn new(min: i64, max: i64) -> Result<Self, FormError> {
        if min > max {
            return Err(FormError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }
}

type SharedBounds = Arc<RwLock<Bounds>>;

fn read_bounds(bounds: &SharedBounds) -> Bounds {
    *bounds.read().unwrap_or_else(PoisonError::into_inner)
}

struct RangeValidator {
    bounds: SharedBounds,
}

impl Validator<RangeValue> for RangeValidator {
    fn validate(&self, value: &RangeValue, _form_data: &FormData) -> Validity {
        let Bounds { min, max } = read_bounds(&self.bounds);
        if value.start > value.end {
            Validity::invalid("start-after-end")
        } else if value.start < min || value.end > max {
            Validity::invalid("out-of-bounds")
        } else {
            Validity::Valid
        }
    }
}

/// Selects a sub-range of `min..max`.
///
/// Submits as `"start..end"`. The bounds are reactive: moving them
/// revalidates the current selection on the next update.
#[derive(Debug, Clone)]
pub struct RangeSelector {
    element: InputElement<RangeValue>,
    bounds: SharedBounds,
}

impl RangeSelector {
    /// Create a selector spanning the whole of `min..max`.
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Result<Self, WidgetError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FormError::EmptyFieldName.into());
        }

        let bounds: SharedBounds = Arc::new(RwLock::new(Bounds::new(min, max)?));
        let validator: SharedValidator<RangeValue> = Arc::new(RangeValidator {
            bounds: Arc::clone(&bounds),
        });

        let current = Arc::clone(&bounds);
        let messages = ErrorMessageMap::new()
            .with("start-after-end", "The start must not be after the end.")
            .with_lazy("out-of-bounds", move || {
                let Bounds { min, max } = read_bounds(&current);
                Some(format!("Choose a range within {}..{}.", min, max).into())
            });

        let settings = InputElementSettings::with_provider(
            "value",
            |value: &RangeValue| Some(FormValue::Text(value.to_string())),
            move || ValidationSettings::shared(Arc::clone(&validator)).error_messages(messages.clone()),
        )
        .reset_value_property("defaultValue")
        .input_selector("[data-role=start]")
        .error_selector(ERROR_SELECTOR)
        .reactive_property(MIN)
        .reactive_property(MAX);

        let element = InputElement::new(settings, RangeValue::new(min, max));
        element.set_name(Some(name));
        Ok(Self { element, bounds })
    }

    /// Get the selected range
    pub fn value(&self) -> RangeValue {
        self.element.value()
    }

    /// Select a range
    pub fn set_value(&self, value: RangeValue) {
        self.element.set_value(value);
    }

    /// Move the start of the selection
    pub fn set_start(&self, start: i64) {
        let value = self.value();
        self.set_value(RangeValue { start, ..value });
    }

    /// Move the end of the selection
    pub fn set_end(&self, end: i64) {
        let value = self.value();
        self.set_value(RangeValue { end, ..value });
    }

    /// Get the range restored on reset
    pub fn default_value(&self) -> RangeValue {
        self.element.reset_value()
    }

    /// Set the range restored on reset
    pub fn set_default_value(&self, value: RangeValue) {
        self.element.set_reset_value(value);
    }

    /// Current lower bound
    pub fn min(&self) -> i64 {
        read_bounds(&self.bounds).min
    }

    /// Current upper bound
    pub fn max(&self) -> i64 {
        read_bounds(&self.bounds).max
    }

    /// Move the bounds. Rejects `min > max` and leaves the bounds as
    /// they were.
    pub fn set_bounds(&self, min: i64, max: i64) -> Result<(), WidgetError> {
        let next = Bounds::new(min, max)?;
        let previous = {
            let mut bounds = self.bounds.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *bounds, next)
        };
        if previous.min != next.min {
            self.element.request_update(MIN);
        }
        if previous.max != next.max {
            self.element.request_update(MAX);
        }
        Ok(())
    }
}

impl FormWidget for RangeSelector {
    type Value = RangeValue;

    fn element(&self) -> &InputElement<RangeValue> {
        &self.element
    }
}
