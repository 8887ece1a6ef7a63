//! Fluent rule builder for string fields.
//!
//! # Example
//!
//! ```ignore
//! use formwork::rules::Rules;
//!
//! let rules = Rules::new()
//!     .required("empty")
//!     .min_length(3, "too-short")
//!     .max_length(64, "too-long")
//!     .try_pattern(r"^[A-Za-z0-9._-]+$", "invalid-name")?
//!     .message("empty", "Enter a name.");
//! ```

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::error::FormError;
use crate::form::FormData;
use crate::message::ErrorMessage;
use crate::validator::Validator;
use crate::validity::Validity;

/// Type alias for rule closures.
type Check = Box<dyn Fn(&str, &FormData) -> bool + Send + Sync>;

/// A single rule and the code it reports.
struct RuleEntry {
    code: String,
    check: Check,
    /// Whether the rule also runs on empty values.
    checks_empty: bool,
}

/// An ordered list of string rules.
///
/// Rules run in the order they were added and the first failing rule's
/// code is reported. Empty values skip every rule except [`required`]
/// and [`matches_field`], so an optional field stays valid until the
/// user types something.
///
/// [`required`]: Rules::required
/// [`matches_field`]: Rules::matches_field
#[derive(Default)]
pub struct Rules {
    rules: Vec<RuleEntry>,
    messages: HashMap<String, ErrorMessage>,
}

impl Rules {
    /// Create an empty rule list (accepts everything).
    pub fn new() -> Self {
        Self::default()
    }

    fn push<F>(mut self, code: impl Into<String>, checks_empty: bool, check: F) -> Self
    where
        F: Fn(&str, &FormData) -> bool + Send + Sync + 'static,
    {
        self.rules.push(RuleEntry {
            code: code.into(),
            check: Box::new(check),
            checks_empty,
        });
        self
    }

    /// Add a custom rule.
    pub fn rule<F>(self, f: F, code: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.push(code, false, move |value, _| f(value))
    }

    /// Add a custom rule that can read sibling fields.
    pub fn rule_with_form<F>(self, f: F, code: impl Into<String>) -> Self
    where
        F: Fn(&str, &FormData) -> bool + Send + Sync + 'static,
    {
        self.push(code, false, f)
    }

    /// Require the field to be non-blank.
    pub fn required(self, code: impl Into<String>) -> Self {
        self.push(code, true, |value, _| !value.trim().is_empty())
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, code: impl Into<String>) -> Self {
        self.rule(move |value| value.chars().count() >= min, code)
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize, code: impl Into<String>) -> Self {
        self.rule(move |value| value.chars().count() <= max, code)
    }

    /// Require the value to match a compiled pattern.
    pub fn pattern(self, pattern: Regex, code: impl Into<String>) -> Self {
        self.rule(move |value| pattern.is_match(value), code)
    }

    /// Require the value to match a pattern, compiling it first.
    pub fn try_pattern(self, pattern: &str, code: impl Into<String>) -> Result<Self, FormError> {
        let pattern = Regex::new(pattern)?;
        Ok(self.pattern(pattern, code))
    }

    /// Require a valid email address.
    pub fn email(self, code: impl Into<String>) -> Self {
        self.rule(email_address::EmailAddress::is_valid, code)
    }

    /// Require the value to equal another value.
    pub fn equals(self, other: impl Into<String>, code: impl Into<String>) -> Self {
        let other = other.into();
        self.rule(move |value| value == other, code)
    }

    /// Require the value to contain a substring.
    pub fn contains(self, substr: impl Into<String>, code: impl Into<String>) -> Self {
        let substr = substr.into();
        self.rule(move |value| value.contains(&substr), code)
    }

    /// Require the value to be one of the given options.
    pub fn one_of<I, S>(self, options: I, code: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        self.rule(move |value| options.iter().any(|option| option == value), code)
    }

    /// Require the value to equal a sibling field's text value.
    ///
    /// Also runs on empty values; a missing sibling counts as empty.
    pub fn matches_field(self, field: impl Into<String>, code: impl Into<String>) -> Self {
        let field = field.into();
        self.push(code, true, move |value, form_data| {
            value == form_data.text(&field).unwrap_or_default()
        })
    }

    /// Require the value to differ from a sibling field's text value.
    pub fn differs_from_field(self, field: impl Into<String>, code: impl Into<String>) -> Self {
        let field = field.into();
        self.push(code, false, move |value, form_data| {
            form_data.text(&field) != Some(value)
        })
    }

    /// Set the fallback message for a code.
    pub fn message(mut self, code: impl Into<String>, message: impl Into<ErrorMessage>) -> Self {
        self.messages.insert(code.into(), message.into());
        self
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.rules.iter().map(|rule| rule.code.as_str()).collect();
        f.debug_struct("Rules")
            .field("codes", &codes)
            .finish_non_exhaustive()
    }
}

impl Validator<String> for Rules {
    fn validate(&self, value: &String, form_data: &FormData) -> Validity {
        let value = value.as_str();
        self.rules
            .iter()
            .filter(|rule| rule.checks_empty || !value.is_empty())
            .find(|rule| !(rule.check)(value, form_data))
            .map_or(Validity::Valid, |rule| Validity::invalid(rule.code.as_str()))
    }

    fn error_message(&self, code: &str) -> Option<ErrorMessage> {
        self.messages.get(code).cloned()
    }
}
