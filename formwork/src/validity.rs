//! Validation outcomes and native validity flags.

use serde::{Deserialize, Serialize};

/// Result of running a validation rule against a value.
///
/// `Invalid` carries a short machine-readable code (`"empty"`,
/// `"invalid-name"`), never a rendered sentence. Turning a code into
/// something a user can read happens later, in the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum Validity {
    /// The value satisfies the rule.
    #[default]
    Valid,
    /// The value violates the rule.
    Invalid {
        /// Machine-readable error code.
        code: String,
    },
}

impl Validity {
    /// Create a passing result.
    pub fn valid() -> Self {
        Self::Valid
    }

    /// Create a failing result with the given code.
    pub fn invalid(code: impl Into<String>) -> Self {
        Self::Invalid { code: code.into() }
    }

    /// Check if the rule passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if the rule failed.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Get the error code, if the rule failed.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { code } => Some(code),
        }
    }
}

/// Constraint-validation flags exposed to the form and to rendering.
///
/// Mirrors the subset of the browser's `ValidityState` that form
/// participants in this crate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityState {
    /// No flag is raised.
    pub valid: bool,
    /// Invalid because of a rule violation or an imperative override.
    pub custom_error: bool,
    /// Invalid because a required native input is empty.
    pub value_missing: bool,
}

impl ValidityState {
    /// State with no flags raised.
    pub const VALID: Self = Self {
        valid: true,
        custom_error: false,
        value_missing: false,
    };

    /// State with the custom-error flag raised.
    pub const CUSTOM_ERROR: Self = Self {
        valid: false,
        custom_error: true,
        value_missing: false,
    };

    /// State with the value-missing flag raised.
    pub const VALUE_MISSING: Self = Self {
        valid: false,
        custom_error: false,
        value_missing: true,
    };
}

impl Default for ValidityState {
    fn default() -> Self {
        Self::VALID
    }
}
