//! Configuration errors.
//!
//! Rule violations are not errors: they are [`Validity`] values. The
//! errors here are mistakes made when setting a widget up.
//!
//! [`Validity`]: crate::validity::Validity

/// Errors that can occur while configuring validation.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A rule pattern failed to compile.
    #[error("Invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A field name was required but empty.
    #[error("Field name must not be empty")]
    EmptyFieldName,

    /// A numeric range whose lower bound exceeds its upper bound.
    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },
}
