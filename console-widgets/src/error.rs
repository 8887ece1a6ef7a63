//! Widget configuration errors.

use formwork::error::FormError;

/// Errors that can occur while building or reconfiguring a widget.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// The underlying form configuration was rejected.
    #[error("Form configuration error: {0}")]
    Form(#[from] FormError),

    /// A key type name that is not recognised.
    #[error("Unknown SSH key type: '{0}'")]
    UnknownKeyType(String),
}

impl From<regex::Error> for WidgetError {
    fn from(err: regex::Error) -> Self {
        Self::Form(FormError::Pattern(err))
    }
}
