//! Form widgets for console applications.
//!
//! Every widget here owns an [`InputElement`] and supplies its settings,
//! selectors and validator, so it takes part in a [`Form`] like a native
//! input. Shared behaviour lives on the [`FormWidget`] trait.
//!
//! [`InputElement`]: formwork::element::InputElement
//! [`Form`]: formwork::form::Form

pub mod confirmation;
pub mod error;
pub mod range;
pub mod ssh_key;
pub mod text_field;
pub mod traits;

pub use confirmation::ConfirmationField;
pub use error::WidgetError;
pub use range::{RangeSelector, RangeValue};
pub use ssh_key::{KeyType, SshKeyInput};
pub use text_field::TextField;
pub use traits::FormWidget;

/// Selector of the error anchor shared by every widget in this crate.
pub(crate) const ERROR_SELECTOR: &str = "[data-role=error]";
