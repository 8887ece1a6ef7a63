//! Form participation and validation for console widgets.
//!
//! Any custom control built on [`InputElement`] behaves like a built-in
//! form input: it registers with a [`Form`], contributes a value, takes
//! part in `check_validity`/`report_validity`/`submit`, and responds to
//! resets. Validation is pluggable through the [`Validator`] trait, and
//! failing codes are turned into user-facing text through a fixed
//! precedence chain (instance override, validator default, raw code).
//!
//! [`InputElement`]: element::InputElement
//! [`Form`]: form::Form
//! [`Validator`]: validator::Validator

pub mod element;
pub mod error;
pub mod form;
pub mod internals;
pub mod message;
pub mod native;
pub mod resolver;
pub mod rules;
pub mod settings;
pub mod validator;
pub mod validity;

pub mod prelude {
    pub use crate::element::{ChangedProperties, FieldValue, InputElement, Property, UpdateOutcome};
    pub use crate::error::FormError;
    pub use crate::form::{
        CustomParticipant, FileBlob, Form, FormData, FormParticipant, FormValue, ParticipantId,
        Submission, ToFormValue,
    };
    pub use crate::internals::{ElementInternals, FormParticipantRegistry, NativeValidity};
    pub use crate::message::{ErrorMessage, ErrorMessageMap, MessageEntry, RenderNode, RichMessage};
    pub use crate::native::NativeInput;
    pub use crate::resolver::resolve_error_message;
    pub use crate::rules::Rules;
    pub use crate::settings::{InputElementSettings, ValidationSettings};
    pub use crate::validator::{AcceptAll, SharedValidator, Validator, validator_fn};
    pub use crate::validity::{Validity, ValidityState};
}
