//! Error message resolution.
//!
//! A failing code is turned into a message by trying each source in a
//! fixed order:
//!
//! 1. the effective message map (validator defaults merged with instance
//!    overrides, overrides winning);
//! 2. the validator's own [`Validator::error_message`];
//! 3. the raw code itself.
//!
//! The last step always succeeds, so resolution never fails.

use crate::message::{ErrorMessage, ErrorMessageMap, MessageEntry};
use crate::validator::Validator;

struct Resolution<'a, V> {
    code: &'a str,
    messages: &'a ErrorMessageMap,
    validator: &'a dyn Validator<V>,
}

type ResolveStep<V> = fn(&Resolution<'_, V>) -> Option<ErrorMessage>;

fn from_message_map<V>(resolution: &Resolution<'_, V>) -> Option<ErrorMessage> {
    resolution
        .messages
        .get(resolution.code)
        .and_then(MessageEntry::evaluate)
}

fn from_validator<V>(resolution: &Resolution<'_, V>) -> Option<ErrorMessage> {
    resolution.validator.error_message(resolution.code)
}

/// Resolve the message to surface for a failing `code`.
pub fn resolve_error_message<V>(
    code: &str,
    messages: &ErrorMessageMap,
    validator: &dyn Validator<V>,
) -> ErrorMessage {
    let resolution = Resolution {
        code,
        messages,
        validator,
    };
    let steps: [ResolveStep<V>; 2] = [from_message_map::<V>, from_validator::<V>];

    steps
        .iter()
        .find_map(|step| step(&resolution))
        .unwrap_or_else(|| ErrorMessage::Text(code.to_string()))
}
