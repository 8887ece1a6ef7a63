//! SSH public key input widget.

mod key_type;

use std::sync::{Arc, PoisonError, RwLock};

use formwork::element::InputElement;
use formwork::error::FormError;
use formwork::form::FormData;
use formwork::message::{ErrorMessage, ErrorMessageMap, RichMessage};
use formwork::settings::{InputElementSettings, ValidationSettings};
use formwork::validator::{SharedValidator, Validator};
use formwork::validity::Validity;
use log::debug;
use regex::Regex;

use crate::ERROR_SELECTOR;
use crate::error::WidgetError;
use crate::traits::FormWidget;

pub use key_type::KeyType;

/// Name of the reactive property holding the allowed key types.
pub const ALLOWED_KEY_TYPES: &str = "allowed-key-types";

const KEY_FORMAT_DOCS: &str = "https://man.openbsd.org/sshd#AUTHORIZED_KEYS_FILE_FORMAT";

type AllowedTypes = Arc<RwLock<Vec<KeyType>>>;

fn read_allowed(allowed: &AllowedTypes) -> Vec<KeyType> {
    allowed.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Checks a single OpenSSH public key line: `<type> <base64> [comment]`.
struct SshKeyValidator {
    required: bool,
    allowed: AllowedTypes,
    body: Regex,
    invalid_format: ErrorMessage,
}

impl Validator<String> for SshKeyValidator {
    fn validate(&self, value: &String, _form_data: &FormData) -> Validity {
        let line = value.trim();
        if line.is_empty() {
            return if self.required {
                Validity::invalid("empty")
            } else {
                Validity::Valid
            };
        }

        let mut parts = line.split_whitespace();
        let (Some(kind), Some(body)) = (parts.next(), parts.next()) else {
            return Validity::invalid("invalid-format");
        };
        if !self.body.is_match(body) {
            return Validity::invalid("invalid-format");
        }

        match kind.parse::<KeyType>() {
            Ok(kind) if read_allowed(&self.allowed).contains(&kind) => Validity::Valid,
            _ => Validity::invalid("unsupported-type"),
        }
    }

    fn error_message(&self, code: &str) -> Option<ErrorMessage> {
        match code {
            "empty" => Some("Paste a public key.".into()),
            "invalid-format" => Some(self.invalid_format.clone()),
            _ => None,
        }
    }
}

/// Text input accepting one OpenSSH public key.
///
/// The set of accepted key types is the reactive `allowed-key-types`
/// property: changing it revalidates the current key on the next update.
#[derive(Debug, Clone)]
pub struct SshKeyInput {
    element: InputElement<String>,
    allowed: AllowedTypes,
}

impl SshKeyInput {
    /// Create a key input accepting every supported key type.
    pub fn new(name: impl Into<String>, required: bool) -> Result<Self, WidgetError> {
        let name = name.into();
        if name.is_empty() {
            return Err(FormError::EmptyFieldName.into());
        }

        let allowed: AllowedTypes = Arc::new(RwLock::new(KeyType::ALL.to_vec()));
        let validator: SharedValidator<String> = Arc::new(SshKeyValidator {
            required,
            allowed: Arc::clone(&allowed),
            body: Regex::new(r"^[A-Za-z0-9+/]+={0,3}$")?,
            invalid_format: ErrorMessage::node(
                RichMessage::new()
                    .text("This does not look like a public key. See ")
                    .link("the key format", KEY_FORMAT_DOCS)
                    .text("."),
            ),
        });

        let listed = Arc::clone(&allowed);
        let messages = ErrorMessageMap::new().with_lazy("unsupported-type", move || {
            let names: Vec<&str> = read_allowed(&listed).iter().map(KeyType::as_str).collect();
            Some(format!("Use one of these key types: {}.", names.join(", ")).into())
        });

        let settings = InputElementSettings::new("value", move || {
            ValidationSettings::shared(Arc::clone(&validator)).error_messages(messages.clone())
        })
        .reset_value_property("defaultValue")
        .input_selector("textarea")
        .error_selector(ERROR_SELECTOR)
        .reactive_property(ALLOWED_KEY_TYPES);

        let element = InputElement::new(settings, String::new());
        element.set_name(Some(name));
        Ok(Self { element, allowed })
    }

    /// Get the pasted key text
    pub fn value(&self) -> String {
        self.element.value()
    }

    /// Replace the key text
    pub fn set_value(&self, value: impl Into<String>) {
        self.element.set_value(value.into());
    }

    /// Get the accepted key types
    pub fn allowed_key_types(&self) -> Vec<KeyType> {
        read_allowed(&self.allowed)
    }

    /// Set the accepted key types.
    pub fn set_allowed_key_types(&self, kinds: Vec<KeyType>) {
        {
            let mut allowed = self.allowed.write().unwrap_or_else(PoisonError::into_inner);
            if *allowed == kinds {
                return;
            }
            *allowed = kinds;
        }
        debug!("{}: allowed key types changed", self.element.id());
        self.element.request_update(ALLOWED_KEY_TYPES);
    }

    /// Set the accepted key types from a comma-separated list.
    pub fn set_allowed_key_types_str(&self, list: &str) -> Result<(), WidgetError> {
        self.set_allowed_key_types(KeyType::parse_list(list)?);
        Ok(())
    }

    /// Key type named by the current value, if recognised
    pub fn key_type(&self) -> Option<KeyType> {
        self.value().split_whitespace().next()?.parse().ok()
    }
}

impl FormWidget for SshKeyInput {
    type Value = String;

    fn element(&self) -> &InputElement<String> {
        &self.element
    }
}
