//! The ambient form container and its data aggregation.
//!
//! A [`Form`] is the aggregation point participants register with. It
//! collects their contributions into a flat [`FormData`] snapshot, fans
//! out reset notifications, and gates submission on constraint validity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::native::NativeInput;

/// Unique identifier for a form participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(usize);

impl ParticipantId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__participant_{}", self.0)
    }
}

/// An uploaded file contributed to a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlob {
    /// File name as chosen by the user.
    pub name: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// A single participant's contribution to its form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    File(FileBlob),
    Entries(FormData),
}

impl FormValue {
    /// Get the text if this is a text contribution.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Values that can be submitted as-is, without an input data provider.
pub trait ToFormValue {
    /// The contribution for this value. `None` contributes nothing.
    fn to_form_value(&self) -> Option<FormValue>;
}

impl ToFormValue for String {
    fn to_form_value(&self) -> Option<FormValue> {
        Some(FormValue::Text(self.clone()))
    }
}

impl ToFormValue for FileBlob {
    fn to_form_value(&self) -> Option<FormValue> {
        Some(FormValue::File(self.clone()))
    }
}

impl ToFormValue for FormData {
    fn to_form_value(&self) -> Option<FormValue> {
        Some(FormValue::Entries(self.clone()))
    }
}

impl ToFormValue for FormValue {
    fn to_form_value(&self) -> Option<FormValue> {
        Some(self.clone())
    }
}

impl<T: ToFormValue> ToFormValue for Option<T> {
    fn to_form_value(&self) -> Option<FormValue> {
        self.as_ref().and_then(ToFormValue::to_form_value)
    }
}

/// Flat mapping from participant name to its current contribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    entries: BTreeMap<String, FormValue>,
}

impl FormData {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Option<FormValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Get the value for a name.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries.get(name)
    }

    /// Get the value for a name if it is text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormValue::as_text)
    }

    /// Check if a name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<N: Into<String>> FromIterator<(N, FormValue)> for FormData {
    fn from_iter<I: IntoIterator<Item = (N, FormValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(name, value)| (name.into(), value)).collect(),
        }
    }
}

/// Callbacks a custom control exposes to the form it is registered with.
pub trait CustomParticipant: Send + Sync {
    /// Get the participant's identifier.
    fn participant_id(&self) -> ParticipantId;

    /// Name under which the contribution is recorded.
    fn name(&self) -> Option<String>;

    /// Disabled participants neither validate nor contribute.
    fn is_disabled(&self) -> bool;

    /// Contribution computed from the live value.
    fn form_value(&self) -> Option<FormValue>;

    /// Contribution last published to the form.
    fn submission_value(&self) -> Option<FormValue>;

    /// Check constraint validity without user-visible effects.
    fn check_validity(&self) -> bool;

    /// Check constraint validity and surface the error if invalid.
    fn report_validity(&self) -> bool;

    /// Called when the owning form is reset.
    fn form_reset(&self);
}

/// Something registered with a form.
///
/// Native inputs and custom controls are told apart once, when the
/// participant is created, instead of on every aggregation.
#[derive(Clone)]
pub enum FormParticipant {
    /// A built-in input.
    Native(NativeInput),
    /// A custom control.
    Custom(Arc<dyn CustomParticipant>),
}

impl FormParticipant {
    /// Wrap a custom control.
    pub fn custom(participant: impl CustomParticipant + 'static) -> Self {
        Self::Custom(Arc::new(participant))
    }

    /// Get the participant's identifier.
    pub fn id(&self) -> ParticipantId {
        match self {
            Self::Native(input) => input.id(),
            Self::Custom(custom) => custom.participant_id(),
        }
    }

    /// Name under which the contribution is recorded. Empty names count
    /// as no name.
    pub fn name(&self) -> Option<String> {
        let name = match self {
            Self::Native(input) => input.name(),
            Self::Custom(custom) => custom.name(),
        };
        name.filter(|name| !name.is_empty())
    }

    /// Check if the participant is disabled.
    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Native(input) => input.is_disabled(),
            Self::Custom(custom) => custom.is_disabled(),
        }
    }

    /// Contribution used by the aggregator.
    pub fn form_value(&self) -> Option<FormValue> {
        match self {
            Self::Native(input) => input.form_value(),
            Self::Custom(custom) => custom.form_value(),
        }
    }

    /// Contribution used at submit time.
    pub fn submission_value(&self) -> Option<FormValue> {
        match self {
            Self::Native(input) => input.form_value(),
            Self::Custom(custom) => custom.submission_value(),
        }
    }

    /// Check constraint validity.
    pub fn check_validity(&self) -> bool {
        match self {
            Self::Native(input) => input.check_validity(),
            Self::Custom(custom) => custom.check_validity(),
        }
    }

    /// Check constraint validity and surface the error if invalid.
    pub fn report_validity(&self) -> bool {
        match self {
            Self::Native(input) => input.report_validity(),
            Self::Custom(custom) => custom.report_validity(),
        }
    }

    /// Deliver a form reset.
    pub fn reset(&self) {
        match self {
            Self::Native(input) => input.reset(),
            Self::Custom(custom) => custom.form_reset(),
        }
    }
}

impl fmt::Debug for FormParticipant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Native(_) => "Native",
            Self::Custom(_) => "Custom",
        };
        f.debug_struct(kind)
            .field("id", &self.id())
            .field("name", &self.name())
            .finish()
    }
}

/// Outcome of [`Form::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Every participant was valid; carries the submitted data.
    Accepted(FormData),
    /// At least one participant was invalid.
    Blocked {
        /// Participants that failed constraint validation, in
        /// registration order.
        invalid: Vec<ParticipantId>,
    },
}

impl Submission {
    /// Check if the submission went through.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

#[derive(Debug)]
struct FormInner {
    name: String,
    participants: Vec<FormParticipant>,
}

/// A form: the aggregation point for its participants.
///
/// Cloning yields another handle to the same form.
#[derive(Debug, Clone)]
pub struct Form {
    inner: Arc<RwLock<FormInner>>,
}

/// Non-owning handle to a [`Form`].
#[derive(Debug, Clone)]
pub struct FormRef {
    inner: Weak<RwLock<FormInner>>,
}

impl FormRef {
    /// Get the form, if it is still alive.
    pub fn upgrade(&self) -> Option<Form> {
        self.inner.upgrade().map(|inner| Form { inner })
    }
}

impl Form {
    /// Create an empty form.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FormInner {
                name: name.into(),
                participants: Vec::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, FormInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FormInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the form name.
    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    /// Get a non-owning handle.
    pub fn downgrade(&self) -> FormRef {
        FormRef {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Check if two handles refer to the same form.
    pub fn ptr_eq(&self, other: &Form) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register a participant.
    ///
    /// Registering an id that is already present replaces the earlier
    /// entry in place.
    pub fn register(&self, participant: FormParticipant) {
        let id = participant.id();
        let mut inner = self.write();
        match inner.participants.iter().position(|p| p.id() == id) {
            Some(index) => inner.participants[index] = participant,
            None => inner.participants.push(participant),
        }
        debug!("Form '{}': registered {}", inner.name, id);
    }

    /// Remove a participant. Returns whether it was registered.
    pub fn unregister(&self, id: ParticipantId) -> bool {
        let mut inner = self.write();
        let before = inner.participants.len();
        inner.participants.retain(|p| p.id() != id);
        let removed = inner.participants.len() != before;
        if removed {
            debug!("Form '{}': unregistered {}", inner.name, id);
        }
        removed
    }

    /// Get the registered participants in registration order.
    pub fn participants(&self) -> Vec<FormParticipant> {
        self.read().participants.clone()
    }

    /// Check if a participant is registered.
    pub fn contains(&self, id: ParticipantId) -> bool {
        self.read().participants.iter().any(|p| p.id() == id)
    }

    /// Number of registered participants.
    pub fn len(&self) -> usize {
        self.read().participants.len()
    }

    /// Check if no participants are registered.
    pub fn is_empty(&self) -> bool {
        self.read().participants.is_empty()
    }

    /// Collect every named, enabled participant's current contribution.
    ///
    /// Computed fresh on each call. When two participants share a name,
    /// the one registered last wins. Participants without a name or
    /// without a contribution are skipped.
    pub fn data(&self) -> FormData {
        collect(&self.participants(), FormParticipant::form_value)
    }

    /// Check every enabled participant. Does not stop at the first
    /// failure.
    pub fn check_validity(&self) -> bool {
        self.participants()
            .iter()
            .filter(|p| !p.is_disabled())
            .fold(true, |valid, p| p.check_validity() && valid)
    }

    /// Report on every enabled participant. Does not stop at the first
    /// failure.
    pub fn report_validity(&self) -> bool {
        self.participants()
            .iter()
            .filter(|p| !p.is_disabled())
            .fold(true, |valid, p| p.report_validity() && valid)
    }

    /// Deliver a reset to every participant.
    pub fn reset(&self) {
        let participants = self.participants();
        debug!("Form '{}': reset ({} participants)", self.name(), participants.len());
        for participant in &participants {
            participant.reset();
        }
    }

    /// Submit the form.
    ///
    /// Invalid participants get `report_validity` called and block the
    /// submission. Otherwise the submitted data is built from each
    /// participant's published contribution.
    pub fn submit(&self) -> Submission {
        let participants = self.participants();
        let invalid: Vec<ParticipantId> = participants
            .iter()
            .filter(|p| !p.is_disabled() && !p.check_validity())
            .map(FormParticipant::id)
            .collect();

        if !invalid.is_empty() {
            for participant in participants.iter().filter(|p| invalid.contains(&p.id())) {
                participant.report_validity();
            }
            warn!(
                "Form '{}': submission blocked by {} invalid participant(s)",
                self.name(),
                invalid.len()
            );
            return Submission::Blocked { invalid };
        }

        let data = collect(&participants, FormParticipant::submission_value);
        debug!("Form '{}': submitted {} entries", self.name(), data.len());
        Submission::Accepted(data)
    }
}

fn collect(
    participants: &[FormParticipant],
    contribution: fn(&FormParticipant) -> Option<FormValue>,
) -> FormData {
    let mut data = FormData::new();
    for participant in participants.iter().filter(|p| !p.is_disabled()) {
        let Some(name) = participant.name() else {
            continue;
        };
        if let Some(value) = contribution(participant) {
            trace!("Form data: {} = {:?}", name, value);
            data.insert(name, value);
        }
    }
    data
}
