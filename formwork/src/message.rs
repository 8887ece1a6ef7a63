//! Error messages and per-code message maps.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A renderable message body, opaque to validation.
///
/// Rendering decides how to paint it; the form only needs its plain
/// text for the native validation message.
pub trait RenderNode: fmt::Debug + Send + Sync {
    /// Plain-text form of the node.
    fn text_content(&self) -> String;
}

/// A human-readable error message.
///
/// "No message" is expressed as `Option::None` wherever a source may
/// decline to provide one.
#[derive(Debug, Clone)]
pub enum ErrorMessage {
    /// Plain text.
    Text(String),
    /// A rich node (links, formatting).
    Node(Arc<dyn RenderNode>),
}

impl ErrorMessage {
    /// Create a plain-text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a message from a renderable node.
    pub fn node(node: impl RenderNode + 'static) -> Self {
        Self::Node(Arc::new(node))
    }

    /// An empty text message. Nodes are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Get the plain-text content.
    pub fn text_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Node(node) => node.text_content(),
        }
    }

    /// Get the text if this is a plain-text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) => None,
        }
    }
}

impl PartialEq for ErrorMessage {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            // Nodes compare by identity.
            (Self::Node(a), Self::Node(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_content())
    }
}

impl From<&str> for ErrorMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// One piece of a [`RichMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text.
    Text(String),
    /// A link with visible text.
    Link { text: String, href: String },
}

/// A simple rich message: text interleaved with links.
///
/// # Example
///
/// ```
/// use formwork::message::{ErrorMessage, RichMessage};
///
/// let message = ErrorMessage::node(
///     RichMessage::new()
///         .text("Key is not in OpenSSH format. ")
///         .link("Learn more", "https://docs.example.com/keys"),
/// );
/// assert_eq!(message.text_content(), "Key is not in OpenSSH format. Learn more");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichMessage {
    segments: Vec<Segment>,
}

impl RichMessage {
    /// Create an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append plain text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.segments.push(Segment::Text(text.into()));
        self
    }

    /// Append a link.
    pub fn link(mut self, text: impl Into<String>, href: impl Into<String>) -> Self {
        self.segments.push(Segment::Link {
            text: text.into(),
            href: href.into(),
        });
        self
    }

    /// Get the segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl RenderNode for RichMessage {
    fn text_content(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.as_str(),
                Segment::Link { text, .. } => text.as_str(),
            })
            .collect()
    }
}

/// Lazily computed message.
pub type MessageThunk = Arc<dyn Fn() -> Option<ErrorMessage> + Send + Sync>;

/// A message map entry: a value, or a thunk evaluated when resolved.
#[derive(Clone)]
pub enum MessageEntry {
    /// A ready value. `None` declines to provide a message.
    Static(Option<ErrorMessage>),
    /// Computed on each resolution.
    Lazy(MessageThunk),
}

impl MessageEntry {
    /// Produce the message for this entry.
    pub fn evaluate(&self) -> Option<ErrorMessage> {
        match self {
            Self::Static(message) => message.clone(),
            Self::Lazy(thunk) => thunk(),
        }
    }
}

impl fmt::Debug for MessageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(message) => f.debug_tuple("Static").field(message).finish(),
            Self::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Mapping from error code to message, used for localized overrides.
#[derive(Debug, Clone, Default)]
pub struct ErrorMessageMap {
    entries: HashMap<String, MessageEntry>,
}

impl ErrorMessageMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a code.
    pub fn with(mut self, code: impl Into<String>, message: impl Into<ErrorMessage>) -> Self {
        self.insert(code, MessageEntry::Static(Some(message.into())));
        self
    }

    /// Add a lazily computed message for a code.
    pub fn with_lazy<F>(mut self, code: impl Into<String>, thunk: F) -> Self
    where
        F: Fn() -> Option<ErrorMessage> + Send + Sync + 'static,
    {
        self.insert(code, MessageEntry::Lazy(Arc::new(thunk)));
        self
    }

    /// Insert an entry, replacing any previous entry for the code.
    pub fn insert(&mut self, code: impl Into<String>, entry: MessageEntry) -> Option<MessageEntry> {
        self.entries.insert(code.into(), entry)
    }

    /// Get the entry for a code.
    pub fn get(&self, code: &str) -> Option<&MessageEntry> {
        self.entries.get(code)
    }

    /// Check if the map has an entry for a code.
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the codes with entries.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Combine with `overrides`; entries from `overrides` win.
    pub fn merged(&self, overrides: &ErrorMessageMap) -> ErrorMessageMap {
        let mut entries = self.entries.clone();
        entries.extend(
            overrides
                .entries
                .iter()
                .map(|(code, entry)| (code.clone(), entry.clone())),
        );
        ErrorMessageMap { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_equality_by_value() {
        assert_eq!(ErrorMessage::from("oops"), ErrorMessage::text("oops"));
        assert_ne!(ErrorMessage::from("oops"), ErrorMessage::from("other"));
    }

    #[test]
    fn test_node_equality_by_identity() {
        let node = ErrorMessage::node(RichMessage::new().text("bad"));
        let same = node.clone();
        let other = ErrorMessage::node(RichMessage::new().text("bad"));
        assert_eq!(node, same);
        assert_ne!(node, other);
        assert_ne!(node, ErrorMessage::from("bad"));
    }

    #[test]
    fn test_empty_only_for_empty_text() {
        assert!(ErrorMessage::from("").is_empty());
        assert!(!ErrorMessage::from("x").is_empty());
        assert!(!ErrorMessage::node(RichMessage::new()).is_empty());
    }

    #[test]
    fn test_merged_overrides_win() {
        let defaults = ErrorMessageMap::new()
            .with("empty", "Required")
            .with("too-long", "Too long");
        let overrides = ErrorMessageMap::new().with("empty", "Obligatoire");

        let merged = defaults.merged(&overrides);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged.get("empty").and_then(MessageEntry::evaluate),
            Some(ErrorMessage::from("Obligatoire"))
        );
        assert_eq!(
            merged.get("too-long").and_then(MessageEntry::evaluate),
            Some(ErrorMessage::from("Too long"))
        );
    }

    #[test]
    fn test_lazy_entry_evaluates_on_demand() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let map = ErrorMessageMap::new().with_lazy("empty", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(ErrorMessage::from("Required"))
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let entry = map.get("empty").cloned();
        assert_eq!(entry.and_then(|e| e.evaluate()), Some("Required".into()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
