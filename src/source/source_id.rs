//! Media source identity.

use std::sync::Arc;

/// Stable identity of a media source.
///
/// The engine keys its registry on this; adding the same id twice binds
/// once. Cloning is an `Arc` pointer copy.
///
/// # Example
///
/// ```
/// use mono_fix::SourceId;
///
/// let player = SourceId::new("player-1");
/// let preview = SourceId::new("preview");
///
/// assert_ne!(player, preview);
/// assert_eq!(player, SourceId::new("player-1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(Arc<str>);

impl SourceId {
    /// Creates a new source ID from a string.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_equality() {
        let a = SourceId::new("player-1");
        let b = SourceId::new("player-1");
        let c = SourceId::new("player-2");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_source_id_display() {
        let id = SourceId::new("video-main");
        assert_eq!(format!("{id}"), "video-main");
    }

    #[test]
    fn test_source_id_from_str() {
        let id: SourceId = "test".into();
        assert_eq!(id.as_str(), "test");
    }

    #[test]
    fn test_source_id_from_string() {
        let id: SourceId = String::from("test").into();
        assert_eq!(id.as_str(), "test");
    }

    #[test]
    fn test_source_id_as_registry_key() {
        use std::collections::HashMap;

        let mut registry = HashMap::new();
        registry.insert(SourceId::new("player-1"), 1);
        registry.insert(SourceId::new("player-2"), 2);
        registry.insert(SourceId::new("player-1"), 3); // rebinding replaces

        assert_eq!(registry.len(), 2);
        assert_eq!(registry[&SourceId::from("player-1")], 3);
    }

    #[test]
    fn test_source_id_ordering() {
        let mut ids = vec![SourceId::new("b"), SourceId::new("a")];
        ids.sort();
        assert_eq!(ids[0].as_ref(), "a");
    }
}
