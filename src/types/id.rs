// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Keeps event ids and provisioner image ids from being swapped.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use thiserror::Error;
use uuid::Uuid;

/// Marker types for phantom type parameters.
pub enum EventMarker {}
pub enum ImageMarker {}

/// A type-safe identifier that prevents accidental mixing of different ID types.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

#[derive(Debug, Error)]
#[error("id parameter is not a valid event id: {0:?}")]
pub struct ParseEventIdError(pub String);

/// Length of the hex ids carried over from the legacy deploy collection.
const LEGACY_ID_LEN: usize = 24;

impl Id<EventMarker> {
    /// Generate a fresh event id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().simple().to_string())
    }

    /// Parse a user-supplied event id.
    ///
    /// Ids are opaque: anything non-blank is accepted as written, minus
    /// surrounding whitespace. Lookups compare [`Self::canonical`] forms.
    pub fn parse(input: &str) -> Result<Self, ParseEventIdError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseEventIdError(input.to_string()));
        }
        Ok(Self::new(trimmed))
    }

    /// Spelling-independent form of the id. UUIDs become their simple
    /// lowercase form and legacy hex ids are lowercased; anything else is
    /// kept verbatim.
    pub fn canonical(&self) -> String {
        if let Ok(uuid) = Uuid::parse_str(&self.value) {
            return uuid.simple().to_string();
        }
        let legacy_hex = self.value.len() == LEGACY_ID_LEN
            && self.value.bytes().all(|b| b.is_ascii_hexdigit());
        if legacy_hex {
            return self.value.to_ascii_lowercase();
        }
        self.value.clone()
    }

    /// Whether both ids name the same event regardless of spelling.
    pub fn same_event(&self, other: &Self) -> bool {
        self.value == other.value || self.canonical() == other.canonical()
    }
}

// T is only a phantom marker, so these impls must not require bounds on it.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type EventId = Id<EventMarker>;
pub type ImageId = Id<ImageMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_parseable() {
        let a = EventId::generate();
        let b = EventId::generate();
        assert_ne!(a, b);
        assert_eq!(EventId::parse(a.as_str()).unwrap(), a);
    }

    #[test]
    fn parse_keeps_spelling_and_trims() {
        let id = EventId::parse(" 67e55044-10b1-426f-9247-bb680e5fe0c8\n").unwrap();
        assert_eq!(id.as_str(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn parse_rejects_blank_input() {
        let err = EventId::parse("   ").unwrap_err();
        assert!(err.to_string().contains("not a valid event id"));
        assert!(EventId::parse("").is_err());
    }

    #[test]
    fn uuid_spellings_name_the_same_event() {
        let simple = EventId::new("67e5504410b1426f9247bb680e5fe0c8");
        let hyphenated = EventId::new("67E55044-10B1-426F-9247-BB680E5FE0C8");
        assert_ne!(simple, hyphenated);
        assert!(simple.same_event(&hyphenated));
        assert_eq!(hyphenated.canonical(), simple.as_str());
    }

    #[test]
    fn legacy_hex_ids_compare_case_insensitively() {
        let stored = EventId::new("57a1b2c3d4e5f60718293a4b");
        assert!(stored.same_event(&EventId::new("57A1B2C3D4E5F60718293A4B")));
        assert!(!stored.same_event(&EventId::new("57a1b2c3d4e5f60718293a4c")));
    }

    #[test]
    fn other_ids_are_compared_verbatim() {
        let id = EventId::new("deploy-42");
        assert!(id.same_event(&EventId::new("deploy-42")));
        assert!(!id.same_event(&EventId::new("Deploy-42")));
    }
}
