//! Opaque identifiers
//!
//! The hosted store may hand out numeric or textual ids depending on the
//! column type, so both are accepted and held as text.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

opaque_id!(
    /// Store-assigned row identifier
    ItemId
);

opaque_id!(
    /// Identity of an authenticated user
    OwnerId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids() {
        let numeric: ItemId = serde_json::from_str("42").unwrap();
        let text: ItemId = serde_json::from_str("\"a1b2\"").unwrap();
        assert_eq!(numeric.as_str(), "42");
        assert_eq!(text, ItemId::from("a1b2"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let owner = OwnerId::new("user-1");
        assert_eq!(serde_json::to_string(&owner).unwrap(), "\"user-1\"");
    }
}
