//! Strongly-typed identifiers.
//!
//! The backend owns identifier allocation, so ids are opaque on the client
//! side. An id remembers whether it arrived as a JSON number or string and is
//! written back the same way; comparison uses the text form only.

use core::hash::{Hash, Hasher};
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// JSON kind an identifier was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdKind {
    Text,
    Number,
}

/// Identifier of an employee record.
#[derive(Debug, Clone)]
pub struct EmployeeId {
    text: String,
    kind: IdKind,
}

/// Identifier of an authenticated user account.
#[derive(Debug, Clone)]
pub struct UserId {
    text: String,
    kind: IdKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl RawId {
    fn into_parts(self) -> (String, IdKind) {
        match self {
            RawId::Text(s) => (s, IdKind::Text),
            RawId::Unsigned(n) => (n.to_string(), IdKind::Number),
            RawId::Signed(n) => (n.to_string(), IdKind::Number),
            RawId::Float(n) => (n.to_string(), IdKind::Number),
        }
    }
}

/// Write `text` back as the number it was read from.
fn serialize_number<S: Serializer>(text: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if let Ok(n) = text.parse::<u64>() {
        serializer.serialize_u64(n)
    } else if let Ok(n) = text.parse::<i64>() {
        serializer.serialize_i64(n)
    } else if let Ok(n) = text.parse::<f64>() {
        serializer.serialize_f64(n)
    } else {
        serializer.serialize_str(text)
    }
}

macro_rules! impl_string_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Wrap an identifier handed out by the backend.
            ///
            /// Empty identifiers are rejected by `FromStr`; this constructor
            /// trusts its input.
            pub fn new(value: impl Into<String>) -> Self {
                Self {
                    text: value.into(),
                    kind: IdKind::Text,
                }
            }

            /// Numeric identifier; serialized as a JSON number.
            pub fn numeric(value: u64) -> Self {
                Self {
                    text: value.to_string(),
                    kind: IdKind::Number,
                }
            }

            pub fn as_str(&self) -> &str {
                &self.text
            }

            pub fn is_numeric(&self) -> bool {
                self.kind == IdKind::Number
            }
        }

        impl PartialEq for $t {
            fn eq(&self, other: &Self) -> bool {
                self.text == other.text
            }
        }

        impl Eq for $t {}

        impl Hash for $t {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.text.hash(state);
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.text)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.text
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self::new(trimmed))
            }
        }

        impl<'de> Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let (text, kind) = RawId::deserialize(deserializer)?.into_parts();
                Ok(Self { text, kind })
            }
        }

        impl Serialize for $t {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self.kind {
                    IdKind::Text => serializer.serialize_str(&self.text),
                    IdKind::Number => serialize_number(&self.text, serializer),
                }
            }
        }
    };
}

impl_string_newtype!(EmployeeId, "EmployeeId");
impl_string_newtype!(UserId, "UserId");
