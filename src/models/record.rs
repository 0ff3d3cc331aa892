use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifier of a persisted record.
///
/// REST resources hand out either integer keys or opaque strings (UUIDs,
/// slugs). Serialized untagged so the identifier goes back to the server in
/// the same JSON type it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Read an identifier from a path segment or CLI argument: integers
    /// become [`RecordId::Int`], anything else is kept as a string.
    pub fn parse(s: &str) -> Self {
        s.parse::<i64>()
            .map(Self::Int)
            .unwrap_or_else(|_| Self::Str(s.to_string()))
    }

    /// The identifier as a percent-encoded URL path segment.
    pub fn as_path_segment(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => urlencoding::encode(s).into_owned(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl FromStr for RecordId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// A single addressable entity managed by a [`Collection`](crate::collection::Collection).
///
/// The record type owns its wire shape (through serde) and its validation;
/// the collection only relies on the identifier to key its members.
pub trait Record:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Server-assigned identifier, `None` for records that were never saved.
    fn id(&self) -> Option<&RecordId>;

    /// Whether the record still has to be created on the server.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Reject the record before it enters a collection or goes over the wire.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_keeps_json_type() {
        let int: RecordId = serde_json::from_str("42").unwrap();
        let string: RecordId = serde_json::from_str("\"42\"").unwrap();

        assert_eq!(int, RecordId::Int(42));
        assert_eq!(string, RecordId::Str("42".to_string()));
        assert_eq!(serde_json::to_string(&int).unwrap(), "42");
        assert_eq!(serde_json::to_string(&string).unwrap(), "\"42\"");
    }

    #[test]
    fn record_id_parses_integers_first() {
        assert_eq!("7".parse::<RecordId>().unwrap(), RecordId::Int(7));
        assert_eq!(
            "node-7".parse::<RecordId>().unwrap(),
            RecordId::Str("node-7".to_string())
        );
    }

    #[test]
    fn path_segment_is_percent_encoded() {
        assert_eq!(RecordId::from("a b/c").as_path_segment(), "a%20b%2Fc");
        assert_eq!(RecordId::from(12).as_path_segment(), "12");
    }
}
