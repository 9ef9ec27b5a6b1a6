//! Bookmark records and the raw creation payload accepted over HTTP.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A stored bookmark.
///
/// Records are immutable once created: the store appends and removes them,
/// nothing edits them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    #[serde(serialize_with = "serialize_rating")]
    pub rating: f64,
}

impl Bookmark {
    /// Build a bookmark from a validated payload, assigning a fresh UUIDv4 id.
    pub fn create(new: NewBookmark) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), new)
    }

    /// Build a bookmark with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, new: NewBookmark) -> Self {
        Self {
            id: id.into(),
            title: new.title,
            url: new.url,
            description: new.description,
            rating: new.rating,
        }
    }
}

/// Whole ratings go out as integers (`5`, not `5.0`).
fn serialize_rating<S: Serializer>(rating: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    // Ratings are validated into 0..=5, so the cast is exact.
    if rating.fract() == 0.0 && rating.abs() <= i64::MAX as f64 {
        serializer.serialize_i64(*rating as i64)
    } else {
        serializer.serialize_f64(*rating)
    }
}

/// A creation payload that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub description: String,
    pub rating: f64,
}

/// Creation input as it arrives on the wire.
///
/// Every field is kept as an untyped JSON value so that a wrong type is
/// reported by the validator with the same message as a missing field,
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateBookmarkRequest {
    pub title: Option<Value>,
    pub url: Option<Value>,
    pub description: Option<Value>,
    pub rating: Option<Value>,
}

impl CreateBookmarkRequest {
    /// Pick the creation fields out of a request body.
    ///
    /// Only a JSON object qualifies; arrays, scalars and `null` yield `None`.
    /// Unknown keys are ignored.
    pub fn from_json(body: Value) -> Option<Self> {
        match body {
            Value::Object(fields) => Some(Self::from_fields(fields)),
            _ => None,
        }
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        Self {
            title: fields.remove("title"),
            url: fields.remove("url"),
            description: fields.remove("description"),
            rating: fields.remove("rating"),
        }
    }
}
