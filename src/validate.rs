//! Validation of bookmark creation input.
//!
//! Rules are checked in a fixed order and the first violation wins:
//!
//! | Order | Field | Rule | Error |
//! |-------|-------|------|-------|
//! | 1 | `title` | present, non-empty string | [`MissingTitle`](ValidationError::MissingTitle) |
//! | 2 | `url` | absolute URI with scheme and host | [`InvalidUrl`](ValidationError::InvalidUrl) |
//! | 3 | `description` | present, non-empty string | [`MissingDescription`](ValidationError::MissingDescription) |
//! | 4 | `rating` | finite number in `0..=5` | [`InvalidRating`](ValidationError::InvalidRating) |
//!
//! # Example
//!
//! ```
//! use bookmarks::{CreateBookmarkRequest, ValidationError, validate_new_bookmark};
//! use serde_json::json;
//!
//! let raw = CreateBookmarkRequest::from_json(json!({
//!     "title": "Docs",
//!     "url": "https://docs.rs",
//!     "description": "Crate docs",
//!     "rating": 9,
//! })).unwrap();
//!
//! assert_eq!(validate_new_bookmark(&raw), Err(ValidationError::InvalidRating));
//! ```

use crate::bookmark::{CreateBookmarkRequest, NewBookmark};
use serde_json::Value;
use url::Url;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// First rule violated by a creation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("url must be an absolute URI with a scheme and host")]
    InvalidUrl,
    #[error("description is required")]
    MissingDescription,
    #[error("rating must be a number between 0 and 5")]
    InvalidRating,
}

impl ValidationError {
    /// Text sent back to the client.
    ///
    /// Rating violations are reported on their own; every other rule
    /// collapses into a generic message.
    pub fn client_message(&self) -> &'static str {
        match self {
            ValidationError::InvalidRating => "Rating must be between 0 and 5.",
            ValidationError::MissingTitle
            | ValidationError::InvalidUrl
            | ValidationError::MissingDescription => "Invalid data",
        }
    }
}

/// Validate raw creation input and normalize it into a [`NewBookmark`].
pub fn validate_new_bookmark(raw: &CreateBookmarkRequest) -> Result<NewBookmark, ValidationError> {
    let title = non_empty_string(raw.title.as_ref()).ok_or(ValidationError::MissingTitle)?;
    let url = absolute_url(raw.url.as_ref()).ok_or(ValidationError::InvalidUrl)?;
    let description =
        non_empty_string(raw.description.as_ref()).ok_or(ValidationError::MissingDescription)?;
    let rating = coerce_rating(raw.rating.as_ref())
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or(ValidationError::InvalidRating)?;

    Ok(NewBookmark {
        title: title.to_owned(),
        url: url.to_owned(),
        description: description.to_owned(),
        rating,
    })
}

fn non_empty_string(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Returns the original string (not the normalized `Url` form) when it
/// parses as an absolute URI carrying a host.
fn absolute_url(value: Option<&Value>) -> Option<&str> {
    let raw = value.and_then(Value::as_str)?;
    let parsed = Url::parse(raw).ok()?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Some(raw),
        _ => None,
    }
}

/// Numbers pass through, numeric strings are parsed. Anything else, and
/// any non-finite result, is rejected.
pub fn coerce_rating(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}
