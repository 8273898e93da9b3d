use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub url: String,
    pub rating: i64,
    pub description: String,
}

impl Bookmark {
    /// The record every fresh store starts with.
    pub fn seed() -> Self {
        Bookmark {
            id: "1".to_string(),
            name: "Google".to_string(),
            url: "https://www.google.com".to_string(),
            rating: 5,
            description: "The ultimate search engine".to_string(),
        }
    }
}

/// Body of `POST /bookmarks`. Every field is optional on the wire so that a missing
/// field produces a field-specific error instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookmark {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub name: String,
    pub url: String,
    pub rating: i64,
    pub description: String,
}

impl NewBookmark {
    pub fn into_bookmark(self, id: String) -> Bookmark {
        Bookmark {
            id,
            name: self.name,
            url: self.url,
            rating: self.rating,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a string")]
    NotText(&'static str),
    #[error("rating must be a number")]
    RatingNotANumber,
}

impl CreateBookmark {
    /// Checks fields in order name, url, rating, description and stops at the first
    /// failure.
    pub fn validate(self) -> Result<NewBookmark, ValidationError> {
        let name = required_text(self.name, "name")?;
        let url = required_text(self.url, "url")?;
        let rating = match self.rating {
            Some(value) if is_truthy(&value) => {
                coerce_rating(&value).ok_or(ValidationError::RatingNotANumber)?
            }
            _ => return Err(ValidationError::Missing("rating")),
        };
        let description = required_text(self.description, "description")?;

        Ok(NewBookmark {
            name,
            url,
            rating,
            description,
        })
    }
}

/// Falsy values count as missing. Truthy numbers and `true` are kept in their JSON
/// text form; arrays and objects are rejected.
fn required_text(value: Option<Value>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(value) if is_truthy(&value) => match value {
            Value::String(text) => Ok(text),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(ValidationError::NotText(field)),
        },
        _ => Err(ValidationError::Missing(field)),
    }
}

// A rating of 0 counts as missing, same as null, false or "".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Integer coercion: numbers truncate toward zero, strings use their leading integer
/// prefix (`"4 stars"` is 4). Returns `None` when no integer can be read.
pub fn coerce_rating(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            // `as` saturates at the i64 bounds.
            None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64),
        },
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, sign_len) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let digits = &trimmed[sign_len..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Only overflow can fail here; clamp to the nearest bound.
    match trimmed[..sign_len + end].parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if negative => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}
