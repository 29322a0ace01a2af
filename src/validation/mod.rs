//! Field-level input validation.
//!
//! Request payloads are read as untyped JSON objects and checked field by
//! field with a [`FieldReader`]. Each read produces a typed value or records a
//! [`FieldError`]; a payload is accepted only when every field succeeded, and
//! every failing field is reported together.
//!
//! ```rust,ignore
//! struct Login { email: String, password: String }
//!
//! impl Validate for Login {
//!     fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self> {
//!         let email = fields.non_empty_string("email");
//!         let password = fields.non_empty_string("password");
//!         Some(Self { email: email?, password: password? })
//!     }
//! }
//! ```
//!
//! Read every field *before* applying `?`, otherwise later errors are lost.
//!
//! The [`Valid`] and [`ValidQuery`] extractors run this for JSON bodies and
//! query strings respectively, rejecting with `AppError::Validation`.

use crate::types::AppError;
use axum::extract::{FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors collected while validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Error about the payload as a whole rather than a named field.
    pub fn root(message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: String::new(),
            message: message.into(),
        }])
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any error concerns `field`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| {
                if e.field.is_empty() {
                    e.message.clone()
                } else {
                    format!("{}: {}", e.field, e.message)
                }
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Reads typed fields out of a JSON object, recording failures as it goes.
///
/// Required reads return `None` when the field failed; optional reads return
/// `None` on failure and `Some(None)` when the field is absent or `null`.
pub struct FieldReader<'a> {
    source: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub fn new(source: &'a Map<String, Value>) -> Self {
        Self {
            source,
            errors: Vec::new(),
        }
    }

    /// Record a custom failure for `field`.
    pub fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Run `parse` against a present, non-null field. Absent or null fields
    /// yield `Ok(None)`.
    fn check<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<Option<T>> {
        match self.source.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(value) => match parse(value) {
                Ok(parsed) => Some(Some(parsed)),
                Err(message) => {
                    self.reject(field, message);
                    None
                }
            },
        }
    }

    fn required<T>(
        &mut self,
        field: &str,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.check(field, parse)? {
            Some(value) => Some(value),
            None => {
                self.reject(field, "is required");
                None
            }
        }
    }

    pub fn string(&mut self, field: &str) -> Option<String> {
        self.required(field, as_string)
    }

    pub fn non_empty_string(&mut self, field: &str) -> Option<String> {
        self.required(field, as_non_empty_string)
    }

    pub fn optional_string(&mut self, field: &str) -> Option<Option<String>> {
        self.check(field, as_string)
    }

    /// Required string restricted to `allowed`.
    pub fn one_of(&mut self, field: &str, allowed: &[&str]) -> Option<String> {
        self.required(field, |value| {
            let s = as_string(value)?;
            if allowed.contains(&s.as_str()) {
                Ok(s)
            } else {
                Err(format!("must be one of: {}", allowed.join(", ")))
            }
        })
    }

    /// Required JSON number strictly greater than zero.
    pub fn positive_number(&mut self, field: &str) -> Option<f64> {
        self.required(field, |value| {
            let n = as_number(value)?;
            if n > 0.0 {
                Ok(n)
            } else {
                Err("must be greater than 0".to_string())
            }
        })
    }

    /// Optional JSON number that must not be negative.
    pub fn optional_non_negative_number(&mut self, field: &str) -> Option<Option<f64>> {
        self.check(field, |value| {
            let n = as_number(value)?;
            if n >= 0.0 {
                Ok(n)
            } else {
                Err("must not be negative".to_string())
            }
        })
    }

    pub fn date(&mut self, field: &str) -> Option<DateTime<Utc>> {
        self.required(field, as_date)
    }

    pub fn optional_date(&mut self, field: &str) -> Option<Option<DateTime<Utc>>> {
        self.check(field, as_date)
    }

    /// Integer that may arrive as a string (query parameters), with a
    /// default for absent fields and inclusive bounds.
    pub fn coerced_integer(
        &mut self,
        field: &str,
        default: i64,
        min: i64,
        max: Option<i64>,
    ) -> Option<i64> {
        let value = self.check(field, |value| {
            let n = as_coerced_integer(value)?;
            if n < min {
                return Err(format!("must be at least {}", min));
            }
            if let Some(max) = max {
                if n > max {
                    return Err(format!("must be at most {}", max));
                }
            }
            Ok(n)
        })?;
        Some(value.unwrap_or(default))
    }

    /// Close the reader. Succeeds only when no field failed.
    pub fn finish<T>(self, parsed: Option<T>) -> Result<T, ValidationErrors> {
        if !self.errors.is_empty() {
            return Err(ValidationErrors(self.errors));
        }
        parsed.ok_or_else(|| ValidationErrors::root("invalid input"))
    }
}

fn as_string(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "expected a string".to_string())
}

fn as_non_empty_string(value: &Value) -> Result<String, String> {
    let s = as_string(value)?;
    if s.trim().is_empty() {
        Err("must not be empty".to_string())
    } else {
        Ok(s)
    }
}

fn as_number(value: &Value) -> Result<f64, String> {
    value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| "expected a number".to_string())
}

fn as_coerced_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| "expected an integer".to_string()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| "expected an integer".to_string()),
        _ => Err("expected an integer".to_string()),
    }
}

/// Dates are accepted as RFC 3339 strings, `YYYY-MM-DD`, or epoch
/// milliseconds.
fn as_date(value: &Value) -> Result<DateTime<Utc>, String> {
    const MESSAGE: &str = "expected a date (RFC 3339, YYYY-MM-DD, or epoch milliseconds)";

    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
                .ok_or_else(|| MESSAGE.to_string())
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| MESSAGE.to_string()),
        _ => Err(MESSAGE.to_string()),
    }
}

/// Types that can be built from an untyped JSON object.
pub trait Validate: Sized {
    /// Read every field, then assemble. Return `None` if any read failed.
    fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self>;

    fn validate(value: &Value) -> Result<Self, ValidationErrors> {
        let Some(object) = value.as_object() else {
            return Err(ValidationErrors::root("expected a JSON object"));
        };
        Self::validate_object(object)
    }

    fn validate_object(object: &Map<String, Value>) -> Result<Self, ValidationErrors> {
        let mut fields = FieldReader::new(object);
        let parsed = Self::from_fields(&mut fields);
        fields.finish(parsed)
    }
}

/// Validated JSON body.
#[derive(Debug)]
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(ValidationErrors::root(rejection.body_text())))?;

        T::validate(&value).map(Valid).map_err(AppError::Validation)
    }
}

/// Validated query string. Values arrive as strings and are coerced by the
/// target type's readers.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: Validate + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::Validation(ValidationErrors::root(rejection.body_text())))?;

        let object: Map<String, Value> = raw
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();

        T::validate_object(&object)
            .map(ValidQuery)
            .map_err(AppError::Validation)
    }
}
