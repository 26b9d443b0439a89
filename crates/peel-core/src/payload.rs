//! Backend error payloads.
//!
//! The Django backend reports failures in several shapes: a bare string,
//! `{"error": ...}`, `{"detail": ...}` or DRF validation errors keyed by
//! field name. [`ErrorPayload`] decodes all of them defensively so the rest of
//! the client never has to poke at raw JSON keys.

use serde_json::Value;

use crate::format;

/// Key DRF uses for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A decoded error response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// The body was a bare JSON string.
    Message(String),
    /// The body carried an `error` field, with any `detail` sent alongside it.
    Error {
        error: String,
        detail: Option<String>,
    },
    /// The body carried a `detail` field.
    Detail(String),
    /// Validation errors keyed by field, in payload order.
    Fields(Vec<FieldErrors>),
    /// Nothing usable could be extracted.
    Empty,
}

/// The messages reported for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    /// The field name as sent by the backend (`non_field_errors` included).
    pub field: String,
    /// One or more messages for the field.
    pub messages: Vec<String>,
}

impl FieldErrors {
    /// Create a field error entry.
    pub fn new(field: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            field: field.into(),
            messages,
        }
    }

    /// Returns true if these errors are not tied to a specific field.
    pub fn is_non_field(&self) -> bool {
        self.field == NON_FIELD_ERRORS
    }
}

impl ErrorPayload {
    /// Decode a parsed JSON error body.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => ErrorPayload::Message(s.clone()),
            Value::Object(map) => {
                if let Some(error) = non_empty_str(map.get("error")) {
                    return ErrorPayload::Error {
                        error: error.to_string(),
                        detail: non_empty_str(map.get("detail")).map(str::to_string),
                    };
                }
                if let Some(detail) = non_empty_str(map.get("detail")) {
                    return ErrorPayload::Detail(detail.to_string());
                }

                let fields: Vec<FieldErrors> = map
                    .iter()
                    .map(|(field, messages)| FieldErrors::new(field, collect_messages(messages)))
                    .collect();

                if fields.is_empty() {
                    ErrorPayload::Empty
                } else {
                    ErrorPayload::Fields(fields)
                }
            }
            // A top-level list is a set of messages with no field attached.
            Value::Array(items) if !items.is_empty() => ErrorPayload::Fields(
                items
                    .iter()
                    .map(|item| FieldErrors::new(NON_FIELD_ERRORS, collect_messages(item)))
                    .collect(),
            ),
            _ => ErrorPayload::Empty,
        }
    }

    /// Decode a raw response body, returning `None` if it is not JSON.
    pub fn from_slice(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Value>(body)
            .ok()
            .map(|value| Self::from_value(&value))
    }

    /// Render the payload as a single human-readable message.
    pub fn message(&self) -> String {
        format::render(self)
    }

    /// Returns the messages reported for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        match self {
            ErrorPayload::Fields(fields) => fields
                .iter()
                .find(|f| f.field == field)
                .map(|f| f.messages.as_slice()),
            _ => None,
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

// Arrays contribute one message per element; nested objects are flattened
// into their leaf messages.
fn collect_messages(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(flatten).collect(),
        other => vec![flatten(other)],
    }
}

fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(flatten).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map.values().map(flatten).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
