//! Request descriptions.
//!
//! An [`ApiRequest`] is plain data so the executor can dispatch it twice
//! (original attempt plus one retry after a refresh).

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use peel_core::{Error, InvalidInputError, Result};

/// A single logical API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) endpoint: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: RequestBody,
    pub(crate) skip_auth: bool,
    pub(crate) return_to: Option<String>,
}

/// The body of an [`ApiRequest`].
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(FormData),
}

impl ApiRequest {
    /// Create a request for `endpoint` (a path relative to the base URL).
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            skip_auth: false,
            return_to: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Serialize `body` and attach it as JSON.
    pub fn json_from<B: Serialize + ?Sized>(self, body: &B) -> Result<Self> {
        Ok(self.json(serde_json::to_value(body)?))
    }

    /// Attach a multipart body.
    pub fn form(mut self, form: FormData) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    /// Append a single query parameter.
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append query parameters from a serializable map or struct.
    ///
    /// Entries whose value is `null` (e.g. `None` fields) are dropped.
    pub fn query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        self.query.extend(query_pairs(params)?);
        Ok(self)
    }

    /// Send without credentials and never attempt a refresh.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Page to return to after logging in, should this call end the session.
    pub fn return_to(mut self, path: impl Into<String>) -> Self {
        self.return_to = Some(path.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_public(&self) -> bool {
        self.skip_auth
    }
}

fn query_pairs<Q: Serialize + ?Sized>(params: &Q) -> Result<Vec<(String, String)>> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key, query_value(value)))
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(InvalidInputError::Other {
            message: format!("query parameters must be a map, got {}", other),
        }
        .into()),
    }
}

fn query_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(query_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// A multipart form that can be rebuilt for every attempt.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

#[derive(Debug, Clone)]
struct FormPart {
    name: String,
    value: PartValue,
}

#[derive(Clone)]
enum PartValue {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime: Option<String>,
    },
}

// File contents stay out of logs
impl std::fmt::Debug for PartValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            PartValue::File {
                bytes,
                file_name,
                mime,
            } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Add a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                bytes,
                file_name: file_name.into(),
                mime: mime.map(str::to_string),
            },
        });
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn to_multipart(&self) -> Result<Form> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match &part.value {
                PartValue::Text(text) => form.text(part.name.clone(), text.clone()),
                PartValue::File {
                    bytes,
                    file_name,
                    mime,
                } => {
                    let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        file = file.mime_str(mime).map_err(|_| {
                            Error::from(InvalidInputError::Other {
                                message: format!("invalid MIME type '{}'", mime),
                            })
                        })?;
                    }
                    form.part(part.name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}
