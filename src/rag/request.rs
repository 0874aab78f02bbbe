//! Request building for the RAG webhook.
//!
//! A [`RequestParameters`] value is built fresh for every send from the
//! user's text, the static settings and a snapshot of the active editor.
//! Structural fields (`query`, `collection`, and the caller context) always
//! win over configured extras with the same name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::config::Settings;
use crate::error::ClientError;
use crate::host::EditorContext;

/// A JSON-serializable value from the `additionalParams` setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Integral JSON number.
    Integer(i64),
    /// Non-integral JSON number.
    Float(f64),
    /// JSON string.
    String(String),
    /// JSON array.
    List(Vec<ParamValue>),
    /// JSON object.
    Map(BTreeMap<String, ParamValue>),
}

impl From<&ParamValue> for Value {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Integer(n) => Value::Number((*n).into()),
            ParamValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            ParamValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// User text that is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Trims `text`; returns `None` when nothing is left to send.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The trimmed text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Line information derived from the editor selection (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextLines {
    /// Empty selection: the cursor line.
    Cursor {
        /// Cursor line.
        line_number: u32,
    },
    /// Non-empty selection: the inclusive line span.
    Range {
        /// First selected line.
        start_line: u32,
        /// Last selected line.
        end_line: u32,
    },
}

/// Caller context attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Active document, relative to the workspace root.
    pub file_path: String,
    /// Selection-derived lines, when the host reported a selection.
    pub lines: Option<ContextLines>,
}

impl RequestContext {
    /// Derives the context from an editor snapshot.
    ///
    /// Emptiness of the selection decides between a range and a single line.
    pub fn from_editor(context: &EditorContext) -> Self {
        let lines = context.selection.map(|selection| {
            if selection.is_empty() {
                ContextLines::Cursor {
                    line_number: selection.active.line + 1,
                }
            } else {
                ContextLines::Range {
                    start_line: selection.range.start.line + 1,
                    end_line: selection.range.end.line + 1,
                }
            }
        });
        Self {
            file_path: context.relative_path.clone(),
            lines,
        }
    }
}

/// The body of one webhook request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameters {
    /// Trimmed user question.
    pub query: String,
    /// Optional scoping key.
    pub collection: Option<String>,
    /// Optional caller context.
    pub context: Option<RequestContext>,
    /// Extra key/value pairs from settings.
    pub extra: BTreeMap<String, ParamValue>,
}

impl RequestParameters {
    /// Renders the JSON object sent on the wire.
    pub fn to_body(&self) -> Map<String, Value> {
        let mut body: Map<String, Value> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v)))
            .collect();

        body.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(collection) = &self.collection {
            body.insert("collection".to_string(), Value::String(collection.clone()));
        }

        if let Some(context) = &self.context {
            body.insert(
                "file_path".to_string(),
                Value::String(context.file_path.clone()),
            );
            match context.lines {
                Some(ContextLines::Cursor { line_number }) => {
                    body.insert("line_number".to_string(), line_number.into());
                }
                Some(ContextLines::Range {
                    start_line,
                    end_line,
                }) => {
                    body.insert("start_line".to_string(), start_line.into());
                    body.insert("end_line".to_string(), end_line.into());
                }
                None => {}
            }
        }

        body
    }
}

impl Serialize for RequestParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_body().serialize(serializer)
    }
}

/// Builds [`RequestParameters`] from settings and an editor snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    settings: &'a Settings,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder over the given settings.
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Builds the request for `query`.
    ///
    /// Context is attached only when `includeContext` is enabled, a document
    /// is active and a workspace root is known; otherwise it is silently
    /// omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the settings require a
    /// collection and none is configured.
    pub fn build(
        &self,
        query: &Query,
        editor: Option<&EditorContext>,
        workspace_known: bool,
    ) -> Result<RequestParameters, ClientError> {
        let collection = Some(self.settings.collection.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        if collection.is_none() && self.settings.require_collection {
            return Err(ClientError::Configuration(
                "collection is not configured; set ragChat.collection in settings".to_string(),
            ));
        }

        let context = editor
            .filter(|_| self.settings.include_context && workspace_known)
            .map(RequestContext::from_editor);

        Ok(RequestParameters {
            query: query.as_str().to_string(),
            collection,
            context,
            extra: self.settings.additional_params.clone(),
        })
    }
}
