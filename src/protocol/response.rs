//! Response object read from a handler's output stream.

use super::Scalar;
use crate::error::ReleaseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One flat row of a tabular result
pub type Row = BTreeMap<String, Scalar>;

/// Outcome of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// Command completed
    Success,
    /// Command failed; `error` is populated
    Error,
}

/// Value stored under a key of the response `data` map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Single scalar
    Scalar(Scalar),
    /// Homogeneous sequence of flat rows, rendered as a table
    Rows(Vec<Row>),
    /// Plain list of strings
    List(Vec<String>),
    /// Flat key/value map
    Map(Row),
}

impl From<Scalar> for DataValue {
    fn from(value: Scalar) -> Self {
        DataValue::Scalar(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Scalar(value.into())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Scalar(value.into())
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Scalar(value.into())
    }
}

impl From<Vec<Row>> for DataValue {
    fn from(value: Vec<Row>) -> Self {
        DataValue::Rows(value)
    }
}

impl From<Vec<String>> for DataValue {
    fn from(value: Vec<String>) -> Self {
        DataValue::List(value)
    }
}

impl From<Row> for DataValue {
    fn from(value: Row) -> Self {
        DataValue::Map(value)
    }
}

/// Identifies who produced a response and for which command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Backend or handler name
    pub name: String,
    /// Backend or handler version
    pub version: String,
    /// Command that was executed
    pub command: String,
    /// When the response was produced
    pub timestamp: DateTime<Utc>,
}

impl ResponseMetadata {
    /// Metadata stamped with the current time and this crate's version
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            command: command.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Machine-readable failure description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Short SCREAMING_SNAKE_CASE code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, DataValue>,
}

impl ResponseError {
    /// Error with no details
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: BTreeMap::new(),
        }
    }
}

impl From<&ReleaseError> for ResponseError {
    fn from(err: &ReleaseError) -> Self {
        let mut error = ResponseError::new(err.code(), err.to_string());
        let suggestions = err.recovery_suggestions();
        if !suggestions.is_empty() {
            error
                .details
                .insert("suggestions".to_string(), DataValue::List(suggestions));
        }
        if err.is_precondition() {
            error
                .details
                .insert("side_effects".to_string(), DataValue::from(false));
        }
        error
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Severity of a diagnostic line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Normal progress
    Info,
    /// Only shown in verbose mode
    Verbose,
    /// Partial success or recoverable problem
    Warn,
    /// Failure
    Error,
}

/// One diagnostic line recovered from a handler's side channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time as printed by the handler (`HH:MM:SS`)
    pub timestamp: String,
    /// Inferred severity
    pub level: LogLevel,
    /// Category, e.g. `pre-flight`
    pub category: String,
    /// Message text
    pub message: String,
}

/// The single structured result of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseResponse {
    /// Success or error
    pub status: ResponseStatus,
    /// Producer and command information
    pub metadata: ResponseMetadata,
    /// Result payload, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, DataValue>>,
    /// Failure description, present on error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
    /// How a renderer should present `data` (`table` or `text`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_hint: Option<String>,
    /// Diagnostics, attached by the gateway after the handler exits
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntry>,
}

impl ReleaseResponse {
    /// Successful response carrying `data`
    pub fn success(metadata: ResponseMetadata, data: BTreeMap<String, DataValue>) -> Self {
        Self {
            status: ResponseStatus::Success,
            metadata,
            data: Some(data),
            error: None,
            renderer_hint: None,
            logs: Vec::new(),
        }
    }

    /// Error response
    pub fn failure(metadata: ResponseMetadata, error: ResponseError) -> Self {
        Self {
            status: ResponseStatus::Error,
            metadata,
            data: None,
            error: Some(error),
            renderer_hint: None,
            logs: Vec::new(),
        }
    }

    /// Error response built from a [`ReleaseError`]
    pub fn from_error(metadata: ResponseMetadata, err: &ReleaseError) -> Self {
        Self::failure(metadata, ResponseError::from(err))
    }

    /// Attach a renderer hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.renderer_hint = Some(hint.into());
        self
    }

    /// Whether the status is `success`
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Look up a scalar in `data`
    pub fn scalar(&self, key: &str) -> Option<&Scalar> {
        match self.data.as_ref()?.get(key)? {
            DataValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Rows stored under `data.items`
    pub fn items(&self) -> &[Row] {
        match self.data.as_ref().and_then(|d| d.get("items")) {
            Some(DataValue::Rows(rows)) => rows,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_wire_shape() {
        let response = ReleaseResponse::failure(
            ResponseMetadata::new("goreleaser", "patch"),
            ResponseError::new("VERSION_VIOLATION", "local 1.2.2 < tag 1.3.0"),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["error"]["code"], "VERSION_VIOLATION");
        assert!(value.get("data").is_none());
        assert!(value.get("logs").is_none());
    }

    #[test]
    fn test_items_decode_as_rows() {
        let json = r#"{
            "status": "success",
            "metadata": {"name": "h", "version": "1", "command": "history", "timestamp": "2024-01-01T00:00:00Z"},
            "data": {"items": [{"tag": "v1.0.0", "commits": 4}], "count": 1, "names": ["a", "b"]},
            "renderer_hint": "table"
        }"#;
        let response: ReleaseResponse = serde_json::from_str(json).unwrap();

        assert!(response.is_success());
        assert_eq!(response.items().len(), 1);
        assert_eq!(response.items()[0].get("commits"), Some(&Scalar::Int(4)));
        assert_eq!(response.scalar("count"), Some(&Scalar::Int(1)));
        assert!(matches!(
            response.data.as_ref().and_then(|d| d.get("names")),
            Some(DataValue::List(_))
        ));
    }
}
