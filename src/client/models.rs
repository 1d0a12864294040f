use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::ClientError;

/// Body of a request to the python plugin run route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunRequest {
    /// Python source executed by the plugin
    pub source: String,
}

impl RunRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Raw outcome of a call made through `PluginClient::perform`.
///
/// Mirrors what the server-side `mldb.perform` hands back to scripts: the
/// status, the content type and the body as an undecoded string.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub response: String,
}

impl PerformResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Decodes the `response` string as the output of a script run.
    pub fn run_output(&self) -> Result<RunOutput, ClientError> {
        serde_json::from_str(&self.response).map_err(|source| ClientError::Decode {
            status: self.status_code,
            source,
        })
    }
}

/// Decoded output of a script run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunOutput {
    /// One raw record per logging call, in call order. `None` when the
    /// server omitted the key entirely. Records are not typed here so that a
    /// malformed record only matters if something reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<Value>>,

    /// Value the script returned, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Set when the script raised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ScriptException>,
}

impl RunOutput {
    pub fn record(&self, index: usize) -> Option<LogRecord> {
        self.logs.as_ref()?.get(index).map(LogRecord::from_value)
    }
}

/// Typed view of one log record. Fields that are missing or not strings
/// read as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    /// Rendered text of the call's arguments (`c`)
    pub content: Option<String>,

    /// Stream the record was written to ("logs", "stdout", ...) (`s`)
    pub stream: Option<String>,

    /// Timestamp of the call as formatted by the server (`t`)
    pub timestamp: Option<String>,
}

impl LogRecord {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            content: field("c"),
            stream: field("s"),
            timestamp: field("t"),
        }
    }

    /// Wire form of the record, omitting unset fields.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, field) in [
            ("c", &self.content),
            ("s", &self.stream),
            ("t", &self.timestamp),
        ] {
            if let Some(text) = field {
                map.insert(key.to_string(), Value::String(text.clone()));
            }
        }
        Value::Object(map)
    }
}

/// Exception details reported by the server when a script fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScriptException {
    #[serde(default)]
    pub message: String,

    /// Location of the failure, when the runtime reports one
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Remaining fields (stack, context, ...) kept verbatim
    #[serde(flatten)]
    pub details: Map<String, Value>,
}
