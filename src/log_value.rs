//! Values passed to the plugin's `mldb.log()` entry point.
//!
//! The remote logger accepts any number of positional arguments of mixed
//! type. `LogValue` models one such argument; the rendering functions below
//! describe the text the server is expected to produce for a call.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Number, Value};

/// Indentation used by the server when pretty-printing JSON.
const PRETTY_INDENT: &[u8] = b"    ";

/// One argument of a `mldb.log()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<LogValue>),
    /// Keys keep insertion order, both in the script and in the rendering.
    Map(Vec<(String, LogValue)>),
}

impl LogValue {
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, LogValue)>,
    {
        LogValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn seq<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LogValue>,
    {
        LogValue::Seq(items.into_iter().map(Into::into).collect())
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, LogValue::Seq(_) | LogValue::Map(_))
    }

    /// JSON form of the value. Non-finite floats have no JSON form and become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            LogValue::Null => Value::Null,
            LogValue::Bool(b) => Value::Bool(*b),
            LogValue::Int(i) => Value::Number((*i).into()),
            LogValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            LogValue::Str(s) => Value::String(s.clone()),
            LogValue::Seq(items) => Value::Array(items.iter().map(LogValue::to_json).collect()),
            LogValue::Map(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json());
                }
                Value::Object(map)
            }
        }
    }

    /// Plain text form, as the value prints when it is one of several arguments.
    ///
    /// Strings are unquoted, scalars use their literal text and composites
    /// print like python's `str()` of a list or dict.
    pub fn plain_text(&self) -> String {
        match self {
            LogValue::Null => "None".to_string(),
            LogValue::Bool(true) => "True".to_string(),
            LogValue::Bool(false) => "False".to_string(),
            LogValue::Int(i) => i.to_string(),
            LogValue::Float(f) => float_text(*f),
            LogValue::Str(s) => s.clone(),
            LogValue::Seq(_) | LogValue::Map(_) => self.python_repr(),
        }
    }

    /// Python `repr()` of the value: single-quoted strings, `", "` and `": "`
    /// separators.
    fn python_repr(&self) -> String {
        match self {
            LogValue::Str(s) => python_str_repr(s),
            LogValue::Seq(items) => {
                let items: Vec<String> = items.iter().map(LogValue::python_repr).collect();
                format!("[{}]", items.join(", "))
            }
            LogValue::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", python_str_repr(k), v.python_repr()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            _ => self.plain_text(),
        }
    }

    /// Source text of the value as a Python literal, for embedding in a script.
    pub fn python_literal(&self) -> String {
        match self {
            LogValue::Null => "None".to_string(),
            LogValue::Bool(_) | LogValue::Int(_) => self.plain_text(),
            LogValue::Float(f) if f.is_nan() => "float('nan')".to_string(),
            LogValue::Float(f) if f.is_infinite() => {
                if *f > 0.0 {
                    "float('inf')".to_string()
                } else {
                    "-float('inf')".to_string()
                }
            }
            LogValue::Float(f) => float_text(*f),
            // JSON string escapes are a subset of Python's.
            LogValue::Str(s) => Value::String(s.clone()).to_string(),
            LogValue::Seq(items) => {
                let items: Vec<String> = items.iter().map(LogValue::python_literal).collect();
                format!("[{}]", items.join(", "))
            }
            LogValue::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}: {}",
                            Value::String(k.clone()),
                            v.python_literal()
                        )
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Str(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Str(s)
    }
}

impl From<i64> for LogValue {
    fn from(i: i64) -> Self {
        LogValue::Int(i)
    }
}

impl From<i32> for LogValue {
    fn from(i: i32) -> Self {
        LogValue::Int(i64::from(i))
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

/// Pretty-prints a JSON value with the server's 4-space indentation.
pub fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(PRETTY_INDENT));
    value.serialize(&mut ser)?;
    // serde_json only ever writes UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Text the server is expected to log for a call with `args`.
///
/// A single composite argument is pretty-printed as JSON; a single scalar is
/// rendered as plain text; several arguments are joined by one space. A call
/// without arguments renders as the empty string, which the server has never
/// been confirmed to do.
pub fn render_call(args: &[LogValue]) -> Result<String, serde_json::Error> {
    match args {
        [] => Ok(String::new()),
        [single] if single.is_composite() => to_pretty_json(&single.to_json()),
        [single] => Ok(single.plain_text()),
        _ => Ok(args
            .iter()
            .map(LogValue::plain_text)
            .collect::<Vec<_>>()
            .join(" ")),
    }
}

fn python_str_repr(s: &str) -> String {
    // Double quotes only when that avoids escaping a single quote
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    // Finite, so from_f64 succeeds; shortest round-trip form, always with a
    // fractional part or exponent.
    Number::from_f64(f).map_or_else(|| f.to_string(), |n| n.to_string())
}
