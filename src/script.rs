//! Construction of the embedded python script sent to the plugin run route.

use crate::log_value::{render_call, LogValue};

/// Import line every script starts with.
pub const SCRIPT_PRELUDE: &str = "from mldb import mldb";

/// Logging entry point exposed by the plugin runtime.
pub const LOG_FUNCTION: &str = "mldb.log";

/// A single `mldb.log(...)` call with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct LogCall {
    pub args: Vec<LogValue>,
}

impl LogCall {
    pub fn new(args: Vec<LogValue>) -> Self {
        Self { args }
    }

    pub fn one(arg: impl Into<LogValue>) -> Self {
        Self {
            args: vec![arg.into()],
        }
    }

    pub fn empty() -> Self {
        Self { args: Vec::new() }
    }

    /// Python source line for this call.
    pub fn to_python(&self) -> String {
        let args: Vec<String> = self.args.iter().map(LogValue::python_literal).collect();
        format!("{}({})", LOG_FUNCTION, args.join(", "))
    }

    /// Text the plugin should record for this call.
    pub fn rendered(&self) -> Result<String, serde_json::Error> {
        render_call(&self.args)
    }
}

/// Ordered list of log calls making up one embedded script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    calls: Vec<LogCall>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, call: LogCall) -> &mut Self {
        self.calls.push(call);
        self
    }

    pub fn calls(&self) -> &[LogCall] {
        &self.calls
    }

    /// Full script text. One call per line, in order, after the import.
    pub fn source(&self) -> String {
        let mut source = String::from("\n");
        source.push_str(SCRIPT_PRELUDE);
        source.push('\n');
        for call in &self.calls {
            source.push_str(&call.to_python());
            source.push('\n');
        }
        source
    }
}

impl FromIterator<LogCall> for Script {
    fn from_iter<I: IntoIterator<Item = LogCall>>(iter: I) -> Self {
        Self {
            calls: iter.into_iter().collect(),
        }
    }
}
