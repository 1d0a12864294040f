//! The `mldb.log()` rendering scenario.
//!
//! A scenario is an ordered list of log calls, each paired with the text the
//! plugin must record for it. All calls go into one embedded script, the
//! script is run once, and the Nth returned log record is compared with the
//! Nth case. The first mismatch fails the whole scenario; there is no retry.

use serde_json::Value;

use crate::client::{PluginClient, RunOutput, RunRequest};
use crate::log_value::LogValue;
use crate::script::{LogCall, Script};

mod errors;

pub use errors::ScenarioError;

/// Result marker reported to the enclosing harness when every check passed.
pub const SUCCESS_MARKER: &str = "success";

#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    Enabled,
    /// Not asserted. Whatever record the server returned is still reported.
    Pending { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogCase {
    pub call: LogCall,
    pub expected: String,
    pub check: Check,
}

impl LogCase {
    pub fn checked(call: LogCall, expected: impl Into<String>) -> Self {
        Self {
            call,
            expected: expected.into(),
            check: Check::Enabled,
        }
    }

    pub fn pending(call: LogCall, expected: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            call,
            expected: expected.into(),
            check: Check::Pending {
                reason: reason.into(),
            },
        }
    }
}

/// A case that was skipped, with what the server actually logged for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCase {
    pub index: usize,
    pub reason: String,
    pub expected: String,
    /// Raw log record at this position, as returned
    pub observed: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioReport {
    /// Number of records compared and found equal
    pub checked: usize,
    pub pending: Vec<PendingCase>,
}

impl ScenarioReport {
    pub fn result_marker(&self) -> &'static str {
        SUCCESS_MARKER
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogScenario {
    cases: Vec<LogCase>,
}

impl LogScenario {
    pub fn new(cases: Vec<LogCase>) -> Self {
        Self { cases }
    }

    /// The six calls of the plugin logging check, with their literal expectations.
    pub fn standard() -> Self {
        Self::new(vec![
            LogCase::checked(LogCall::one("patate"), "patate"),
            LogCase::checked(
                LogCall::one(LogValue::map([("patate", LogValue::Float(2.44))])),
                "{\n    \"patate\": 2.44\n}",
            ),
            LogCase::checked(
                LogCall::one(LogValue::seq(["patate", "pwel"])),
                "[\n    \"patate\",\n    \"pwel\"\n]",
            ),
            LogCase::checked(LogCall::one(25), "25"),
            LogCase::checked(
                LogCall::new(vec!["a".into(), "b".into(), 2.into()]),
                "a b 2",
            ),
            LogCase::pending(
                LogCall::empty(),
                "",
                "rendering of a call without arguments has not been confirmed on the server",
            ),
        ])
    }

    /// Builds a scenario whose expectations come from the local rendering rules.
    /// Calls without arguments become pending cases.
    pub fn from_calls<I>(calls: I) -> Result<Self, ScenarioError>
    where
        I: IntoIterator<Item = LogCall>,
    {
        let mut cases = Vec::new();
        for call in calls {
            let expected = call.rendered()?;
            let case = if call.args.is_empty() {
                LogCase::pending(call, expected, "empty call rendering is unverified")
            } else {
                LogCase::checked(call, expected)
            };
            cases.push(case);
        }
        Ok(Self::new(cases))
    }

    pub fn cases(&self) -> &[LogCase] {
        &self.cases
    }

    pub fn script(&self) -> Script {
        self.cases.iter().map(|case| case.call.clone()).collect()
    }

    pub fn request(&self) -> RunRequest {
        RunRequest::new(self.script().source())
    }

    /// Minimum number of log records needed to evaluate every enabled case.
    pub fn required_logs(&self) -> usize {
        self.cases
            .iter()
            .rposition(|case| case.check == Check::Enabled)
            .map_or(0, |index| index + 1)
    }

    /// Compares the run output with the expected text of every enabled case.
    pub fn verify(&self, output: &RunOutput) -> Result<ScenarioReport, ScenarioError> {
        let required = self.required_logs();

        let Some(logs) = output.logs.as_ref() else {
            return Err(script_failure(output).unwrap_or(ScenarioError::LogsAbsent));
        };

        if logs.len() < required {
            return Err(script_failure(output).unwrap_or(ScenarioError::TooFewLogs {
                expected: required,
                actual: logs.len(),
            }));
        }

        let mut report = ScenarioReport::default();
        for (index, case) in self.cases.iter().enumerate() {
            let raw = logs.get(index);

            match &case.check {
                Check::Enabled => {
                    let Some(raw) = raw else {
                        return Err(ScenarioError::TooFewLogs {
                            expected: required,
                            actual: logs.len(),
                        });
                    };
                    let Some(actual) = raw.get("c").and_then(Value::as_str) else {
                        return Err(ScenarioError::MissingText {
                            index,
                            record: raw.clone(),
                        });
                    };
                    if actual != case.expected {
                        return Err(ScenarioError::Mismatch {
                            index,
                            expected: case.expected.clone(),
                            actual: actual.to_string(),
                        });
                    }
                    report.checked += 1;
                }
                Check::Pending { reason } => {
                    log::warn!(
                        "Log record {} not checked ({}): expected {:?}, observed {}",
                        index,
                        reason,
                        case.expected,
                        raw.map_or_else(|| "nothing".to_string(), Value::to_string)
                    );
                    report.pending.push(PendingCase {
                        index,
                        reason: reason.clone(),
                        expected: case.expected.clone(),
                        observed: raw.cloned(),
                    });
                }
            }
        }

        if let Some(exception) = &output.exception {
            log::warn!("Script raised after logging: {}", exception.message);
        }

        Ok(report)
    }

    /// Runs the scenario's script on the server and verifies the result.
    pub async fn run(&self, client: &PluginClient) -> Result<ScenarioReport, ScenarioError> {
        let request = self.request();
        log::info!(
            "Running {} log calls through {}{}",
            self.cases.len(),
            client.base_url(),
            client.run_route()
        );

        let output = client.run_python(&request).await?;
        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "Run output: {}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        }

        let report = self.verify(&output)?;
        log::info!(
            "{} log records checked, {} pending",
            report.checked,
            report.pending.len()
        );
        Ok(report)
    }
}

fn script_failure(output: &RunOutput) -> Option<ScenarioError> {
    output
        .exception
        .as_ref()
        .map(|exception| ScenarioError::ScriptFailed {
            message: exception.message.clone(),
        })
}
