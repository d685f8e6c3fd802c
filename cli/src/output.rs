//! CLI output rendering.
//!
//! Text mode prints the result value to stdout and diagnostics to stderr;
//! JSON mode emits a single machine-readable object on stdout for editor and
//! CI integration.

use miniruby::error::MiniRubyError;
use miniruby::Value;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable output (default)
    Text,
    /// Single JSON object
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<JsonError>,
}

#[derive(Debug, Serialize)]
struct JsonError {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<usize>,
}

impl From<&MiniRubyError> for JsonError {
    fn from(error: &MiniRubyError) -> Self {
        JsonError {
            kind: error.kind(),
            message: error.message().to_string(),
            start: error.span().map(|span| span.start),
            end: error.span().map(|span| span.end),
        }
    }
}

pub fn report_result(value: &Value, mode: OutputMode) {
    match mode {
        OutputMode::Text => println!("{value}"),
        OutputMode::Json => emit(&JsonReport {
            status: "ok",
            result: Some(value.to_string()),
            errors: Vec::new(),
        }),
    }
}

pub fn report_errors(errors: &[MiniRubyError], mode: OutputMode) {
    match mode {
        OutputMode::Text => {
            for error in errors {
                eprintln!("{error}");
            }
        }
        OutputMode::Json => emit(&JsonReport {
            status: "error",
            result: None,
            errors: errors.iter().map(JsonError::from).collect(),
        }),
    }
}

fn emit(report: &JsonReport) {
    if let Ok(rendered) = serde_json::to_string(report) {
        println!("{rendered}");
    }
}
