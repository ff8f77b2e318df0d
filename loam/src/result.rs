//! Uniform outcome of a builder operation.

use std::error::Error as StdError;

use loam_codegen::Diagnostic;
use serde::Serialize;
use serde_json::Value;

/// Result of one [`ManifestBuilder`](crate::ManifestBuilder) operation.
///
/// Failures are values, never panics or `Err`s, so a caller driving the
/// builder through discrete tool calls can branch on `success` and the
/// diagnostic codes in `errors` alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Diagnostic>>,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    /// A failure carrying a single diagnostic, whose message becomes the
    /// result message.
    pub fn rejected(diagnostic: Diagnostic) -> Self {
        Self::fail(diagnostic.message.clone()).with_errors(vec![diagnostic])
    }

    /// A failure describing `err` and each of its causes.
    pub fn from_error(context: &str, err: &(dyn StdError + 'static)) -> Self {
        let mut message = format!("{}: {}", context, err);
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::fail(message)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_errors(mut self, errors: Vec<Diagnostic>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Codes of the attached diagnostics, in order.
    pub fn error_codes(&self) -> Vec<&'static str> {
        self.errors
            .iter()
            .flatten()
            .map(|d| d.code.as_str())
            .collect()
    }
}
