pub mod java;
pub mod json;
pub mod scala;
pub mod source;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{rule::RowSet, rule_set::RuleSet};

pub const DEFAULT_MAX_ARITY: usize = 3;
pub const DEFAULT_HANDLER_ID: &str = "my-unique-id";

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error(
        "rule #{number}: no fixed-arity row list for {width} column(s), supported widths are 1 to {max}",
        number = .rule + 1
    )]
    UnsupportedSchemaWidth {
        rule: usize,
        width: usize,
        max: usize,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// How a rule declaring an error surfaces it in generated handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorStyle {
    /// Throw an `SQLException` carrying the message.
    #[default]
    Raise,
    /// Return an empty result carrying the message as a warning.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Widest row list the target runtime provides a builder for.
    pub max_arity: usize,
    /// Key the generated handler is registered under.
    pub handler_id: String,
    pub error_style: ErrorStyle,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_arity: DEFAULT_MAX_ARITY,
            handler_id: DEFAULT_HANDLER_ID.to_string(),
            error_style: ErrorStyle::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn jdbc_url(&self) -> String {
        format!(
            "jdbc:acolyte:anything-you-want?handler={}",
            self.handler_id
        )
    }

    /// Width of `row_set` when a fixed-arity builder exists for it. A single
    /// unsupported rule fails the whole file.
    pub fn checked_width(&self, rule: usize, row_set: &RowSet) -> Result<usize, CodeGenError> {
        let width = row_set.width();
        match (1..=self.max_arity).contains(&width) {
            true => Ok(width),
            false => Err(CodeGenError::UnsupportedSchemaWidth {
                rule,
                width,
                max: self.max_arity,
            }),
        }
    }
}

/// A backend turning a rule set into one block of source text.
///
/// Generation only reads the rule set; backends may run side by side.
pub trait CodeGen {
    fn name(&self) -> &'static str;

    fn generate(&self, rules: &RuleSet) -> Result<String, CodeGenError>;
}
