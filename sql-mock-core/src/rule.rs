use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{self, Value, ValueType};

/// A bound parameter value required at a fixed position.
pub type ParameterConstraint = Value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid pattern `{expression}`: {reason}")]
    InvalidPattern { expression: String, reason: String },
    #[error("`{raw}` is not a valid {expected} value")]
    InvalidValue { expected: ValueType, raw: String },
    #[error("{kind} rule cannot return {result}")]
    KindMismatch {
        kind: RuleKind,
        result: &'static str,
    },
    #[error("row {row} has {found} cells but the schema has {expected} columns")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("row {row}, column `{column}`: `{raw}` is not a valid {expected} value")]
    InvalidCell {
        row: usize,
        column: String,
        raw: String,
        expected: ValueType,
    },
    #[error("column #{0} has no name")]
    EmptyColumnName(usize),
    #[error("error message must not be empty")]
    EmptyErrorMessage,
    #[error("a result set needs at least one row")]
    NoRows,
    #[error("no result defined for the rule")]
    MissingResult,
    #[error("update count {0} does not fit a 32-bit signed integer")]
    UpdateCountOutOfRange(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Query,
    Update,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Query => write!(f, "query"),
            RuleKind::Update => write!(f, "update"),
        }
    }
}

/// Regular expression plus positional parameter constraints.
///
/// The expression is compiled on construction, an invalid one never makes it
/// into a pattern. Matching is anchored on both ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPattern", into = "RawPattern")]
pub struct Pattern {
    expression: String,
    parameters: Vec<ParameterConstraint>,
    anchored: Regex,
}

impl Pattern {
    pub fn new(
        expression: impl Into<String>,
        parameters: Vec<ParameterConstraint>,
    ) -> Result<Self, RuleError> {
        let expression = expression.into();
        let invalid = |reason: String| RuleError::InvalidPattern {
            expression: expression.clone(),
            reason,
        };
        if expression.trim().is_empty() {
            return Err(invalid("expression is empty".to_string()));
        }
        // The bare expression must compile on its own, wrapping it could
        // balance an otherwise stray parenthesis.
        Regex::new(&expression).map_err(|error| invalid(error.to_string()))?;
        if let Some(construct) = unportable_construct(&expression) {
            return Err(invalid(format!("{construct} is not supported by java.util.regex")));
        }
        let anchored = Regex::new(&format!("^(?:{expression})$"))
            .map_err(|error| invalid(error.to_string()))?;
        Ok(Self {
            expression,
            parameters,
            anchored,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn parameters(&self) -> &[ParameterConstraint] {
        &self.parameters
    }

    /// Whole-statement match of the expression.
    pub fn matches_statement(&self, statement: &str) -> bool {
        self.anchored.is_match(statement)
    }

    /// Every declared constraint has an equal bound parameter at its
    /// position. Trailing unconstrained parameters are accepted.
    pub fn matches_parameters(&self, bound: &[Value]) -> bool {
        self.parameters.len() <= bound.len()
            && self
                .parameters
                .iter()
                .zip(bound)
                .all(|(constraint, parameter)| constraint.same_as(parameter))
    }
}

/// First construct the `regex` crate accepts that `java.util.regex` reads
/// differently or rejects.
fn unportable_construct(expression: &str) -> Option<&'static str> {
    let chars = expression.chars().collect::<Vec<_>>();
    let mut class_depth = 0usize;
    let mut index = 0;
    while index < chars.len() {
        match &chars[index..] {
            ['\\', '<' | '>', ..] => return Some("word boundary `\\<` or `\\>`"),
            ['\\', 'b' | 'B', '{', ..] => return Some("word boundary `\\b{...}`"),
            ['\\', ..] => index += 1,
            ['[', ':', ..] if class_depth > 0 => return Some("POSIX class `[[:name:]]`"),
            ['[', rest @ ..] => {
                class_depth += 1;
                // `]` right after the opening bracket (or `^`) is a literal.
                let skip = match rest {
                    ['^', ']', ..] => 2,
                    ['^', ..] | [']', ..] => 1,
                    _ => 0,
                };
                index += skip;
            }
            [']', ..] if class_depth > 0 => class_depth -= 1,
            ['-', '-', ..] | ['~', '~', ..] if class_depth > 0 => {
                return Some("class set operation `--` or `~~`");
            }
            ['(', '?', 'P', '<', ..] if class_depth == 0 => {
                return Some("named group `(?P<name>...)`");
            }
            ['(', '?', rest @ ..] if class_depth == 0 => {
                let swaps_meaning = rest
                    .iter()
                    .take_while(|c| c.is_ascii_alphabetic() || **c == '-')
                    .any(|c| matches!(c, 'U' | 'R'));
                if swaps_meaning {
                    return Some("flag `U` or `R`");
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression && self.parameters == other.parameters
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPattern {
    expression: String,
    #[serde(default)]
    parameters: Vec<ParameterConstraint>,
}

impl TryFrom<RawPattern> for Pattern {
    type Error = RuleError;

    fn try_from(raw: RawPattern) -> Result<Self, Self::Error> {
        Pattern::new(raw.expression, raw.parameters)
    }
}

impl From<Pattern> for RawPattern {
    fn from(pattern: Pattern) -> Self {
        RawPattern {
            expression: pattern.expression,
            parameters: pattern.parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "_type")]
    pub column_type: ValueType,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ValueType) -> Self {
        Self {
            column_type,
            name: name.into(),
        }
    }
}

/// Typed rows; every row is as wide as the schema and each cell is valid for
/// its column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRowSet", into = "RawRowSet")]
pub struct RowSet {
    schema: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl RowSet {
    pub fn new(schema: Vec<Column>, rows: Vec<Vec<String>>) -> Result<Self, RuleError> {
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(RuleError::RowWidth {
                    row: row_index,
                    found: row.len(),
                    expected: schema.len(),
                });
            }
            for (cell, column) in row.iter().zip(&schema) {
                if types::validate(column.column_type, cell).is_err() {
                    return Err(RuleError::InvalidCell {
                        row: row_index,
                        column: column.name.clone(),
                        raw: cell.clone(),
                        expected: column.column_type,
                    });
                }
            }
        }
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &[Column] {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.schema.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRowSet {
    schema: Vec<Column>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl TryFrom<RawRowSet> for RowSet {
    type Error = RuleError;

    fn try_from(raw: RawRowSet) -> Result<Self, Self::Error> {
        RowSet::new(raw.schema, raw.rows)
    }
}

impl From<RowSet> for RawRowSet {
    fn from(row_set: RowSet) -> Self {
        RawRowSet {
            schema: row_set.schema,
            rows: row_set.rows,
        }
    }
}

/// Generated handlers pass the count to a JDBC `int`.
pub const MAX_UPDATE_COUNT: u64 = i32::MAX as u64;

/// What a matching rule produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleResult {
    Error {
        #[serde(rename = "error")]
        message: String,
    },
    UpdateCount {
        #[serde(rename = "updateCount")]
        count: u64,
    },
    RowSet(RowSet),
}

impl RuleResult {
    pub fn error(message: impl Into<String>) -> Self {
        RuleResult::Error {
            message: message.into(),
        }
    }

    pub fn update_count(count: u64) -> Self {
        RuleResult::UpdateCount { count }
    }

    fn shape(&self) -> &'static str {
        match self {
            RuleResult::Error { .. } => "an error",
            RuleResult::UpdateCount { .. } => "an update count",
            RuleResult::RowSet(_) => "a result set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct Rule {
    kind: RuleKind,
    pattern: Pattern,
    result: RuleResult,
}

impl Rule {
    /// Update rules return an error or an update count, query rules an error
    /// or a result set. Update counts are bounded by [`MAX_UPDATE_COUNT`].
    pub fn new(kind: RuleKind, pattern: Pattern, result: RuleResult) -> Result<Self, RuleError> {
        if let RuleResult::UpdateCount { count } = &result
            && *count > MAX_UPDATE_COUNT
        {
            return Err(RuleError::UpdateCountOutOfRange(*count));
        }
        match (kind, &result) {
            (_, RuleResult::Error { .. })
            | (RuleKind::Update, RuleResult::UpdateCount { .. })
            | (RuleKind::Query, RuleResult::RowSet(_)) => Ok(Self {
                kind,
                pattern,
                result,
            }),
            _ => Err(RuleError::KindMismatch {
                kind,
                result: result.shape(),
            }),
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn result(&self) -> &RuleResult {
        &self.result
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRule {
    #[serde(rename = "_type")]
    kind: RuleKind,
    pattern: Pattern,
    result: RuleResult,
}

impl TryFrom<RawRule> for Rule {
    type Error = RuleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        Rule::new(raw.kind, raw.pattern, raw.result)
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        RawRule {
            kind: rule.kind,
            pattern: rule.pattern,
            result: rule.result,
        }
    }
}
