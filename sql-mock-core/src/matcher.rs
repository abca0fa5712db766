//! Reference evaluation of a rule set against an executed statement.
//!
//! Generated handlers implement the same first-match-wins algorithm in their
//! own runtime; this module is what they are checked against.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    preview,
    rule::{Rule, RuleKind, RuleResult},
    rule_set::RuleSet,
    types::Value,
};

/// A statement as issued through the mocked connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub statement: String,
    pub kind: RuleKind,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl Execution {
    pub fn query(statement: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            statement: statement.into(),
            kind: RuleKind::Query,
            parameters,
        }
    }

    pub fn update(statement: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            statement: statement.into(),
            kind: RuleKind::Update,
            parameters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<'a> {
    /// The rule at `index` matched first.
    Matched { index: usize, result: &'a RuleResult },
    /// No rule handles the statement.
    Unsupported,
}

impl Outcome<'_> {
    pub fn index(&self) -> Option<usize> {
        match self {
            Outcome::Matched { index, .. } => Some(*index),
            Outcome::Unsupported => None,
        }
    }
}

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matched { index, result } => {
                write!(f, "rule #{}: {}", index + 1, preview::summarize_result(result))
            }
            Outcome::Unsupported => write!(f, "unsupported statement"),
        }
    }
}

pub fn rule_matches(rule: &Rule, execution: &Execution) -> bool {
    rule.kind() == execution.kind
        && rule.pattern().matches_statement(&execution.statement)
        && rule.pattern().matches_parameters(&execution.parameters)
}

pub fn resolve<'a>(rules: &'a RuleSet, execution: &Execution) -> Outcome<'a> {
    for (index, rule) in rules.iter().enumerate() {
        if rule_matches(rule, execution) {
            debug!(index, statement = %execution.statement, "rule matched");
            return Outcome::Matched {
                index,
                result: rule.result(),
            };
        }
    }
    debug!(statement = %execution.statement, "no rule matched");
    Outcome::Unsupported
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::rule::Pattern;

    fn rule(kind: RuleKind, expression: &str, constraints: Vec<Value>, result: RuleResult) -> Rule {
        Rule::new(kind, Pattern::new(expression, constraints).unwrap(), result).unwrap()
    }

    #[test]
    fn earlier_rule_wins() {
        let rules: RuleSet = [
            rule(RuleKind::Query, "SELECT.*", vec![], RuleResult::error("first")),
            rule(RuleKind::Query, "SELECT 1", vec![], RuleResult::error("second")),
        ]
        .into_iter()
        .collect();
        let outcome = resolve(&rules, &Execution::query("SELECT 1", vec![]));
        assert_eq!(outcome.index(), Some(0));
    }

    #[test]
    fn kind_must_agree() {
        let rules: RuleSet = [rule(
            RuleKind::Update,
            "UPDATE test SET.*",
            vec![],
            RuleResult::update_count(2),
        )]
        .into_iter()
        .collect();
        let statement = "UPDATE test SET name='x'";
        assert_eq!(
            resolve(&rules, &Execution::update(statement, vec![])),
            Outcome::Matched {
                index: 0,
                result: &RuleResult::update_count(2)
            }
        );
        assert_eq!(
            resolve(&rules, &Execution::query(statement, vec![])),
            Outcome::Unsupported
        );
    }

    #[test]
    fn constraints_are_typed() {
        let rules: RuleSet = [rule(
            RuleKind::Query,
            "SELECT.*",
            vec![Value::number("1").unwrap()],
            RuleResult::error("typed"),
        )]
        .into_iter()
        .collect();
        let text = Execution::query("SELECT x", vec![Value::text("1")]);
        assert_eq!(resolve(&rules, &text), Outcome::Unsupported);
        let number = Execution::query("SELECT x", vec![Value::number("1.0").unwrap()]);
        assert_eq!(resolve(&rules, &number).index(), Some(0));
    }

    #[test]
    fn missing_parameter_does_not_match() {
        let rules: RuleSet = [rule(
            RuleKind::Query,
            "SELECT.*",
            vec![Value::text("a"), Value::text("b")],
            RuleResult::error("two"),
        )]
        .into_iter()
        .collect();
        let one = Execution::query("SELECT", vec![Value::text("a")]);
        assert_eq!(resolve(&rules, &one), Outcome::Unsupported);
    }

    #[test]
    fn extra_parameters_still_match() {
        let rules: RuleSet = [
            rule(RuleKind::Query, "SELECT.*", vec![Value::text("a")], RuleResult::error("a")),
        ]
        .into_iter()
        .collect();
        let execution = Execution::query("SELECT", vec![Value::text("a"), Value::text("z")]);
        assert_eq!(resolve(&rules, &execution).index(), Some(0));
    }

    #[test]
    fn unconstrained_rule_ignores_parameters() {
        let rules: RuleSet = [rule(RuleKind::Query, "SELECT.*", vec![], RuleResult::error("any"))]
            .into_iter()
            .collect();
        let execution = Execution::query("SELECT", vec![Value::text("whatever")]);
        assert_eq!(resolve(&rules, &execution).index(), Some(0));
    }

    #[test]
    fn empty_rule_set_is_unsupported() {
        let rules = RuleSet::new();
        let outcome = resolve(&rules, &Execution::query("SELECT 1", vec![]));
        assert_eq!(outcome, Outcome::Unsupported);
        assert_eq!(outcome.to_string(), "unsupported statement");
    }

    #[test]
    fn execution_json_shape() {
        let json = r#"{"statement":"SELECT 1","kind":"query","parameters":[{"_type":"string","value":"a"}]}"#;
        let execution: Execution = serde_json::from_str(json).unwrap();
        assert_eq!(execution, Execution::query("SELECT 1", vec![Value::text("a")]));
    }
}
