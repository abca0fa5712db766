use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rule::Rule;

#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("no rule at index {index}, the rule set has {len} rule(s)")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("malformed rule set: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rule #{number} is invalid: {source}", number = .index + 1)]
    InvalidRule {
        index: usize,
        source: serde_json::Error,
    },
}

/// Ordered rules, earlier rules take priority. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule, which has been validated by [`Rule::new`].
    pub fn append(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn remove(&mut self, index: usize) -> Result<Rule, RuleSetError> {
        self.check(index)?;
        Ok(self.rules.remove(index))
    }

    /// Swaps the rule with its predecessor; no-op for the first rule.
    pub fn move_up(&mut self, index: usize) -> Result<(), RuleSetError> {
        self.check(index)?;
        if index > 0 {
            self.rules.swap(index - 1, index);
        }
        Ok(())
    }

    /// Swaps the rule with its successor; no-op for the last rule.
    pub fn move_down(&mut self, index: usize) -> Result<(), RuleSetError> {
        self.check(index)?;
        if index + 1 < self.rules.len() {
            self.rules.swap(index, index + 1);
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn to_json(&self) -> Result<String, RuleSetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and re-validates every rule. Broken JSON is
    /// [`RuleSetError::Json`], a rule failing validation
    /// [`RuleSetError::InvalidRule`].
    pub fn from_json(json: &str) -> Result<Self, RuleSetError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value(value)
                    .map_err(|source| RuleSetError::InvalidRule { index, source })
            })
            .collect()
    }

    fn check(&self, index: usize) -> Result<(), RuleSetError> {
        match index < self.rules.len() {
            true => Ok(()),
            false => Err(RuleSetError::IndexOutOfBounds {
                index,
                len: self.rules.len(),
            }),
        }
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
