//! Editing state of one mocked connection.

use tracing::debug;

use crate::{
    preview::{self, Preview},
    rule::{Column, Pattern, RowSet, Rule, RuleError, RuleKind, RuleResult},
    rule_set::{RuleSet, RuleSetError},
    types::{Value, ValueType},
};

/// What activating a rule in the list does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClickMode {
    #[default]
    Remove,
    Move,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DraftResult {
    #[default]
    Undefined,
    Error(String),
    UpdateCount(u64),
    RowSet {
        columns: Vec<Column>,
        rows: Vec<Vec<String>>,
    },
}

/// Rule being filled in by the rule editor.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    pub kind: RuleKind,
    pub expression: String,
    parameters: Vec<Value>,
    result: DraftResult,
}

impl RuleDraft {
    pub fn new(kind: RuleKind, expression: impl Into<String>) -> Self {
        Self {
            kind,
            expression: expression.into(),
            parameters: vec![],
            result: DraftResult::Undefined,
        }
    }

    pub fn query(expression: impl Into<String>) -> Self {
        Self::new(RuleKind::Query, expression)
    }

    pub fn update(expression: impl Into<String>) -> Self {
        Self::new(RuleKind::Update, expression)
    }

    /// Adds the constraint for the next parameter position. Blank text is
    /// refused like any other malformed value.
    pub fn push_parameter(
        &mut self,
        value_type: ValueType,
        raw: impl Into<String>,
    ) -> Result<&mut Self, RuleError> {
        let raw = raw.into();
        if value_type == ValueType::Text && raw.trim().is_empty() {
            return Err(RuleError::InvalidValue {
                expected: value_type,
                raw,
            });
        }
        self.parameters.push(Value::new(value_type, raw)?);
        Ok(self)
    }

    /// Removes a constraint; later constraints move one position down.
    pub fn remove_parameter(&mut self, position: usize) -> Option<Value> {
        (position < self.parameters.len()).then(|| self.parameters.remove(position))
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub fn raise_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.result = DraftResult::Error(message.into());
        self
    }

    pub fn update_count(&mut self, count: u64) -> &mut Self {
        self.result = DraftResult::UpdateCount(count);
        self
    }

    /// Starts a result set; rows added before are discarded.
    pub fn columns(&mut self, columns: Vec<Column>) -> Result<&mut Self, RuleError> {
        if let Some(position) = columns.iter().position(|c| c.name.trim().is_empty()) {
            return Err(RuleError::EmptyColumnName(position + 1));
        }
        self.result = DraftResult::RowSet {
            columns,
            rows: vec![],
        };
        Ok(self)
    }

    pub fn push_row(&mut self, cells: Vec<String>) -> Result<&mut Self, RuleError> {
        let kind = self.kind;
        let DraftResult::RowSet { columns, rows } = &mut self.result else {
            return Err(RuleError::KindMismatch {
                kind,
                result: "rows without columns",
            });
        };
        // Validates the single row against the schema before keeping it.
        RowSet::new(columns.clone(), vec![cells.clone()]).map_err(|error| match error {
            RuleError::RowWidth {
                found, expected, ..
            } => RuleError::RowWidth {
                row: rows.len(),
                found,
                expected,
            },
            RuleError::InvalidCell {
                column,
                raw,
                expected,
                ..
            } => RuleError::InvalidCell {
                row: rows.len(),
                column,
                raw,
                expected,
            },
            other => other,
        })?;
        rows.push(cells);
        Ok(self)
    }

    pub fn remove_row(&mut self, index: usize) -> Option<Vec<String>> {
        match &mut self.result {
            DraftResult::RowSet { rows, .. } if index < rows.len() => Some(rows.remove(index)),
            _ => None,
        }
    }

    pub fn result(&self) -> &DraftResult {
        &self.result
    }

    pub fn build(&self) -> Result<Rule, RuleError> {
        let pattern = Pattern::new(self.expression.clone(), self.parameters.clone())?;
        let result = match &self.result {
            DraftResult::Undefined => return Err(RuleError::MissingResult),
            DraftResult::Error(message) if message.trim().is_empty() => {
                return Err(RuleError::EmptyErrorMessage);
            }
            DraftResult::Error(message) => RuleResult::error(message.clone()),
            DraftResult::UpdateCount(count) => RuleResult::update_count(*count),
            DraftResult::RowSet { rows, .. } if rows.is_empty() => return Err(RuleError::NoRows),
            DraftResult::RowSet { columns, rows } => {
                RuleResult::RowSet(RowSet::new(columns.clone(), rows.clone())?)
            }
        };
        Rule::new(self.kind, pattern, result)
    }
}

/// Rule set of one editing session and the editor's list mode.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    rules: RuleSet,
    mode: ClickMode,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules,
            mode: ClickMode::default(),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn into_rules(self) -> RuleSet {
        self.rules
    }

    pub fn mode(&self) -> ClickMode {
        self.mode
    }

    pub fn toggle_move_mode(&mut self) -> ClickMode {
        self.mode = match self.mode {
            ClickMode::Remove => ClickMode::Move,
            ClickMode::Move => ClickMode::Remove,
        };
        self.mode
    }

    /// Validates the draft and appends it, returning its position.
    pub fn add(&mut self, draft: &RuleDraft) -> Result<usize, RuleError> {
        let rule = draft.build()?;
        self.rules.append(rule);
        debug!(index = self.rules.len() - 1, "rule added");
        Ok(self.rules.len() - 1)
    }

    /// A click on a rule: removes it in [`ClickMode::Remove`], nothing in
    /// [`ClickMode::Move`] where the arrows do the work.
    pub fn activate(&mut self, index: usize) -> Result<Option<Rule>, RuleSetError> {
        match self.mode {
            ClickMode::Remove => self.remove(index).map(Some),
            ClickMode::Move => Ok(None),
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<Rule, RuleSetError> {
        self.rules.remove(index)
    }

    pub fn move_up(&mut self, index: usize) -> Result<(), RuleSetError> {
        self.rules.move_up(index)
    }

    pub fn move_down(&mut self, index: usize) -> Result<(), RuleSetError> {
        self.rules.move_down(index)
    }

    pub fn can_move_up(&self, index: usize) -> bool {
        index > 0 && index < self.rules.len()
    }

    pub fn can_move_down(&self, index: usize) -> bool {
        index + 1 < self.rules.len()
    }

    /// Result list shown beside the rules, derived on every call.
    pub fn previews(&self) -> Preview {
        preview::render(&self.rules)
    }
}
