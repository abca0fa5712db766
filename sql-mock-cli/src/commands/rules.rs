use clap::Subcommand;
use sql_mock_core::{Column, EditorSession, RuleDraft, RuleKind, Value};
use tracing::info;

use crate::{
    config::get_config,
    utils::{load_rules, parse_column, parse_param, parse_row, store_rules},
};

#[derive(clap::Args)]
#[command(about = "Edit the rule set", long_about = None)]
pub struct Rules {
    #[command(subcommand)]
    action: RuleAction,
}

#[derive(Subcommand)]
enum RuleAction {
    /// Append a rule after the existing ones.
    Add(AddRule),
    /// Remove the rule at a 1-based position.
    Remove { position: usize },
    /// Swap a rule with the one before it.
    MoveUp { position: usize },
    /// Swap a rule with the one after it.
    MoveDown { position: usize },
}

#[derive(clap::Args)]
#[command(group(
    clap::ArgGroup::new("result")
        .required(true)
        .args(["error", "update_count", "columns"]),
))]
struct AddRule {
    #[arg(long, help = "Update rule instead of a query rule")]
    update: bool,
    #[arg(long, help = "Regular expression the whole statement must match")]
    pattern: String,
    #[arg(long = "param", value_parser = parse_param, help = "Expected parameter as type:value")]
    params: Vec<Value>,
    #[arg(long, help = "Fail the statement with this message")]
    error: Option<String>,
    #[arg(long, help = "Affected row count of an update")]
    update_count: Option<u64>,
    #[arg(long = "column", value_parser = parse_column, help = "Result column as name:type")]
    columns: Vec<Column>,
    #[arg(long = "row", requires = "columns", help = "Comma separated result row")]
    rows: Vec<String>,
}

impl AddRule {
    fn draft(self) -> anyhow::Result<RuleDraft> {
        let kind = match self.update {
            true => RuleKind::Update,
            false => RuleKind::Query,
        };
        let mut draft = RuleDraft::new(kind, self.pattern);
        for param in self.params {
            draft.push_parameter(param.value_type(), param.raw())?;
        }
        if let Some(message) = self.error {
            draft.raise_error(message);
        }
        if let Some(count) = self.update_count {
            draft.update_count(count);
        }
        if !self.columns.is_empty() {
            draft.columns(self.columns)?;
            for row in &self.rows {
                draft.push_row(parse_row(row))?;
            }
        }
        Ok(draft)
    }
}

/// 1-based position shown to the user to an index.
fn index(position: usize) -> anyhow::Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("rule positions start at 1"))
}

impl Rules {
    pub fn edit(self) -> anyhow::Result<()> {
        super::init_standard()?;
        let config = get_config()?;
        let mut session = EditorSession::with_rules(load_rules(&config.rules)?);

        match self.action {
            RuleAction::Add(rule) => {
                let index = session.add(&rule.draft()?)?;
                info!("rule #{} added", index + 1);
            }
            RuleAction::Remove { position } => {
                session.remove(index(position)?)?;
            }
            RuleAction::MoveUp { position } => session.move_up(index(position)?)?,
            RuleAction::MoveDown { position } => session.move_down(index(position)?)?,
        }

        store_rules(&config.rules, session.rules())?;
        print!("{}", session.previews());
        Ok(())
    }
}
