use std::{cmp, fmt};

use serde::Serialize;

use crate::{
    rule::{Rule, RuleKind, RuleResult},
    rule_set::RuleSet,
};

/// Display-ready summary of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulePreview {
    pub kind: RuleKind,
    pub pattern_summary: String,
    /// `(type, value)` per positional constraint.
    pub constraint_table: Vec<(String, String)>,
    pub result_summary: String,
    pub row_table: Option<RowTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Previews of a whole rule set, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Preview(pub Vec<RulePreview>);

pub fn render(rules: &RuleSet) -> Preview {
    Preview(rules.iter().map(preview_rule).collect())
}

pub fn preview_rule(rule: &Rule) -> RulePreview {
    let pattern = rule.pattern();
    let constraint_table = pattern
        .parameters()
        .iter()
        .map(|value| (value.value_type().to_string(), value.raw().to_string()))
        .collect();
    let row_table = match rule.result() {
        RuleResult::RowSet(row_set) => Some(RowTable {
            headers: row_set
                .schema()
                .iter()
                .map(|column| format!("{} ({})", column.name, column.column_type))
                .collect(),
            rows: row_set.rows().to_vec(),
        }),
        _ => None,
    };
    RulePreview {
        kind: rule.kind(),
        pattern_summary: format!("{} = {}", rule.kind(), pattern.expression()),
        constraint_table,
        result_summary: summarize_result(rule.result()),
        row_table,
    }
}

pub fn summarize_result(result: &RuleResult) -> String {
    match result {
        RuleResult::Error { message } => format!("Error = {message}"),
        RuleResult::UpdateCount { count } => match count {
            1 => "1 updated row".to_string(),
            count => format!("{count} updated rows"),
        },
        RuleResult::RowSet(row_set) => {
            let types = row_set
                .schema()
                .iter()
                .map(|column| column.column_type.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("Result set = {} x ({types})", row_set.rows().len())
        }
    }
}

fn write_table(
    f: &mut fmt::Formatter<'_>,
    headers: &[String],
    rows: &[Vec<String>],
) -> fmt::Result {
    let mut lengths = headers.iter().map(String::len).collect::<Vec<_>>();
    for row in rows {
        for (length, cell) in lengths.iter_mut().zip(row) {
            *length = cmp::max(*length, cell.len());
        }
    }
    let pad = |cells: &[String]| {
        cells
            .iter()
            .zip(&lengths)
            .map(|(cell, len)| format!("{cell}{}", " ".repeat(len - cell.len())))
            .collect::<Vec<_>>()
            .join("  |  ")
    };
    writeln!(f, "    {}", pad(headers).trim_end())?;
    for row in rows {
        writeln!(f, "    {}", pad(row).trim_end())?;
    }
    Ok(())
}

impl fmt::Display for RulePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.pattern_summary)?;
        if self.constraint_table.is_empty() {
            writeln!(f, "  No parameter constraint")?;
        } else {
            writeln!(f, "  Parameter constraints")?;
            let headers = ["Type".to_string(), "Value".to_string()];
            let rows = self
                .constraint_table
                .iter()
                .map(|(value_type, value)| vec![value_type.clone(), value.clone()])
                .collect::<Vec<_>>();
            write_table(f, &headers, &rows)?;
        }
        writeln!(f, "  {}", self.result_summary)?;
        if let Some(table) = &self.row_table {
            write_table(f, &table.headers, &table.rows)?;
        }
        Ok(())
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, rule) in self.0.iter().enumerate() {
            write!(f, "#{} {rule}", index + 1)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
