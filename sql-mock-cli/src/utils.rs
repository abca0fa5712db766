use std::path::Path;

use anyhow::{Context, anyhow, bail};
use sql_mock_core::{Column, RuleSet, Value, ValueType};
use tracing::info;

/// Rule set stored at `path`; a missing file is an empty set.
pub fn load_rules(path: &Path) -> anyhow::Result<RuleSet> {
    if !std::fs::exists(path)? {
        info!("{} does not exist yet, starting with no rules", path.display());
        return Ok(RuleSet::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read rules from {}", path.display()))?;
    RuleSet::from_json(&json).with_context(|| format!("invalid rules in {}", path.display()))
}

pub fn store_rules(path: &Path, rules: &RuleSet) -> anyhow::Result<()> {
    let json = rules.to_json()?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("cannot write rules to {}", path.display()))
}

fn value_type(tag: &str) -> anyhow::Result<ValueType> {
    ValueType::from_tag(tag).ok_or_else(|| {
        let known = ValueType::ALL.map(ValueType::tag).join(", ");
        anyhow!("unknown type `{tag}`, expected one of {known}")
    })
}

/// `type:value`, e.g. `string:abc`, `float:1.5` or `date:2014-03-09`.
pub fn parse_param(arg: &str) -> anyhow::Result<Value> {
    let Some((tag, raw)) = arg.split_once(':') else {
        bail!("parameter `{arg}` is not in the form type:value");
    };
    Ok(Value::new(value_type(tag)?, raw)?)
}

/// `name:type`, e.g. `id:float`.
pub fn parse_column(arg: &str) -> anyhow::Result<Column> {
    let Some((name, tag)) = arg.rsplit_once(':') else {
        bail!("column `{arg}` is not in the form name:type");
    };
    Ok(Column::new(name, value_type(tag)?))
}

/// Comma separated cells of one row. No quoting, a cell cannot hold a comma.
pub fn parse_row(arg: &str) -> Vec<String> {
    arg.split(',').map(|cell| cell.trim().to_string()).collect()
}
