use crate::{
    codegen::{CodeGen, CodeGenError},
    rule_set::RuleSet,
};

/// Emits the rule set itself, for an execution surface that evaluates it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodeGen;

impl CodeGen for JsonCodeGen {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, rules: &RuleSet) -> Result<String, CodeGenError> {
        Ok(serde_json::to_string_pretty(rules)?)
    }
}
