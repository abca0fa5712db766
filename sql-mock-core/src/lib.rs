pub mod codegen;
pub mod matcher;
pub mod preview;
pub mod rule;
pub mod rule_set;
pub mod session;
pub mod types;

pub use codegen::{
    CodeGen, CodeGenError, ErrorStyle, GeneratorConfig, java::JavaCodeGen, json::JsonCodeGen,
    scala::ScalaCodeGen,
};
pub use matcher::{Execution, Outcome, resolve};
pub use rule::{Column, Pattern, RowSet, Rule, RuleError, RuleKind, RuleResult};
pub use rule_set::{RuleSet, RuleSetError};
pub use session::{EditorSession, RuleDraft};
pub use types::{Target, Value, ValueType};

/// Generator for `target` with the given settings.
pub fn code_generator(target: Target, config: GeneratorConfig) -> Box<dyn CodeGen> {
    match target {
        Target::Java => Box::new(JavaCodeGen::new(config)),
        Target::Scala => Box::new(ScalaCodeGen::new(config)),
    }
}
