use sql_mock_core::{Execution, Outcome, RuleKind, Value, resolve};

use crate::{
    config::get_config,
    utils::{load_rules, parse_param},
};

#[derive(Clone, Copy, clap::ValueEnum)]
enum Kind {
    Query,
    Update,
}

#[derive(clap::Args)]
#[command(about = "Resolve a statement against the rule set", long_about = None)]
pub struct Execute {
    #[arg(long, value_enum)]
    kind: Kind,
    #[arg(long)]
    statement: String,
    #[arg(long = "param", value_parser = parse_param, help = "Bound parameter as type:value")]
    params: Vec<Value>,
    #[arg(long, help = "Show debug information")]
    debug: bool,
}

impl Execute {
    pub fn execute(self) -> anyhow::Result<()> {
        super::init_logging(self.debug)?;
        let config = get_config()?;
        let rules = load_rules(&config.rules)?;
        let kind = match self.kind {
            Kind::Query => RuleKind::Query,
            Kind::Update => RuleKind::Update,
        };
        let execution = Execution {
            statement: self.statement,
            kind,
            parameters: self.params,
        };
        let outcome = resolve(&rules, &execution);
        println!("{outcome}");
        if let Outcome::Matched { result, .. } = outcome {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        Ok(())
    }
}
