use anyhow::Context;
use sql_mock_core::{CodeGen, JsonCodeGen, code_generator};
use tracing::{error, info};

use crate::{
    config::{CodeGenOptions, SqlMockConfig, get_config},
    utils::load_rules,
};

#[derive(clap::Args)]
#[command(about = "Generate mock handlers from the rule set", long_about = None)]
pub struct Generate {
    #[arg(long, value_enum, help = "Only generate this target")]
    target: Option<CodeGenOptions>,
    #[arg(long, help = "Show debug information")]
    debug: bool,
}

impl Generate {
    pub fn generate(self) -> anyhow::Result<()> {
        super::init_logging(self.debug)?;
        let config = get_config()?;
        let rules = load_rules(&config.rules)?;

        let modes = match self.target {
            Some(mode) => vec![mode],
            None => vec![CodeGenOptions::Java, CodeGenOptions::Scala],
        };
        let mut failed = 0;
        for mode in modes {
            // One target failing leaves the others untouched.
            if let Err(err) = write_target(&config, mode, &rules) {
                error!("{mode:?} generation failed: {err:#}");
                failed += 1;
            }
        }
        match failed {
            0 => Ok(()),
            n => anyhow::bail!("{n} target(s) failed"),
        }
    }
}

fn write_target(
    config: &SqlMockConfig,
    mode: CodeGenOptions,
    rules: &sql_mock_core::RuleSet,
) -> anyhow::Result<()> {
    let codegen: Box<dyn CodeGen> = match mode.target() {
        Some(target) => code_generator(target, config.generator.clone()),
        None => Box::new(JsonCodeGen),
    };
    let code = codegen.generate(rules)?;
    match config.output(mode) {
        Some(path) => {
            std::fs::write(path, code)
                .with_context(|| format!("cannot write {}", path.display()))?;
            info!("{} handler written to {}", codegen.name(), path.display());
        }
        None => print!("{code}"),
    }
    Ok(())
}
