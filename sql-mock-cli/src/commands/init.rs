use std::path::PathBuf;

use sql_mock_core::ErrorStyle;

use crate::config::{CONFIG_FILE, GeneratorOptions, OutputOptions, SqlMockOptions};

#[derive(clap::Args)]
#[command(about = "Write a starter sql-mock.toml", long_about = None, name = "init")]
pub struct Initialize {}

impl Initialize {
    pub fn init(self) -> anyhow::Result<()> {
        let exists = std::fs::exists(CONFIG_FILE)?;
        if exists {
            eprintln!("{CONFIG_FILE} already exists.\nExiting...");
            return Ok(());
        }

        let options = SqlMockOptions {
            rules: PathBuf::from("rules.json"),
            generator: GeneratorOptions {
                max_arity: Some(sql_mock_core::codegen::DEFAULT_MAX_ARITY),
                handler_id: Some(sql_mock_core::codegen::DEFAULT_HANDLER_ID.to_string()),
                error_style: Some(ErrorStyle::Raise),
            },
            output: OutputOptions {
                java: Some("<path/to/Handler.java>".into()),
                scala: Some("<path/to/Handler.scala>".into()),
                json: None,
            },
        };
        let toml = toml::to_string_pretty(&options)?;
        std::fs::write(CONFIG_FILE, toml)?;
        eprintln!("Written config to {CONFIG_FILE}!");
        Ok(())
    }
}
