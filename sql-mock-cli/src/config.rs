use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sql_mock_core::{
    ErrorStyle, GeneratorConfig, Target,
    codegen::{DEFAULT_HANDLER_ID, DEFAULT_MAX_ARITY},
};

pub const CONFIG_FILE: &str = "sql-mock.toml";
const CONFIG_ENV: &str = "SQL_MOCK_CONFIG";

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CodeGenOptions {
    Java,
    Scala,
    Json,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GeneratorOptions {
    pub max_arity: Option<usize>,
    pub handler_id: Option<String>,
    pub error_style: Option<ErrorStyle>,
}

impl GeneratorOptions {
    pub fn into_config(self) -> GeneratorConfig {
        GeneratorConfig {
            max_arity: self.max_arity.unwrap_or(DEFAULT_MAX_ARITY),
            handler_id: self
                .handler_id
                .unwrap_or_else(|| DEFAULT_HANDLER_ID.to_string()),
            error_style: self.error_style.unwrap_or_default(),
        }
    }
}

/// Where each generated handler is written; stdout when unset.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct OutputOptions {
    pub java: Option<PathBuf>,
    pub scala: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[must_use]
pub struct SqlMockOptions {
    pub rules: PathBuf,
    #[serde(default)]
    pub generator: GeneratorOptions,
    #[serde(default)]
    pub output: OutputOptions,
}

impl SqlMockOptions {
    pub fn into_config(self) -> SqlMockConfig {
        SqlMockConfig {
            rules: self.rules,
            generator: self.generator.into_config(),
            output: self.output,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlMockConfig {
    pub rules: PathBuf,
    pub generator: GeneratorConfig,
    pub output: OutputOptions,
}

impl SqlMockConfig {
    pub fn output(&self, mode: CodeGenOptions) -> Option<&Path> {
        match mode {
            CodeGenOptions::Java => self.output.java.as_deref(),
            CodeGenOptions::Scala => self.output.scala.as_deref(),
            CodeGenOptions::Json => self.output.json.as_deref(),
        }
    }
}

impl CodeGenOptions {
    pub fn target(self) -> Option<Target> {
        match self {
            CodeGenOptions::Java => Some(Target::Java),
            CodeGenOptions::Scala => Some(Target::Scala),
            CodeGenOptions::Json => None,
        }
    }
}

/// Config file path, `SQL_MOCK_CONFIG` from the environment or `.env` first.
pub fn config_path() -> PathBuf {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

pub fn parse_config(text: &str) -> anyhow::Result<SqlMockConfig> {
    let options: SqlMockOptions = toml::from_str(text)?;
    Ok(options.into_config())
}

pub fn get_config() -> anyhow::Result<SqlMockConfig> {
    let path = config_path();
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}, run `sql-mock init` first", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config in {}", path.display()))
}
