#[deny(clippy::unwrap_used)]
mod commands;
mod config;
mod utils;

use clap::*;
use commands::{Execute, Generate, Initialize, Preview, Rules};

#[derive(Parser)]
#[command(name = "sql-mock", bin_name = "sql-mock")]
enum Command {
    Init(Initialize),
    Generate(Generate),
    Preview(Preview),
    Execute(Execute),
    Rules(Rules),
}

fn main() -> anyhow::Result<()> {
    let command = Command::parse();
    match command {
        Command::Init(args) => args.init(),
        Command::Generate(args) => args.generate(),
        Command::Preview(args) => args.preview(),
        Command::Execute(args) => args.execute(),
        Command::Rules(args) => args.edit(),
    }
}
