use sql_mock_core::preview;

use crate::{config::get_config, utils::load_rules};

#[derive(clap::Args)]
#[command(about = "Show what every rule returns", long_about = None)]
pub struct Preview {
    #[arg(long, help = "Print the preview as JSON")]
    json: bool,
}

impl Preview {
    pub fn preview(self) -> anyhow::Result<()> {
        super::init_standard()?;
        let config = get_config()?;
        let rules = load_rules(&config.rules)?;
        let preview = preview::render(&rules);
        match self.json {
            true => println!("{}", serde_json::to_string_pretty(&preview)?),
            false if preview.0.is_empty() => eprintln!("No rules defined."),
            false => print!("{preview}"),
        }
        Ok(())
    }
}
