mod execute;
mod generate;
mod init;
mod preview;
mod rules;

pub use execute::Execute;
pub use generate::Generate;
pub use init::Initialize;
pub use preview::Preview;
pub use rules::Rules;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn init_standard() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn init_debug() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    match debug {
        true => init_debug(),
        false => init_standard(),
    }
}
