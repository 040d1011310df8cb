mod bootstrap;
mod commands;

use anyhow::Result;
use practice_core::settings::{Command, Settings};
use tracing::{debug, error};

use bootstrap::{ensure_directories, setup_logging};

fn main() -> Result<()> {
    let settings = Settings::load();

    ensure_directories(&settings.data_dir())?;
    setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    debug!("Data directory: {}", settings.data_dir().display());

    let result = match &settings.command {
        Command::Convert(args) => {
            commands::run_convert(&settings, args, chrono::Local::now().date_naive())
        }
        Command::Report(args) => commands::run_report(&settings, args).map(|_| ()),
    };

    if let Err(e) = &result {
        error!("{e:#}");
    }
    result
}
