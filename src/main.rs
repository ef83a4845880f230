//! Binary entry point: resolve where the library lives, bring up logging,
//! load the collection, then either run one subcommand or the terminal UI.
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use personal_library_manager::cli::Cli;
use personal_library_manager::commands;
use personal_library_manager::config::Settings;
use personal_library_manager::{logging, run_app, App, LibraryStore};

/// Returning a `Result` bubbles fatal start-up problems (an unreadable
/// library file, a home directory that cannot be found) to the terminal
/// instead of opening the UI on an empty library.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.file)?;
    settings.ensure_dirs()?;
    logging::init(&settings.log_path)?;
    info!(library = %settings.library_path.display(), "starting");

    let store = LibraryStore::new(&settings.library_path);
    let outcome = store.load().context("failed to load library")?;

    match cli.command {
        Some(command) => {
            if let Some(recovery) = &outcome.recovery {
                eprintln!("warning: {}", recovery.message());
            }
            let output = commands::execute(command, &store, &outcome.books)?;
            println!("{output}");
            Ok(())
        }
        None => {
            let mut app = App::new(store, outcome);
            let result = run_app(&mut app);
            if let Err(err) = &result {
                warn!(error = %format!("{err:#}"), "terminal UI stopped with an error");
            }
            result
        }
    }
}
