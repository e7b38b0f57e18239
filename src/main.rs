// Entrypoint for agave-copy.
// - Reads the environment first so a misconfigured shell fails before any
//   prompt or network call.
// - Returns `anyhow::Result` so every failure ends the run with a message.

use agave_copy::cli::Args;
use agave_copy::config::{self, AgaveEnv, Credentials, StorageTarget};
use agave_copy::ui::{self, ProgressStore};
use agave_copy::{copy_tree, remote_join, remote_root_for, AgaveStore};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(args.verbose)?;

    let env = AgaveEnv::from_env()?;
    let target = StorageTarget::default();

    let username = config::login_name().context("Could not determine your login name")?;
    let password = ui::prompt_password(&username)?;
    let credentials = Credentials { username, password };

    let store = AgaveStore::connect(&env, target, &credentials)
        .context("Failed to connect to Agave")?;

    let local_path = args.directory.as_path();
    let remote_path = remote_root_for(local_path)?;
    info!(
        "Copying {} to {}:{}",
        local_path.display(),
        store.target().system_id,
        remote_join(&store.target().root_path, &remote_path)
    );

    // Per-call debug lines and a redrawing spinner garble each other.
    let bar = if args.verbose {
        ProgressBar::hidden()
    } else {
        ui::spinner("Copying...")?
    };
    let store = ProgressStore::new(store, bar);
    let result = copy_tree(local_path, &store, &remote_path);
    store.bar().finish_and_clear();
    let summary = result.with_context(|| format!("Copy of {} aborted", local_path.display()))?;

    info!(
        "Done: {} directories, {} files, {} skipped",
        summary.directories, summary.files, summary.skipped
    );
    Ok(())
}

fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}
