//! `colab-badge` -- keep "Open in Colab" badges at the top of notebooks.
//!
//! Parses CLI arguments with clap, resolves the runtime context (config file,
//! repository root), and dispatches to the command handlers.

mod cli;
mod commands;
mod context;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use colab_badge_core::io::ProcessMode;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Set by the first Ctrl+C; checked between notebooks.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Returns `true` once the user has asked the run to stop.
pub(crate) fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

fn main() {
    // First Ctrl+C: finish the current notebook, then stop. Second: force exit.
    let _ = ctrlc::set_handler(|| {
        if INTERRUPTED.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
    });

    let cli = Cli::parse();

    init_logging(cli.global.verbose);

    let result = RuntimeContext::from_global_args(&cli.global).and_then(|ctx| match &cli.command {
        Some(Commands::Check(args)) => commands::update::run(&ctx, args, ProcessMode::Check),
        Some(Commands::Version) => commands::version::run(&ctx),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, args),
        None => commands::update::run(&ctx, &cli.update, ProcessMode::Write),
    });

    // Handle errors: print message and exit with code 1
    if let Err(e) = result {
        if cli.global.json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// Install the stderr tracing subscriber.
///
/// `-v` turns on debug output for this tool's crates; otherwise `RUST_LOG`
/// is honored and the fallback is warnings only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("colab_badge=debug,colab_badge_core=debug,colab_badge_config=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
