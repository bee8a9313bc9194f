//! xcsh - interactive administration shell
//!
//! Navigate domains and actions with context-aware tab completion.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode against canned API responses
//! xcsh --namespace shop --fixture responses.json
//! ```

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use xcsh::cli::CliInterface;
use xcsh::error::Result;
use xcsh::registry::ResourceRegistry;
use xcsh::repl::completion::{ApiCandidateProvider, CompletionEngine};
use xcsh::repl::{LineOutcome, ReplEngine, SessionState};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or start the interactive shell
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.print_banner();

    run_interactive_mode(&cli)
}

/// Run application in interactive REPL mode
fn run_interactive_mode(cli: &CliInterface) -> Result<()> {
    let config = cli.config();

    let session = SessionState::new(config.session.default_namespace.clone());
    session.set_color_enabled(config.session.color_output);

    let provider = Arc::new(ApiCandidateProvider::new(
        cli.api_client()?,
        ResourceRegistry::builtin(),
        config.cache_ttl(),
    ));
    let engine = Arc::new(CompletionEngine::new(provider, session));
    let mut repl = ReplEngine::new(engine, config)?;

    run_repl_loop(&mut repl)?;

    println!("Goodbye!");
    Ok(())
}

/// Main REPL loop
fn run_repl_loop(repl: &mut ReplEngine) -> Result<()> {
    while repl.is_running() {
        let input = match repl.read_line()? {
            Some(line) if !line.trim().is_empty() => line,
            Some(_) => continue,
            None => break,
        };

        match repl.process_input(&input) {
            Ok(LineOutcome::Output(message)) => println!("{}", message),
            Ok(LineOutcome::Command(path)) => println!("would run: {}", path.join(" ")),
            Ok(_) => {}
            Err(e) => eprintln!("{}", e),
        }
    }

    Ok(())
}

/// Initialize logging system based on verbosity level
///
/// `XCSH_LOG` (e.g. `xcsh::repl=debug`) refines the level from config and
/// flags. Logs go to stderr so they never interleave with completion menus on
/// stdout.
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .with_env_var("XCSH_LOG")
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
