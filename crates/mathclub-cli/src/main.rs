//! Math Club CLI
//!
//! Interactive console for building a staged math lesson and presenting it
//! to the kids.

mod command;
mod console;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use mathclub_core::{Config, Curriculum, Environment};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use crate::command::Command;
use crate::console::{Console, Flow};

/// Math Club - Lesson Builder
///
/// Generates a staged math lesson from a topic and difficulty, lets the
/// author edit it and attach images, then pages through it with the kids.
#[derive(Parser, Debug)]
#[command(name = "mathclub")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: mathclub.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Where to save the lesson snapshot
    #[arg(short, long, value_name = "FILE")]
    snapshot: Option<String>,

    /// Lesson generator: template or fixed
    #[arg(long, value_name = "NAME")]
    curriculum: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, "Config file");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, checks the environment and runs the console until
/// `quit`, Ctrl-C or end of input.
async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(ref snapshot) = args.snapshot {
        config.snapshot_path.clone_from(snapshot);
    }
    if let Some(ref name) = args.curriculum {
        config.curriculum = Curriculum::from_str_case_insensitive(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown curriculum '{name}'\n\nSuggestion: Use --curriculum template or --curriculum fixed"
            )
        })?;
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    for warning in Environment::from_env().warnings() {
        tracing::warn!(%warning, "Configuration warning");
        println!("Warning: {warning}");
    }

    println!();
    println!("Type 'help' for commands.");

    let mut console = Console::new(&config);
    let mut rl = DefaultEditor::new()?;
    let mut out = std::io::stdout();

    loop {
        let command = match rl.readline("> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match command::parse(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                }
            }
            Err(e) => end_of_input(e)?,
        };

        if console.execute(command, &mut out).await? == Flow::Quit {
            break;
        }
        println!();
    }

    tracing::info!(phase = %console.session().phase(), "Console closed");
    Ok(())
}

/// Maps Ctrl-C and Ctrl-D to `quit`; any other readline error is returned.
fn end_of_input(err: ReadlineError) -> Result<Command, ReadlineError> {
    match err {
        ReadlineError::Interrupted => {
            tracing::debug!("Interrupted");
            Ok(Command::Quit)
        }
        ReadlineError::Eof => {
            tracing::debug!("End of input");
            Ok(Command::Quit)
        }
        other => Err(other),
    }
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Prints the loaded configuration.
fn print_config(config: &Config) {
    println!("Math Club lesson builder");
    println!("  Curriculum: {}", config.curriculum);
    println!("  Restrict difficulty: {}", config.restrict_difficulty);
    println!("  Snapshot: {}", config.snapshot_path);
    println!("  Image directory: {}", config.image_dir);
    println!("  Max image size: {} bytes", config.max_image_size);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_and_eof_quit() {
        assert!(matches!(
            end_of_input(ReadlineError::Interrupted),
            Ok(Command::Quit)
        ));
        assert!(matches!(end_of_input(ReadlineError::Eof), Ok(Command::Quit)));
    }

    #[test]
    fn test_other_readline_errors_propagate() {
        let err = ReadlineError::Io(std::io::Error::other("terminal gone"));
        assert!(matches!(end_of_input(err), Err(ReadlineError::Io(_))));
    }
}
