use anyhow::Context;
use clap::Parser;
use nu_ansi_term::Color;
use rxrename_core::{should_use_color, Config, RenameError};
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;
mod rename;

use cli::Cli;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color_choice = cli.no_color.then_some(false);
    let colors = rename::Colors {
        stdout: should_use_color(color_choice, &io::stdout()),
        stderr: should_use_color(color_choice, &io::stderr()),
    };

    // Handle -C directory flag
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change to directory: {}", dir.display()))
            .unwrap_or_else(|e| {
                eprintln!("Error: {e:#}");
                process::exit(2);
            });
    }

    let config = match cli.config {
        Some(ref path) => Config::load_from_path(path).unwrap_or_else(|e| {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }),
        None => Config::default(),
    };

    match rename::handle_rename(&cli, &config, colors) {
        Ok(()) => process::exit(0),
        Err(e) => {
            if colors.stderr {
                eprintln!("{} {e:#}", Color::Red.bold().paint("Error:"));
            } else {
                eprintln!("Error: {e:#}");
            }
            process::exit(exit_code(&e));
        },
    }
}

/// `--verbose` turns on debug output for our crates; `RUST_LOG` takes precedence.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("rxrename={default_level},rxrename_core={default_level}").into()
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// 1 for conflicts, 2 for invalid input, 3 for failures while renaming.
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RenameError>() {
        Some(e) if e.is_conflict() => 1,
        Some(e) if e.is_partial() => 3,
        Some(_) => 2,
        None => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&RenameError::NothingToDo.into()), 1);
        assert_eq!(exit_code(&RenameError::MissingPattern.into()), 2);
        let failed = RenameError::CreateDirectory {
            directory: "out".into(),
            error: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(exit_code(&failed.into()), 3);
        assert_eq!(
            exit_code(&anyhow::Error::from(RenameError::MissingTemplate).context("loading")),
            2
        );
    }
}
