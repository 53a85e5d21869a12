pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pipeshell_core::config::LoadOptions;

use crate::commands::CommandResult;

#[derive(Debug, Parser)]
#[command(
    name = "pipeshell",
    about = "Natural-language shell for CRM activities",
    long_about = "Type a request in plain language; pipeshell maps it onto one activity API call, asks for any missing fields, and prints the response.",
    after_help = "Examples:\n  pipeshell\n  pipeshell config\n  pipeshell --config ./pipeshell.toml"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Ask one question and run the matching activity operation (default)")]
    Ask,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

impl Cli {
    /// An explicit `--config` path must exist; only the default locations are optional.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            ..LoadOptions::default()
        }
    }
}

pub fn run() -> ExitCode {
    let result = execute(Cli::parse());

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}

pub fn execute(cli: Cli) -> CommandResult {
    let options = cli.load_options();
    match cli.command.unwrap_or(Command::Ask) {
        Command::Ask => commands::ask::run(options),
        Command::Config => commands::config::run(options),
    }
}
