use anyhow::Result;
use clap::Parser;
use savewatch::commands::{self, Cli, Commands};
use savewatch::{config, sysexits};
use std::process;

/// Entry point for the savewatch CLI application.
/// Parses command-line arguments and dispatches to the appropriate command handler.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let commands = match cli.commands {
        Some(commands) => commands,
        None => {
            eprintln!("sw requires at least one command to execute. See 'sw --help' for usage.");
            process::exit(sysexits::EX_KEYWORD);
        }
    };
    let config_path = cli.config.unwrap_or_else(config::config_file);

    match commands {
        Commands::Watch => commands::watch(&config_path)?,
        Commands::Backup { auto } => commands::backup(&config_path, auto)?,
        Commands::List => commands::list(&config_path)?,
        Commands::Config { reset } => commands::show_config(&config_path, reset)?,
        Commands::Open => commands::open(&config_path)?,
    }
    Ok(())
}
