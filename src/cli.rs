use crate::cancel::CancelSlot;
use crate::client::Client;
use crate::config::Config;
use crate::form::LookupForm;
use crate::logging::{setup_logging, LogLevel};
use crate::render::{render, render_json};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Text};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn default(path: &Path) -> String {
    format!("[default: {}]", path.as_os_str().to_string_lossy())
}

/// Indian postal pincode lookup
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long = "config", value_name = "FILE", help = default(&Config::default_path()))]
    pub config_path: Option<PathBuf>,

    /// [default: warn]
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Base URL of the lookup API (overrides config)
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prompt for a pincode, then filter the results by name (the default)
    Interactive,
    /// Look up one pincode and print the post offices
    Lookup {
        pincode: String,
        /// Only show post offices whose name contains this
        #[arg(short, long)]
        filter: Option<String>,
        /// Print JSON instead of a table
        #[arg(short, long)]
        json: bool,
    },
    /// Write the effective configuration to the config file
    WriteConfig,
}

pub fn cli() -> Result<()> {
    let args = Cli::parse();

    let config = Config::from_cli(&args)?;
    let _guard = setup_logging(&config.main.logging, config.log_dir());
    debug!("Command line arguments: {:#?}", &args);
    debug!("Config: {:#?}", &config);

    let slot = CancelSlot::new();
    let handler_slot = slot.clone();
    ctrlc::set_handler(move || {
        if handler_slot.cancel_current() {
            warn!("Interrupted, cancelling lookup");
        } else {
            std::process::exit(130);
        }
    })?;

    match &args.command {
        Some(Commands::Interactive) | None => interactive(&config, slot)?,
        Some(Commands::Lookup {
            pincode,
            filter,
            json,
        }) => lookup(&config, slot, pincode, filter.as_deref(), *json)?,
        Some(Commands::WriteConfig) => config.write_config_file()?,
    }
    Ok(())
}

/// `None` when the user dismissed the prompt.
fn prompt(message: &str) -> Result<Option<String>> {
    match Text::new(message).prompt() {
        Ok(input) => Ok(Some(input)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn show(output: String) {
    if !output.is_empty() {
        println!("{output}");
    }
}

fn interactive(config: &Config, slot: CancelSlot) -> Result<()> {
    let mut form = LookupForm::with_slot(Client::new(&config.main.lookup), slot);

    // The pincode prompt is only offered until a lookup succeeds
    while form.state().form_visible() {
        let Some(input) = prompt("Enter Pincode")? else {
            return Ok(());
        };
        form.submit_with(&input, |state| show(render(state)));
    }

    info!("{}", form.state().found_message());
    while let Some(term) = prompt("Filter by Post Office Name")? {
        show(render(form.filter(&term)));
    }
    Ok(())
}

fn lookup(
    config: &Config,
    slot: CancelSlot,
    pincode: &str,
    filter: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut form = LookupForm::with_slot(Client::new(&config.main.lookup), slot);
    let state = form.submit(pincode);
    if let Some(error) = state.error_message() {
        return Err(anyhow!("{error}"));
    }
    if !state.filter_visible() {
        return Err(anyhow!("Lookup of {pincode} was cancelled"));
    }

    let state = match filter {
        Some(term) => form.filter(term),
        None => form.state(),
    };
    if json {
        println!("{}", render_json(state.visible_records())?);
    } else {
        show(render(state));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_lookup_arguments() {
        let args = Cli::try_parse_from([
            "pin-buddy",
            "--api-base",
            "http://localhost/pincode",
            "lookup",
            "110001",
            "--filter",
            "place",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.api_base.as_deref(), Some("http://localhost/pincode"));
        match args.command {
            Some(Commands::Lookup {
                pincode,
                filter,
                json,
            }) => {
                assert_eq!(pincode, "110001");
                assert_eq!(filter.as_deref(), Some("place"));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_is_interactive() {
        let args = Cli::try_parse_from(["pin-buddy", "-l", "debug"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.log_level, Some(LogLevel::Debug));
    }
}
