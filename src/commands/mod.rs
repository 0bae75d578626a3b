//! CLI command handlers and routing.

mod auth;
mod get;
mod sizes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use setget_core::{ApiCredentials, FlickrClient};

use crate::ProcessExit;
use crate::cli::{Cli, Command};
use crate::settings::{Settings, default_settings_path};

pub use auth::run_auth_command;
pub use get::run_get_command;
pub use sizes::run_sizes_command;

/// Overrides the REST endpoint; used to point the CLI at a local server.
const API_URL_ENV: &str = "SETGET_API_URL";

/// Runs the selected command and maps its result to an exit outcome.
pub(crate) async fn dispatch(cli: Cli) -> Result<ProcessExit> {
    match cli.command {
        Command::Get(args) => {
            let (stored, _) = load_settings(cli.settings)?;
            let settings = stored.overridden_by(&Settings::from_env());
            run_get_command(&args, &settings, cli.quiet).await
        }
        Command::Auth(args) => {
            let (stored, path) = load_settings(cli.settings)?;
            run_auth_command(&args, stored, &Settings::from_env(), &path).await?;
            Ok(ProcessExit::Success)
        }
        Command::Sizes => {
            run_sizes_command();
            Ok(ProcessExit::Success)
        }
    }
}

/// Loads the settings file as written; environment overrides are layered by the caller.
fn load_settings(explicit: Option<PathBuf>) -> Result<(Settings, PathBuf)> {
    let path = explicit
        .or_else(default_settings_path)
        .context("Cannot locate the settings file: neither XDG_CONFIG_HOME nor HOME is set\n  Suggestion: pass --settings <PATH>")?;
    let settings = Settings::load(&path)?;
    Ok((settings, path))
}

pub(crate) fn flickr_client(credentials: ApiCredentials) -> Result<FlickrClient> {
    let client = match std::env::var(API_URL_ENV) {
        Ok(base_url) if !base_url.trim().is_empty() => {
            FlickrClient::with_base_url(credentials, base_url.trim())?
        }
        _ => FlickrClient::new(credentials)?,
    };
    Ok(client)
}
