//! `setget auth`: exchange a mini-token and save the auth token.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use setget_core::{ApiCredentials, AuthFlow, MiniToken};
use tracing::info;

use crate::cli::AuthArgs;
use crate::settings::Settings;

/// Runs the interactive exchange, reading prompts from stdin.
///
/// `stored` is the settings file as written and `env` holds the environment
/// overrides. Overrides are used for the exchange but never saved.
pub async fn run_auth_command(
    args: &AuthArgs,
    stored: Settings,
    env: &Settings,
    settings_path: &Path,
) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_auth_with_io(args, stored, env, settings_path, &mut input, &mut output).await
}

async fn run_auth_with_io<R: BufRead, W: Write>(
    args: &AuthArgs,
    stored: Settings,
    env: &Settings,
    settings_path: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let effective = stored.overridden_by(env);
    let api_key = value_or_prompt(args.api_key.as_deref(), effective.api_key.as_deref(), "API key", input, output)?;
    let secret = value_or_prompt(args.secret.as_deref(), effective.secret.as_deref(), "Secret", input, output)?;
    let auth_url = value_or_prompt(
        args.auth_url.as_deref(),
        effective.auth_url.as_deref(),
        "Authorization URL",
        input,
        output,
    )?;

    let flow = AuthFlow::new(&api_key, &secret, &auth_url)?;
    writeln!(output, "Open this URL, authorize setget, and note the code shown:")?;
    writeln!(output, "  {}", flow.authorization_url())?;

    let raw_token = match args.mini_token.as_deref() {
        Some(token) => token.to_string(),
        None => prompt("Mini-token (ddd-ddd-ddd)", input, output)?,
    };
    let mini_token = MiniToken::parse(&raw_token)?;

    let api = super::flickr_client(ApiCredentials::new(api_key.clone()))?;
    let grant = flow.exchange(&api, &mini_token).await?;

    let mut settings = stored;
    settings.api_key = persisted(args.api_key.is_some(), env.api_key.is_some(), api_key, settings.api_key);
    settings.secret = persisted(args.secret.is_some(), env.secret.is_some(), secret, settings.secret);
    settings.auth_url = Some(auth_url);
    settings.auth_token = Some(grant.auth_token);
    settings
        .save(settings_path)
        .with_context(|| "Authorized, but the token could not be saved")?;

    info!(path = %settings_path.display(), "Saved auth token");
    writeln!(output, "Authenticated as {} ({})", grant.user_name, grant.user_id)?;
    Ok(())
}

/// Chooses what to write back for one credential.
///
/// A flag or prompt answer replaces the stored value; a value taken from the
/// environment leaves the stored one as it was.
fn persisted(from_flag: bool, from_env: bool, in_use: String, stored: Option<String>) -> Option<String> {
    if from_env && !from_flag { stored } else { Some(in_use) }
}

fn value_or_prompt<R: BufRead, W: Write>(
    flag: Option<&str>,
    stored: Option<&str>,
    label: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    match flag.or(stored).map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => prompt(label, input, output),
    }
}

fn prompt<R: BufRead, W: Write>(label: &str, input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .with_context(|| format!("Failed to read {label}"))?;
    if read == 0 {
        bail!("No input for {label}\n  Suggestion: pass it as a flag or add it to the settings file");
    }
    Ok(line.trim().to_string())
}
