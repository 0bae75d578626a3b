//! `setget get`: download one set.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use setget_core::{ApiCredentials, HttpClient, RunConfig, RunTally, SetDownloader};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::cli::GetArgs;
use crate::progress::RunProgress;
use crate::settings::Settings;
use crate::terminal;

/// Runs a set download and reports its outcome.
///
/// Exit outcome: success when every item was downloaded or skipped, partial
/// when some items ended in warnings.
pub async fn run_get_command(args: &GetArgs, settings: &Settings, quiet: bool) -> Result<ProcessExit> {
    let credentials = build_credentials(args, settings)?;
    let api = super::flickr_client(credentials)?;
    let client = HttpClient::new()?;

    let config = RunConfig {
        concurrency: args.concurrency,
        output_dir: args.output_dir.clone(),
        size: args.size.clone(),
        no_overwrite: args.no_overwrite,
    };
    debug!(?config, "run configuration");

    let downloader = SetDownloader::new(Arc::new(api), client, config)?;
    let mut run = downloader.download_set(&args.set_id, &args.user_id);

    let mut progress = RunProgress::new(terminal::progress_enabled(quiet));
    let mut last_tally = RunTally::default();
    while let Some(event) = run.next_event().await {
        if let Some(tally) = event.tally() {
            last_tally = tally;
        }
        progress.handle(&event);
    }
    progress.finish();

    match run.finish().await {
        Ok(tally) => {
            info!("{tally}");
            Ok(exit_outcome(&tally))
        }
        Err(error) => Err(error).with_context(|| format!("Set download stopped ({last_tally})")),
    }
}

fn build_credentials(args: &GetArgs, settings: &Settings) -> Result<ApiCredentials> {
    let api_key = args
        .api_key
        .as_deref()
        .or(settings.api_key.as_deref())
        .map(str::trim)
        .filter(|key| !key.is_empty());
    let Some(api_key) = api_key else {
        bail!(
            "No API key configured\n  Suggestion: pass --api-key, set SETGET_API_KEY, or add `api_key` to the settings file"
        );
    };

    let credentials = ApiCredentials::new(api_key);
    if !args.auth {
        return Ok(credentials);
    }

    let (Some(secret), Some(auth_token)) = (settings.secret.as_deref(), settings.auth_token.as_deref())
    else {
        bail!("--auth needs a saved secret and auth token\n  Suggestion: run `setget auth` first");
    };
    Ok(credentials.with_auth(secret, auth_token))
}

/// Maps a completed run's tally to an exit outcome.
pub(crate) fn exit_outcome(tally: &RunTally) -> ProcessExit {
    if tally.is_clean() {
        ProcessExit::Success
    } else {
        ProcessExit::Partial
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args() -> GetArgs {
        GetArgs {
            set_id: "1".into(),
            user_id: "u".into(),
            output_dir: PathBuf::from("."),
            concurrency: 5,
            size: None,
            no_overwrite: false,
            auth: false,
            api_key: None,
        }
    }

    #[test]
    fn test_credentials_need_api_key() {
        let err = build_credentials(&args(), &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }

    #[test]
    fn test_credentials_flag_overrides_settings() {
        let settings = Settings {
            api_key: Some("from-file".into()),
            ..Settings::default()
        };
        let mut get = args();
        get.api_key = Some("from-flag".into());

        let credentials = build_credentials(&get, &settings).unwrap();

        assert_eq!(credentials.api_key, "from-flag");
        assert!(!credentials.is_authenticated());
    }

    #[test]
    fn test_auth_requires_saved_token() {
        let settings = Settings {
            api_key: Some("k".into()),
            secret: Some("s".into()),
            ..Settings::default()
        };
        let mut get = args();
        get.auth = true;

        let err = build_credentials(&get, &settings).unwrap_err();
        assert!(err.to_string().contains("setget auth"));
    }

    #[test]
    fn test_auth_uses_saved_token() {
        let settings = Settings {
            api_key: Some("k".into()),
            secret: Some("s".into()),
            auth_token: Some("t".into()),
            auth_url: None,
        };
        let mut get = args();
        get.auth = true;

        let credentials = build_credentials(&get, &settings).unwrap();
        assert!(credentials.is_authenticated());
    }

    #[test]
    fn test_exit_outcome() {
        let clean = RunTally {
            processed: 2,
            downloaded: 1,
            skipped: 1,
            warnings: 0,
        };
        assert_eq!(exit_outcome(&clean), ProcessExit::Success);

        let partial = RunTally {
            warnings: 1,
            processed: 3,
            ..clean
        };
        assert_eq!(exit_outcome(&partial), ProcessExit::Partial);
    }
}
