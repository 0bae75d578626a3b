//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use setget_core::DEFAULT_CONCURRENCY;

/// Download every photo and video in a Flickr set.
///
/// Private sets are reachable after a one-time `setget auth`, which stores
/// an auth token in the settings file.
#[derive(Parser, Debug)]
#[command(name = "setget")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/setget/settings or ~/.setget)
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download a set
    Get(GetArgs),
    /// Authorize access to private sets and save the token
    Auth(AuthArgs),
    /// List the size labels accepted by `get --size`
    Sizes,
}

/// Arguments for `setget get`.
#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// Set (photoset) id
    pub set_id: String,

    /// Owner's user id (NSID), e.g. 12345678@N00
    pub user_id: String,

    /// Directory to write files into
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Maximum concurrent downloads (at least 1)
    #[arg(
        short = 'c',
        long,
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub concurrency: usize,

    /// Size label to download, e.g. "Original" or "HD MP4" (default: best available)
    #[arg(short = 's', long, value_name = "LABEL")]
    pub size: Option<String>,

    /// Skip items whose file already exists
    #[arg(short = 'n', long)]
    pub no_overwrite: bool,

    /// Sign requests with the saved auth token to reach private content
    #[arg(long)]
    pub auth: bool,

    /// API key (overrides the settings file)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,
}

/// Arguments for `setget auth`.
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// API key (prompted for when absent from settings)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Shared secret (prompted for when absent from settings)
    #[arg(long, value_name = "SECRET")]
    pub secret: Option<String>,

    /// Authorization URL; `{api_key}` is replaced with the key
    #[arg(long, value_name = "URL")]
    pub auth_url: Option<String>,

    /// Mini-token shown after authorizing (prompted for when absent)
    #[arg(long, value_name = "CODE")]
    pub mini_token: Option<String>,
}
