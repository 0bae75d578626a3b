//! Terminal detection and tracing setup.

use std::io::IsTerminal;

/// Log level from flags. `RUST_LOG`, when set, takes priority over this.
pub(crate) fn default_log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

pub(crate) fn should_show_progress(stderr_is_terminal: bool, quiet: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !quiet && !dumb_terminal
}

/// Progress bars only on an interactive, non-dumb stderr.
pub(crate) fn progress_enabled(quiet: bool) -> bool {
    should_show_progress(std::io::stderr().is_terminal(), quiet, is_dumb_terminal())
}

pub(crate) fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color_env_requested() && !is_dumb_terminal())
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level_quiet_wins() {
        assert_eq!(default_log_level(2, true), "error");
    }

    #[test]
    fn test_default_log_level_by_verbosity() {
        assert_eq!(default_log_level(0, false), "info");
        assert_eq!(default_log_level(1, false), "debug");
        assert_eq!(default_log_level(5, false), "trace");
    }

    #[test]
    fn test_should_show_progress() {
        assert!(should_show_progress(true, false, false));
        assert!(!should_show_progress(false, false, false));
        assert!(!should_show_progress(true, true, false));
        assert!(!should_show_progress(true, false, true));
    }
}
