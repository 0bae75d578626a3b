//! Flat `key = value` settings file.
//!
//! Holds the API key, shared secret, auth token, and authorization URL. The
//! library never touches this file; only the binary reads and writes it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Environment variable overriding `api_key`.
const API_KEY_ENV: &str = "SETGET_API_KEY";

/// Environment variable overriding `secret`.
const SECRET_ENV: &str = "SETGET_SECRET";

/// Stored credentials and endpoints.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Application API key.
    pub api_key: Option<String>,
    /// Shared secret for signing.
    pub secret: Option<String>,
    /// Auth token from `setget auth`.
    pub auth_token: Option<String>,
    /// Authorization URL template.
    pub auth_url: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Settings")
            .field("api_key", &self.api_key)
            .field("secret", &redact(&self.secret))
            .field("auth_token", &redact(&self.auth_token))
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

/// Resolves the default settings path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/setget/settings`
/// 2. `$HOME/.setget`
#[must_use]
pub fn default_settings_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("setget").join("settings"));
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(PathBuf::from(home).join(".setget"))
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

impl Settings {
    /// Loads settings from `path`; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        parse_settings_str(&raw)
            .with_context(|| format!("Failed to parse settings file '{}'", path.display()))
    }

    /// Values supplied by `SETGET_API_KEY` / `SETGET_SECRET`, if any.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            api_key: read(API_KEY_ENV),
            secret: read(SECRET_ENV),
            ..Self::default()
        }
    }

    /// Returns these settings with every key present in `overrides` replaced.
    #[must_use]
    pub fn overridden_by(&self, overrides: &Self) -> Self {
        Self {
            api_key: overrides.api_key.clone().or_else(|| self.api_key.clone()),
            secret: overrides.secret.clone().or_else(|| self.secret.clone()),
            auth_token: overrides.auth_token.clone().or_else(|| self.auth_token.clone()),
            auth_url: overrides.auth_url.clone().or_else(|| self.auth_url.clone()),
        }
    }

    /// Writes every present key to `path` via a temporary sibling and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory '{}'", parent.display())
            })?;
        }

        let mut tmp_name = path.file_name().map(std::ffi::OsString::from).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        let rendered = self.render()?;
        fs::write(&tmp_path, rendered)
            .with_context(|| format!("Failed to write settings file '{}'", tmp_path.display()))?;
        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to replace settings file '{}'", path.display()))?;

        debug!(path = %path.display(), "settings saved");
        Ok(())
    }

    fn render(&self) -> Result<String> {
        let mut out = String::from("# setget settings\n");
        for (key, value) in [
            ("api_key", &self.api_key),
            ("secret", &self.secret),
            ("auth_token", &self.auth_token),
            ("auth_url", &self.auth_url),
        ] {
            if let Some(value) = value {
                if value.contains(['\n', '\r']) {
                    bail!("Cannot save `{key}`: value spans more than one line");
                }
                out.push_str(&format!("{key} = {}\n", quote_value(value)));
            }
        }
        Ok(out)
    }
}

/// Wraps `value` in double quotes, escaping `"` and `\`.
fn quote_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to restrict permissions on '{}'", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn parse_settings_str(raw: &str) -> Result<Settings> {
    let mut settings = Settings::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!(
                "Invalid settings syntax on line {}: expected key = value",
                line_index + 1
            );
        };

        let key = raw_key.trim();
        let value = parse_value(raw_value.trim())
            .with_context(|| format!("Invalid `{key}` value on line {}", line_index + 1))?;
        let value = if value.is_empty() { None } else { Some(value) };

        match key {
            "api_key" => settings.api_key = value,
            "secret" => settings.secret = value,
            "auth_token" => settings.auth_token = value,
            "auth_url" => settings.auth_url = value,
            _ => bail!("Unknown settings key `{key}` on line {}", line_index + 1),
        }
    }
    Ok(settings)
}

/// Accepts a bare value or one wrapped in double quotes.
///
/// Inside quotes, `\"` and `\\` stand for a literal quote and backslash; any
/// other backslash is kept as written.
fn parse_value(value: &str) -> Result<String> {
    let Some(rest) = value.strip_prefix('"') else {
        return Ok(value.to_string());
    };
    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            '"' if chars.as_str().is_empty() => return Ok(out),
            '"' => bail!("unescaped quote inside value"),
            _ => out.push(ch),
        }
    }
    bail!("unterminated quote")
}
