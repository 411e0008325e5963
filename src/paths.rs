//! Centralized path resolution for lbmon
//!
//! # Environment Variables
//!
//! - `LBMON_CONFIG_DIR` - Override config directory
//! - `LBMON_STATE_DIR` - Override state directory
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `LBMON_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/lbmon` (if set)
//! 3. `~/.config/lbmon`
//!
//! For state_dir():
//! 1. `LBMON_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/lbmon` (if set)
//! 3. `~/.local/state/lbmon`
//!
//! `--config` and `--state` on the command line bypass all of this.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "LBMON_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "LBMON_STATE_DIR";

const APP_DIR: &str = "lbmon";
const CONFIG_FILE: &str = "lbmon.toml";
const STATE_FILE: &str = "state.json";

/// Get the lbmon config directory path
pub fn config_dir() -> Result<PathBuf> {
    resolve_dir(
        ENV_CONFIG_DIR,
        std::env::var(ENV_CONFIG_DIR).ok(),
        std::env::var("XDG_CONFIG_HOME").ok(),
        &[".config"],
    )
}

/// Get the lbmon state directory path
pub fn state_dir() -> Result<PathBuf> {
    resolve_dir(
        ENV_STATE_DIR,
        std::env::var(ENV_STATE_DIR).ok(),
        std::env::var("XDG_STATE_HOME").ok(),
        &[".local", "state"],
    )
}

/// Config file: `--config` if given, else `<config_dir>/lbmon.toml`
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// State file: `--state` if given, else `<state_dir>/state.json`
pub fn state_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(state_dir()?.join(STATE_FILE)),
    }
}

fn resolve_dir(
    env_name: &str,
    env_override: Option<String>,
    xdg_base: Option<String>,
    home_suffix: &[&str],
) -> Result<PathBuf> {
    if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
        let path = expand(&dir);
        log::debug!("Using dir from {}: {}", env_name, path.display());
        return Ok(path);
    }

    if let Some(base) = xdg_base.filter(|b| !b.is_empty()) {
        let path = PathBuf::from(base).join(APP_DIR);
        log::debug!("Using XDG dir: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home_suffix
        .iter()
        .fold(home, |acc, part| acc.join(part))
        .join(APP_DIR);
    log::debug!("Using default dir: {}", path.display());
    Ok(path)
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let result = resolve_dir(
            ENV_CONFIG_DIR,
            Some("/custom/config".into()),
            Some("/xdg".into()),
            &[".config"],
        )
        .unwrap();
        assert_eq!(result, PathBuf::from("/custom/config"));
    }

    #[test]
    fn test_env_override_with_tilde() {
        let home = dirs::home_dir().unwrap();
        let result = resolve_dir(
            ENV_STATE_DIR,
            Some("~/lbmon-state-test".into()),
            None,
            &[".local", "state"],
        )
        .unwrap();
        assert_eq!(result, home.join("lbmon-state-test"));
    }

    #[test]
    fn test_xdg_base() {
        let result = resolve_dir(
            ENV_STATE_DIR,
            None,
            Some("/tmp/xdg-state".into()),
            &[".local", "state"],
        )
        .unwrap();
        assert_eq!(result, PathBuf::from("/tmp/xdg-state/lbmon"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let home = dirs::home_dir().unwrap();
        let result =
            resolve_dir(ENV_CONFIG_DIR, Some(String::new()), Some(String::new()), &[".config"])
                .unwrap();
        assert_eq!(result, home.join(".config").join("lbmon"));
    }

    #[test]
    fn test_home_default() {
        let home = dirs::home_dir().unwrap();
        let result = resolve_dir(ENV_STATE_DIR, None, None, &[".local", "state"]).unwrap();
        assert_eq!(result, home.join(".local").join("state").join("lbmon"));
    }

    #[test]
    fn test_explicit_files() {
        assert_eq!(
            config_file(Some(Path::new("/etc/lbmon.toml"))).unwrap(),
            PathBuf::from("/etc/lbmon.toml")
        );
        assert_eq!(
            state_file(Some(Path::new("/var/lib/lbmon.json"))).unwrap(),
            PathBuf::from("/var/lib/lbmon.json")
        );
    }

    #[test]
    fn test_expand_with_tilde() {
        let result = expand("~/test/path");
        let home = dirs::home_dir().unwrap();
        assert_eq!(result, home.join("test").join("path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$LBMON_NONEXISTENT_VAR_12345/file");
        assert_eq!(
            result,
            PathBuf::from("/path/$LBMON_NONEXISTENT_VAR_12345/file")
        );
    }
}
