//! Command-line flags and on-disk configuration.
//!
//! Flags select the API endpoint and startup options; colours and key bindings
//! live in `theme.conf` and `keybinds.conf` inside the config directory and
//! are created with defaults on first run.

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::api::DEFAULT_API_BASE;
use crate::app::Theme;
use crate::app::keymap::Keymap;
use crate::error::{Context, Result};
use crate::pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};

pub const THEME_FILE: &str = "theme.conf";
pub const KEYBINDS_FILE: &str = "keybinds.conf";

#[derive(Parser, Debug, Clone)]
#[command(name = "userdesk")]
#[command(version)]
#[command(about = "Browse, search, add, edit and delete users on a REST endpoint", long_about = None)]
pub struct Cli {
    /// Base URL of the users API
    #[arg(long, env = "USERDESK_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Rows per page at startup (5, 10 or 25)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page_size: usize,

    /// Write logs to this file (no logging when unset)
    #[arg(long, env = "USERDESK_LOG")]
    pub log_file: Option<PathBuf>,

    /// Directory holding theme.conf and keybinds.conf
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

fn parse_page_size(s: &str) -> std::result::Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if PAGE_SIZE_OPTIONS.contains(&n) {
        Ok(n)
    } else {
        Err(format!("page size must be one of {PAGE_SIZE_OPTIONS:?}"))
    }
}

/// `$XDG_CONFIG_HOME/userdesk` or the platform equivalent.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("userdesk"))
}

/// Everything the app needs at startup, resolved from flags and files.
#[derive(Clone, Debug)]
pub struct Settings {
    pub api_base: String,
    pub page_size: usize,
    pub theme: Theme,
    pub keymap: Keymap,
}

impl Settings {
    /// Built-in defaults; nothing is read from disk.
    pub fn defaults(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            page_size: DEFAULT_PAGE_SIZE,
            theme: Theme::default(),
            keymap: Keymap::default(),
        }
    }

    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings = Self::defaults(cli.api_base.clone());
        settings.page_size = cli.page_size;
        match cli.config_dir.clone().or_else(default_config_dir) {
            Some(dir) => settings.load_files(&dir)?,
            None => tracing::warn!("no config directory available; using built-in theme and keys"),
        }
        Ok(settings)
    }

    /// Read theme and key bindings from `dir`, creating missing files.
    pub fn load_files(&mut self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_ctx(|| format!("create config dir {}", dir.display()))?;
        self.theme = Theme::load_or_init(&dir.join(THEME_FILE));
        self.keymap = Keymap::load_or_init(&dir.join(KEYBINDS_FILE));
        tracing::debug!(dir = %dir.display(), "configuration loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_flag_accepts_listed_options_only() {
        assert_eq!(parse_page_size("10"), Ok(10));
        assert!(parse_page_size("7").is_err());
        assert!(parse_page_size("ten").is_err());
    }

    #[test]
    fn cli_defaults_point_at_demo_backend() {
        let cli = Cli::parse_from(["userdesk"]);
        assert_eq!(cli.page_size, DEFAULT_PAGE_SIZE);
        assert!(cli.config_dir.is_none());
        // env may override in a developer shell
        if std::env::var_os("USERDESK_API_BASE").is_none() {
            assert_eq!(cli.api_base, DEFAULT_API_BASE);
        }
    }
}
