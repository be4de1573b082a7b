use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session::{SessionMode, ShellKind};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Discover and run package.json scripts")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace root (repeatable; the first one is the primary root)
    #[arg(short, long = "root", global = true)]
    pub roots: Vec<PathBuf>,

    /// Shell dialect used for directory changes
    #[arg(long, global = true, value_enum)]
    pub shell: Option<ShellSetting>,

    /// Task runner prefix (e.g. "npm run", "pnpm run")
    #[arg(long, global = true)]
    pub runner: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the script inventory
    List {
        /// Also show packages that declare no scripts
        #[arg(long)]
        all: bool,
    },
    /// Run a script in a tmux session
    Run {
        /// Script name
        task: String,

        /// Package key ("/" for the workspace root, e.g. "packages/api")
        #[arg(short, long)]
        package: Option<String>,

        /// Reuse the shared session
        #[arg(long, conflicts_with = "isolated")]
        shared: bool,

        /// Create a dedicated session for this run
        #[arg(long)]
        isolated: bool,
    },
    /// Watch manifests and reprint the inventory when they change
    Watch,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Session mode requested on the command line, if any
    pub fn session_mode(&self) -> Option<SessionMode> {
        match &self.command {
            Command::Run { shared: true, .. } => Some(SessionMode::Shared),
            Command::Run { isolated: true, .. } => Some(SessionMode::Isolated),
            _ => None,
        }
    }
}

/// Shell dialect preference; `auto` picks one from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShellSetting {
    #[default]
    Auto,
    Posix,
    Powershell,
    Cmd,
}

impl ShellSetting {
    /// Resolve to a concrete shell kind
    pub fn resolve(self) -> ShellKind {
        match self {
            ShellSetting::Auto => ShellKind::detect(),
            ShellSetting::Posix => ShellKind::Posix,
            ShellSetting::Powershell => ShellKind::PowerShell,
            ShellSetting::Cmd => ShellKind::Cmd,
        }
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Command prefix used to invoke a script (`<task_runner> <task>`)
    #[serde(default = "default_task_runner")]
    pub task_runner: String,

    /// Shell dialect of the sessions
    #[serde(default)]
    pub shell: ShellSetting,

    /// Preferred session mode
    #[serde(default)]
    pub session_mode: SessionMode,

    /// Discovery settings
    #[serde(default)]
    pub scan: ScanSettings,

    /// Session naming settings
    #[serde(default)]
    pub session: SessionSettings,

    /// File watching settings
    #[serde(default)]
    pub watch: WatchSettings,
}

fn default_task_runner() -> String {
    "npm run".to_string()
}

/// Manifest discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// File name of a task manifest
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Directory names never descended into (dependency caches)
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

fn default_manifest_name() -> String {
    "package.json".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    vec!["node_modules".to_string()]
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            manifest_name: default_manifest_name(),
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

impl ScanSettings {
    /// Check whether a directory name is excluded from discovery
    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == dir_name)
    }
}

/// Session naming settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Reserved name of the shared session
    #[serde(default = "default_shared_name")]
    pub shared_name: String,

    /// Prefix of isolated session names
    #[serde(default = "default_isolated_prefix")]
    pub isolated_prefix: String,
}

fn default_shared_name() -> String {
    "NPM Scripts Runner".to_string()
}

fn default_isolated_prefix() -> String {
    "npm: ".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            shared_name: default_shared_name(),
            isolated_prefix: default_isolated_prefix(),
        }
    }
}

/// File watching settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Quiet period before a burst of manifest changes triggers a refresh
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            task_runner: default_task_runner(),
            shell: ShellSetting::default(),
            session_mode: SessionMode::default(),
            scan: ScanSettings::default(),
            session: SessionSettings::default(),
            watch: WatchSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        let default_paths = [
            dirs::config_dir().map(|p| p.join("scriptdeck/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/scriptdeck/config.toml")),
            dirs::home_dir().map(|p| p.join(".scriptdeck.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        Ok(Self::default())
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(shell) = cli.shell {
            self.shell = shell;
        }
        if let Some(runner) = &cli.runner {
            self.task_runner = runner.clone();
        }
        if let Some(mode) = cli.session_mode() {
            self.session_mode = mode;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Blank or malformed values fall back to their defaults.
    pub fn validate(&mut self) {
        if self.task_runner.trim().is_empty() {
            self.task_runner = default_task_runner();
        } else {
            self.task_runner = self.task_runner.trim().to_string();
        }

        let name = self.scan.manifest_name.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            self.scan.manifest_name = default_manifest_name();
        }
        self.scan.exclude_dirs.retain(|d| !d.trim().is_empty());

        if self.session.shared_name.trim().is_empty() {
            self.session.shared_name = default_shared_name();
        }
    }

    /// Shell kind the sessions are assumed to run
    pub fn shell_kind(&self) -> ShellKind {
        self.shell.resolve()
    }
}
