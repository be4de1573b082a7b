//! Shell dialect quoting for commands typed into a session.
//!
//! Everything sent to a session is literal text interpreted by whatever
//! shell the session runs, so directory paths must be quoted for that
//! dialect or an embedded quote would break out of the argument.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Shell dialect of an execution session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// sh, bash, zsh, fish and friends
    Posix,
    /// Windows PowerShell / pwsh
    #[serde(rename = "powershell")]
    PowerShell,
    /// cmd.exe
    Cmd,
}

impl ShellKind {
    /// Guess the shell dialect from the environment
    ///
    /// `$SHELL` wins when set; otherwise `%ComSpec%` on Windows. Falls back to
    /// POSIX on unix and PowerShell on Windows.
    pub fn detect() -> Self {
        if let Ok(shell) = std::env::var("SHELL") {
            if let Some(kind) = Self::from_program(&shell) {
                return kind;
            }
        }
        if cfg!(windows) {
            if let Ok(comspec) = std::env::var("ComSpec") {
                if let Some(kind) = Self::from_program(&comspec) {
                    return kind;
                }
            }
            return ShellKind::PowerShell;
        }
        ShellKind::Posix
    }

    /// Classify a shell executable path (e.g. `/bin/zsh`, `C:\...\cmd.exe`)
    fn from_program(program: &str) -> Option<Self> {
        let name = program
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(program)
            .to_ascii_lowercase();
        let name = name.strip_suffix(".exe").unwrap_or(&name);

        match name {
            "" => None,
            "cmd" => Some(ShellKind::Cmd),
            "pwsh" | "powershell" => Some(ShellKind::PowerShell),
            _ => Some(ShellKind::Posix),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShellKind::Posix => "posix",
            ShellKind::PowerShell => "powershell",
            ShellKind::Cmd => "cmd",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "sh" | "bash" | "zsh" => Ok(ShellKind::Posix),
            "powershell" | "pwsh" => Ok(ShellKind::PowerShell),
            "cmd" => Ok(ShellKind::Cmd),
            other => Err(format!("unknown shell kind: {}", other)),
        }
    }
}

/// Quote a single argument for the given shell
pub fn quote(arg: &str, kind: ShellKind) -> String {
    match kind {
        ShellKind::Posix => format!("'{}'", arg.replace('\'', r"'\''")),
        ShellKind::PowerShell => format!("'{}'", arg.replace('\'', "''")),
        // Typed at an interactive prompt: `%%` would stay literal, so `%` is left alone
        ShellKind::Cmd => format!("\"{}\"", arg.replace('"', "\"\"")),
    }
}

/// Quote only when the argument contains characters a shell would interpret
pub fn quote_if_needed(arg: &str, kind: ShellKind) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_:.@/+=-".contains(c));
    if plain {
        arg.to_string()
    } else {
        quote(arg, kind)
    }
}

/// Build the command that moves a session into `dir`
pub fn change_directory_command(dir: &Path, kind: ShellKind) -> String {
    let dir = dir.to_string_lossy();
    match kind {
        ShellKind::Posix => format!("cd {}", quote(&dir, kind)),
        ShellKind::PowerShell => format!("Set-Location -LiteralPath {}", quote(&dir, kind)),
        ShellKind::Cmd => format!("cd /d {}", quote(&dir, kind)),
    }
}
