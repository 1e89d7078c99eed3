//! CLI argument parsing using clap.

use clap::{
    Parser, ValueEnum,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::config::{LinkMode, Settings};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Operating mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Watch immediately; report failures per change
    Reactive,
    /// Only watch while the companion answers periodic probes
    Polling,
}

impl From<ModeArg> for LinkMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Reactive => LinkMode::Reactive,
            ModeArg::Polling => LinkMode::Polling,
        }
    }
}

/// Watch QML sources and tell a running app to hot-reload.
#[derive(Parser, Debug)]
#[command(name = "qml-hotreload")]
#[command(version, about, long_about = None, styles = clap_cargo_style())]
pub struct Cli {
    /// Directory to watch recursively [default: src/qml]
    pub root: Option<PathBuf>,

    /// Unix socket the app listens on
    #[arg(short, long, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// When to keep the watch running
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Minimum milliseconds between two changes to the same file
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Probe period in polling mode
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// File extension to watch
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Configuration file [default: ./qml-hotreload.toml]
    #[arg(short, long, value_name = "FILE", env = "QML_HOTRELOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Send a single `reload` message and exit
    #[arg(long, conflicts_with = "print_config")]
    pub reload: bool,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Layer explicit command-line values over loaded settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(root) = &self.root {
            settings.watch.root = root.clone();
        }
        if let Some(socket) = &self.socket {
            settings.link.socket_path = socket.clone();
        }
        if let Some(mode) = self.mode {
            settings.link.mode = mode.into();
        }
        if let Some(ms) = self.debounce_ms {
            settings.watch.debounce_ms = ms;
        }
        if let Some(ms) = self.poll_interval_ms {
            settings.link.poll_interval_ms = ms;
        }
        if let Some(extension) = &self.extension {
            settings.watch.extension = extension.trim_start_matches('.').to_string();
        }
    }
}
