//! Command-line interface parsing for cafmenu
//!
//! Handles parsing of CLI arguments using clap. Options given on the command
//! line override the values from `config.toml`.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{DisplayStyle, Settings};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The day window must contain at least one day
    #[error("Invalid number of days: {0}. Must be at least 1")]
    InvalidDays(u32),

    /// Packed lines need room for at least a station name
    #[error("Invalid width: {0}. Must be at least 10")]
    InvalidWidth(usize),
}

/// cafmenu - Browse upcoming dining hall menus
#[derive(Parser, Debug)]
#[command(name = "cafmenu")]
#[command(about = "Browse upcoming dining hall menus from the terminal")]
#[command(version)]
pub struct Cli {
    /// Number of days to show, starting today
    #[arg(long, value_name = "N")]
    pub days: Option<u32>,

    /// How to lay out dishes
    #[arg(long, value_enum)]
    pub display: Option<DisplayStyle>,

    /// Maximum line width in packed display
    #[arg(long, value_name = "COLUMNS")]
    pub width: Option<usize>,

    /// List stations even when all of their dishes are ignored
    #[arg(long)]
    pub show_empty: bool,

    /// Do not start a background prefetch; show only what is already cached
    #[arg(long)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to do after startup
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print cached menus to stdout instead of opening the interactive view
    List,
    /// Download menus for the upcoming days into the cache
    Prefetch,
}

/// Which top-level mode to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Interactive,
    List,
    Prefetch,
}

/// Configuration derived from CLI arguments and settings for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub mode: RunMode,
    /// Settings with command-line overrides applied
    pub settings: Settings,
    /// Whether the interactive view should start a background prefetch
    pub background_prefetch: bool,
}

impl StartupConfig {
    /// Combines parsed CLI arguments with loaded settings
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with overrides applied
    /// * `Err(CliError)` if an override is out of range
    pub fn from_cli(cli: &Cli, mut settings: Settings) -> Result<Self, CliError> {
        if let Some(days) = cli.days {
            settings.days = days;
        }
        if let Some(display) = cli.display {
            settings.display = display;
        }
        if let Some(width) = cli.width {
            settings.max_width = width;
        }
        if cli.show_empty {
            settings.show_empty_stations = true;
        }

        if settings.days == 0 {
            return Err(CliError::InvalidDays(settings.days));
        }
        if settings.max_width < 10 {
            return Err(CliError::InvalidWidth(settings.max_width));
        }

        let mode = match cli.command {
            None => RunMode::Interactive,
            Some(Command::List) => RunMode::List,
            Some(Command::Prefetch) => RunMode::Prefetch,
        };

        Ok(StartupConfig {
            mode,
            settings,
            background_prefetch: mode == RunMode::Interactive && !cli.offline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["cafmenu"]);
        assert!(cli.command.is_none());
        assert!(cli.days.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_parse_subcommands() {
        assert_eq!(Cli::parse_from(["cafmenu", "list"]).command, Some(Command::List));
        assert_eq!(
            Cli::parse_from(["cafmenu", "prefetch"]).command,
            Some(Command::Prefetch)
        );
    }

    #[test]
    fn test_cli_parse_display_values() {
        let cli = Cli::parse_from(["cafmenu", "--display", "packed", "--width", "50"]);
        assert_eq!(cli.display, Some(DisplayStyle::Packed));
        assert_eq!(cli.width, Some(50));

        let cli = Cli::parse_from(["cafmenu", "--display", "per-dish"]);
        assert_eq!(cli.display, Some(DisplayStyle::PerDish));
    }

    #[test]
    fn test_cli_rejects_unknown_display() {
        assert!(Cli::try_parse_from(["cafmenu", "--display", "fancy"]).is_err());
    }

    #[test]
    fn test_startup_config_defaults() {
        let cli = Cli::parse_from(["cafmenu"]);
        let config = StartupConfig::from_cli(&cli, Settings::default()).unwrap();

        assert_eq!(config.mode, RunMode::Interactive);
        assert!(config.background_prefetch);
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_startup_config_overrides_settings() {
        let cli = Cli::parse_from([
            "cafmenu",
            "--days",
            "5",
            "--display",
            "packed",
            "--width",
            "72",
            "--show-empty",
        ]);
        let config = StartupConfig::from_cli(&cli, Settings::default()).unwrap();

        assert_eq!(config.settings.days, 5);
        assert_eq!(config.settings.display, DisplayStyle::Packed);
        assert_eq!(config.settings.max_width, 72);
        assert!(config.settings.show_empty_stations);
    }

    #[test]
    fn test_offline_disables_background_prefetch() {
        let cli = Cli::parse_from(["cafmenu", "--offline"]);
        let config = StartupConfig::from_cli(&cli, Settings::default()).unwrap();
        assert!(!config.background_prefetch);
    }

    #[test]
    fn test_list_and_prefetch_never_spawn_prefetch() {
        for args in [["cafmenu", "list"], ["cafmenu", "prefetch"]] {
            let cli = Cli::parse_from(args);
            let config = StartupConfig::from_cli(&cli, Settings::default()).unwrap();
            assert!(!config.background_prefetch);
        }
    }

    #[test]
    fn test_zero_days_is_rejected() {
        let cli = Cli::parse_from(["cafmenu", "--days", "0"]);
        let result = StartupConfig::from_cli(&cli, Settings::default());
        assert!(matches!(result, Err(CliError::InvalidDays(0))));
    }

    #[test]
    fn test_tiny_width_is_rejected() {
        let cli = Cli::parse_from(["cafmenu", "--width", "3"]);
        let err = StartupConfig::from_cli(&cli, Settings::default()).unwrap_err();
        assert!(err.to_string().contains("Invalid width"));
    }
}
