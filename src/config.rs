//! Application paths and user settings
//!
//! Paths come from the platform's XDG directories (`~/.cache/cafmenu` and
//! `~/.config/cafmenu` on Linux). Settings are read once at startup from
//! `config.toml` in the config directory; every key is optional.
//!
//! ```toml
//! ignored-meals = ["BREAKFAST"]
//! ignored-stations = ["Condiments"]
//! ignored-items = ["Water", "Assorted Cereal"]
//! display = "packed"
//! max-width = 72
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::data::campus_dish::DEFAULT_LOCATION_ID;
use crate::data::MealKind;

/// Name of the settings file inside the config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the log file inside the cache directory
const LOG_FILE_NAME: &str = "cafmenu.log";

/// Errors that can occur when loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML or has values of the wrong type
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where cafmenu keeps its files
#[derive(Debug, Clone)]
pub struct AppPaths {
    cache_dir: PathBuf,
    config_dir: PathBuf,
}

impl AppPaths {
    /// Resolves XDG-compliant directories for the current user
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn discover() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "cafmenu")?;
        Some(Self {
            cache_dir: project_dirs.cache_dir().to_path_buf(),
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    /// Uses explicit directories instead of the XDG ones
    pub fn with_dirs(cache_dir: impl Into<PathBuf>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            config_dir: config_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join(LOG_FILE_NAME)
    }
}

/// Names to leave out of the menu listing
///
/// Meal names are matched case-insensitively against `BREAKFAST`, `LUNCH` and
/// `DINNER`; station and dish names must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExclusionConfig {
    ignored_meals: BTreeSet<String>,
    ignored_stations: BTreeSet<String>,
    ignored_items: BTreeSet<String>,
}

impl ExclusionConfig {
    pub fn new<M, S, D>(meals: M, stations: S, dishes: D) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            ignored_meals: meals.into_iter().map(Into::into).collect(),
            ignored_stations: stations.into_iter().map(Into::into).collect(),
            ignored_items: dishes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn ignored_meals(&self) -> &BTreeSet<String> {
        &self.ignored_meals
    }

    pub fn ignored_stations(&self) -> &BTreeSet<String> {
        &self.ignored_stations
    }

    pub fn ignored_items(&self) -> &BTreeSet<String> {
        &self.ignored_items
    }

    pub fn ignores_meal(&self, kind: MealKind) -> bool {
        self.ignored_meals
            .iter()
            .any(|name| name.eq_ignore_ascii_case(kind.name()))
    }

    pub fn ignores_station(&self, station: &str) -> bool {
        self.ignored_stations.contains(station)
    }

    pub fn ignores_dish(&self, dish: &str) -> bool {
        self.ignored_items.contains(dish)
    }
}

/// How dishes are laid out under each meal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStyle {
    /// One line per dish, "Station: Dish"
    #[default]
    PerDish,
    /// Each station's dishes packed into width-limited lines
    Packed,
}

/// Everything read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    #[serde(flatten)]
    pub exclusions: ExclusionConfig,
    /// Number of days to show, starting today
    pub days: u32,
    pub display: DisplayStyle,
    /// Maximum line width in packed mode
    pub max_width: usize,
    /// List stations whose dishes were all filtered out
    pub show_empty_stations: bool,
    pub fetch_timeout_secs: u64,
    pub location_id: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exclusions: ExclusionConfig::default(),
            days: 3,
            display: DisplayStyle::PerDish,
            max_width: 60,
            show_empty_stations: false,
            fetch_timeout_secs: 10,
            location_id: DEFAULT_LOCATION_ID,
        }
    }
}

impl Settings {
    /// Loads settings from the config directory
    ///
    /// A missing file yields the defaults.
    pub fn load(paths: &AppPaths) -> Result<Self, ConfigError> {
        let path = paths.config_file();

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let settings = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::info!("Loaded config from {}", path.display());
        log::debug!("Using settings: {:?}", settings);
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
