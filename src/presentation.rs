//! Turns cached menus into the lines shown to the user
//!
//! For each upcoming meal slot the builder decides whether to show it at all
//! (excluded, already over, or not cached yet are all skipped), applies the
//! station and dish exclusions, and lays out the remaining dishes.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::cache::{FetchPolicy, MenuCache};
use crate::config::{DisplayStyle, ExclusionConfig, Settings};
use crate::data::{MealSlot, Menu, MenuFetcher, StructuralError};

/// Prefix for packed lines that continue a station's list
pub const CONTINUATION_PREFIX: &str = "    ";

/// Shown for a station with nothing left after filtering, when such stations are listed
pub const EMPTY_STATION_TEXT: &str = "(no dishes)";

/// How dishes are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// One "Station: Dish" line per dish
    PerDish,
    /// "Station: Dish, Dish, ..." wrapped at `max_width` characters
    Packed { max_width: usize },
}

impl DisplayMode {
    pub fn from_settings(style: DisplayStyle, max_width: usize) -> Self {
        match style {
            DisplayStyle::PerDish => DisplayMode::PerDish,
            DisplayStyle::Packed => DisplayMode::Packed { max_width },
        }
    }
}

/// What to do with a station whose dishes were all filtered out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyStations {
    #[default]
    Hide,
    Show,
}

/// One selectable meal and its display lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealEntry {
    pub slot: MealSlot,
    pub label: String,
    pub lines: Vec<String>,
}

/// A cached menu could not be understood
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{label} ({day}): {source}")]
    Structure {
        label: String,
        day: NaiveDate,
        #[source]
        source: StructuralError,
    },
}

/// Builds meal entries from the menu cache without touching the network
pub struct MenuBuilder<'a, F> {
    cache: &'a MenuCache<F>,
    exclusions: &'a ExclusionConfig,
    mode: DisplayMode,
    empty_stations: EmptyStations,
}

impl<'a, F: MenuFetcher> MenuBuilder<'a, F> {
    pub fn new(cache: &'a MenuCache<F>, exclusions: &'a ExclusionConfig) -> Self {
        Self {
            cache,
            exclusions,
            mode: DisplayMode::PerDish,
            empty_stations: EmptyStations::Hide,
        }
    }

    /// Creates a builder configured from user settings
    pub fn from_settings(cache: &'a MenuCache<F>, settings: &'a Settings) -> Self {
        let empty_stations = if settings.show_empty_stations {
            EmptyStations::Show
        } else {
            EmptyStations::Hide
        };
        Self::new(cache, &settings.exclusions)
            .with_mode(DisplayMode::from_settings(settings.display, settings.max_width))
            .with_empty_stations(empty_stations)
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_empty_stations(mut self, empty_stations: EmptyStations) -> Self {
        self.empty_stations = empty_stations;
        self
    }

    /// Builds entries for every meal in `num_days` days starting at `start`
    ///
    /// Meals that are excluded, over by `now`, or not in the cache are left
    /// out. A cached menu with an unexpected shape fails the whole build.
    pub async fn build_meals(
        &self,
        start: NaiveDate,
        num_days: u32,
        now: NaiveDateTime,
    ) -> Result<Vec<MealEntry>, BuildError> {
        let mut meals = Vec::new();

        for slot in MealSlot::window(start, num_days) {
            if self.exclusions.ignores_meal(slot.kind) || slot.is_over(now) {
                continue;
            }

            let payload = match self
                .cache
                .get(slot.day, slot.kind, FetchPolicy::CacheOnly)
                .await
            {
                Ok(payload) => payload,
                Err(e) => {
                    log::debug!("Skipping {} on {}: {}", slot.label(), slot.day, e);
                    continue;
                }
            };

            let menu = Menu::parse(&payload).map_err(|source| BuildError::Structure {
                label: slot.label(),
                day: slot.day,
                source,
            })?;

            meals.push(MealEntry {
                slot,
                label: slot.label(),
                lines: self.render_menu(&menu),
            });
        }

        Ok(meals)
    }

    /// Filters and lays out one menu
    pub fn render_menu(&self, menu: &Menu) -> Vec<String> {
        let mut lines = Vec::new();

        for station in menu.stations() {
            if self.exclusions.ignores_station(&station.name) {
                continue;
            }

            let dishes: Vec<&str> = station
                .dishes
                .iter()
                .map(String::as_str)
                .filter(|dish| !self.exclusions.ignores_dish(dish))
                .collect();

            if dishes.is_empty() {
                if self.empty_stations == EmptyStations::Show {
                    lines.push(format!("{}: {}", station.name, EMPTY_STATION_TEXT));
                }
                continue;
            }

            match self.mode {
                DisplayMode::PerDish => lines.extend(
                    dishes
                        .iter()
                        .map(|dish| format!("{}: {}", station.name, dish)),
                ),
                DisplayMode::Packed { max_width } => {
                    lines.extend(pack_station_lines(&station.name, &dishes, max_width))
                }
            }
        }

        lines
    }
}

/// Packs a station's dishes into lines of at most `max_width` characters
///
/// The first line starts with `"<station>: "`, later ones with
/// [`CONTINUATION_PREFIX`]. Dishes are separated by `", "` and never split, so a
/// line only runs over when it holds a single dish that does not fit together
/// with its line prefix. Returns no lines for an empty dish list.
pub fn pack_station_lines(station: &str, dishes: &[&str], max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = format!("{}: ", station);
    let mut line_len = line.chars().count();
    let mut line_has_dish = false;

    for dish in dishes {
        let dish_len = dish.chars().count();

        if line_has_dish {
            if line_len + 2 + dish_len <= max_width {
                line.push_str(", ");
                line.push_str(dish);
                line_len += 2 + dish_len;
                continue;
            }
            lines.push(std::mem::take(&mut line));
            line.push_str(CONTINUATION_PREFIX);
            line_len = CONTINUATION_PREFIX.chars().count();
        }

        line.push_str(dish);
        line_len += dish_len;
        line_has_dish = true;
    }

    if line_has_dish {
        lines.push(line);
    }
    lines
}
