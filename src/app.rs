//! Application state management for cafmenu
//!
//! This module contains the interactive view's state, handling keyboard input
//! and transitions between the meal list and a meal's dishes.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::data::MealSlot;
use crate::presentation::{BuildError, MealEntry};

/// Label of the entry that leaves the detail view
pub const BACK_ITEM: &str = "« Back";

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the first menu build
    Loading,
    /// List of upcoming meals
    MealList,
    /// Dishes for the meal at this index
    MealDetail(usize),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Meals available from the cache
    pub meals: Vec<MealEntry>,
    /// Index of currently selected meal in list view
    pub selected_index: usize,
    /// Index of the selected row in detail view; 0 is the back entry
    pub detail_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating the menus should be rebuilt from the cache
    pub refresh_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Whether a background prefetch was started at launch
    pub prefetch_running: bool,
    /// Problem with the last build, shown instead of stale data
    pub error: Option<String>,
    /// Timestamp of last rebuild
    pub last_refresh: Option<DateTime<Local>>,
}

impl App {
    /// Creates a new App instance with default state
    pub fn new() -> Self {
        Self {
            state: AppState::Loading,
            meals: Vec::new(),
            selected_index: 0,
            detail_index: 0,
            should_quit: false,
            refresh_requested: false,
            show_help: false,
            prefetch_running: false,
            error: None,
            last_refresh: None,
        }
    }

    /// Stores the result of a menu build and shows the meal list
    ///
    /// The selected meal and an open detail view follow their slot to its new
    /// position. An open detail view is closed if its meal disappeared.
    pub fn set_meals(&mut self, result: Result<Vec<MealEntry>, BuildError>) {
        let selected_slot = self.selected_meal().map(|meal| meal.slot);
        let open_slot = match self.state {
            AppState::MealDetail(index) => self.meals.get(index).map(|meal| meal.slot),
            _ => None,
        };

        match result {
            Ok(meals) => {
                self.meals = meals;
                self.error = None;
            }
            Err(e) => {
                log::error!("Failed to build menus: {}", e);
                self.meals.clear();
                self.error = Some(e.to_string());
            }
        }

        self.selected_index = selected_slot
            .and_then(|slot| self.position_of(slot))
            .unwrap_or_else(|| self.selected_index.min(self.meals.len().saturating_sub(1)));

        self.state = match open_slot.and_then(|slot| self.position_of(slot)) {
            Some(index) => {
                // rows include the back entry
                let last_row = self.detail_items(index).len() - 1;
                self.detail_index = self.detail_index.min(last_row);
                self.selected_index = index;
                AppState::MealDetail(index)
            }
            None => {
                self.detail_index = 0;
                AppState::MealList
            }
        };
        self.last_refresh = Some(Local::now());
    }

    /// Records that the background prefetch exited and asks for a rebuild
    pub fn prefetch_finished(&mut self) {
        self.prefetch_running = false;
        self.refresh_requested = true;
    }

    fn position_of(&self, slot: MealSlot) -> Option<usize> {
        self.meals.iter().position(|meal| meal.slot == slot)
    }

    /// Returns the total number of meals
    pub fn meal_count(&self) -> usize {
        self.meals.len()
    }

    /// Returns the currently selected meal, if any
    pub fn selected_meal(&self) -> Option<&MealEntry> {
        self.meals.get(self.selected_index)
    }

    /// Rows of the detail view: the back entry followed by the meal's lines
    pub fn detail_items(&self, index: usize) -> Vec<&str> {
        let mut items = vec![BACK_ITEM];
        if let Some(meal) = self.meals.get(index) {
            items.extend(meal.lines.iter().map(String::as_str));
        }
        items
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Enter`: Open the selected meal, or go back when on the back entry
    /// - `Esc`/`Backspace`/`h`: Go back to the meal list (quits from the list)
    /// - `r`: Rebuild menus from the cache
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::MealList => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.selected_index = wrap_up(self.selected_index, self.meal_count());
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.selected_index = wrap_down(self.selected_index, self.meal_count());
                }
                KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                    if self.selected_meal().is_some() {
                        self.detail_index = 0;
                        self.state = AppState::MealDetail(self.selected_index);
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::MealDetail(index) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                    self.go_back();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    let count = self.detail_items(index).len();
                    self.detail_index = wrap_up(self.detail_index, count);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    let count = self.detail_items(index).len();
                    self.detail_index = wrap_down(self.detail_index, count);
                }
                KeyCode::Enter => {
                    if self.detail_index == 0 {
                        self.go_back();
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Leaves the detail view
    fn go_back(&mut self) {
        self.detail_index = 0;
        self.state = AppState::MealList;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Moves an index up, wrapping to the bottom
fn wrap_up(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else if index == 0 {
        count - 1
    } else {
        index - 1
    }
}

/// Moves an index down, wrapping to the top
fn wrap_down(index: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (index + 1) % count
    }
}
