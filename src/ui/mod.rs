//! UI rendering module for cafmenu
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod meal_detail;
pub mod meal_list;

pub use help_overlay::render as render_help_overlay;
pub use meal_detail::render as render_meal_detail;
pub use meal_list::render_meal_list;
