//! Core data models for cafmenu
//!
//! This module contains the meal kinds served by the dining hall, the
//! (day, meal) slots the rest of the application is keyed on, and the raw
//! payload type handed back by the menu API.

pub mod campus_dish;
pub mod menu;

pub use campus_dish::{CampusDishClient, FetchError, MenuFetcher};
pub use menu::{Menu, PayloadId, Station, StructuralError};

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::IgnoredAny;

use crate::calendar;

/// The meals served each day, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealKind {
    /// Every meal kind in the order they are served
    pub const ALL: [MealKind; 3] = [MealKind::Breakfast, MealKind::Lunch, MealKind::Dinner];

    /// The period id CampusDish uses for this meal at Carleton (as of Winter 2023)
    pub fn external_id(self) -> u32 {
        match self {
            MealKind::Breakfast => 2082,
            MealKind::Lunch => 2084,
            MealKind::Dinner => 2085,
        }
    }

    /// Hour of day after which the meal is no longer served
    pub fn end_hour(self) -> u32 {
        match self {
            MealKind::Breakfast => 11,
            MealKind::Lunch => 16,
            MealKind::Dinner => 22,
        }
    }

    /// Upper-case name used in cache keys and the `ignored-meals` config list
    pub fn name(self) -> &'static str {
        match self {
            MealKind::Breakfast => "BREAKFAST",
            MealKind::Lunch => "LUNCH",
            MealKind::Dinner => "DINNER",
        }
    }

    /// Human-readable name, e.g. "Breakfast"
    pub fn display_name(self) -> &'static str {
        match self {
            MealKind::Breakfast => "Breakfast",
            MealKind::Lunch => "Lunch",
            MealKind::Dinner => "Dinner",
        }
    }
}

/// One meal on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MealSlot {
    pub day: NaiveDate,
    pub kind: MealKind,
}

impl MealSlot {
    pub fn new(day: NaiveDate, kind: MealKind) -> Self {
        Self { day, kind }
    }

    /// All slots for `num_days` days starting at `start`, meals in canonical order
    pub fn window(start: NaiveDate, num_days: u32) -> impl Iterator<Item = MealSlot> {
        calendar::iter_days(start, num_days)
            .flat_map(|day| MealKind::ALL.into_iter().map(move |kind| MealSlot::new(day, kind)))
    }

    /// Label shown to the user, e.g. "Mon Breakfast"
    pub fn label(&self) -> String {
        format!("{} {}", self.day.format("%a"), self.kind.display_name())
    }

    /// Whether `now` is past the end of service for this slot
    pub fn is_over(&self, now: NaiveDateTime) -> bool {
        now > calendar::hour_boundary(self.day, self.kind.end_hour())
    }
}

/// Menu data exactly as returned by the API for one meal slot
///
/// The text is checked to be well-formed JSON when constructed but is otherwise
/// kept verbatim so it can be written to the cache unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMenuPayload {
    body: String,
}

impl RawMenuPayload {
    /// Wraps `body` after checking that it is valid JSON
    pub fn from_json(body: impl Into<String>) -> Result<Self, serde_json::Error> {
        let body = body.into();
        serde_json::from_str::<IgnoredAny>(&body)?;
        Ok(Self { body })
    }

    /// The payload text as received
    pub fn as_str(&self) -> &str {
        &self.body
    }
}
