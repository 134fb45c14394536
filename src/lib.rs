//! cafmenu library
//!
//! Menu cache, parsing and presentation for the cafmenu binary, exposed for
//! integration tests.

pub mod app;
pub mod cache;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod data;
pub mod prefetch;
pub mod presentation;
pub mod ui;
