//! CampusDish menu API client
//!
//! Fetches the daily menu for one meal period at one location. The response
//! body is handed back untouched as a [`RawMenuPayload`].

use std::future::Future;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use thiserror::Error;

use super::RawMenuPayload;

/// Endpoint for Carleton's CampusDish menus
const CAMPUS_DISH_MENU_URL: &str = "https://carleton.campusdish.com/api/menu/GetMenus";

/// Location id of the Carleton dining hall
pub const DEFAULT_LOCATION_ID: u32 = 5087;

/// Errors that can occur when fetching a menu
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request failed, timed out, or returned a non-success status
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body was not JSON
    #[error("Response body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Source of raw menu payloads
///
/// The cache only ever talks to the network through this trait, which keeps
/// it testable with a fake.
pub trait MenuFetcher {
    /// Fetches the menu for `day` and the meal with the given external id
    fn fetch(
        &self,
        day: NaiveDate,
        meal_id: u32,
    ) -> impl Future<Output = Result<RawMenuPayload, FetchError>> + Send;
}

/// Client for the CampusDish menu API
#[derive(Debug, Clone)]
pub struct CampusDishClient {
    client: Client,
    base_url: String,
    location_id: u32,
}

impl CampusDishClient {
    /// Creates a client whose requests give up after `timeout`
    pub fn new(location_id: u32, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, location_id))
    }

    /// Create a new CampusDishClient with a custom HTTP client
    pub fn with_client(client: Client, location_id: u32) -> Self {
        Self {
            client,
            base_url: CAMPUS_DISH_MENU_URL.to_string(),
            location_id,
        }
    }

    /// Points the client at a different server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the request URL for one day and meal period
    ///
    /// The API wants the date as `M/D/YYYY` and expects the empty parameters to
    /// be present.
    pub fn menu_url(&self, day: NaiveDate, meal_id: u32) -> String {
        format!(
            "{}?locationId={}&storeIds=&mode=Daily&date={}/{}/{}&time=&periodId={}&fulfillmentMethod=",
            self.base_url,
            self.location_id,
            day.month(),
            day.day(),
            day.year(),
            meal_id
        )
    }
}

impl MenuFetcher for CampusDishClient {
    fn fetch(
        &self,
        day: NaiveDate,
        meal_id: u32,
    ) -> impl Future<Output = Result<RawMenuPayload, FetchError>> + Send {
        let request = self.client.get(self.menu_url(day, meal_id));
        async move {
            let response = request.send().await?.error_for_status()?;
            let text = response.text().await?;
            Ok(RawMenuPayload::from_json(text)?)
        }
    }
}
