//! Station and dish extraction from CampusDish menu payloads
//!
//! A payload lists every station the location has (for all periods) and every
//! product being served. Only stations belonging to the payload's selected
//! period are kept, and each product is filed under its station.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use super::RawMenuPayload;

/// Identifier used by the API for stations and periods
///
/// CampusDish has sent these both as numbers and as strings over time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum PayloadId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadId::Number(n) => write!(f, "{}", n),
            PayloadId::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// The payload does not have the shape the menu parser relies on
///
/// This means the upstream schema changed, so it is reported rather than
/// skipped.
#[derive(Debug, Error)]
pub enum StructuralError {
    /// A station, product, or the menu itself is missing an expected field
    #[error("menu payload has an unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// A product points at a station id that the payload never defines
    #[error("dish '{dish}' references unknown station {station_id}")]
    UnknownStation { dish: String, station_id: PayloadId },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MenuDocument {
    selected_period_id: PayloadId,
    menu: MenuBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MenuBody {
    menu_stations: Vec<StationRecord>,
    menu_products: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StationRecord {
    station_id: PayloadId,
    name: String,
    period_id: PayloadId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProductRecord {
    station_id: PayloadId,
    product: ProductDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProductDetail {
    marketing_name: String,
}

/// A serving station and the dishes it offers, in payload order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    pub name: String,
    pub dishes: Vec<String>,
}

/// The stations served during one meal, in payload order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    stations: Vec<Station>,
}

impl Menu {
    /// Builds a menu from a raw payload
    ///
    /// Stations whose period differs from the selected period are dropped,
    /// along with any products filed under them. Stations that share a name
    /// are merged.
    pub fn parse(payload: &RawMenuPayload) -> Result<Self, StructuralError> {
        let document: MenuDocument = serde_json::from_str(payload.as_str())?;
        Self::from_document(document)
    }

    fn from_document(document: MenuDocument) -> Result<Self, StructuralError> {
        let MenuDocument {
            selected_period_id,
            menu,
        } = document;

        let mut all_station_ids = HashSet::new();
        let mut station_index: HashMap<PayloadId, usize> = HashMap::new();
        let mut stations: Vec<Station> = Vec::new();

        for record in menu.menu_stations {
            all_station_ids.insert(record.station_id.clone());
            if record.period_id != selected_period_id {
                continue;
            }

            let index = match stations.iter().position(|s| s.name == record.name) {
                Some(index) => index,
                None => {
                    stations.push(Station {
                        name: record.name,
                        dishes: Vec::new(),
                    });
                    stations.len() - 1
                }
            };
            station_index.insert(record.station_id, index);
        }

        for record in menu.menu_products {
            let dish = record.product.marketing_name;
            match station_index.get(&record.station_id) {
                Some(&index) => stations[index].dishes.push(dish),
                // served at a station from another period
                None if all_station_ids.contains(&record.station_id) => {}
                None => {
                    return Err(StructuralError::UnknownStation {
                        dish,
                        station_id: record.station_id,
                    })
                }
            }
        }

        Ok(Self { stations })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Looks up a station by display name
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
