//! Domain data structures for collection points and the waste-item catalog.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::parse_item_ids;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier for a waste-item category.
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a registered collection point.
pub struct PointId(pub i64);

impl fmt::Display for PointId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Waste-item category a point can accept. Seeded once, read-only afterwards.
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    /// Display label.
    pub title: String,
    /// Icon asset reference.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Registered collection point as persisted by the store.
pub struct Point {
    /// Unique identifier generated on insert.
    pub id: PointId,
    /// Display name of the collection point.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Contact WhatsApp number.
    pub whatsapp: String,
    /// Latitude of the point location.
    pub latitude: f64,
    /// Longitude of the point location.
    pub longitude: f64,
    /// City the point is located in.
    pub city: String,
    /// Brazilian state code (UF).
    pub uf: String,
    /// Uploaded image asset reference.
    pub image: String,
    /// Insertion timestamp assigned by the store.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Candidate record for registering a new collection point.
pub struct NewPoint {
    /// Display name of the collection point.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
    /// Contact WhatsApp number.
    pub whatsapp: String,
    /// Latitude of the point location.
    pub latitude: f64,
    /// Longitude of the point location.
    pub longitude: f64,
    /// City the point is located in.
    pub city: String,
    /// Brazilian state code (UF).
    pub uf: String,
    /// Stored image asset reference produced by the upload step.
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A point together with the items it accepts.
pub struct PointDetails {
    /// The point record.
    pub point: Point,
    /// Items joined through the association table. Order is not guaranteed.
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Parsed filter for searching collection points.
pub struct SearchQuery {
    /// State code, matched by case-sensitive equality.
    pub uf: String,
    /// City name, matched by case-sensitive equality.
    pub city: String,
    /// Requested item ids; a point matches when it offers at least one.
    pub items: Vec<ItemId>,
}

impl SearchQuery {
    /// Build a query from raw request parameters.
    ///
    /// `raw_items` is a comma-delimited id list; tokens that do not parse as
    /// integers are dropped rather than failing the whole query.
    #[must_use]
    pub fn parse(uf: &str, city: &str, raw_items: &str) -> Self {
        Self {
            uf: uf.trim().to_owned(),
            city: city.trim().to_owned(),
            items: parse_item_ids(raw_items),
        }
    }

    /// True when no item id survived parsing.
    ///
    /// An empty filter set matches nothing; see the service layer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
