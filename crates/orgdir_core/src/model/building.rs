//! Building domain model.

use serde::{Deserialize, Serialize};

/// Stable building identifier.
pub type BuildingId = i64;

/// A physical building that organizations may occupy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    /// Postal address, free text.
    pub address: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Building {
    /// Returns `(lat, lon)` when both coordinates are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
