//! Organization model and its many-to-many activity link.

use crate::model::activity::{Activity, ActivityId};
use crate::model::building::{Building, BuildingId};
use serde::{Deserialize, Serialize};

/// Stable organization identifier.
pub type OrganizationId = i64;

/// Organization row as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    /// Comma-separated phone numbers, kept verbatim.
    #[serde(default)]
    pub phones: String,
    pub building_id: Option<BuildingId>,
}

/// Link row joining one organization with one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationActivity {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub activity_id: ActivityId,
}

/// Read model returned by directory queries: an organization with its
/// building and activities resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationDetails {
    pub id: OrganizationId,
    pub name: String,
    pub phones: String,
    /// `None` when the organization has no building or the reference dangles.
    pub building: Option<Building>,
    pub activities: Vec<Activity>,
}
