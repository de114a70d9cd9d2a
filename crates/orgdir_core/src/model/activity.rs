//! Activity taxonomy model.
//!
//! # Invariants
//! - `parent_id = None` marks a root; several roots may exist.
//! - Acyclicity of the parent relation is assumed but not enforced; walkers
//!   must terminate on their own.

use serde::{Deserialize, Serialize};

/// Stable activity identifier.
pub type ActivityId = i64;

/// One node of the business activity taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    /// Parent activity id. `None` means root-level activity.
    pub parent_id: Option<ActivityId>,
}
