//! Core domain logic for the organizations directory.
//! This crate owns the entity store, the activity taxonomy walker and the
//! directory query engine.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::activity::{Activity, ActivityId};
pub use model::building::{Building, BuildingId};
pub use model::organization::{
    Organization, OrganizationActivity, OrganizationDetails, OrganizationId,
};
pub use repo::directory_repo::{
    DirectoryRepoError, DirectoryRepoResult, DirectoryRepository, SqliteDirectoryRepository,
};
pub use seed::{load_seed, load_seed_file, SeedData, SeedError};
pub use service::activity_tree::{ActivityForest, DEFAULT_TREE_DEPTH, DESCENDANT_DEPTH_LIMIT};
pub use service::directory_service::{
    planar_distance, DirectoryError, DirectoryResult, DirectoryService, RadiusQuery,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
