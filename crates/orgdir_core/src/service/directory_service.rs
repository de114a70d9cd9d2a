//! Directory query use-case service.
//!
//! # Responsibility
//! - Implement organization lookups by building, activity subtree, radius,
//!   id and name on top of the entity store.
//! - Resolve building and activities for every returned organization.
//!
//! # Invariants
//! - Every operation is read-only and idempotent.
//! - List operations succeed with an empty result; only `by_id` reports
//!   not-found.
//! - Radius filtering is inclusive and skips buildings without coordinates.

use crate::model::activity::{Activity, ActivityId};
use crate::model::building::{Building, BuildingId};
use crate::model::organization::{Organization, OrganizationDetails, OrganizationId};
use crate::repo::directory_repo::{DirectoryRepoError, DirectoryRepository};
use crate::service::activity_tree::ActivityForest;
use log::{debug, error};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Result type used by directory service operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors from directory service operations.
#[derive(Debug)]
pub enum DirectoryError {
    /// Radius is NaN or not greater than zero.
    InvalidRadius(f64),
    /// Query coordinate is not a finite number.
    InvalidCoordinate { name: &'static str, value: f64 },
    /// Organization id does not exist.
    OrganizationNotFound(OrganizationId),
    /// Repository-level failure.
    Repo(DirectoryRepoError),
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRadius(value) => {
                write!(f, "radius must be a number greater than 0, got {value}")
            }
            Self::InvalidCoordinate { name, value } => {
                write!(f, "{name} must be a finite number, got {value}")
            }
            Self::OrganizationNotFound(id) => write!(f, "organization not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DirectoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DirectoryRepoError> for DirectoryError {
    fn from(value: DirectoryRepoError) -> Self {
        Self::Repo(value)
    }
}

/// Validated input for radius searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    lat: f64,
    lon: f64,
    radius: f64,
}

impl RadiusQuery {
    /// Validates radius search input.
    ///
    /// # Errors
    /// - `InvalidCoordinate` when `lat` or `lon` is NaN or infinite.
    /// - `InvalidRadius` when `radius` is NaN or not greater than 0. An
    ///   infinite radius is accepted and matches every mapped building.
    pub fn new(lat: f64, lon: f64, radius: f64) -> DirectoryResult<Self> {
        if !lat.is_finite() {
            return Err(DirectoryError::InvalidCoordinate {
                name: "lat",
                value: lat,
            });
        }
        if !lon.is_finite() {
            return Err(DirectoryError::InvalidCoordinate {
                name: "lon",
                value: lon,
            });
        }
        if radius.is_nan() || radius <= 0.0 {
            return Err(DirectoryError::InvalidRadius(radius));
        }
        Ok(Self { lat, lon, radius })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Returns whether `building` lies within the radius, boundary included.
    ///
    /// Buildings missing either coordinate never match.
    pub fn contains(&self, building: &Building) -> bool {
        building
            .coordinates()
            .is_some_and(|point| planar_distance(point, (self.lat, self.lon)) <= self.radius)
    }
}

/// Plain Euclidean distance over `(lat, lon)` pairs.
///
/// This is a flat-plane approximation, not a geodesic distance.
pub fn planar_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let d_lat = a.0 - b.0;
    let d_lon = a.1 - b.1;
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}

/// Directory query service facade.
pub struct DirectoryService<R: DirectoryRepository> {
    repo: R,
}

impl<R: DirectoryRepository> DirectoryService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists organizations located in one building.
    pub fn by_building(&self, building_id: BuildingId) -> DirectoryResult<Vec<OrganizationDetails>> {
        observe("by_building", || {
            let organizations = self.repo.organizations_by_building(building_id)?;
            self.resolve_all(organizations)
        })
    }

    /// Lists organizations linked to an activity or to one of its descendants.
    ///
    /// Descendants are collected with [`ActivityForest::descendant_ids`], so
    /// the search reaches at most two levels below `activity_id`.
    pub fn by_activity(&self, activity_id: ActivityId) -> DirectoryResult<Vec<OrganizationDetails>> {
        observe("by_activity", || {
            let forest = ActivityForest::load(&self.repo)?;
            let activity_ids = forest.descendant_ids(activity_id);
            debug!(
                "event=activity_descendants module=service activity_id={} count={}",
                activity_id,
                activity_ids.len()
            );
            let organization_ids = self.repo.organization_ids_for_activities(&activity_ids)?;
            let organizations = self.repo.organizations_by_ids(&organization_ids)?;
            self.resolve_all(organizations)
        })
    }

    /// Lists organizations whose building lies within the query radius.
    ///
    /// Results are grouped by building in store order.
    pub fn by_radius(&self, query: &RadiusQuery) -> DirectoryResult<Vec<OrganizationDetails>> {
        observe("by_radius", || {
            let mut organizations = Vec::new();
            for building in self.repo.list_buildings()? {
                if query.contains(&building) {
                    organizations.extend(self.repo.organizations_by_building(building.id)?);
                }
            }
            self.resolve_all(organizations)
        })
    }

    /// Loads one organization by id.
    pub fn by_id(&self, organization_id: OrganizationId) -> DirectoryResult<OrganizationDetails> {
        let started_at = Instant::now();
        let organization = self
            .repo
            .get_organization(organization_id)?
            .ok_or(DirectoryError::OrganizationNotFound(organization_id))?;
        let details = self.resolve(organization, &mut HashMap::new())?;
        debug!(
            "event=directory_query module=service op=by_id status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(details)
    }

    /// Lists organizations whose name contains `needle`, ignoring case.
    ///
    /// An empty needle matches every organization.
    pub fn by_name(&self, needle: &str) -> DirectoryResult<Vec<OrganizationDetails>> {
        observe("by_name", || {
            let organizations = self.repo.search_organizations_by_name(needle)?;
            self.resolve_all(organizations)
        })
    }

    /// Renders the activity taxonomy as a flat pre-order listing.
    pub fn activity_tree(&self, max_depth: u32) -> DirectoryResult<Vec<Activity>> {
        observe("activity_tree", || {
            let forest = ActivityForest::load(&self.repo)?;
            Ok(forest.render(max_depth))
        })
    }

    fn resolve_all(
        &self,
        organizations: Vec<Organization>,
    ) -> DirectoryResult<Vec<OrganizationDetails>> {
        let mut buildings = HashMap::new();
        organizations
            .into_iter()
            .map(|organization| self.resolve(organization, &mut buildings))
            .collect()
    }

    fn resolve(
        &self,
        organization: Organization,
        buildings: &mut HashMap<BuildingId, Option<Building>>,
    ) -> DirectoryResult<OrganizationDetails> {
        let building = match organization.building_id {
            Some(building_id) => match buildings.get(&building_id) {
                Some(cached) => cached.clone(),
                None => {
                    let loaded = self.repo.get_building(building_id)?;
                    buildings.insert(building_id, loaded.clone());
                    loaded
                }
            },
            None => None,
        };
        let activities = self.repo.activities_for_organization(organization.id)?;

        Ok(OrganizationDetails {
            id: organization.id,
            name: organization.name,
            phones: organization.phones,
            building,
            activities,
        })
    }
}

fn observe<T>(
    op: &'static str,
    run: impl FnOnce() -> DirectoryResult<Vec<T>>,
) -> DirectoryResult<Vec<T>> {
    let started_at = Instant::now();
    match run() {
        Ok(items) => {
            debug!(
                "event=directory_query module=service op={} status=ok count={} duration_ms={}",
                op,
                items.len(),
                started_at.elapsed().as_millis()
            );
            Ok(items)
        }
        Err(err) => {
            error!(
                "event=directory_query module=service op={} status=error duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
