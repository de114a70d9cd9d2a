//! Directory entity store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide predicate lookups over buildings, activities, organizations and
//!   organization-activity links.
//! - Keep SQL details and ordering behavior inside repository boundary.
//!
//! # Invariants
//! - Every listing is ordered by ascending `id` (the store's natural order).
//! - Empty results are valid and never reported as errors.
//! - The repository never writes.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::activity::{Activity, ActivityId};
use crate::model::building::{Building, BuildingId};
use crate::model::organization::{Organization, OrganizationId};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ORGANIZATION_SELECT_SQL: &str = "SELECT
    id,
    name,
    phones,
    building_id
FROM organizations";

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    name,
    parent_id
FROM activities";

const BUILDING_SELECT_SQL: &str = "SELECT
    id,
    address,
    lat,
    lon
FROM buildings";

/// Upper bound of bound parameters per `IN (...)` statement.
const MAX_IN_LIST_PARAMS: usize = 500;

const REQUIRED_TABLES: [&str; 4] = [
    "buildings",
    "activities",
    "organizations",
    "organization_activities",
];

/// Result type used by directory repository operations.
pub type DirectoryRepoResult<T> = Result<T, DirectoryRepoError>;

/// Errors from directory repository operations.
#[derive(Debug)]
pub enum DirectoryRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
}

impl Display for DirectoryRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "directory repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "directory repository requires table `{table}`")
            }
        }
    }
}

impl Error for DirectoryRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for DirectoryRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DirectoryRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read-only entity store interface.
pub trait DirectoryRepository {
    /// Lists organizations whose building reference equals `building_id`.
    fn organizations_by_building(
        &self,
        building_id: BuildingId,
    ) -> DirectoryRepoResult<Vec<Organization>>;
    /// Returns distinct organization ids linked to any of `activity_ids`.
    fn organization_ids_for_activities(
        &self,
        activity_ids: &[ActivityId],
    ) -> DirectoryRepoResult<Vec<OrganizationId>>;
    /// Lists organizations whose id is in `ids`.
    fn organizations_by_ids(&self, ids: &[OrganizationId])
        -> DirectoryRepoResult<Vec<Organization>>;
    /// Loads one organization by id.
    fn get_organization(&self, id: OrganizationId) -> DirectoryRepoResult<Option<Organization>>;
    /// Lists children of `parent_id`; `None` lists taxonomy roots.
    ///
    /// Single-level lookup. Multi-level walks load the whole taxonomy once
    /// through [`DirectoryRepository::list_activities`] instead.
    fn list_child_activities(
        &self,
        parent_id: Option<ActivityId>,
    ) -> DirectoryRepoResult<Vec<Activity>>;
    /// Lists every activity.
    fn list_activities(&self) -> DirectoryRepoResult<Vec<Activity>>;
    /// Lists activities linked to one organization.
    fn activities_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> DirectoryRepoResult<Vec<Activity>>;
    /// Lists every building.
    fn list_buildings(&self) -> DirectoryRepoResult<Vec<Building>>;
    /// Loads one building by id.
    fn get_building(&self, id: BuildingId) -> DirectoryRepoResult<Option<Building>>;
    /// Lists organizations whose name contains `needle`, ignoring case.
    fn search_organizations_by_name(&self, needle: &str)
        -> DirectoryRepoResult<Vec<Organization>>;
}

/// SQLite-backed directory repository.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> DirectoryRepoResult<Self> {
        ensure_directory_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn organizations_by_building(
        &self,
        building_id: BuildingId,
    ) -> DirectoryRepoResult<Vec<Organization>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORGANIZATION_SELECT_SQL}
             WHERE building_id = ?1
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([building_id])?;
        let mut organizations = Vec::new();
        while let Some(row) = rows.next()? {
            organizations.push(parse_organization_row(row)?);
        }
        Ok(organizations)
    }

    fn organization_ids_for_activities(
        &self,
        activity_ids: &[ActivityId],
    ) -> DirectoryRepoResult<Vec<OrganizationId>> {
        let mut organization_ids = BTreeSet::new();
        for chunk in sorted_unique_chunks(activity_ids) {
            let sql = format!(
                "SELECT DISTINCT organization_id
                 FROM organization_activities
                 WHERE activity_id IN ({});",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                organization_ids.insert(row.get::<_, OrganizationId>(0)?);
            }
        }
        Ok(organization_ids.into_iter().collect())
    }

    fn organizations_by_ids(
        &self,
        ids: &[OrganizationId],
    ) -> DirectoryRepoResult<Vec<Organization>> {
        let mut organizations = Vec::new();
        // Chunks are ascending and disjoint, so concatenation keeps id order.
        for chunk in sorted_unique_chunks(ids) {
            let sql = format!(
                "{ORGANIZATION_SELECT_SQL}
                 WHERE id IN ({})
                 ORDER BY id ASC;",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                organizations.push(parse_organization_row(row)?);
            }
        }
        Ok(organizations)
    }

    fn get_organization(&self, id: OrganizationId) -> DirectoryRepoResult<Option<Organization>> {
        let organization = self
            .conn
            .query_row(
                &format!("{ORGANIZATION_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| parse_organization_row(row),
            )
            .optional()?;
        Ok(organization)
    }

    fn list_child_activities(
        &self,
        parent_id: Option<ActivityId>,
    ) -> DirectoryRepoResult<Vec<Activity>> {
        let mut activities = Vec::new();
        if let Some(parent_id) = parent_id {
            let mut stmt = self.conn.prepare(&format!(
                "{ACTIVITY_SELECT_SQL}
                 WHERE parent_id = ?1
                 ORDER BY id ASC;"
            ))?;
            let mut rows = stmt.query([parent_id])?;
            while let Some(row) = rows.next()? {
                activities.push(parse_activity_row(row)?);
            }
        } else {
            let mut stmt = self.conn.prepare(&format!(
                "{ACTIVITY_SELECT_SQL}
                 WHERE parent_id IS NULL
                 ORDER BY id ASC;"
            ))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                activities.push(parse_activity_row(row)?);
            }
        }
        Ok(activities)
    }

    fn list_activities(&self) -> DirectoryRepoResult<Vec<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn activities_for_organization(
        &self,
        organization_id: OrganizationId,
    ) -> DirectoryRepoResult<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT
                a.id AS id,
                a.name AS name,
                a.parent_id AS parent_id
             FROM organization_activities oa
             JOIN activities a ON a.id = oa.activity_id
             WHERE oa.organization_id = ?1
             ORDER BY a.id ASC;",
        )?;
        let mut rows = stmt.query([organization_id])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn list_buildings(&self) -> DirectoryRepoResult<Vec<Building>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BUILDING_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut buildings = Vec::new();
        while let Some(row) = rows.next()? {
            buildings.push(parse_building_row(row)?);
        }
        Ok(buildings)
    }

    fn get_building(&self, id: BuildingId) -> DirectoryRepoResult<Option<Building>> {
        let building = self
            .conn
            .query_row(
                &format!("{BUILDING_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| parse_building_row(row),
            )
            .optional()?;
        Ok(building)
    }

    fn search_organizations_by_name(
        &self,
        needle: &str,
    ) -> DirectoryRepoResult<Vec<Organization>> {
        // SQLite `LIKE`/`lower()` only fold ASCII, so matching happens here
        // to keep Cyrillic and other scripts case-insensitive.
        let needle = needle.to_lowercase();
        let mut stmt = self
            .conn
            .prepare(&format!("{ORGANIZATION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut organizations = Vec::new();
        while let Some(row) = rows.next()? {
            let organization = parse_organization_row(row)?;
            if organization.name.to_lowercase().contains(needle.as_str()) {
                organizations.push(organization);
            }
        }
        Ok(organizations)
    }
}

fn parse_organization_row(row: &Row<'_>) -> rusqlite::Result<Organization> {
    Ok(Organization {
        id: row.get("id")?,
        name: row.get("name")?,
        phones: row.get::<_, Option<String>>("phones")?.unwrap_or_default(),
        building_id: row.get("building_id")?,
    })
}

fn parse_activity_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: row.get("id")?,
        name: row.get("name")?,
        parent_id: row.get("parent_id")?,
    })
}

fn parse_building_row(row: &Row<'_>) -> rusqlite::Result<Building> {
    Ok(Building {
        id: row.get("id")?,
        address: row.get("address")?,
        lat: row.get("lat")?,
        lon: row.get("lon")?,
    })
}

fn sorted_unique_chunks(ids: &[i64]) -> Vec<Vec<i64>> {
    let unique = ids.iter().copied().collect::<BTreeSet<_>>();
    unique
        .into_iter()
        .collect::<Vec<_>>()
        .chunks(MAX_IN_LIST_PARAMS)
        .map(<[i64]>::to_vec)
        .collect()
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn ensure_directory_connection_ready(conn: &Connection) -> DirectoryRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(DirectoryRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(DirectoryRepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DirectoryRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
