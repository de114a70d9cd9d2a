//! Bulk seed loading for an empty directory store.
//!
//! # Responsibility
//! - Parse a JSON seed document with the four directory collections.
//! - Insert the whole document atomically into a freshly migrated database.
//!
//! # Invariants
//! - Seeding only runs against an empty store; it never updates rows.
//! - Either every row is inserted or none is (single transaction, foreign
//!   keys checked at commit).

use crate::db::DbError;
use crate::model::activity::Activity;
use crate::model::building::Building;
use crate::model::organization::{Organization, OrganizationActivity};
use log::{error, info};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Seed document loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub organization_activities: Vec<OrganizationActivity>,
}

impl SeedData {
    /// Total number of rows described by this document.
    pub fn row_count(&self) -> usize {
        self.buildings.len()
            + self.activities.len()
            + self.organizations.len()
            + self.organization_activities.len()
    }
}

/// Errors from seed loading.
#[derive(Debug)]
pub enum SeedError {
    /// Seed file cannot be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Seed file is not a valid seed document.
    Parse(serde_json::Error),
    /// Target store already holds directory rows.
    StoreNotEmpty,
    /// Underlying SQLite error, including foreign key violations at commit.
    Db(DbError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read seed file `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid seed document: {err}"),
            Self::StoreNotEmpty => write!(f, "directory store is not empty; refusing to seed"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::StoreNotEmpty => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Reads and parses a seed document, then loads it with [`load_seed`].
pub fn load_seed_file(conn: &mut Connection, path: impl AsRef<Path>) -> Result<usize, SeedError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data: SeedData = serde_json::from_str(&raw)?;
    load_seed(conn, &data)
}

/// Inserts `data` into an empty, migrated store and returns the row count.
///
/// # Errors
/// - `StoreNotEmpty` when any directory table already has rows.
/// - `Db` on constraint violations; nothing is written in that case.
pub fn load_seed(conn: &mut Connection, data: &SeedData) -> Result<usize, SeedError> {
    if !store_is_empty(conn)? {
        return Err(SeedError::StoreNotEmpty);
    }

    match insert_all(conn, data) {
        Ok(()) => {
            info!(
                "event=seed_load module=seed status=ok buildings={} activities={} organizations={} links={}",
                data.buildings.len(),
                data.activities.len(),
                data.organizations.len(),
                data.organization_activities.len()
            );
            Ok(data.row_count())
        }
        Err(err) => {
            error!("event=seed_load module=seed status=error error={err}");
            Err(err)
        }
    }
}

fn insert_all(conn: &mut Connection, data: &SeedData) -> Result<(), SeedError> {
    let tx = conn.transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO buildings (id, address, lat, lon) VALUES (?1, ?2, ?3, ?4);")?;
        for building in &data.buildings {
            stmt.execute(params![
                building.id,
                building.address.as_str(),
                building.lat,
                building.lon
            ])?;
        }

        let mut stmt =
            tx.prepare("INSERT INTO activities (id, name, parent_id) VALUES (?1, ?2, ?3);")?;
        for activity in &data.activities {
            stmt.execute(params![activity.id, activity.name.as_str(), activity.parent_id])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO organizations (id, name, phones, building_id) VALUES (?1, ?2, ?3, ?4);",
        )?;
        for organization in &data.organizations {
            stmt.execute(params![
                organization.id,
                organization.name.as_str(),
                organization.phones.as_str(),
                organization.building_id
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO organization_activities (id, organization_id, activity_id)
             VALUES (?1, ?2, ?3);",
        )?;
        for link in &data.organization_activities {
            stmt.execute(params![link.id, link.organization_id, link.activity_id])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn store_is_empty(conn: &Connection) -> Result<bool, SeedError> {
    let has_rows: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM buildings)
             OR EXISTS(SELECT 1 FROM activities)
             OR EXISTS(SELECT 1 FROM organizations)
             OR EXISTS(SELECT 1 FROM organization_activities);",
        [],
        |row| row.get(0),
    )?;
    Ok(has_rows == 0)
}
