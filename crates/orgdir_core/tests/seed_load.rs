use orgdir_core::db::open_db_in_memory;
use orgdir_core::{load_seed, load_seed_file, Building, Organization, SeedData, SeedError};
use std::io::Write;

#[test]
fn seed_file_loads_all_collections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "buildings": [{{"id": 1, "address": "Lenina 1", "lat": 55.7, "lon": 37.6}}],
            "activities": [
                {{"id": 1, "name": "Food", "parent_id": null}},
                {{"id": 2, "name": "Meat", "parent_id": 1}}
            ],
            "organizations": [
                {{"id": 1, "name": "Horns and Hooves", "phones": "2-222-222", "building_id": 1}}
            ],
            "organization_activities": [
                {{"id": 1, "organization_id": 1, "activity_id": 2}}
            ]
        }}"#
    )
    .unwrap();

    let mut conn = open_db_in_memory().unwrap();
    let rows = load_seed_file(&mut conn, file.path()).unwrap();
    assert_eq!(rows, 5);

    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM organization_activities;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(links, 1);
}

#[test]
fn seed_refuses_non_empty_store() {
    let mut conn = open_db_in_memory().unwrap();
    let seed = SeedData {
        buildings: vec![Building {
            id: 1,
            address: "Lenina 1".to_string(),
            lat: None,
            lon: None,
        }],
        ..SeedData::default()
    };
    load_seed(&mut conn, &seed).unwrap();

    let err = load_seed(&mut conn, &seed).unwrap_err();
    assert!(matches!(err, SeedError::StoreNotEmpty));
}

#[test]
fn seed_with_dangling_reference_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let seed = SeedData {
        organizations: vec![Organization {
            id: 1,
            name: "Nowhere Inc".to_string(),
            phones: String::new(),
            building_id: Some(42),
        }],
        ..SeedData::default()
    };

    let err = load_seed(&mut conn, &seed).unwrap_err();
    assert!(matches!(err, SeedError::Db(_)));

    let organizations: i64 = conn
        .query_row("SELECT COUNT(*) FROM organizations;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(organizations, 0);
}

#[test]
fn seed_file_rejects_unknown_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"warehouses": []}}"#).unwrap();

    let mut conn = open_db_in_memory().unwrap();
    let err = load_seed_file(&mut conn, file.path()).unwrap_err();
    assert!(matches!(err, SeedError::Parse(_)));
}

#[test]
fn seed_file_reports_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = open_db_in_memory().unwrap();

    let err = load_seed_file(&mut conn, dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SeedError::Io { .. }));
}
