use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use orgdir_core::{ActivityId, BuildingId, OrganizationDetails, OrganizationId, RadiusQuery};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LocationParams {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
}

#[derive(Deserialize)]
pub struct NameParams {
    pub name: String,
}

/// GET /organizations/by_building/{building_id}
pub async fn by_building(
    State(app): State<AppState>,
    building_id: Result<Path<BuildingId>, PathRejection>,
) -> Result<Json<Vec<OrganizationDetails>>, ApiError> {
    let Path(building_id) = building_id?;
    let organizations = app
        .query(move |service| service.by_building(building_id))
        .await?;
    Ok(Json(organizations))
}

/// GET /organizations/by_activity/{activity_id}
pub async fn by_activity(
    State(app): State<AppState>,
    activity_id: Result<Path<ActivityId>, PathRejection>,
) -> Result<Json<Vec<OrganizationDetails>>, ApiError> {
    let Path(activity_id) = activity_id?;
    let organizations = app
        .query(move |service| service.by_activity(activity_id))
        .await?;
    Ok(Json(organizations))
}

/// GET /organizations/by_location?lat=<f64>&lon=<f64>&radius=<f64>
///
/// Input is validated before a store handle is opened.
pub async fn by_location(
    State(app): State<AppState>,
    params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<Vec<OrganizationDetails>>, ApiError> {
    let Query(params) = params?;
    let query = RadiusQuery::new(params.lat, params.lon, params.radius)?;
    let organizations = app.query(move |service| service.by_radius(&query)).await?;
    Ok(Json(organizations))
}

/// GET /organizations/search?name=<substring>
pub async fn search(
    State(app): State<AppState>,
    params: Result<Query<NameParams>, QueryRejection>,
) -> Result<Json<Vec<OrganizationDetails>>, ApiError> {
    let Query(params) = params?;
    let organizations = app
        .query(move |service| service.by_name(&params.name))
        .await?;
    Ok(Json(organizations))
}

/// GET /organizations/{org_id}
pub async fn get_organization(
    State(app): State<AppState>,
    org_id: Result<Path<OrganizationId>, PathRejection>,
) -> Result<Json<OrganizationDetails>, ApiError> {
    let Path(org_id) = org_id?;
    let organization = app.query(move |service| service.by_id(org_id)).await?;
    Ok(Json(organization))
}
