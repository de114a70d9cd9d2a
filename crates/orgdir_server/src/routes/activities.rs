use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use orgdir_core::{Activity, ActivityId, OrganizationDetails, DEFAULT_TREE_DEPTH};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    pub activity_id: ActivityId,
}

#[derive(Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<i64>,
}

impl TreeParams {
    /// Depth handed to the renderer: non-positive values render nothing and
    /// values past `u32::MAX` saturate.
    fn render_depth(&self) -> u32 {
        match self.max_depth {
            None => DEFAULT_TREE_DEPTH,
            Some(depth) => u32::try_from(depth.max(0)).unwrap_or(u32::MAX),
        }
    }
}

/// GET /activities/search?activity_id=<id>
///
/// Same result as `/organizations/by_activity/{activity_id}`.
pub async fn search(
    State(app): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<OrganizationDetails>>, ApiError> {
    let Query(params) = params?;
    let activity_id = params.activity_id;
    let organizations = app
        .query(move |service| service.by_activity(activity_id))
        .await?;
    Ok(Json(organizations))
}

/// GET /activities/tree?max_depth=<n>
pub async fn tree(
    State(app): State<AppState>,
    params: Result<Query<TreeParams>, QueryRejection>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    let Query(params) = params?;
    let max_depth = params.render_depth();
    let activities = app
        .query(move |service| service.activity_tree(max_depth))
        .await?;
    Ok(Json(activities))
}

#[cfg(test)]
mod tests {
    use super::TreeParams;
    use orgdir_core::DEFAULT_TREE_DEPTH;

    fn depth(max_depth: Option<i64>) -> u32 {
        TreeParams { max_depth }.render_depth()
    }

    #[test]
    fn missing_depth_uses_default() {
        assert_eq!(depth(None), DEFAULT_TREE_DEPTH);
    }

    #[test]
    fn non_positive_depth_renders_nothing() {
        assert_eq!(depth(Some(0)), 0);
        assert_eq!(depth(Some(-1)), 0);
        assert_eq!(depth(Some(i64::MIN)), 0);
    }

    #[test]
    fn oversized_depth_saturates() {
        assert_eq!(depth(Some(7)), 7);
        assert_eq!(depth(Some(i64::MAX)), u32::MAX);
    }
}
