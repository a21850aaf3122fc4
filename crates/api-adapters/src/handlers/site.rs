//! Site settings endpoints.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use domains::SiteSettings;

use crate::error::ApiResult;
use crate::extract::Viewer;
use crate::state::AppState;

/// GET /site
pub async fn get_site(State(state): State<AppState>) -> ApiResult<Json<SiteSettings>> {
    Ok(Json(state.site.current().await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSiteRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub gravity: f64,
}

/// PUT /site
pub async fn update_site(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(request): Json<UpdateSiteRequest>,
) -> ApiResult<Json<SiteSettings>> {
    let caller_id = viewer.require("edit site settings")?;
    let saved = state
        .site
        .update(
            caller_id,
            SiteSettings {
                title: request.title,
                description: request.description,
                gravity: request.gravity,
            },
        )
        .await?;
    Ok(Json(saved))
}
