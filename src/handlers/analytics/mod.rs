use axum::{Json, extract::State};
use axum_macros::debug_handler;
use chrono::Utc;

use crate::{analytics, analytics::AnalyticsReport, auth::CurrentUser, error::AppResult, state::AppState};

#[utoipa::path(
    get,
    path = "/analytics",
    responses(
        (status = 200, description = "Descriptive statistics over the current user's notes", body = AnalyticsReport),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Storage unavailable")
    ),
    tag = "analytics"
)]
#[debug_handler]
pub async fn get_analytics(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<AnalyticsReport>> {
    let notes = state.service.list_notes(user.id).await?;
    Ok(Json(analytics::analyze(&notes, Utc::now())))
}
