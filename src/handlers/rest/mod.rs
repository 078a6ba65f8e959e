use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use crate::{
    auth::CurrentUser,
    dto::{
        AutoSaveRequest, AutoSaveResponse, CreateNoteRequest, GenerateTagsResponse,
        LogoutResponse, NoteResponse, NoteSummaryResponse, UpdateNoteRequest, UpdateNoteResponse,
    },
    error::AppResult,
    state::AppState,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        dashboard,
        create_note,
        edit_note,
        update_note,
        delete_note,
        auto_save,
        logout,
        crate::handlers::ai::generate_tags,
        crate::handlers::analytics::get_analytics,
    ),
    components(schemas(
        NoteResponse,
        NoteSummaryResponse,
        CreateNoteRequest,
        UpdateNoteRequest,
        UpdateNoteResponse,
        AutoSaveRequest,
        AutoSaveResponse,
        GenerateTagsResponse,
        LogoutResponse,
        crate::analytics::AnalyticsReport,
        crate::analytics::ContentAnalysis,
        crate::analytics::WordFrequency,
        crate::analytics::TopicWeight,
        crate::analytics::TagFrequency,
        crate::analytics::DailyActivity,
        crate::analytics::RecentNote,
    )),
    tags(
        (name = "notes", description = "Notes management API"),
        (name = "ai", description = "AI summarize/improve/tag operations"),
        (name = "analytics", description = "Per-user note statistics"),
        (name = "auth", description = "Session handling")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Notes of the current user, most recently updated first", body = Vec<NoteSummaryResponse>),
        (status = 401, description = "Not authenticated")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<NoteSummaryResponse>>> {
    let notes = state.service.list_notes(user.id).await?;
    Ok(Json(notes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Validation failed"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<NoteResponse>)> {
    let note = state.service.create_note(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

#[utoipa::path(
    get,
    path = "/notes/{id}/edit",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Full note for the edit view", body = NoteResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn edit_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<NoteResponse>> {
    let note = state.service.get_owned_note(user.id, id).await?;
    Ok(Json(note.into()))
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = UpdateNoteResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNoteRequest>,
) -> AppResult<Json<UpdateNoteResponse>> {
    let note = state.service.update_note(user.id, id, payload).await?;
    Ok(Json(UpdateNoteResponse {
        message: "Note saved successfully".to_string(),
        note: note.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted successfully"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.service.delete_note(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/notes/{id}/auto-save",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = AutoSaveRequest,
    responses(
        (status = 200, description = "Partial save acknowledged", body = AutoSaveResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn auto_save(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AutoSaveRequest>,
) -> AppResult<Json<AutoSaveResponse>> {
    state.service.auto_save(user.id, id, payload).await?;
    Ok(Json(AutoSaveResponse {
        status: "saved".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session terminated", body = LogoutResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
#[debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<LogoutResponse>> {
    state.service.logout(&user.session_token).await?;
    Ok(Json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}
