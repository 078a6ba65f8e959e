//! AI endpoints: the streaming relay for summarize/improve and the
//! synchronous tag generator.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use futures::{Stream, StreamExt};
use serde_json::json;

use crate::{
    ai::FragmentStream,
    auth::CurrentUser,
    dto::GenerateTagsResponse,
    error::AppResult,
    service::NoteService,
    state::AppState,
};

/// Which generation the relay is carrying; selects the terminal payload key
/// and the error prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayKind {
    Summary,
    Improved,
}

impl RelayKind {
    const fn error_prefix(self) -> &'static str {
        match self {
            Self::Summary => "Failed to generate summary",
            Self::Improved => "Failed to improve content",
        }
    }
}

/// Write-back performed when the stream completes.
struct Persist {
    service: Arc<NoteService>,
    user_id: i64,
    note_id: i64,
}

#[utoipa::path(
    post,
    path = "/notes/{id}/ai/summarize",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Event stream of summary fragments; terminal event carries \
            the full summary, which is persisted to the note", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found")
    ),
    tag = "ai"
)]
#[debug_handler]
pub async fn summarize(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let note = state.service.get_owned_note(user.id, id).await?;
    let fragments = state.gateway.summarize_stream(&note.content).await;

    let persist = Persist {
        service: state.service.clone(),
        user_id: user.id,
        note_id: id,
    };

    Ok(relay(fragments, RelayKind::Summary, Some(persist)))
}

#[utoipa::path(
    post,
    path = "/notes/{id}/ai/improve",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Event stream of rewrite fragments; terminal event carries \
            the full improved text (not persisted)", body = String, content_type = "text/event-stream"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found")
    ),
    tag = "ai"
)]
#[debug_handler]
pub async fn improve(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let note = state.service.get_owned_note(user.id, id).await?;
    let fragments = state.gateway.improve_stream(&note.content).await;

    Ok(relay(fragments, RelayKind::Improved, None))
}

#[utoipa::path(
    post,
    path = "/notes/{id}/ai/tags",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Tags generated and persisted", body = GenerateTagsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own the note"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Tag generation failed")
    ),
    tag = "ai"
)]
#[debug_handler]
pub async fn generate_tags(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    match generate_and_store_tags(&state, user.id, id).await {
        Ok(tags) => (
            StatusCode::OK,
            Json(GenerateTagsResponse {
                success: true,
                message: "Tags generated successfully".to_string(),
                tags,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("tag generation failed for note {id}: {e}");
            (
                e.status_code(),
                Json(json!({
                    "success": false,
                    "message": format!("Failed to generate tags: {e}"),
                })),
            )
                .into_response()
        }
    }
}

async fn generate_and_store_tags(
    state: &AppState,
    user_id: i64,
    note_id: i64,
) -> AppResult<Vec<String>> {
    let note = state.service.get_owned_note(user_id, note_id).await?;

    let tags = state
        .gateway
        .generate_tags(&format!("{} {}", note.title, note.content))
        .await;

    state.service.save_tags(user_id, note_id, &tags).await?;

    Ok(tags)
}

/// Wraps the payload stream into an SSE response.
fn relay(
    fragments: FragmentStream,
    kind: RelayKind,
    persist: Option<Persist>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    Sse::new(
        relay_payloads(fragments, kind, persist).map(|payload| Ok(Event::default().data(payload))),
    )
}

/// The relay itself: one `{"content": ...}` payload per non-empty fragment
/// in gateway order, then either a terminal `{"complete": true, ...}`
/// payload carrying the exact concatenation of everything emitted, or a
/// single terminal `{"error": ...}` payload. The write-back, when present,
/// happens before the complete event and suppresses it on failure.
fn relay_payloads(
    mut fragments: FragmentStream,
    kind: RelayKind,
    persist: Option<Persist>,
) -> impl Stream<Item = String> {
    async_stream::stream! {
        let mut full = String::new();

        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    full.push_str(&fragment);
                    yield fragment_payload(&fragment);
                }
                Err(e) => {
                    tracing::error!("generation stream failed: {e}");
                    yield error_payload(kind, &e.to_string());
                    return;
                }
            }
        }

        if let Some(p) = persist {
            if let Err(e) = p.service.save_summary(p.user_id, p.note_id, &full).await {
                tracing::error!("failed to persist summary for note {}: {e}", p.note_id);
                yield error_payload(kind, &e.to_string());
                return;
            }
        }

        yield complete_payload(kind, &full);
    }
}

fn fragment_payload(fragment: &str) -> String {
    json!({ "content": fragment }).to_string()
}

fn complete_payload(kind: RelayKind, full: &str) -> String {
    match kind {
        RelayKind::Summary => json!({ "complete": true, "summary": full }),
        RelayKind::Improved => json!({ "complete": true, "improved": full }),
    }
    .to_string()
}

fn error_payload(kind: RelayKind, detail: &str) -> String {
    json!({ "error": format!("{}: {detail}", kind.error_prefix()) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::openai::ProviderError;

    fn fragments(items: Vec<Result<&'static str, ProviderError>>) -> FragmentStream {
        Box::pin(futures::stream::iter(
            items.into_iter().map(|r| r.map(String::from)),
        ))
    }

    #[test]
    fn payload_shapes_match_the_wire_contract() {
        assert_eq!(fragment_payload("hi"), r#"{"content":"hi"}"#);

        let complete: serde_json::Value =
            serde_json::from_str(&complete_payload(RelayKind::Summary, "full text")).unwrap();
        assert_eq!(complete["complete"], true);
        assert_eq!(complete["summary"], "full text");

        let complete: serde_json::Value =
            serde_json::from_str(&complete_payload(RelayKind::Improved, "better")).unwrap();
        assert_eq!(complete["improved"], "better");

        let error: serde_json::Value =
            serde_json::from_str(&error_payload(RelayKind::Summary, "boom")).unwrap();
        assert_eq!(error["error"], "Failed to generate summary: boom");
    }

    #[tokio::test]
    async fn terminal_event_carries_exact_fragment_concatenation() {
        let stream = fragments(vec![Ok("Hello "), Ok(""), Ok("streaming "), Ok("world")]);
        let payloads: Vec<String> = relay_payloads(stream, RelayKind::Improved, None)
            .collect()
            .await;

        // Empty fragment skipped; order preserved.
        assert_eq!(payloads.len(), 4);
        assert_eq!(payloads[0], r#"{"content":"Hello "}"#);
        assert_eq!(payloads[1], r#"{"content":"streaming "}"#);
        assert_eq!(payloads[2], r#"{"content":"world"}"#);

        let emitted: String = payloads[..3]
            .iter()
            .map(|p| {
                let v: serde_json::Value = serde_json::from_str(p).unwrap();
                v["content"].as_str().unwrap().to_string()
            })
            .collect();

        let terminal: serde_json::Value = serde_json::from_str(&payloads[3]).unwrap();
        assert_eq!(terminal["complete"], true);
        assert_eq!(terminal["improved"], emitted);
        assert_eq!(terminal["improved"], "Hello streaming world");
    }

    #[tokio::test]
    async fn mid_stream_error_ends_with_single_error_event() {
        let stream = fragments(vec![Ok("partial"), Err(ProviderError::MissingContent)]);
        let payloads: Vec<String> = relay_payloads(stream, RelayKind::Summary, None)
            .collect()
            .await;

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0], r#"{"content":"partial"}"#);

        let terminal: serde_json::Value = serde_json::from_str(&payloads[1]).unwrap();
        assert!(terminal["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to generate summary:"));
        // No complete event after an error.
        assert!(terminal.get("complete").is_none());
    }

    #[tokio::test]
    async fn empty_stream_still_completes() {
        let payloads: Vec<String> = relay_payloads(fragments(vec![]), RelayKind::Improved, None)
            .collect()
            .await;

        assert_eq!(payloads.len(), 1);
        let terminal: serde_json::Value = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(terminal["complete"], true);
        assert_eq!(terminal["improved"], "");
    }
}
