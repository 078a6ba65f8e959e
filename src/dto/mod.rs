use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::metrics;
use crate::models::Note;

/// Length of the content preview shown on the dashboard.
const PREVIEW_LENGTH: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    /// New title, if changing
    pub title: Option<String>,
    /// New content, if changing
    pub content: Option<String>,
    /// New tag list, if changing
    pub tags: Option<Vec<String>>,
}

/// Debounced partial save from the editor; only title and content may move.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AutoSaveRequest {
    /// New title, if changed
    pub title: Option<String>,
    /// New content, if changed
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// Tags attached to the note
    pub tags: Option<Vec<String>>,
    /// Last AI-generated summary
    pub ai_summary: Option<String>,
    /// Word count of the content
    pub word_count: i32,
    /// Estimated reading time in minutes
    pub reading_time: i32,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Last modification instant
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            tags: note.tags,
            ai_summary: note.ai_summary,
            word_count: note.word_count,
            reading_time: note.reading_time,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Dashboard list entry: content is replaced by a short preview.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteSummaryResponse {
    /// Note ID
    pub id: i64,
    /// Note title
    pub title: String,
    /// Markup-stripped content preview
    pub content: String,
    /// Word count of the full content
    pub word_count: i32,
    /// Estimated reading time in minutes
    pub reading_time: i32,
    /// Tags attached to the note
    pub tags: Option<Vec<String>>,
    /// Last modification instant
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteSummaryResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: preview(&note.content),
            word_count: note.word_count,
            reading_time: note.reading_time,
            tags: note.tags,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteResponse {
    /// Human-readable confirmation
    pub message: String,
    /// The updated note
    pub note: NoteResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AutoSaveResponse {
    /// Always "saved" on success
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateTagsResponse {
    /// Whether tag generation succeeded
    pub success: bool,
    /// Human-readable status
    pub message: String,
    /// Generated tags, persisted to the note
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    /// Human-readable confirmation
    pub message: String,
}

fn preview(content: &str) -> String {
    let stripped = metrics::strip_markup(content);
    let trimmed = stripped.trim();
    let mut out: String = trimmed.chars().take(PREVIEW_LENGTH).collect();
    if trimmed.chars().count() > PREVIEW_LENGTH {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_not_truncated() {
        assert_eq!(preview("a short note"), "a short note");
    }

    #[test]
    fn long_content_gets_ellipsis() {
        let content = "x".repeat(200);
        let p = preview(&content);
        assert_eq!(p.chars().count(), PREVIEW_LENGTH + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_strips_markup() {
        assert_eq!(preview("<p>hello</p>"), "hello");
    }
}
