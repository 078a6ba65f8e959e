use crate::{
    dto::{AutoSaveRequest, CreateNoteRequest, UpdateNoteRequest},
    error::{AppError, AppResult, FieldError},
    metrics,
    models::{Note, User},
    repository::Repository,
};

use std::sync::Arc;

const TITLE_MAX_LENGTH: usize = 255;

/// Note operations with validation, ownership checks and word-metric
/// recomputation. Every operation takes the acting user's id explicitly;
/// there is no ambient authentication state.
#[derive(Clone)]
pub struct NoteService {
    repo: Arc<tokio::sync::Mutex<Repository>>,
}

impl NoteService {
    pub const fn new(repo: Arc<tokio::sync::Mutex<Repository>>) -> Self {
        Self { repo }
    }

    pub async fn create_note(&self, user_id: i64, request: CreateNoteRequest) -> AppResult<Note> {
        validate_fields(Some(&request.title), Some(&request.content), true)?;

        let word_count = metrics::word_count(&request.content);
        let reading_time = metrics::reading_time(word_count);

        let note = self
            .repo
            .lock()
            .await
            .create_note(
                user_id,
                request.title.trim(),
                &request.content,
                word_count,
                reading_time,
            )
            .await?;

        Ok(note)
    }

    /// Single ownership-checked read; backs the edit view and the AI
    /// endpoints.
    pub async fn get_owned_note(&self, user_id: i64, id: i64) -> AppResult<Note> {
        let note = self
            .repo
            .lock()
            .await
            .get_note(id)
            .await?
            .ok_or(AppError::NotFound { entity: "note", id })?;

        ensure_owner(&note, user_id)?;

        Ok(note)
    }

    pub async fn update_note(
        &self,
        user_id: i64,
        id: i64,
        request: UpdateNoteRequest,
    ) -> AppResult<Note> {
        validate_fields(request.title.as_deref(), request.content.as_deref(), false)?;

        let note = self.get_owned_note(user_id, id).await?;
        let merged = merge_note(note, request.title, request.content, request.tags);

        self.persist(merged).await
    }

    /// Debounced partial save; only title and content may change.
    pub async fn auto_save(
        &self,
        user_id: i64,
        id: i64,
        request: AutoSaveRequest,
    ) -> AppResult<Note> {
        validate_fields(request.title.as_deref(), request.content.as_deref(), false)?;

        let note = self.get_owned_note(user_id, id).await?;
        let merged = merge_note(note, request.title, request.content, None);

        self.persist(merged).await
    }

    pub async fn delete_note(&self, user_id: i64, id: i64) -> AppResult<()> {
        self.get_owned_note(user_id, id).await?;

        let deleted = self.repo.lock().await.delete_note(id).await?;
        if !deleted {
            return Err(AppError::NotFound { entity: "note", id });
        }

        Ok(())
    }

    /// All of the user's notes, most recently updated first.
    pub async fn list_notes(&self, user_id: i64) -> AppResult<Vec<Note>> {
        Ok(self.repo.lock().await.list_notes(user_id).await?)
    }

    /// Write-back for a completed streamed summary.
    pub async fn save_summary(&self, user_id: i64, id: i64, summary: &str) -> AppResult<()> {
        self.get_owned_note(user_id, id).await?;

        let updated = self.repo.lock().await.set_summary(id, summary).await?;
        if !updated {
            return Err(AppError::NotFound { entity: "note", id });
        }

        Ok(())
    }

    /// Write-back for generated tags.
    pub async fn save_tags(&self, user_id: i64, id: i64, tags: &[String]) -> AppResult<()> {
        self.get_owned_note(user_id, id).await?;

        let updated = self.repo.lock().await.set_tags(id, tags).await?;
        if !updated {
            return Err(AppError::NotFound { entity: "note", id });
        }

        Ok(())
    }

    pub async fn user_by_session(&self, token: &str) -> AppResult<Option<User>> {
        Ok(self.repo.lock().await.user_by_session(token).await?)
    }

    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.repo.lock().await.delete_session(token).await?;
        Ok(())
    }

    async fn persist(&self, note: Note) -> AppResult<Note> {
        let id = note.id;
        self.repo
            .lock()
            .await
            .save_note(
                id,
                &note.title,
                &note.content,
                note.tags.as_ref(),
                note.word_count,
                note.reading_time,
            )
            .await?
            .ok_or(AppError::NotFound { entity: "note", id })
    }
}

/// Merges partial input into an existing note, recomputing word metrics
/// only when the content actually changes.
fn merge_note(
    mut note: Note,
    title: Option<String>,
    content: Option<String>,
    tags: Option<Vec<String>>,
) -> Note {
    if let Some(title) = title {
        note.title = title.trim().to_string();
    }
    if let Some(content) = content {
        note.word_count = metrics::word_count(&content);
        note.reading_time = metrics::reading_time(note.word_count);
        note.content = content;
    }
    if let Some(tags) = tags {
        note.tags = Some(tags);
    }
    note
}

/// Ownership never transfers; any caller other than the owner is rejected.
fn ensure_owner(note: &Note, user_id: i64) -> AppResult<()> {
    if note.user_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have access to this note".to_string(),
        ))
    }
}

/// Field-by-field validation. With `require_all` set (create), missing
/// fields are rejected; otherwise (partial update) only provided fields are
/// checked.
fn validate_fields(
    title: Option<&str>,
    content: Option<&str>,
    require_all: bool,
) -> AppResult<()> {
    let mut errors = Vec::new();

    match title {
        Some(t) if t.trim().is_empty() => errors.push(FieldError {
            field: "title",
            message: "The title field is required".to_string(),
        }),
        Some(t) if t.chars().count() > TITLE_MAX_LENGTH => errors.push(FieldError {
            field: "title",
            message: format!("The title may not be greater than {TITLE_MAX_LENGTH} characters"),
        }),
        None if require_all => errors.push(FieldError {
            field: "title",
            message: "The title field is required".to_string(),
        }),
        _ => {}
    }

    match content {
        Some(c) if c.trim().is_empty() => errors.push(FieldError {
            field: "content",
            message: "The content field is required".to_string(),
        }),
        None if require_all => errors.push(FieldError {
            field: "content",
            message: "The content field is required".to_string(),
        }),
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
