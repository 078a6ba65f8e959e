mod embedded;

use embedded::migrations;

use tokio_postgres::{Client, NoTls, Row};

use crate::models::{Note, User};

const NOTE_COLUMNS: &str =
    "id, user_id, title, content, tags, ai_summary, word_count, reading_time, created_at, updated_at";

pub struct Repository {
    client: Client,
}

impl Repository {
    pub async fn new(database_dsn: String) -> Result<Self, tokio_postgres::Error> {
        let (client, con) = tokio_postgres::connect(&database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), refinery::Error> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }

    pub async fn create_note(
        &self,
        user_id: i64,
        title: &str,
        content: &str,
        word_count: i32,
        reading_time: i32,
    ) -> Result<Note, tokio_postgres::Error> {
        let query = format!(
            "INSERT INTO notes (user_id, title, content, word_count, reading_time) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {NOTE_COLUMNS}"
        );
        let row = self
            .client
            .query_one(
                query.as_str(),
                &[&user_id, &title, &content, &word_count, &reading_time],
            )
            .await?;

        Ok(note_from_row(&row))
    }

    /// Full-row update; the service merges partial input before calling.
    pub async fn save_note(
        &self,
        id: i64,
        title: &str,
        content: &str,
        tags: Option<&Vec<String>>,
        word_count: i32,
        reading_time: i32,
    ) -> Result<Option<Note>, tokio_postgres::Error> {
        let tags_json = tags.map(|t| serde_json::json!(t));
        let query = format!(
            "UPDATE notes SET title = $1, content = $2, tags = $3, word_count = $4, \
             reading_time = $5, updated_at = now() WHERE id = $6 RETURNING {NOTE_COLUMNS}"
        );
        let row = self
            .client
            .query_opt(
                query.as_str(),
                &[&title, &content, &tags_json, &word_count, &reading_time, &id],
            )
            .await?;

        Ok(row.map(|row| note_from_row(&row)))
    }

    pub async fn set_summary(
        &self,
        id: i64,
        summary: &str,
    ) -> Result<bool, tokio_postgres::Error> {
        let rows = self
            .client
            .execute(
                "UPDATE notes SET ai_summary = $1, updated_at = now() WHERE id = $2",
                &[&summary, &id],
            )
            .await?;

        Ok(rows == 1)
    }

    pub async fn set_tags(
        &self,
        id: i64,
        tags: &[String],
    ) -> Result<bool, tokio_postgres::Error> {
        let tags_json = serde_json::json!(tags);
        let rows = self
            .client
            .execute(
                "UPDATE notes SET tags = $1, updated_at = now() WHERE id = $2",
                &[&tags_json, &id],
            )
            .await?;

        Ok(rows == 1)
    }

    pub async fn delete_note(&self, id: i64) -> Result<bool, tokio_postgres::Error> {
        let rows = self
            .client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(rows == 1)
    }

    pub async fn get_note(&self, id: i64) -> Result<Option<Note>, tokio_postgres::Error> {
        let query = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");
        let row = self.client.query_opt(query.as_str(), &[&id]).await?;

        Ok(row.map(|row| note_from_row(&row)))
    }

    pub async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>, tokio_postgres::Error> {
        let query =
            format!("SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1 ORDER BY updated_at DESC");
        let rows = self.client.query(query.as_str(), &[&user_id]).await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    pub async fn user_by_session(
        &self,
        token: &str,
    ) -> Result<Option<User>, tokio_postgres::Error> {
        let row = self
            .client
            .query_opt(
                "SELECT u.id, u.name, u.email, u.avatar FROM users u \
                 JOIN sessions s ON s.user_id = u.id WHERE s.token = $1",
                &[&token],
            )
            .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            avatar: row.get("avatar"),
        }))
    }

    pub async fn delete_session(&self, token: &str) -> Result<bool, tokio_postgres::Error> {
        let rows = self
            .client
            .execute("DELETE FROM sessions WHERE token = $1", &[&token])
            .await?;

        Ok(rows == 1)
    }
}

fn note_from_row(row: &Row) -> Note {
    let tags: Option<serde_json::Value> = row.get("tags");

    Note {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        tags: tags.and_then(|v| serde_json::from_value(v).ok()),
        ai_summary: row.get("ai_summary"),
        word_count: row.get("word_count"),
        reading_time: row.get("reading_time"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
