use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// One failed validation rule, reported field-by-field to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Application-level error for HTTP handlers and the service layer.
///
/// Implements [`IntoResponse`] so handlers can propagate with `?` and still
/// produce a consistent JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for handler and service return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::NotFound { entity, id } => json!({
                "error": format!("{entity} with id {id} not found"),
                "code": "NOT_FOUND",
            }),
            Self::Validation(fields) => {
                let errors: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|f| (f.field.to_string(), json!(f.message)))
                    .collect();
                json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "errors": errors,
                })
            }
            Self::Unauthorized(msg) => json!({ "error": msg, "code": "UNAUTHORIZED" }),
            Self::Forbidden(msg) => json!({ "error": msg, "code": "FORBIDDEN" }),
            Self::Database(e) => {
                tracing::error!("database error: {e}");
                json!({ "error": "An internal error occurred", "code": "INTERNAL_ERROR" })
            }
            Self::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                json!({ "error": "An internal error occurred", "code": "INTERNAL_ERROR" })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        let not_found = AppError::NotFound { entity: "note", id: 7 };
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let forbidden = AppError::Forbidden("not the owner".into());
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let validation = AppError::Validation(vec![FieldError {
            field: "title",
            message: "The title field is required".into(),
        }]);
        assert_eq!(validation.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
