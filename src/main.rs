mod ai;
mod analytics;
mod auth;
mod dto;
mod error;
mod handlers;
mod metrics;
mod models;
mod repository;
mod service;
mod state;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use std::{env, sync::Arc};

use handlers::{ai as ai_handlers, analytics as analytics_handlers, rest};
use repository::Repository;

use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ai::{AiGateway, openai::OpenAiClient};
use service::NoteService;
use state::AppState;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Fetch env variables
    let database_dsn =
        env::var("PG_DSN").expect("database dsn must be provided as an ENV variable");
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let openai_api_key = env::var("OPENAI_API_KEY").ok();
    if openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, AI operations will serve fallback content");
    }
    let openai_base_url = env::var("OPENAI_BASE_URL").ok();
    let openai_model = env::var("OPENAI_MODEL").ok();

    // Repository creation and migration
    let repo = Repository::new(database_dsn).await.unwrap_or_else(|e| {
        tracing::error!("Failed to establish database connection: {e}");
        panic!("failed to establish database connection: {e}");
    });
    let repo_ptr = Arc::new(tokio::sync::Mutex::new(repo));

    repo_ptr.lock().await.migrate().await.unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    // Service and gateway creation
    let service = Arc::new(NoteService::new(repo_ptr.clone()));
    let gateway = Arc::new(AiGateway::new(OpenAiClient::new(
        openai_api_key,
        openai_base_url,
        openai_model,
    )));

    let app_state = AppState { service, gateway };

    let router = Router::new()
        .route("/", get(root))
        .route("/logout", post(rest::logout))
        .route("/dashboard", get(rest::dashboard))
        .route("/notes", post(rest::create_note))
        .route("/notes/{id}/edit", get(rest::edit_note))
        .route("/notes/{id}", put(rest::update_note))
        .route("/notes/{id}", delete(rest::delete_note))
        .route("/notes/{id}/auto-save", post(rest::auto_save))
        .route("/notes/{id}/ai/summarize", post(ai_handlers::summarize))
        .route("/notes/{id}/ai/improve", post(ai_handlers::improve))
        .route("/notes/{id}/ai/tags", post(ai_handlers::generate_tags))
        .route("/analytics", get(analytics_handlers::get_analytics))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let http_listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind {bind_addr}: {e}");
            panic!("failed to bind {bind_addr}: {e}");
        });
    let http_addr = http_listener
        .local_addr()
        .expect("listener has a local address");

    tracing::info!("Server starting, listening on {}", http_addr);
    tracing::info!("Server is ready to accept connections");

    if let Err(e) = axum::serve(http_listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}

async fn root() -> Response {
    (StatusCode::OK, "Hello world!").into_response()
}
