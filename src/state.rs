use std::sync::Arc;

use crate::ai::AiGateway;
use crate::service::NoteService;

/// Shared handler state: the note service and the language-model gateway.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NoteService>,
    pub gateway: Arc<AiGateway>,
}
