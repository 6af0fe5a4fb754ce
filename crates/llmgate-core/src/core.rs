use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::gateway::Gateway;
use crate::handler::{channel_models_handler, chat_completions_handler, models_handler};

pub struct CoreState {
    pub gateway: Gateway,
}

pub struct Core {
    state: Arc<CoreState>,
}

impl Core {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            state: Arc::new(CoreState { gateway }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1/chat/completions", post(chat_completions_handler))
            .route("/v1/models", get(models_handler))
            .route("/v1/channels/{id}/models", get(channel_models_handler))
            .with_state(self.state.clone())
    }

    pub fn state(&self) -> Arc<CoreState> {
        self.state.clone()
    }
}
