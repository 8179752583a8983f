//! Business assistant endpoint.

use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::chat::{ChatContext, ChatError, ChatStats};
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::extract::JsonBody;
use crate::state::AppState;
use laundry_core::Capability;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub stats: ChatStats,
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    user: CurrentUser,
    JsonBody(request): JsonBody<ChatRequest>,
) -> ApiResult<ChatReply> {
    user.require(Capability::GenerateReports)?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("Message is required"));
    }
    if !state.chat.is_configured() {
        return Err(ChatError::NotConfigured.into());
    }

    let details = state.db.transactions().list_all().await?;
    let total_members = state.db.members().count().await?;
    let total_outlets = state.db.outlets().count().await?;
    let total_packages = state.db.packages().count().await?;

    let context = ChatContext::build(&details, total_members, total_outlets, total_packages, Utc::now());
    let reply = state.chat.generate(&context.render_preamble(), message).await?;

    Ok(ApiResponse::ok(ChatReply {
        message: reply,
        stats: context.stats,
    }))
}
