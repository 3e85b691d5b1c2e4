//! Generation endpoints: webhook proxy, round-trip save, history listing.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use postsmith_core::generator::{GenerationRequest, GenerationResponse};
use postsmith_core::models::GenerationRecord;
use postsmith_core::roundtrip::{self, GenerationMeta, SaveGeneration, SavedRoundTrip};

use crate::AppState;
use crate::error::ApiError;
use crate::identity::{Identity, lookup_user};

/// Forward a prompt to the generation webhook and return its output.
/// Persists nothing; saving is a separate call.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerationRequest>,
) -> Result<Json<GenerationResponse>, ApiError> {
    let output = state.generator.generate(&body).await?;
    Ok(Json(GenerationResponse { output }))
}

#[derive(Debug, Deserialize)]
pub struct SaveGenerationBody {
    pub conversation_id: Option<Uuid>,
    pub user_message: String,
    pub assistant_message: String,
    pub platform: String,
    pub tone: String,
    pub length: String,
    pub audience: Option<String>,
}

pub async fn save(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(body): Json<SaveGenerationBody>,
) -> Result<Json<SavedRoundTrip>, ApiError> {
    let params = SaveGeneration {
        external_user_id: identity.sub,
        display_name: identity.name,
        email: identity.email,
        conversation_id: body.conversation_id,
        user_message: body.user_message,
        assistant_message: body.assistant_message,
        meta: GenerationMeta {
            platform: body.platform,
            tone: body.tone,
            length: body.length,
            audience: body.audience,
        },
    };

    let saved = roundtrip::save_round_trip(&state.db, params).await?;
    Ok(Json(saved))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

pub async fn history(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<GenerationRecord>>, ApiError> {
    let Some(user) = lookup_user(&state, &identity).await? else {
        return Ok(Json(Vec::new()));
    };

    let records = state
        .db
        .list_generations_by_user(user.id, params.limit.unwrap_or(50))
        .await?;
    Ok(Json(records))
}
