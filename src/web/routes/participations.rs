use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Error;
use crate::models::{ParticipationRow, ParticipationWithActivityRow};
use crate::services::admission_service::{self, Decision};
use crate::services::{ledger_service, query_service};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn express_interest_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ParticipationRow>), Error> {
    let record = ledger_service::express_interest(&state, &activity_id, &auth_user.id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn leave_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ParticipationRow>, Error> {
    let record = ledger_service::leave(&state, &activity_id, &auth_user.id).await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
    pub decision: String, // accept|decline
}

pub async fn decision_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((activity_id, participation_id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(body): Json<DecisionBody>,
) -> Response {
    let decision = match body.decision.as_str() {
        "accept" => Decision::Accept,
        "decline" => Decision::Decline,
        _ => return StatusCode::BAD_REQUEST.into_response(),
    };

    match admission_service::decide(
        &state,
        &activity_id,
        &participation_id,
        &auth_user.id,
        decision,
    )
    .await
    {
        Ok(record) => Json(record).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn remove_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path((activity_id, participation_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<ParticipationRow>, Error> {
    let record =
        admission_service::remove(&state, &activity_id, &participation_id, &auth_user.id).await?;
    Ok(Json(record))
}

pub async fn roster_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipationRow>>, Error> {
    let roster = query_service::get_roster(&state.pool, &activity_id).await?;
    Ok(Json(roster))
}

pub async fn pending_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipationRow>>, Error> {
    let pending = query_service::get_pending(&state.pool, &activity_id, &auth_user.id).await?;
    Ok(Json(pending))
}

pub async fn spots_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, Error> {
    let available = query_service::available_spots(&state.pool, &activity_id).await?;
    Ok(Json(json!({ "activity_id": activity_id, "available_spots": available })))
}

pub async fn my_participations_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipationWithActivityRow>>, Error> {
    let records = query_service::get_my_participations(&state.pool, &auth_user.id).await?;
    Ok(Json(records))
}
