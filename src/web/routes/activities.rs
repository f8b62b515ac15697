use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::Error;
use crate::models::ActivityRow;
use crate::services::activity_service::{self, NewActivityInput};
use crate::services::discovery_service::{self, ActivitySummary, NearbyQuery};
use crate::state::AppState;
use crate::web::middleware::auth::AuthenticatedUser;

pub async fn create_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(input): Json<NewActivityInput>,
) -> Result<(StatusCode, Json<ActivityRow>), Error> {
    let activity = activity_service::create_activity(&state.pool, &auth_user.id, &input).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn get_activity_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActivityRow>, Error> {
    let activity = activity_service::get_activity(&state.pool, &activity_id).await?;
    Ok(Json(activity))
}

pub async fn cancel_activity_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    activity_service::cancel_activity(&state.pool, &activity_id, &auth_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn nearby_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<NearbyQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivitySummary>>, Error> {
    let summaries = discovery_service::nearby(&state.pool, &query).await?;
    Ok(Json(summaries))
}
