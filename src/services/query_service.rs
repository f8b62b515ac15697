//! Read-side projections over the ledger. No locks, no side effects; reads
//! may be slightly stale relative to an in-flight admission.

use sqlx::SqlitePool;

use crate::database::participations_repo;
use crate::error::{Error, Result};
use crate::models::{ParticipationRow, ParticipationWithActivityRow};
use crate::services::activity_service;

/// All records for an activity, live and terminal, in request order.
pub async fn get_roster(pool: &SqlitePool, activity_id: &str) -> Result<Vec<ParticipationRow>> {
    activity_service::get_activity(pool, activity_id).await?;
    Ok(participations_repo::list_for_activity(pool, activity_id).await?)
}

/// Pending requests awaiting a decision. Creator-only.
pub async fn get_pending(
    pool: &SqlitePool,
    activity_id: &str,
    requester_id: &str,
) -> Result<Vec<ParticipationRow>> {
    let activity = activity_service::get_activity(pool, activity_id).await?;
    if activity.creator_id != requester_id {
        return Err(Error::NotAuthorized);
    }
    Ok(participations_repo::list_pending_for_activity(pool, activity_id).await?)
}

/// Every record where the user is the participant, across activities.
pub async fn get_my_participations(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<ParticipationWithActivityRow>> {
    Ok(participations_repo::list_for_user(pool, user_id).await?)
}

pub async fn available_spots(pool: &SqlitePool, activity_id: &str) -> Result<i64> {
    let activity = activity_service::get_activity(pool, activity_id).await?;
    Ok(activity.available_spots())
}
