use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::activities_repo;
use crate::error::{Error, Result};
use crate::models::{ActivityRow, ActivityStatus};

#[derive(Debug, Deserialize)]
pub struct NewActivityInput {
    pub title: String,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_spots: i64,
}

pub async fn create_activity(
    pool: &SqlitePool,
    creator_id: &str,
    input: &NewActivityInput,
) -> Result<ActivityRow> {
    if input.total_spots < 1 {
        return Err(Error::InvalidState(
            "total_spots must be at least 1".to_string(),
        ));
    }
    let title = input.title.trim();
    if title.is_empty() {
        return Err(Error::InvalidState("title must not be empty".to_string()));
    }

    let activity_id = Uuid::new_v4().to_string();
    activities_repo::insert_activity(
        pool,
        activities_repo::NewActivity {
            activity_id: &activity_id,
            creator_id,
            title,
            category: input
                .category
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            latitude: input.latitude,
            longitude: input.longitude,
            total_spots: input.total_spots,
        },
    )
    .await?;

    info!(activity_id = %activity_id, creator_id = %creator_id, "activity created");
    get_activity(pool, &activity_id).await
}

pub async fn get_activity(pool: &SqlitePool, activity_id: &str) -> Result<ActivityRow> {
    activities_repo::get_activity(pool, activity_id)
        .await?
        .ok_or_else(|| Error::ActivityNotFound(activity_id.to_string()))
}

/// Creator-only. Idempotent: cancelling an already-cancelled activity is a
/// no-op. Cancelled is terminal and freezes every participation transition.
pub async fn cancel_activity(pool: &SqlitePool, activity_id: &str, actor_id: &str) -> Result<()> {
    let activity = get_activity(pool, activity_id).await?;
    if activity.creator_id != actor_id {
        return Err(Error::NotAuthorized);
    }
    if activity.status()? == ActivityStatus::Cancelled {
        return Ok(());
    }
    activities_repo::cancel_activity(pool, activity_id).await?;
    info!(activity_id = %activity_id, "activity cancelled");
    Ok(())
}
