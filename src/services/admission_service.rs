//! Capacity admission controller.
//!
//! The only code allowed to change `accepted_count` or to move a
//! participation into or out of `accepted`. Every operation here acquires
//! the activity's lock, then runs one transaction in which the count change
//! and the status change commit together. The conditional
//! `try_increment_accepted` / `transition_from` statements re-check state
//! inside the transaction, so the capacity invariant holds even if a write
//! reaches the database outside the lock.

use tracing::warn;

use crate::database::{activities_repo, participations_repo};
use crate::error::{Error, Result};
use crate::models::{ActivityRow, ParticipationRow, ParticipationStatus};
use crate::services::notifier::ParticipationChanged;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    fn target(self) -> ParticipationStatus {
        match self {
            Decision::Accept => ParticipationStatus::Accepted,
            Decision::Decline => ParticipationStatus::Declined,
        }
    }
}

/// Creator decision on a pending record.
///
/// Retry-safe: a record already in the exact state this decision would
/// produce is returned as success with no capacity effect, so a client that
/// timed out and re-sent the call observes the decrement exactly once.
pub async fn decide(
    state: &AppState,
    activity_id: &str,
    participation_id: &str,
    actor_id: &str,
    decision: Decision,
) -> Result<ParticipationRow> {
    let _guard = state.locks.acquire(activity_id).await;

    let mut tx = state.pool.begin().await?;
    let activity = load_open_activity_for_creator(&mut tx, activity_id, actor_id).await?;

    let record = participations_repo::get_by_id(&mut *tx, activity_id, participation_id)
        .await?
        .ok_or_else(|| Error::ParticipationNotFound {
            activity_id: activity_id.to_string(),
        })?;

    let current = record.status()?;
    let target = decision.target();
    if current == target {
        // Idempotent retry of the same decision.
        return Ok(record);
    }
    if current != ParticipationStatus::Pending {
        return Err(Error::InvalidState(format!(
            "cannot {} a participation in state {}",
            match decision {
                Decision::Accept => "accept",
                Decision::Decline => "decline",
            },
            current.as_str()
        )));
    }

    if decision == Decision::Accept {
        let admitted = activities_repo::try_increment_accepted(&mut *tx, activity_id).await?;
        if admitted == 0 {
            // Full at the moment of the atomic step; record stays pending.
            return Err(Error::CapacityExceeded);
        }
    }

    let changed = participations_repo::record_decision(&mut *tx, participation_id, target.as_str())
        .await?;
    if changed == 0 {
        return Err(Error::InvalidState(
            "participation changed state during decision".to_string(),
        ));
    }
    tx.commit().await?;

    state.notifier.participation_changed(ParticipationChanged {
        activity_id: activity.activity_id.clone(),
        user_id: record.user_id.clone(),
        status: target,
    });

    reload(state, activity_id, participation_id).await
}

/// Creator-initiated removal of an accepted participant. Frees the spot in
/// the same transaction as the status change.
pub async fn remove(
    state: &AppState,
    activity_id: &str,
    participation_id: &str,
    actor_id: &str,
) -> Result<ParticipationRow> {
    let _guard = state.locks.acquire(activity_id).await;

    let mut tx = state.pool.begin().await?;
    load_open_activity_for_creator(&mut tx, activity_id, actor_id).await?;

    let record = participations_repo::get_by_id(&mut *tx, activity_id, participation_id)
        .await?
        .ok_or_else(|| Error::ParticipationNotFound {
            activity_id: activity_id.to_string(),
        })?;

    match record.status()? {
        // Idempotent retry.
        ParticipationStatus::Removed => return Ok(record),
        ParticipationStatus::Accepted => {}
        other => {
            return Err(Error::InvalidState(format!(
                "cannot remove a participation in state {}",
                other.as_str()
            )));
        }
    }

    release_spot(
        &mut tx,
        activity_id,
        participation_id,
        ParticipationStatus::Removed,
    )
    .await?;
    tx.commit().await?;

    state.notifier.participation_changed(ParticipationChanged {
        activity_id: activity_id.to_string(),
        user_id: record.user_id.clone(),
        status: ParticipationStatus::Removed,
    });

    reload(state, activity_id, participation_id).await
}

/// Internal: accepted -> left with the capacity release. Called by the
/// ledger's `leave` so the decrement serializes with concurrent accepts.
pub async fn release_on_leave(
    state: &AppState,
    activity_id: &str,
    participation_id: &str,
) -> Result<ParticipationRow> {
    let _guard = state.locks.acquire(activity_id).await;

    let mut tx = state.pool.begin().await?;
    let record = participations_repo::get_by_id(&mut *tx, activity_id, participation_id)
        .await?
        .ok_or_else(|| Error::ParticipationNotFound {
            activity_id: activity_id.to_string(),
        })?;

    match record.status()? {
        // Idempotent retry.
        ParticipationStatus::Left => return Ok(record),
        ParticipationStatus::Accepted => {}
        other => {
            return Err(Error::InvalidState(format!(
                "cannot leave from state {}",
                other.as_str()
            )));
        }
    }

    release_spot(
        &mut tx,
        activity_id,
        participation_id,
        ParticipationStatus::Left,
    )
    .await?;
    tx.commit().await?;

    state.notifier.participation_changed(ParticipationChanged {
        activity_id: activity_id.to_string(),
        user_id: record.user_id.clone(),
        status: ParticipationStatus::Left,
    });

    reload(state, activity_id, participation_id).await
}

async fn load_open_activity_for_creator(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    activity_id: &str,
    actor_id: &str,
) -> Result<ActivityRow> {
    let activity = activities_repo::get_activity(&mut **tx, activity_id)
        .await?
        .ok_or_else(|| Error::ActivityNotFound(activity_id.to_string()))?;
    if activity.creator_id != actor_id {
        return Err(Error::NotAuthorized);
    }
    if !activity.is_open() {
        return Err(Error::InvalidState("activity is cancelled".to_string()));
    }
    Ok(activity)
}

/// Accepted -> terminal transition plus the matching decrement, inside the
/// caller's transaction.
async fn release_spot(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    activity_id: &str,
    participation_id: &str,
    to: ParticipationStatus,
) -> Result<()> {
    let changed = participations_repo::transition_from(
        &mut **tx,
        participation_id,
        ParticipationStatus::Accepted.as_str(),
        to.as_str(),
    )
    .await?;
    if changed == 0 {
        return Err(Error::InvalidState(
            "participation changed state during release".to_string(),
        ));
    }
    let released = activities_repo::decrement_accepted(&mut **tx, activity_id).await?;
    if released == 0 {
        // accepted_count was already 0 with an accepted row present.
        warn!(activity_id = %activity_id, "accepted_count underflow prevented");
        return Err(Error::InvalidState(
            "accepted count out of sync for activity".to_string(),
        ));
    }
    Ok(())
}

async fn reload(
    state: &AppState,
    activity_id: &str,
    participation_id: &str,
) -> Result<ParticipationRow> {
    participations_repo::get_by_id(&state.pool, activity_id, participation_id)
        .await?
        .ok_or_else(|| Error::ParticipationNotFound {
            activity_id: activity_id.to_string(),
        })
}
