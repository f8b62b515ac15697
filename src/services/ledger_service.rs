//! Participation ledger: one record per (activity, user) pair.
//!
//! Re-expression policy: a user who `left` may express interest again (a
//! fresh pending record); after `declined` or `removed` the creator's
//! decision stands and the pair is blocked.

use uuid::Uuid;

use crate::database::participations_repo;
use crate::error::{Error, Result};
use crate::models::{ParticipationRow, ParticipationStatus};
use crate::services::activity_service;
use crate::services::admission_service;
use crate::services::notifier::ParticipationChanged;
use crate::state::AppState;

pub async fn express_interest(
    state: &AppState,
    activity_id: &str,
    user_id: &str,
) -> Result<ParticipationRow> {
    let activity = activity_service::get_activity(&state.pool, activity_id).await?;
    if !activity.is_open() {
        return Err(Error::InvalidState("activity is cancelled".to_string()));
    }
    if activity.creator_id == user_id {
        return Err(Error::SelfInterest);
    }

    if let Some(previous) =
        participations_repo::find_latest_for_pair(&state.pool, activity_id, user_id).await?
    {
        match previous.status()? {
            ParticipationStatus::Left => {}
            // Either a live record, or a standing creator decision
            // (declined/removed) that blocks the pair.
            _ => return Err(Error::DuplicateInterest),
        }
    }

    let participation_id = Uuid::new_v4().to_string();
    let inserted = participations_repo::insert_participation(
        &state.pool,
        participations_repo::NewParticipation {
            participation_id: &participation_id,
            activity_id,
            user_id,
        },
    )
    .await;

    // Two racing express calls can both pass the read check; the partial
    // unique index over live rows decides the loser.
    if let Err(e) = inserted {
        if is_unique_violation(&e) {
            return Err(Error::DuplicateInterest);
        }
        return Err(e.into());
    }

    let record = participations_repo::get_by_id(&state.pool, activity_id, &participation_id)
        .await?
        .ok_or_else(|| Error::ParticipationNotFound {
            activity_id: activity_id.to_string(),
        })?;

    state.notifier.participation_changed(ParticipationChanged {
        activity_id: activity_id.to_string(),
        user_id: user_id.to_string(),
        status: ParticipationStatus::Pending,
    });

    Ok(record)
}

/// Withdraw from an activity. Valid from pending (no capacity effect) or
/// accepted (routes through the admission controller so the freed spot is
/// released under the activity's lock).
pub async fn leave(
    state: &AppState,
    activity_id: &str,
    user_id: &str,
) -> Result<ParticipationRow> {
    let activity = activity_service::get_activity(&state.pool, activity_id).await?;
    if !activity.is_open() {
        return Err(Error::InvalidState("activity is cancelled".to_string()));
    }

    let record = participations_repo::find_live_for_pair(&state.pool, activity_id, user_id)
        .await?
        .ok_or_else(|| Error::ParticipationNotFound {
            activity_id: activity_id.to_string(),
        })?;

    match record.status()? {
        ParticipationStatus::Accepted => {
            admission_service::release_on_leave(state, activity_id, &record.participation_id).await
        }
        ParticipationStatus::Pending => {
            let changed = participations_repo::transition_from(
                &state.pool,
                &record.participation_id,
                ParticipationStatus::Pending.as_str(),
                ParticipationStatus::Left.as_str(),
            )
            .await?;
            if changed == 0 {
                // Lost a race with a concurrent creator decision; if the
                // record is now accepted, fall through to the release path.
                let current =
                    participations_repo::get_by_id(&state.pool, activity_id, &record.participation_id)
                        .await?
                        .ok_or_else(|| Error::ParticipationNotFound {
                            activity_id: activity_id.to_string(),
                        })?;
                return match current.status()? {
                    ParticipationStatus::Accepted => {
                        admission_service::release_on_leave(
                            state,
                            activity_id,
                            &record.participation_id,
                        )
                        .await
                    }
                    ParticipationStatus::Left => Ok(current),
                    other => Err(Error::InvalidState(format!(
                        "cannot leave from state {}",
                        other.as_str()
                    ))),
                };
            }

            state.notifier.participation_changed(ParticipationChanged {
                activity_id: activity_id.to_string(),
                user_id: user_id.to_string(),
                status: ParticipationStatus::Left,
            });

            participations_repo::get_by_id(&state.pool, activity_id, &record.participation_id)
                .await?
                .ok_or_else(|| Error::ParticipationNotFound {
                    activity_id: activity_id.to_string(),
                })
        }
        other => Err(Error::InvalidState(format!(
            "cannot leave from state {}",
            other.as_str()
        ))),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
