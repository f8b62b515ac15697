use sqlx::sqlite::Sqlite;
use sqlx::Executor;

use crate::models::{ParticipationRow, ParticipationWithActivityRow};

const SQL_INSERT_PARTICIPATION: &str = r#"
INSERT INTO participations (
  participation_id,
  activity_id,
  user_id,
  status
) VALUES (?, ?, ?, 'pending')
"#;

pub struct NewParticipation<'a> {
    pub participation_id: &'a str,
    pub activity_id: &'a str,
    pub user_id: &'a str,
}

pub async fn insert_participation<'e, E>(
    executor: E,
    participation: NewParticipation<'_>,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_PARTICIPATION)
        .bind(participation.participation_id)
        .bind(participation.activity_id)
        .bind(participation.user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_GET_BY_ID: &str = r#"
SELECT
  participation_id,
  activity_id,
  user_id,
  status,
  requested_at,
  decided_at
FROM participations
WHERE participation_id = ? AND activity_id = ?
"#;

pub async fn get_by_id<'e, E>(
    executor: E,
    activity_id: &str,
    participation_id: &str,
) -> sqlx::Result<Option<ParticipationRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ParticipationRow>(SQL_GET_BY_ID)
        .bind(participation_id)
        .bind(activity_id)
        .fetch_optional(executor)
        .await
}

const SQL_FIND_LIVE_FOR_PAIR: &str = r#"
SELECT
  participation_id,
  activity_id,
  user_id,
  status,
  requested_at,
  decided_at
FROM participations
WHERE activity_id = ?
  AND user_id = ?
  AND status IN ('pending', 'accepted')
"#;

pub async fn find_live_for_pair<'e, E>(
    executor: E,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<ParticipationRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ParticipationRow>(SQL_FIND_LIVE_FOR_PAIR)
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

const SQL_FIND_LATEST_FOR_PAIR: &str = r#"
SELECT
  participation_id,
  activity_id,
  user_id,
  status,
  requested_at,
  decided_at
FROM participations
WHERE activity_id = ?
  AND user_id = ?
ORDER BY requested_at DESC, participation_id DESC
LIMIT 1
"#;

/// Most recent record for the pair regardless of status; used by the
/// re-expression policy check.
pub async fn find_latest_for_pair<'e, E>(
    executor: E,
    activity_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<ParticipationRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ParticipationRow>(SQL_FIND_LATEST_FOR_PAIR)
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

// Conditional transitions: the WHERE clause re-checks the expected current
// status so a concurrent writer cannot be overwritten. Zero rows affected
// means the record moved underneath the caller.

const SQL_RECORD_DECISION: &str = r#"
UPDATE participations
SET status = ?,
    decided_at = COALESCE(decided_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
WHERE participation_id = ? AND status = 'pending'
"#;

pub async fn record_decision<'e, E>(
    executor: E,
    participation_id: &str,
    new_status: &str,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_RECORD_DECISION)
        .bind(new_status)
        .bind(participation_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_TRANSITION_FROM: &str = r#"
UPDATE participations
SET status = ?
WHERE participation_id = ? AND status = ?
"#;

pub async fn transition_from<'e, E>(
    executor: E,
    participation_id: &str,
    expected_status: &str,
    new_status: &str,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_TRANSITION_FROM)
        .bind(new_status)
        .bind(participation_id)
        .bind(expected_status)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_FOR_ACTIVITY: &str = r#"
SELECT
  participation_id,
  activity_id,
  user_id,
  status,
  requested_at,
  decided_at
FROM participations
WHERE activity_id = ?
ORDER BY requested_at ASC, participation_id ASC
"#;

pub async fn list_for_activity(
    pool: &sqlx::SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<ParticipationRow>> {
    sqlx::query_as::<_, ParticipationRow>(SQL_LIST_FOR_ACTIVITY)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_PENDING_FOR_ACTIVITY: &str = r#"
SELECT
  participation_id,
  activity_id,
  user_id,
  status,
  requested_at,
  decided_at
FROM participations
WHERE activity_id = ?
  AND status = 'pending'
ORDER BY requested_at ASC, participation_id ASC
"#;

pub async fn list_pending_for_activity(
    pool: &sqlx::SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<ParticipationRow>> {
    sqlx::query_as::<_, ParticipationRow>(SQL_LIST_PENDING_FOR_ACTIVITY)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_FOR_USER: &str = r#"
SELECT
  p.participation_id,
  p.activity_id,
  p.user_id,
  p.status,
  p.requested_at,
  p.decided_at,
  a.title AS activity_title,
  a.status AS activity_status
FROM participations p
JOIN activities a ON a.activity_id = p.activity_id
WHERE p.user_id = ?
ORDER BY p.requested_at DESC, p.participation_id DESC
"#;

pub async fn list_for_user(
    pool: &sqlx::SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<ParticipationWithActivityRow>> {
    sqlx::query_as::<_, ParticipationWithActivityRow>(SQL_LIST_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}
