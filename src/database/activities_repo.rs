use sqlx::sqlite::Sqlite;
use sqlx::Executor;

use crate::models::ActivityRow;

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (
  activity_id,
  creator_id,
  title,
  category,
  latitude,
  longitude,
  total_spots,
  status
) VALUES (?, ?, ?, ?, ?, ?, ?, 'open')
"#;

pub struct NewActivity<'a> {
    pub activity_id: &'a str,
    pub creator_id: &'a str,
    pub title: &'a str,
    pub category: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_spots: i64,
}

pub async fn insert_activity<'e, E>(executor: E, activity: NewActivity<'_>) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(activity.activity_id)
        .bind(activity.creator_id)
        .bind(activity.title)
        .bind(activity.category)
        .bind(activity.latitude)
        .bind(activity.longitude)
        .bind(activity.total_spots)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_GET_ACTIVITY: &str = r#"
SELECT
  activity_id,
  creator_id,
  title,
  category,
  latitude,
  longitude,
  total_spots,
  accepted_count,
  status,
  created_at
FROM activities
WHERE activity_id = ?
"#;

pub async fn get_activity<'e, E>(executor: E, activity_id: &str) -> sqlx::Result<Option<ActivityRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ActivityRow>(SQL_GET_ACTIVITY)
        .bind(activity_id)
        .fetch_optional(executor)
        .await
}

const SQL_CANCEL_ACTIVITY: &str = r#"
UPDATE activities
SET status = 'cancelled'
WHERE activity_id = ? AND status = 'open'
"#;

pub async fn cancel_activity<'e, E>(executor: E, activity_id: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_CANCEL_ACTIVITY)
        .bind(activity_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

// Check-and-increment in one statement: zero rows affected means the
// activity is full (or not open), and the caller must not admit.
const SQL_TRY_INCREMENT_ACCEPTED: &str = r#"
UPDATE activities
SET accepted_count = accepted_count + 1
WHERE activity_id = ?
  AND status = 'open'
  AND accepted_count < total_spots
"#;

pub async fn try_increment_accepted<'e, E>(executor: E, activity_id: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_TRY_INCREMENT_ACCEPTED)
        .bind(activity_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DECREMENT_ACCEPTED: &str = r#"
UPDATE activities
SET accepted_count = accepted_count - 1
WHERE activity_id = ?
  AND accepted_count > 0
"#;

pub async fn decrement_accepted<'e, E>(executor: E, activity_id: &str) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query(SQL_DECREMENT_ACCEPTED)
        .bind(activity_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_OPEN_IN_BBOX: &str = r#"
SELECT
  activity_id,
  creator_id,
  title,
  category,
  latitude,
  longitude,
  total_spots,
  accepted_count,
  status,
  created_at
FROM activities
WHERE status = 'open'
  AND latitude IS NOT NULL
  AND longitude IS NOT NULL
  AND latitude BETWEEN ? AND ?
  AND longitude BETWEEN ? AND ?
ORDER BY created_at DESC
LIMIT ?
"#;

pub async fn list_open_in_bbox(
    pool: &sqlx::SqlitePool,
    bbox: (f64, f64, f64, f64),
    limit: i64,
) -> sqlx::Result<Vec<ActivityRow>> {
    let (min_lat, max_lat, min_lon, max_lon) = bbox;
    sqlx::query_as::<_, ActivityRow>(SQL_LIST_OPEN_IN_BBOX)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lon)
        .bind(max_lon)
        .bind(limit)
        .fetch_all(pool)
        .await
}
