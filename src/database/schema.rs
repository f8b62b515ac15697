use sqlx::SqlitePool;

const SQL_CREATE_ACTIVITIES: &str = r#"
CREATE TABLE IF NOT EXISTS activities (
  activity_id    TEXT PRIMARY KEY,
  creator_id     TEXT NOT NULL,
  title          TEXT NOT NULL,
  category       TEXT,
  latitude       REAL,
  longitude      REAL,
  total_spots    INTEGER NOT NULL CHECK (total_spots > 0),
  accepted_count INTEGER NOT NULL DEFAULT 0
                 CHECK (accepted_count >= 0 AND accepted_count <= total_spots),
  status         TEXT NOT NULL DEFAULT 'open',
  created_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
"#;

const SQL_CREATE_PARTICIPATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS participations (
  participation_id TEXT PRIMARY KEY,
  activity_id      TEXT NOT NULL REFERENCES activities(activity_id),
  user_id          TEXT NOT NULL,
  status           TEXT NOT NULL DEFAULT 'pending',
  requested_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
  decided_at       TEXT
)
"#;

// At most one live (pending/accepted) row per (activity, user) pair.
// Terminal rows stay behind as history and do not collide.
const SQL_CREATE_LIVE_PAIR_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_participations_live_pair
ON participations(activity_id, user_id)
WHERE status IN ('pending', 'accepted')
"#;

const SQL_CREATE_PARTICIPATIONS_USER_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_participations_user
ON participations(user_id, requested_at)
"#;

const SQL_CREATE_PARTICIPATIONS_ACTIVITY_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_participations_activity
ON participations(activity_id, status)
"#;

const SQL_CREATE_ACTIVITIES_GEO_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_activities_geo
ON activities(latitude, longitude)
"#;

pub async fn ensure_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SQL_CREATE_ACTIVITIES).execute(pool).await?;
    sqlx::query(SQL_CREATE_PARTICIPATIONS).execute(pool).await?;
    sqlx::query(SQL_CREATE_LIVE_PAIR_INDEX).execute(pool).await?;
    sqlx::query(SQL_CREATE_PARTICIPATIONS_USER_INDEX)
        .execute(pool)
        .await?;
    sqlx::query(SQL_CREATE_PARTICIPATIONS_ACTIVITY_INDEX)
        .execute(pool)
        .await?;
    sqlx::query(SQL_CREATE_ACTIVITIES_GEO_INDEX)
        .execute(pool)
        .await?;
    Ok(())
}
