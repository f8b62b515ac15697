#![allow(dead_code)] // each test binary uses a subset of these helpers

use std::sync::{Arc, Mutex};

use sqlx::sqlite::SqlitePoolOptions;

use joinup::database::schema;
use joinup::models::ParticipationStatus;
use joinup::services::activity_service::{self, NewActivityInput};
use joinup::services::notifier::{ParticipationChanged, ParticipationNotifier};
use joinup::state::{ActivityLocks, AppState};

/// Records every emitted event so tests can assert on notification
/// fan-out without any delivery machinery.
pub struct CollectingNotifier {
    events: Mutex<Vec<ParticipationChanged>>,
}

impl CollectingNotifier {
    pub fn statuses_for(&self, user_id: &str) -> Vec<ParticipationStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.status)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl ParticipationNotifier for CollectingNotifier {
    fn participation_changed(&self, event: ParticipationChanged) {
        self.events.lock().unwrap().push(event);
    }
}

/// Fresh in-memory database per test. A single pooled connection keeps all
/// sessions on the same in-memory file.
pub async fn test_state() -> (AppState, Arc<CollectingNotifier>) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("cannot open in-memory database");
    schema::ensure_schema(&pool)
        .await
        .expect("cannot bootstrap schema");

    let notifier = Arc::new(CollectingNotifier {
        events: Mutex::new(Vec::new()),
    });
    let state = AppState {
        pool,
        locks: ActivityLocks::default(),
        notifier: notifier.clone(),
    };
    (state, notifier)
}

pub async fn create_open_activity(state: &AppState, creator_id: &str, total_spots: i64) -> String {
    let input = NewActivityInput {
        title: "bouldering session".to_string(),
        category: Some("sport".to_string()),
        latitude: Some(52.3676),
        longitude: Some(4.9041),
        total_spots,
    };
    activity_service::create_activity(&state.pool, creator_id, &input)
        .await
        .expect("cannot create activity")
        .activity_id
}
