//! Fire-and-forget notification collaborator.
//!
//! Events are emitted after a transition has committed; a notifier that
//! fails or drops an event never rolls the transition back.

use tracing::info;

use crate::models::ParticipationStatus;

#[derive(Debug, Clone)]
pub struct ParticipationChanged {
    pub activity_id: String,
    pub user_id: String,
    pub status: ParticipationStatus,
}

pub trait ParticipationNotifier: Send + Sync {
    fn participation_changed(&self, event: ParticipationChanged);
}

/// Default notifier: a structured log line per transition. Real delivery
/// (push, mail) lives behind the same trait in a separate service.
pub struct LogNotifier;

impl ParticipationNotifier for LogNotifier {
    fn participation_changed(&self, event: ParticipationChanged) {
        info!(
            activity_id = %event.activity_id,
            user_id = %event.user_id,
            status = event.status.as_str(),
            "participation changed"
        );
    }
}
