pub mod activities;
pub mod participations;

pub use activities::{ActivityRow, ActivityStatus};
pub use participations::{ParticipationRow, ParticipationStatus, ParticipationWithActivityRow};
