//! Participation ledger rows and the closed status state machine.
//!
//! Statuses are stored as TEXT but parsed into `ParticipationStatus` at the
//! model boundary; services never branch on raw strings. The transition
//! table below is the single source of truth for which moves are legal.

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ParticipationRow {
    pub participation_id: String,
    pub activity_id: String,
    pub user_id: String,
    pub status: String,
    pub requested_at: String,
    pub decided_at: Option<String>,
}

/// A ledger row joined with the activity it belongs to, for the
/// "my participations" projection.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ParticipationWithActivityRow {
    pub participation_id: String,
    pub activity_id: String,
    pub user_id: String,
    pub status: String,
    pub requested_at: String,
    pub decided_at: Option<String>,
    pub activity_title: String,
    pub activity_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipationStatus {
    Pending,
    Accepted,
    Declined,
    Removed,
    Left,
}

impl ParticipationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipationStatus::Pending => "pending",
            ParticipationStatus::Accepted => "accepted",
            ParticipationStatus::Declined => "declined",
            ParticipationStatus::Removed => "removed",
            ParticipationStatus::Left => "left",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(ParticipationStatus::Pending),
            "accepted" => Some(ParticipationStatus::Accepted),
            "declined" => Some(ParticipationStatus::Declined),
            "removed" => Some(ParticipationStatus::Removed),
            "left" => Some(ParticipationStatus::Left),
            _ => None,
        }
    }

    /// Pending and accepted rows are "live": they count against the
    /// one-record-per-(activity, user) uniqueness rule.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            ParticipationStatus::Pending | ParticipationStatus::Accepted
        )
    }

    pub fn is_terminal(self) -> bool {
        !self.is_live()
    }

    /// The full transition table. Declined, removed and left have no
    /// outgoing edges.
    pub fn can_transition_to(self, next: ParticipationStatus) -> bool {
        use ParticipationStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Pending, Declined)
                | (Pending, Left)
                | (Accepted, Removed)
                | (Accepted, Left)
        )
    }
}

impl ParticipationRow {
    pub fn status(&self) -> Result<ParticipationStatus> {
        ParticipationStatus::parse(&self.status).ok_or_else(|| {
            Error::InvalidState(format!("unknown participation status '{}'", self.status))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ParticipationStatus::*;

    #[test]
    fn legal_transitions() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Declined));
        assert!(Pending.can_transition_to(Left));
        assert!(Accepted.can_transition_to(Removed));
        assert!(Accepted.can_transition_to(Left));
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for terminal in [Declined, Removed, Left] {
            for next in [Pending, Accepted, Declined, Removed, Left] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn illegal_moves_rejected() {
        assert!(!Pending.can_transition_to(Removed));
        assert!(!Accepted.can_transition_to(Declined));
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn status_round_trips_through_text() {
        for s in [Pending, Accepted, Declined, Removed, Left] {
            assert_eq!(super::ParticipationStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(super::ParticipationStatus::parse("waitlisted"), None);
    }
}
