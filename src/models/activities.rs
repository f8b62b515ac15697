use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityRow {
    pub activity_id: String,
    pub creator_id: String,
    pub title: String,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_spots: i64,
    pub accepted_count: i64,
    pub status: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    Open,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::Open => "open",
            ActivityStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(ActivityStatus::Open),
            "cancelled" => Some(ActivityStatus::Cancelled),
            _ => None,
        }
    }
}

impl ActivityRow {
    pub fn status(&self) -> Result<ActivityStatus> {
        ActivityStatus::parse(&self.status)
            .ok_or_else(|| Error::InvalidState(format!("unknown activity status '{}'", self.status)))
    }

    pub fn is_open(&self) -> bool {
        self.status.as_str() == "open"
    }

    /// `total_spots - accepted_count`; clamped so a reader never sees a
    /// negative number even if a row was edited out of band.
    pub fn available_spots(&self) -> i64 {
        (self.total_spots - self.accepted_count).max(0)
    }
}
