//! Class model with optional scheduling metadata.

use serde::{Deserialize, Serialize};

/// A class students can enroll in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// Unique identifier (e.g. 2433, 404).
    pub id: i64,
    /// Title the relationship queries match on.
    pub title: String,
    /// Credit count. The graph seed leaves it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    pub instructor: String,
    /// Term and meeting times, only present in the document seed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl Class {
    pub fn new(id: i64, title: &str, instructor: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            credits: None,
            instructor: instructor.to_string(),
            schedule: None,
        }
    }

    pub fn with_credits(mut self, credits: i64) -> Self {
        self.credits = Some(credits);
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = Some(schedule);
        self
    }
}

/// When a class meets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Academic term, e.g. "Fall 2025".
    pub term: String,
    pub meeting: Meeting,
}

/// Weekly meeting slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub days: Vec<String>,
    pub time: String,
}

impl Schedule {
    pub fn new(term: &str, days: &[&str], time: &str) -> Self {
        Self {
            term: term.to_string(),
            meeting: Meeting {
                days: days.iter().map(|d| d.to_string()).collect(),
                time: time.to_string(),
            },
        }
    }
}
