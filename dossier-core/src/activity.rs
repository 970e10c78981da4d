//! Activity log: a capped, newest-first record of who changed what

use chrono::{DateTime, Utc};
use std::fmt;

use crate::ids;
use crate::models::{ActivityLogEntry, Investigator, ACTIVITY_LOG_CAPACITY};

/// Kinds of mutation recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Deleted,
    Closed,
    Archived,
    Reactivated,
    Resolved,
}

impl Action {
    /// Human-readable log text, e.g. "created person"
    pub fn describe(&self, noun: &str) -> String {
        format!("{} {}", self, noun)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Created => write!(f, "created"),
            Action::Updated => write!(f, "updated"),
            Action::Deleted => write!(f, "deleted"),
            Action::Closed => write!(f, "closed"),
            Action::Archived => write!(f, "archived"),
            Action::Reactivated => write!(f, "reactivated"),
            Action::Resolved => write!(f, "resolved"),
        }
    }
}

/// Builds the next log entry for `investigator`, with a `LOG-NN` id unique
/// among the entries currently kept.
pub fn new_entry(
    log: &[ActivityLogEntry],
    investigator: &Investigator,
    action: String,
    entity_type: &str,
    entity_id: &str,
    timestamp: DateTime<Utc>,
) -> ActivityLogEntry {
    ActivityLogEntry {
        id: ids::allocate("LOG", log.iter().map(|e| e.id.as_str())),
        investigator_id: investigator.id.clone(),
        investigator_name: investigator.name.clone(),
        action,
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        timestamp,
    }
}

/// Inserts `entry` at the front and drops the oldest entries past capacity.
/// Returns the dropped entries.
pub fn push_entry(
    log: &mut Vec<ActivityLogEntry>,
    entry: ActivityLogEntry,
) -> Vec<ActivityLogEntry> {
    log.insert(0, entry);
    if log.len() > ACTIVITY_LOG_CAPACITY {
        log.split_off(ACTIVITY_LOG_CAPACITY)
    } else {
        Vec::new()
    }
}
