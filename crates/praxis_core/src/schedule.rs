//! crates/praxis_core/src/schedule.rs
//!
//! The review-scheduling policy: a pure mapping from an importance label
//! to the date a thought first surfaces in recall, and from a recall
//! action to the mutation it applies.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Importance, ReviewUpdate};

/// How far a kept thought is pushed before it resurfaces.
const KEEP_INTERVAL_DAYS: i64 = 2;
/// The shortest re-surface interval, for "not now" dismissals.
const SNOOZE_INTERVAL_DAYS: i64 = 1;

/// Maps an importance label to the initial review date.
///
/// `Week` resurfaces after 3 days and `Later` after 7; the labels describe
/// the user's framing at capture time, not the exact interval. Unimportant
/// thoughts get no review date and never enter the recall queue.
pub fn review_date_for(importance: Importance, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match importance {
        Importance::Today => Some(now),
        Importance::Week => Some(now + Duration::days(3)),
        Importance::Later => Some(now + Duration::days(7)),
        Importance::NotImportant => None,
    }
}

/// The decision a user takes on one due thought in a recall session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallAction {
    Done,
    Keep,
    Snooze,
}

impl RecallAction {
    /// Parses the wire label; unknown labels are not an action.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "DONE" => Some(RecallAction::Done),
            "KEEP" => Some(RecallAction::Keep),
            "SNOOZE" => Some(RecallAction::Snooze),
            _ => None,
        }
    }
}

/// Maps a recall action to the mutation the store applies.
///
/// `Done` is terminal. `Keep` and `Snooze` only move the review date, so
/// repeating either simply rewrites it: last write wins.
pub fn update_for(action: RecallAction, now: DateTime<Utc>) -> ReviewUpdate {
    match action {
        RecallAction::Done => ReviewUpdate::Archive,
        RecallAction::Keep => ReviewUpdate::Reschedule(now + Duration::days(KEEP_INTERVAL_DAYS)),
        RecallAction::Snooze => {
            ReviewUpdate::Reschedule(now + Duration::days(SNOOZE_INTERVAL_DAYS))
        }
    }
}
