//! Attendance records: one volunteer registered for one activity.

use super::Record;
use chrono::{DateTime, Utc};
use rollcall_types::RecordId;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// A volunteer's registration for an activity.
///
/// Attendance rows are immutable once written; they are only created and
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: RecordId,
    pub activity_id: RecordId,
    pub volunteer_id: RecordId,
    /// When the volunteer attended.
    pub date_time: DateTime<Utc>,
    /// Hours credited for this attendance.
    pub hours_value: f64,
    pub created_at: DateTime<Utc>,
}

/// Input of `attendance.create`.
///
/// `dateTime` defaults to the creation instant. `hoursValue` is filled
/// from the activity's `durationHours` before the row is stored; a row
/// written with it still unset is credited zero hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttendanceCreate {
    pub activity_id: RecordId,
    pub volunteer_id: RecordId,
    #[serde(default)]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hours_value: Option<f64>,
}

/// Criteria for listing attendances. Both fields are optional and combine
/// with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttendanceFilter {
    #[serde(default)]
    pub activity_id: Option<RecordId>,
    #[serde(default)]
    pub volunteer_id: Option<RecordId>,
}

impl AttendanceFilter {
    /// Attendances of one activity.
    #[must_use]
    pub fn activity(id: RecordId) -> Self {
        Self {
            activity_id: Some(id),
            volunteer_id: None,
        }
    }

    /// Attendances of one volunteer.
    #[must_use]
    pub fn volunteer(id: RecordId) -> Self {
        Self {
            activity_id: None,
            volunteer_id: Some(id),
        }
    }
}

impl Record for Attendance {
    const RESOURCE: &'static str = "attendance";

    type Create = AttendanceCreate;
    type Patch = Infallible;
    type Filter = AttendanceFilter;

    fn from_create(id: RecordId, input: AttendanceCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            activity_id: input.activity_id,
            volunteer_id: input.volunteer_id,
            date_time: input.date_time.unwrap_or(now),
            hours_value: input.hours_value.unwrap_or_default(),
            created_at: now,
        }
    }

    fn apply_patch(&mut self, patch: Infallible, _now: DateTime<Utc>) {
        match patch {}
    }

    fn matches(&self, filter: &AttendanceFilter) -> bool {
        filter.activity_id.map_or(true, |id| id == self.activity_id)
            && filter.volunteer_id.map_or(true, |id| id == self.volunteer_id)
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A volunteer registers for an activity at most once.
    fn conflicts_with(&self, other: &Self) -> bool {
        self.activity_id == other.activity_id && self.volunteer_id == other.volunteer_id
    }
}
