//! Activity records.

use super::{nullable, Record};
use crate::StoreError;
use chrono::{DateTime, Utc};
use rollcall_types::RecordId;
use serde::{Deserialize, Serialize};

/// Default volunteer quota for a new activity.
pub const DEFAULT_MAX_VOLUNTEERS: i32 = 20;

/// Default hours credited per attendance.
pub const DEFAULT_DURATION_HOURS: f64 = 1.0;

fn default_max_volunteers() -> i32 {
    DEFAULT_MAX_VOLUNTEERS
}

fn default_duration_hours() -> f64 {
    DEFAULT_DURATION_HOURS
}

/// A scheduled volunteering activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    /// Maximum number of attendance registrations.
    pub max_volunteers: i32,
    /// Hours credited to each attendee unless overridden.
    pub duration_hours: f64,
    pub date_start: DateTime<Utc>,
    pub date_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input of `activity.create`.
///
/// ```
/// use rollcall_store::ActivityCreate;
///
/// let input: ActivityCreate = serde_json::from_str(
///     r#"{"name": "Beach cleanup", "dateStart": "2026-05-01T09:00:00Z"}"#,
/// ).unwrap();
/// assert_eq!(input.max_volunteers, 20);
/// assert_eq!(input.duration_hours, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_max_volunteers")]
    pub max_volunteers: i32,
    #[serde(default = "default_duration_hours")]
    pub duration_hours: f64,
    pub date_start: DateTime<Utc>,
    #[serde(default)]
    pub date_end: Option<DateTime<Utc>>,
}

/// Partial update of an activity. Absent fields are left unchanged;
/// `description` and `dateEnd` accept `null` to clear.
///
/// Every field keeps the explicit `null` so that validation can reject it
/// on the required ones; a required field set to `Some(None)` is left
/// unchanged by [`Record::apply_patch`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub max_volunteers: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub duration_hours: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_start: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "nullable")]
    pub date_end: Option<Option<DateTime<Utc>>>,
}

impl Record for Activity {
    const RESOURCE: &'static str = "activity";

    type Create = ActivityCreate;
    type Patch = ActivityPatch;
    type Filter = ();

    fn from_create(id: RecordId, input: ActivityCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            max_volunteers: input.max_volunteers,
            duration_hours: input.duration_hours,
            date_start: input.date_start,
            date_end: input.date_end,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: ActivityPatch, now: DateTime<Utc>) {
        if let Some(Some(name)) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(Some(max)) = patch.max_volunteers {
            self.max_volunteers = max;
        }
        if let Some(Some(hours)) = patch.duration_hours {
            self.duration_hours = hours;
        }
        if let Some(Some(start)) = patch.date_start {
            self.date_start = start;
        }
        if let Some(end) = patch.date_end {
            self.date_end = end;
        }
        self.updated_at = now;
    }

    fn matches(&self, _filter: &()) -> bool {
        true
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn check(&self) -> Result<(), StoreError> {
        match self.date_end {
            Some(end) if end < self.date_start => Err(StoreError::constraint(
                Self::RESOURCE,
                "dateEnd",
                "must not be before dateStart",
            )),
            _ => Ok(()),
        }
    }
}
