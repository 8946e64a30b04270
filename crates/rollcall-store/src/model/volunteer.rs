//! Volunteer records.

use super::{nullable, Record};
use chrono::{DateTime, Utc};
use rollcall_types::RecordId;
use serde::{Deserialize, Serialize};

/// A registered volunteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: RecordId,
    pub name: String,
    /// Organization-issued identifier (member number, national id, ...).
    pub unique_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input of `volunteer.create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VolunteerCreate {
    pub name: String,
    pub unique_id: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Partial update of a volunteer. `phone` and `email` accept `null` to
/// clear; `null` on `name` or `uniqueId` is kept for validation to reject.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VolunteerPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub unique_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
}

impl Record for Volunteer {
    const RESOURCE: &'static str = "volunteer";

    type Create = VolunteerCreate;
    type Patch = VolunteerPatch;
    type Filter = ();

    fn from_create(id: RecordId, input: VolunteerCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            unique_id: input.unique_id,
            phone: input.phone,
            email: input.email,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: VolunteerPatch, now: DateTime<Utc>) {
        if let Some(Some(name)) = patch.name {
            self.name = name;
        }
        if let Some(Some(unique_id)) = patch.unique_id {
            self.unique_id = unique_id;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_unique_id() {
        let err = serde_json::from_str::<VolunteerCreate>(r#"{"name": "Ana"}"#).unwrap_err();
        assert!(err.to_string().contains("missing field `uniqueId`"), "{err}");
    }

    #[test]
    fn patch_clears_email() {
        let now = Utc::now();
        let mut v = Volunteer::from_create(
            RecordId(1),
            VolunteerCreate {
                name: "Ana".into(),
                unique_id: "V-1".into(),
                phone: None,
                email: Some("ana@example.org".into()),
            },
            now,
        );
        let patch: VolunteerPatch = serde_json::from_str(r#"{"email": null}"#).unwrap();
        v.apply_patch(patch, now);
        assert_eq!(v.email, None);
        assert_eq!(v.unique_id, "V-1");
    }
}
