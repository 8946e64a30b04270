//! Dashboard procedures.
//!
//! Three resource groups, each registered with a fixed access rule:
//!
//! | Procedure | Kind | Roles |
//! |-----------|------|-------|
//! | `activity.create` / `update` / `delete` | mutation | ADMIN |
//! | `activity.getLatest` / `getById` / `getAll` | query | ADMIN, OPERATOR, READER |
//! | `volunteer.create` / `update` | mutation | ADMIN, OPERATOR |
//! | `volunteer.delete` | mutation | ADMIN |
//! | `volunteer.getLatest` / `getById` / `getAll` | query | ADMIN, OPERATOR, READER |
//! | `attendance.create` | mutation | ADMIN, OPERATOR |
//! | `attendance.delete` | mutation | ADMIN |
//! | `attendance.getAll` | query | ADMIN, OPERATOR, READER |
//!
//! Handlers never look at roles. By the time one runs, the dispatcher has
//! authorized the session and validated the input.

mod activity;
mod attendance;
mod volunteer;
#[cfg(test)]
mod yielding;

pub use activity::{ActivityAttendance, ActivityDetail};
pub use volunteer::{VolunteerAttendance, VolunteerDetail};

use crate::validate::{nest_serde_message, Validate, ValidationErrors};
use crate::{ProcedureRegistry, RegistryBuilder, RegistryError, RpcError};
use rollcall_store::{Record, Repository, StoreError};
use rollcall_types::RecordId;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Builds the registry with every dashboard procedure.
///
/// # Errors
///
/// Returns [`RegistryError`] if two procedures share an address or one
/// lacks an access rule. Either is a programming error; callers should
/// abort startup.
pub fn default_registry() -> Result<ProcedureRegistry, RegistryError> {
    let mut builder = RegistryBuilder::new();
    register_all(&mut builder)?;
    Ok(builder.build())
}

/// Adds every dashboard procedure to `builder`.
///
/// # Errors
///
/// See [`default_registry`].
pub fn register_all(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    activity::register(builder)?;
    volunteer::register(builder)?;
    attendance::register(builder)?;
    Ok(())
}

/// Input addressing one record: `{ "id": 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ByIdInput {
    pub id: RecordId,
}

impl Validate for ByIdInput {
    fn validate(&self, _errors: &mut ValidationErrors) {}
}

/// Input of `update` procedures: `{ "where": { "id": 3 }, "data": { ... } }`.
///
/// Issues inside either part are reported with the part as prefix
/// (`where.id`, `data.name`), so clients can tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInput<P> {
    pub target: ByIdInput,
    pub data: P,
}

impl<'de, P: DeserializeOwned> Deserialize<'de> for UpdateInput<P> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Envelope {
            #[serde(rename = "where")]
            target: Value,
            data: Value,
        }

        let envelope = Envelope::deserialize(deserializer)?;
        Ok(Self {
            target: nested(Self::WHERE, envelope.target)?,
            data: nested(Self::DATA, envelope.data)?,
        })
    }
}

impl<P> UpdateInput<P> {
    const WHERE: &'static str = "where";
    const DATA: &'static str = "data";
}

impl<P: Validate> Validate for UpdateInput<P> {
    fn validate(&self, errors: &mut ValidationErrors) {
        let mut data = ValidationErrors::new();
        self.data.validate(&mut data);
        errors.extend_nested(Self::DATA, data);
    }
}

fn nested<T: DeserializeOwned, E: de::Error>(key: &str, value: Value) -> Result<T, E> {
    T::deserialize(value).map_err(|e| E::custom(nest_serde_message(key, &e.to_string())))
}

/// Maps a failed `update` call, attributing record invariants to the
/// `data` part of the input.
fn update_error(err: StoreError) -> RpcError {
    match err {
        StoreError::Constraint { field, reason, .. } => RpcError::invalid(
            format!("{}.{field}", UpdateInput::<()>::DATA),
            reason,
        ),
        err => err.into(),
    }
}

/// Reads a patch field that may be absent but not `null`.
fn present<'a, T>(
    value: &'a Option<Option<T>>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<&'a T> {
    match value {
        Some(Some(value)) => Some(value),
        Some(None) => {
            errors.push(field, "must not be null");
            None
        }
        None => None,
    }
}

/// Loads a record or fails with [`RpcError::NotFound`].
async fn require<R: Record>(repo: &dyn Repository<R>, id: RecordId) -> Result<R, RpcError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| RpcError::record_not_found(R::RESOURCE, id))
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// `local@domain` with both parts non-empty.
fn is_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.trim().is_empty() && !domain.trim().is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::parse_input;
    use rollcall_auth::{Access, Role};
    use rollcall_store::VolunteerPatch;
    use rollcall_types::ErrorCode;
    use serde_json::json;

    #[test]
    fn default_registry_matches_policy() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 15);

        let roles = |group: &str, name: &str| match registry.resolve(group, name).unwrap().access()
        {
            Access::AnyOf(roles) => roles,
            Access::Public => panic!("{group}.{name} must not be public"),
        };

        assert_eq!(roles("activity", "create"), Role::ADMIN);
        assert_eq!(roles("activity", "getLatest"), Role::STAFF);
        assert_eq!(roles("volunteer", "create"), Role::ADMIN | Role::OPERATOR);
        assert_eq!(roles("volunteer", "delete"), Role::ADMIN);
        assert_eq!(roles("attendance", "create"), Role::ADMIN | Role::OPERATOR);
        assert_eq!(roles("attendance", "getAll"), Role::STAFF);
    }

    #[test]
    fn no_procedure_is_public() {
        let registry = default_registry().unwrap();
        assert!(registry.iter().all(|p| !p.access().is_public()));
    }

    #[test]
    fn registering_twice_fails() {
        let mut builder = RegistryBuilder::new();
        register_all(&mut builder).unwrap();
        let err = register_all(&mut builder).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateProcedure { .. }));
    }

    #[test]
    fn update_input_reads_where_and_data() {
        let input: UpdateInput<VolunteerPatch> =
            parse_input(json!({"where": {"id": 4}, "data": {"name": "Ana"}})).unwrap();
        assert_eq!(input.target.id, RecordId(4));
        assert_eq!(input.data.name, Some(Some("Ana".to_string())));
    }

    #[test]
    fn update_input_prefixes_nested_fields() {
        let err = parse_input::<UpdateInput<VolunteerPatch>>(json!({
            "where": {"id": 4},
            "data": {"nickname": "Ana"},
        }))
        .unwrap_err();
        assert_eq!(err.issues()[0].field, "data.nickname");

        let err = parse_input::<UpdateInput<VolunteerPatch>>(json!({
            "where": {},
            "data": {},
        }))
        .unwrap_err();
        assert_eq!(err.issues()[0].field, "where.id");

        let err = parse_input::<UpdateInput<VolunteerPatch>>(json!({"where": {"id": 4}}))
            .unwrap_err();
        assert_eq!(err.issues()[0].field, "data");

        let err = parse_input::<UpdateInput<VolunteerPatch>>(json!({
            "where": {"id": 4},
            "data": {"name": " ", "email": "nope"},
        }))
        .unwrap_err();
        let fields: Vec<_> = err.issues().iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, ["data.name", "data.email"]);
    }

    #[test]
    fn update_input_rejects_null_required_field() {
        let err = parse_input::<UpdateInput<VolunteerPatch>>(json!({
            "where": {"id": 4},
            "data": {"uniqueId": null},
        }))
        .unwrap_err();
        assert_eq!(err.issues()[0].field, "data.uniqueId");
        assert_eq!(err.issues()[0].message, "must not be null");
    }

    #[test]
    fn constraint_maps_to_data_field() {
        let err = update_error(StoreError::constraint("activity", "dateEnd", "too early"));
        assert_eq!(err, RpcError::invalid("data.dateEnd", "too early"));

        let err = update_error(StoreError::not_found("activity", RecordId(2)));
        assert_eq!(err.code(), "RPC_NOT_FOUND");
    }

    #[test]
    fn by_id_rejects_missing_and_extra_fields() {
        let err = parse_input::<ByIdInput>(json!({})).unwrap_err();
        assert_eq!(err.issues()[0].field, "id");

        let err = parse_input::<ByIdInput>(json!({"id": 1, "name": "x"})).unwrap_err();
        assert_eq!(err.issues()[0].field, "name");
    }

    #[test]
    fn email_shape() {
        assert!(is_email("ana@example.org"));
        assert!(!is_email("ana"));
        assert!(!is_email("@example.org"));
        assert!(!is_email("ana@"));
    }
}
