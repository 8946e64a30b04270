//! `attendance.*` procedures.
//!
//! Attendances are created and deleted, never edited. Creation checks that
//! both referenced records exist, then hands the pair and the activity's
//! quota to the store, which rejects a duplicate pair or a full activity
//! atomically with the insert.

use super::{require, ByIdInput};
use crate::validate::{Validate, ValidationErrors};
use crate::{ProcedureContext, ProcedureSpec, RegistryBuilder, RegistryError, RpcError};
use rollcall_auth::Role;
use rollcall_store::{Attendance, AttendanceCreate, AttendanceFilter, OrderBy, StoreError};
use tracing::debug;

const GROUP: &str = "attendance";

pub(super) fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register(
            GROUP,
            "create",
            ProcedureSpec::mutation(create).requires(Role::ADMIN | Role::OPERATOR),
        )?
        .register(GROUP, "getAll", ProcedureSpec::query(get_all).requires(Role::STAFF))?
        .register(GROUP, "delete", ProcedureSpec::mutation(delete).requires(Role::ADMIN))?;
    Ok(())
}

impl Validate for AttendanceCreate {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(hours) = self.hours_value {
            errors.check(
                hours.is_finite() && hours >= 0.0,
                "hoursValue",
                "must not be negative",
            );
        }
    }
}

impl Validate for AttendanceFilter {
    fn validate(&self, _errors: &mut ValidationErrors) {}
}

async fn create(
    ctx: ProcedureContext,
    mut input: AttendanceCreate,
) -> Result<Attendance, RpcError> {
    let db = ctx.db();
    let activity = require(&*db.activities, input.activity_id).await?;
    require(&*db.volunteers, input.volunteer_id).await?;

    input.hours_value.get_or_insert(activity.duration_hours);
    let quota = usize::try_from(activity.max_volunteers).unwrap_or(0);
    let scope = AttendanceFilter::activity(activity.id);

    match db.attendances.create_capped(input, &scope, quota).await {
        Ok(row) => Ok(row),
        Err(StoreError::Conflict { .. }) => Err(RpcError::invalid(
            "volunteerId",
            "volunteer is already registered for this activity",
        )),
        Err(StoreError::CapacityReached { limit, .. }) => {
            debug!(activity = %activity.id, quota = limit, "attendance quota reached");
            Err(RpcError::invalid(
                "activityId",
                format!("activity is full ({limit} volunteers)"),
            ))
        }
        Err(err) => Err(err.into()),
    }
}

async fn get_all(
    ctx: ProcedureContext,
    filter: AttendanceFilter,
) -> Result<Vec<Attendance>, RpcError> {
    Ok(ctx
        .db()
        .attendances
        .find_many(&filter, OrderBy::IdAsc)
        .await?)
}

async fn delete(ctx: ProcedureContext, input: ByIdInput) -> Result<Attendance, RpcError> {
    Ok(ctx.db().attendances.delete(input.id).await?)
}
