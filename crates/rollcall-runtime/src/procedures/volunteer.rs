//! `volunteer.*` procedures.

use super::{is_blank, is_email, present, require, update_error, ByIdInput, UpdateInput};
use crate::validate::{Validate, ValidationErrors};
use crate::{NoInput, ProcedureContext, ProcedureSpec, RegistryBuilder, RegistryError, RpcError};
use rollcall_auth::Role;
use rollcall_store::{
    Activity, Attendance, AttendanceFilter, OrderBy, Volunteer, VolunteerCreate, VolunteerPatch,
};
use serde::Serialize;

const GROUP: &str = "volunteer";

pub(super) fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    let editors = Role::ADMIN | Role::OPERATOR;
    builder
        .register(GROUP, "create", ProcedureSpec::mutation(create).requires(editors))?
        .register(GROUP, "update", ProcedureSpec::mutation(update).requires(editors))?
        .register(GROUP, "getLatest", ProcedureSpec::query(get_latest).requires(Role::STAFF))?
        .register(GROUP, "getById", ProcedureSpec::query(get_by_id).requires(Role::STAFF))?
        .register(GROUP, "getAll", ProcedureSpec::query(get_all).requires(Role::STAFF))?
        .register(GROUP, "delete", ProcedureSpec::mutation(delete).requires(Role::ADMIN))?;
    Ok(())
}

/// A volunteer with the activities they attended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerDetail {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub attendances: Vec<VolunteerAttendance>,
}

/// Attendance row of a [`VolunteerDetail`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerAttendance {
    #[serde(flatten)]
    pub attendance: Attendance,
    pub activity: Option<Activity>,
}

fn check_email(email: &str, errors: &mut ValidationErrors) {
    errors.check(is_email(email), "email", "must be a valid email address");
}

impl Validate for VolunteerCreate {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.check(!is_blank(&self.name), "name", "must not be empty");
        errors.check(!is_blank(&self.unique_id), "uniqueId", "must not be empty");
        if let Some(email) = &self.email {
            check_email(email, errors);
        }
    }
}

impl Validate for VolunteerPatch {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(name) = present(&self.name, "name", errors) {
            errors.check(!is_blank(name), "name", "must not be empty");
        }
        if let Some(unique_id) = present(&self.unique_id, "uniqueId", errors) {
            errors.check(!is_blank(unique_id), "uniqueId", "must not be empty");
        }
        if let Some(Some(email)) = &self.email {
            check_email(email, errors);
        }
    }
}

async fn create(ctx: ProcedureContext, input: VolunteerCreate) -> Result<Volunteer, RpcError> {
    Ok(ctx.db().volunteers.create(input).await?)
}

async fn update(
    ctx: ProcedureContext,
    input: UpdateInput<VolunteerPatch>,
) -> Result<Volunteer, RpcError> {
    ctx.db()
        .volunteers
        .update(input.target.id, input.data)
        .await
        .map_err(update_error)
}

async fn get_latest(ctx: ProcedureContext, _input: NoInput) -> Result<Vec<Volunteer>, RpcError> {
    Ok(ctx
        .db()
        .volunteers
        .find_many(&(), OrderBy::CreatedAtDesc)
        .await?)
}

async fn get_by_id(ctx: ProcedureContext, input: ByIdInput) -> Result<VolunteerDetail, RpcError> {
    let db = ctx.db();
    let volunteer = require(&*db.volunteers, input.id).await?;
    let rows = db
        .attendances
        .find_many(&AttendanceFilter::volunteer(volunteer.id), OrderBy::IdAsc)
        .await?;

    let mut attendances = Vec::with_capacity(rows.len());
    for attendance in rows {
        let activity = db.activities.find_by_id(attendance.activity_id).await?;
        attendances.push(VolunteerAttendance {
            attendance,
            activity,
        });
    }

    Ok(VolunteerDetail {
        volunteer,
        attendances,
    })
}

async fn get_all(ctx: ProcedureContext, _input: NoInput) -> Result<Vec<Volunteer>, RpcError> {
    Ok(ctx.db().volunteers.find_many(&(), OrderBy::IdAsc).await?)
}

/// Deletes the volunteer, then their attendances.
async fn delete(ctx: ProcedureContext, input: ByIdInput) -> Result<Volunteer, RpcError> {
    let db = ctx.db();
    let volunteer = db.volunteers.delete(input.id).await?;
    let rows = db
        .attendances
        .find_many(&AttendanceFilter::volunteer(volunteer.id), OrderBy::IdAsc)
        .await?;
    for row in rows {
        db.attendances.delete(row.id).await?;
    }
    Ok(volunteer)
}
