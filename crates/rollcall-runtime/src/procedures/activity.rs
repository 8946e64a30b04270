//! `activity.*` procedures.

use super::{is_blank, present, require, update_error, ByIdInput, UpdateInput};
use crate::validate::{Validate, ValidationErrors};
use crate::{NoInput, ProcedureContext, ProcedureSpec, RegistryBuilder, RegistryError, RpcError};
use rollcall_auth::Role;
use rollcall_store::{
    Activity, ActivityCreate, ActivityPatch, Attendance, AttendanceFilter, OrderBy, Volunteer,
};
use serde::Serialize;

const GROUP: &str = "activity";

pub(super) fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register(GROUP, "create", ProcedureSpec::mutation(create).requires(Role::ADMIN))?
        .register(GROUP, "update", ProcedureSpec::mutation(update).requires(Role::ADMIN))?
        .register(GROUP, "getLatest", ProcedureSpec::query(get_latest).requires(Role::STAFF))?
        .register(GROUP, "getById", ProcedureSpec::query(get_by_id).requires(Role::STAFF))?
        .register(GROUP, "getAll", ProcedureSpec::query(get_all).requires(Role::STAFF))?
        .register(GROUP, "delete", ProcedureSpec::mutation(delete).requires(Role::ADMIN))?;
    Ok(())
}

/// An activity with its attendances, each embedding the volunteer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    pub attendances: Vec<ActivityAttendance>,
}

/// Attendance row of an [`ActivityDetail`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAttendance {
    #[serde(flatten)]
    pub attendance: Attendance,
    /// `None` if the volunteer was removed concurrently.
    pub volunteer: Option<Volunteer>,
}

impl Validate for ActivityCreate {
    fn validate(&self, errors: &mut ValidationErrors) {
        errors.check(!is_blank(&self.name), "name", "must not be empty");
        errors.check(self.max_volunteers >= 1, "maxVolunteers", "must be at least 1");
        errors.check(
            self.duration_hours.is_finite() && self.duration_hours > 0.0,
            "durationHours",
            "must be greater than 0",
        );
        if let Some(end) = self.date_end {
            errors.check(end >= self.date_start, "dateEnd", "must not be before dateStart");
        }
    }
}

impl Validate for ActivityPatch {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(name) = present(&self.name, "name", errors) {
            errors.check(!is_blank(name), "name", "must not be empty");
        }
        if let Some(&max) = present(&self.max_volunteers, "maxVolunteers", errors) {
            errors.check(max >= 1, "maxVolunteers", "must be at least 1");
        }
        if let Some(&hours) = present(&self.duration_hours, "durationHours", errors) {
            errors.check(
                hours.is_finite() && hours > 0.0,
                "durationHours",
                "must be greater than 0",
            );
        }
        let start = present(&self.date_start, "dateStart", errors);
        if let (Some(start), Some(Some(end))) = (start, &self.date_end) {
            errors.check(end >= start, "dateEnd", "must not be before dateStart");
        }
    }
}

async fn create(ctx: ProcedureContext, input: ActivityCreate) -> Result<Activity, RpcError> {
    Ok(ctx.db().activities.create(input).await?)
}

/// Applies the patch. Date ordering against the stored record is checked
/// by the store together with the write.
async fn update(
    ctx: ProcedureContext,
    input: UpdateInput<ActivityPatch>,
) -> Result<Activity, RpcError> {
    ctx.db()
        .activities
        .update(input.target.id, input.data)
        .await
        .map_err(update_error)
}

async fn get_latest(ctx: ProcedureContext, _input: NoInput) -> Result<Vec<Activity>, RpcError> {
    Ok(ctx
        .db()
        .activities
        .find_many(&(), OrderBy::CreatedAtDesc)
        .await?)
}

async fn get_by_id(ctx: ProcedureContext, input: ByIdInput) -> Result<ActivityDetail, RpcError> {
    let db = ctx.db();
    let activity = require(&*db.activities, input.id).await?;
    let rows = db
        .attendances
        .find_many(&AttendanceFilter::activity(activity.id), OrderBy::IdAsc)
        .await?;

    let mut attendances = Vec::with_capacity(rows.len());
    for attendance in rows {
        let volunteer = db.volunteers.find_by_id(attendance.volunteer_id).await?;
        attendances.push(ActivityAttendance {
            attendance,
            volunteer,
        });
    }

    Ok(ActivityDetail {
        activity,
        attendances,
    })
}

async fn get_all(ctx: ProcedureContext, _input: NoInput) -> Result<Vec<Activity>, RpcError> {
    Ok(ctx.db().activities.find_many(&(), OrderBy::IdAsc).await?)
}

/// Deletes the activity, then its attendances.
async fn delete(ctx: ProcedureContext, input: ByIdInput) -> Result<Activity, RpcError> {
    let db = ctx.db();
    let activity = db.activities.delete(input.id).await?;
    let rows = db
        .attendances
        .find_many(&AttendanceFilter::activity(activity.id), OrderBy::IdAsc)
        .await?;
    for row in rows {
        db.attendances.delete(row.id).await?;
    }
    Ok(activity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedures::yielding::yielding_database;
    use crate::validate::parse_input;
    use chrono::{DateTime, Utc};
    use rollcall_store::{AttendanceCreate, Database, VolunteerCreate};
    use rollcall_types::{RecordId, RequestId};
    use serde_json::json;

    fn ctx() -> ProcedureContext {
        ProcedureContext::new(RequestId::new(), None, Database::in_memory())
    }

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn field_names(err: &ValidationErrors) -> Vec<&str> {
        err.issues().iter().map(|i| i.field.as_str()).collect()
    }

    async fn seed_activity(ctx: &ProcedureContext, name: &str) -> Activity {
        let input: ActivityCreate =
            parse_input(json!({"name": name, "dateStart": "2026-05-01T09:00:00Z"})).unwrap();
        create(ctx.clone(), input).await.unwrap()
    }

    #[test]
    fn create_rules() {
        let err = parse_input::<ActivityCreate>(json!({
            "name": "  ",
            "maxVolunteers": 0,
            "durationHours": -1.0,
            "dateStart": "2026-05-02T00:00:00Z",
            "dateEnd": "2026-05-01T00:00:00Z",
        }))
        .unwrap_err();

        assert_eq!(
            field_names(&err),
            ["name", "maxVolunteers", "durationHours", "dateEnd"]
        );
    }

    #[test]
    fn create_requires_date_start() {
        let err = parse_input::<ActivityCreate>(json!({"name": "Cleanup"})).unwrap_err();
        assert_eq!(field_names(&err), ["dateStart"]);
    }

    #[test]
    fn patch_rules() {
        assert!(parse_input::<ActivityPatch>(json!({})).is_ok());
        assert!(parse_input::<ActivityPatch>(json!({"description": null})).is_ok());

        let err = parse_input::<ActivityPatch>(json!({"name": "", "maxVolunteers": 0}))
            .unwrap_err();
        assert_eq!(field_names(&err), ["name", "maxVolunteers"]);
    }

    #[test]
    fn patch_rejects_null_on_required_fields() {
        let err = parse_input::<ActivityPatch>(json!({
            "name": null,
            "maxVolunteers": null,
            "durationHours": null,
            "dateStart": null,
            "dateEnd": null,
        }))
        .unwrap_err();
        assert_eq!(
            field_names(&err),
            ["name", "maxVolunteers", "durationHours", "dateStart"]
        );
        assert!(err.issues().iter().all(|i| i.message == "must not be null"));
    }

    #[tokio::test]
    async fn latest_is_newest_first() {
        let ctx = ctx();
        seed_activity(&ctx, "first").await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        seed_activity(&ctx, "second").await;

        let latest = get_latest(ctx.clone(), NoInput {}).await.unwrap();
        let names: Vec<_> = latest.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);

        let all = get_all(ctx, NoInput {}).await.unwrap();
        let names: Vec<_> = all.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[tokio::test]
    async fn update_checks_dates_against_stored_record() {
        let ctx = ctx();
        let activity = seed_activity(&ctx, "Cleanup").await;

        let input = parse_input(json!({
            "where": {"id": activity.id},
            "data": {"dateEnd": "2026-04-30T00:00:00Z"},
        }))
        .unwrap();
        let err = update(ctx.clone(), input).await.unwrap_err();
        assert_eq!(err.fields().unwrap()[0].field, "data.dateEnd");

        let input = parse_input(json!({
            "where": {"id": activity.id},
            "data": {"dateEnd": "2026-05-01T12:00:00Z", "description": "bring gloves"},
        }))
        .unwrap();
        let updated = update(ctx, input).await.unwrap();
        assert_eq!(updated.date_end, Some(at("2026-05-01T12:00:00Z")));
        assert_eq!(updated.description.as_deref(), Some("bring gloves"));
    }

    #[tokio::test]
    async fn concurrent_date_updates_cannot_cross() {
        let ctx = ProcedureContext::new(RequestId::new(), None, yielding_database());
        let input: ActivityCreate = parse_input(json!({
            "name": "Cleanup",
            "dateStart": "2026-05-01T09:00:00Z",
            "dateEnd": "2026-05-01T12:00:00Z",
        }))
        .unwrap();
        let activity = create(ctx.clone(), input).await.unwrap();

        // Each patch is consistent with the stored row on its own.
        let later_start = parse_input(json!({
            "where": {"id": activity.id},
            "data": {"dateStart": "2026-05-01T11:00:00Z"},
        }))
        .unwrap();
        let earlier_end = parse_input(json!({
            "where": {"id": activity.id},
            "data": {"dateEnd": "2026-05-01T10:00:00Z"},
        }))
        .unwrap();

        let (first, second) = tokio::join!(
            update(ctx.clone(), later_start),
            update(ctx.clone(), earlier_end),
        );
        let rejected = match (first, second) {
            (Ok(_), Err(err)) | (Err(err), Ok(_)) => err,
            other => panic!("exactly one update must succeed: {other:?}"),
        };
        assert_eq!(rejected.fields().unwrap()[0].field, "data.dateEnd");

        let stored = ctx
            .db()
            .activities
            .find_by_id(activity.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.date_end.map_or(true, |end| end >= stored.date_start));
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let input = parse_input(json!({"where": {"id": 9}, "data": {"name": "x"}})).unwrap();
        let err = update(ctx(), input).await.unwrap_err();
        assert_eq!(
            err,
            RpcError::NotFound {
                target: "activity 9".into()
            }
        );
    }

    #[tokio::test]
    async fn detail_embeds_volunteers() {
        let ctx = ctx();
        let activity = seed_activity(&ctx, "Cleanup").await;
        let volunteer = ctx
            .db()
            .volunteers
            .create(VolunteerCreate {
                name: "Ana".into(),
                unique_id: "V-1".into(),
                phone: None,
                email: None,
            })
            .await
            .unwrap();
        ctx.db()
            .attendances
            .create(AttendanceCreate {
                activity_id: activity.id,
                volunteer_id: volunteer.id,
                date_time: None,
                hours_value: Some(2.0),
            })
            .await
            .unwrap();

        let detail = get_by_id(ctx, ByIdInput { id: activity.id }).await.unwrap();
        assert_eq!(detail.attendances.len(), 1);
        assert_eq!(detail.attendances[0].volunteer.as_ref(), Some(&volunteer));

        let wire = serde_json::to_value(&detail).unwrap();
        assert_eq!(wire["name"], "Cleanup");
        assert_eq!(wire["attendances"][0]["hoursValue"], 2.0);
        assert_eq!(wire["attendances"][0]["volunteer"]["uniqueId"], "V-1");
    }

    #[tokio::test]
    async fn delete_cascades_to_attendances() {
        let ctx = ctx();
        let kept = seed_activity(&ctx, "kept").await;
        let removed = seed_activity(&ctx, "removed").await;
        for activity_id in [kept.id, removed.id] {
            ctx.db()
                .attendances
                .create(AttendanceCreate {
                    activity_id,
                    volunteer_id: RecordId(1),
                    date_time: None,
                    hours_value: None,
                })
                .await
                .unwrap();
        }

        let deleted = delete(ctx.clone(), ByIdInput { id: removed.id })
            .await
            .unwrap();
        assert_eq!(deleted.id, removed.id);

        let left = ctx
            .db()
            .attendances
            .find_many(&AttendanceFilter::default(), OrderBy::IdAsc)
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].activity_id, kept.id);

        let err = delete(ctx, ByIdInput { id: removed.id }).await.unwrap_err();
        assert!(matches!(err, RpcError::NotFound { .. }));
    }
}
