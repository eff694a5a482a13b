use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use super::{DataContext, single};
use crate::cache::{CacheKey, Resource};
use crate::error::Result;
use crate::gateway::{Embed, SelectQuery, Table, decode_rows, encode_row};
use crate::model::Joined;
use crate::model::attendance::{AttendanceRecord, DailyMark, NewAttendance};

pub fn key() -> CacheKey {
    CacheKey::of(Resource::Attendance)
}

pub fn key_for_date(date: NaiveDate) -> CacheKey {
    key().with("date", date)
}

/// Every attendance record with its employee, latest day first.
pub async fn fetch(ctx: &DataContext) -> Result<Arc<Vec<Joined<AttendanceRecord>>>> {
    ctx.cache()
        .read_rows(&key(), || select(ctx, SelectQuery::new()))
        .await
}

/// Records for a single day.
pub async fn fetch_for_date(
    ctx: &DataContext,
    date: NaiveDate,
) -> Result<Arc<Vec<Joined<AttendanceRecord>>>> {
    ctx.cache()
        .read_rows(&key_for_date(date), || {
            select(ctx, SelectQuery::new().where_eq("date", date))
        })
        .await
}

async fn select(ctx: &DataContext, query: SelectQuery) -> Result<Vec<Joined<AttendanceRecord>>> {
    let query = query.embed(Embed::employee(false)).order_desc("date");
    let rows = ctx.gateway().select(Table::Attendance, &query).await?;
    Ok(decode_rows(rows)?)
}

/// Manual entry for one employee and day.
pub async fn record(ctx: &DataContext, entry: NewAttendance) -> Result<AttendanceRecord> {
    let insert = entry.into_insert()?;

    let rows = ctx
        .gateway()
        .insert(Table::Attendance, vec![encode_row(&insert)?])
        .await
        .inspect_err(|e| {
            error!(error = %e, employee_id = %insert.employee_id, "Failed to record attendance")
        })?;
    let created: AttendanceRecord = single(rows, "attendance record", "new")?;

    ctx.invalidate(&[Resource::Attendance]).await;
    info!(id = %created.id, date = %created.date, "Attendance recorded");
    Ok(created)
}

/// Marks attendance for `date` in one batch. Employees that already have a
/// record that day, or appear twice in `marks`, are skipped.
pub async fn mark_daily(
    ctx: &DataContext,
    date: NaiveDate,
    marks: Vec<DailyMark>,
) -> Result<Vec<AttendanceRecord>> {
    let inserts = marks
        .into_iter()
        .map(|mark| mark.on(date).into_insert())
        .collect::<Result<Vec<_>>>()?;

    // read straight from the gateway; a cached day could be out of date
    let existing = select(ctx, SelectQuery::new().where_eq("date", date)).await?;
    let mut seen: HashSet<String> = existing.iter().map(|r| r.employee_id.clone()).collect();

    let rows = inserts
        .into_iter()
        .filter(|insert| seen.insert(insert.employee_id.clone()))
        .map(|insert| encode_row(&insert))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        info!(%date, "Attendance already marked for everyone");
        return Ok(Vec::new());
    }

    let count = rows.len();
    let stored = ctx
        .gateway()
        .insert(Table::Attendance, rows)
        .await
        .inspect_err(|e| error!(error = %e, %date, "Failed to mark daily attendance"))?;

    ctx.invalidate(&[Resource::Attendance]).await;
    info!(%date, count, "Daily attendance marked");
    Ok(decode_rows(stored)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HrmError;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::employee::test_support::new_employee;
    use crate::resource::employees;
    use crate::resource::test_support::context;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn mark(employee_id: &str, check_in: Option<(u32, u32)>) -> DailyMark {
        DailyMark {
            employee_id: employee_id.into(),
            check_in: check_in.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            check_out: check_in.and_then(|_| NaiveTime::from_hms_opt(17, 30, 0)),
            status: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn recorded_entry_appears_joined_on_next_read() {
        let (_, ctx) = context();
        let ann = employees::create(&ctx, new_employee("Ann", "Lee", 50000.0))
            .await
            .unwrap();
        assert!(fetch(&ctx).await.unwrap().is_empty());

        record(&ctx, mark(&ann.id, Some((9, 20))).on(day())).await.unwrap();

        let rows = fetch(&ctx).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Late);
        assert_eq!(rows[0].work_hours, Some(8.17));
        assert_eq!(rows[0].employee.as_ref().unwrap().full_name(), "Ann Lee");
    }

    #[tokio::test]
    async fn mark_daily_never_duplicates_a_day() {
        let (gateway, ctx) = context();

        let first = mark_daily(&ctx, day(), vec![mark("e-1", Some((9, 0))), mark("e-2", None)])
            .await
            .unwrap();
        assert_eq!(first.len(), 2);

        let second = mark_daily(
            &ctx,
            day(),
            vec![mark("e-1", Some((9, 0))), mark("e-3", None), mark("e-3", None)],
        )
        .await
        .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].employee_id, "e-3");
        assert_eq!(gateway.rows(Table::Attendance).len(), 3);
        assert_eq!(gateway.write_count(Table::Attendance), 2);
    }

    #[tokio::test]
    async fn date_scoped_key_is_refreshed_by_marking() {
        let (_, ctx) = context();
        assert!(fetch_for_date(&ctx, day()).await.unwrap().is_empty());

        mark_daily(&ctx, day(), vec![mark("e-1", None)]).await.unwrap();

        let rows = fetch_for_date(&ctx, day()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, AttendanceStatus::Absent);
    }

    #[tokio::test]
    async fn bad_entry_is_not_sent() {
        let (gateway, ctx) = context();
        let mut entry = mark("e-1", Some((18, 0))).on(day());
        entry.check_out = NaiveTime::from_hms_opt(8, 0, 0);

        assert!(matches!(
            record(&ctx, entry).await.unwrap_err(),
            HrmError::Validation(_)
        ));
        assert_eq!(gateway.write_count(Table::Attendance), 0);
    }
}
