use std::sync::Arc;

use tracing::{error, info, warn};

use super::{DataContext, employees};
use crate::cache::{CacheKey, Resource};
use crate::error::{HrmError, Result};
use crate::gateway::{Embed, GatewayError, SelectQuery, Table, decode_rows, encode_row};
use crate::model::Joined;
use crate::model::employee::EmployeeStatus;
use crate::model::payroll::{PayPeriod, PayrollRecord};

pub fn key() -> CacheKey {
    CacheKey::of(Resource::Payroll)
}

/// Every payroll record with its employee, newest first.
pub async fn fetch(ctx: &DataContext) -> Result<Arc<Vec<Joined<PayrollRecord>>>> {
    ctx.cache().read_rows(&key(), || select(ctx)).await
}

async fn select(ctx: &DataContext) -> Result<Vec<Joined<PayrollRecord>>> {
    let query = SelectQuery::new()
        .embed(Embed::employee(false))
        .order_desc("created_at");
    let rows = ctx.gateway().select(Table::Payroll, &query).await?;
    Ok(decode_rows(rows)?)
}

/// Creates one Pending record per Active employee for `period`, in a single
/// batch. A period is generated at most once; a concurrent generation that
/// loses the race on the store's unique key is reported the same way.
pub async fn generate(ctx: &DataContext, period: PayPeriod) -> Result<Vec<PayrollRecord>> {
    let period = PayPeriod::new(period.year, period.month)?;

    let existing = ctx
        .gateway()
        .select(
            Table::Payroll,
            &SelectQuery::new()
                .where_eq("month", period.month)
                .where_eq("year", period.year),
        )
        .await?;
    if !existing.is_empty() {
        warn!(%period, "Payroll already generated");
        return Err(HrmError::PeriodAlreadyGenerated(period));
    }

    let policy = ctx.payroll_policy();
    let rows = employees::fetch(ctx)
        .await?
        .iter()
        .filter(|e| e.status == EmployeeStatus::Active)
        .map(|e| encode_row(&policy.compute(e, period)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Err(HrmError::validation(format!(
            "no active employees to pay for {period}"
        )));
    }

    let count = rows.len();
    let stored = ctx
        .gateway()
        .insert(Table::Payroll, rows)
        .await
        .map_err(|e| match e {
            GatewayError::Conflict(_) => {
                warn!(%period, "Payroll generated concurrently");
                HrmError::PeriodAlreadyGenerated(period)
            }
            e => {
                error!(error = %e, %period, "Payroll generation failed");
                e.into()
            }
        })?;

    ctx.invalidate(&[Resource::Payroll]).await;
    info!(%period, count, "Payroll generated");
    Ok(decode_rows(stored)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::test_support::new_employee;
    use crate::model::payroll::PayrollStatus;
    use crate::resource::test_support::context;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn january() -> PayPeriod {
        PayPeriod::new(2024, 1).unwrap()
    }

    #[tokio::test]
    async fn generates_for_active_employees_only() {
        let (_, ctx) = context();
        let ann = employees::create(&ctx, new_employee("Ann", "Lee", 60000.0))
            .await
            .unwrap();
        let bob = employees::create(&ctx, new_employee("Bob", "Stone", 48000.0))
            .await
            .unwrap();
        employees::update_fields(&ctx, &bob.id, &json!({"status": "Inactive"}))
            .await
            .unwrap();
        assert!(fetch(&ctx).await.unwrap().is_empty());

        let created = generate(&ctx, january()).await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].employee_id, ann.id);
        assert_eq!(created[0].net_salary, 5100.0);
        assert_eq!(created[0].status, PayrollStatus::Pending);

        let rows = fetch(&ctx).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].employee.as_ref().unwrap().full_name(), "Ann Lee");
    }

    #[tokio::test]
    async fn second_generation_for_a_period_is_rejected() {
        let (gateway, ctx) = context();
        employees::create(&ctx, new_employee("Ann", "Lee", 60000.0))
            .await
            .unwrap();
        generate(&ctx, january()).await.unwrap();
        let writes = gateway.write_count(Table::Payroll);

        let err = generate(&ctx, january()).await.unwrap_err();

        assert!(matches!(err, HrmError::PeriodAlreadyGenerated(p) if p == january()));
        assert_eq!(gateway.write_count(Table::Payroll), writes);
        assert_eq!(gateway.rows(Table::Payroll).len(), 1);

        // other months are still open
        generate(&ctx, PayPeriod::new(2024, 2).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_generations_store_one_batch() {
        let (gateway, ctx) = context();
        employees::create(&ctx, new_employee("Ann", "Lee", 60000.0))
            .await
            .unwrap();
        gateway.set_latency(std::time::Duration::from_millis(20));

        let (a, b) = tokio::join!(generate(&ctx, january()), generate(&ctx, january()));

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(matches!(err, HrmError::PeriodAlreadyGenerated(p) if p == january()));
        assert_eq!(gateway.rows(Table::Payroll).len(), 1);
    }

    #[tokio::test]
    async fn nobody_to_pay_is_a_validation_error() {
        let (gateway, ctx) = context();
        assert!(matches!(
            generate(&ctx, january()).await.unwrap_err(),
            HrmError::Validation(_)
        ));
        assert_eq!(gateway.write_count(Table::Payroll), 0);
    }
}
