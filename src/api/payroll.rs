use actix_web::{HttpResponse, web};

use super::MessageResponse;
use crate::error::Result;
use crate::model::payroll::{PayPeriod, PayrollRecord};
use crate::resource::{DataContext, employees, payroll};
use crate::views::payroll::{PayrollFilter, latest_period, rows};
use crate::views::{Paging, PayrollPage};

/// List Payrolls
///
/// Without a `period` the most recent generated period is shown.
#[utoipa::path(
    get,
    path = "/api/payroll",
    params(Paging, PayrollFilter),
    responses(
        (status = 200, description = "Paginated payroll records", body = PayrollPage),
        (status = 400, description = "Malformed period", body = MessageResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    ctx: web::Data<DataContext>,
    paging: web::Query<Paging>,
    filter: web::Query<PayrollFilter>,
) -> Result<HttpResponse> {
    let requested = filter.period()?;
    let (records, staff) = futures::try_join!(payroll::fetch(&ctx), employees::fetch(&ctx))?;
    let period = requested.or_else(|| latest_period(&records));
    Ok(HttpResponse::Ok().json(paging.apply(rows(&records, &staff, period, &filter))))
}

/// Generate Payroll
///
/// One Pending record per Active employee. A period can only be generated once.
#[utoipa::path(
    post,
    path = "/api/payroll/generate",
    request_body = PayPeriod,
    responses(
        (status = 201, description = "Payroll generated", body = [PayrollRecord]),
        (status = 400, description = "Invalid period or nobody to pay", body = MessageResponse),
        (status = 409, description = "Period already generated", body = MessageResponse)
    ),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    ctx: web::Data<DataContext>,
    payload: web::Json<PayPeriod>,
) -> Result<HttpResponse> {
    let created = payroll::generate(&ctx, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}
