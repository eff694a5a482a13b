use actix_web::{HttpResponse, web};

use super::MessageResponse;
use crate::error::Result;
use crate::model::leave_request::LeaveRequest;
use crate::resource::{DataContext, employees, leave_requests};
use crate::views::leave::{LeaveFilter, rows};
use crate::views::{LeavePage, Paging};

#[utoipa::path(
    get,
    path = "/api/leave",
    params(Paging, LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave requests", body = LeavePage)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    ctx: web::Data<DataContext>,
    paging: web::Query<Paging>,
    filter: web::Query<LeaveFilter>,
) -> Result<HttpResponse> {
    let (requests, staff) =
        futures::try_join!(leave_requests::fetch(&ctx), employees::fetch(&ctx))?;
    Ok(HttpResponse::Ok().json(paging.apply(rows(&requests, &staff, &filter))))
}

/// Approve Leave
#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(("id" = String, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 404, description = "No such request", body = MessageResponse),
        (status = 409, description = "Request is no longer Pending", body = MessageResponse)
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    ctx: web::Data<DataContext>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let updated = leave_requests::approve(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Reject Leave
#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(("id" = String, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 404, description = "No such request", body = MessageResponse),
        (status = 409, description = "Request is no longer Pending", body = MessageResponse)
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    ctx: web::Data<DataContext>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let updated = leave_requests::reject(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(updated))
}
