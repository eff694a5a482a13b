use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

use super::MessageResponse;
use crate::error::{HrmError, Result};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::resource::{DataContext, employees};
use crate::views::detail::{DetailRecord, DetailView};
use crate::views::employees::{EmployeeFilter, rows};
use crate::views::{EmployeePage, Paging};

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeDetail {
    pub employee: Employee,
    pub view: DetailView,
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    params(Paging, EmployeeFilter),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeePage),
        (status = 502, description = "Remote store unavailable", body = MessageResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    ctx: web::Data<DataContext>,
    paging: web::Query<Paging>,
    filter: web::Query<EmployeeFilter>,
) -> Result<HttpResponse> {
    let employees = employees::fetch(&ctx).await?;
    let page = paging.apply(rows(&employees, &filter));
    Ok(HttpResponse::Ok().json(page))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid employee", body = MessageResponse)
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    ctx: web::Data<DataContext>,
    payload: web::Json<NewEmployee>,
) -> Result<HttpResponse> {
    let employee = employees::create(&ctx, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee with its detail panel", body = EmployeeDetail),
        (status = 404, description = "No such employee", body = MessageResponse)
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    ctx: web::Data<DataContext>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let employee = employees::find(&ctx, &path).await?;
    let view = DetailRecord::Employee(&employee).view();
    Ok(HttpResponse::Ok().json(EmployeeDetail { employee, view }))
}

/// Partial update. Only known, mutable columns are accepted.
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Updated employee", body = Employee),
        (status = 400, description = "Empty or invalid patch", body = MessageResponse),
        (status = 404, description = "No such employee", body = MessageResponse)
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    ctx: web::Data<DataContext>,
    path: web::Path<String>,
    payload: web::Json<Value>,
) -> Result<HttpResponse> {
    debug!(id = %path, "Updating employee");
    let employee = employees::update_fields(&ctx, &path, &payload).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = MessageResponse),
        (status = 404, description = "No such employee", body = MessageResponse)
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    ctx: web::Data<DataContext>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    employees::delete(&ctx, &path).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Employee deleted")))
}

fn extension_for(req: &HttpRequest) -> Result<&'static str> {
    let mime = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match mime.split(';').next().unwrap_or_default().trim() {
        "image/png" => Ok("png"),
        "image/jpeg" => Ok("jpg"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        other => Err(HrmError::validation(format!(
            "`{other}` is not a supported avatar content type"
        ))),
    }
}

/// Upload avatar
///
/// The raw image is the request body; its type comes from `Content-Type`.
#[utoipa::path(
    post,
    path = "/api/employees/{id}/avatar",
    params(("id" = String, Path, description = "Employee id")),
    request_body(content = Vec<u8>, content_type = "image/png"),
    responses(
        (status = 200, description = "Employee with the new avatar URL", body = Employee),
        (status = 400, description = "Unsupported or empty image", body = MessageResponse)
    ),
    tag = "Employee"
)]
pub async fn upload_avatar(
    ctx: web::Data<DataContext>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let extension = extension_for(&req)?;
    let employee = employees::upload_avatar(&ctx, &path, body.to_vec(), extension).await?;
    Ok(HttpResponse::Ok().json(employee))
}
