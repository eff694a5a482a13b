use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{error, info};
use uuid::Uuid;

use super::{DataContext, single};
use crate::cache::{CacheKey, Resource};
use crate::error::{HrmError, Result};
use crate::gateway::{Filter, SelectQuery, Table, decode_rows, encode_row};
use crate::model::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::utils::patch::{Column, ColumnKind, build_patch};

const RESOURCE: &str = "employee";

/// Reads that show employee data: the list itself plus every joined read.
const AFFECTED_BY_EMPLOYEE_CHANGE: [Resource; 5] = [
    Resource::Employees,
    Resource::Attendance,
    Resource::LeaveRequests,
    Resource::Payroll,
    Resource::Documents,
];

const PATCHABLE: &[Column] = &[
    Column::new("first_name", ColumnKind::Text),
    Column::new("last_name", ColumnKind::Text),
    Column::new("email", ColumnKind::Email),
    Column::new("phone", ColumnKind::NullableText),
    Column::new("department", ColumnKind::Text),
    Column::new("role", ColumnKind::Text),
    Column::new("salary", ColumnKind::Amount),
    Column::new(
        "status",
        ColumnKind::Choice(&["Active", "Inactive", "On Leave"]),
    ),
    Column::new("join_date", ColumnKind::Date),
];

const IMMUTABLE: &[&str] = &["id", "created_at", "avatar_url"];

const AVATAR_EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

pub fn key() -> CacheKey {
    CacheKey::of(Resource::Employees)
}

/// All employees, newest first.
pub async fn fetch(ctx: &DataContext) -> Result<Arc<Vec<Employee>>> {
    ctx.cache().read_rows(&key(), || select(ctx)).await
}

async fn select(ctx: &DataContext) -> Result<Vec<Employee>> {
    let rows = ctx
        .gateway()
        .select(Table::Employees, &SelectQuery::new().order_desc("created_at"))
        .await?;
    Ok(decode_rows(rows)?)
}

pub async fn find(ctx: &DataContext, id: &str) -> Result<Employee> {
    fetch(ctx)
        .await?
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .ok_or_else(|| HrmError::not_found(RESOURCE, id))
}

pub async fn create(ctx: &DataContext, new: NewEmployee) -> Result<Employee> {
    new.validate()?;

    let rows = ctx
        .gateway()
        .insert(Table::Employees, vec![encode_row(&new)?])
        .await
        .inspect_err(|e| error!(error = %e, email = %new.email, "Failed to create employee"))?;
    let created: Employee = single(rows, RESOURCE, "new")?;

    ctx.invalidate(&[Resource::Employees]).await;
    info!(id = %created.id, "Employee created");
    Ok(created)
}

pub async fn update(ctx: &DataContext, id: &str, update: EmployeeUpdate) -> Result<Employee> {
    update.validate()?;
    apply_patch(ctx, id, encode_row(&update)?).await
}

/// Like [`update`], for an untyped JSON patch. Only known, mutable columns
/// are accepted.
pub async fn update_fields(ctx: &DataContext, id: &str, payload: &Value) -> Result<Employee> {
    let patch = build_patch(payload, PATCHABLE, IMMUTABLE)?;
    apply_patch(ctx, id, patch).await
}

async fn apply_patch(ctx: &DataContext, id: &str, patch: Value) -> Result<Employee> {
    let rows = ctx
        .gateway()
        .update(Table::Employees, &[Filter::equals("id", id)], patch)
        .await
        .inspect_err(|e| error!(error = %e, id, "Failed to update employee"))?;
    let updated: Employee = single(rows, RESOURCE, id)?;

    ctx.invalidate(&AFFECTED_BY_EMPLOYEE_CHANGE).await;
    info!(id, "Employee updated");
    Ok(updated)
}

pub async fn delete(ctx: &DataContext, id: &str) -> Result<()> {
    let deleted = ctx
        .gateway()
        .delete(Table::Employees, &[Filter::equals("id", id)])
        .await
        .inspect_err(|e| error!(error = %e, id, "Failed to delete employee"))?;
    if deleted.is_empty() {
        return Err(HrmError::not_found(RESOURCE, id));
    }

    ctx.invalidate(&AFFECTED_BY_EMPLOYEE_CHANGE).await;
    info!(id, "Employee deleted");
    Ok(())
}

/// Stores the image under a fresh name and points the employee at its
/// public URL.
pub async fn upload_avatar(
    ctx: &DataContext,
    id: &str,
    bytes: Vec<u8>,
    extension: &str,
) -> Result<Employee> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    let content_type = AVATAR_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| HrmError::validation(format!("`{extension}` is not a supported image type")))?;
    if bytes.is_empty() {
        return Err(HrmError::validation("avatar image is empty"));
    }

    let bucket = &ctx.buckets().avatars;
    let path = format!("{}.{extension}", Uuid::new_v4());
    ctx.gateway()
        .upload(bucket, &path, bytes, content_type)
        .await
        .inspect_err(|e| error!(error = %e, id, "Failed to upload avatar"))?;

    let url = ctx.gateway().public_url(bucket, &path);
    apply_patch(ctx, id, json!({ "avatar_url": url })).await
}
