use std::sync::Arc;

use serde_json::json;
use tracing::{error, info, warn};

use super::{DataContext, single};
use crate::cache::{CacheKey, Resource};
use crate::error::{HrmError, Result};
use crate::gateway::{Embed, Filter, SelectQuery, Table, decode_rows};
use crate::model::Joined;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

const RESOURCE: &str = "leave request";

pub fn key() -> CacheKey {
    CacheKey::of(Resource::LeaveRequests)
}

/// Requests whose employee still exists, newest first.
pub async fn fetch(ctx: &DataContext) -> Result<Arc<Vec<Joined<LeaveRequest>>>> {
    ctx.cache().read_rows(&key(), || select(ctx)).await
}

async fn select(ctx: &DataContext) -> Result<Vec<Joined<LeaveRequest>>> {
    let query = SelectQuery::new()
        .embed(Embed::employee(true))
        .order_desc("created_at");
    let rows = ctx.gateway().select(Table::LeaveRequests, &query).await?;
    Ok(decode_rows(rows)?)
}

pub async fn approve(ctx: &DataContext, id: &str) -> Result<LeaveRequest> {
    transition(ctx, id, LeaveStatus::Approved).await
}

pub async fn reject(ctx: &DataContext, id: &str) -> Result<LeaveRequest> {
    transition(ctx, id, LeaveStatus::Rejected).await
}

/// Moves a Pending request to `to`. The update is conditional on the stored
/// status still being Pending, so of two racing transitions only one lands.
async fn transition(ctx: &DataContext, id: &str, to: LeaveStatus) -> Result<LeaveRequest> {
    let filters = [
        Filter::equals("id", id),
        Filter::equals("status", LeaveStatus::Pending),
    ];
    let rows = ctx
        .gateway()
        .update(Table::LeaveRequests, &filters, json!({ "status": to }))
        .await
        .inspect_err(|e| error!(error = %e, id, %to, "Leave transition failed"))?;

    if rows.is_empty() {
        return Err(explain_refusal(ctx, id, to).await);
    }
    let updated: LeaveRequest = single(rows, RESOURCE, id)?;

    ctx.invalidate(&[Resource::LeaveRequests]).await;
    info!(id, %to, "Leave request updated");
    Ok(updated)
}

/// Works out why a conditional transition matched nothing.
async fn explain_refusal(ctx: &DataContext, id: &str, to: LeaveStatus) -> HrmError {
    let current = ctx
        .gateway()
        .select(
            Table::LeaveRequests,
            &SelectQuery::new().where_eq("id", id),
        )
        .await
        .map_err(HrmError::from)
        .and_then(|rows| Ok(decode_rows::<LeaveRequest>(rows)?));

    match current {
        Ok(rows) => match rows.into_iter().next() {
            Some(request) => {
                warn!(id, from = %request.status, %to, "Refusing leave transition");
                HrmError::InvalidTransition {
                    id: id.to_string(),
                    from: request.status,
                    to,
                }
            }
            None => HrmError::not_found(RESOURCE, id),
        },
        Err(e) => e,
    }
}
