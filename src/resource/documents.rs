use std::sync::Arc;

use super::DataContext;
use crate::cache::{CacheKey, Resource};
use crate::error::{HrmError, Result};
use crate::gateway::{Embed, SelectQuery, Table, decode_rows};
use crate::model::Joined;
use crate::model::document::DocumentRecord;

pub fn key() -> CacheKey {
    CacheKey::of(Resource::Documents)
}

pub async fn fetch(ctx: &DataContext) -> Result<Arc<Vec<Joined<DocumentRecord>>>> {
    ctx.cache().read_rows(&key(), || select(ctx)).await
}

async fn select(ctx: &DataContext) -> Result<Vec<Joined<DocumentRecord>>> {
    let query = SelectQuery::new()
        .embed(Embed::employee(false))
        .order_desc("created_at");
    let rows = ctx.gateway().select(Table::Documents, &query).await?;
    Ok(decode_rows(rows)?)
}

/// Public URL of the stored file.
pub fn download_url(ctx: &DataContext, doc: &DocumentRecord) -> Result<String> {
    let path = doc
        .file_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| HrmError::not_found("document file", &doc.id))?;
    Ok(ctx.gateway().public_url(&ctx.buckets().documents, path))
}

pub async fn download_url_by_id(ctx: &DataContext, id: &str) -> Result<String> {
    let docs = fetch(ctx).await?;
    let doc = docs
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| HrmError::not_found("document", id))?;
    download_url(ctx, doc)
}
