use actix_web::{HttpResponse, web};

use super::MessageResponse;
use crate::cache::CacheEntrySummary;
use crate::error::Result;
use crate::preferences::{PreferenceStore, Preferences, PreferencesUpdate};
use crate::resource::DataContext;

#[utoipa::path(
    get,
    path = "/api/preferences",
    responses((status = 200, description = "Current theme and primary color", body = Preferences)),
    tag = "Settings"
)]
pub async fn get_preferences(store: web::Data<PreferenceStore>) -> HttpResponse {
    HttpResponse::Ok().json(store.get())
}

#[utoipa::path(
    put,
    path = "/api/preferences",
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Saved preferences", body = Preferences),
        (status = 400, description = "Color not in the palette", body = MessageResponse)
    ),
    tag = "Settings"
)]
pub async fn update_preferences(
    store: web::Data<PreferenceStore>,
    payload: web::Json<PreferencesUpdate>,
) -> Result<HttpResponse> {
    let saved = store.update(payload.into_inner())?;
    Ok(HttpResponse::Ok().json(saved))
}

/// Cache status
///
/// One entry per key the cache has seen, with its fetch status and staleness.
#[utoipa::path(
    get,
    path = "/api/cache",
    responses((status = 200, description = "Cache status table", body = [CacheEntrySummary])),
    tag = "Settings"
)]
pub async fn cache_status(ctx: web::Data<DataContext>) -> HttpResponse {
    HttpResponse::Ok().json(ctx.cache().entries())
}
