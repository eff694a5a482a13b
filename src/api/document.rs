use actix_web::{HttpResponse, http::header, web};

use super::MessageResponse;
use crate::error::Result;
use crate::resource::{DataContext, documents, employees};
use crate::views::documents::{DocumentFilter, rows};
use crate::views::{DocumentPage, Paging};

#[utoipa::path(
    get,
    path = "/api/documents",
    params(Paging, DocumentFilter),
    responses(
        (status = 200, description = "Paginated documents", body = DocumentPage)
    ),
    tag = "Document"
)]
pub async fn list_documents(
    ctx: web::Data<DataContext>,
    paging: web::Query<Paging>,
    filter: web::Query<DocumentFilter>,
) -> Result<HttpResponse> {
    let (docs, staff) = futures::try_join!(documents::fetch(&ctx), employees::fetch(&ctx))?;
    Ok(HttpResponse::Ok().json(paging.apply(rows(&docs, &staff, &filter))))
}

/// Download Document
///
/// Redirects to the stored object's public URL.
#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 302, description = "Redirect to the file"),
        (status = 404, description = "Unknown document or no stored file", body = MessageResponse)
    ),
    tag = "Document"
)]
pub async fn download_document(
    ctx: web::Data<DataContext>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let url = documents::download_url_by_id(&ctx, &path).await?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish())
}
