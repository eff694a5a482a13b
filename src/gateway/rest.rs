//! Client for the hosted store's REST (`/rest/v1`) and storage
//! (`/storage/v1`) APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::{Filter, Gateway, GatewayError, SelectQuery, Table};

const RETURN_REPRESENTATION: &str = "return=representation";

pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
}

impl RestGateway {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| GatewayError::Config("api key is not a valid header value".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| GatewayError::Config("api key is not a valid header value".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .user_agent("hrm-sync/0.1")
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn rows(resp: reqwest::Response) -> Result<Vec<Value>, GatewayError> {
        let resp = check_response(resp).await?;
        Ok(resp.json::<Vec<Value>>().await?)
    }
}

/// `<column>=eq.<value>` pairs for the query string.
pub(crate) fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), format!("eq.{}", f.value)))
        .collect()
}

pub(crate) fn select_pairs(query: &SelectQuery) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), query.select_clause())];
    pairs.extend(filter_pairs(&query.filters));
    if let Some(order) = query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        pairs.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    pairs
}

/// Maps non-success statuses onto [`GatewayError`] variants.
pub(crate) async fn check_response(
    resp: reqwest::Response,
) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        404 => GatewayError::NotFound(message),
        409 => GatewayError::Conflict(message),
        code => GatewayError::Api {
            status: code,
            message,
        },
    })
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Value>, GatewayError> {
        let pairs = select_pairs(query);
        debug!(%table, query = ?pairs, "Selecting rows");
        let resp = self
            .http
            .get(self.table_url(table))
            .query(&pairs)
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        debug!(%table, count = rows.len(), "Inserting rows");
        let resp = self
            .http
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&rows)
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn update(
        &self,
        table: Table,
        filters: &[Filter],
        patch: Value,
    ) -> Result<Vec<Value>, GatewayError> {
        let resp = self
            .http
            .patch(self.table_url(table))
            .query(&filter_pairs(filters))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch)
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<Vec<Value>, GatewayError> {
        // an unfiltered DELETE would empty the table
        if filters.is_empty() {
            return Err(GatewayError::Config(format!(
                "refusing to delete from {table} without a filter"
            )));
        }
        let resp = self
            .http
            .delete(self.table_url(table))
            .query(&filter_pairs(filters))
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;
        Self::rows(resp).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path);
        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        check_response(resp)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Embed;
    use pretty_assertions::assert_eq;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[test]
    fn select_pairs_render_postgrest_syntax() {
        let query = SelectQuery::new()
            .embed(Embed::employee(true))
            .where_eq("status", "Pending")
            .order_desc("created_at");

        assert_eq!(
            select_pairs(&query),
            vec![
                (
                    "select".to_string(),
                    "*,employees!inner(first_name,last_name,avatar_url)".to_string()
                ),
                ("status".to_string(), "eq.Pending".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn public_url_points_at_public_bucket() {
        let gateway =
            RestGateway::new("https://db.example.com/", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(
            gateway.public_url("employee-avatars", "a.png"),
            "https://db.example.com/storage/v1/object/public/employee-avatars/a.png"
        );
    }

    #[test]
    fn rejects_api_key_with_newline() {
        let err = RestGateway::new("https://db.example.com", "bad\nkey", Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn check_response_maps_conflict() {
        let err = check_response(mock_response(409, "duplicate key"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(msg) if msg == "duplicate key"));
    }

    #[tokio::test]
    async fn check_response_maps_other_failures_to_api() {
        let err = check_response(mock_response(403, "permission denied"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn check_response_passes_success_through() {
        let resp = check_response(mock_response(200, "[]")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }
}
