//! HTTP client for the hosted backend
//!
//! One `reqwest::Client` is shared by the table, procedure, auth and storage
//! gateways. Every request carries the project `apikey`; the bearer token is
//! the caller's access token or, for anonymous calls, the anon key itself.

use reqwest::header::{HeaderMap, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::error::BackendError;
use super::query::{parse_content_range_total, TableQuery};
use crate::config::BackendConfig;
use crate::models::{ListParams, PagedResult};

/// Credentials attached to a backend call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthToken(Option<String>);

impl AuthToken {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn access_token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

/// Shared handle to the hosted backend
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<ClientInner>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.url.trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Start a request against `path` (relative to the project URL)
    pub(crate) fn request(&self, method: Method, path: &str, auth: &AuthToken) -> RequestBuilder {
        let bearer = auth.access_token().unwrap_or(&self.inner.anon_key);
        self.inner
            .http
            .request(method, format!("{}{}", self.inner.base_url, path))
            .header("apikey", &self.inner.anon_key)
            .bearer_auth(bearer)
    }

    fn table_path(query: &TableQuery) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            format!("/rest/v1/{}", query.table())
        } else {
            format!("/rest/v1/{}?{}", query.table(), qs)
        }
    }

    /// Rows matching `query`
    pub async fn select<T: DeserializeOwned>(
        &self,
        auth: &AuthToken,
        query: &TableQuery,
    ) -> Result<Vec<T>, BackendError> {
        let response = execute(self.request(Method::GET, &Self::table_path(query), auth)).await?;
        decode_response(response).await
    }

    /// One page of rows plus the exact total
    pub async fn select_paged<T: DeserializeOwned>(
        &self,
        auth: &AuthToken,
        query: TableQuery,
        params: &ListParams,
    ) -> Result<PagedResult<T>, BackendError> {
        let query = query
            .range(params.offset(), params.limit())
            .count_exact();
        let response = self
            .request(Method::GET, &Self::table_path(&query), auth)
            .header("Prefer", "count=exact")
            .send()
            .await?;

        let status = response.status();
        let total = content_range_total(response.headers());

        // Past the last row the backend answers 416 but still reports the total
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(PagedResult::new(Vec::new(), total.unwrap_or(0), params));
        }
        let response = check_status(response).await?;
        let items: Vec<T> = decode_response(response).await?;
        let total = total.unwrap_or_else(|| params.offset() + items.len() as u64);

        Ok(PagedResult::new(items, total, params))
    }

    /// First row matching `query`, if any
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        auth: &AuthToken,
        query: TableQuery,
    ) -> Result<Option<T>, BackendError> {
        let rows: Vec<T> = self.select(auth, &query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert one row and return it as stored
    pub async fn insert<B, T>(&self, auth: &AuthToken, table: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?select=*", table);
        let builder = self
            .request(Method::POST, &path, auth)
            .header("Prefer", "return=representation")
            .json(body);
        let rows: Vec<T> = decode_response(execute(builder).await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {} returned no row", table)))
    }

    /// Insert several rows without reading them back
    pub async fn insert_many<B: Serialize>(
        &self,
        auth: &AuthToken,
        table: &str,
        rows: &[B],
    ) -> Result<(), BackendError> {
        if rows.is_empty() {
            return Ok(());
        }
        let builder = self
            .request(Method::POST, &format!("/rest/v1/{}", table), auth)
            .header("Prefer", "return=minimal")
            .json(rows);
        execute(builder).await?;
        Ok(())
    }

    /// Patch rows matching `query` and return them as stored
    pub async fn update<B, T>(
        &self,
        auth: &AuthToken,
        query: &TableQuery,
        body: &B,
    ) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::PATCH, &Self::table_path(query), auth)
            .header("Prefer", "return=representation")
            .json(body);
        decode_response(execute(builder).await?).await
    }

    /// Delete rows matching `query`
    pub async fn delete(&self, auth: &AuthToken, query: &TableQuery) -> Result<(), BackendError> {
        execute(self.request(Method::DELETE, &Self::table_path(query), auth)).await?;
        Ok(())
    }

    /// Call a named remote procedure
    pub async fn rpc<P, T>(&self, auth: &AuthToken, name: &str, params: &P) -> Result<T, BackendError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self
            .request(Method::POST, &format!("/rest/v1/rpc/{}", name), auth)
            .json(params);
        decode_response(execute(builder).await?).await
    }
}

/// Send and turn non-success statuses into `BackendError::Api`
pub(crate) async fn execute(builder: RequestBuilder) -> Result<Response, BackendError> {
    check_status(builder.send().await?).await
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!("Backend error {}: {}", status, body);
    Err(BackendError::from_response(status, &body))
}

/// Decode a JSON body; an empty body decodes as `null`
pub(crate) async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let body = response.text().await?;
    decode_body(&body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| BackendError::Decode(e.to_string()))
}

fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}
