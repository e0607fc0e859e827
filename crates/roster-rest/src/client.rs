use std::marker::PhantomData;

use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use roster_api::{EngineError, ListPayload, ListQuery, Ranked, RemoteGateway, Result};

use crate::models::RankPatch;

/// Explicit session configuration for one admin site.
///
/// Replaces the old ambient port-based storage-key selection: the site a
/// gateway talks to is decided once, here, and nowhere else.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub base_url: String,
    pub api_token: String,
    pub site: String,
}

/// Per-resource REST client implementing the gateway seam.
pub struct RestGateway<T> {
    default_headers: HeaderMap,
    client: reqwest::Client,
    base_url: String,
    resource: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> RestGateway<T> {
    pub fn new(session: &SessionContext, resource: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", session.api_token)
                .parse()
                .expect("Invalid API token format"),
        );
        headers.insert(
            "X-Site",
            session.site.parse().expect("Invalid site identifier"),
        );

        // 30 second timeout; the engine has no timeout layer of its own
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            default_headers: headers,
            client,
            base_url: session.base_url.trim_end_matches('/').to_string(),
            resource: resource.trim_matches('/').to_string(),
            _record: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.resource, id)
    }

    /// Condense a transport error into something a user alert can carry.
    fn format_reqwest_error(e: reqwest::Error, url: &str, operation: &str) -> String {
        if e.is_timeout() {
            format!("Failed to {operation} for {url}: timeout - request took too long")
        } else if e.is_connect() {
            format!("Failed to {operation} for {url}: connection error - check network connectivity. Error: {e}")
        } else if e.is_decode() {
            format!("Failed to {operation} for {url}: decode error - unexpected response format. Error: {e}")
        } else {
            format!("Failed to {operation} for {url}: {e}")
        }
    }

    /// Read the body and turn non-2xx statuses into errors.
    async fn handle_response(response: reqwest::Response, url: &str) -> Result<String> {
        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            EngineError::network(format!("Failed to read response body from {url}: {e}"))
        })?;

        if !status.is_success() {
            return Err(EngineError::network(format!(
                "HTTP {} error from {}: {}",
                status.as_u16(),
                url,
                truncate_body(response_text)
            )));
        }

        Ok(response_text)
    }

    fn parse_body<V: DeserializeOwned>(body: &str, url: &str) -> Result<V> {
        serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            error!("[RestGateway] Failed to parse response from {url}: {e} - {preview}");
            EngineError::network(format!("Unexpected response from {url}: {e}"))
        })
    }
}

/// Cap an error body at 500 characters. Counts characters, not bytes, so
/// multibyte backend messages never split mid-character.
fn truncate_body(body: String) -> String {
    if body.chars().count() <= 500 {
        return body;
    }
    let preview: String = body.chars().take(500).collect();
    format!("{preview}... (truncated)")
}

#[async_trait::async_trait]
impl<T> RemoteGateway<T> for RestGateway<T>
where
    T: Ranked + Serialize + DeserializeOwned,
{
    async fn list(&self, query: &ListQuery) -> Result<ListPayload<T>> {
        let url = self.collection_url();

        let mut params: Vec<(&str, String)> = Vec::new();
        // page_size 0 means the full collection; send no paging params
        if query.page_size > 0 {
            params.push(("page", query.page.to_string()));
            params.push(("page_size", query.page_size.to_string()));
        }
        if let Some(filter) = &query.filter {
            params.push(("q", filter.clone()));
        }

        debug!(
            "[RestGateway] list {}: page={} page_size={} filter={:?}",
            self.resource, query.page, query.page_size, query.filter
        );

        let response = self
            .client
            .get(&url)
            .headers(self.default_headers.clone())
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                let message = Self::format_reqwest_error(e, &url, "list records");
                error!("[RestGateway] {message}");
                EngineError::network(message)
            })?;

        let body = Self::handle_response(response, &url).await?;
        Self::parse_body(&body, &url)
    }

    async fn update_rank(&self, id: &str, rank: i64) -> Result<T> {
        let url = format!("{}/rank", self.record_url(id));
        debug!("[RestGateway] update_rank {}: id={id} rank={rank}", self.resource);

        let response = self
            .client
            .patch(&url)
            .headers(self.default_headers.clone())
            .json(&RankPatch { rank })
            .send()
            .await
            .map_err(|e| {
                let message = Self::format_reqwest_error(e, &url, "update rank");
                error!("[RestGateway] {message}");
                EngineError::network(message)
            })?;

        let body = Self::handle_response(response, &url).await?;
        Self::parse_body(&body, &url)
    }

    async fn create(&self, payload: T) -> Result<T> {
        let url = self.collection_url();
        debug!("[RestGateway] create {}", self.resource);

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let message = Self::format_reqwest_error(e, &url, "create record");
                error!("[RestGateway] {message}");
                EngineError::network(message)
            })?;

        let body = Self::handle_response(response, &url).await?;
        Self::parse_body(&body, &url)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.record_url(id);
        debug!("[RestGateway] delete {}: id={id}", self.resource);

        let response = self
            .client
            .delete(&url)
            .headers(self.default_headers.clone())
            .send()
            .await
            .map_err(|e| {
                let message = Self::format_reqwest_error(e, &url, "delete record");
                error!("[RestGateway] {message}");
                EngineError::network(message)
            })?;

        Self::handle_response(response, &url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::Banner;

    fn session() -> SessionContext {
        SessionContext {
            base_url: "https://admin.example.com/api/".to_string(),
            api_token: "token-123".to_string(),
            site: "main".to_string(),
        }
    }

    #[test]
    fn gateway_carries_session_headers() {
        let gateway: RestGateway<Banner> = RestGateway::new(&session(), "banners");
        assert_eq!(
            gateway.default_headers.get("Authorization").unwrap(),
            "Bearer token-123"
        );
        assert_eq!(gateway.default_headers.get("X-Site").unwrap(), "main");
    }

    #[test]
    fn error_bodies_truncate_on_character_boundaries() {
        // 499 ASCII characters, then multibyte ones straddling the cap
        let body = format!("{}가나다", "x".repeat(499));
        let truncated = truncate_body(body);
        assert!(truncated.ends_with("... (truncated)"));
        assert!(truncated.contains('가'));
        assert!(!truncated.contains('나'));
    }

    #[test]
    fn short_error_bodies_pass_through_untouched() {
        let body = "invalid rank value".to_string();
        assert_eq!(truncate_body(body), "invalid rank value");
    }

    #[test]
    fn urls_are_normalized() {
        let gateway: RestGateway<Banner> = RestGateway::new(&session(), "/banners/");
        assert_eq!(
            gateway.collection_url(),
            "https://admin.example.com/api/banners"
        );
        assert_eq!(
            gateway.record_url("42"),
            "https://admin.example.com/api/banners/42"
        );
    }
}
