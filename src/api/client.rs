use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::api::{Draft, User};
use crate::error::{ApiError, Context, Operation, simple_error};

/// Demo backend the screen talks to unless configured otherwise.
pub const DEFAULT_API_BASE: &str = "https://jsonplaceholder.typicode.com";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless client for the `users` collection.
///
/// Each method issues exactly one request and never retries. Cloning is cheap;
/// clones share the connection pool.
#[derive(Clone, Debug)]
pub struct UserClient {
    http: Client,
    base: String,
}

impl UserClient {
    /// Build a client for `base` (scheme + host, optional path prefix).
    pub fn new(base: &str) -> crate::error::Result<Self> {
        let trimmed = base.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).with_ctx(|| format!("invalid API base {base:?}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(simple_error(format!("API base must be http or https: {base}")));
        }
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("userdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_ctx(|| "build HTTP client".to_string())?;
        Ok(Self { http, base: trimmed.to_string() })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn collection_url(&self) -> String {
        format!("{}/users", self.base)
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/users/{}", self.base, id)
    }

    /// `GET /users`, with `?name=<term>` when `search` is not blank.
    pub async fn fetch_users(&self, search: &str) -> Result<Vec<User>, ApiError> {
        let op = Operation::Fetch;
        let url = if search.trim().is_empty() {
            Url::parse(&self.collection_url())
        } else {
            Url::parse_with_params(&self.collection_url(), &[("name", search)])
        }
        .map_err(|e| ApiError::request_failed(op, e))?;

        tracing::debug!(%url, "GET users");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(op, e))?;
        decode(op, resp).await
    }

    /// `POST /users`; returns the server echo.
    pub async fn create_user(&self, draft: &Draft) -> Result<User, ApiError> {
        let op = Operation::Create;
        tracing::debug!(name = %draft.name, "POST users");
        let resp = self
            .http
            .post(self.collection_url())
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(op, e))?;
        decode(op, resp).await
    }

    /// `PUT /users/{id}`; returns the server echo.
    pub async fn update_user(&self, id: u64, draft: &Draft) -> Result<User, ApiError> {
        let op = Operation::Update;
        tracing::debug!(id, "PUT user");
        let resp = self
            .http
            .put(self.item_url(id))
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::request_failed(op, e))?;
        decode(op, resp).await
    }

    /// `DELETE /users/{id}`. The response body is read and discarded.
    pub async fn delete_user(&self, id: u64) -> Result<(), ApiError> {
        let op = Operation::Delete;
        tracing::debug!(id, "DELETE user");
        let resp = self
            .http
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(|e| ApiError::request_failed(op, e))?;
        let resp = ensure_success(op, resp)?;
        resp.bytes().await.map_err(|e| ApiError::request_failed(op, e))?;
        Ok(())
    }
}

fn ensure_success(op: Operation, resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ApiError::request_failed(op, format!("HTTP {}", status.as_u16())))
    }
}

async fn decode<T: DeserializeOwned>(op: Operation, resp: Response) -> Result<T, ApiError> {
    let resp = ensure_success(op, resp)?;
    resp.json::<T>().await.map_err(|e| ApiError::request_failed(op, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_tolerated() {
        let client = UserClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.base(), "http://localhost:8080/api");
        assert_eq!(client.item_url(7), "http://localhost:8080/api/users/7");
    }

    #[test]
    fn non_http_base_is_rejected() {
        assert!(UserClient::new("ftp://example.com").is_err());
        assert!(UserClient::new("not a url").is_err());
    }
}
