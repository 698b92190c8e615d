//! REST API client module
//!
//! Thin gateway to the remote study-notes service. Every request gets the
//! bearer token of the stored session (if any); failures surface verbatim as
//! [`Error`] values. No retries, no token refresh.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /auth/login` - Exchange credentials for a session
//! - `POST /auth/register` - Create an account and a session
//!
//! ## Articles
//! - `GET /articles` - List the user's articles
//! - `POST /articles` - Create an article
//! - `PUT /articles/:id` - Update some fields of an article
//! - `DELETE /articles/:id` - Delete an article
//!
//! ## Files
//! - `POST /upload` - Upload files (multipart, field `files`)
//! - `GET /upload/uploads` - List uploaded files
//! - `GET /upload/file/:filename` - Download raw file bytes
//! - `DELETE /upload/file/:filename` - Delete a file

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::session::SessionStore;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

pub mod articles;
pub mod auth;
pub mod uploads;

#[cfg(test)]
mod tests;

pub use uploads::{UploadFile, is_accepted_upload};

/// Client for the study-notes REST service
#[derive(Clone)]
pub struct ApiClient {
    /// Shared HTTP connection pool
    http: reqwest::Client,

    /// Base URL, always ending in `/`
    base_url: Url,

    /// Source of the bearer token
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `config` - Base URL, timeout and user agent
    /// * `session` - Store consulted for the bearer token on every request
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let base_url = config.parsed_base_url()?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The injected session store
    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Resolve an endpoint path (leading `/` optional) against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        tracing::debug!(method = %method, url = %url, "api request");

        let mut request = self.http.request(method, url);
        if let Some(session) = self.session.load() {
            if let Some(token) = session.bearer_token() {
                request = request.bearer_auth(token);
            }
        }
        Ok(request)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request did not reach the server");
            Error::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.bytes().await.unwrap_or_default();
        let error = Error::from_response(status.as_u16(), &body);
        tracing::warn!(url = %url, status = status.as_u16(), error = %error, "api request failed");
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await?;
        // 204 / empty bodies decode as JSON null so `()` and `Option<_>` work
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// `GET path`, decoding a JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Self::decode(response).await
    }

    /// `POST path` with a JSON body, decoding a JSON response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path)?.json(body))
            .await?;
        Self::decode(response).await
    }

    /// `PUT path` with a JSON body, decoding a JSON response
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PUT, path)?.json(body))
            .await?;
        Self::decode(response).await
    }

    /// `DELETE path`; any response body is discarded
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// `GET path` returning the raw body bytes, never parsed
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `POST path` with a multipart form, decoding a JSON response
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let response = self
            .send(self.request(Method::POST, path)?.multipart(form))
            .await?;
        Self::decode(response).await
    }
}

/// Percent-encode one path segment (filenames, ids)
pub(crate) fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
