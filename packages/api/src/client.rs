//! HTTP client for the note service.
//!
//! [`ApiClient`] holds the base URL and, when signed in, the bearer token.
//! Every request is built through [`ApiClient::request`], which attaches the
//! token, so no call site can forget it. The client is cheap to clone and is
//! passed explicitly to whatever needs it.

use notes::StoreError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use tracing::{debug, warn};

use crate::accounts::AuthToken;
use crate::config::ClientConfig;
use crate::wire;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<AuthToken>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url().to_string(),
            token: None,
        }
    }

    pub fn with_token(&self, token: AuthToken) -> Self {
        Self {
            token: Some(token),
            ..self.clone()
        }
    }

    pub fn without_token(&self) -> Self {
        Self {
            token: None,
            ..self.clone()
        }
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A request with the bearer token attached when signed in.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token.expose())),
            None => builder,
        }
    }

    /// Send `request` and return the body of a successful response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, StoreError> {
        let response = request.send().await.map_err(|e| {
            warn!("request failed: {e}");
            StoreError::Transport(e.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if status.is_success() {
            return Ok(body.to_vec());
        }
        let error = wire::status_error(status.as_u16(), &body);
        debug!(status = status.as_u16(), "request rejected: {error}");
        Err(error)
    }

    /// Send a JSON body.
    pub(crate) async fn send_json<T: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<Vec<u8>, StoreError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| StoreError::Protocol(e.to_string()))?;
        let request = self
            .request(method, path)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.send(request).await
    }
}
