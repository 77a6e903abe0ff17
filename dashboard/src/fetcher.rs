// dashboard/src/fetcher.rs
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::session_store::SessionStore;

/// How an authenticated call ended when it did not produce a body
#[derive(Debug, Error)]
pub enum FetchError {
    /// The backend rejected the credential. The session has been ended.
    #[error("backend rejected the credential")]
    Unauthenticated,

    #[error("request failed with status {status}")]
    RequestFailed { status: u16 },

    #[error("network error: {0}")]
    NetworkError(#[source] reqwest::Error),

    #[error("response body is not the expected JSON: {0}")]
    InvalidBody(#[source] reqwest::Error),
}

/// HTTP client that attaches the active session's bearer token to every call.
///
/// No retries and no timeout are applied here; a hung backend leaves the
/// caller waiting on the transport default.
#[derive(Clone)]
pub struct AuthenticatedFetcher {
    client: Client,
    base_url: String,
    session: SessionStore,
}

impl AuthenticatedFetcher {
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, session: SessionStore) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Absolute URL for an API path such as `/notifications`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        self.request(Method::GET, path).await
    }

    /// Send an authenticated request and classify the response.
    ///
    /// A 401 ends the session that sent the request before returning
    /// [`FetchError::Unauthenticated`]. Other failures leave the session alone.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, FetchError> {
        // Snapshot the credential; the session may change while we wait
        let session = self.session.current();

        let mut req = self.client.request(method.clone(), self.url(path));
        match &session {
            Some(session) => req = req.header(AUTHORIZATION, session.bearer()),
            None => tracing::debug!("{} {} sent without a credential", method, path),
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            FetchError::NetworkError(e)
        })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("{} {} rejected the credential, ending session", method, path);
            match &session {
                Some(session) => self.session.invalidate(session.token()),
                None => self.session.logout(),
            };
            return Err(FetchError::Unauthenticated);
        }

        if !status.is_success() {
            tracing::warn!("{} {} returned {}", method, path, status);
            return Err(FetchError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body = resp.json::<T>().await.map_err(|e| {
            tracing::warn!("{} {} returned an unreadable body: {}", method, path, e);
            if e.is_decode() {
                FetchError::InvalidBody(e)
            } else {
                FetchError::NetworkError(e)
            }
        })?;

        tracing::debug!("{} {} succeeded", method, path);
        Ok(body)
    }
}
