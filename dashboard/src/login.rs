// dashboard/src/login.rs
//! Password login against the backend's token endpoint.
use common::Session;
use serde::Deserialize;
use thiserror::Error;

use crate::fetcher::AuthenticatedFetcher;
use crate::session_store::SessionError;

pub const TOKEN_PATH: &str = "/auth/token";

/// Why a login attempt failed. The display text is shown on the login view.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials { status: u16 },

    #[error("Unable to reach the server: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Unexpected response from the server: {0}")]
    InvalidResponse(#[source] reqwest::Error),

    #[error("The server did not return an access token")]
    MissingToken,

    #[error("Could not save the session: {0}")]
    Session(#[from] SessionError),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchange username and password for a bearer token. No session is touched.
pub async fn request_token(
    fetcher: &AuthenticatedFetcher,
    username: &str,
    password: &str,
) -> Result<String, LoginError> {
    let resp = fetcher
        .client()
        .post(fetcher.url(TOKEN_PATH))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .map_err(LoginError::Network)?;

    let status = resp.status();
    if !status.is_success() {
        tracing::info!("Login for {} refused with {}", username, status);
        return Err(LoginError::InvalidCredentials {
            status: status.as_u16(),
        });
    }

    let body: TokenResponse = resp.json().await.map_err(LoginError::InvalidResponse)?;
    match body.access_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(LoginError::MissingToken),
    }
}

/// Request a token and start a session with it
pub async fn login(
    fetcher: &AuthenticatedFetcher,
    username: &str,
    password: &str,
) -> Result<Session, LoginError> {
    let token = request_token(fetcher, username, password).await?;
    tracing::debug!("Received access token ({} bytes)", token.len());
    Ok(fetcher.session().login(&token)?)
}
