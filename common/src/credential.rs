// common/src/credential.rs
//! Structural decoding of bearer credentials.
//!
//! The client reads the payload segment of the backend's token to learn the
//! subject and role it was issued for. The signature is never checked here:
//! the backend is the only party that can verify a token, so everything
//! decoded by this module is wrapped in [`UnverifiedClaims`] and is fit for
//! display and request scoping only, never for an authorization decision.
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced when a credential does not have the expected structure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("malformed credential: expected 3 dot-separated segments, found {0}")]
    Shape(usize),

    #[error("malformed credential: payload is not base64url ({0})")]
    Base64(String),

    #[error("malformed credential: payload is not JSON ({0})")]
    Json(String),

    #[error("malformed credential: payload is not a JSON object")]
    NotAnObject,
}

/// Claims read from a credential payload without verifying the signature.
///
/// Any field may be missing. Callers must handle absence of `sub` and `role`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnverifiedClaims {
    fields: Map<String, Value>,
}

impl UnverifiedClaims {
    /// Subject identifier, accepted as a JSON string or number
    pub fn subject(&self) -> Option<String> {
        match self.fields.get("sub")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Role label as claimed by the token
    pub fn role(&self) -> Option<&str> {
        self.fields.get("role").and_then(Value::as_str)
    }

    /// Every field of the payload object
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Decode the payload segment of `token`.
///
/// No I/O, no signature or expiry checks.
pub fn decode(token: &str) -> Result<UnverifiedClaims, CredentialError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::Shape(segments.len()));
    }

    // Tokens are issued unpadded, but tolerate padding from other encoders
    let payload = segments[1].trim_end_matches('=');
    let bytes = base64::decode_config(payload, base64::URL_SAFE_NO_PAD)
        .map_err(|e| CredentialError::Base64(e.to_string()))?;

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| CredentialError::Json(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(UnverifiedClaims { fields }),
        _ => Err(CredentialError::NotAnObject),
    }
}
