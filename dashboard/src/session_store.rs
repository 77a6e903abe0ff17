// dashboard/src/session_store.rs
use common::Session;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::storage::{KeyValueStore, StorageError, ROLE_KEY, TOKEN_KEY};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot start a session with an empty credential")]
    EmptyCredential,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

struct Inner {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<Option<Session>>,
}

/// Handle to the client's session.
///
/// Durable storage is the source of truth across restarts, the in-memory
/// value within a process. Every mutation writes storage first, then memory,
/// while holding the state lock, so concurrent callers never leave the two
/// disagreeing. Clones share the same session; there is no process-wide
/// instance.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner { storage, state }),
        }
    }

    /// Load the session persisted by a previous process, if any.
    ///
    /// The role is re-derived from the stored token; the stored role copy is
    /// only compared and reported.
    pub fn restore(&self) -> Option<Session> {
        let token = match self.inner.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read stored session, starting unauthenticated: {}", e);
                None
            }
        };

        let session = token.map(Session::from_token);

        if let Some(session) = &session {
            match self.inner.storage.get(ROLE_KEY) {
                Ok(Some(stored)) if stored != session.role() => {
                    tracing::debug!(
                        "Stored role {:?} differs from token claim {:?}, using the claim",
                        stored,
                        session.role()
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Failed to read stored role: {}", e),
            }
            tracing::info!("Restored session with role {}", session.role());
        } else {
            tracing::debug!("No stored session");
        }

        self.inner.state.send_replace(session.clone());
        session
    }

    /// Start a session from a token the backend just issued.
    ///
    /// Malformed tokens are accepted with the unknown role; only an empty
    /// string or a storage failure is an error.
    pub fn login(&self, raw_token: &str) -> Result<Session, SessionError> {
        if raw_token.is_empty() {
            return Err(SessionError::EmptyCredential);
        }

        let session = Session::from_token(raw_token);
        let mut written = Ok(());
        self.inner.state.send_if_modified(|state| {
            written = self
                .inner
                .storage
                .set_many(&[(TOKEN_KEY, session.token()), (ROLE_KEY, session.role())]);
            if written.is_err() {
                return false;
            }
            *state = Some(session.clone());
            true
        });
        written?;

        tracing::info!("Session started with role {}", session.role());
        Ok(session)
    }

    /// End the session. Safe to call when already logged out.
    ///
    /// Returns `true` only for the call that actually ended a session.
    pub fn logout(&self) -> bool {
        let ended = self.inner.state.send_if_modified(|state| {
            self.clear_storage();
            state.take().is_some()
        });
        if ended {
            tracing::info!("Session ended");
        }
        ended
    }

    /// End the session only if `token` is still the active credential.
    ///
    /// A rejection that arrives for a token that has since been replaced
    /// must not end the newer session.
    pub fn invalidate(&self, token: &str) -> bool {
        let ended = self.inner.state.send_if_modified(|state| match state {
            Some(s) if s.token() == token => {
                self.clear_storage();
                *state = None;
                true
            }
            _ => false,
        });
        if ended {
            tracing::warn!("Session invalidated by backend rejection");
        }
        ended
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Receive every session transition, starting with the current value
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.state.subscribe()
    }

    fn clear_storage(&self) {
        // Memory is cleared regardless; a stale file is reported, not fatal
        if let Err(e) = self.inner.storage.remove_many(&[TOKEN_KEY, ROLE_KEY]) {
            tracing::error!("Failed to clear stored session: {}", e);
        }
    }
}
