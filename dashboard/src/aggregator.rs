// dashboard/src/aggregator.rs
//! One-shot loaders for the four dashboard panels.
//!
//! Each panel issues exactly one request when it is mounted and ends either
//! populated or empty. Failures never surface as error text; they collapse
//! into the panel's empty state.
use common::{Notification, Payment, Progress, Report};
use serde::de::DeserializeOwned;
use std::fmt;

use crate::fetcher::{AuthenticatedFetcher, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Progress,
    Reports,
    Notifications,
    Payments,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Progress,
        ResourceKind::Reports,
        ResourceKind::Notifications,
        ResourceKind::Payments,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::Progress => "Progress",
            ResourceKind::Reports => "Reports",
            ResourceKind::Notifications => "Notifications",
            ResourceKind::Payments => "Upcoming Payments",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            ResourceKind::Progress => "No progress yet.",
            ResourceKind::Reports => "No reports yet.",
            ResourceKind::Notifications => "No notifications.",
            ResourceKind::Payments => "No upcoming payments.",
        }
    }

    /// Whether the list is filtered to the token's subject
    pub fn is_scoped(self) -> bool {
        !matches!(self, ResourceKind::Notifications)
    }

    /// Request path, or `None` when a scoped list has no subject to scope to
    pub fn path(self, subject: Option<&str>) -> Option<String> {
        match self {
            ResourceKind::Notifications => Some("/notifications".to_string()),
            ResourceKind::Progress => subject.map(|id| format!("/progress/{}", id)),
            ResourceKind::Reports => subject.map(|id| format!("/reports/{}", id)),
            ResourceKind::Payments => subject.map(|id| format!("/payments/upcoming/{}", id)),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Per-panel state: `Idle -> Loading -> Populated | Empty`
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Idle,
    Loading,
    Populated(Vec<T>),
    Empty,
}

impl<T> PanelState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(self, PanelState::Populated(_) | PanelState::Empty)
    }

    pub fn items(&self) -> &[T] {
        match self {
            PanelState::Populated(items) => items,
            _ => &[],
        }
    }
}

impl<T> Default for PanelState<T> {
    fn default() -> Self {
        PanelState::Idle
    }
}

/// Result of one panel load
#[derive(Debug, Clone, PartialEq)]
pub enum PanelOutcome<T> {
    /// A 2xx response whose body parsed as a list
    Loaded(Vec<T>),
    /// No request was issued
    Empty,
    /// The request failed or the body did not parse
    Failed,
    /// The backend rejected the session on the liveness probe
    SessionEnded,
}

impl<T> PanelOutcome<T> {
    /// Replace the panel's list. An empty list and a failure look the same.
    pub fn into_state(self) -> PanelState<T> {
        match self {
            PanelOutcome::Loaded(items) if !items.is_empty() => PanelState::Populated(items),
            _ => PanelState::Empty,
        }
    }
}

/// Load one panel's list.
///
/// Scoped panels read `sub` from the active session's unverified claims and
/// skip the request entirely when it is missing. Only the notifications
/// panel reports a rejected credential as [`PanelOutcome::SessionEnded`];
/// it doubles as the session liveness probe.
pub async fn load<T: DeserializeOwned>(
    fetcher: &AuthenticatedFetcher,
    kind: ResourceKind,
) -> PanelOutcome<T> {
    let subject = if kind.is_scoped() {
        fetcher.session().current().and_then(|session| session.subject())
    } else {
        None
    };

    let path = match kind.path(subject.as_deref()) {
        Some(path) => path,
        None => {
            tracing::debug!("{} panel has no subject to scope to, showing empty state", kind);
            return PanelOutcome::Empty;
        }
    };

    match fetcher.get::<Vec<T>>(&path).await {
        Ok(items) => {
            tracing::debug!("{} panel loaded {} items", kind, items.len());
            PanelOutcome::Loaded(items)
        }
        Err(FetchError::Unauthenticated) if kind == ResourceKind::Notifications => {
            PanelOutcome::SessionEnded
        }
        Err(e) => {
            tracing::debug!("{} panel showing empty state: {}", kind, e);
            PanelOutcome::Failed
        }
    }
}

/// A finished panel load, tagged with its item type
#[derive(Debug, Clone, PartialEq)]
pub enum PanelUpdate {
    Progress(PanelOutcome<Progress>),
    Reports(PanelOutcome<Report>),
    Notifications(PanelOutcome<Notification>),
    Payments(PanelOutcome<Payment>),
}

impl PanelUpdate {
    pub async fn load(fetcher: &AuthenticatedFetcher, kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Progress => PanelUpdate::Progress(load(fetcher, kind).await),
            ResourceKind::Reports => PanelUpdate::Reports(load(fetcher, kind).await),
            ResourceKind::Notifications => PanelUpdate::Notifications(load(fetcher, kind).await),
            ResourceKind::Payments => PanelUpdate::Payments(load(fetcher, kind).await),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            PanelUpdate::Progress(_) => ResourceKind::Progress,
            PanelUpdate::Reports(_) => ResourceKind::Reports,
            PanelUpdate::Notifications(_) => ResourceKind::Notifications,
            PanelUpdate::Payments(_) => ResourceKind::Payments,
        }
    }
}
