// dashboard/src/shell.rs
//! Top-level view switch between the login form and the dashboard.
//!
//! The shell is an actix actor. It follows the session store through a
//! watch stream, so a logout caused by any rejected request sends it back to
//! the login view. Panel loads run as futures on the actor's context; every
//! result carries the mount generation it was issued for and is dropped if
//! the dashboard has since been remounted or torn down.
use actix::prelude::*;
use common::{Notification, Payment, Progress, Report, Session};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::aggregator::{PanelOutcome, PanelState, PanelUpdate, ResourceKind};
use crate::fetcher::AuthenticatedFetcher;
use crate::login::{self, LoginError};
use crate::session_store::SessionStore;

/// Badge text shown until the notifications probe confirms the session
pub const UNCONFIRMED_ROLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoginView {
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub role: String,
    /// Set once the notifications call has returned a parsed list
    pub identity_confirmed: bool,
    pub progress: PanelState<Progress>,
    pub reports: PanelState<Report>,
    pub notifications: PanelState<Notification>,
    pub payments: PanelState<Payment>,
}

impl DashboardView {
    fn new(role: &str) -> Self {
        Self {
            role: role.to_string(),
            identity_confirmed: false,
            progress: PanelState::Idle,
            reports: PanelState::Idle,
            notifications: PanelState::Idle,
            payments: PanelState::Idle,
        }
    }

    fn loading(role: &str) -> Self {
        Self {
            progress: PanelState::Loading,
            reports: PanelState::Loading,
            notifications: PanelState::Loading,
            payments: PanelState::Loading,
            ..Self::new(role)
        }
    }

    /// Role badge text
    pub fn badge(&self) -> &str {
        if self.identity_confirmed {
            &self.role
        } else {
            UNCONFIRMED_ROLE
        }
    }

    pub fn is_settled(&self) -> bool {
        self.progress.is_settled()
            && self.reports.is_settled()
            && self.notifications.is_settled()
            && self.payments.is_settled()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Login(LoginView),
    Dashboard(DashboardView),
}

impl View {
    /// Nothing is in flight for this view
    pub fn is_settled(&self) -> bool {
        match self {
            View::Login(login) => !login.submitting,
            View::Dashboard(dashboard) => dashboard.is_settled(),
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, View::Login(_))
    }

    pub fn dashboard(&self) -> Option<&DashboardView> {
        match self {
            View::Dashboard(dashboard) => Some(dashboard),
            View::Login(_) => None,
        }
    }

    pub fn login(&self) -> Option<&LoginView> {
        match self {
            View::Login(login) => Some(login),
            View::Dashboard(_) => None,
        }
    }
}

/// Actor message: submit the login form
#[derive(Message)]
#[rtype(result = "Result<Session, LoginError>")]
pub struct SubmitLogin {
    pub username: String,
    pub password: String,
}

/// Actor message: user-initiated logout. Returns whether a session ended.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct Logout;

/// Actor message: remount the dashboard so every panel loads again
#[derive(Message)]
#[rtype(result = "()")]
pub struct Refresh;

/// Actor message: snapshot of the current view
#[derive(Message)]
#[rtype(result = "View")]
pub struct CurrentView;

pub struct Shell {
    session: SessionStore,
    fetcher: AuthenticatedFetcher,
    view: View,
    // Bumped on every mount and teardown; stale panel results compare unequal
    generation: u64,
    // Token the mounted dashboard was built for
    active_token: Option<String>,
    views: watch::Sender<View>,
}

impl Shell {
    /// Create the shell, restoring any persisted session.
    ///
    /// Returns the actor and a receiver of every published view.
    pub fn new(session: SessionStore, fetcher: AuthenticatedFetcher) -> (Self, watch::Receiver<View>) {
        let view = match session.restore() {
            // Panels are mounted once the actor starts
            Some(restored) => View::Dashboard(DashboardView::new(restored.role())),
            None => View::Login(LoginView::default()),
        };
        let (views, rx) = watch::channel(view.clone());

        let shell = Self {
            session,
            fetcher,
            view,
            generation: 0,
            active_token: None,
            views,
        };
        (shell, rx)
    }

    fn publish(&self) {
        self.views.send_replace(self.view.clone());
    }

    fn mount_dashboard(&mut self, session: &Session, ctx: &mut Context<Self>) {
        self.generation += 1;
        let generation = self.generation;
        self.active_token = Some(session.token().to_string());
        self.view = View::Dashboard(DashboardView::loading(session.role()));
        self.publish();

        tracing::info!("Mounting dashboard (generation {})", generation);

        // All four panels load concurrently and independently
        for kind in ResourceKind::ALL {
            let fetcher = self.fetcher.clone();
            let load = async move { PanelUpdate::load(&fetcher, kind).await };
            ctx.spawn(
                load.into_actor(self)
                    .map(move |update, act, ctx| act.apply_update(generation, update, ctx)),
            );
        }
    }

    fn show_login(&mut self, error: Option<String>) {
        // Anything still in flight belongs to the torn-down dashboard
        self.generation += 1;
        self.active_token = None;
        self.view = View::Login(LoginView {
            submitting: false,
            error,
        });
        self.publish();
    }

    fn apply_update(&mut self, generation: u64, update: PanelUpdate, _ctx: &mut Context<Self>) {
        if generation != self.generation {
            tracing::debug!("Discarding stale {} result (generation {})", update.kind(), generation);
            return;
        }

        let dashboard = match &mut self.view {
            View::Dashboard(dashboard) => dashboard,
            View::Login(_) => return,
        };

        match update {
            PanelUpdate::Progress(outcome) => dashboard.progress = outcome.into_state(),
            PanelUpdate::Reports(outcome) => dashboard.reports = outcome.into_state(),
            PanelUpdate::Payments(outcome) => dashboard.payments = outcome.into_state(),
            PanelUpdate::Notifications(PanelOutcome::SessionEnded) => {
                tracing::info!("Session liveness probe rejected, returning to login");
                // Only the credential this dashboard was mounted for
                if let Some(token) = self.active_token.clone() {
                    self.session.invalidate(&token);
                }
                self.show_login(None);
                return;
            }
            PanelUpdate::Notifications(outcome) => {
                // The probe only confirms the identity when a list came back
                if matches!(outcome, PanelOutcome::Loaded(_)) {
                    dashboard.identity_confirmed = true;
                }
                dashboard.notifications = outcome.into_state();
            }
        }

        self.publish();
    }
}

impl Actor for Shell {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!("Shell started");
        // Yields the current session first, which mounts a restored dashboard
        ctx.add_stream(WatchStream::new(self.session.subscribe()));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!("Shell stopped");
    }
}

impl StreamHandler<Option<Session>> for Shell {
    fn handle(&mut self, session: Option<Session>, ctx: &mut Self::Context) {
        match session {
            Some(session) if self.active_token.as_deref() != Some(session.token()) => {
                self.mount_dashboard(&session, ctx);
            }
            Some(_) => {}
            None if self.active_token.is_some() => {
                tracing::info!("Session ended, returning to login");
                self.show_login(None);
            }
            None => {}
        }
    }

    fn finished(&mut self, _ctx: &mut Self::Context) {
        // The session store outlives the shell; nothing to do
    }
}

impl Handler<SubmitLogin> for Shell {
    type Result = ResponseActFuture<Self, Result<Session, LoginError>>;

    fn handle(&mut self, msg: SubmitLogin, _ctx: &mut Self::Context) -> Self::Result {
        // Signing in again replaces whoever is signed in now
        self.generation += 1;
        self.active_token = None;
        if self.session.logout() {
            tracing::info!("Ended the current session before signing in again");
        }
        self.view = View::Login(LoginView {
            submitting: true,
            error: None,
        });
        self.publish();

        let fetcher = self.fetcher.clone();
        let attempt = async move { login::login(&fetcher, &msg.username, &msg.password).await };

        Box::pin(attempt.into_actor(self).map(|result, act, ctx| {
            match &result {
                // The session watch may have mounted it already
                Ok(session) if act.active_token.as_deref() == Some(session.token()) => {}
                Ok(session) => act.mount_dashboard(session, ctx),
                Err(e) => {
                    tracing::info!("Login failed: {}", e);
                    act.show_login(Some(e.to_string()));
                }
            }
            result
        }))
    }
}

impl Handler<Logout> for Shell {
    type Result = bool;

    fn handle(&mut self, _msg: Logout, _ctx: &mut Self::Context) -> Self::Result {
        let ended = self.session.logout();
        self.show_login(None);
        ended
    }
}

impl Handler<Refresh> for Shell {
    type Result = ();

    fn handle(&mut self, _msg: Refresh, ctx: &mut Self::Context) -> Self::Result {
        match self.session.current() {
            Some(session) => self.mount_dashboard(&session, ctx),
            None => tracing::debug!("Refresh ignored, no active session"),
        }
    }
}

impl Handler<CurrentView> for Shell {
    type Result = MessageResult<CurrentView>;

    fn handle(&mut self, _msg: CurrentView, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.view.clone())
    }
}

/// Running shell plus a view subscription
pub struct ShellHandle {
    addr: Addr<Shell>,
    views: watch::Receiver<View>,
}

impl ShellHandle {
    /// Start the shell on the current actix system
    pub fn start(session: SessionStore, fetcher: AuthenticatedFetcher) -> Self {
        let (shell, views) = Shell::new(session, fetcher);
        Self {
            addr: shell.start(),
            views,
        }
    }

    pub fn addr(&self) -> &Addr<Shell> {
        &self.addr
    }

    /// Latest published view
    pub fn view(&self) -> View {
        self.views.borrow().clone()
    }

    /// Wait until the published view has nothing in flight, then return it
    pub async fn settled(&mut self) -> View {
        self.wait_for(View::is_settled).await
    }

    /// Wait for the first published view matching `pred`
    pub async fn wait_for<F>(&mut self, pred: F) -> View
    where
        F: Fn(&View) -> bool,
    {
        loop {
            {
                let view = self.views.borrow_and_update();
                if pred(&*view) {
                    return view.clone();
                }
            }
            if self.views.changed().await.is_err() {
                // Shell stopped; the last view is final
                return self.views.borrow().clone();
            }
        }
    }
}
