// dashboard/src/render.rs
//! Plain-text rendering of the shell's views.
use common::{Notification, Payment, Progress, Report};
use std::fmt::{self, Display, Formatter};

use crate::aggregator::{PanelState, ResourceKind};
use crate::shell::{DashboardView, LoginView, View};

const BRAND: &str = "Webnok";

/// One list entry in a panel
pub trait RenderItem {
    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result;
}

impl RenderItem for Progress {
    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.percent {
            Some(percent) => writeln!(f, "  - {}  {}%", self.title, percent)?,
            None => writeln!(f, "  - {}", self.title)?,
        }
        if !self.description.is_empty() {
            writeln!(f, "    {}", self.description)?;
        }
        Ok(())
    }
}

impl RenderItem for Report {
    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  - {}", self.summary)?;
        if !self.details.is_empty() {
            writeln!(f, "    {}", self.details)?;
        }
        Ok(())
    }
}

impl RenderItem for Notification {
    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "  - {}", self.title)?;
        if !self.message.is_empty() {
            writeln!(f, "    {}", self.message)?;
        }
        Ok(())
    }
}

impl RenderItem for Payment {
    fn render(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let amount = self
            .amount
            .map(|amount| format!("${}", amount))
            .unwrap_or_default();
        let due = match (self.due_on(), self.due_date.as_deref()) {
            (Some(date), _) => date.format("%Y-%m-%d").to_string(),
            (None, Some(raw)) => raw.to_string(),
            (None, None) => String::new(),
        };
        writeln!(f, "  - {}  {}", amount, due)
    }
}

fn render_panel<T: RenderItem>(
    f: &mut Formatter<'_>,
    kind: ResourceKind,
    state: &PanelState<T>,
) -> fmt::Result {
    writeln!(f, "== {} ==", kind.title())?;
    match state {
        PanelState::Idle | PanelState::Loading => writeln!(f, "  Loading..."),
        PanelState::Empty => writeln!(f, "  {}", kind.empty_message()),
        PanelState::Populated(items) => items.iter().try_for_each(|item| item.render(f)),
    }
}

impl Display for LoginView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", BRAND)?;
        writeln!(f, "Sign in with your company-provided account")?;
        writeln!(f)?;
        if let Some(error) = &self.error {
            writeln!(f, "! {}", error)?;
            writeln!(f)?;
        }
        if self.submitting {
            writeln!(f, "Signing in...")?;
            writeln!(f)?;
        }
        writeln!(f, "Only admin can create accounts. No self registration.")
    }
}

impl Display for DashboardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  [{}]", BRAND, self.badge())?;
        writeln!(f)?;

        render_panel(f, ResourceKind::Progress, &self.progress)?;
        writeln!(f)?;
        render_panel(f, ResourceKind::Reports, &self.reports)?;
        writeln!(f)?;
        render_panel(f, ResourceKind::Notifications, &self.notifications)?;
        writeln!(f)?;
        render_panel(f, ResourceKind::Payments, &self.payments)
    }
}

impl Display for View {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            View::Login(login) => Display::fmt(login, f),
            View::Dashboard(dashboard) => Display::fmt(dashboard, f),
        }
    }
}
