// dashboard/tests/aggregator_test.rs
mod support;

use common::{Notification, Payment, Progress, Report};
use serde_json::json;
use support::{client_token, fetcher_for, memory_session, token, FakeBackend};
use webnok_dashboard::aggregator::{load, PanelOutcome, PanelState, PanelUpdate, ResourceKind};

#[actix_web::test]
async fn test_progress_scoped_to_subject() {
    let backend = FakeBackend::start().await;
    backend.json(
        "/progress/42",
        json!([{ "id": 1, "title": "Kickoff", "percent": 100, "description": "Done" }]),
    );

    let (session, _) = memory_session();
    session.login(&client_token("42", "client")).unwrap();

    let outcome: PanelOutcome<Progress> =
        load(&fetcher_for(&backend, &session), ResourceKind::Progress).await;

    match outcome {
        PanelOutcome::Loaded(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].title, "Kickoff");
            assert_eq!(items[0].percent, Some(100.0));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(backend.requests()[0].path, "/progress/42");

    backend.stop().await;
}

#[actix_web::test]
async fn test_numeric_subject_scopes_reports_and_payments() {
    let backend = FakeBackend::start().await;
    backend.json("/reports/5", json!([{ "id": 1, "summary": "May" }]));
    backend.json("/payments/upcoming/5", json!([{ "id": 2, "amount": 90, "due_date": "2024-06-01" }]));

    let (session, _) = memory_session();
    session.login(&token(json!({ "sub": 5, "role": "client" }))).unwrap();
    let fetcher = fetcher_for(&backend, &session);

    let reports: PanelOutcome<Report> = load(&fetcher, ResourceKind::Reports).await;
    let payments: PanelOutcome<Payment> = load(&fetcher, ResourceKind::Payments).await;

    assert!(matches!(reports, PanelOutcome::Loaded(ref items) if items.len() == 1));
    assert!(matches!(payments, PanelOutcome::Loaded(ref items) if items[0].amount == Some(90.0)));

    backend.stop().await;
}

#[actix_web::test]
async fn test_missing_subject_issues_no_request() {
    let backend = FakeBackend::start().await;

    let (session, _) = memory_session();
    session.login(&token(json!({ "role": "admin" }))).unwrap();
    let fetcher = fetcher_for(&backend, &session);

    for kind in [ResourceKind::Progress, ResourceKind::Reports, ResourceKind::Payments] {
        let update = PanelUpdate::load(&fetcher, kind).await;
        assert_eq!(update.kind(), kind);
    }
    let outcome: PanelOutcome<Progress> = load(&fetcher, ResourceKind::Progress).await;
    assert_eq!(outcome, PanelOutcome::Empty);
    assert!(backend.requests().is_empty());

    backend.stop().await;
}

#[actix_web::test]
async fn test_malformed_token_issues_no_scoped_request() {
    let backend = FakeBackend::start().await;
    backend.json("/notifications", json!([]));

    let (session, _) = memory_session();
    session.login("opaque-session-token").unwrap();
    let fetcher = fetcher_for(&backend, &session);

    let progress: PanelOutcome<Progress> = load(&fetcher, ResourceKind::Progress).await;
    assert_eq!(progress, PanelOutcome::Empty);

    // Notifications are unscoped and still go out
    let notifications: PanelOutcome<Notification> =
        load(&fetcher, ResourceKind::Notifications).await;
    assert_eq!(notifications, PanelOutcome::Loaded(vec![]));
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(backend.requests()[0].path, "/notifications");

    backend.stop().await;
}

#[actix_web::test]
async fn test_only_notifications_report_session_end() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/progress/42", 401, "{}");
    backend.respond("GET", "/notifications", 401, "{}");

    let (session, _) = memory_session();
    session.login(&client_token("42", "client")).unwrap();
    let fetcher = fetcher_for(&backend, &session);

    let progress: PanelOutcome<Progress> = load(&fetcher, ResourceKind::Progress).await;
    assert_eq!(progress, PanelOutcome::Failed);
    // The rejection still ended the session
    assert!(!session.is_authenticated());

    let notifications: PanelOutcome<Notification> =
        load(&fetcher, ResourceKind::Notifications).await;
    assert_eq!(notifications, PanelOutcome::SessionEnded);

    backend.stop().await;
}

#[actix_web::test]
async fn test_failures_collapse_to_empty() {
    let backend = FakeBackend::start().await;
    backend.respond("GET", "/reports/42", 503, "");
    backend.respond("GET", "/notifications", 200, r#"{"not":"a list"}"#);

    let (session, _) = memory_session();
    session.login(&client_token("42", "client")).unwrap();
    let fetcher = fetcher_for(&backend, &session);

    let reports: PanelOutcome<Report> = load(&fetcher, ResourceKind::Reports).await;
    let notifications: PanelOutcome<Notification> =
        load(&fetcher, ResourceKind::Notifications).await;

    assert_eq!(reports, PanelOutcome::Failed);
    assert_eq!(notifications, PanelOutcome::Failed);
    assert_eq!(reports.into_state(), PanelState::Empty);
    assert_eq!(notifications.into_state(), PanelState::Empty);
    assert!(session.is_authenticated());

    backend.stop().await;
}
