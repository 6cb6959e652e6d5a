//! Evaluation pages against a mock backend: stale responses, load failures,
//! submission and the role gate in front of each page.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use appraisal::api::evaluations::{submit, SubmitOutcome};
use appraisal::cli::{parse_command, Reply, Shell};
use appraisal::evaluations::{FilterState, NewEvaluation};
use appraisal::identity::NormalizedUser;
use appraisal::views::{EvaluationsView, UsersView, EVALUATIONS_LOAD_FAILED, USERS_LOAD_FAILED};

use common::{client_for, config_for, spawn_backend};

fn received_rows() -> Value {
    json!([
        {"id": 1, "evaluatorName": "Ann Lee", "evaluatorEmail": "ann@x.io", "score": 8, "type": "PEER", "periodStart": "2024-04-01"},
        {"id": 2, "employeeName": "Bo Park", "employeeEmail": "bo@x.io", "score": 6, "evaluationType": "MANAGER", "periodYear": 2023, "periodQuarter": 4},
        {"id": 3, "evaluatorName": "Ann Lee", "evaluatorEmail": "ann@x.io", "score": null, "type": "PEER", "periodYear": 2024, "periodQuarter": "q1"}
    ])
}

#[tokio::test]
async fn superseded_load_never_overwrites_newer_result() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let app = Router::new().route(
        "/evaluations/me/received",
        get(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Json(json!([{"id": 100, "evaluatorName": "stale", "score": 1}]))
                } else {
                    Json(json!({"evaluations": [{"id": 200, "evaluatorName": "fresh", "score": 9}]}))
                }
            }
        }),
    );
    let base = spawn_backend(app).await;
    let view = EvaluationsView::new(client_for(&base));

    let (first, second) = tokio::join!(view.load(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        view.load().await
    });
    assert!(!first, "slow first response must be discarded");
    assert!(second);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let snap = view.snapshot();
    assert!(!snap.loading);
    assert_eq!(snap.outcome.filtered.len(), 1);
    assert_eq!(snap.outcome.filtered[0].evaluator_name.as_deref(), Some("fresh"));
}

#[tokio::test]
async fn snapshot_filters_locally_with_full_set_options() {
    let app = Router::new().route("/evaluations/me/received", get(|| async { Json(received_rows()) }));
    let base = spawn_backend(app).await;
    let view = EvaluationsView::new(client_for(&base));
    assert!(view.load().await);

    view.set_filter(FilterState { query: "ANN".into(), ..Default::default() });
    let snap = view.snapshot();
    assert_eq!(snap.outcome.stats.count, 2);
    assert_eq!(snap.outcome.stats.average_score, 8.0);
    assert_eq!(snap.outcome.options.years, vec![2024, 2023]);
    assert_eq!(snap.outcome.options.quarters, vec!["Q1".to_string(), "Q2".into(), "Q4".into()]);
    assert_eq!(snap.outcome.stats.by_type.get("MANAGER"), Some(&1));

    view.set_filter(FilterState { year: Some(2023), ..Default::default() });
    let snap = view.snapshot();
    assert_eq!(snap.outcome.stats.count, 1);
    assert_eq!(snap.outcome.filtered[0].evaluator_email.as_deref(), Some("bo@x.io"));

    view.clear_filter();
    assert_eq!(view.snapshot().outcome.stats.count, 3);
}

#[tokio::test]
async fn load_failures_show_generic_messages() {
    let app = Router::new()
        .route("/evaluations/me/received", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "db down") }))
        .route("/users", get(|| async { StatusCode::BAD_GATEWAY }));
    let base = spawn_backend(app).await;
    let api = client_for(&base);

    let evals = EvaluationsView::new(api.clone());
    evals.load().await;
    let snap = evals.snapshot();
    assert_eq!(snap.error.as_deref(), Some(EVALUATIONS_LOAD_FAILED));
    assert_eq!(snap.outcome.stats.count, 0);
    assert_eq!(snap.outcome.stats.average_score, 0.0);

    let users = UsersView::new(api);
    users.load().await;
    assert_eq!(users.state().error.as_deref(), Some(USERS_LOAD_FAILED));
}

#[tokio::test]
async fn submit_sends_normalized_body() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let app = Router::new().route(
        "/evaluations",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock() = Some(body);
                (StatusCode::CREATED, Json(json!({"id": 55})))
            }
        }),
    );
    let base = spawn_backend(app).await;
    let api = client_for(&base);
    api.session().set_token("t.o.k");

    let new = NewEvaluation::new(" bo@x.io ").with_score(140.0).with_comments(Some("  ")).with_period(Some("2024-01-01"), Some(""));
    let outcome = submit(&api, new).await.expect("submit");
    assert_eq!(outcome, SubmitOutcome::Saved { redirect_to: "/evaluations".into() });

    let body = seen.lock().clone().expect("request body");
    assert_eq!(body["employeeEmail"], "bo@x.io");
    assert_eq!(body["score"], 100.0);
    assert_eq!(body["periodStart"], "2024-01-01");
    assert!(body["periodEnd"].is_null());
    assert!(body["comments"].is_null());
}

#[tokio::test]
async fn unauthorized_submit_clears_session() {
    let app = Router::new().route("/evaluations", post(|| async { StatusCode::UNAUTHORIZED }));
    let base = spawn_backend(app).await;
    let api = client_for(&base);
    api.session().set_session("expired", Some(&NormalizedUser { email: Some("bo@x.io".into()), ..Default::default() }));

    let outcome = submit(&api, NewEvaluation::new("ann@x.io").with_score(70.0)).await.expect("submit");
    assert_eq!(outcome, SubmitOutcome::SessionExpired { redirect_to: "/login".into() });
    assert!(api.session().token().is_none());
    assert!(api.session().user().is_none());
}

#[tokio::test]
async fn submit_without_token_skips_the_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/evaluations",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::CREATED
            }
        }),
    );
    let base = spawn_backend(app).await;
    let api = client_for(&base);

    let outcome = submit(&api, NewEvaluation::new("ann@x.io")).await.expect("submit");
    assert_eq!(outcome, SubmitOutcome::SessionExpired { redirect_to: "/login".into() });
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let err = submit(&api, NewEvaluation::new("   ")).await.unwrap_err();
    assert_eq!(err.code_str(), "employee_email_required");
}

async fn run(shell: &Shell, line: &str) -> String {
    match shell.execute(parse_command(line).expect("command")).await.expect("execute") {
        Reply::Text(t) => t,
        Reply::Quit => panic!("unexpected quit"),
    }
}

#[tokio::test]
async fn shell_gates_pages_by_role() {
    let app = Router::new()
        .route("/auth/token", post(|| async { Json(json!({"token": "a.b.c"})) }))
        .route("/auth/me", get(|| async { Json(json!({"email": "emp@x.io", "role": "EMPLOYEE"})) }))
        .route("/users", get(|| async { Json(json!([{"id": 1, "email": "boss@x.io", "role": "MANAGER"}])) }))
        .route("/evaluations/me/received", get(|| async { Json(received_rows()) }));
    let base = spawn_backend(app).await;
    let api = client_for(&base);
    let shell = Shell::with_api(config_for(&base), api);

    let out = run(&shell, "users").await;
    assert!(out.contains("redirected to /login"), "{}", out);

    // the bounced page is where login returns
    let out = run(&shell, "login emp@x.io pw").await;
    assert!(out.ends_with("continuing to /users"), "{}", out);

    let out = run(&shell, "users").await;
    assert!(out.contains("redirected to /"), "{}", out);
    assert!(!out.contains("boss@x.io"));

    let out = run(&shell, "evaluations --type PEER").await;
    assert!(out.contains("\"count\": 2"), "{}", out);

    let out = run(&shell, "logout").await;
    assert!(out.ends_with("/login"));
    assert!(shell.session().token().is_none());
}

#[tokio::test]
async fn bounced_page_does_not_outlive_its_login() {
    let app = Router::new()
        .route("/auth/token", post(|| async { Json(json!({"token": "a.b.c"})) }))
        .route("/auth/me", get(|| async { Json(json!({"email": "boss@x.io", "role": "MANAGER"})) }));
    let base = spawn_backend(app).await;
    let shell = Shell::with_api(config_for(&base), client_for(&base));

    // an explicit return path still consumes the bounced one
    run(&shell, "users").await;
    let out = run(&shell, "login boss@x.io pw /evaluations").await;
    assert!(out.ends_with("continuing to /evaluations"), "{}", out);
    run(&shell, "logout").await;
    let out = run(&shell, "login boss@x.io pw").await;
    assert!(out.ends_with("continuing to /profile"), "{}", out);

    // logging out forgets a bounce that never led to a login
    run(&shell, "logout").await;
    run(&shell, "users").await;
    run(&shell, "logout").await;
    let out = run(&shell, "login boss@x.io pw").await;
    assert!(out.ends_with("continuing to /profile"), "{}", out);
}

#[tokio::test]
async fn cli_period_flags_reach_the_request_body() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let app = Router::new().route(
        "/evaluations",
        post(move |Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                *sink.lock() = Some(body);
                StatusCode::CREATED
            }
        }),
    );
    let base = spawn_backend(app).await;
    let shell = Shell::with_api(config_for(&base), client_for(&base));
    let me = NormalizedUser { email: Some("emp@x.io".into()), role: Some("EMPLOYEE".into()), ..Default::default() };
    shell.session().set_session("tok", Some(&me));

    let out = run(&shell, "self-eval 80 steady --from 2024-07-01 --to 2024-09-30").await;
    assert_eq!(out, "evaluation saved; continuing to /evaluations");
    let body = seen.lock().clone().expect("request body");
    assert_eq!(body["employeeEmail"], "emp@x.io");
    assert_eq!(body["periodStart"], "2024-07-01");
    assert_eq!(body["periodEnd"], "2024-09-30");
    assert_eq!(body["comments"], "steady");
}
