#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use agri_core::MetricsRegistry;
use agri_greeter::app_state::AppState;
use agri_greeter::config::GreeterConfig;
use agri_greeter::obs::RequestTimer;
use agri_greeter::router;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

fn app() -> (Router, Arc<MetricsRegistry>) {
    let metrics = Arc::new(MetricsRegistry::new());
    let state = AppState::with_metrics(GreeterConfig::default(), Arc::clone(&metrics));
    (router::build_router(state), metrics)
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_string(res: Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn home_returns_greeting() {
    let (app, _) = app();
    let res = app.oneshot(get_req("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "Agri Digital Platform is running!");
}

#[tokio::test]
async fn home_requests_are_counted_and_timed() {
    let (app, metrics) = app();
    for _ in 0..5 {
        let res = app.clone().oneshot(get_req("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    assert_eq!(metrics.request_count("GET", "/", 200), 5);
    let hist = metrics.latency("GET", "/").expect("latency recorded");
    assert_eq!(hist.count, 5);
    assert!(hist.sum >= 0.0);
}

#[tokio::test]
async fn each_request_adds_exactly_one_observation() {
    let (app, metrics) = app();
    app.clone().oneshot(get_req("/")).await.unwrap();
    let before = metrics.latency("GET", "/").unwrap();

    app.oneshot(get_req("/")).await.unwrap();
    let after = metrics.latency("GET", "/").unwrap();

    assert_eq!(after.count, before.count + 1);
    assert!(after.sum >= before.sum);
}

#[tokio::test]
async fn metrics_endpoint_exposes_observed_series() {
    let (app, _) = app();
    app.clone().oneshot(get_req("/")).await.unwrap();
    app.clone().oneshot(get_req("/nope")).await.unwrap();

    let res = app.oneshot(get_req("/metrics")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; version=0.0.4; charset=utf-8"
    );

    let body = body_string(res).await;
    assert!(body.contains("# TYPE http_requests_total counter"));
    assert!(body.contains("http_requests_total{method=\"GET\",path=\"/\",status=\"200\"} 1"));
    assert!(body.contains("http_requests_total{method=\"GET\",path=\"/nope\",status=\"404\"} 1"));
    assert!(body.contains("# TYPE http_request_duration_seconds histogram"));
    assert!(body.contains("http_request_duration_seconds_count{method=\"GET\",path=\"/\"} 1"));
    assert!(body.contains(
        "http_request_duration_seconds_bucket{method=\"GET\",path=\"/\",le=\"+Inf\"} 1"
    ));
}

#[tokio::test]
async fn metrics_reads_are_idempotent_for_counters() {
    let (app, _) = app();
    for _ in 0..3 {
        app.clone().oneshot(get_req("/")).await.unwrap();
    }

    let home_line = |body: &str| {
        body.lines()
            .find(|l| l.starts_with("http_requests_total{method=\"GET\",path=\"/\","))
            .map(str::to_owned)
    };

    let first = body_string(app.clone().oneshot(get_req("/metrics")).await.unwrap()).await;
    let second = body_string(app.oneshot(get_req("/metrics")).await.unwrap()).await;

    assert_eq!(home_line(&first), home_line(&second));
    assert_eq!(
        home_line(&first).as_deref(),
        Some("http_requests_total{method=\"GET\",path=\"/\",status=\"200\"} 3")
    );
}

#[tokio::test]
async fn unknown_path_is_404_and_counted() {
    let (app, metrics) = app();
    let res = app.oneshot(get_req("/does/not/exist")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(body_string(res).await.is_empty());
    assert_eq!(metrics.request_count("GET", "/does/not/exist", 404), 1);
    assert_eq!(metrics.latency("GET", "/does/not/exist").unwrap().count, 1);
}

async fn boom() -> &'static str {
    panic!("handler fault")
}

#[tokio::test]
async fn handler_panic_becomes_500_and_is_still_instrumented() {
    let metrics = Arc::new(MetricsRegistry::new());
    let state = AppState::with_metrics(GreeterConfig::default(), Arc::clone(&metrics));
    let routes: Router<AppState> = Router::new().route("/boom", get(boom));
    let app = router::with_instrumentation(routes, state);

    let res = app.oneshot(get_req("/boom")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(metrics.request_count("GET", "/boom", 500), 1);
    assert_eq!(metrics.latency("GET", "/boom").unwrap().count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_do_not_lose_increments() {
    const M: usize = 64;
    let (app, metrics) = app();

    let handles: Vec<_> = (0..M)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move { app.oneshot(get_req("/")).await.unwrap().status() })
        })
        .collect();

    for status in futures_util::future::join_all(handles).await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    assert_eq!(metrics.request_count("GET", "/", 200), M as u64);
    assert_eq!(metrics.latency("GET", "/").unwrap().count, M as u64);
}

#[test]
fn dropped_timer_commits_exactly_once() {
    let metrics = Arc::new(MetricsRegistry::new());

    let timer = RequestTimer::start(Arc::clone(&metrics), "GET", "/");
    drop(timer);
    assert_eq!(metrics.latency("GET", "/").unwrap().count, 1);

    let timer = RequestTimer::start(Arc::clone(&metrics), "GET", "/");
    let elapsed = timer.stop();
    let snap = metrics.latency("GET", "/").unwrap();
    assert_eq!(snap.count, 2);
    assert!(snap.sum >= elapsed.as_secs_f64() - 1e-6);
}
