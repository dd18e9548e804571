#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use agri_status::router;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_reports_ok() {
    let res = router::build_router().oneshot(get_req("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
    assert_eq!(body_json(res).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn root_reports_service_and_version() {
    let res = router::build_router().oneshot(get_req("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_json(res).await,
        json!({ "service": "python-agri-devops-platform", "version": "0.1" })
    );
}

#[tokio::test]
async fn unknown_path_is_404() {
    for uri in ["/metrics", "/healthz", "/health/extra"] {
        let res = router::build_router().oneshot(get_req(uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
