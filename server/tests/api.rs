use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> (Arc<server::api::AppState>, std::path::PathBuf) {
    let base = std::env::temp_dir().join(format!("api-test-{}", uuid::Uuid::now_v7()));
    let match_dir = base.join("matches");
    std::fs::create_dir_all(&match_dir).unwrap();

    let maps_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../assets/maps");
    let state = Arc::new(server::api::AppState {
        jobs: server::jobs::JobStore::default(),
        maps: server::maps::MapRegistry::load(std::path::Path::new(maps_dir)),
        storage: Box::new(server::storage::FileStorage::new(base.join("uploads"))),
        match_dir,
        collect: collector::Config::default(),
    });

    (state, base)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn unknown_job_status_is_404() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/match/missing/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(StatusCode::NOT_FOUND, response.status());
    let body = body_json(response).await;
    assert!(body["error"].is_string());

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn finished_match_is_served_from_disk() {
    let (state, base) = test_state();
    std::fs::write(
        state.match_dir.join("m1.json"),
        b"{\"id\":\"m1\",\"map\":\"de_dust2\"}",
    )
    .unwrap();
    let app = server::api::router(state);

    let response = app
        .oneshot(Request::builder().uri("/match/m1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        "application/json",
        response.headers()["content-type"].to_str().unwrap()
    );
    let body = body_json(response).await;
    assert_eq!("de_dust2", body["map"]);

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn running_job_answers_with_its_record() {
    let (state, base) = test_state();
    state.jobs.create("m2".to_string());
    let app = server::api::router(state);

    let response = app
        .oneshot(Request::builder().uri("/match/m2").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());
    let body = body_json(response).await;
    assert_eq!("parsing", body["status"]);
    assert_eq!("m2", body["id"]);

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn traversal_ids_are_rejected() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/match/..%2Fsecrets")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn map_listing_is_slim() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let response = app
        .oneshot(Request::builder().uri("/maps").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    let dust2 = entries
        .iter()
        .find(|entry| entry["name"] == "de_dust2")
        .unwrap();
    assert_eq!("Dust II", dust2["displayName"]);
    // The listing only carries names, calibration comes with the match.
    assert!(dust2.get("posX").is_none());

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn radar_image_is_served() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/maps/de_dust2/radar.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        "image/png",
        response.headers()["content-type"].to_str().unwrap()
    );
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    assert_eq!(&b"\x89PNG"[..], &bytes[..4]);

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn unknown_radar_is_404() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/maps/de_vertigo/radar.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(StatusCode::NOT_FOUND, response.status());

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn upload_without_demo_field_is_rejected() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let body = concat!(
        "--boundary\r\n",
        "Content-Disposition: form-data; name=\"other\"\r\n",
        "\r\n",
        "content\r\n",
        "--boundary--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/parse")
                .header("content-type", "multipart/form-data; boundary=boundary")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body = body_json(response).await;
    assert_eq!("Missing 'demo' field in upload", body["error"]);

    std::fs::remove_dir_all(&base).unwrap();
}

#[tokio::test]
async fn upload_with_wrong_extension_is_rejected() {
    let (state, base) = test_state();
    let app = server::api::router(state);

    let body = concat!(
        "--boundary\r\n",
        "Content-Disposition: form-data; name=\"demo\"; filename=\"match.dem\"\r\n",
        "\r\n",
        "content\r\n",
        "--boundary--\r\n"
    );
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/parse")
                .header("content-type", "multipart/form-data; boundary=boundary")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    std::fs::remove_dir_all(&base).unwrap();
}
