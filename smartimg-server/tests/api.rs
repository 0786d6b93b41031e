use std::io::Cursor;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use smartimg::codec::{ImageFormat, Rgb, RgbImage};
use smartimg_server::{router, AppState, ServerConfig, UploadDir};

const BOUNDARY: &str = "smartimg-test-boundary";

/// Router backed by a temp upload dir; keep the guard alive for the test.
fn test_app() -> (Router, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        upload_dir: tmp.path().to_path_buf(),
        ..Default::default()
    };
    let uploads = UploadDir::prepare(&config.upload_dir).unwrap();
    (router(AppState::new(config, uploads)), tmp)
}

fn png(img: &RgbImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn gray_png() -> Vec<u8> {
    png(&RgbImage::from_pixel(100, 100, Rgb([128, 128, 128])))
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(uri: &str, field: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, "test.png", content)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn persisted_file(tmp: &tempfile::TempDir, download_url: &str) -> std::path::PathBuf {
    let name = download_url.strip_prefix("/download/").unwrap();
    tmp.path().join(name)
}

#[tokio::test]
async fn root_reports_liveness() {
    let (app, _tmp) = test_app();
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["message"], "Smart Image Processing API is live!");
}

#[tokio::test]
async fn health_reports_healthy() {
    let (app, _tmp) = test_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": "healthy" }));
}

#[tokio::test]
async fn analyze_reports_metrics_for_gray_image() {
    let (app, _tmp) = test_app();
    let (status, json) = send(app, upload_request("/analyze", "file", &gray_png())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "test.png");
    assert!(json["timestamp"].as_str().unwrap().contains('T'));
    assert_eq!(json["image_info"]["width"], 100);
    assert_eq!(json["image_info"]["height"], 100);
    assert!(json["image_info"]["size_kb"].as_f64().unwrap() > 0.0);

    let analysis = &json["analysis"];
    assert_eq!(analysis["blur_score"], 0.0);
    assert_eq!(analysis["brightness"], 50.2);
    assert_eq!(analysis["contrast"], 0.0);
    assert_eq!(analysis["object_count"], 1);
    assert_eq!(analysis["quality_rating"], "Poor");

    assert_eq!(
        json["recommendations"],
        serde_json::json!([
            "Image is too blurry. Consider retaking the photo.",
            "Low contrast. Enhance details for better clarity."
        ])
    );
}

#[tokio::test]
async fn analyze_rejects_non_image_bytes() {
    let (app, _tmp) = test_app();
    let (status, json) = send(app, upload_request("/analyze", "file", b"not an image")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Invalid image format");
}

#[tokio::test]
async fn analyze_requires_file_field() {
    let (app, _tmp) = test_app();
    let (status, json) = send(app, upload_request("/analyze", "photo", &gray_png())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "No file provided");
}

#[tokio::test]
async fn resize_by_percentage_persists_output() {
    let (app, tmp) = test_app();
    let (status, json) =
        send(app, upload_request("/resize?percentage=50", "file", &gray_png())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transformation"], "resize");
    assert_eq!(json["original_size"], serde_json::json!({ "width": 100, "height": 100 }));
    assert_eq!(json["new_size"], serde_json::json!({ "width": 50, "height": 50 }));

    let url = json["download_url"].as_str().unwrap();
    assert!(url.ends_with("_resized.jpg"));
    let saved = std::fs::read(persisted_file(&tmp, url)).unwrap();
    assert_eq!(smartimg::decode(&saved).unwrap().dimensions(), (50, 50));
}

#[tokio::test]
async fn resize_to_exact_dimensions() {
    let (app, _tmp) = test_app();
    let (status, json) =
        send(app, upload_request("/resize?width=40&height=30", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["new_size"], serde_json::json!({ "width": 40, "height": 30 }));
}

#[tokio::test]
async fn resize_rejects_conflicting_or_missing_parameters() {
    for uri in [
        "/resize?percentage=50&width=10",
        "/resize?width=10",
        "/resize",
    ] {
        let (app, _tmp) = test_app();
        let (status, _) = send(app, upload_request(uri, "file", &gray_png())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn resize_rejects_out_of_range_values() {
    for uri in [
        "/resize?percentage=600",
        "/resize?width=0&height=10",
        "/resize?width=abc&height=10",
        "/resize?width=100000&height=100000",
    ] {
        let (app, _tmp) = test_app();
        let (status, _) = send(app, upload_request(uri, "file", &gray_png())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn crop_reports_region_and_size() {
    let (app, tmp) = test_app();
    let (status, json) = send(
        app,
        upload_request("/crop?x=10&y=20&width=30&height=40", "file", &gray_png()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transformation"], "crop");
    assert_eq!(
        json["crop_region"],
        serde_json::json!({ "x": 10, "y": 20, "width": 30, "height": 40 })
    );
    assert_eq!(json["cropped_size"], serde_json::json!({ "width": 30, "height": 40 }));

    let url = json["download_url"].as_str().unwrap();
    assert!(url.ends_with("_cropped.jpg"));
    assert!(persisted_file(&tmp, url).is_file());
}

#[tokio::test]
async fn crop_rejects_region_outside_image() {
    let (app, _tmp) = test_app();
    let (status, json) = send(
        app,
        upload_request("/crop?x=80&y=0&width=30&height=10", "file", &gray_png()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().contains("exceeds image bounds"));
}

#[tokio::test]
async fn crop_requires_every_coordinate() {
    let (app, _tmp) = test_app();
    let (status, _) =
        send(app, upload_request("/crop?x=0&y=0&width=10", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_applies_known_kinds() {
    let (app, _tmp) = test_app();
    let (status, json) = send(app, upload_request("/filter?kind=sepia", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["transformation"], "filter");
    assert_eq!(json["parameters"], serde_json::json!({ "operation": "filter", "kind": "sepia" }));
    assert!(json["download_url"].as_str().unwrap().ends_with("_filtered.jpg"));
}

#[tokio::test]
async fn filter_rejects_unknown_kind() {
    let (app, _tmp) = test_app();
    let (status, json) =
        send(app, upload_request("/filter?kind=posterize", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["detail"].as_str().unwrap().starts_with("Unknown filter"));
}

#[tokio::test]
async fn rotate_keeps_canvas_size() {
    let (app, _tmp) = test_app();
    let (status, json) = send(app, upload_request("/rotate?angle=45", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["new_size"], json["original_size"]);
    assert_eq!(json["parameters"]["angle"], 45.0);
}

#[tokio::test]
async fn flip_validates_direction() {
    let (app, _tmp) = test_app();
    let (status, _) =
        send(app, upload_request("/flip?direction=horizontal", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::OK);

    let (app, _tmp) = test_app();
    let (status, _) =
        send(app, upload_request("/flip?direction=sideways", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn enhance_persists_same_size_output() {
    let (app, tmp) = test_app();
    let (status, json) = send(app, upload_request("/enhance", "file", &gray_png())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["new_size"], serde_json::json!({ "width": 100, "height": 100 }));

    let url = json["download_url"].as_str().unwrap();
    assert!(url.ends_with("_enhanced.jpg"));
    assert!(persisted_file(&tmp, url).is_file());
}

#[tokio::test]
async fn download_serves_persisted_output() {
    let (app, _tmp) = test_app();
    let (_, json) =
        send(app.clone(), upload_request("/resize?percentage=10", "file", &gray_png())).await;
    let url = json["download_url"].as_str().unwrap();

    let request = Request::builder().uri(url).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(smartimg::decode(&body).unwrap().dimensions(), (10, 10));
}
