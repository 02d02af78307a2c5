use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use skygram::ai::{MockClassifier, MockGenerationFailure, MockImageGenerator};
use skygram::captions::{FixedCaptionPicker, CAPTIONS};
use skygram::models::{
    ErrorResponse, HealthResponse, MessageResponse, ProcessCloudResponse, ServiceStatus,
    MAX_UPLOAD_BYTES,
};
use skygram::pipeline::{CloudPipeline, PipelineServices};
use skygram::server::{router, AppState};
use skygram::storage::ImageStore;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "skygram-test-boundary";
const FIXED_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0xAA, 0xBB];

struct TestApp {
    _dir: TempDir,
    router: Router,
    classifier: MockClassifier,
    generator: MockImageGenerator,
    uploads_dir: std::path::PathBuf,
    generated_dir: std::path::PathBuf,
}

fn build_app(classifier: MockClassifier, generator: MockImageGenerator) -> TestApp {
    let dir = TempDir::new().unwrap();
    let uploads_dir = dir.path().join("uploads");
    let generated_dir = dir.path().join("generated");
    let store = ImageStore::new(&uploads_dir, &generated_dir).unwrap();

    let pipeline = CloudPipeline::new(
        PipelineServices {
            classifier: Box::new(classifier.clone()),
            generator: Box::new(generator.clone()),
            captions: Box::new(FixedCaptionPicker(3)),
        },
        store,
    );
    let state = AppState::new(pipeline, ServiceStatus::from_flags(true, true));
    let router = router(state, &["http://localhost:3000".to_string()]);

    TestApp {
        _dir: dir,
        router,
        classifier,
        generator,
        uploads_dir,
        generated_dir,
    }
}

fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"cloud.jpg\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process-cloud")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, content_type, data)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(len, 0x5A);
    bytes
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_root_reports_liveness() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let message: MessageResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(message.message, "SkyGram AI Backend is running!");
}

#[tokio::test]
async fn test_health_reports_services_and_directories() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.services.gemini, "configured");
    assert_eq!(health.services.huggingface, "configured");
    assert_eq!(health.directories.uploads, app.uploads_dir.display().to_string());
    assert_eq!(
        health.directories.generated,
        app.generated_dir.display().to_string()
    );
}

#[tokio::test]
async fn test_castle_scenario_end_to_end() {
    let app = build_app(
        MockClassifier::new().with_label("castle"),
        MockImageGenerator::new().with_image_response(FIXED_PNG.to_vec()),
    );
    let original = fake_jpeg(50 * 1024);

    let (status, _, body) = send(&app, upload_request("file", "image/jpeg", &original)).await;
    assert_eq!(status, StatusCode::OK);

    let response: ProcessCloudResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.detected_object, "castle");
    assert!(response.generated_image_url.ends_with("_castle.png"));
    assert!(CAPTIONS.contains(&response.caption.as_str()));
    assert_eq!(response.caption, CAPTIONS[3]);
    assert_eq!(app.classifier.get_seen_mime_types(), vec!["image/jpeg"]);

    // Original round-trips byte-identically.
    let (status, headers, bytes) = send(&app, get(&response.original_image_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(bytes, original);

    let (status, headers, bytes) = send(&app, get(&response.generated_image_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(bytes, FIXED_PNG);

    let (status, headers, bytes) = send(&app, get(&response.download_url)).await;
    assert_eq!(status, StatusCode::OK);
    let filename = format!("{}_castle.png", response.session_id);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!(
            "attachment; filename=\"cloud-art-{0}\"; filename*=UTF-8''cloud-art-{0}",
            filename
        )
        .as_str()
    );
    assert_eq!(bytes, FIXED_PNG);
}

#[tokio::test]
async fn test_download_of_non_ascii_label_uses_encoded_filename() {
    let app = build_app(
        MockClassifier::new().with_label("Château"),
        MockImageGenerator::new().with_image_response(FIXED_PNG.to_vec()),
    );

    let (status, _, body) = send(&app, upload_request("file", "image/jpeg", &fake_jpeg(64))).await;
    assert_eq!(status, StatusCode::OK);
    let response: ProcessCloudResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.detected_object, "château");

    let filename = format!("{}_château.png", response.session_id);
    let uri = format!("/download/{}", urlencoding::encode(&filename));
    let (status, headers, bytes) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, FIXED_PNG);

    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert_eq!(
        disposition,
        format!(
            "attachment; filename=\"cloud-art-{0}_ch_teau.png\"; filename*=UTF-8''cloud-art-{0}_ch%C3%A2teau.png",
            response.session_id
        )
    );
}

#[tokio::test]
async fn test_read_endpoints_are_idempotent() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (_, _, body) = send(&app, upload_request("file", "image/png", &fake_jpeg(256))).await;
    let response: ProcessCloudResponse = serde_json::from_slice(&body).unwrap();

    let first = send(&app, get(&response.generated_image_url)).await;
    let second = send(&app, get(&response.generated_image_url)).await;
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(first.0, second.0);
    assert_eq!(first.2, second.2);
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, body) = send(&app, upload_request("file", "text/plain", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.detail, "File must be an image");
    assert_eq!(app.classifier.get_call_count(), 0);
    assert_eq!(app.generator.get_call_count(), 0);
    assert_eq!(file_count(&app.uploads_dir), 0);
    assert_eq!(file_count(&app.generated_dir), 0);
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, body) = send(&app, upload_request("photo", "image/jpeg", b"abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.detail, "No file uploaded");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_before_upstream_calls() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, body) = send(
        &app,
        upload_request("file", "image/jpeg", &fake_jpeg(MAX_UPLOAD_BYTES + 1)),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.detail, "File too large (max 10MB)");
    assert_eq!(app.classifier.get_call_count(), 0);
    assert_eq!(file_count(&app.uploads_dir), 0);
}

#[tokio::test]
async fn test_body_far_beyond_limit_is_payload_too_large() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, _) = send(
        &app,
        upload_request("file", "image/jpeg", &fake_jpeg(2 * MAX_UPLOAD_BYTES)),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.classifier.get_call_count(), 0);
}

#[tokio::test]
async fn test_classification_failure_is_500_and_keeps_original() {
    let app = build_app(
        MockClassifier::new().with_failure("vision model unavailable"),
        MockImageGenerator::new(),
    );

    let (status, _, body) = send(&app, upload_request("file", "image/jpeg", &fake_jpeg(64))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.detail, "Cloud analysis failed");
    assert_eq!(app.generator.get_call_count(), 0);
    assert_eq!(file_count(&app.uploads_dir), 1);
}

#[tokio::test]
async fn test_generation_error_status_is_502_without_generated_file() {
    let app = build_app(
        MockClassifier::new(),
        MockImageGenerator::new().with_failure(MockGenerationFailure::Unavailable),
    );

    let (status, _, body) = send(&app, upload_request("file", "image/jpeg", &fake_jpeg(64))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.detail, "Image generation service unavailable");
    assert_eq!(file_count(&app.generated_dir), 0);
}

#[tokio::test]
async fn test_generation_timeout_is_503() {
    let app = build_app(
        MockClassifier::new(),
        MockImageGenerator::new().with_failure(MockGenerationFailure::Unreachable),
    );

    let (status, _, body) = send(&app, upload_request("file", "image/jpeg", &fake_jpeg(64))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.detail, "Service temporarily unavailable");
    assert_eq!(file_count(&app.generated_dir), 0);
}

#[tokio::test]
async fn test_unknown_images_are_404() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let (status, _, _) = send(
        &app,
        get("/images/original/3b241101-e2bb-4255-8caf-4136c566a962"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, get("/images/original/not-a-session")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, get("/images/generated/missing.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, get("/download/missing.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_encoded_traversal_is_404() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());
    std::fs::write(app.uploads_dir.join("private.png"), b"private").unwrap();

    let (status, _, _) = send(&app, get("/images/generated/..%2Fuploads%2Fprivate.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, get("/download/..%2Fuploads%2Fprivate.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let app = build_app(MockClassifier::new(), MockImageGenerator::new());

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );

    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
