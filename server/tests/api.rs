use std::{
    io::Cursor,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use camino::Utf8PathBuf as PathBuf;
use claims::{assert_ge, assert_le, assert_some};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use pretty_assertions::assert_eq;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use folio::{
    app_state::{AppState, SharedState},
    schema::{DeletedImage, ErrorBody, Image, ImageDetails, UploadedImage, UploadedVideo, Video},
};
use folio_core::{
    catalog::{self, operation::ingest::UploadLimits},
    contact::{ContactMessage, Mailer},
    processing::image::DerivationSettings,
    storage::{LocalFileStorage, Storage},
};

const BOUNDARY: &str = "folio-test-boundary";

#[derive(Debug, Default)]
struct TestMailer {
    sent: Mutex<Vec<ContactMessage>>,
    fail: bool,
}

#[async_trait]
impl Mailer for TestMailer {
    async fn send(&self, message: &ContactMessage) -> eyre::Result<()> {
        if self.fail {
            eyre::bail!("mail service unreachable");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

struct TestApp {
    dir: TempDir,
    router: Router,
    mailer: Arc<TestMailer>,
}

impl TestApp {
    async fn new() -> TestApp {
        Self::with(UploadLimits::default(), TestMailer::default()).await
    }

    async fn with(limits: UploadLimits, mailer: TestMailer) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let root = PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let storage: Storage = Arc::new(LocalFileStorage::new(root.clone()));
        catalog::ensure_layout(&storage).await.unwrap();
        let mailer = Arc::new(mailer);
        let state: SharedState = Arc::new(AppState {
            storage,
            limits,
            derivation: DerivationSettings::default(),
            mailer: mailer.clone(),
        });
        let router = folio::app(state, &root, None);
        TestApp {
            dir,
            router,
            mailer,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn delete(&self, uri: &str) -> Response {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn upload(
        &self,
        uri: &str,
        field: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Response {
        let body = multipart_body(field, file_name, content_type, data);
        self.send(
            Request::post(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn post_json(&self, uri: &str, value: Value) -> Response {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
        )
        .await
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.path().join(key)
    }

    fn files_in(&self, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path(dir))
            .unwrap()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().unwrap().is_file())
            .map(|e| e.file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            BOUNDARY, field, file_name, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Jpeg(90))
        .unwrap();
    buf
}

async fn json_body<T: DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn error_message(response: Response) -> String {
    json_body::<ErrorBody>(response).await.error
}

#[tokio::test]
async fn upload_image_derives_variants() {
    let app = TestApp::new().await;
    let before = chrono::Utc::now().timestamp_millis();
    let response = app
        .upload("/api/upload", "image", "photo.jpg", "image/jpeg", &jpeg(3000, 2000))
        .await;
    let after = chrono::Utc::now().timestamp_millis();
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded: UploadedImage = json_body(response).await;

    let (ts, rest) = uploaded.filename.split_once('-').unwrap();
    assert_eq!(rest, "photo.jpg");
    let ts: i64 = ts.parse().unwrap();
    assert_ge!(ts, before);
    assert_le!(ts, after);

    let stem = uploaded.filename.trim_end_matches(".jpg");
    assert_eq!(uploaded.original_url, format!("/uploads/{}", uploaded.filename));
    assert_eq!(
        uploaded.optimized_url,
        format!("/uploads/optimized/{}-optimized.jpg", stem)
    );
    assert_eq!(
        uploaded.thumbnail_url,
        format!("/uploads/thumbnails/{}-thumb.jpg", stem)
    );

    let optimized = image::open(app.path(&format!("optimized/{}-optimized.jpg", stem))).unwrap();
    assert_eq!(optimized.dimensions(), (1920, 1280));
    let thumbnail = image::open(app.path(&format!("thumbnails/{}-thumb.jpg", stem))).unwrap();
    assert_eq!(thumbnail.dimensions(), (400, 267));
    let optimized_data =
        std::fs::read(app.path(&format!("optimized/{}-optimized.jpg", stem))).unwrap();
    // SOF2, progressive DCT frame
    assert!(optimized_data.windows(2).any(|w| w == [0xFF, 0xC2]));

    let images: Vec<Image> = json_body(app.get("/api/images").await).await;
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].filename, uploaded.filename);
    assert_eq!(images[0].timestamp, Some(ts));

    let served = app.get(&uploaded.thumbnail_url).await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn small_image_is_not_upscaled() {
    let app = TestApp::new().await;
    let response = app
        .upload("/api/upload", "image", "small.jpg", "image/jpeg", &jpeg(300, 200))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded: UploadedImage = json_body(response).await;
    let stem = uploaded.filename.trim_end_matches(".jpg");
    let thumbnail = image::open(app.path(&format!("thumbnails/{}-thumb.jpg", stem))).unwrap();
    assert_eq!(thumbnail.dimensions(), (300, 200));
}

#[tokio::test]
async fn undecodable_image_keeps_original() {
    let app = TestApp::new().await;
    let response = app
        .upload("/api/upload", "image", "broken.png", "image/png", b"not a png")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let uploaded: UploadedImage = json_body(response).await;
    assert_eq!(app.files_in(""), vec![uploaded.filename.clone()]);
    assert!(app.files_in("optimized").is_empty());
    assert!(app.files_in("thumbnails").is_empty());
}

#[tokio::test]
async fn upload_rejects_unsupported_type() {
    let app = TestApp::new().await;
    let response = app
        .upload("/api/upload", "image", "notes.txt", "text/plain", b"hello")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(response).await,
        "Unsupported file type: text/plain"
    );
    assert!(app.files_in("").is_empty());
}

#[tokio::test]
async fn upload_rejects_declared_octet_stream() {
    let app = TestApp::new().await;
    let response = app
        .upload(
            "/api/upload",
            "image",
            "photo.jpg",
            "application/octet-stream",
            &jpeg(10, 10),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(response).await,
        "Unsupported file type: application/octet-stream"
    );
    assert!(app.files_in("").is_empty());
}

#[tokio::test]
async fn upload_without_file_field() {
    let app = TestApp::new().await;
    let response = app
        .upload("/api/upload", "picture", "photo.jpg", "image/jpeg", &jpeg(10, 10))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "No file uploaded");
    assert!(app.files_in("").is_empty());
}

#[tokio::test]
async fn upload_over_limit_leaves_nothing_behind() {
    let limits = UploadLimits {
        image_max_bytes: 1024,
        ..UploadLimits::default()
    };
    let app = TestApp::with(limits, TestMailer::default()).await;
    let response = app
        .upload("/api/upload", "image", "big.jpg", "image/jpeg", &jpeg(200, 200))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.starts_with("File too large"));
    assert!(app.files_in("").is_empty());
}

#[tokio::test]
async fn videos_listed_newest_first() {
    let app = TestApp::new().await;
    let response = app
        .upload("/api/upload-video", "video", "first.mp4", "video/mp4", b"first")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let first: UploadedVideo = json_body(response).await;
    assert_eq!(first.size, 5);
    assert_eq!(first.url, format!("/uploads/videos/{}", first.filename));

    tokio::time::sleep(Duration::from_millis(5)).await;
    let response = app
        .upload("/api/upload-video", "video", "second.webm", "video/webm", b"second")
        .await;
    let second: UploadedVideo = json_body(response).await;

    let videos: Vec<Video> = json_body(app.get("/api/videos").await).await;
    let names: Vec<&str> = videos.iter().map(|v| v.filename.as_str()).collect();
    assert_eq!(names, vec![second.filename.as_str(), first.filename.as_str()]);
}

#[tokio::test]
async fn video_upload_rejects_images() {
    let app = TestApp::new().await;
    let response = app
        .upload("/api/upload-video", "video", "photo.jpg", "image/jpeg", &jpeg(10, 10))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.files_in("videos").is_empty());
}

#[tokio::test]
async fn image_details_and_delete() {
    let app = TestApp::new().await;
    let data = jpeg(800, 600);
    let uploaded: UploadedImage = json_body(
        app.upload("/api/upload", "image", "photo.jpg", "image/jpeg", &data)
            .await,
    )
    .await;
    let uri = format!("/api/image/{}", uploaded.filename);

    let response = app.get(&uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let details: ImageDetails = json_body(response).await;
    assert_eq!(details.size, data.len() as u64);
    assert_eq!(details.thumbnail_url, uploaded.thumbnail_url);
    let uploaded_at = assert_some!(details.uploaded_at);
    assert_eq!(
        Some(uploaded_at.timestamp_millis()),
        uploaded.filename.split('-').next().unwrap().parse().ok()
    );

    let response = app.delete(&uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: DeletedImage = json_body(response).await;
    assert_eq!(deleted.deleted, 3);
    assert!(app.files_in("").is_empty());
    assert!(app.files_in("optimized").is_empty());
    assert!(app.files_in("thumbnails").is_empty());

    assert_eq!(app.get(&uri).await.status(), StatusCode::NOT_FOUND);
    let response = app.delete(&uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(response).await, "Image not found");
}

#[tokio::test]
async fn store_directories_are_not_images() {
    let app = TestApp::new().await;
    for dir in ["optimized", "thumbnails", "videos"] {
        let uri = format!("/api/image/{}", dir);
        assert_eq!(app.get(&uri).await.status(), StatusCode::NOT_FOUND);
        let response = app.delete(&uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_message(response).await, "Image not found");
    }
}

#[tokio::test]
async fn path_traversal_is_rejected() {
    let app = TestApp::new().await;
    assert_eq!(
        app.get("/api/image/..%2FCargo.toml").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.delete("/api/image/..%2FCargo.toml").await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn contact_form() {
    let app = TestApp::new().await;
    let response = app
        .post_json(
            "/api/contact",
            json!({"name": "Ada", "email": "ada@example.com", "message": "Hi there"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body::<Value>(response).await, json!({"success": true}));
    assert_eq!(app.mailer.sent.lock().unwrap().len(), 1);

    let response = app
        .post_json("/api/contact", json!({"name": "Ada", "message": "Hi"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "All fields are required");
    assert_eq!(app.mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn contact_delivery_failure() {
    let mailer = TestMailer {
        fail: true,
        ..TestMailer::default()
    };
    let app = TestApp::with(UploadLimits::default(), mailer).await;
    let response = app
        .post_json(
            "/api/contact",
            json!({"name": "Ada", "email": "ada@example.com", "message": "Hi there"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(response).await, "Failed to send message");
}
