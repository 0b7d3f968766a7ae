//! HTTP contract tests using axum-test

use std::io::{Cursor, Read};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::{dictionary, Document, Object, Stream};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

use toolbox_server::feedback::{SheetsError, SpreadsheetSink};
use toolbox_server::storage::BlobStore;
use toolbox_server::{build_router, AppState, Config};

const CRON_SECRET: &str = "s3cret";

#[derive(Default)]
struct MockSink {
    rows: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl SpreadsheetSink for MockSink {
    async fn append_rows(&self, rows: Vec<Vec<String>>) -> Result<usize, SheetsError> {
        let n = rows.len();
        self.rows.lock().extend(rows);
        Ok(n)
    }
}

struct Harness {
    server: TestServer,
    sink: Arc<MockSink>,
    temp: TempDir,
    _blobs: TempDir,
}

fn harness_with_limit(max_file_size: usize) -> Harness {
    let temp = TempDir::new().unwrap();
    let blobs_dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.uploads.temp_dir = temp.path().to_path_buf();
    config.uploads.max_file_size = max_file_size;
    config.storage.local_root = blobs_dir.path().to_path_buf();
    config.cron.secret = Some(CRON_SECRET.to_string());

    let blobs = BlobStore::with_local_storage(blobs_dir.path().to_path_buf(), None);
    let sink = Arc::new(MockSink::default());
    let state = AppState::new(config, blobs, sink.clone());

    Harness {
        server: TestServer::new(build_router(state)).unwrap(),
        sink,
        temp,
        _blobs: blobs_dir,
    }
}

fn harness() -> Harness {
    harness_with_limit(10 * 1024 * 1024)
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(w, h, |x, y| image::Rgb([(x * 7) as u8, (y * 5) as u8, 90]));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

fn pdf(pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|i| {
            let content = format!("BT /F1 12 Tf 50 700 Td (Page {}) Tj ET", i);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn file_part(data: Vec<u8>, name: &str, mime: &str) -> Part {
    Part::bytes(data).file_name(name).mime_type(mime)
}

fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Download a file produced by a PDF action
async fn fetch(server: &TestServer, url: &str) -> Vec<u8> {
    let file = url.strip_prefix("/api/download?file=").unwrap();
    let file = urlencoding::decode(file).unwrap().into_owned();
    let response = server.get("/api/download").add_query_param("file", file).await;
    response.assert_status_ok();
    response.as_bytes().to_vec()
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let h = harness();
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

// ============================================================================
// Images
// ============================================================================

#[tokio::test]
async fn test_compress_single_image_returns_raw_file() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("images", file_part(png(40, 30), "photo.png", "image/png"))
        .add_text("outputFormat", "original")
        .add_text("quality", "500");

    let response = h.server.post("/api/compress-images").multipart(form).await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
    let disposition = response.header(header::CONTENT_DISPOSITION);
    assert!(disposition.to_str().unwrap().contains("compressed_photo.png"));

    let out = image::load_from_memory(response.as_bytes()).unwrap();
    assert_eq!((out.width(), out.height()), (40, 30));
}

#[tokio::test]
async fn test_compress_many_images_returns_zip() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("images", file_part(png(20, 20), "a.png", "image/png"))
        .add_part("images", file_part(png(20, 20), "b.png", "image/png"))
        .add_text("outputFormat", "webp")
        .add_text("width", "10");

    let response = h.server.post("/api/compress-images").multipart(form).await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "application/zip");

    let names = zip_names(response.as_bytes());
    assert_eq!(names, vec!["compressed_a.webp", "compressed_b.webp"]);
}

#[tokio::test]
async fn test_compress_without_images_is_400() {
    let h = harness();
    let form = MultipartForm::new().add_text("quality", "80");
    let response = h.server.post("/api/compress-images").multipart(form).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "No images provided");
}

#[tokio::test]
async fn test_oversized_upload_is_413_and_writes_nothing() {
    let h = harness_with_limit(1024);
    let form = MultipartForm::new()
        .add_part("file0", file_part(vec![b'x'; 4096], "big.pdf", "application/pdf"));

    let response = h.server.post("/api/pdf/to-word").multipart(form).await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["success"], false);

    let written = std::fs::read_dir(h.temp.path()).unwrap().count();
    assert_eq!(written, 0);

    let form = MultipartForm::new()
        .add_part("images", file_part(vec![0u8; 4096], "big.png", "image/png"));
    let response = h.server.post("/api/compress-images").multipart(form).await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_generate_icons() {
    let h = harness();
    let form = MultipartForm::new().add_part("icon", file_part(png(64, 48), "logo.png", "image/png"));

    let response = h.server.post("/api/generate-icons").multipart(form).await;
    response.assert_status_ok();

    let names = zip_names(response.as_bytes());
    assert_eq!(names.len(), 12);
    assert!(names.contains(&"ios/Icon-83.5@3x.png".to_string()));
    assert!(names.contains(&"ios/Icon-1024.png".to_string()));
    assert!(names.contains(&"android/ic_launcher_xxxhdpi.png".to_string()));

    let mut archive = zip::ZipArchive::new(Cursor::new(response.as_bytes().to_vec())).unwrap();
    let mut data = Vec::new();
    archive
        .by_name("android/ic_launcher_mdpi.png")
        .unwrap()
        .read_to_end(&mut data)
        .unwrap();
    let icon = image::load_from_memory(&data).unwrap();
    assert_eq!((icon.width(), icon.height()), (48, 48));
}

// ============================================================================
// Minification
// ============================================================================

#[tokio::test]
async fn test_minify_css_and_html() {
    let h = harness();

    let response = h
        .server
        .post("/api/minify-css")
        .json(&json!({ "css": "a { color : red ; margin: 0px; }" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["minified"], "a{color:red;margin:0}");

    let response = h
        .server
        .post("/api/minify-html")
        .json(&json!({ "html": "<p   class=\"\">  Hi   <!-- note -->there </p>" }))
        .await;
    response.assert_status_ok();
    let minified = response.json::<Value>()["minified"].as_str().unwrap().to_string();
    assert!(!minified.contains("note"));
    assert!(!minified.contains("class"));

    let response = h.server.post("/api/minify-css").json(&json!({ "beautify": true })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid or missing CSS content");

    let response = h.server.post("/api/minify-css").json(&json!({ "css": "a { color: red" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_minify_rejects_malformed_bodies_with_json_error() {
    let h = harness();

    let response = h.server.post("/api/minify-css").json(&json!({ "css": 123 })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid or missing CSS content");

    let response = h.server.post("/api/minify-css").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid or missing CSS content");

    let response = h.server.post("/api/minify-html").text("<p>hi</p>").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid or missing HTML content");

    let response = h
        .server
        .post("/api/minify-js")
        .content_type("application/json")
        .bytes(axum::body::Bytes::from_static(b"{\"js\": "))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid or missing JavaScript content");
}

#[tokio::test]
async fn test_minify_js_and_inline_scripts() {
    let h = harness();

    let response = h
        .server
        .post("/api/minify-js")
        .json(&json!({ "js": "function add(first, second) {\n  var total = first + second;\n  return total;\n}" }))
        .await;
    response.assert_status_ok();
    let minified = response.json::<Value>()["minified"].as_str().unwrap().to_string();
    assert!(minified.contains("add"));
    assert!(!minified.contains("total"));
    assert!(!minified.contains('\n'));

    let response = h
        .server
        .post("/api/minify-js")
        .json(&json!({ "js": "if (a) {\nb();\n}", "beautify": true }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["minified"], "if (a) {\n  b();\n}\n");

    let response = h.server.post("/api/minify-js").json(&json!({ "js": "var = ;" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());

    let response = h
        .server
        .post("/api/minify-html")
        .json(&json!({ "html": "<script>\n  var  greeting = 'hi' ;\n</script>" }))
        .await;
    response.assert_status_ok();
    let minified = response.json::<Value>()["minified"].as_str().unwrap().to_string();
    assert!(minified.starts_with("<script>"));
    assert!(!minified.contains("  "));
    assert!(!minified.contains('\n'));
}

// ============================================================================
// Builds and downloads
// ============================================================================

#[tokio::test]
async fn test_upload_build_and_fetch() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file", file_part(b"build-bytes".to_vec(), "app.zip", "application/zip"));

    let response = h.server.post("/api/upload-build").multipart(form).await;
    response.assert_status_ok();
    let url = response.json::<Value>()["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/api/blobs/builds/"));
    assert!(url.ends_with(".zip"));

    let fetched = h.server.get(&url).await;
    fetched.assert_status_ok();
    assert_eq!(fetched.as_bytes().as_ref(), b"build-bytes");

    let private = h.server.get("/api/blobs/feedbacks.json").await;
    private.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let h = harness();

    let response = h
        .server
        .get("/api/download")
        .add_query_param("file", "../../etc/passwd")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid file path");

    let response = h.server.get("/api/download").add_query_param("file", "/etc/passwd").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = h.server.get("/api/download").add_query_param("file", "missing.pdf").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["error"], "File not found");
}

// ============================================================================
// Feedback and cron
// ============================================================================

#[tokio::test]
async fn test_cron_requires_secret() {
    let h = harness();

    let response = h.server.get("/api/cron/sync-sheets").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = h
        .server
        .get("/api/cron/sync-sheets")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer wrong"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_feedback_sync_flow() {
    let h = harness();
    let auth = HeaderValue::from_str(&format!("Bearer {}", CRON_SECRET)).unwrap();

    let response = h
        .server
        .get("/api/cron/sync-sheets")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "No data to sync");

    let response = h
        .server
        .post("/api/feedback")
        .json(&json!({ "type": "bug", "description": "Split fails", "email": "me@example.com" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);

    let response = h
        .server
        .post("/api/feedback")
        .json(&json!({ "type": "rant", "description": "?" }))
        .await;
    assert_eq!(response.json::<Value>()["success"], false);

    let response = h
        .server
        .get("/api/cron/sync-sheets")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["synced"], 1);

    let rows = h.sink.rows.lock().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][1..], ["bug", "Split fails", "me@example.com"]);

    let response = h
        .server
        .get("/api/cron/sync-sheets")
        .add_header(header::AUTHORIZATION, auth)
        .await;
    assert_eq!(response.json::<Value>()["message"], "No data to sync");
}

// ============================================================================
// PDF actions
// ============================================================================

#[tokio::test]
async fn test_merge_preserves_page_count() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file1", file_part(pdf(3), "b.pdf", "application/pdf"))
        .add_part("file0", file_part(pdf(2), "a.pdf", "application/pdf"));

    let response = h.server.post("/api/pdf/merge").multipart(form).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);

    let merged = fetch(&h.server, body["url"].as_str().unwrap()).await;
    assert_eq!(page_count(&merged), 5);
}

#[tokio::test]
async fn test_split_by_ranges() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file0", file_part(pdf(3), "doc.pdf", "application/pdf"))
        .add_text("ranges", "1-1,2-3");

    let response = h.server.post("/api/pdf/split").multipart(form).await;
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);

    let urls: Vec<String> = body["urls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u.as_str().unwrap().to_string())
        .collect();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].contains("split_1"));
    assert_eq!(page_count(&fetch(&h.server, &urls[0]).await), 1);
    assert_eq!(page_count(&fetch(&h.server, &urls[1]).await), 2);
}

#[tokio::test]
async fn test_split_rejects_bad_range_in_body() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file0", file_part(pdf(2), "doc.pdf", "application/pdf"))
        .add_text("ranges", "1-5");

    let response = h.server.post("/api/pdf/split").multipart(form).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("range"));
}

#[tokio::test]
async fn test_to_word_rejects_non_pdf() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file", file_part(b"hello".to_vec(), "notes.txt", "text/plain"));

    let response = h.server.post("/api/pdf/to-word").multipart(form).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Please upload a PDF file.");
}

#[tokio::test]
async fn test_from_images_one_page_each() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file0", file_part(png(30, 20), "a.png", "image/png"))
        .add_part("file1", file_part(png(10, 10), "b.png", "image/png"));

    let response = h.server.post("/api/pdf/from-images").multipart(form).await;
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);

    let document = fetch(&h.server, body["url"].as_str().unwrap()).await;
    assert_eq!(page_count(&document), 2);
}

#[tokio::test]
async fn test_edit_with_legacy_fields() {
    let h = harness();
    let form = MultipartForm::new()
        .add_part("file0", file_part(pdf(1), "doc.pdf", "application/pdf"))
        .add_text("text", "Approved")
        .add_text("position", r#"{"page":1,"x":72,"y":72}"#);

    let response = h.server.post("/api/pdf/edit").multipart(form).await;
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);

    let edited = fetch(&h.server, body["url"].as_str().unwrap()).await;
    assert_eq!(page_count(&edited), 1);
}

// ============================================================================
// Tools
// ============================================================================

#[tokio::test]
async fn test_base64_tools() {
    let h = harness();

    let response = h
        .server
        .post("/api/tools/base64/encode")
        .json(&json!({ "input": "hello", "urlSafe": true }))
        .await;
    assert_eq!(response.json::<Value>()["output"], "aGVsbG8");

    let response = h
        .server
        .post("/api/tools/base64/decode")
        .json(&json!({ "input": "aGVsbG8" }))
        .await;
    assert_eq!(response.json::<Value>()["output"], "hello");

    let response = h
        .server
        .post("/api/tools/base64/hex-dump")
        .json(&json!({ "input": "@@@" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid base64 input");
}

#[tokio::test]
async fn test_units_tools() {
    let h = harness();

    let response = h
        .server
        .post("/api/tools/units/convert")
        .json(&json!({ "category": "temperature", "value": 100.0, "from": "celsius", "to": "fahrenheit" }))
        .await;
    response.assert_status_ok();
    let result = response.json::<Value>()["result"].as_f64().unwrap();
    assert!((result - 212.0).abs() < 1e-9);

    let response = h
        .server
        .post("/api/tools/units/convert")
        .json(&json!({ "category": "length", "value": 1.0, "from": "meter", "to": "gram" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = h.server.get("/api/tools/units/categories").await;
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn test_text_tools() {
    let h = harness();

    let response = h
        .server
        .post("/api/tools/hash")
        .json(&json!({ "text": "abc", "algorithm": "md5" }))
        .await;
    assert_eq!(response.json::<Value>()["hash"], "900150983cd24fb0d6963f7d28e17f72");

    let response = h
        .server
        .post("/api/tools/password")
        .json(&json!({ "length": 24 }))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["password"].as_str().unwrap().len(), 24);
    assert!(body["strength"].is_string());

    let response = h
        .server
        .post("/api/tools/regex/test")
        .json(&json!({ "pattern": "(\\d+)", "flags": "g", "text": "a1 b22" }))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["count"], 2);
    assert_eq!(body["matches"][1]["match"], "22");
    assert_eq!(body["matches"][1]["index"], 4);

    let response = h
        .server
        .post("/api/tools/url/query")
        .json(&json!({ "params": [{ "key": "q", "value": "a b" }, { "key": "", "value": "x" }] }))
        .await;
    assert_eq!(response.json::<Value>()["output"], "q=a%20b");

    let response = h
        .server
        .post("/api/tools/convert")
        .json(&json!({ "input": "{\"a\":1}", "from": "json", "to": "csv" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = h
        .server
        .post("/api/tools/color/palette")
        .json(&json!({ "base": "#FF0000", "scheme": "triadic", "export": "sass" }))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["colors"].as_array().unwrap().len(), 3);
    assert!(body["export"].as_str().unwrap().starts_with("$color-1: #FF0000;"));

    let response = h
        .server
        .post("/api/tools/timestamp/convert")
        .json(&json!({ "input": "0", "inputFormat": "unix", "outputFormat": "iso" }))
        .await;
    assert_eq!(response.json::<Value>()["output"], "1970-01-01T00:00:00.000Z");
}

#[tokio::test]
async fn test_tool_bodies_and_offsets_are_validated() {
    let h = harness();

    let response = h.server.post("/api/tools/hash").json(&json!({ "text": 5 })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());

    let response = h
        .server
        .post("/api/tools/timestamp/convert")
        .json(&json!({
            "input": "0",
            "inputFormat": "unix",
            "outputFormat": "iso",
            "timezone": "+999999:00"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());

    for (algorithm, expected) in [
        ("sha1", "a9993e364706816aba3e25717850c26c9cd0d89d"),
        ("sha3", "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"),
    ] {
        let response = h
            .server
            .post("/api/tools/hash")
            .json(&json!({ "text": "abc", "algorithm": algorithm }))
            .await;
        assert_eq!(response.json::<Value>()["hash"], expected);
    }
}

#[tokio::test]
async fn test_mock_data() {
    let h = harness();

    let response = h
        .server
        .post("/api/tools/mock")
        .json(&json!({
            "template": { "id": "", "fullName": "", "email": "a@b.io", "age": 30, "tags": ["x", "y"] },
            "count": 3
        }))
        .await;
    response.assert_status_ok();
    let data = response.json::<Value>()["data"].as_array().unwrap().clone();
    assert_eq!(data.len(), 3);
    for record in &data {
        assert!(record["email"].as_str().unwrap().ends_with("@b.io"));
        assert_eq!(record["tags"].as_array().unwrap().len(), 2);
        assert!(record["age"].is_i64());
    }

    let response = h
        .server
        .post("/api/tools/mock")
        .json(&json!({ "template": "{\"name\": \"\"}" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);

    let response = h
        .server
        .post("/api/tools/mock")
        .json(&json!({ "template": "[1, 2]" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Input must be a valid JSON object.");

    let response = h
        .server
        .post("/api/tools/mock")
        .json(&json!({ "template": { "a": 1 }, "count": 500 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_qr_generate_and_scan() {
    let h = harness();

    let response = h
        .server
        .post("/api/tools/qr/generate")
        .json(&json!({ "text": "hello from the toolbox" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
    let png = response.as_bytes().to_vec();

    let form = MultipartForm::new().add_part("image", file_part(png, "qrcode.png", "image/png"));
    let response = h.server.post("/api/tools/qr/scan").multipart(form).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["text"], "hello from the toolbox");

    let response = h.server.post("/api/tools/qr/generate").json(&json!({ "text": " " })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Please enter text or URL");
}
