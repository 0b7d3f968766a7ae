//! Tool Routes
//!
//! Stateless text and data utilities. JSON in, JSON out; bad input is a 400
//! with `{error}`.
//!
//! Endpoints (all under /api/tools):
//! - POST base64/encode, base64/decode, base64/data-uri, base64/hex-dump
//! - POST units/convert, GET units/categories
//! - POST hash, password, uuid
//! - POST timestamp/convert, timestamp/adjust, timestamp/diff
//! - POST color/palette, color/extract (multipart)
//! - POST json/format, convert
//! - POST mock
//! - POST qr/generate, qr/scan (multipart)
//! - POST url/encode, url/decode, url/query
//! - POST regex/test

use axum::{
    extract::{Multipart, State},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::imaging::ImagingError;
use crate::state::AppState;
use crate::tools::{
    base64, color, convert, hash, mock, pattern, qr, secrets, timestamp, units, url, ToolError,
};
use crate::upload::read_form;

use super::{attachment, blocking, JsonBody};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tools/base64/encode", post(base64_encode))
        .route("/api/tools/base64/decode", post(base64_decode))
        .route("/api/tools/base64/data-uri", post(base64_data_uri))
        .route("/api/tools/base64/hex-dump", post(base64_hex_dump))
        .route("/api/tools/units/convert", post(units_convert))
        .route("/api/tools/units/categories", get(units_categories))
        .route("/api/tools/hash", post(hash_text))
        .route("/api/tools/password", post(password))
        .route("/api/tools/uuid", post(uuid))
        .route("/api/tools/timestamp/convert", post(timestamp_convert))
        .route("/api/tools/timestamp/adjust", post(timestamp_adjust))
        .route("/api/tools/timestamp/diff", post(timestamp_diff))
        .route("/api/tools/color/palette", post(color_palette))
        .route("/api/tools/color/extract", post(color_extract))
        .route("/api/tools/json/format", post(json_format))
        .route("/api/tools/convert", post(data_convert))
        .route("/api/tools/mock", post(mock_data))
        .route("/api/tools/qr/generate", post(qr_generate))
        .route("/api/tools/qr/scan", post(qr_scan))
        .route("/api/tools/url/encode", post(url_encode))
        .route("/api/tools/url/decode", post(url_decode))
        .route("/api/tools/url/query", post(url_query))
        .route("/api/tools/regex/test", post(regex_test))
}

#[derive(Debug, Serialize)]
struct OutputResponse {
    output: String,
}

fn output(output: String) -> Json<OutputResponse> {
    Json(OutputResponse { output })
}

// ============================================================================
// Base64
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Base64Request {
    input: String,
    #[serde(default)]
    url_safe: bool,
}

async fn base64_encode(JsonBody(req): JsonBody<Base64Request>) -> Json<OutputResponse> {
    output(base64::encode(&req.input, req.url_safe))
}

async fn base64_decode(JsonBody(req): JsonBody<Base64Request>) -> Result<Json<OutputResponse>> {
    Ok(output(base64::decode(&req.input)?))
}

async fn base64_data_uri(JsonBody(req): JsonBody<Base64Request>) -> Json<OutputResponse> {
    output(base64::data_uri(&req.input))
}

async fn base64_hex_dump(JsonBody(req): JsonBody<Base64Request>) -> Result<Json<OutputResponse>> {
    Ok(output(base64::hex_dump(&req.input)?))
}

// ============================================================================
// Units
// ============================================================================

#[derive(Debug, Deserialize)]
struct UnitsRequest {
    category: String,
    value: f64,
    from: String,
    to: String,
}

async fn units_convert(JsonBody(req): JsonBody<UnitsRequest>) -> Result<Json<Value>> {
    let result = units::convert(&req.category, req.value, &req.from, &req.to)?;
    Ok(Json(json!({ "result": result })))
}

async fn units_categories() -> Json<Vec<units::CategoryInfo>> {
    Json(units::categories())
}

// ============================================================================
// Hashing and secrets
// ============================================================================

#[derive(Debug, Deserialize)]
struct HashRequest {
    text: String,
    #[serde(default = "default_algorithm")]
    algorithm: String,
    #[serde(default)]
    encoding: Option<String>,
}

fn default_algorithm() -> String {
    "sha256".to_string()
}

async fn hash_text(JsonBody(req): JsonBody<HashRequest>) -> Result<Json<Value>> {
    let algorithm: hash::HashAlgorithm = req.algorithm.parse()?;
    let encoding = match req.encoding.as_deref() {
        Some(e) => e.parse()?,
        None => hash::DigestEncoding::default(),
    };
    Ok(Json(json!({ "hash": hash::hash_text(&req.text, algorithm, encoding) })))
}

#[derive(Debug, Deserialize)]
struct PasswordRequest {
    length: Option<usize>,
    uppercase: Option<bool>,
    lowercase: Option<bool>,
    numbers: Option<bool>,
    symbols: Option<bool>,
}

#[derive(Debug, Serialize)]
struct PasswordResponse {
    password: String,
    strength: secrets::Strength,
}

async fn password(JsonBody(req): JsonBody<PasswordRequest>) -> Result<Json<PasswordResponse>> {
    let defaults = secrets::PasswordOptions::default();
    let opts = secrets::PasswordOptions {
        length: req.length.unwrap_or(defaults.length),
        uppercase: req.uppercase.unwrap_or(defaults.uppercase),
        lowercase: req.lowercase.unwrap_or(defaults.lowercase),
        numbers: req.numbers.unwrap_or(defaults.numbers),
        symbols: req.symbols.unwrap_or(defaults.symbols),
    };
    let password = secrets::generate_password(&opts)?;
    let strength = secrets::password_strength(&password);
    Ok(Json(PasswordResponse { password, strength }))
}

#[derive(Debug, Deserialize)]
struct UuidRequest {
    #[serde(default = "default_uuid_version")]
    version: u8,
    namespace: Option<String>,
    name: Option<String>,
    #[serde(default = "default_uuid_count")]
    count: usize,
}

fn default_uuid_version() -> u8 {
    4
}

fn default_uuid_count() -> usize {
    1
}

async fn uuid(JsonBody(req): JsonBody<UuidRequest>) -> Result<Json<Value>> {
    let uuids = secrets::generate_uuids(
        req.version,
        req.namespace.as_deref(),
        req.name.as_deref(),
        req.count,
    )?;
    Ok(Json(json!({ "uuids": uuids })))
}

// ============================================================================
// Timestamps
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimestampConvertRequest {
    input: String,
    input_format: String,
    output_format: String,
    readable_format: Option<String>,
    timezone: Option<String>,
}

async fn timestamp_convert(
    JsonBody(req): JsonBody<TimestampConvertRequest>,
) -> Result<Json<OutputResponse>> {
    let converted = timestamp::convert(
        &req.input,
        req.input_format.parse()?,
        req.output_format.parse()?,
        req.readable_format.as_deref(),
        req.timezone.as_deref(),
    )?;
    Ok(output(converted))
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum AdjustOperation {
    Add,
    Subtract,
}

#[derive(Debug, Deserialize)]
struct TimestampAdjustRequest {
    input: String,
    amount: i64,
    unit: String,
    operation: AdjustOperation,
}

async fn timestamp_adjust(
    JsonBody(req): JsonBody<TimestampAdjustRequest>,
) -> Result<Json<OutputResponse>> {
    let adjusted = timestamp::adjust(
        &req.input,
        req.amount,
        req.unit.parse()?,
        req.operation == AdjustOperation::Subtract,
    )?;
    Ok(output(adjusted))
}

#[derive(Debug, Deserialize)]
struct TimestampDiffRequest {
    start: String,
    end: String,
    unit: String,
}

async fn timestamp_diff(JsonBody(req): JsonBody<TimestampDiffRequest>) -> Result<Json<Value>> {
    let difference = timestamp::diff(&req.start, &req.end, req.unit.parse()?)?;
    Ok(Json(json!({ "difference": difference, "unit": req.unit })))
}

// ============================================================================
// Colours
// ============================================================================

#[derive(Debug, Deserialize)]
struct PaletteRequest {
    base: String,
    #[serde(default = "default_scheme")]
    scheme: String,
    export: Option<String>,
}

fn default_scheme() -> String {
    "complementary".to_string()
}

#[derive(Debug, Serialize)]
struct PaletteResponse {
    colors: Vec<color::PaletteColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<String>,
}

fn palette_response(
    colors: Vec<color::PaletteColor>,
    export: Option<&str>,
) -> std::result::Result<PaletteResponse, ToolError> {
    let export = export
        .map(|f| f.parse().and_then(|f| color::export(&colors, f)))
        .transpose()?;
    Ok(PaletteResponse { colors, export })
}

async fn color_palette(JsonBody(req): JsonBody<PaletteRequest>) -> Result<Json<PaletteResponse>> {
    let colors = color::palette(&req.base, req.scheme.parse()?)?;
    Ok(Json(palette_response(colors, req.export.as_deref())?))
}

const DEFAULT_EXTRACT_COUNT: usize = 5;

/// Multipart `image` plus optional `count` and `export`
async fn color_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PaletteResponse>> {
    let form = read_form(multipart, state.max_upload()).await?;
    let image = form
        .first_file(&["image"])
        .map(|f| f.data.clone())
        .ok_or_else(|| AppError::BadRequest("Please upload an image.".to_string()))?;
    let count = form
        .field("count")
        .and_then(|c| c.trim().parse().ok())
        .unwrap_or(DEFAULT_EXTRACT_COUNT);

    let colors = blocking(move || color::extract(&image, count), ImagingError::Task).await?;
    Ok(Json(palette_response(colors, form.field("export"))?))
}

// ============================================================================
// JSON / CSV / YAML
// ============================================================================

#[derive(Debug, Deserialize)]
struct JsonFormatRequest {
    input: String,
    indent: Option<usize>,
    #[serde(default)]
    minify: bool,
}

async fn json_format(JsonBody(req): JsonBody<JsonFormatRequest>) -> Result<Json<OutputResponse>> {
    Ok(output(convert::format_json(&req.input, req.indent, req.minify)?))
}

#[derive(Debug, Deserialize)]
struct ConvertRequest {
    input: String,
    from: String,
    to: String,
}

async fn data_convert(JsonBody(req): JsonBody<ConvertRequest>) -> Result<Json<OutputResponse>> {
    Ok(output(convert::convert(
        &req.input,
        req.from.parse()?,
        req.to.parse()?,
    )?))
}

// ============================================================================
// Mock data
// ============================================================================

#[derive(Debug, Deserialize)]
struct MockRequest {
    /// JSON object, or the JSON text of one
    template: Value,
    #[serde(default = "default_mock_count")]
    count: usize,
}

fn default_mock_count() -> usize {
    1
}

async fn mock_data(JsonBody(req): JsonBody<MockRequest>) -> Result<Json<Value>> {
    let template = match req.template {
        Value::String(text) if text.trim().is_empty() => {
            return Err(ToolError::invalid("Please enter a JSON template.").into());
        }
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| ToolError::invalid(format!("Invalid JSON template: {}", e)))?,
        template => template,
    };
    let data = mock::generate(&template, req.count)?;
    Ok(Json(json!({ "data": data })))
}

// ============================================================================
// QR codes
// ============================================================================

#[derive(Debug, Deserialize)]
struct QrRequest {
    text: String,
    size: Option<u32>,
}

async fn qr_generate(JsonBody(req): JsonBody<QrRequest>) -> Result<Response> {
    let size = req.size.unwrap_or(qr::DEFAULT_SIZE);
    let png = blocking(move || qr::generate(&req.text, size), ToolError::InvalidInput).await?;
    attachment(png, "image/png", "qrcode.png")
}

async fn qr_scan(State(state): State<AppState>, multipart: Multipart) -> Result<Json<Value>> {
    let form = read_form(multipart, state.max_upload()).await?;
    let image = form
        .first_file(&["image", "file"])
        .map(|f| f.data.clone())
        .ok_or_else(|| AppError::BadRequest("Please upload an image.".to_string()))?;

    let text = blocking(move || qr::scan(&image), ToolError::InvalidInput).await?;
    Ok(Json(json!({ "text": text })))
}

// ============================================================================
// URLs
// ============================================================================

#[derive(Debug, Deserialize)]
struct UrlRequest {
    input: String,
}

async fn url_encode(JsonBody(req): JsonBody<UrlRequest>) -> Result<Json<OutputResponse>> {
    Ok(output(url::encode(&req.input)?))
}

async fn url_decode(JsonBody(req): JsonBody<UrlRequest>) -> Result<Json<OutputResponse>> {
    Ok(output(url::decode(&req.input)?))
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    params: Vec<url::QueryParam>,
}

async fn url_query(JsonBody(req): JsonBody<QueryRequest>) -> Result<Json<OutputResponse>> {
    Ok(output(url::build_query(&req.params)?))
}

// ============================================================================
// Regex
// ============================================================================

#[derive(Debug, Deserialize)]
struct RegexRequest {
    pattern: String,
    #[serde(default)]
    flags: String,
    text: String,
}

async fn regex_test(JsonBody(req): JsonBody<RegexRequest>) -> Result<Json<Value>> {
    let matches = pattern::test_pattern(&req.pattern, &req.flags, &req.text)?;
    Ok(Json(json!({ "count": matches.len(), "matches": matches })))
}
