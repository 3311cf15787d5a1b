use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use kakeibo_ocr::{ExtractError, ExtractionResult, PipelineError};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::state::AppState;

/// Multipart field carrying the receipt photo.
const IMAGE_FIELD: &str = "image";

pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/ocr", post(ocr_image))
        .route("/api/ocr/text", post(ocr_text))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRequest {
    pub raw_text: String,
}

/// `{ success: true, amount, storeName, date, rawText }` or
/// `{ success: false, error }`.
#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OcrResponse {
    fn success(result: ExtractionResult) -> Self {
        Self { success: true, result: Some(result), error: None }
    }

    fn failure(message: &str) -> Self {
        Self { success: false, result: None, error: Some(message.to_string()) }
    }
}

#[derive(Debug)]
pub enum ApiError {
    NoBackend,
    MissingImage,
    BadUpload(String),
    NoTextDetected,
    Pipeline(PipelineError),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::NoTextDetected => ApiError::NoTextDetected,
            other => ApiError::Pipeline(other),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::NoTextDetected => ApiError::NoTextDetected,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NoBackend => {
                (StatusCode::SERVICE_UNAVAILABLE, "OCRエンジンが設定されていません")
            }
            ApiError::MissingImage => (StatusCode::BAD_REQUEST, "画像ファイルが送信されていません"),
            ApiError::BadUpload(e) => {
                tracing::warn!("Rejected receipt upload: {e}");
                (StatusCode::BAD_REQUEST, "画像ファイルを読み込めませんでした")
            }
            ApiError::NoTextDetected => {
                (StatusCode::UNPROCESSABLE_ENTITY, "画像からテキストを検出できませんでした")
            }
            ApiError::Pipeline(e) => {
                tracing::error!("Receipt OCR failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "OCR処理中にエラーが発生しました")
            }
        };
        (status, Json(OcrResponse::failure(message))).into_response()
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Receipt photo → OCR engine → extracted fields.
pub async fn ocr_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OcrResponse>, ApiError> {
    let pipeline = state.pipeline.clone().ok_or(ApiError::NoBackend)?;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await.map_err(|e| ApiError::BadUpload(e.to_string()))?;
            image = Some(bytes);
            break;
        }
    }
    let image = image.ok_or(ApiError::MissingImage)?;

    tracing::info!(bytes = image.len(), "Processing receipt image");
    let result = pipeline.process_bytes(image.to_vec()).await?;
    Ok(Json(OcrResponse::success(result)))
}

/// Transcript produced elsewhere (e.g. on-device OCR) → extracted fields.
pub async fn ocr_text(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<OcrResponse>, ApiError> {
    let result = state.extractor.extract(&req.raw_text)?;
    Ok(Json(OcrResponse::success(result)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
