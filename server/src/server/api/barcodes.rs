//! Barcode rendering API: zip archive of JPEGs and single-image preview.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use barcode_engine::bars::BarcodeValue;
use barcode_engine::{
    BarcodeRow, BatchRenderer, EngineError, RenderConfig, RenderOptions, TargetBox,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::SharedState;
use crate::config::AppConfig;

use super::err_json;

type ApiResult = Result<Response, (StatusCode, Json<Value>)>;

const ARCHIVE_FILE_NAME: &str = "barcodes.zip";

/// Output sizing shared by both endpoints. `0` for a side means "not set".
#[derive(Debug, Default, Deserialize)]
pub struct SizingRequest {
    pub dpi: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
}

impl SizingRequest {
    /// Merge request sizing with server defaults.
    ///
    /// DPI must lie in `1..=MAX_DPI` and each box side in `1..=MAX_TARGET_SIDE`.
    pub fn resolve(&self, config: &AppConfig) -> Result<RenderOptions, EngineError> {
        let render = RenderConfig::with_dpi(self.dpi.unwrap_or(config.default_dpi));
        render.validate()?;
        let target = TargetBox::new(
            self.width.filter(|w| *w > 0),
            self.height.filter(|h| *h > 0),
        )?;
        Ok(RenderOptions {
            config: render,
            target,
            jpeg_quality: self.quality.unwrap_or(config.jpeg_quality),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub rows: Vec<BarcodeRow>,
    #[serde(flatten)]
    pub sizing: SizingRequest,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub barcode: String,
    #[serde(flatten)]
    pub sizing: SizingRequest,
}

/// POST /api/barcodes/archive – Render every row and return a zip of JPEGs
pub async fn create_archive(
    State(state): State<SharedState>,
    Json(req): Json<ArchiveRequest>,
) -> ApiResult {
    let config = state.config();
    if req.rows.is_empty() {
        return Err(err_json(400, "No data found. Provide at least one row."));
    }
    if req.rows.len() > config.max_rows {
        return Err(err_json(
            413,
            &format!("Too many rows (max {})", config.max_rows),
        ));
    }

    let options = req
        .sizing
        .resolve(config)
        .map_err(|e| err_json(400, &e.to_string()))?;
    let renderer = BatchRenderer::new(state.compositor(), options);
    let rows = req.rows;

    let (report, archive) = tokio::task::spawn_blocking(move || {
        let output = renderer.render_batch(&rows);
        let archive = output.to_zip();
        (output.report, archive)
    })
    .await
    .map_err(|e| err_json(500, &e.to_string()))?;

    if report.rendered == 0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "status": "error",
                "error": "No barcodes could be rendered",
                "report": report,
            })),
        ));
    }
    let archive = archive.map_err(|e| err_json(500, &e.to_string()))?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{ARCHIVE_FILE_NAME}\""),
        )
        .header("X-Rendered-Count", report.rendered)
        .header("X-Skipped-Count", report.skipped)
        .header("X-Failed-Count", report.failures.len())
        .body(Body::from(archive))
        .map_err(|e| err_json(500, &e.to_string()))
}

/// POST /api/barcodes/preview – Render a single barcode as JPEG
pub async fn preview(
    State(state): State<SharedState>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult {
    let value = BarcodeValue::new(&req.barcode).map_err(|e| err_json(422, &e.to_string()))?;
    let options = req
        .sizing
        .resolve(state.config())
        .map_err(|e| err_json(400, &e.to_string()))?;
    let renderer = BatchRenderer::new(state.compositor(), options);

    let bytes = tokio::task::spawn_blocking(move || renderer.render_value(&value))
        .await
        .map_err(|e| err_json(500, &e.to_string()))?
        .map_err(|e| match e {
            EngineError::Encoding(_) | EngineError::InvalidDimension { .. } => {
                err_json(422, &e.to_string())
            }
            _ => err_json(500, &e.to_string()),
        })?;

    Response::builder()
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from(bytes))
        .map_err(|e| err_json(500, &e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use axum::body::to_bytes;
    use axum::http::Request;
    use barcode_engine::{CaptionCompositor, CaptionFont};
    use tower::ServiceExt;

    use super::*;
    use crate::server::router::create_router;

    fn test_router() -> axum::Router {
        let state = SharedState::new(
            AppConfig::default(),
            CaptionCompositor::new(CaptionFont::Bitmap),
        );
        create_router(state)
    }

    async fn post_json(uri: &str, body: Value) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        test_router().oneshot(request).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn sizing_zero_means_unset() {
        let sizing = SizingRequest {
            width: Some(0),
            height: Some(300),
            ..SizingRequest::default()
        };
        let options = sizing.resolve(&AppConfig::default()).unwrap();
        assert_eq!(options.target, TargetBox::new(None, Some(300)).unwrap());
        assert_eq!(options.config.dpi, 300);
        assert_eq!(options.jpeg_quality, 90);
    }

    #[test]
    fn sizing_rejects_zero_dpi() {
        let sizing = SizingRequest {
            dpi: Some(0),
            ..SizingRequest::default()
        };
        assert!(sizing.resolve(&AppConfig::default()).is_err());
    }

    #[test]
    fn sizing_rejects_dpi_above_limit() {
        for dpi in [2401, 100_000, u32::MAX] {
            let sizing = SizingRequest {
                dpi: Some(dpi),
                ..SizingRequest::default()
            };
            assert!(matches!(
                sizing.resolve(&AppConfig::default()),
                Err(EngineError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn sizing_rejects_oversized_box() {
        let sizing = SizingRequest {
            width: Some(65_536),
            height: Some(300),
            ..SizingRequest::default()
        };
        assert!(matches!(
            sizing.resolve(&AppConfig::default()),
            Err(EngineError::InvalidDimension { .. })
        ));

        let sizing = SizingRequest {
            width: Some(65_535),
            ..SizingRequest::default()
        };
        assert!(sizing.resolve(&AppConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn archive_contains_one_jpeg_per_row_in_order() {
        let response = post_json(
            "/api/barcodes/archive",
            json!({
                "rows": [
                    { "Barcode": "T0125123126021725551630", "JPEG Name": "25_off_55_uk" },
                    { "barcode": "  ", "jpeg_name": "blank" },
                    { "barcode": "T0525123126021710204367", "jpeg_name": "10_off_20_roi.jpg" }
                ],
                "width": 600,
                "height": 300
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/zip"
        );
        assert_eq!(response.headers()["X-Rendered-Count"], "2");
        assert_eq!(response.headers()["X-Skipped-Count"], "1");

        let bytes = body_bytes(response).await;
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive.by_index(0).unwrap().name(), "25_off_55_uk.jpg");
        assert_eq!(archive.by_index(1).unwrap().name(), "10_off_20_roi.jpg");
    }

    #[tokio::test]
    async fn archive_without_rows_is_rejected() {
        let response = post_json("/api/barcodes/archive", json!({ "rows": [] })).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn archive_with_only_bad_rows_reports_failures() {
        let response = post_json(
            "/api/barcodes/archive",
            json!({ "rows": [{ "barcode": "caf\u{e9}", "jpeg_name": "x" }] }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["report"]["failures"][0]["index"], 0);
    }

    #[tokio::test]
    async fn preview_returns_jpeg() {
        let response = post_json(
            "/api/barcodes/preview",
            json!({ "barcode": "T0125123126021725551630", "width": 300 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

        let bytes = body_bytes(response).await;
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn preview_rejects_unencodable_value() {
        let response = post_json("/api/barcodes/preview", json!({ "barcode": "" })).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn preview_with_huge_dpi_is_bad_request() {
        let response = post_json(
            "/api/barcodes/preview",
            json!({ "barcode": "T0125123126021725551630", "dpi": 4_294_967_295u32 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn archive_with_oversized_box_is_bad_request() {
        let response = post_json(
            "/api/barcodes/archive",
            json!({
                "rows": [{ "barcode": "ABC", "jpeg_name": "abc" }],
                "width": 100_000,
                "height": 100_000
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preview_too_large_after_fitting_is_unprocessable() {
        let response = post_json(
            "/api/barcodes/preview",
            json!({ "barcode": "T0125123126021725551630", "width": 65_535 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn status_reports_ok() {
        let request = Request::builder()
            .uri("/status")
            .body(Body::empty())
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
