//! Row-to-file pipeline: one captioned JPEG per input row.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::archive::{RenderedFile, write_zip};
use crate::bars::{BarcodeValue, render_bars};
use crate::caption::CaptionCompositor;
use crate::config::{RenderConfig, TargetBox};
use crate::encode::{DEFAULT_JPEG_QUALITY, encode_jpeg};
use crate::EngineError;

const JPEG_EXTENSION: &str = ".jpg";

/// A (barcode, file name) pair from the ingestion layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeRow {
    #[serde(alias = "Barcode")]
    pub barcode: String,
    #[serde(alias = "JPEG Name", alias = "jpegName")]
    pub jpeg_name: String,
}

impl BarcodeRow {
    pub fn new(barcode: impl Into<String>, jpeg_name: impl Into<String>) -> Self {
        Self {
            barcode: barcode.into(),
            jpeg_name: jpeg_name.into(),
        }
    }
}

/// Per-request rendering options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub config: RenderConfig,
    pub target: TargetBox,
    pub jpeg_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            config: RenderConfig::default(),
            target: TargetBox::none(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// A row that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub index: usize,
    pub barcode: String,
    pub reason: String,
}

/// Outcome counts for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub rendered: usize,
    pub skipped: usize,
    pub failures: Vec<RowFailure>,
}

/// Rendered files plus the report describing the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub files: Vec<RenderedFile>,
    pub report: BatchReport,
}

impl BatchOutput {
    /// Package the rendered files as a zip archive.
    pub fn to_zip(&self) -> Result<Vec<u8>, EngineError> {
        write_zip(&self.files)
    }
}

/// Ensure the name ends with `.jpg` (case-insensitive check).
pub fn normalize_file_name(name: &str) -> String {
    let name = name.trim();
    if name.to_lowercase().ends_with(JPEG_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{JPEG_EXTENSION}")
    }
}

/// Renders rows into named JPEG files.
#[derive(Debug)]
pub struct BatchRenderer {
    compositor: Arc<CaptionCompositor>,
    options: RenderOptions,
}

impl BatchRenderer {
    pub fn new(compositor: Arc<CaptionCompositor>, options: RenderOptions) -> Self {
        Self {
            compositor,
            options,
        }
    }

    /// Render a single barcode value to JPEG bytes.
    pub fn render_value(&self, value: &BarcodeValue) -> Result<Vec<u8>, EngineError> {
        let bars = render_bars(value, &self.options.config)?;
        let img = self
            .compositor
            .compose(&bars, value.as_str(), self.options.target)?;
        encode_jpeg(&img, self.options.jpeg_quality)
    }

    /// Render one row, or `Ok(None)` when either field is blank.
    pub fn render_row(&self, row: &BarcodeRow) -> Result<Option<RenderedFile>, EngineError> {
        let Some((value, file_name)) = prepare_row(row)? else {
            return Ok(None);
        };
        let bytes = self.render_value(&value)?;
        Ok(Some(RenderedFile { file_name, bytes }))
    }

    /// Render every row in source order.
    ///
    /// Blank rows are skipped and failing rows are reported; neither stops
    /// the batch. Rows repeating an earlier barcode reuse its bytes.
    pub fn render_batch(&self, rows: &[BarcodeRow]) -> BatchOutput {
        let mut output = BatchOutput::default();
        let mut rendered: HashMap<BarcodeValue, Vec<u8>> = HashMap::new();

        for (index, row) in rows.iter().enumerate() {
            let prepared = match prepare_row(row) {
                Ok(Some(prepared)) => prepared,
                Ok(None) => {
                    debug!(index, "Skipping row with blank barcode or file name");
                    output.report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    output.report.failures.push(failure(index, row, &e));
                    continue;
                }
            };
            let (value, file_name) = prepared;

            let bytes = match rendered.get(&value).cloned() {
                Some(bytes) => bytes,
                None => match self.render_value(&value) {
                    Ok(bytes) => {
                        rendered.insert(value.clone(), bytes.clone());
                        bytes
                    }
                    Err(e) => {
                        output.report.failures.push(failure(index, row, &e));
                        continue;
                    }
                },
            };

            output.files.push(RenderedFile { file_name, bytes });
            output.report.rendered += 1;
        }

        info!(
            rows = rows.len(),
            rendered = output.report.rendered,
            skipped = output.report.skipped,
            failed = output.report.failures.len(),
            "Barcode batch finished"
        );
        output
    }
}

fn prepare_row(row: &BarcodeRow) -> Result<Option<(BarcodeValue, String)>, EngineError> {
    let barcode = row.barcode.trim();
    let name = row.jpeg_name.trim();
    if barcode.is_empty() || name.is_empty() {
        return Ok(None);
    }
    let value = BarcodeValue::new(barcode)?;
    Ok(Some((value, normalize_file_name(name))))
}

fn failure(index: usize, row: &BarcodeRow, error: &EngineError) -> RowFailure {
    warn!(index, barcode = %row.barcode, "Failed to render barcode row: {error}");
    RowFailure {
        index,
        barcode: row.barcode.clone(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::CaptionFont;
    use std::io::Cursor;

    fn renderer(options: RenderOptions) -> BatchRenderer {
        BatchRenderer::new(Arc::new(CaptionCompositor::new(CaptionFont::Bitmap)), options)
    }

    fn sample_rows() -> Vec<BarcodeRow> {
        vec![
            BarcodeRow::new("T0125123126021725551630", "25_off_55_uk"),
            BarcodeRow::new("T0125123126021724351635", "24_off_35_uk"),
            BarcodeRow::new("T0525123126021710154362", "10_off_15_roi.JPG"),
        ]
    }

    #[test]
    fn normalize_appends_extension() {
        assert_eq!(normalize_file_name("25_off_55_uk"), "25_off_55_uk.jpg");
        assert_eq!(normalize_file_name(" name "), "name.jpg");
    }

    #[test]
    fn normalize_keeps_existing_extension_any_case() {
        assert_eq!(normalize_file_name("a.jpg"), "a.jpg");
        assert_eq!(normalize_file_name("a.JPG"), "a.JPG");
        assert_eq!(normalize_file_name("a.jpeg"), "a.jpeg.jpg");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let r = renderer(RenderOptions::default());
        assert_eq!(r.render_row(&BarcodeRow::new("   ", "name")).unwrap(), None);
        assert_eq!(r.render_row(&BarcodeRow::new("ABC", "\t")).unwrap(), None);
        assert_eq!(r.render_row(&BarcodeRow::new("", "")).unwrap(), None);
    }

    #[test]
    fn row_renders_named_jpeg() {
        let r = renderer(RenderOptions::default());
        let file = r
            .render_row(&BarcodeRow::new(" ABC123 ", "label"))
            .unwrap()
            .unwrap();
        assert_eq!(file.file_name, "label.jpg");
        assert_eq!(
            image::guess_format(&file.bytes).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn unencodable_row_is_an_error() {
        let r = renderer(RenderOptions::default());
        assert!(matches!(
            r.render_row(&BarcodeRow::new("naïve", "x")),
            Err(EngineError::Encoding(_))
        ));
    }

    #[test]
    fn target_box_applies_to_every_row() {
        let options = RenderOptions {
            target: TargetBox::new(Some(600), Some(300)).unwrap(),
            ..RenderOptions::default()
        };
        let output = renderer(options).render_batch(&sample_rows());
        assert_eq!(output.files.len(), 3);
        for file in &output.files {
            let img = image::load_from_memory(&file.bytes).unwrap();
            assert_eq!((img.width(), img.height()), (600, 300));
        }
    }

    #[test]
    fn batch_skips_and_reports_without_aborting() {
        let mut rows = sample_rows();
        rows.insert(1, BarcodeRow::new("", "empty_code"));
        rows.insert(2, BarcodeRow::new("bad\u{e9}", "accent"));
        rows.push(BarcodeRow::new("ABC", "   "));

        let output = renderer(RenderOptions::default()).render_batch(&rows);
        assert_eq!(output.report.rendered, 3);
        assert_eq!(output.report.skipped, 2);
        assert_eq!(output.report.failures.len(), 1);
        assert_eq!(output.report.failures[0].index, 2);

        let names: Vec<_> = output.files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            ["25_off_55_uk.jpg", "24_off_35_uk.jpg", "10_off_15_roi.JPG"]
        );
    }

    #[test]
    fn repeated_barcodes_reuse_bytes() {
        let rows = vec![
            BarcodeRow::new("SAME", "first"),
            BarcodeRow::new(" SAME", "second"),
        ];
        let output = renderer(RenderOptions::default()).render_batch(&rows);
        assert_eq!(output.files.len(), 2);
        assert_eq!(output.files[0].bytes, output.files[1].bytes);
    }

    #[test]
    fn batch_zip_follows_row_order() {
        let output = renderer(RenderOptions::default()).render_batch(&sample_rows());
        let bytes = output.to_zip().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);
        assert_eq!(archive.by_index(0).unwrap().name(), "25_off_55_uk.jpg");
        assert_eq!(archive.by_index(2).unwrap().name(), "10_off_15_roi.JPG");
    }

    #[test]
    fn row_deserializes_from_original_column_names() {
        let row: BarcodeRow =
            serde_json::from_str(r#"{"Barcode":"T01","JPEG Name":"n"}"#).unwrap();
        assert_eq!(row, BarcodeRow::new("T01", "n"));
    }
}
