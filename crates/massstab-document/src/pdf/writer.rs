// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF export — one page per processed image using `printpdf` 0.8.
//
// Each page is sized to its canvas at the configured resolution and the canvas
// is drawn edge to edge, so the PDF page is exactly the composed A4 page.

use std::path::{Path, PathBuf};

use massstab_core::config::PageConfig;
use massstab_core::error::{MassstabError, Result};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use crate::batch::ImageRecord;

const MM_PER_INCH: f32 = 25.4;

/// Title written into the PDF /Info dictionary.
const DOCUMENT_TITLE: &str = "Scaled images";

/// Writes processed pages to a multi-page PDF.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    /// Pixels per inch assumed when mapping a canvas onto a PDF page.
    resolution: f32,
}

impl PdfExporter {
    pub fn new(resolution: f32) -> Self {
        Self { resolution }
    }

    /// Exporter using the `pdf_resolution` of `config`.
    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(config.pdf_resolution)
    }

    /// Physical size of a canvas of `width` x `height` pixels.
    pub fn page_size_mm(&self, width: u32, height: u32) -> (Mm, Mm) {
        let to_mm = |px: u32| Mm(px as f32 / self.resolution * MM_PER_INCH);
        (to_mm(width), to_mm(height))
    }

    /// Serialise `records` into PDF bytes, one page each, in order.
    #[instrument(skip_all, fields(pages = records.len(), resolution = self.resolution))]
    pub fn render(&self, records: &[ImageRecord]) -> Result<Vec<u8>> {
        if records.is_empty() {
            return Err(MassstabError::NothingToExport);
        }

        let mut doc = PdfDocument::new(DOCUMENT_TITLE);
        let mut pages = Vec::with_capacity(records.len());

        for record in records {
            let (width, height) = record.page.dimensions();
            let raw = RawImage {
                pixels: RawImageData::U8(record.page.as_raw().clone()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(self.resolution),
                    rotate: None,
                },
            }];

            let (page_w, page_h) = self.page_size_mm(width, height);
            debug!(
                source = %record.source_path.display(),
                width_mm = page_w.0,
                height_mm = page_h.0,
                "Page added"
            );
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(count = warnings.len(), "printpdf reported warnings");
        }
        Ok(output)
    }

    /// Write `records` to `dest`. Nothing is written when there are no records.
    pub fn export(&self, records: &[ImageRecord], dest: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = dest.as_ref();
        let bytes = match self.render(records) {
            Ok(bytes) => bytes,
            Err(MassstabError::NothingToExport) => {
                warn!(dest = %dest.display(), "no images to export");
                return Err(MassstabError::NothingToExport);
            }
            Err(e) => return Err(e),
        };

        std::fs::write(dest, &bytes).map_err(|err| {
            MassstabError::PdfError(format!("failed to write {}: {}", dest.display(), err))
        })?;
        info!(dest = %dest.display(), pages = records.len(), "PDF exported");
        Ok(dest.to_path_buf())
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::from_config(&PageConfig::default())
    }
}
