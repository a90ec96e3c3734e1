// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// massstab-document — Page fitting and document assembly for Massstab.
//
// Picks a scale ratio for each image, composes it onto an A4 landscape page,
// captions the page with the source name and ratio, and exports the pages as a
// multi-page PDF.

pub mod batch;
pub mod image;
pub mod pdf;
pub mod scale;

// Re-export the primary types so callers can use `massstab_document::BatchProcessor` etc.
pub use batch::{BatchProcessor, BatchResult, ImageRecord, SkippedImage, collect_inputs};
pub use self::image::caption::CaptionRenderer;
pub use self::image::processor::{A4PageProcessor, ComposedPage, ImageProcessor};
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfExporter;
pub use scale::{ScaleChoice, ScaleSelector, select_scale};
