// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch processing — open, fit, compose and caption a list of images in
// input order. Each item succeeds or fails on its own; a corrupt file costs
// one page, never the whole batch.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use massstab_core::config::PageConfig;
use massstab_core::error::{MassstabError, Result};
use massstab_core::types::{PixelSize, ScaleRatio, is_supported_image};
use tracing::{debug, info, instrument, warn};

use crate::image::caption::CaptionRenderer;
use crate::image::processor::{A4PageProcessor, ImageProcessor};

/// One processed input image and its finished page.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub source_path: PathBuf,
    pub original_size: PixelSize,
    pub scaled_size: PixelSize,
    pub scale_ratio: ScaleRatio,
    /// Composed and captioned page canvas.
    pub page: RgbImage,
}

/// An input that did not make it into the batch.
#[derive(Debug, Clone)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of [`BatchProcessor::process_batch`].
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successful items, in input order.
    pub records: Vec<ImageRecord>,
    /// Failed items, in input order.
    pub skipped: Vec<SkippedImage>,
}

impl BatchResult {
    /// Number of inputs the batch was given.
    pub fn requested(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Runs every input through scale selection, composition and captioning.
///
/// Owns its caption renderer, so the font cache lives exactly as long as the
/// processor.
pub struct BatchProcessor {
    config: PageConfig,
    processor: Box<dyn ImageProcessor>,
    captions: CaptionRenderer,
}

impl BatchProcessor {
    /// Processor for `config`, using [`A4PageProcessor`] with the configured
    /// scale strategy.
    pub fn new(config: PageConfig) -> Self {
        let processor = Box::new(A4PageProcessor::from_config(&config));
        let captions = CaptionRenderer::new(&config);
        Self::with_parts(config, processor, captions)
    }

    /// Processor with an explicit image processor and caption renderer.
    pub fn with_parts(
        config: PageConfig,
        processor: Box<dyn ImageProcessor>,
        captions: CaptionRenderer,
    ) -> Self {
        Self {
            config,
            processor,
            captions,
        }
    }

    /// Process `paths` in order. Failed items are logged and listed in
    /// [`BatchResult::skipped`]; they leave no gap in the records.
    #[instrument(skip_all, fields(requested = paths.len()))]
    pub fn process_batch<P: AsRef<Path>>(&mut self, paths: &[P]) -> BatchResult {
        let mut result = BatchResult::default();

        for path in paths {
            let path = path.as_ref();
            match self.process_path(path) {
                Ok(record) => result.records.push(record),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping image");
                    result.skipped.push(SkippedImage {
                        path: path.to_path_buf(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            processed = result.records.len(),
            requested = result.requested(),
            "Batch complete"
        );
        result
    }

    /// Open and process a single file.
    pub fn process_path(&mut self, path: &Path) -> Result<ImageRecord> {
        let image = open_image(path)?;
        self.process_image(path, &image)
    }

    /// Process an already decoded image; `source_path` names the caption.
    pub fn process_image(&mut self, source_path: &Path, image: &DynamicImage) -> Result<ImageRecord> {
        let composed = self.processor.process(image, &self.config)?;
        let mut page = composed.page;
        self.captions
            .add_caption(&mut page, source_path, composed.scale_ratio, &self.config);

        debug!(
            path = %source_path.display(),
            ratio = %composed.scale_ratio,
            "Page composed"
        );
        Ok(ImageRecord {
            source_path: source_path.to_path_buf(),
            original_size: composed.original_size,
            scaled_size: composed.scaled_size,
            scale_ratio: composed.scale_ratio,
            page,
        })
    }
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    let image = image::open(path).map_err(|err| {
        MassstabError::ImageError(format!("failed to open {}: {}", path.display(), err))
    })?;
    debug!(width = image.width(), height = image.height(), "Image loaded");
    Ok(image)
}

/// Expand `inputs` into the list of images to process.
///
/// Directories contribute their supported images (not recursive) sorted by
/// path; files are kept as given, in the order given, so that an unreadable
/// file still shows up as a skipped item.
pub fn collect_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            paths.extend(scan_directory(input)?);
        } else {
            paths.push(input.to_path_buf());
        }
    }
    Ok(paths)
}

/// Supported images directly inside `dir`, sorted by path.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_supported_image(path))
        .collect();
    images.sort();
    debug!(dir = %dir.display(), found = images.len(), "Directory scanned");
    Ok(images)
}
