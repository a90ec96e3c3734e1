// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page composition — shrink an image by its selected ratio and centre it on a
// white A4 landscape canvas above the caption band. Operates on in-memory
// images using the `image` crate.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use massstab_core::config::{PageConfig, ScaleStrategy};
use massstab_core::error::Result;
use massstab_core::types::{PageGeometry, PixelSize, ScaleRatio};
use tracing::{debug, instrument, warn};

use crate::scale::{ScaleChoice, ScaleSelector};

/// Page background.
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// A finished page together with the numbers that produced it.
#[derive(Debug, Clone)]
pub struct ComposedPage {
    pub original_size: PixelSize,
    pub scaled_size: PixelSize,
    pub scale_ratio: ScaleRatio,
    /// Full-size page canvas; the caption band is still blank.
    pub page: RgbImage,
}

/// Turns one decoded image into a composed page.
///
/// Implementations pair a scale selection policy with a page layout; the
/// batch processor only ever sees this trait.
pub trait ImageProcessor {
    fn process(&self, image: &DynamicImage, config: &PageConfig) -> Result<ComposedPage>;
}

/// Fits images onto A4 landscape at integer (or legacy) ratios.
#[derive(Debug, Clone, Copy, Default)]
pub struct A4PageProcessor {
    selector: ScaleSelector,
}

impl A4PageProcessor {
    pub fn new(strategy: ScaleStrategy) -> Self {
        Self {
            selector: ScaleSelector::new(strategy),
        }
    }

    /// Processor using the strategy named in `config`.
    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(config.scale_strategy)
    }
}

impl ImageProcessor for A4PageProcessor {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn process(&self, image: &DynamicImage, config: &PageConfig) -> Result<ComposedPage> {
        let original_size = (image.width(), image.height());
        let choice = self
            .selector
            .select(original_size, config.max_image_size())?;
        debug!(ratio = %choice.ratio, factor = choice.factor, "Scale selected");

        let mut scaled = resize_by(image, choice.factor);
        let scaled_size = scaled.dimensions();
        if choice.clamped {
            warn!(
                ratio = %choice.ratio,
                "image needs a smaller scale than supported, cropping to the printable area"
            );
            scaled = crop_to_fit(scaled, config.max_image_size());
        }

        let page = place_on_page(&scaled, config);
        Ok(ComposedPage {
            original_size,
            scaled_size,
            scale_ratio: choice.ratio,
            page,
        })
    }
}

/// Compose `image` scaled by `scale_factor` onto a fresh page.
///
/// `scale_factor` must come from the scale selector: a result that does not
/// fit the printable area is a defect and panics.
pub fn compose(image: &DynamicImage, scale_factor: f64, config: &PageConfig) -> RgbImage {
    let scaled = resize_by(image, scale_factor);
    place_on_page(&scaled, config)
}

/// Size of `original` after scaling, truncated per axis, at least 1 px.
/// Factors above 1.0 are treated as 1.0.
pub fn scaled_size(original: PixelSize, scale_factor: f64) -> PixelSize {
    if scale_factor >= 1.0 {
        return original;
    }
    let shrink = |side: u32| ((side as f64 * scale_factor).floor() as u32).max(1);
    (shrink(original.0), shrink(original.1))
}

/// Top-left corner of an image of `size` centred horizontally and centred
/// vertically in the area above the caption band. Always floor-divided.
pub fn placement(page: PageGeometry, size: PixelSize, caption_band: u32) -> (u32, u32) {
    let x = page.width.saturating_sub(size.0) / 2;
    let y = page
        .height
        .saturating_sub(size.1)
        .saturating_sub(caption_band)
        / 2;
    (x, y)
}

/// Lanczos3 downscale; a factor of 1.0 or more only converts to RGB.
fn resize_by(image: &DynamicImage, scale_factor: f64) -> RgbImage {
    let original = (image.width(), image.height());
    let (width, height) = scaled_size(original, scale_factor);
    if (width, height) == original {
        return image.to_rgb8();
    }
    debug!(from_w = original.0, from_h = original.1, width, height, "Resizing image");
    image
        .resize_exact(width, height, FilterType::Lanczos3)
        .to_rgb8()
}

/// Keep the centre of an image that is larger than `max_size`.
fn crop_to_fit(image: RgbImage, max_size: PixelSize) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= max_size.0 && height <= max_size.1 {
        return image;
    }
    let crop_w = width.min(max_size.0).max(1);
    let crop_h = height.min(max_size.1).max(1);
    let x = (width - crop_w) / 2;
    let y = (height - crop_h) / 2;
    imageops::crop_imm(&image, x, y, crop_w, crop_h).to_image()
}

fn place_on_page(scaled: &RgbImage, config: &PageConfig) -> RgbImage {
    let geometry = config.geometry();
    let (max_w, max_h) = config.max_image_size();
    let (width, height) = scaled.dimensions();
    assert!(
        width <= max_w && height <= max_h,
        "scaled image {width}x{height} exceeds printable area {max_w}x{max_h}"
    );

    let mut page = RgbImage::from_pixel(geometry.width, geometry.height, WHITE);
    let (x, y) = placement(geometry, (width, height), config.caption_band_height);
    imageops::replace(&mut page, scaled, x as i64, y as i64);
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn small_config() -> PageConfig {
        // 842x595 canvas.
        PageConfig {
            dpi: 72,
            margin: 20,
            caption_band_height: 40,
            ..PageConfig::default()
        }
    }

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            width,
            height,
            Rgba([10, 20, 30, 255]),
        ))
    }

    #[test]
    fn reference_scaled_size_truncates() {
        assert_eq!(scaled_size((7000, 5000), 1.0 / 3.0), (2333, 1666));
        assert_eq!(scaled_size((100, 100), 1.0), (100, 100));
        assert_eq!(scaled_size((3, 3), 1.0 / 20.0), (1, 1));
    }

    #[test]
    fn placement_floors_both_axes() {
        let page = PageGeometry::a4_landscape(300);
        assert_eq!(placement(page, (2333, 1666), 180), (587, 317));
        assert_eq!(placement(page, (100, 100), 180), (1704, 1100));
    }

    #[test]
    fn small_image_is_centred_unscaled() {
        let config = small_config();
        let composed = A4PageProcessor::default()
            .process(&solid(100, 50), &config)
            .unwrap();

        assert_eq!(composed.scale_ratio, ScaleRatio::ORIGINAL);
        assert_eq!(composed.scaled_size, (100, 50));
        assert_eq!(composed.page.dimensions(), (842, 595));

        let (x, y) = placement(config.geometry(), (100, 50), 40);
        assert_eq!(composed.page.get_pixel(x, y), &Rgb([10, 20, 30]));
        assert_eq!(composed.page.get_pixel(x + 99, y + 49), &Rgb([10, 20, 30]));
        assert_eq!(composed.page.get_pixel(x - 1, y), &WHITE);
        assert_eq!(composed.page.get_pixel(x, y + 50), &WHITE);
        assert_eq!(composed.page.get_pixel(0, 0), &WHITE);
    }

    #[test]
    fn large_image_fits_printable_area() {
        let config = small_config();
        let (max_w, max_h) = config.max_image_size();
        let composed = A4PageProcessor::default()
            .process(&solid(2400, 900), &config)
            .unwrap();

        assert_eq!(composed.scale_ratio, ScaleRatio::one_to(3));
        assert_eq!(composed.scaled_size, (800, 300));
        assert!(composed.scaled_size.0 <= max_w && composed.scaled_size.1 <= max_h);
    }

    #[test]
    fn composing_twice_is_identical() {
        let config = small_config();
        let image = solid(1500, 1200);
        let processor = A4PageProcessor::default();
        let first = processor.process(&image, &config).unwrap();
        let second = processor.process(&image, &config).unwrap();

        assert_eq!(first.scaled_size, second.scaled_size);
        assert_eq!(first.scale_ratio, second.scale_ratio);
        assert_eq!(first.page, second.page);
    }

    #[test]
    fn input_image_is_not_modified() {
        let config = small_config();
        let image = solid(1500, 1200);
        let before = image.clone();
        let _ = compose(&image, 0.25, &config);
        assert_eq!(image, before);
    }

    #[test]
    fn clamped_image_is_cropped_not_rejected() {
        let config = small_config();
        let composed = A4PageProcessor::default()
            .process(&solid(40_000, 10), &config)
            .unwrap();
        assert_eq!(composed.scale_ratio, ScaleRatio::one_to(20));
        assert_eq!(composed.scaled_size, (2000, 1));
        assert_eq!(composed.page.dimensions(), (842, 595));
    }

    #[test]
    #[should_panic(expected = "exceeds printable area")]
    fn oversized_composition_is_a_defect() {
        let _ = compose(&solid(2000, 100), 1.0, &small_config());
    }

    #[test]
    fn empty_image_is_an_error() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(A4PageProcessor::default().process(&empty, &small_config()).is_err());
    }
}
