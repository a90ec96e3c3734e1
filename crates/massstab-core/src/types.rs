// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: page geometry and human-readable scale ratios.

use serde::{Deserialize, Serialize};

/// A4 sheet in millimetres (short edge, long edge).
pub const A4_MM: (u32, u32) = (210, 297);

const MM_PER_INCH: f64 = 25.4;

/// Width/height pair in pixels.
pub type PixelSize = (u32, u32);

/// Pixel dimensions of the landscape page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: u32,
    pub height: u32,
}

impl PageGeometry {
    /// A4 in landscape orientation rasterised at `dpi`.
    ///
    /// At 300 DPI this is the classic 3508x2480 canvas.
    pub fn a4_landscape(dpi: u32) -> Self {
        let (short_mm, long_mm) = A4_MM;
        Self {
            width: mm_to_px(long_mm, dpi),
            height: mm_to_px(short_mm, dpi),
        }
    }

    /// Area left for the image once `margin` is removed on every side and
    /// `caption_band` is reserved at the bottom.
    pub fn usable_area(&self, margin: u32, caption_band: u32) -> PixelSize {
        let width = self.width.saturating_sub(margin.saturating_mul(2));
        let height = self
            .height
            .saturating_sub(margin.saturating_mul(2))
            .saturating_sub(caption_band);
        (width, height)
    }
}

fn mm_to_px(mm: u32, dpi: u32) -> u32 {
    (mm as f64 / MM_PER_INCH * dpi as f64).round() as u32
}

/// A printed scale of `numerator:denominator`, e.g. `(3, 1)` reads "1:3".
///
/// The numerator is 1 for every ratio the selector produces except the
/// historical 1:2.5 step, stored as `(5, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaleRatio {
    pub denominator: u32,
    pub numerator: u32,
}

impl ScaleRatio {
    /// 1:1, image printed at its native pixel size.
    pub const ORIGINAL: Self = Self {
        denominator: 1,
        numerator: 1,
    };

    /// Legacy 1:2.5 step.
    pub const TWO_AND_A_HALF: Self = Self {
        denominator: 5,
        numerator: 2,
    };

    /// `1:denominator`.
    pub fn one_to(denominator: u32) -> Self {
        Self {
            denominator: denominator.max(1),
            numerator: 1,
        }
    }

    pub fn is_original(&self) -> bool {
        *self == Self::ORIGINAL
    }

    /// Linear scale factor applied to the image.
    pub fn factor(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Label printed on the page: "оригинал", "1:2.5" or "1:n".
    pub fn label(&self) -> String {
        if self.is_original() {
            "оригинал".to_string()
        } else if *self == Self::TWO_AND_A_HALF {
            "1:2.5".to_string()
        } else {
            format!("1:{}", self.denominator)
        }
    }
}

impl Default for ScaleRatio {
    fn default() -> Self {
        Self::ORIGINAL
    }
}

impl std::fmt::Display for ScaleRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Image formats accepted as batch input, by lowercase extension.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Whether `path` carries one of the supported image extensions
/// (case-insensitive).
pub fn is_supported_image(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
