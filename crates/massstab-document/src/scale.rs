// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scale selection — picks the largest readable ratio (1:1, 1:2 … 1:20) at
// which an image fits a given area. Pure and deterministic.

use massstab_core::config::ScaleStrategy;
use massstab_core::error::{MassstabError, Result};
use massstab_core::types::{PixelSize, ScaleRatio};

/// Smallest denominator used once an image has to shrink.
pub const MIN_DENOMINATOR: u32 = 2;

/// Largest denominator; anything needing more is still rendered at 1:20.
pub const MAX_DENOMINATOR: u32 = 20;

/// Outcome of a scale selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleChoice {
    /// Linear factor to apply to both axes (`<= 1.0`).
    pub factor: f64,
    pub ratio: ScaleRatio,
    /// The image needed a smaller scale than 1:20 and will not fully fit.
    pub clamped: bool,
}

impl ScaleChoice {
    pub const ORIGINAL: Self = Self {
        factor: 1.0,
        ratio: ScaleRatio::ORIGINAL,
        clamped: false,
    };

    fn from_ratio(ratio: ScaleRatio, clamped: bool) -> Self {
        Self {
            factor: ratio.factor(),
            ratio,
            clamped,
        }
    }
}

/// Chooses a scale ratio according to a [`ScaleStrategy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScaleSelector {
    strategy: ScaleStrategy,
}

impl ScaleSelector {
    pub fn new(strategy: ScaleStrategy) -> Self {
        Self { strategy }
    }

    /// Select the scale for an image of `original` pixels that must fit
    /// into `max_size` (margins and caption band already removed).
    ///
    /// Images that already fit are never enlarged. A zero-sized original is
    /// rejected.
    pub fn select(&self, original: PixelSize, max_size: PixelSize) -> Result<ScaleChoice> {
        let (width, height) = original;
        if width == 0 || height == 0 {
            return Err(MassstabError::ImageError(format!(
                "cannot scale an empty image ({width}x{height})"
            )));
        }

        let required = required_scale(original, max_size);
        if required >= 1.0 {
            return Ok(ScaleChoice::ORIGINAL);
        }

        if self.strategy == ScaleStrategy::Legacy {
            let legacy = ScaleRatio::TWO_AND_A_HALF;
            if legacy.factor() <= required && required < ScaleRatio::one_to(2).factor() {
                return Ok(ScaleChoice::from_ratio(legacy, false));
            }
        }

        let (denominator, clamped) = integer_denominator(required);
        Ok(ScaleChoice::from_ratio(ScaleRatio::one_to(denominator), clamped))
    }
}

/// Select with the default integer strategy.
pub fn select_scale(original: PixelSize, max_size: PixelSize) -> Result<ScaleChoice> {
    ScaleSelector::default().select(original, max_size)
}

/// `min(max.w / orig.w, max.h / orig.h)`.
pub fn required_scale(original: PixelSize, max_size: PixelSize) -> f64 {
    let scale_x = max_size.0 as f64 / original.0 as f64;
    let scale_y = max_size.1 as f64 / original.1 as f64;
    scale_x.min(scale_y)
}

/// Smallest `d` in `[2, 20]` with `1/d <= required`, and whether the range
/// had to be clamped at 20.
fn integer_denominator(required: f64) -> (u32, bool) {
    if required <= 0.0 || !required.is_finite() {
        return (MAX_DENOMINATOR, true);
    }

    let mut candidate = (1.0 / required).ceil();
    // ceil(1/x) can overshoot by one when 1/x lands a hair above an integer.
    if candidate > MIN_DENOMINATOR as f64 && 1.0 / (candidate - 1.0) <= required {
        candidate -= 1.0;
    }

    if candidate > MAX_DENOMINATOR as f64 {
        (MAX_DENOMINATOR, true)
    } else {
        ((candidate as u32).max(MIN_DENOMINATOR), false)
    }
}
