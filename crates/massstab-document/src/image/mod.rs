// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — page composition and caption rendering.

pub mod bitmap_font;
pub mod caption;
pub mod processor;

pub use caption::CaptionRenderer;
pub use processor::{A4PageProcessor, ComposedPage, ImageProcessor};
