// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.
//
// A single flat JSON file carries both the page layout settings and the log
// settings. Missing keys take their defaults; values that cannot produce a
// valid page are replaced by their defaults when the config is validated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::types::{PageGeometry, PixelSize};

/// File name used when no explicit config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Highest accepted composition resolution. An A4 canvas at 1200 dpi is
/// already about 105 megapixels.
pub const MAX_DPI: u32 = 1200;

/// How the scale selector picks a ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleStrategy {
    /// 1:1, 1:2, 1:3 … 1:20.
    #[default]
    Integer,
    /// The integer ladder with the historical 1:2.5 step between 1:2 and 1:3.
    Legacy,
}

/// Page layout settings consumed by the composer and the caption renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Composition resolution; the canvas is A4 landscape at this DPI.
    pub dpi: u32,
    /// Blank border on every side of the page, in pixels.
    pub margin: u32,
    /// Caption glyph height in pixels.
    pub font_size: u32,
    /// Preferred caption font file name, e.g. `calibri.ttf`.
    pub font_style: String,
    /// Height of the caption band reserved at the bottom of the page.
    #[serde(rename = "text_margin")]
    pub caption_band_height: u32,
    pub scale_strategy: ScaleStrategy,
    /// Resolution tag written into exported PDFs. 100 reproduces the
    /// historical output; set it to `dpi` for a physically exact A4 page.
    pub pdf_resolution: f32,
    /// Extra directories searched for caption fonts before the system ones.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            margin: 100,
            font_size: 40,
            font_style: "calibri.ttf".into(),
            caption_band_height: 180,
            scale_strategy: ScaleStrategy::Integer,
            pdf_resolution: 100.0,
            font_dirs: Vec::new(),
        }
    }
}

impl PageConfig {
    /// Landscape canvas for the configured DPI.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry::a4_landscape(self.dpi)
    }

    /// Largest image that fits inside margins and above the caption band.
    pub fn max_image_size(&self) -> PixelSize {
        self.geometry()
            .usable_area(self.margin, self.caption_band_height)
    }

    /// Replace every value that cannot produce a valid page with its default.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.dpi == 0 || self.dpi > MAX_DPI {
            warn!(dpi = self.dpi, max = MAX_DPI, "invalid dpi, using default");
            self.dpi = defaults.dpi;
        }
        if self.font_size == 0 {
            warn!("font_size must be positive, using default");
            self.font_size = defaults.font_size;
        }
        if !(self.pdf_resolution.is_finite() && self.pdf_resolution > 0.0) {
            warn!(
                pdf_resolution = self.pdf_resolution,
                "invalid pdf_resolution, using default"
            );
            self.pdf_resolution = defaults.pdf_resolution;
        }
        if self.font_style.trim().is_empty() {
            self.font_style = defaults.font_style.clone();
        }

        let page = self.geometry();
        if self.margin.saturating_mul(2) >= page.width.min(page.height) {
            warn!(margin = self.margin, "margin leaves no room on the page, using default");
            self.margin = defaults.margin;
        }
        if !self.caption_band_fits() {
            warn!(
                text_margin = self.caption_band_height,
                "caption band does not fit between the margins, using default"
            );
            self.caption_band_height = defaults.caption_band_height;
        }
        if !self.caption_band_fits() {
            warn!("default caption band does not fit either, resetting margin");
            self.margin = defaults.margin;
        }

        self
    }

    /// `caption_band_height < page_height - 2 * margin`.
    pub fn caption_band_fits(&self) -> bool {
        let usable_height = self
            .geometry()
            .height
            .saturating_sub(self.margin.saturating_mul(2));
        self.caption_band_height < usable_height
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Log file path. An empty string disables the file log.
    pub filename: String,
    /// Also log to stderr.
    pub console: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            filename: "processing.log".into(),
            console: false,
        }
    }
}

/// Everything read from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub page: PageConfig,
    #[serde(flatten)]
    pub logger: LoggerConfig,
}

impl AppConfig {
    /// Load the configuration at `path`.
    ///
    /// A missing file is created with defaults. A file that cannot be read or
    /// parsed is reported and the defaults are used instead; loading never
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            let config = Self::default();
            match config.write(path) {
                Ok(()) => info!(path = %path.display(), "created default configuration"),
                Err(e) => error!(path = %path.display(), error = %e, "failed to create default configuration"),
            }
            return config;
        }

        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load configuration, using defaults");
                Self::default()
            }
        }
    }

    /// Strictly read and validate the configuration at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let mut config: Self = serde_json::from_str(&data)?;
        config.page = config.page.validated();
        Ok(config)
    }

    /// Write this configuration as pretty-printed JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let page = PageConfig::default();
        assert_eq!(page.dpi, 300);
        assert_eq!(page.margin, 100);
        assert_eq!(page.font_size, 40);
        assert_eq!(page.caption_band_height, 180);
        assert_eq!(page.pdf_resolution, 100.0);
        assert!(page.caption_band_fits());
        assert_eq!(page.max_image_size(), (3308, 2100));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let json = r#"{ "margin": 50, "text_margin": 200, "console": true }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.page.margin, 50);
        assert_eq!(config.page.caption_band_height, 200);
        assert_eq!(config.page.dpi, 300);
        assert_eq!(config.page.font_style, "calibri.ttf");
        assert!(config.logger.console);
        assert_eq!(config.logger.filename, "processing.log");
    }

    #[test]
    fn scale_strategy_is_lowercase_in_json() {
        let config: AppConfig = serde_json::from_str(r#"{ "scale_strategy": "legacy" }"#).unwrap();
        assert_eq!(config.page.scale_strategy, ScaleStrategy::Legacy);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let page = PageConfig {
            dpi: 0,
            font_size: 0,
            pdf_resolution: -1.0,
            caption_band_height: 5000,
            ..PageConfig::default()
        }
        .validated();
        assert_eq!(page, PageConfig::default());
    }

    #[test]
    fn dpi_above_the_limit_is_reset() {
        for dpi in [MAX_DPI + 1, 20_000, u32::MAX] {
            let page = PageConfig {
                dpi,
                ..PageConfig::default()
            }
            .validated();
            assert_eq!(page.dpi, 300, "dpi {dpi}");
            assert_eq!(page.geometry(), PageGeometry::a4_landscape(300));
        }

        let page = PageConfig {
            dpi: MAX_DPI,
            margin: 100,
            ..PageConfig::default()
        }
        .validated();
        assert_eq!(page.dpi, MAX_DPI);
    }

    #[test]
    fn oversized_dpi_in_file_is_reset_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.json");
        std::fs::write(&path, r#"{ "dpi": 4294967295 }"#).unwrap();
        assert_eq!(AppConfig::read(&path).unwrap().page.dpi, 300);
    }

    #[test]
    fn oversized_margin_is_reset() {
        let page = PageConfig {
            margin: 2000,
            ..PageConfig::default()
        }
        .validated();
        assert_eq!(page.margin, 100);
        assert!(page.caption_band_fits());
    }

    #[test]
    fn load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = AppConfig::load(&path);
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["text_margin"], 180);
        assert_eq!(written["filename"], "processing.log");
    }

    #[test]
    fn load_falls_back_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(AppConfig::load(&path), AppConfig::default());
        assert!(AppConfig::read(&path).is_err());
    }

    #[test]
    fn write_then_read_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        let mut config = AppConfig::default();
        config.page.dpi = 150;
        config.page.margin = 40;
        config.page.caption_band_height = 90;
        config.logger.filename = String::new();

        config.write(&path).unwrap();
        assert_eq!(AppConfig::read(&path).unwrap(), config);
    }
}
