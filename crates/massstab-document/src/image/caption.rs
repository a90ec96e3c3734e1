// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caption rendering — writes "<name> - масштаб: <ratio>" into the caption
// band at the bottom of a composed page.
//
// Fonts are resolved by file name: the configured font first, then a short
// list of widely installed families, then the built-in bitmap font. Loaded
// fonts are cached per renderer so a batch reads each font file once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::imageops;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use massstab_core::config::PageConfig;
use massstab_core::types::ScaleRatio;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::bitmap_font;

/// Tried in order after the configured font.
pub const FALLBACK_FONTS: &[&str] = &["arial.ttf", "DejaVuSans.ttf", "LiberationSans-Regular.ttf"];

const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Subdirectory levels searched below each font directory
/// (e.g. /usr/share/fonts/truetype/dejavu).
const FONT_SEARCH_DEPTH: usize = 4;

/// A resolved caption font.
pub enum CaptionFont {
    Vector { name: String, font: FontVec },
    Bitmap,
}

impl CaptionFont {
    pub fn is_bitmap(&self) -> bool {
        matches!(self, Self::Bitmap)
    }
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vector { name, .. } => f.debug_tuple("Vector").field(name).finish(),
            Self::Bitmap => f.write_str("Bitmap"),
        }
    }
}

/// Caption text for `source_path` at `ratio`.
pub fn caption_text(source_path: &Path, ratio: ScaleRatio) -> String {
    let stem = source_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem} - масштаб: {}", ratio.label())
}

/// Draws captions onto composed pages, caching fonts by `(family, size)`.
#[derive(Debug, Default)]
pub struct CaptionRenderer {
    /// Searched before the platform font directories.
    font_dirs: Vec<PathBuf>,
    /// When false only the configured directories are searched.
    search_system_fonts: bool,
    cache: HashMap<(String, u32), CaptionFont>,
}

impl CaptionRenderer {
    /// Renderer searching the configured font directories and then the
    /// platform ones.
    pub fn new(config: &PageConfig) -> Self {
        Self {
            font_dirs: config.font_dirs.clone(),
            search_system_fonts: true,
            cache: HashMap::new(),
        }
    }

    /// Renderer that only looks in `font_dirs`.
    pub fn with_font_dirs(font_dirs: Vec<PathBuf>) -> Self {
        Self {
            font_dirs,
            search_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    /// Number of cached `(family, size)` entries.
    pub fn cached_fonts(&self) -> usize {
        self.cache.len()
    }

    /// Write the caption for `source_path` into the caption band of `page`.
    ///
    /// Only pixels inside the band (the bottom `caption_band_height` rows)
    /// are touched. Never fails: an unavailable font degrades to the
    /// built-in bitmap font.
    pub fn add_caption(
        &mut self,
        page: &mut RgbImage,
        source_path: &Path,
        ratio: ScaleRatio,
        config: &PageConfig,
    ) {
        let text = caption_text(source_path, ratio);
        let band_height = config.caption_band_height.min(page.height());
        if band_height == 0 || page.width() == 0 {
            warn!("no caption band on this page, caption skipped");
            return;
        }

        let band_top = page.height() - band_height;
        let mut band = imageops::crop_imm(&*page, 0, band_top, page.width(), band_height).to_image();

        // Page coordinates (width / 2, height - band / 2) expressed inside the band.
        let center_x = (page.width() / 2) as i32;
        let center_y = (band_height - band_height / 2) as i32;

        let font = self.font(&config.font_style, config.font_size);
        draw_centered(&mut band, center_x, center_y, config.font_size, &text, font);

        imageops::replace(page, &band, 0, band_top as i64);
        debug!(caption = %text, "Caption drawn");
    }

    /// Cached font lookup.
    pub fn font(&mut self, family: &str, size: u32) -> &CaptionFont {
        let font_dirs = &self.font_dirs;
        let search_system_fonts = self.search_system_fonts;
        self.cache
            .entry((family.to_string(), size))
            .or_insert_with(|| load_font(family, font_dirs, search_system_fonts))
    }
}

fn draw_centered(
    canvas: &mut RgbImage,
    center_x: i32,
    center_y: i32,
    font_size: u32,
    text: &str,
    font: &CaptionFont,
) {
    match font {
        CaptionFont::Vector { font, .. } => {
            let scale = PxScale::from(font_size as f32);
            let (width, height) = text_size(scale, font, text);
            let x = center_x - (width / 2) as i32;
            let y = center_y - (height / 2) as i32;
            draw_text_mut(canvas, TEXT_COLOR, x, y, scale, font, text);
        }
        CaptionFont::Bitmap => {
            bitmap_font::draw_text_centered(canvas, center_x, center_y, font_size, text, TEXT_COLOR);
        }
    }
}

/// Resolve `preferred` and then [`FALLBACK_FONTS`]; fall back to the bitmap
/// font when none of them loads.
fn load_font(preferred: &str, font_dirs: &[PathBuf], search_system_fonts: bool) -> CaptionFont {
    let mut search_dirs: Vec<PathBuf> = font_dirs.to_vec();
    if search_system_fonts {
        search_dirs.extend(system_font_dirs());
    }

    let candidates = std::iter::once(preferred).chain(FALLBACK_FONTS.iter().copied());
    for name in candidates {
        let Some(path) = resolve_font_path(name, &search_dirs) else {
            debug!(font = name, "font not found");
            continue;
        };
        match std::fs::read(&path).ok().and_then(|data| FontVec::try_from_vec(data).ok()) {
            Some(font) => {
                info!(font = name, path = %path.display(), "caption font loaded");
                return CaptionFont::Vector {
                    name: name.to_string(),
                    font,
                };
            }
            None => warn!(path = %path.display(), "font file could not be parsed"),
        }
    }

    warn!(preferred, "no caption font available, using built-in bitmap font");
    CaptionFont::Bitmap
}

/// `name` as a direct path, else the first file called `name`
/// (case-insensitive) under one of `search_dirs`.
pub fn resolve_font_path(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }
    let file_name = direct.file_name()?.to_str()?;
    search_dirs
        .iter()
        .find_map(|dir| find_file(dir, file_name))
}

/// First regular file called `file_name` (case-insensitive) under `dir`,
/// walking in file-name order.
fn find_file(dir: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .max_depth(FONT_SEARCH_DEPTH + 1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.eq_ignore_ascii_case(file_name))
        })
        .map(|entry| entry.into_path())
}

/// Conventional font locations for the host platform.
fn system_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    #[cfg(target_os = "windows")]
    {
        let windir = std::env::var("WINDIR").unwrap_or_else(|_| "C:\\Windows".into());
        dirs.push(PathBuf::from(windir).join("Fonts"));
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            dirs.push(PathBuf::from(local).join("Microsoft").join("Windows").join("Fonts"));
        }
    }

    #[cfg(target_os = "macos")]
    {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library").join("Fonts"));
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join(".local").join("share").join("fonts"));
            dirs.push(PathBuf::from(home).join(".fonts"));
        }
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        dirs.push(PathBuf::from("/usr/share/fonts"));
    }

    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn test_font() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fonts")
            .join("Montserrat-Regular.ttf")
    }

    /// A font directory holding the test font under each of `names`.
    fn font_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::copy(test_font(), dir.path().join(name)).unwrap();
        }
        dir
    }

    fn config() -> PageConfig {
        PageConfig {
            dpi: 72,
            margin: 20,
            caption_band_height: 40,
            font_size: 16,
            font_style: "no-such-font.ttf".into(),
            ..PageConfig::default()
        }
    }

    #[test]
    fn caption_text_uses_file_stem_and_label() {
        assert_eq!(
            caption_text(Path::new("/scans/plan.v2.png"), ScaleRatio::one_to(3)),
            "plan.v2 - масштаб: 1:3"
        );
        assert_eq!(
            caption_text(Path::new("photo.JPG"), ScaleRatio::ORIGINAL),
            "photo - масштаб: оригинал"
        );
        assert_eq!(
            caption_text(Path::new("old.tif"), ScaleRatio::TWO_AND_A_HALF),
            "old - масштаб: 1:2.5"
        );
    }

    #[test]
    fn missing_fonts_fall_back_to_bitmap() {
        let empty = tempfile::tempdir().unwrap();
        let mut renderer = CaptionRenderer::with_font_dirs(vec![empty.path().to_path_buf()]);
        assert!(renderer.font("no-such-font.ttf", 40).is_bitmap());
    }

    #[test]
    fn unparseable_font_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.ttf"), b"not a font").unwrap();
        let mut renderer = CaptionRenderer::with_font_dirs(vec![dir.path().to_path_buf()]);
        assert!(renderer.font("broken.ttf", 40).is_bitmap());
    }

    #[test]
    fn fonts_are_cached_per_family_and_size() {
        let mut renderer = CaptionRenderer::with_font_dirs(Vec::new());
        renderer.font("a.ttf", 40);
        renderer.font("a.ttf", 40);
        assert_eq!(renderer.cached_fonts(), 1);
        renderer.font("a.ttf", 20);
        renderer.font("b.ttf", 40);
        assert_eq!(renderer.cached_fonts(), 3);
    }

    #[test]
    fn font_lookup_searches_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("dejavu");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("DejaVuSans.ttf"), b"").unwrap();

        let found = resolve_font_path("dejavusans.TTF", &[dir.path().to_path_buf()]);
        assert_eq!(found, Some(nested.join("DejaVuSans.ttf")));
        assert_eq!(resolve_font_path("absent.ttf", &[dir.path().to_path_buf()]), None);
    }

    #[test]
    fn caption_only_touches_the_band() {
        let config = config();
        let geometry = config.geometry();
        let mut page = RgbImage::from_pixel(geometry.width, geometry.height, WHITE);
        let before = page.clone();

        let mut renderer = CaptionRenderer::with_font_dirs(Vec::new());
        renderer.add_caption(&mut page, Path::new("drawing.png"), ScaleRatio::one_to(4), &config);

        let band_top = geometry.height - config.caption_band_height;
        let mut band_changed = false;
        for (x, y, px) in page.enumerate_pixels() {
            if y < band_top {
                assert_eq!(px, before.get_pixel(x, y), "pixel ({x}, {y}) above the band changed");
            } else if px != before.get_pixel(x, y) {
                band_changed = true;
            }
        }
        assert!(band_changed, "caption was not drawn");
    }

    #[test]
    fn oversized_font_is_clipped_to_the_band() {
        let config = PageConfig {
            font_size: 400,
            ..config()
        };
        let geometry = config.geometry();
        let mut page = RgbImage::from_pixel(geometry.width, geometry.height, WHITE);

        let mut renderer = CaptionRenderer::with_font_dirs(Vec::new());
        renderer.add_caption(&mut page, Path::new("x.png"), ScaleRatio::ORIGINAL, &config);

        let band_top = geometry.height - config.caption_band_height;
        assert!(page.enumerate_pixels().filter(|(_, y, _)| *y < band_top).all(|(_, _, px)| *px == WHITE));
    }

    #[test]
    fn preferred_font_is_loaded_before_fallbacks() {
        let dir = font_dir(&["Montserrat-Regular.ttf", "DejaVuSans.ttf"]);
        let mut renderer = CaptionRenderer::with_font_dirs(vec![dir.path().to_path_buf()]);

        match renderer.font("montserrat-regular.ttf", 40) {
            CaptionFont::Vector { name, .. } => assert_eq!(name, "montserrat-regular.ttf"),
            CaptionFont::Bitmap => panic!("expected the configured font"),
        }
    }

    #[test]
    fn missing_preferred_font_uses_first_available_fallback() {
        let dir = font_dir(&["DejaVuSans.ttf", "LiberationSans-Regular.ttf"]);
        let mut renderer = CaptionRenderer::with_font_dirs(vec![dir.path().to_path_buf()]);

        match renderer.font("calibri.ttf", 40) {
            CaptionFont::Vector { name, .. } => assert_eq!(name, "DejaVuSans.ttf"),
            CaptionFont::Bitmap => panic!("expected a fallback font"),
        }
    }

    #[test]
    fn vector_caption_is_centred_in_the_band() {
        let dir = font_dir(&["Montserrat-Regular.ttf"]);
        let config = PageConfig {
            font_style: "Montserrat-Regular.ttf".into(),
            ..PageConfig::default()
        };
        let geometry = config.geometry();
        let mut page = RgbImage::from_pixel(geometry.width, geometry.height, WHITE);

        let mut renderer = CaptionRenderer::with_font_dirs(vec![dir.path().to_path_buf()]);
        assert!(!renderer.font(&config.font_style, config.font_size).is_bitmap());
        renderer.add_caption(&mut page, Path::new("site_plan.png"), ScaleRatio::one_to(3), &config);

        let band_top = geometry.height - config.caption_band_height;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (u32::MAX, 0, u32::MAX, 0);
        for (x, y, px) in page.enumerate_pixels() {
            if *px == WHITE {
                continue;
            }
            assert!(y >= band_top, "ink at ({x}, {y}) above the caption band");
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        assert!(max_x > min_x, "caption was not drawn");

        let ink_centre_x = (min_x + max_x) as i64 / 2;
        let ink_centre_y = (min_y + max_y) as i64 / 2;
        let expected_x = (geometry.width / 2) as i64;
        let expected_y = (geometry.height - config.caption_band_height / 2) as i64;
        assert!((ink_centre_x - expected_x).abs() <= 10, "x centre {ink_centre_x}, expected {expected_x}");
        assert!((ink_centre_y - expected_y).abs() <= 20, "y centre {ink_centre_y}, expected {expected_y}");
    }
}
