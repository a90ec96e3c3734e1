// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect exported documents using the `lopdf` crate.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use massstab_core::error::{MassstabError, Result};
use tracing::{debug, instrument};

const MM_PER_POINT: f32 = 25.4 / 72.0;

/// Page geometry of an exported PDF, as reported by `inspect`.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Self::parse(Document::load(path), &path.display().to_string())?;
        debug!(pages = reader.page_count(), "PDF parsed");
        Ok(reader)
    }

    /// Parse a PDF held in memory, e.g. the output of `PdfExporter::render`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(Document::load_mem(bytes), "in-memory PDF")
    }

    fn parse(loaded: lopdf::Result<Document>, origin: &str) -> Result<Self> {
        loaded
            .map(|document| Self { document })
            .map_err(|err| MassstabError::PdfError(format!("cannot parse {origin}: {err}")))
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Width and height of every page in millimetres, in page order.
    pub fn page_sizes_mm(&self) -> Result<Vec<(f32, f32)>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| {
                self.media_box(page_id).map_err(|err| {
                    MassstabError::PdfError(format!("page {}: {}", number, err))
                })
            })
            .collect()
    }

    fn media_box(&self, page_id: ObjectId) -> std::result::Result<(f32, f32), String> {
        let lookup = |err: lopdf::Error| err.to_string();
        let page = self.document.get_dictionary(page_id).map_err(lookup)?;
        let entry = page.get(b"MediaBox").map_err(lookup)?;
        let (_, media_box) = self.document.dereference(entry).map_err(lookup)?;
        let corners = media_box
            .as_array()
            .map_err(lookup)?
            .iter()
            .map(Object::as_float)
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(lookup)?;

        match corners.as_slice() {
            [x0, y0, x1, y1] => Ok((
                (x1 - x0).abs() * MM_PER_POINT,
                (y1 - y0).abs() * MM_PER_POINT,
            )),
            _ => Err(format!("malformed MediaBox with {} entries", corners.len())),
        }
    }
}
