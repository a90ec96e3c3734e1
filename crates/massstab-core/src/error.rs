// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Massstab.

use thiserror::Error;

/// Top-level error type for all Massstab operations.
#[derive(Debug, Error)]
pub enum MassstabError {
    // -- Image / composition errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("nothing to export: the batch contains no processed images")]
    NothingToExport,

    // -- Print errors --
    #[error("print submission failed: {0}")]
    Print(String),

    #[error("printing is not supported on this platform")]
    PlatformUnavailable,

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MassstabError>;
