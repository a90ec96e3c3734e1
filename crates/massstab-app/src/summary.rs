// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable run report.

use std::fmt::Write;
use std::path::Path;

use massstab_document::BatchResult;

fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `Processed N of M images`, then one line per page and per skipped input.
pub fn render(result: &BatchResult) -> String {
    let mut out = format!(
        "Processed {} of {} images\n",
        result.records.len(),
        result.requested()
    );

    for record in &result.records {
        let (ow, oh) = record.original_size;
        let (sw, sh) = record.scaled_size;
        let _ = writeln!(
            out,
            "• {}: {}x{} → {}x{} ({})",
            display_name(&record.source_path),
            ow,
            oh,
            sw,
            sh,
            record.scale_ratio.label()
        );
    }
    for skipped in &result.skipped {
        let _ = writeln!(out, "✗ {}: {}", skipped.path.display(), skipped.reason);
    }
    out
}
