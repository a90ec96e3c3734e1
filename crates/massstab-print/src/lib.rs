// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Massstab Print — hands exported page batches to the host's default printer.

pub mod dispatcher;

pub use dispatcher::{HostPlatform, PrintDispatcher, PrintSubmitter, SystemPrinter, open_document};
