// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dispatch — export a batch to a temporary PDF and hand it to the host's
// default printer.
//
// The handling application may read the file after the submit command has
// returned, so the temp file is kept for a platform-specific spool delay
// before it is removed.

use std::ffi::OsString;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use massstab_core::config::PageConfig;
use massstab_core::error::{MassstabError, Result};
use massstab_document::{ImageRecord, PdfExporter};
use tokio::process::Command;
use tracing::{debug, error, info, instrument, warn};

/// Host print spool delay on Windows.
pub const WINDOWS_SPOOL_DELAY: Duration = Duration::from_secs(10);

/// Host print spool delay everywhere else.
pub const DEFAULT_SPOOL_DELAY: Duration = Duration::from_secs(3);

/// Host families with a known "print this file" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    /// PowerShell `Start-Process -Verb Print`.
    Windows,
    /// CUPS `lp`.
    MacOs,
    /// CUPS or LPRng `lp` (Linux, BSD).
    Unix,
    Unsupported,
}

impl HostPlatform {
    /// Platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(unix) {
            Self::Unix
        } else {
            Self::Unsupported
        }
    }

    pub fn spool_delay(&self) -> Duration {
        match self {
            Self::Windows => WINDOWS_SPOOL_DELAY,
            _ => DEFAULT_SPOOL_DELAY,
        }
    }

    /// Program and arguments that print `document` on the default printer,
    /// or `None` when the platform has no print command.
    pub fn print_invocation(&self, document: &Path) -> Option<(&'static str, Vec<OsString>)> {
        match self {
            Self::Windows => {
                let quoted = document.display().to_string().replace('\'', "''");
                let script = format!("Start-Process -FilePath '{quoted}' -Verb Print");
                Some((
                    "powershell",
                    vec!["-NoProfile".into(), "-Command".into(), script.into()],
                ))
            }
            Self::MacOs | Self::Unix => Some(("lp", vec![document.as_os_str().to_owned()])),
            Self::Unsupported => None,
        }
    }

    /// Program and arguments that open `document` in the desktop's default
    /// viewer.
    pub fn open_invocation(&self, document: &Path) -> Option<(&'static str, Vec<OsString>)> {
        let path = document.as_os_str().to_owned();
        match self {
            Self::Windows => Some(("cmd", vec!["/C".into(), "start".into(), "".into(), path])),
            Self::MacOs => Some(("open", vec![path])),
            Self::Unix => Some(("xdg-open", vec![path])),
            Self::Unsupported => None,
        }
    }
}

/// Hands a finished PDF to a printer.
pub trait PrintSubmitter {
    /// Submit `document`. Success means the job was accepted for printing.
    fn submit(&self, document: &Path) -> impl Future<Output = Result<()>> + Send;
}

/// Submits through the host's print command.
#[derive(Debug, Clone, Copy)]
pub struct SystemPrinter {
    platform: HostPlatform,
}

impl SystemPrinter {
    pub fn new(platform: HostPlatform) -> Self {
        Self { platform }
    }
}

impl Default for SystemPrinter {
    fn default() -> Self {
        Self::new(HostPlatform::current())
    }
}

impl PrintSubmitter for SystemPrinter {
    async fn submit(&self, document: &Path) -> Result<()> {
        let (program, args) = self
            .platform
            .print_invocation(document)
            .ok_or(MassstabError::PlatformUnavailable)?;
        run_command(program, args).await
    }
}

/// Run a host command to completion; a non-zero exit is a print error.
async fn run_command(program: &str, args: Vec<OsString>) -> Result<()> {
    debug!(program, ?args, "Running host command");
    let output = Command::new(program)
        .args(&args)
        .output()
        .await
        .map_err(|e| MassstabError::Print(format!("failed to launch {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MassstabError::Print(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Open `document` in the default viewer without waiting for it to close.
pub async fn open_document(document: &Path) -> Result<()> {
    let (program, args) = HostPlatform::current()
        .open_invocation(document)
        .ok_or(MassstabError::PlatformUnavailable)?;
    run_command(program, args).await
}

/// Renders a batch to a temporary PDF and submits it.
pub struct PrintDispatcher<S = SystemPrinter> {
    exporter: PdfExporter,
    submitter: S,
    spool_delay: Duration,
}

impl PrintDispatcher<SystemPrinter> {
    /// Dispatcher for the host printer using the PDF settings in `config`.
    pub fn new(config: &PageConfig) -> Self {
        let platform = HostPlatform::current();
        Self::with_submitter(
            PdfExporter::from_config(config),
            SystemPrinter::new(platform),
            platform.spool_delay(),
        )
    }
}

impl<S: PrintSubmitter> PrintDispatcher<S> {
    pub fn with_submitter(exporter: PdfExporter, submitter: S, spool_delay: Duration) -> Self {
        Self {
            exporter,
            submitter,
            spool_delay,
        }
    }

    pub fn spool_delay(&self) -> Duration {
        self.spool_delay
    }

    /// Print `records` as one document. Every failure is logged and reported
    /// as `false`.
    pub async fn print_batch(&self, records: &[ImageRecord]) -> bool {
        match self.try_print(records).await {
            Ok(()) => {
                info!(pages = records.len(), "Sent to printer");
                true
            }
            Err(e) => {
                error!(error = %e, "printing failed");
                false
            }
        }
    }

    /// Print `records`, returning the reason on failure.
    #[instrument(skip_all, fields(pages = records.len()))]
    pub async fn try_print(&self, records: &[ImageRecord]) -> Result<()> {
        let bytes = self.exporter.render(records)?;

        let mut file = tempfile::Builder::new()
            .prefix("massstab-")
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(&bytes)?;
        file.flush()?;
        // Close our handle so the print handler can open the file.
        let path = file.into_temp_path();
        debug!(path = %path.display(), bytes = bytes.len(), "Temporary PDF written");

        let submitted = self.submitter.submit(&path).await;
        if submitted.is_ok() {
            tokio::time::sleep(self.spool_delay).await;
        }

        let temp_path = path.to_path_buf();
        if let Err(e) = path.close() {
            warn!(path = %temp_path.display(), error = %e, "failed to remove temporary PDF");
        }
        submitted
    }
}
