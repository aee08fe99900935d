use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::browser::SnapshotBrowser;
use crate::config::SnapshotConfig;
use crate::consent::{dismiss_consent, ConsentOutcome};
use crate::error::Result;
use crate::login::login;
use crate::scroll::load_lazy_content;
use crate::{naming, pdf};

/// Result of one capture run.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub pdf_path: PathBuf,
    /// Size of the written PDF in bytes.
    pub pdf_size: u64,
    /// `None` when the screenshot was removed after conversion.
    pub screenshot_path: Option<PathBuf>,
    pub consent: ConsentOutcome,
}

impl SnapshotReport {
    pub fn pdf_size_kb(&self) -> f64 {
        self.pdf_size as f64 / 1024.0
    }
}

/// Log in, capture the full page and store it as the next dated PDF.
pub async fn run(config: &SnapshotConfig) -> Result<SnapshotReport> {
    config.validate()?;

    let browser = SnapshotBrowser::launch(config.browser.clone()).await?;
    let captured = capture(&browser, config).await;
    // Close even when the capture failed so no Chrome is left behind.
    if let Err(e) = browser.close().await {
        warn!(error = %e, "browser did not shut down cleanly");
    }
    let (png, consent) = captured?;

    let output = &config.output;
    let now = naming::local_now(output.utc_offset_hours)?;
    let pdf_path = naming::next_output_path(&output.dir, &output.prefix, &now)?;
    let file_name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(file = %file_name, "converting to PDF");

    let bytes = pdf::png_to_pdf(&png, output.image_scale).inspect_err(|e| {
        error!(error = %e, "error converting screenshot to PDF");
    })?;
    let pdf_size = pdf::write_pdf(&pdf_path, &bytes).await?;

    let screenshot_path = if output.remove_screenshot {
        discard_screenshot(&output.screenshot_path).await
    } else {
        Some(output.screenshot_path.clone())
    };

    let report = SnapshotReport {
        pdf_path,
        pdf_size,
        screenshot_path,
        consent,
    };
    info!(file = %file_name, size_kb = %format!("{:.2}", report.pdf_size_kb()), "PDF saved");
    Ok(report)
}

/// Drive the browser from login to screenshot. The PNG is also written to the
/// configured screenshot path.
async fn capture(
    browser: &SnapshotBrowser,
    config: &SnapshotConfig,
) -> Result<(Vec<u8>, ConsentOutcome)> {
    let pacing = &config.pacing;
    let page = browser.new_page("about:blank").await?;

    login(
        &page,
        &config.link,
        &config.credentials,
        &config.selectors,
        pacing.input_mode,
    )
    .await?;

    info!(wait = ?pacing.post_login_wait, "waiting for homepage");
    tokio::time::sleep(pacing.post_login_wait).await;

    let consent = dismiss_consent(&page, &config.selectors, pacing).await;

    load_lazy_content(&page, pacing).await?;

    let png = page.screenshot_full_page().await?;
    tokio::fs::write(&config.output.screenshot_path, &png).await?;
    info!(path = %config.output.screenshot_path.display(), bytes = png.len(), "screenshot saved");

    Ok((png, consent))
}

/// Delete the intermediate screenshot. The PDF is already on disk, so a
/// failure is only logged and the path stays in the report.
async fn discard_screenshot(path: &Path) -> Option<PathBuf> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("temporary screenshot removed");
            None
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "could not remove screenshot");
            Some(path.to_path_buf())
        }
    }
}
