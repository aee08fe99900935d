use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::{Pacing, Selectors};
use crate::page::{FrameInfo, Page};

/// What happened to the cookie-consent overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ConsentOutcome {
    Accepted,
    FrameNotFound,
    Failed(String),
}

/// Whether a frame with this URL and name hosts the consent dialog.
pub fn matches_consent_frame(url: &str, name: &str, selectors: &Selectors) -> bool {
    url.contains(&selectors.consent_frame_url) || name.contains(&selectors.consent_frame_name)
}

/// The consent dialog always lives in a child frame.
pub fn is_consent_frame(frame: &FrameInfo, selectors: &Selectors) -> bool {
    !frame.is_main && matches_consent_frame(&frame.url, &frame.name, selectors)
}

/// Best-effort dismissal of the consent overlay. Never fails: a missing frame
/// or button is reported in the outcome and the capture carries on.
pub async fn dismiss_consent(page: &Page, selectors: &Selectors, pacing: &Pacing) -> ConsentOutcome {
    info!("looking for consent frame");
    let frames = match page.frames().await {
        Ok(frames) => frames,
        Err(e) => {
            error!(error = %e, "could not list frames");
            return ConsentOutcome::Failed(e.to_string());
        }
    };

    let Some(frame) = frames.iter().find(|f| is_consent_frame(f, selectors)) else {
        warn!(frames = frames.len(), "consent frame not found");
        return ConsentOutcome::FrameNotFound;
    };

    match page
        .click_in_frame(frame, &selectors.consent_button, pacing.consent_timeout)
        .await
    {
        Ok(()) => {
            info!(frame = %frame.url, "consent accepted");
            info!(wait = ?pacing.post_consent_wait, "waiting for page after consent");
            tokio::time::sleep(pacing.post_consent_wait).await;
            ConsentOutcome::Accepted
        }
        Err(e) => {
            error!(error = %e, "error handling consent");
            ConsentOutcome::Failed(e.to_string())
        }
    }
}
