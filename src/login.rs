use std::time::Duration;

use tracing::{debug, info};

use crate::config::{Credentials, InputMode, Selectors};
use crate::error::{Error, Result};
use crate::page::Page;

/// Quiet period used as the "network idle" signal around the login.
const IDLE_QUIET: Duration = Duration::from_millis(500);

/// Open the login link, submit the credentials and wait for the post-login
/// page to settle.
pub async fn login(
    page: &Page,
    link: &str,
    credentials: &Credentials,
    selectors: &Selectors,
    input_mode: InputMode,
) -> Result<()> {
    info!(link, "opening login page");
    page.goto(link).await?;
    page.wait_until_idle(IDLE_QUIET).await?;

    let timeout = page.default_timeout();
    enter(page, &selectors.username, &credentials.email, input_mode, timeout).await?;
    enter(page, &selectors.password, &credentials.password, input_mode, timeout).await?;

    let submit = page
        .find_element(&selectors.submit)
        .await
        .map_err(|_| Error::LoginError(format!("submit button {} not found", selectors.submit)))?;
    submit.click().await?;
    page.wait_for_navigation().await?;
    page.wait_until_idle(IDLE_QUIET).await?;

    debug!(url = %page.url().await.unwrap_or_default(), "post-login page");
    info!("logged in");
    Ok(())
}

async fn enter(
    page: &Page,
    selector: &str,
    value: &str,
    mode: InputMode,
    timeout: Duration,
) -> Result<()> {
    let field = page
        .wait_for_selector(selector, timeout)
        .await
        .map_err(|_| Error::LoginError(format!("field {selector} never appeared")))?;
    match mode {
        InputMode::Fill => page.fill(selector, value).await,
        InputMode::Type => {
            field.click().await?;
            field.type_text(value).await
        }
    }
}
