use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::debug;

use crate::config::{BrowserBuilder, BrowserConfig};
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags that cut startup noise without changing what the page renders.
const QUIET_ARGS: &[&str] = &[
    "disable-extensions",
    "metrics-recording-only",
    "mute-audio",
    "no-first-run",
    "no-default-browser-check",
    "disable-client-side-phishing-detection",
    "disable-prompt-on-repost",
];

/// A running Chrome instance driven over CDP.
pub struct SnapshotBrowser {
    browser: CrBrowser,
    default_timeout: std::time::Duration,
    handler_task: tokio::task::JoinHandle<()>,
}

impl SnapshotBrowser {
    /// Create a new BrowserBuilder for configuring and launching a browser.
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    /// Launch a browser instance with the given configuration.
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        // chromiumoxide adds the `--` prefix itself
        for arg in QUIET_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = match config.viewport {
            Some((width, height)) => builder.window_size(width, height).viewport(Viewport {
                width,
                height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            }),
            // No emulated viewport: the page gets the real window size.
            None => builder.arg("start-maximized").viewport(None::<Viewport>),
        };

        builder = builder.request_timeout(config.request_timeout);

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        debug!(headless = config.headless, "browser launched");

        Ok(Self {
            browser,
            default_timeout: config.default_timeout,
            handler_task,
        })
    }

    /// Open a new page (tab) navigated to the given URL.
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        let cr_page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;

        Ok(Page::new(cr_page, self.default_timeout))
    }

    /// Close Chrome and wait for the process to exit.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        let _ = self.handler_task.await;
        debug!("browser closed");
        Ok(())
    }
}
