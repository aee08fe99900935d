use std::collections::HashSet;
use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams as NetworkEnableParams, EventLoadingFailed, EventLoadingFinished,
    EventRequestWillBeSent, RequestId,
};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, FrameId};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::element::Element;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A frame currently attached to the page.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub id: FrameId,
    pub url: String,
    pub name: String,
    pub is_main: bool,
}

/// Requests seen on the wire that have not finished yet, plus the time of the
/// last network activity. Requests already running when tracking starts are
/// not known, so their completion only counts as activity.
struct InFlight {
    pending: HashSet<RequestId>,
    last_activity: Instant,
}

impl InFlight {
    fn new(now: Instant) -> Self {
        Self {
            pending: HashSet::new(),
            last_activity: now,
        }
    }

    fn started(&mut self, id: RequestId, now: Instant) {
        self.pending.insert(id);
        self.last_activity = now;
    }

    fn finished(&mut self, id: &RequestId, now: Instant) {
        self.pending.remove(id);
        self.last_activity = now;
    }

    fn touch(&mut self, now: Instant) {
        self.last_activity = now;
    }

    fn len(&self) -> usize {
        self.pending.len()
    }

    fn is_idle(&self, now: Instant, quiet: Duration) -> bool {
        self.pending.is_empty() && now.saturating_duration_since(self.last_activity) >= quiet
    }
}

/// Wrapper around a chromiumoxide Page with the handful of operations the
/// capture run needs.
pub struct Page {
    inner: CrPage,
    default_timeout: Duration,
}

impl Page {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration) -> Self {
        Self {
            inner,
            default_timeout,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the load event.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Get the current page URL.
    pub async fn url(&self) -> Result<String> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?
            .ok_or_else(|| Error::NavigationError("No URL found".into()))
    }

    /// Get the current page title.
    pub async fn title(&self) -> Result<String> {
        let result = self
            .inner
            .evaluate("document.title")
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(result.into_value::<String>().unwrap_or_default())
    }

    /// Wait for a navigation to complete.
    pub async fn wait_for_navigation(&self) -> Result<()> {
        self.inner
            .wait_for_navigation()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Wait until the document is complete and no request has been in flight
    /// for `quiet`, like Playwright's `networkidle`. Gives up silently after
    /// the default timeout; pages with analytics beacons never go fully idle.
    pub async fn wait_until_idle(&self, quiet: Duration) -> Result<()> {
        let mut sent = self.inner.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = self.inner.event_listener::<EventLoadingFinished>().await?;
        let mut failed = self.inner.event_listener::<EventLoadingFailed>().await?;
        self.inner.execute(NetworkEnableParams::default()).await?;

        let deadline = Instant::now() + self.default_timeout;
        let mut in_flight = InFlight::new(Instant::now());

        loop {
            // Evaluation fails while a navigation tears the document down.
            let ready = match self
                .evaluate_value::<bool>("document.readyState === 'complete'")
                .await
            {
                Ok(ready) => ready,
                Err(e) => {
                    trace!(error = %e, "document not readable yet");
                    false
                }
            };

            let now = Instant::now();
            if !ready {
                in_flight.touch(now);
            } else if in_flight.is_idle(now, quiet) {
                trace!("page idle");
                return Ok(());
            }

            if now >= deadline {
                debug!(in_flight = in_flight.len(), "page never went idle, continuing");
                return Ok(());
            }

            let tick = tokio::time::sleep(POLL_INTERVAL);
            tokio::pin!(tick);
            loop {
                tokio::select! {
                    Some(event) = sent.next() => {
                        in_flight.started(event.request_id.clone(), Instant::now());
                    }
                    Some(event) = finished.next() => {
                        in_flight.finished(&event.request_id, Instant::now());
                    }
                    Some(event) = failed.next() => {
                        in_flight.finished(&event.request_id, Instant::now());
                    }
                    _ = &mut tick => break,
                }
            }
        }
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Replace the value of a form field in one step and fire the events a
    /// framework listens for.
    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let selector_js =
            serde_json::to_string(selector).map_err(|e| Error::JsError(e.to_string()))?;
        let value_js = serde_json::to_string(value).map_err(|e| Error::JsError(e.to_string()))?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) return false;
                el.focus();
                const proto = Object.getPrototypeOf(el);
                const desc = Object.getOwnPropertyDescriptor(proto, 'value');
                if (desc && desc.set) {{ desc.set.call(el, {value_js}); }} else {{ el.value = {value_js}; }}
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
        );
        let filled: bool = self.evaluate_value(&js).await?;
        if filled {
            Ok(())
        } else {
            Err(Error::ElementNotFound(selector.to_string()))
        }
    }

    /// Scroll vertically by the given number of pixels (negative scrolls up).
    pub async fn scroll_by(&self, pixels: i64) -> Result<()> {
        self.evaluate_void(&format!("window.scrollBy(0, {pixels})"))
            .await
    }

    pub async fn scroll_to_top(&self) -> Result<()> {
        self.evaluate_void("window.scrollTo(0, 0)").await
    }

    /// Current `document.body.scrollHeight` in CSS pixels.
    pub async fn scroll_height(&self) -> Result<u64> {
        let height: f64 = self
            .evaluate_value("document.body ? document.body.scrollHeight : 0")
            .await?;
        Ok(height.max(0.0) as u64)
    }

    /// Wait for an element matching the given CSS selector to appear in the DOM.
    /// Polls every 100ms up to `timeout`.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<Element> {
        let start = Instant::now();

        loop {
            match self.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(_) if start.elapsed() < timeout => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "Timed out waiting for selector: {}",
                        selector
                    )));
                }
            }
        }
    }

    // ── Frames ──────────────────────────────────────────────────────

    /// List every frame attached to the page, main frame included.
    pub async fn frames(&self) -> Result<Vec<FrameInfo>> {
        let main = self.inner.mainframe().await?;
        let ids = self.inner.frames().await?;

        let mut frames = Vec::with_capacity(ids.len());
        for id in ids {
            let url = self.inner.frame_url(id.clone()).await?.unwrap_or_default();
            let name = self.inner.frame_name(id.clone()).await?.unwrap_or_default();
            let is_main = main.as_ref() == Some(&id);
            frames.push(FrameInfo {
                id,
                url,
                name,
                is_main,
            });
        }
        Ok(frames)
    }

    /// Click the first element matching `selector` inside `frame`, polling
    /// until it shows up or `timeout` passes.
    pub async fn click_in_frame(
        &self,
        frame: &FrameInfo,
        selector: &str,
        timeout: Duration,
    ) -> Result<()> {
        let selector_js =
            serde_json::to_string(selector).map_err(|e| Error::JsError(e.to_string()))?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) return false;
                el.click();
                return true;
            }})()
            "#,
        );

        let start = Instant::now();
        loop {
            // The context can be missing while the frame is still loading.
            if let Some(context_id) = self.inner.frame_execution_context(frame.id.clone()).await? {
                let params = EvaluateParams::builder()
                    .expression(js.as_str())
                    .context_id(context_id)
                    .return_by_value(true)
                    .build()
                    .map_err(Error::JsError)?;
                let clicked = self
                    .inner
                    .evaluate_expression(params)
                    .await
                    .map_err(|e| Error::JsError(e.to_string()))?
                    .into_value::<bool>()
                    .unwrap_or(false);
                if clicked {
                    return Ok(());
                }
            }

            if start.elapsed() >= timeout {
                return Err(Error::Timeout(format!(
                    "Timed out waiting for selector {} in frame {}",
                    selector, frame.url
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    // ── Observations ────────────────────────────────────────────────

    /// Take a full-page screenshot (PNG format).
    pub async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.inner
            .screenshot(params)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))
    }

    /// Evaluate a JavaScript expression and deserialize its value.
    pub async fn evaluate_value<T: DeserializeOwned>(&self, expression: &str) -> Result<T> {
        self.inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?
            .into_value()
            .map_err(|e| Error::JsError(e.to_string()))
    }

    /// Evaluate a JavaScript expression without caring about the return value.
    pub async fn evaluate_void(&self, expression: &str) -> Result<()> {
        self.inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find an element matching the given CSS selector.
    pub async fn find_element(&self, selector: &str) -> Result<Element> {
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(e.to_string()))?;
        Ok(Element::new(el))
    }
}
