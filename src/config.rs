use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::browser::SnapshotBrowser;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Fixed viewport size. `None` launches a maximized window and lets the
    /// page use whatever the window provides.
    pub viewport: Option<(u32, u32)>,
    pub chrome_path: Option<String>,
    /// Default timeout for operations like `wait_for_selector` (default: 30s).
    pub default_timeout: Duration,
    /// Upper bound for a single CDP request (default: 30s).
    pub request_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: None,
            chrome_path: None,
            default_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport = Some((width, height));
        self
    }

    /// Drop any fixed viewport and start the window maximized.
    pub fn maximized(mut self) -> Self {
        self.config.viewport = None;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Set the default timeout for operations like `wait_for_selector`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build_config(self) -> BrowserConfig {
        self.config
    }

    pub async fn build(self) -> Result<SnapshotBrowser> {
        SnapshotBrowser::launch(self.build_config()).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Account used to log into the site.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// CSS selectors and frame needles describing the target site.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub username: String,
    pub password: String,
    pub submit: String,
    pub consent_button: String,
    /// A frame whose URL contains this is treated as the consent frame.
    pub consent_frame_url: String,
    /// A frame whose name contains this is treated as the consent frame.
    pub consent_frame_name: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            username: r#"input[name="username"]"#.into(),
            password: r#"input[name="password"]"#.into(),
            submit: r#"button[type="submit"]"#.into(),
            consent_button: r#"button[title*="Accept all"], button[aria-label*="Accept all"]"#
                .into(),
            consent_frame_url: "privacy".into(),
            consent_frame_name: "sp_message".into(),
        }
    }
}

/// How credentials are entered into the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Set the field value directly and fire `input`/`change`.
    Fill,
    /// Wait for the field, focus it and send keystrokes.
    Type,
}

/// How far the lazy-load scroll goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// Re-read the document height after every step, following content that
    /// appears while scrolling.
    FollowGrowth,
    /// Measure the document height once before scrolling.
    FixedHeight,
}

/// Timing profile of the capture run.
///
/// Every wait here is a fixed sleep standing in for real synchronization with
/// the site, so slower connections want the `patient` profile.
#[derive(Debug, Clone)]
pub struct Pacing {
    pub input_mode: InputMode,
    pub post_login_wait: Duration,
    pub consent_timeout: Duration,
    pub post_consent_wait: Duration,
    pub scroll_step: u32,
    pub scroll_delay: Duration,
    pub scroll_mode: ScrollMode,
    pub scroll_back_to_top: bool,
    pub settle_wait: Duration,
}

impl Pacing {
    pub fn fast() -> Self {
        Self {
            input_mode: InputMode::Fill,
            post_login_wait: Duration::from_secs(2),
            consent_timeout: Duration::from_secs(2),
            post_consent_wait: Duration::from_secs(2),
            scroll_step: 500,
            scroll_delay: Duration::from_millis(200),
            scroll_mode: ScrollMode::FollowGrowth,
            scroll_back_to_top: true,
            settle_wait: Duration::from_secs(5),
        }
    }

    pub fn patient() -> Self {
        Self {
            input_mode: InputMode::Type,
            post_login_wait: Duration::from_secs(8),
            consent_timeout: Duration::from_secs(5),
            post_consent_wait: Duration::from_secs(20),
            scroll_step: 500,
            scroll_delay: Duration::from_millis(2000),
            scroll_mode: ScrollMode::FixedHeight,
            scroll_back_to_top: false,
            settle_wait: Duration::from_secs(5),
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::fast()
    }
}

/// Where and how the final PDF is written.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub prefix: String,
    pub screenshot_path: PathBuf,
    pub utc_offset_hours: i32,
    /// Points per screenshot pixel.
    pub image_scale: f32,
    pub remove_screenshot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            prefix: "GRNW_Economist".into(),
            screenshot_path: PathBuf::from("economist_screenshot.png"),
            utc_offset_hours: 1,
            image_scale: 0.5,
            remove_screenshot: false,
        }
    }
}

/// Everything a capture run needs.
pub struct SnapshotConfig {
    pub link: String,
    pub credentials: Credentials,
    pub selectors: Selectors,
    pub pacing: Pacing,
    pub output: OutputConfig,
    pub browser: BrowserConfig,
}

impl SnapshotConfig {
    pub fn new(link: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            link: link.into(),
            credentials,
            selectors: Selectors::default(),
            pacing: Pacing::default(),
            output: OutputConfig::default(),
            browser: BrowserConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.link.trim().is_empty() {
            return Err(Error::ConfigError("login link is empty".into()));
        }
        if self.credentials.email.is_empty() {
            return Err(Error::ConfigError("email is empty".into()));
        }
        if self.credentials.password.is_empty() {
            return Err(Error::ConfigError("password is empty".into()));
        }
        if !self.output.image_scale.is_finite() || self.output.image_scale <= 0.0 {
            return Err(Error::ConfigError(format!(
                "image scale must be positive, got {}",
                self.output.image_scale
            )));
        }
        if self.output.utc_offset_hours.abs() > 23 {
            return Err(Error::ConfigError(format!(
                "UTC offset out of range: {}h",
                self.output.utc_offset_hours
            )));
        }
        if self.pacing.scroll_step == 0 {
            return Err(Error::ConfigError("scroll step must be non-zero".into()));
        }
        if self.browser.default_timeout.is_zero() || self.browser.request_timeout.is_zero() {
            return Err(Error::ConfigError("browser timeouts must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SnapshotConfig {
        SnapshotConfig::new(
            "https://example.com/login",
            Credentials::new("reader@example.com", "hunter2"),
        )
    }

    #[test]
    fn default_browser_is_headed_and_maximized() {
        let cfg = BrowserBuilder::new().build_config();
        assert!(!cfg.headless);
        assert!(cfg.viewport.is_none());

        let cfg = BrowserBuilder::new().viewport(1280, 720).maximized().build_config();
        assert!(cfg.viewport.is_none());
    }

    #[test]
    fn pacing_profiles_differ_only_in_timing_and_scroll() {
        let fast = Pacing::fast();
        let patient = Pacing::patient();
        assert_eq!(fast.scroll_step, patient.scroll_step);
        assert_eq!(fast.settle_wait, patient.settle_wait);
        assert_eq!(fast.scroll_delay, Duration::from_millis(200));
        assert_eq!(patient.scroll_delay, Duration::from_secs(2));
        assert_eq!(patient.post_consent_wait, Duration::from_secs(20));
        assert_eq!(patient.scroll_mode, ScrollMode::FixedHeight);
        assert!(fast.scroll_back_to_top && !patient.scroll_back_to_top);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let dbg = format!("{:?}", Credentials::new("a@b.c", "secret-pw"));
        assert!(dbg.contains("a@b.c"));
        assert!(!dbg.contains("secret-pw"));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = config();
        cfg.link = "  ".into();
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));

        let mut cfg = config();
        cfg.credentials.password.clear();
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));

        let mut cfg = config();
        cfg.output.image_scale = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.output.image_scale = f32::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.output.utc_offset_hours = 24;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.pacing.scroll_step = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.browser.default_timeout = Duration::ZERO;
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));

        let mut cfg = config();
        cfg.browser = BrowserBuilder::new().request_timeout(Duration::ZERO).build_config();
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
    }
}
