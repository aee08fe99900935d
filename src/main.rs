use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagesnap::{Credentials, OutputConfig, Pacing, SnapshotBrowser, SnapshotConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PacingArg {
    /// Short waits, follow the page while it grows, return to the top.
    Fast,
    /// Long waits for slow connections and heavy consent banners.
    Patient,
}

#[derive(Parser)]
#[command(name = "pagesnap")]
#[command(about = "Log into a news site and save its front page as a dated PDF")]
#[command(version)]
struct Cli {
    /// Login page URL
    #[arg(long, env = "LINK")]
    link: String,

    /// Account email or username
    #[arg(long, env = "EMAIL")]
    email: String,

    /// Account password
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    password: String,

    #[arg(long, value_enum, default_value = "fast")]
    pacing: PacingArg,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    #[arg(long)]
    chrome_path: Option<String>,

    /// Timeout for page operations, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Directory the PDF is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// File name prefix of the PDF
    #[arg(long, default_value = "GRNW_Economist")]
    prefix: String,

    /// Where the intermediate screenshot is stored
    #[arg(long, default_value = "economist_screenshot.png")]
    screenshot: PathBuf,

    /// Hours east of UTC used for the file name timestamp
    #[arg(long, default_value_t = 1, allow_hyphen_values = true)]
    utc_offset: i32,

    /// PDF points per screenshot pixel
    #[arg(long, default_value_t = 0.5)]
    scale: f32,

    /// Delete the screenshot once the PDF is written
    #[arg(long)]
    remove_screenshot: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> SnapshotConfig {
        let timeout = Duration::from_secs(self.timeout_secs);
        let mut config = SnapshotConfig::new(self.link, Credentials::new(self.email, self.password));
        config.pacing = match self.pacing {
            PacingArg::Fast => Pacing::fast(),
            PacingArg::Patient => Pacing::patient(),
        };
        let mut browser = SnapshotBrowser::builder()
            .headless(self.headless)
            .timeout(timeout)
            .request_timeout(timeout);
        if let Some(path) = self.chrome_path {
            browser = browser.chrome_path(path);
        }
        config.browser = browser.build_config();
        config.output = OutputConfig {
            dir: self.output_dir,
            prefix: self.prefix,
            screenshot_path: self.screenshot,
            utc_offset_hours: self.utc_offset,
            image_scale: self.scale,
            remove_screenshot: self.remove_screenshot,
        };
        config
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the variables may come from the environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.into_config();

    let report = pagesnap::run(&config).await.context("capture failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
