//! Browser tests against local HTML fixtures. They need a Chrome install, so
//! run them with `cargo test -- --ignored`.

use std::path::Path;
use std::time::Duration;

use pagesnap::consent::dismiss_consent;
use pagesnap::{
    ConsentOutcome, Credentials, InputMode, Pacing, ScrollMode, Selectors, SnapshotBrowser,
    SnapshotConfig,
};

const LOGIN_HTML: &str = r#"<!doctype html>
<html><body>
<form action="home.html" method="get">
  <input name="username">
  <input name="password" type="password">
  <button type="submit">Log in</button>
</form>
</body></html>"#;

const HOME_HTML: &str = r#"<!doctype html>
<html><head><title>Front page</title></head><body>
<h1>Today</h1>
<iframe name="sp_message_iframe_42"
  srcdoc="<button title='Accept all' onclick='this.textContent=&quot;done&quot;'>Accept all</button>">
</iframe>
<div style="height: 3000px"></div>
</body></html>"#;

const BUTTONLESS_BANNER_HTML: &str = r#"<!doctype html>
<html><body>
<iframe name="sp_message_iframe_7" srcdoc="<p>We value your privacy</p>"></iframe>
</body></html>"#;

const PLAIN_HTML: &str = r#"<!doctype html><html><body><h1>No banner</h1></body></html>"#;

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn quick_pacing(input_mode: InputMode) -> Pacing {
    Pacing {
        input_mode,
        post_login_wait: Duration::from_millis(200),
        consent_timeout: Duration::from_secs(3),
        post_consent_wait: Duration::from_millis(100),
        scroll_step: 500,
        scroll_delay: Duration::from_millis(10),
        scroll_mode: ScrollMode::FollowGrowth,
        scroll_back_to_top: true,
        settle_wait: Duration::from_millis(100),
    }
}

async fn headless() -> SnapshotBrowser {
    SnapshotBrowser::builder()
        .headless(true)
        .viewport(1280, 800)
        .timeout(Duration::from_secs(10))
        .build()
        .await
        .expect("Failed to launch browser")
}

#[tokio::test]
#[ignore = "requires a local Chrome"]
async fn test_full_run_writes_dated_pdf() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("login.html"), LOGIN_HTML).unwrap();
    std::fs::write(site.path().join("home.html"), HOME_HTML).unwrap();
    let out = tempfile::tempdir().unwrap();

    let mut config = SnapshotConfig::new(
        file_url(&site.path().join("login.html")),
        Credentials::new("reader@example.com", "hunter2"),
    );
    config.pacing = quick_pacing(InputMode::Fill);
    config.browser = SnapshotBrowser::builder()
        .headless(true)
        .viewport(1280, 800)
        .timeout(Duration::from_secs(10))
        .build_config();
    config.output.dir = out.path().to_path_buf();
    config.output.prefix = "Test".into();
    config.output.screenshot_path = out.path().join("shot.png");

    let report = pagesnap::run(&config).await.expect("capture failed");

    assert_eq!(report.consent, ConsentOutcome::Accepted);
    assert!(report.pdf_size > 0);
    let name = report.pdf_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("Test_"), "name was {name}");
    assert!(name.ends_with("_01.pdf"), "name was {name}");

    let shot = std::fs::read(out.path().join("shot.png")).unwrap();
    assert_eq!(&shot[0..4], &[0x89, 0x50, 0x4E, 0x47]);

    let second = pagesnap::run(&config).await.expect("second capture failed");
    let name = second.pdf_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("_02.pdf"), "name was {name}");
    assert_eq!(second.screenshot_path, Some(out.path().join("shot.png")));

    config.output.remove_screenshot = true;
    let third = pagesnap::run(&config).await.expect("third capture failed");
    let name = third.pdf_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("_03.pdf"), "name was {name}");
    assert!(third.screenshot_path.is_none());
    assert!(!out.path().join("shot.png").exists());
    assert!(third.pdf_path.exists());
}

#[tokio::test]
#[ignore = "requires a local Chrome"]
async fn test_typed_login_reaches_home() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("login.html"), LOGIN_HTML).unwrap();
    std::fs::write(site.path().join("home.html"), HOME_HTML).unwrap();

    let browser = headless().await;
    let page = browser.new_page("about:blank").await.unwrap();

    pagesnap::login::login(
        &page,
        &file_url(&site.path().join("login.html")),
        &Credentials::new("reader@example.com", "hunter2"),
        &Selectors::default(),
        InputMode::Type,
    )
    .await
    .expect("login failed");

    let url = page.url().await.unwrap();
    assert!(url.contains("home.html"), "url was {url}");
    assert!(url.contains("username=reader%40example.com"), "url was {url}");
    assert_eq!(page.title().await.unwrap(), "Front page");
    let heading = page
        .wait_for_selector("h1", Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(heading.inner_text().await.unwrap(), "Today");

    drop(page);
    browser.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a local Chrome"]
async fn test_missing_consent_frame_is_not_an_error() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("plain.html"), PLAIN_HTML).unwrap();

    let browser = headless().await;
    let page = browser
        .new_page(&file_url(&site.path().join("plain.html")))
        .await
        .unwrap();

    let outcome = dismiss_consent(&page, &Selectors::default(), &quick_pacing(InputMode::Fill)).await;
    assert_eq!(outcome, ConsentOutcome::FrameNotFound);

    let frames = page.frames().await.unwrap();
    assert_eq!(frames.iter().filter(|f| f.is_main).count(), 1);

    drop(page);
    browser.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a local Chrome"]
async fn test_consent_frame_without_button_is_reported_as_failed() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("banner.html"), BUTTONLESS_BANNER_HTML).unwrap();

    let browser = headless().await;
    let page = browser
        .new_page(&file_url(&site.path().join("banner.html")))
        .await
        .unwrap();

    let mut pacing = quick_pacing(InputMode::Fill);
    pacing.consent_timeout = Duration::from_millis(300);
    let outcome = dismiss_consent(&page, &Selectors::default(), &pacing).await;
    assert!(matches!(outcome, ConsentOutcome::Failed(_)), "outcome was {outcome:?}");

    drop(page);
    browser.close().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a local Chrome"]
async fn test_fill_and_wait_for_selector() {
    let site = tempfile::tempdir().unwrap();
    std::fs::write(site.path().join("login.html"), LOGIN_HTML).unwrap();

    let browser = headless().await;
    let page = browser
        .new_page(&file_url(&site.path().join("login.html")))
        .await
        .unwrap();

    page.wait_for_selector("input[name='username']", Duration::from_secs(2))
        .await
        .expect("username field");
    page.fill("input[name='username']", "a \"quoted\" name")
        .await
        .unwrap();
    let value: String = page
        .evaluate_value("document.querySelector(\"input[name='username']\").value")
        .await
        .unwrap();
    assert_eq!(value, "a \"quoted\" name");

    let missing = page
        .wait_for_selector("#nope", Duration::from_millis(300))
        .await;
    assert!(matches!(missing, Err(pagesnap::Error::Timeout(_))));

    drop(page);
    browser.close().await.unwrap();
}
