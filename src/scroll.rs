use tracing::{debug, info};

use crate::config::{Pacing, ScrollMode};
use crate::error::Result;
use crate::page::Page;

/// The two page operations the lazy-load pass needs.
pub(crate) trait Scroller {
    async fn scroll_height(&self) -> Result<u64>;
    async fn scroll_by(&self, pixels: i64) -> Result<()>;
}

impl Scroller for Page {
    async fn scroll_height(&self) -> Result<u64> {
        Page::scroll_height(self).await
    }

    async fn scroll_by(&self, pixels: i64) -> Result<()> {
        Page::scroll_by(self, pixels).await
    }
}

/// Walk the page from top to bottom so lazy images get requested, optionally
/// return to the top, then give the late requests time to land.
pub async fn load_lazy_content(page: &Page, pacing: &Pacing) -> Result<()> {
    info!(step = pacing.scroll_step, delay = ?pacing.scroll_delay, "scrolling to load lazy content");
    let steps = scroll_through(page, pacing).await?;
    debug!(steps, "reached the bottom");

    if pacing.scroll_back_to_top {
        page.scroll_to_top().await?;
    }

    info!(wait = ?pacing.settle_wait, "letting the page settle");
    tokio::time::sleep(pacing.settle_wait).await;
    Ok(())
}

/// Scroll in `scroll_step` increments until the covered distance reaches the
/// document height. Returns the number of steps taken.
pub(crate) async fn scroll_through<S: Scroller>(page: &S, pacing: &Pacing) -> Result<u32> {
    let step = u64::from(pacing.scroll_step);
    let mut height = page.scroll_height().await?;
    let mut scrolled = 0u64;
    let mut steps = 0u32;

    while scrolled < height {
        page.scroll_by(step as i64).await?;
        scrolled += step;
        steps += 1;
        tokio::time::sleep(pacing.scroll_delay).await;

        if pacing.scroll_mode == ScrollMode::FollowGrowth {
            height = page.scroll_height().await?;
        }
    }
    Ok(steps)
}
