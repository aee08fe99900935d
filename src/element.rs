use chromiumoxide::element::Element as CrElement;

use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Element.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Click this element (scrolls into view first).
    pub async fn click(&self) -> Result<()> {
        self.inner.click().await?;
        Ok(())
    }

    /// Send `text` as individual key presses.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.type_str(text).await?;
        Ok(())
    }

    pub async fn inner_text(&self) -> Result<String> {
        self.inner
            .inner_text()
            .await?
            .ok_or_else(|| Error::ElementNotFound("inner text is empty".into()))
    }
}
