pub mod browser;
pub mod config;
pub mod consent;
pub mod element;
pub mod error;
pub mod login;
pub mod naming;
pub mod page;
pub mod pdf;
pub mod scroll;
pub mod snapshot;

pub use browser::SnapshotBrowser;
pub use config::{
    BrowserConfig, Credentials, InputMode, OutputConfig, Pacing, ScrollMode, Selectors,
    SnapshotConfig,
};
pub use consent::ConsentOutcome;
pub use error::{Error, Result};
pub use page::{FrameInfo, Page};
pub use snapshot::{run, SnapshotReport};
