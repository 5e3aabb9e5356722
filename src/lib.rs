//! Lookout: launcher search screens over gaming news, articles and
//! phrasebook sites.
//!
//! Each screen pairs a remote source from `lookout-sources` with a
//! [`SearchSession`] that keeps the visible results in step with the latest
//! query:
//! Search bar → Session → Source (feed or scrape) → Presenter → Host UI
//!
//! # Architecture
//!
//! - **Session**: cancels superseded fetches and applies only current results
//! - **Screens**: per-site empty-query and failure policies
//! - **Detail**: markdown detail views and list rows per record type
//! - **Host**: versioned JSON envelopes over stdin/stdout (`lookout-host`)

pub mod config;
pub mod detail;
pub mod error;
pub mod host;
pub mod presenter;
pub mod screens;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use config::{LookoutConfig, ScreenOverride};
pub use detail::{Describe, DetailView, ListRow};
pub use error::{LookoutError, Result};
pub use presenter::{Presenter, SessionStatus, Snapshot, Toast, ToastStyle};
pub use screens::{ScreenHandle, ScreenKind, ScreenSink, ScreenState, open_screen};
pub use session::{FailureMode, SearchSession, SessionOptions};
