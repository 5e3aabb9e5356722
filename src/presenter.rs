//! The seam between a search session and the host UI.
//!
//! A session never renders anything itself. It hands every state change to
//! a [`Presenter`] as a [`Snapshot`], and every user-visible failure as a
//! [`Toast`]. The host decides how to draw lists, detail views and toasts.

use serde::{Deserialize, Serialize};

/// Visible state of a search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Mounted, no query issued yet.
    Idle,
    /// A remote operation is in flight.
    Loading,
    /// The last operation produced the current results.
    Loaded,
    /// The last operation failed.
    Failed,
}

/// Everything the host needs to render one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<R> {
    pub query_text: String,
    pub is_loading: bool,
    pub status: SessionStatus,
    pub results: Vec<R>,
}

/// Toast severity. Sessions only raise failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastStyle {
    Failure,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub style: ToastStyle,
    pub title: String,
    /// Error description, when the screen shows it.
    pub message: Option<String>,
}

impl Toast {
    /// A failure toast.
    pub fn failure(title: impl Into<String>, message: Option<String>) -> Self {
        Self {
            style: ToastStyle::Failure,
            title: title.into(),
            message,
        }
    }
}

/// Host UI collaborator for one screen.
///
/// Calls arrive in state order from whichever task completed a fetch, so
/// implementations must be cheap and must not block (typically a channel
/// send).
pub trait Presenter<R>: Send + Sync + 'static {
    /// Render a new snapshot.
    fn publish(&self, snapshot: &Snapshot<R>);

    /// Show a failure notification.
    fn notify(&self, toast: &Toast);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_failure_constructor() {
        let toast = Toast::failure("Could not perform search", Some("boom".into()));
        assert_eq!(toast.style, ToastStyle::Failure);
        assert_eq!(toast.title, "Could not perform search");
        assert_eq!(toast.message.as_deref(), Some("boom"));
    }

    #[test]
    fn snapshot_serializes_status_in_snake_case() {
        let snapshot: Snapshot<String> = Snapshot {
            query_text: "mario".into(),
            is_loading: true,
            status: SessionStatus::Loading,
            results: vec![],
        };
        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(json["status"], "loading");
        assert_eq!(json["is_loading"], true);
        assert_eq!(json["query_text"], "mario");
    }
}
