//! Shared test utilities used across multiple test modules.

use std::sync::{Arc, Mutex};

use lookout_sources::FrontPageNews;

use crate::presenter::{Presenter, Snapshot, Toast};

/// Presenter that records everything it is handed.
pub struct RecordingPresenter<R> {
    snapshots: Arc<Mutex<Vec<Snapshot<R>>>>,
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl<R> Default for RecordingPresenter<R> {
    fn default() -> Self {
        Self {
            snapshots: Arc::new(Mutex::new(Vec::new())),
            toasts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<R> Clone for RecordingPresenter<R> {
    fn clone(&self) -> Self {
        Self {
            snapshots: Arc::clone(&self.snapshots),
            toasts: Arc::clone(&self.toasts),
        }
    }
}

impl<R: Clone> RecordingPresenter<R> {
    pub fn snapshots(&self) -> Vec<Snapshot<R>> {
        self.snapshots.lock().expect("snapshots lock").clone()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().expect("toasts lock").clone()
    }
}

impl<R: Clone + Send + 'static> Presenter<R> for RecordingPresenter<R> {
    fn publish(&self, snapshot: &Snapshot<R>) {
        self.snapshots
            .lock()
            .expect("snapshots lock")
            .push(snapshot.clone());
    }

    fn notify(&self, toast: &Toast) {
        self.toasts.lock().expect("toasts lock").push(toast.clone());
    }
}

/// A front page news record with placeholder fields.
pub fn news(id: &str, title: &str) -> FrontPageNews {
    FrontPageNews {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        url: format!("https://www.gamekyo.com/news{id}.html"),
        date_published: "No Date".to_string(),
    }
}
