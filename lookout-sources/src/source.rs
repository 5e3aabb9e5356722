//! Trait definition for pluggable record sources.
//!
//! Each integration (a feed or a search page) implements [`Source`] to give
//! the search session a uniform way to fetch and extract records.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::types::Record;

/// What a session does when the trimmed query is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyQuery {
    /// Show nothing and skip the remote call.
    Skip,
    /// Fetch the unfiltered or default listing.
    Fetch,
}

/// A remote source of records.
///
/// Implementors own their endpoint layout and extraction rules:
///
/// - URL construction (fixed feed URL, or query encoded with `+` for spaces)
/// - HTTP request honoring the cancellation token
/// - Parsing the feed or page into records, with fallback text for gaps
///
/// All implementations must be `Send + Sync` so a session can run fetches
/// on spawned tasks.
pub trait Source: Send + Sync + 'static {
    /// The record type this source produces.
    type Record: Record;

    /// Fetch records for an already-trimmed query.
    ///
    /// Feed sources ignore `query`; the host filters their lists locally.
    ///
    /// # Errors
    ///
    /// [`SourceError::Cancelled`] if `cancel` fires before completion,
    /// otherwise [`SourceError::Http`] or [`SourceError::Parse`].
    fn fetch(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = Result<Vec<Self::Record>, SourceError>> + Send;

    /// Short stable name used in logs.
    fn name(&self) -> &'static str;

    /// How this source treats an empty query by default.
    fn empty_query(&self) -> EmptyQuery {
        EmptyQuery::Fetch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrontPageNews;

    struct MockSource {
        records: Vec<FrontPageNews>,
    }

    impl Source for MockSource {
        type Record = FrontPageNews;

        async fn fetch(
            &self,
            query: &str,
            cancel: &CancellationToken,
        ) -> Result<Vec<FrontPageNews>, SourceError> {
            if cancel.is_cancelled() {
                return Err(SourceError::Cancelled);
            }
            if query == "fail" {
                return Err(SourceError::Parse("mock source failure".into()));
            }
            Ok(self.records.clone())
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn news(id: &str) -> FrontPageNews {
        FrontPageNews {
            id: id.into(),
            title: format!("News {id}"),
            description: String::new(),
            url: "https://www.gamekyo.com".into(),
            date_published: "No Date".into(),
        }
    }

    #[test]
    fn mock_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockSource>();
    }

    #[test]
    fn default_empty_query_policy_is_fetch() {
        let source = MockSource { records: vec![] };
        assert_eq!(source.empty_query(), EmptyQuery::Fetch);
    }

    #[tokio::test]
    async fn mock_source_returns_records() {
        let source = MockSource {
            records: vec![news("1"), news("2")],
        };
        let records = source
            .fetch("", &CancellationToken::new())
            .await
            .expect("should succeed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "News 2");
    }

    #[tokio::test]
    async fn mock_source_observes_cancellation() {
        let source = MockSource { records: vec![] };
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = source.fetch("x", &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn mock_source_propagates_errors() {
        let source = MockSource { records: vec![] };
        let err = source
            .fetch("fail", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mock source failure"));
    }

    #[test]
    fn empty_query_serde_names() {
        assert_eq!(
            serde_json::to_string(&EmptyQuery::Skip).expect("serialize"),
            "\"skip\""
        );
        let parsed: EmptyQuery = serde_json::from_str("\"fetch\"").expect("deserialize");
        assert_eq!(parsed, EmptyQuery::Fetch);
    }
}
