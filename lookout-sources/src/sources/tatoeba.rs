//! Tatoeba sentence search.
//!
//! The search page embeds each result as JSON inside the `ng-init`
//! attribute of a `.sentence-and-translations` block, wrapped in a
//! `vm.init([], ..., '')` call. The wrapper is stripped literally and the
//! remaining arguments are read as a JSON array whose first element is the
//! sentence.

use scraper::Html;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::extract::selector;
use crate::http;
use crate::source::{EmptyQuery, Source};
use crate::types::Sentence;

const INIT_PREFIX: &str = "vm.init([],";
const INIT_SUFFIX: &str = ", '')";

#[derive(Debug, Deserialize)]
struct RawSentence {
    id: u64,
    text: Option<String>,
    user: Option<RawUser>,
    lang: Option<String>,
    lang_name: Option<String>,
    lang_tag: Option<String>,
    #[serde(default)]
    translations: Vec<Vec<RawSentence>>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    username: Option<String>,
}

/// The Tatoeba search page. An empty query shows nothing.
pub struct Tatoeba {
    config: SourceConfig,
}

impl Tatoeba {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Search URL for a trimmed query.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/en/sentences/search?query={}",
            self.config.urls.tatoeba,
            http::encode_query(query)
        )
    }
}

impl Source for Tatoeba {
    type Record = Sentence;

    async fn fetch(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Sentence>, SourceError> {
        tracing::trace!(query, "Tatoeba search");
        let html = http::fetch_text(&self.config, &self.search_url(query), cancel).await?;
        parse_sentences_html(&html, &self.config.urls.tatoeba)
    }

    fn name(&self) -> &'static str {
        "tatoeba"
    }

    fn empty_query(&self) -> EmptyQuery {
        EmptyQuery::Skip
    }
}

/// Turn an `ng-init` attribute into a JSON array literal.
fn init_arguments(ng_init: &str) -> String {
    let content = ng_init.replacen(INIT_PREFIX, "", 1).replacen(INIT_SUFFIX, "", 1);
    format!("[{content}]")
}

fn sentence_from_raw(raw: RawSentence, site: &str) -> Sentence {
    let mut translations = raw.translations.into_iter();
    let direct = translations.next().unwrap_or_default();
    let indirect = translations.next().unwrap_or_default();
    let lang = raw.lang.unwrap_or_default();

    Sentence {
        id: raw.id,
        text: raw.text.unwrap_or_default(),
        username: raw.user.and_then(|u| u.username).unwrap_or_default(),
        lang_name: raw.lang_name.unwrap_or_default(),
        lang_tag: raw.lang_tag.unwrap_or_default(),
        url: format!("{site}/sentences/show/{}", raw.id),
        flag_url: format!("{site}/img/flags/{lang}.svg"),
        lang,
        direct_sentences: direct.into_iter().map(|s| sentence_from_raw(s, site)).collect(),
        indirect_sentences: indirect
            .into_iter()
            .map(|s| sentence_from_raw(s, site))
            .collect(),
    }
}

/// Parse the search results page into sentences, in page order.
pub(crate) fn parse_sentences_html(html: &str, site: &str) -> Result<Vec<Sentence>, SourceError> {
    let document = Html::parse_document(html);
    let block_sel = selector(".sentence-and-translations")?;

    let mut sentences = Vec::new();
    for block in document.select(&block_sel) {
        let Some(ng_init) = block.value().attr("ng-init") else {
            tracing::debug!("sentence block without ng-init; skipping");
            continue;
        };

        let args: Vec<serde_json::Value> = serde_json::from_str(&init_arguments(ng_init))
            .map_err(|e| SourceError::Parse(format!("invalid sentence data: {e}")))?;
        let Some(first) = args.into_iter().next() else {
            continue;
        };
        let raw: RawSentence = serde_json::from_value(first)
            .map_err(|e| SourceError::Parse(format!("invalid sentence data: {e}")))?;
        sentences.push(sentence_from_raw(raw, site));
    }

    tracing::debug!(count = sentences.len(), "Tatoeba sentences parsed");
    Ok(sentences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteUrls;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SITE: &str = "https://tatoeba.org";

    /// Mirrors the page markup: JSON quotes are entity-encoded inside the
    /// attribute.
    fn block(json: &str) -> String {
        let encoded = json.replace('"', "&quot;");
        format!(
            r#"<div class="sentence-and-translations" ng-init="vm.init([], {encoded}, [], '')"></div>"#
        )
    }

    fn page() -> String {
        let first = r#"{"id":1276,"text":"Let's try something.","lang":"eng","lang_name":"English","lang_tag":"en","user":{"username":"CK"},
            "translations":[
              [{"id":3075,"text":"Essayons quelque chose.","lang":"fra","lang_name":"French","lang_tag":"fr","user":{"username":"sacredceltic"}},
               {"id":4321,"text":"Versuchen wir etwas.","lang":"deu","lang_name":"German","lang_tag":"de","user":null}],
              [{"id":9999,"text":"Provu ion.","lang":"epo","lang_name":"Esperanto","lang_tag":"eo"}]
            ]}"#;
        let second = r#"{"id":2,"text":"Second","lang":null,"lang_name":null,"lang_tag":null,"user":null,"translations":[[],[]]}"#;
        format!(
            "<html><body>{}{}<div class=\"sentence-and-translations\"></div></body></html>",
            block(first),
            block(second)
        )
    }

    #[test]
    fn init_arguments_strips_wrapper() {
        assert_eq!(
            init_arguments(r#"vm.init([], {"id":1}, [], '')"#),
            r#"[ {"id":1}, []]"#
        );
    }

    #[test]
    fn sentences_are_extracted_with_translations() {
        let sentences = parse_sentences_html(&page(), SITE).expect("should parse");
        assert_eq!(sentences.len(), 2);

        let first = &sentences[0];
        assert_eq!(first.id, 1276);
        assert_eq!(first.text, "Let's try something.");
        assert_eq!(first.username, "CK");
        assert_eq!(first.lang, "eng");
        assert_eq!(first.lang_name, "English");
        assert_eq!(first.url, "https://tatoeba.org/sentences/show/1276");
        assert_eq!(first.flag_url, "https://tatoeba.org/img/flags/eng.svg");

        assert_eq!(first.direct_sentences.len(), 2);
        assert_eq!(first.direct_sentences[0].text, "Essayons quelque chose.");
        assert_eq!(first.direct_sentences[1].username, "");
        assert_eq!(first.indirect_sentences.len(), 1);
        assert_eq!(first.indirect_sentences[0].lang_name, "Esperanto");
        assert_eq!(first.languages(), vec!["Esperanto", "French", "German"]);
    }

    #[test]
    fn null_fields_become_empty_strings() {
        let sentences = parse_sentences_html(&page(), SITE).expect("should parse");
        let second = &sentences[1];
        assert_eq!(second.lang, "");
        assert_eq!(second.lang_name, "");
        assert_eq!(second.username, "");
        assert!(second.direct_sentences.is_empty());
        assert!(second.indirect_sentences.is_empty());
    }

    #[test]
    fn malformed_data_is_parse_error() {
        let html = r#"<div class="sentence-and-translations" ng-init="vm.init([], {broken, '')"></div>"#;
        let err = parse_sentences_html(html, SITE).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn search_url_encodes_query() {
        let source = Tatoeba::new(SourceConfig::default());
        assert_eq!(
            source.search_url("how are you"),
            "https://tatoeba.org/en/sentences/search?query=how+are+you"
        );
        assert_eq!(source.empty_query(), EmptyQuery::Skip);
    }

    #[tokio::test]
    async fn search_hits_sentence_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/en/sentences/search"))
            .and(query_param("query", "try something"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page()))
            .expect(1)
            .mount(&server)
            .await;

        let config = SourceConfig {
            urls: SiteUrls::all(&server.uri()),
            ..Default::default()
        };
        let sentences = Tatoeba::new(config)
            .fetch("try something", &CancellationToken::new())
            .await
            .expect("search should succeed");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].url.starts_with(&server.uri()));
    }

    #[tokio::test]
    #[ignore] // Live test: run with `cargo test -- --ignored`
    async fn live_tatoeba_search() {
        let sentences = Tatoeba::new(SourceConfig::default())
            .fetch("hello", &CancellationToken::new())
            .await
            .expect("live search should work");
        assert!(!sentences.is_empty());
    }
}
