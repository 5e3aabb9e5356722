//! Normalized records produced by every source.
//!
//! Text fields are always printable: extractors substitute fallback text
//! instead of leaving a field absent.

use serde::{Deserialize, Serialize};

/// Title used by the Gamekult integrations when the source has none.
pub const NO_TITLE_ELLIPSIS: &str = "No Title...";
/// Title used by the feed integrations when an item has none.
pub const NO_TITLE: &str = "No Title";
/// Date used when a feed item carries no publication date.
pub const NO_DATE: &str = "No Date";

/// Common projection every record exposes to the session and the host.
pub trait Record: Clone + Send + Sync + Serialize + 'static {
    /// Key unique within one result set. Not stable across requests.
    fn id(&self) -> String;
    /// Display title for list rows.
    fn title(&self) -> &str;
    /// URL opened or copied by the host.
    fn url(&self) -> &str;
}

/// A Gamekult news feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub link: String,
    /// `MM/DD/YYYY`, or [`NO_DATE`] when the item date is missing or invalid.
    pub date: String,
    pub content: String,
    /// Empty when the feed names no creator.
    pub creator: String,
    pub enclosure_url: Option<String>,
}

impl Record for NewsItem {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.link
    }
}

/// A Gamekyo front page news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontPageNews {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub date_published: String,
}

impl Record for FrontPageNews {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// A Smashing Magazine article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub date_published: String,
    pub author: String,
}

impl Record for Article {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// A Gamekult article search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamekultArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub category: String,
    pub media: Vec<String>,
    pub author: String,
}

impl Record for GamekultArticle {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// A Gamekult game database search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Publisher or developer; empty when the page names none.
    pub company: String,
    /// Platform tags in page order.
    pub media: Vec<String>,
}

impl Record for Game {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// A Tatoeba sentence with its translations.
///
/// Nested sentences have the same shape and empty translation lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: u64,
    pub text: String,
    pub username: String,
    pub lang: String,
    pub lang_name: String,
    pub lang_tag: String,
    pub url: String,
    pub flag_url: String,
    pub direct_sentences: Vec<Sentence>,
    pub indirect_sentences: Vec<Sentence>,
}

impl Sentence {
    /// Distinct language names across both translation lists, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        for sentence in self.direct_sentences.iter().chain(&self.indirect_sentences) {
            if !languages.contains(&sentence.lang_name) {
                languages.push(sentence.lang_name.clone());
            }
        }
        languages.sort();
        languages
    }

    /// Translations restricted to one language name. An empty filter keeps all.
    pub fn filtered(&self, language: &str) -> (Vec<&Sentence>, Vec<&Sentence>) {
        let keep = |s: &&Sentence| language.is_empty() || s.lang_name == language;
        (
            self.direct_sentences.iter().filter(keep).collect(),
            self.indirect_sentences.iter().filter(keep).collect(),
        )
    }
}

impl Record for Sentence {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn title(&self) -> &str {
        &self.text
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// HowLongToBeat game details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub playable_on: Vec<String>,
    /// Hours; 0 when unknown.
    pub gameplay_main: f64,
    pub gameplay_main_extra: f64,
    pub gameplay_completionist: f64,
    pub image_url: Option<String>,
    pub url: String,
}

impl Record for GameDetail {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }
}
