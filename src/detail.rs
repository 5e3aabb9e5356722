//! Detail views and list rows for every record type.
//!
//! The host renders a [`DetailView`] as a markdown pane with an optional
//! metadata sidebar and optional list sections. [`Describe`] is the single
//! place where record fields become display text.

use lookout_sources::feed::format_month_day_year;
use lookout_sources::{
    Article, FrontPageNews, Game, GameDetail, GamekultArticle, NewsItem, Record, Sentence,
};
use serde::Serialize;

/// Shown when a selected id is not in the current result set.
pub const ITEM_NOT_FOUND: &str = "This item cannot be found...";
/// Shown when a game lookup finds nothing.
pub const GAME_NOT_FOUND: &str = "This game cannot be found...";

/// One labelled value in the metadata sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataLabel {
    pub title: String,
    pub text: String,
}

/// A list row, used both for result lists and detail sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub accessory: Option<String>,
    pub icon: Option<String>,
    pub url: String,
}

/// A titled group of rows. `subtitle` carries the row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<ListRow>,
}

impl DetailSection {
    fn counted(title: &str, rows: Vec<ListRow>) -> Self {
        Self {
            title: title.to_string(),
            subtitle: rows.len().to_string(),
            rows,
        }
    }
}

/// Everything the host needs to render a detail screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub navigation_title: String,
    pub markdown: String,
    /// Page opened by "Open in Browser"; `None` for placeholders.
    pub url: Option<String>,
    pub metadata: Vec<MetadataLabel>,
    pub sections: Vec<DetailSection>,
    /// Language filter choices. An empty list hides the filter.
    pub languages: Vec<String>,
}

impl DetailView {
    /// Placeholder for an id missing from the current results.
    pub fn item_not_found() -> Self {
        Self {
            markdown: ITEM_NOT_FOUND.to_string(),
            ..Default::default()
        }
    }

    /// Placeholder for a game lookup that found nothing.
    pub fn game_not_found(name: &str, url: String) -> Self {
        Self {
            navigation_title: name.to_string(),
            markdown: GAME_NOT_FOUND.to_string(),
            url: Some(url),
            ..Default::default()
        }
    }
}

/// Display projection of a record.
pub trait Describe: Record {
    /// Row shown in the result list.
    fn row(&self) -> ListRow;

    /// Detail screen. `language` filters translations where a record has
    /// them; an empty string keeps everything.
    fn detail(&self, language: &str) -> DetailView;
}

/// Join non-empty markdown blocks with blank lines.
fn blocks<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// Feed dates as `MM/DD/YYYY`; unparseable text is shown as is.
fn short_date(raw: &str) -> String {
    format_month_day_year(raw).unwrap_or_else(|| raw.to_string())
}

fn simple_detail(title: &str, body: &str, url: &str) -> DetailView {
    DetailView {
        navigation_title: title.to_string(),
        markdown: blocks([format!("# {title}").as_str(), body]),
        url: Some(url.to_string()),
        ..Default::default()
    }
}

impl Describe for NewsItem {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: None,
            accessory: Some(self.date.clone()),
            icon: None,
            url: self.link.clone(),
        }
    }

    fn detail(&self, _language: &str) -> DetailView {
        let author = non_empty(&self.creator)
            .map(|creator| format!("Auteur : **{creator}**"))
            .unwrap_or_default();
        let image = self
            .enclosure_url
            .as_ref()
            .map(|src| format!("<img src=\"{src}\" />"))
            .unwrap_or_default();
        DetailView {
            navigation_title: self.title.clone(),
            markdown: blocks([
                format!("# {}", self.title).as_str(),
                self.content.as_str(),
                author.as_str(),
                image.as_str(),
            ]),
            url: Some(self.link.clone()),
            ..Default::default()
        }
    }
}

impl Describe for GamekultArticle {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: non_empty(&self.category),
            accessory: non_empty(&self.author),
            icon: None,
            url: self.url.clone(),
        }
    }

    fn detail(&self, _language: &str) -> DetailView {
        let media = if self.media.is_empty() {
            String::new()
        } else {
            format!("Supports : {}", self.media.join(", "))
        };
        let author = non_empty(&self.author)
            .map(|author| format!("**{author}**"))
            .unwrap_or_default();
        DetailView {
            navigation_title: self.title.clone(),
            markdown: blocks([
                format!("# {}", self.title).as_str(),
                self.description.as_str(),
                media.as_str(),
                author.as_str(),
            ]),
            url: Some(self.url.clone()),
            ..Default::default()
        }
    }
}

impl Describe for Game {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: non_empty(&self.company),
            accessory: non_empty(&self.media.join(", ")),
            icon: None,
            url: self.url.clone(),
        }
    }

    fn detail(&self, _language: &str) -> DetailView {
        let mut view = simple_detail(&self.title, &self.company, &self.url);
        if !self.media.is_empty() {
            view.metadata.push(MetadataLabel {
                title: "Platforms".to_string(),
                text: self.media.join(", "),
            });
        }
        view
    }
}

impl Describe for FrontPageNews {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: None,
            accessory: Some(short_date(&self.date_published)),
            icon: None,
            url: self.url.clone(),
        }
    }

    fn detail(&self, _language: &str) -> DetailView {
        simple_detail(&self.title, &self.description, &self.url)
    }
}

impl Describe for Article {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.title.clone(),
            subtitle: non_empty(&self.author),
            accessory: Some(short_date(&self.date_published)),
            icon: None,
            url: self.url.clone(),
        }
    }

    fn detail(&self, _language: &str) -> DetailView {
        let author = non_empty(&self.author)
            .map(|author| format!("**{author}**"))
            .unwrap_or_default();
        let body = blocks([self.description.as_str(), author.as_str()]);
        simple_detail(&self.title, &body, &self.url)
    }
}

impl Describe for Sentence {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.to_string(),
            title: self.text.clone(),
            subtitle: None,
            accessory: non_empty(&self.username),
            icon: Some(self.flag_url.clone()),
            url: self.url.clone(),
        }
    }

    fn detail(&self, language: &str) -> DetailView {
        let (direct, indirect) = self.filtered(language);
        let mut sections = vec![DetailSection {
            title: String::new(),
            subtitle: String::new(),
            rows: vec![self.row()],
        }];
        if !direct.is_empty() {
            sections.push(DetailSection::counted(
                "Translations",
                direct.iter().map(|s| s.row()).collect(),
            ));
        }
        if !indirect.is_empty() {
            sections.push(DetailSection::counted(
                "Translations of translations",
                indirect.iter().map(|s| s.row()).collect(),
            ));
        }
        DetailView {
            navigation_title: self.text.clone(),
            markdown: String::new(),
            url: Some(self.url.clone()),
            metadata: Vec::new(),
            sections,
            languages: self.languages(),
        }
    }
}

fn hours_text(hours: f64) -> String {
    if hours >= 1.0 {
        format!("{hours} hours")
    } else {
        "-".to_string()
    }
}

impl Describe for GameDetail {
    fn row(&self) -> ListRow {
        ListRow {
            id: self.id.clone(),
            title: self.name.clone(),
            subtitle: None,
            accessory: non_empty(&self.playable_on.join(", ")),
            icon: self.image_url.clone(),
            url: self.url.clone(),
        }
    }

    fn detail(&self, _language: &str) -> DetailView {
        let description = self.description.split('\t').next().unwrap_or_default();
        let heading = if self.playable_on.len() == 1 {
            "## Platform"
        } else {
            "## Platforms"
        };
        let markdown = format!(
            "# {}\n{}\n\n{}\n{}",
            self.name,
            description.trim_end(),
            heading,
            self.playable_on.join(", ")
        );
        DetailView {
            navigation_title: self.name.clone(),
            markdown,
            url: Some(self.url.clone()),
            metadata: vec![
                MetadataLabel {
                    title: "Main Story".to_string(),
                    text: hours_text(self.gameplay_main),
                },
                MetadataLabel {
                    title: "Main + Extras".to_string(),
                    text: hours_text(self.gameplay_main_extra),
                },
                MetadataLabel {
                    title: "Completionists".to_string(),
                    text: hours_text(self.gameplay_completionist),
                },
            ],
            sections: Vec::new(),
            languages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn sentence(id: u64, lang_name: &str) -> Sentence {
        Sentence {
            id,
            text: format!("sentence {id}"),
            username: "CK".into(),
            lang: "eng".into(),
            lang_name: lang_name.into(),
            lang_tag: String::new(),
            url: format!("https://tatoeba.org/sentences/show/{id}"),
            flag_url: "https://tatoeba.org/img/flags/eng.svg".into(),
            direct_sentences: vec![],
            indirect_sentences: vec![],
        }
    }

    fn celeste() -> GameDetail {
        GameDetail {
            id: "42818".into(),
            name: "Celeste".into(),
            description: "A platformer about climbing.\tRead more".into(),
            playable_on: vec!["PC".into(), "Nintendo Switch".into()],
            gameplay_main: 8.0,
            gameplay_main_extra: 12.5,
            gameplay_completionist: 0.5,
            image_url: None,
            url: "https://howlongtobeat.com/game?id=42818".into(),
        }
    }

    #[test]
    fn news_detail_includes_author_and_image() {
        let item = NewsItem {
            id: "1".into(),
            title: "Test de Zelda".into(),
            link: "https://www.gamekult.com/zelda.html".into(),
            date: "09/15/2024".into(),
            content: "Un grand jeu.".into(),
            creator: "Jean".into(),
            enclosure_url: Some("https://img.gamekult.com/zelda.jpg".into()),
        };
        let view = item.detail("");
        assert_eq!(view.navigation_title, "Test de Zelda");
        assert_eq!(
            view.markdown,
            "# Test de Zelda\n\nUn grand jeu.\n\nAuteur : **Jean**\n\n<img src=\"https://img.gamekult.com/zelda.jpg\" />"
        );
        assert_eq!(view.url.as_deref(), Some("https://www.gamekult.com/zelda.html"));
        assert_eq!(item.row().accessory.as_deref(), Some("09/15/2024"));
    }

    #[test]
    fn news_detail_omits_empty_creator() {
        let item = NewsItem {
            id: "1".into(),
            title: "T".into(),
            link: "l".into(),
            date: "No Date".into(),
            content: String::new(),
            creator: String::new(),
            enclosure_url: None,
        };
        assert_eq!(item.detail("").markdown, "# T");
    }

    #[test]
    fn gamekult_article_lists_supports() {
        let article = GamekultArticle {
            id: "a-0".into(),
            title: "Dossier".into(),
            description: "Résumé".into(),
            url: "https://www.gamekult.com/dossier.html".into(),
            category: "Dossier".into(),
            media: vec!["PS5".into(), "PC".into()],
            author: "Marie".into(),
        };
        let markdown = article.detail("").markdown;
        assert!(markdown.contains("Supports : PS5, PC"));
        assert!(markdown.ends_with("**Marie**"));
    }

    #[test]
    fn sentence_detail_has_counted_sections() {
        let mut root = sentence(1, "English");
        root.direct_sentences = vec![sentence(2, "French"), sentence(3, "German")];
        root.indirect_sentences = vec![sentence(4, "French")];

        let view = root.detail("");
        assert_eq!(view.navigation_title, "sentence 1");
        assert_eq!(view.languages, vec!["French", "German"]);
        assert_eq!(view.sections.len(), 3);
        assert_eq!(view.sections[1].title, "Translations");
        assert_eq!(view.sections[1].subtitle, "2");
        assert_eq!(view.sections[2].title, "Translations of translations");
        assert_eq!(view.sections[2].subtitle, "1");
    }

    #[test]
    fn sentence_language_filter_hides_empty_sections() {
        let mut root = sentence(1, "English");
        root.direct_sentences = vec![sentence(2, "French"), sentence(3, "German")];
        root.indirect_sentences = vec![sentence(4, "French")];

        let view = root.detail("German");
        assert_eq!(view.sections.len(), 2);
        assert_eq!(view.sections[1].rows[0].id, "3");
        assert_eq!(view.languages, vec!["French", "German"]);
    }

    #[test]
    fn sentence_row_uses_flag_and_username() {
        let row = sentence(7, "English").row();
        assert_eq!(row.icon.as_deref(), Some("https://tatoeba.org/img/flags/eng.svg"));
        assert_eq!(row.accessory.as_deref(), Some("CK"));
    }

    #[test]
    fn game_detail_markdown_and_hours() {
        let view = celeste().detail("");
        assert_eq!(
            view.markdown,
            "# Celeste\nA platformer about climbing.\n\n## Platforms\nPC, Nintendo Switch"
        );
        let texts: Vec<_> = view.metadata.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["8 hours", "12.5 hours", "-"]);
        let titles: Vec<_> = view.metadata.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Main Story", "Main + Extras", "Completionists"]);
    }

    #[test]
    fn single_platform_heading_is_singular() {
        let mut game = celeste();
        game.playable_on = vec!["PC".into()];
        assert!(game.detail("").markdown.contains("## Platform\nPC"));
    }

    #[test]
    fn placeholders() {
        assert_eq!(DetailView::item_not_found().markdown, ITEM_NOT_FOUND);
        let view = DetailView::game_not_found("Nope", "https://howlongtobeat.com/game?id=0".into());
        assert_eq!(view.markdown, GAME_NOT_FOUND);
        assert_eq!(view.navigation_title, "Nope");
    }

    #[test]
    fn smashing_row_shows_author() {
        let article = Article {
            id: "1".into(),
            title: "Modern CSS".into(),
            description: "Grid".into(),
            url: "https://www.smashingmagazine.com/css/".into(),
            date_published: "Mon, 16 Sep 2024 10:00:00 +0000".into(),
            author: "Ada".into(),
        };
        assert_eq!(article.row().subtitle.as_deref(), Some("Ada"));
        assert_eq!(article.row().accessory.as_deref(), Some("09/16/2024"));
        assert_eq!(article.detail("").markdown, "# Modern CSS\n\nGrid\n\n**Ada**");
    }

    #[test]
    fn front_page_row_shows_short_date() {
        let mut news = FrontPageNews {
            id: "1".into(),
            title: "Nintendo Direct".into(),
            description: String::new(),
            url: "https://www.gamekyo.com/news1.html".into(),
            date_published: "Wed, 04 Sep 2024 08:00:00 +0200".into(),
        };
        assert_eq!(news.row().accessory.as_deref(), Some("09/04/2024"));

        news.date_published = "No Date".into();
        assert_eq!(news.row().accessory.as_deref(), Some("No Date"));
    }
}
