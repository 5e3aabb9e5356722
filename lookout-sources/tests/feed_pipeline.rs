//! Integration tests for the feed → record pipelines.
//!
//! These tests run whole documents through `parse_feed` and each site's
//! mapping without network calls.

use lookout_sources::feed::{format_month_day_year, parse_feed};
use lookout_sources::sources::gamekult::news_items;
use lookout_sources::sources::gamekyo::front_page_news;
use lookout_sources::sources::smashing::{articles, author_name};

const GAMEKYO_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
<channel>
  <title>Gamekyo</title>
  <item><title>Premier</title><link>https://www.gamekyo.com/news1.html</link><pubDate>Mon, 16 Sep 2024 10:00:00 +0200</pubDate></item>
  <item><link>https://www.gamekyo.com/news2.html</link></item>
  <item><title>Troisième</title></item>
</channel>
</rss>"#;

const SMASHING_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Smashing Magazine</title>
  <entry>
    <title>Modern CSS Layouts</title>
    <link rel="alternate" href="https://www.smashingmagazine.com/2024/09/modern-css-layouts/"/>
    <published>2024-09-16T10:00:00Z</published>
    <summary>Grid and flexbox, together.</summary>
    <author><name>John Doe (johndoe)</name></author>
  </entry>
  <entry>
    <link href="https://www.smashingmagazine.com/2024/09/untitled/"/>
  </entry>
</feed>"#;

#[test]
fn n_entries_become_n_records_in_feed_order() {
    let entries = parse_feed(GAMEKYO_RSS).expect("feed should parse");
    let news = front_page_news(entries, "https://www.gamekyo.com");

    assert_eq!(news.len(), 3);
    let ids: Vec<&str> = news.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3"]);
    assert_eq!(news[0].title, "Premier");
    assert_eq!(news[1].title, "No Title");
    assert_eq!(news[2].title, "Troisième");
    assert_eq!(news[2].url, "https://www.gamekyo.com");
    assert_eq!(news[1].date_published, "No Date");
}

#[test]
fn gamekult_news_uses_ellipsis_fallback_and_us_dates() {
    let entries = parse_feed(GAMEKYO_RSS).expect("feed should parse");
    let news = news_items(entries, "https://www.gamekult.com");

    assert_eq!(news.len(), 3);
    assert_eq!(news[0].date, "09/16/2024");
    assert_eq!(news[1].title, "No Title...");
    assert_eq!(news[1].date, "No Date");
    assert_eq!(news[2].link, "https://www.gamekult.com");
}

#[test]
fn atom_feed_maps_to_articles_with_extracted_author() {
    let entries = parse_feed(SMASHING_ATOM).expect("feed should parse");
    let list = articles(entries, "https://www.smashingmagazine.com");

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].title, "Modern CSS Layouts");
    assert_eq!(list[0].author, "johndoe");
    assert_eq!(list[0].description, "Grid and flexbox, together.");
    assert_eq!(
        list[0].url,
        "https://www.smashingmagazine.com/2024/09/modern-css-layouts/"
    );
    assert_eq!(list[1].title, "No Title");
    assert_eq!(list[1].author, "");
}

#[test]
fn author_extraction_examples() {
    assert_eq!(author_name("John Doe (johndoe)"), "johndoe");
    assert_eq!(author_name("Jane"), "Jane");
}

#[test]
fn dates_are_formatted_in_utc() {
    assert_eq!(
        format_month_day_year("Tue, 31 Dec 2024 23:30:00 -0200").as_deref(),
        Some("01/01/2025")
    );
    assert_eq!(format_month_day_year("not a date"), None);
}

#[test]
fn non_feed_document_is_rejected() {
    let err = parse_feed("<html><body>maintenance</body></html>").unwrap_err();
    assert!(err.to_string().starts_with("parse error"));
}
