pub mod amenities;
pub mod highlights;
pub mod news;
pub mod synonyms;

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use crate::geo;
use crate::media::discover;
use amenities::AmenityCandidate;
use news::NewsEntry;
use synonyms::SynonymTable;

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static META_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").unwrap());
static MAP_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src], a[href]").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Everything the later phases need from the page, extracted in one
/// synchronous DOM pass into owned data. The `Html` tree never crosses an
/// await point.
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    pub project_name: Option<String>,
    pub description: Option<String>,
    pub highlights_text: Option<String>,
    pub highlight_image_url: Option<String>,
    pub body_text: String,
    pub map_coords: Option<(f64, f64)>,
    pub amenities: Vec<AmenityCandidate>,
    pub news: Vec<NewsEntry>,
    pub media_urls: Vec<String>,
}

/// Parse the fetched page and run every DOM-level extractor.
pub fn scan_page(html: &str, base: &Url, synonyms: &SynonymTable) -> PageScan {
    let doc = Html::parse_document(html);

    let (highlights_text, highlight_image_url) = highlights::find_highlights(&doc);

    PageScan {
        project_name: extract_name(&doc),
        description: extract_description(&doc),
        highlights_text,
        highlight_image_url: highlight_image_url
            .and_then(|src| base.join(&src).ok())
            .map(|u| u.to_string()),
        body_text: body_text(&doc),
        map_coords: find_map_coords(&doc, html),
        amenities: amenities::extract(&doc, base, synonyms),
        news: news::extract(&doc, base),
        media_urls: discover::discover_media(&doc, base),
    }
}

/// og:site_name, then the <title> (minus a " | suffix"), then the first h1.
fn extract_name(doc: &Html) -> Option<String> {
    if let Some(name) = meta_content(doc, &["og:site_name"]) {
        return Some(name);
    }
    if let Some(title) = doc.select(&TITLE_SEL).next() {
        let text: String = title.text().collect::<Vec<_>>().join(" ");
        let cleaned = text.split(['|', '-']).next().unwrap_or(&text).trim();
        if !cleaned.is_empty() {
            return Some(cleaned.to_string());
        }
    }
    doc.select(&H1_SEL)
        .next()
        .map(|h| h.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|s| !s.is_empty())
}

/// meta description / og:description, else the first substantial paragraph.
fn extract_description(doc: &Html) -> Option<String> {
    if let Some(desc) = meta_content(doc, &["description", "og:description"]) {
        return Some(desc);
    }
    doc.select(&P_SEL)
        .map(|p| p.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .find(|t| t.len() > 80)
}

fn meta_content(doc: &Html, names: &[&str]) -> Option<String> {
    for el in doc.select(&META_SEL) {
        let key = el
            .value()
            .attr("property")
            .or_else(|| el.value().attr("name"))
            .unwrap_or_default();
        if names.contains(&key) {
            if let Some(content) = el.value().attr("content") {
                let content = content.trim();
                if !content.is_empty() {
                    return Some(content.to_string());
                }
            }
        }
    }
    None
}

/// First coordinate pair found in a map widget src/href, falling back to a
/// raw-HTML scan for coordinates buried in scripts.
fn find_map_coords(doc: &Html, raw_html: &str) -> Option<(f64, f64)> {
    for el in doc.select(&MAP_SEL) {
        let target = el
            .value()
            .attr("src")
            .or_else(|| el.value().attr("href"))
            .unwrap_or_default();
        if let Some(coords) = geo::parse_map_coords(target) {
            return Some(coords);
        }
    }
    geo::parse_map_coords(raw_html)
}

fn body_text(doc: &Html) -> String {
    let root = doc
        .select(&BODY_SEL)
        .next()
        .map(|b| b.text().collect::<Vec<_>>())
        .unwrap_or_default();
    root.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(html: &str) -> PageScan {
        let base = Url::parse("https://builder.example/skyline/").unwrap();
        scan_page(html, &base, &SynonymTable::builtin())
    }

    #[test]
    fn fixture_scan() {
        let html = std::fs::read_to_string("tests/fixtures/verdant_heights.html").unwrap();
        let scan = scan(&html);

        assert_eq!(scan.project_name.as_deref(), Some("Verdant Heights"));
        assert!(scan.description.is_some());
        assert!(scan.highlights_text.as_deref().unwrap().contains("RERA"));
        assert_eq!(scan.map_coords, Some((17.4325, 78.3871)));
        assert!(scan.amenities.iter().any(|a| a.key == "SWIMMING POOL"));
        assert!(scan.news.iter().any(|n| n.id == "verdant_wins_award"));
        assert!(!scan.media_urls.is_empty());
    }

    #[test]
    fn name_from_title() {
        let scan = scan("<html><head><title>Skyline Towers | Acme Builders</title></head></html>");
        assert_eq!(scan.project_name.as_deref(), Some("Skyline Towers"));
    }

    #[test]
    fn description_from_meta() {
        let scan = scan(r#"<meta name="description" content="A lakeside township.">"#);
        assert_eq!(scan.description.as_deref(), Some("A lakeside township."));
    }

    #[test]
    fn coords_from_iframe() {
        let scan = scan(r#"<iframe src="https://maps.google.com/embed?pb=!3d17.1!4d78.2"></iframe>"#);
        assert_eq!(scan.map_coords, Some((17.1, 78.2)));
    }

    #[test]
    fn coords_from_raw_script() {
        let scan = scan(r#"<script>var map = "!2d78.5!3d17.9";</script>"#);
        assert_eq!(scan.map_coords, Some((17.9, 78.5)));
    }

    #[test]
    fn body_text_collapses_whitespace() {
        let scan = scan("<body><p>one</p>\n\n   <p>two</p></body>");
        assert_eq!(scan.body_text, "one two");
    }
}
