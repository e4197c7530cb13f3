use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

const NEWS_URL_MARKERS: &[&str] = &["news", "blog", "article"];
const NEWS_CONTAINER_MARKERS: &[&str] = &["article", "news-item", "news", "post", "blog-post"];

/// A news/article reference found on the page. Entries are internal plumbing:
/// their images surface in the record only as files in the news folder.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsEntry {
    /// Sanitized id derived from the URL path basename (or image filename
    /// for synthetic entries).
    pub id: String,
    pub url: Option<String>,
    pub image_urls: Vec<String>,
}

/// Find news anchors and standalone news-labelled images.
pub fn extract(doc: &Html, base: &Url) -> Vec<NewsEntry> {
    let mut entries: Vec<NewsEntry> = Vec::new();

    for anchor in doc.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let lower = resolved.as_str().to_lowercase();
        if !NEWS_URL_MARKERS.iter().any(|m| lower.contains(m)) {
            continue;
        }
        let Some(id) = sanitize_id(last_path_segment(&resolved)) else {
            continue;
        };
        if entries.iter().any(|e| e.id == id) {
            continue;
        }

        let mut image_urls: Vec<String> = anchor
            .select(&IMG_SEL)
            .filter_map(|img| img.value().attr("src"))
            .filter_map(|src| base.join(src).ok())
            .map(|u| u.to_string())
            .collect();

        // No image inside the anchor: look in the nearest news-looking
        // ancestor container.
        if image_urls.is_empty() {
            if let Some(container) = news_ancestor(&anchor) {
                image_urls = container
                    .select(&IMG_SEL)
                    .filter_map(|img| img.value().attr("src"))
                    .filter_map(|src| base.join(src).ok())
                    .map(|u| u.to_string())
                    .collect();
            }
        }

        entries.push(NewsEntry {
            id,
            url: Some(resolved.to_string()),
            image_urls,
        });
    }

    // Standalone images whose class/id mentions news; synthetic entries keyed
    // by the image filename, skipping ids already present.
    for img in doc.select(&IMG_SEL) {
        let marker = format!(
            "{} {}",
            img.value().attr("class").unwrap_or_default(),
            img.value().attr("id").unwrap_or_default()
        )
        .to_lowercase();
        if !NEWS_URL_MARKERS.iter().any(|m| marker.contains(m)) {
            continue;
        }
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        let Ok(resolved) = base.join(src) else {
            continue;
        };
        let basename = last_path_segment(&resolved);
        let stem = basename.rsplit_once('.').map(|(s, _)| s).unwrap_or(basename);
        let Some(id) = sanitize_id(stem) else {
            continue;
        };
        if entries.iter().any(|e| e.id == id) {
            continue;
        }
        entries.push(NewsEntry {
            id,
            url: None,
            image_urls: vec![resolved.to_string()],
        });
    }

    entries
}

fn last_path_segment(url: &Url) -> &str {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("")
}

/// Alphanumeric + underscore, lowercased; None when nothing survives.
fn sanitize_id(raw: &str) -> Option<String> {
    let id: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let trimmed = id.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn news_ancestor<'a>(anchor: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    for node in anchor.ancestors() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let name = el.value().name();
        let marker = format!(
            "{} {} {}",
            name,
            el.value().attr("class").unwrap_or_default(),
            el.value().attr("id").unwrap_or_default()
        )
        .to_lowercase();
        if NEWS_CONTAINER_MARKERS.iter().any(|m| marker.contains(m)) {
            return Some(el);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_from(html: &str) -> Vec<NewsEntry> {
        let doc = Html::parse_document(html);
        let base = Url::parse("https://builder.example/projects/skyline/").unwrap();
        extract(&doc, &base)
    }

    #[test]
    fn anchor_with_nested_image() {
        let html = r#"
            <a href="/news/tower-a-launch.html">
              <img src="/uploads/launch.jpg"> Tower A launched
            </a>"#;
        let entries = extract_from(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "tower_a_launch_html");
        assert_eq!(
            entries[0].image_urls,
            vec!["https://builder.example/uploads/launch.jpg"]
        );
    }

    #[test]
    fn ancestor_container_image() {
        let html = r#"
            <div class="news-item">
              <img src="/uploads/award.png">
              <a href="/blog/award-2024">Read more</a>
            </div>"#;
        let entries = extract_from(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].image_urls,
            vec!["https://builder.example/uploads/award.png"]
        );
    }

    #[test]
    fn synthetic_image_entry() {
        let html = r#"<img class="news-strip" src="/uploads/press-clipping.jpg">"#;
        let entries = extract_from(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "press_clipping");
        assert!(entries[0].url.is_none());
    }

    #[test]
    fn synthetic_skips_existing_id() {
        let html = r#"
            <a href="/news/award-2024"><img src="/a.png"></a>
            <img class="news" src="/award-2024.jpg">"#;
        let entries = extract_from(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "award_2024");
    }

    #[test]
    fn non_news_anchors_ignored() {
        let html = r#"<a href="/contact-us">Contact</a> <a href="/floor-plans">Plans</a>"#;
        assert!(extract_from(html).is_empty());
    }
}
