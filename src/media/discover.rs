use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static META_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta[content]").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("link[href]").unwrap());

const IMG_ATTRS: &[&str] = &["src", "data-src", "data-lazy", "data-lazy-src"];
const MEDIA_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".webp", ".gif", ".svg", ".ico", ".pdf",
];
const ANCHOR_KEYWORDS: &[&str] = &[
    "floor", "plan", "brochure", "banner", "hero", "slide", "flyer", "catalog",
];
const META_IMAGE_KEYS: &[&str] = &["og:image", "og:image:url", "twitter:image", "twitter:image:src"];
const LINK_RELS: &[&str] = &["icon", "shortcut icon", "apple-touch-icon", "image_src"];

/// Sweep the whole DOM for plausible media references, independent of any
/// per-field association already made. Returns absolute URLs, first-seen
/// order, deduplicated by URL string.
pub fn discover_media(doc: &Html, base: &Url) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut urls: Vec<String> = Vec::new();
    let mut push = |raw: &str| {
        if raw.is_empty() || raw.starts_with("data:") || raw.starts_with("javascript:") {
            return;
        }
        if let Ok(resolved) = base.join(raw) {
            let s = resolved.to_string();
            if seen.insert(s.clone()) {
                urls.push(s);
            }
        }
    };

    for img in doc.select(&IMG_SEL) {
        for attr in IMG_ATTRS {
            if let Some(value) = img.value().attr(attr) {
                push(value);
            }
        }
    }

    for anchor in doc.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let lower = href.to_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or(&lower);
        let is_media = MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
            || ANCHOR_KEYWORDS.iter().any(|kw| path.contains(kw));
        if is_media {
            push(href);
        }
    }

    for meta in doc.select(&META_SEL) {
        let key = meta
            .value()
            .attr("property")
            .or_else(|| meta.value().attr("name"))
            .unwrap_or_default();
        if META_IMAGE_KEYS.contains(&key) {
            if let Some(content) = meta.value().attr("content") {
                push(content);
            }
        }
    }

    for link in doc.select(&LINK_SEL) {
        let rel = link.value().attr("rel").unwrap_or_default().to_lowercase();
        if LINK_RELS.contains(&rel.as_str()) {
            if let Some(href) = link.value().attr("href") {
                push(href);
            }
        }
    }

    urls
}
