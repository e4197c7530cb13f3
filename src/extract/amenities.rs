use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::synonyms::SynonymTable;

/// Alt/title keywords that identify an icon as a specific amenity during the
/// site-wide scan. Also consulted by the media classifier.
pub const AMENITY_KEYWORDS: &[&str] = &[
    "pool",
    "gym",
    "club",
    "parking",
    "security",
    "lift",
    "playground",
    "garden",
    "school",
    "hospital",
    "spa",
    "squash",
    "tennis",
    "jogging",
    "meditation",
    "pet",
];

static SECTION_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "[class*='amenit'], [id*='amenit'], [class*='facilit'], [id*='facilit'], \
         [class*='feature'], [id*='feature']",
    )
    .unwrap()
});
static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static SVG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("svg").unwrap());

/// One amenity candidate after normalization and synonym mapping. Candidates
/// sharing a key merge, unioning their icon URL sets.
#[derive(Debug, Clone, PartialEq)]
pub struct AmenityCandidate {
    /// Canonical merge key: the synonym table's canonical name when the
    /// lookup matched (either tier), else the normalized raw text.
    pub key: String,
    /// What the record will show (before the final cleanup pass).
    pub display: String,
    /// Whether the synonym table produced the display name (exact matches
    /// only). Curated names are exempt from noise-token stripping in the
    /// final cleanup.
    pub mapped: bool,
    pub icon_urls: Vec<String>,
}

/// Extract amenity candidates from the page: amenity-looking sections first,
/// then a site-wide icon scan keyed on alt/title text.
pub fn extract(doc: &Html, base: &Url, synonyms: &SynonymTable) -> Vec<AmenityCandidate> {
    let mut raw: Vec<(String, Vec<String>)> = Vec::new();

    for section in amenity_sections(doc) {
        let items: Vec<ElementRef> = section.select(&LI_SEL).collect();
        if items.is_empty() {
            // No list structure: split the section's plain text instead.
            let text: String = section.text().collect::<Vec<_>>().join(" ");
            for part in text.split(['\n', ',', '•', '|', '/']) {
                let part = part.trim();
                if !part.is_empty() && part.len() < 60 {
                    raw.push((part.to_string(), Vec::new()));
                }
            }
            continue;
        }
        for item in items {
            let name: String = item.text().collect::<Vec<_>>().join(" ").trim().to_string();
            let icons: Vec<String> = item
                .select(&IMG_SEL)
                .filter_map(|img| image_src(&img))
                .filter_map(|src| resolve(base, &src))
                .collect();
            if !name.is_empty() || !icons.is_empty() {
                raw.push((name, icons));
            }
        }
    }

    // Site-wide scan: icons labelled with an amenity keyword, wherever they
    // sit in the page.
    for img in doc.select(&IMG_SEL) {
        let label = format!(
            "{} {}",
            img.value().attr("alt").unwrap_or_default(),
            img.value().attr("title").unwrap_or_default()
        )
        .to_lowercase();
        if let Some(keyword) = AMENITY_KEYWORDS.iter().find(|k| label.contains(**k)) {
            if let Some(src) = image_src(&img).and_then(|s| resolve(base, &s)) {
                raw.push((keyword.to_string(), vec![src]));
            }
        }
    }
    for svg in doc.select(&SVG_SEL) {
        let label = format!(
            "{} {}",
            svg.value().attr("title").unwrap_or_default(),
            svg.value().attr("aria-label").unwrap_or_default()
        )
        .to_lowercase();
        if let Some(keyword) = AMENITY_KEYWORDS.iter().find(|k| label.contains(**k)) {
            raw.push((keyword.to_string(), Vec::new()));
        }
    }

    merge(raw, synonyms)
}

/// Sections whose class/id or preceding heading suggests amenities.
fn amenity_sections<'a>(doc: &'a Html) -> Vec<ElementRef<'a>> {
    let mut sections: Vec<ElementRef<'a>> = doc.select(&SECTION_SEL).collect();

    for heading in doc.select(&HEADING_SEL) {
        let text: String = heading.text().collect::<Vec<_>>().join(" ").to_lowercase();
        if text.contains("amenit") || text.contains("facilit") || text.contains("features") {
            if let Some(parent) = heading.parent().and_then(ElementRef::wrap) {
                if !sections.iter().any(|s| s.id() == parent.id()) {
                    sections.push(parent);
                }
            }
        }
    }

    sections
}

fn image_src(img: &ElementRef) -> Option<String> {
    ["src", "data-src", "data-lazy"]
        .iter()
        .find_map(|attr| img.value().attr(attr))
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(|u| u.to_string())
}

/// Lowercase, non-alphanumeric → space, whitespace collapsed.
pub fn normalize_name(raw: &str) -> String {
    let mapped: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn merge(raw: Vec<(String, Vec<String>)>, synonyms: &SynonymTable) -> Vec<AmenityCandidate> {
    let mut out: Vec<AmenityCandidate> = Vec::new();

    for (name, icons) in raw {
        let normalized = normalize_name(&name);
        if normalized.is_empty() && icons.is_empty() {
            continue;
        }
        // Exact table hits adopt the canonical text wholesale; substring hits
        // merge under the canonical key but keep the page's own wording.
        let (key, display, mapped) = match synonyms.canonical_exact(&normalized) {
            Some(canonical) => (canonical.to_string(), canonical.to_string(), true),
            None => match synonyms.canonical(&normalized) {
                Some(canonical) => (canonical.to_string(), name.trim().to_string(), false),
                None => (normalized.clone(), name.trim().to_string(), false),
            },
        };

        if let Some(existing) = out.iter_mut().find(|c| c.key == key) {
            for icon in icons {
                if !existing.icon_urls.contains(&icon) {
                    existing.icon_urls.push(icon);
                }
            }
        } else {
            out.push(AmenityCandidate {
                key,
                display,
                mapped,
                icon_urls: icons,
            });
        }
    }

    out
}
