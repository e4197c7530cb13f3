use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

const RERA_MAX_LEN: usize = 60;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

// Primary battery: patterns applied to the located highlights block, in
// order, first capture wins per field. The battery runs over uppercased text.
static RERA_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"RERA[\s.:\-]*(?:REGN\.?\s*NO|NUMBER|NO)?[\s.:\-]*([A-Z0-9][A-Z0-9/\-]*)"])
});
static ACRES_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d{1,3}(?:\.\d+)?)\s*ACRES?\b",
        r"(\d{1,3}(?:\.\d+)?)\s*AC\b",
        r"LAND\s+AREA[^0-9]{0,20}(\d{1,3}(?:\.\d+)?)",
    ])
});
static TOWERS_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"(\d{1,3})\s*(?:HIGH[\s\-]?RISE\s+)?(?:TOWERS?|BLOCKS?|BUILDINGS?)\b"])
});
static FLOORS_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    // G+N beats a plain floor count
    compile(&[r"G\s*\+\s*(\d{1,3})", r"(\d{1,3})\s*(?:FLOORS?|STOREYS?)\b"])
});
static UNITS_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d{1,5})\s*(?:UNITS?|FLATS?|APARTMENTS?|HOUSES?|RESIDENCES?)\b",
        r"TOTAL\s+(\d{2,5})\b",
    ])
});
static OPEN_SPACE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(\d{1,2}(?:\.\d+)?)\s*%\s*(?:OF\s+)?OPEN\s+SPACE",
        r"OPEN\s+SPACE[^0-9%]{0,20}(\d{1,2}(?:\.\d+)?)\s*%?",
    ])
});

// Fallback-only battery for the full-body pass: the same facts phrased with
// the keyword before the number ("Total Acres: 12.5").
static ACRES_FALLBACK: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"ACRES?[^0-9]{0,10}(\d{1,3}(?:\.\d+)?)"]));
static TOWERS_FALLBACK: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"TOWERS?[^0-9]{0,10}(\d{1,3})\b"]));
static FLOORS_FALLBACK: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"FLOORS?[^0-9]{0,10}(\d{1,3})\b"]));
static UNITS_FALLBACK: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"(?:UNITS?|FLATS?|APARTMENTS?)[^0-9]{0,10}(\d{1,5})\b"]));

static CONFIG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}(?:\.\d)?)\s*BHK").unwrap());
static SIZES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{3,5}(?:\.\d+)?(?:\s*[-–]\s*\d{3,5}(?:\.\d+)?)?)\s*(SQ\.?\s?FT|SQFT|SQ\.?\s?M\b|SQM|M2)")
        .unwrap()
});

static HIGHLIGHT_HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static HIGHLIGHT_CLASS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class*='highlight'], [id*='highlight']").unwrap());
static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Numeric and summary facts pulled out of the key-highlights block.
/// Unmatched fields stay empty; extraction misses are not errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlights {
    pub rera_number: String,
    pub total_acres: String,
    pub total_towers: String,
    pub total_floors: String,
    pub total_units: String,
    pub config: String,
    pub unit_sizes: String,
    pub open_space_percent: String,
}

/// Locate the key-highlights content. Returns the text block if any layer
/// found one, plus the URL of a highlights image for the OCR fallback layer.
pub fn find_highlights(doc: &Html) -> (Option<String>, Option<String>) {
    // Layer 1: a heading whose text names the highlights, then its container.
    for heading in doc.select(&HIGHLIGHT_HEADING_SEL) {
        let text: String = heading.text().collect::<Vec<_>>().join(" ");
        let lower = text.to_lowercase();
        if lower.contains("highlight") || lower.contains("key facts") {
            if let Some(parent) = heading.parent().and_then(scraper::ElementRef::wrap) {
                let block = element_text(&parent);
                if !block.trim().is_empty() {
                    return (Some(block), None);
                }
            }
        }
    }

    // Layer 2: any element whose class or id mentions highlights.
    if let Some(el) = doc.select(&HIGHLIGHT_CLASS_SEL).next() {
        let block = element_text(&el);
        if !block.trim().is_empty() {
            return (Some(block), None);
        }
    }

    // Layer 3: an image that looks like a rendered highlights panel, left to
    // the caller's OCR capability.
    for img in doc.select(&IMG_SEL) {
        let src = img.value().attr("src").unwrap_or_default();
        let alt = img.value().attr("alt").unwrap_or_default();
        let haystack = format!("{} {}", src, alt).to_lowercase();
        if haystack.contains("highlight") || haystack.contains("key") {
            if !src.is_empty() {
                return (None, Some(src.to_string()));
            }
        }
    }

    (None, None)
}

fn element_text(el: &scraper::ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Run the primary battery over a highlights text block.
pub fn parse_highlights(text: &str) -> Highlights {
    let upper = text.to_uppercase();
    let mut h = Highlights {
        rera_number: first_capture(&upper, &RERA_RULES)
            .map(|v| normalize_rera(&v))
            .unwrap_or_default(),
        total_acres: first_capture(&upper, &ACRES_RULES).unwrap_or_default(),
        total_towers: first_capture(&upper, &TOWERS_RULES).unwrap_or_default(),
        total_floors: first_capture(&upper, &FLOORS_RULES).unwrap_or_default(),
        total_units: first_capture(&upper, &UNITS_RULES).unwrap_or_default(),
        open_space_percent: first_capture(&upper, &OPEN_SPACE_RULES).unwrap_or_default(),
        ..Default::default()
    };
    h.config = extract_config(&upper);
    h.unit_sizes = extract_unit_sizes(&upper);
    h
}

/// Second, independent pass over the full page body: broader keyword-adjacent
/// patterns, filling only fields still empty.
pub fn fill_missing(h: &mut Highlights, body: &str) {
    let upper = body.to_uppercase();
    let fill = |slot: &mut String, primary: &[Regex], fallback: &[Regex]| {
        if slot.is_empty() {
            *slot = first_capture(&upper, primary)
                .or_else(|| first_capture(&upper, fallback))
                .unwrap_or_default();
        }
    };

    fill(&mut h.total_acres, &ACRES_RULES, &ACRES_FALLBACK);
    fill(&mut h.total_towers, &TOWERS_RULES, &TOWERS_FALLBACK);
    fill(&mut h.total_floors, &FLOORS_RULES, &FLOORS_FALLBACK);
    fill(&mut h.total_units, &UNITS_RULES, &UNITS_FALLBACK);
    fill(&mut h.open_space_percent, &OPEN_SPACE_RULES, &[]);

    if h.rera_number.is_empty() {
        h.rera_number = first_capture(&upper, &RERA_RULES)
            .map(|v| normalize_rera(&v))
            .unwrap_or_default();
    }
    if h.config.is_empty() {
        h.config = extract_config(&upper);
    }
    if h.unit_sizes.is_empty() {
        h.unit_sizes = extract_unit_sizes(&upper);
    }
}

fn first_capture(text: &str, rules: &[Regex]) -> Option<String> {
    rules
        .iter()
        .find_map(|re| re.captures(text).map(|caps| caps[1].trim().to_string()))
        .filter(|v| !v.is_empty())
}

/// Every BHK occurrence, deduplicated in first-seen order, comma-joined.
fn extract_config(upper: &str) -> String {
    let mut seen = Vec::new();
    for caps in CONFIG_RE.captures_iter(upper) {
        let label = format!("{} BHK", &caps[1]);
        if !seen.contains(&label) {
            seen.push(label);
        }
    }
    seen.join(", ")
}

/// Every size range or single value with a recognized unit, semicolon-joined.
fn extract_unit_sizes(upper: &str) -> String {
    let mut seen = Vec::new();
    for caps in SIZES_RE.captures_iter(upper) {
        let range = caps[1].split_whitespace().collect::<Vec<_>>().join("");
        let unit = caps[2]
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        let entry = format!("{} {}", range.replace('–', "-"), unit);
        if !seen.contains(&entry) {
            seen.push(entry);
        }
    }
    seen.join("; ")
}

/// Bound the RERA value: drop anything from a following heading onward and
/// cap the length.
fn normalize_rera(raw: &str) -> String {
    let mut value = raw.trim().to_string();
    if let Some(idx) = value.to_uppercase().find("KEY HIGHLIGHT") {
        value.truncate(idx);
    }
    let value = value.trim().to_string();
    value.chars().take(RERA_MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_block_example() {
        let text = "Total Acres: 12.5, G+40, 450 Units, RERA No. P123/2024";
        let mut h = parse_highlights(text);
        fill_missing(&mut h, text);
        assert_eq!(h.total_floors, "40");
        assert_eq!(h.total_units, "450");
        assert_eq!(h.rera_number, "P123/2024");
        assert_eq!(h.total_acres, "12.5");
    }

    #[test]
    fn number_before_keyword() {
        let h = parse_highlights("Spread over 25 acres with 8 high rise towers and 1200 flats");
        assert_eq!(h.total_acres, "25");
        assert_eq!(h.total_towers, "8");
        assert_eq!(h.total_units, "1200");
    }

    #[test]
    fn g_plus_beats_plain_floors() {
        let h = parse_highlights("G+32 structure, each tower 33 floors");
        assert_eq!(h.total_floors, "32");
    }

    #[test]
    fn single_digit_unit_count() {
        let h = parse_highlights("8 units across 2 towers");
        assert_eq!(h.total_units, "8");
        assert_eq!(h.total_towers, "2");
    }

    #[test]
    fn units_total_fallback() {
        let h = parse_highlights("Total 940 across the development");
        assert_eq!(h.total_units, "940");
    }

    #[test]
    fn config_dedup_and_decimals() {
        let h = parse_highlights("2 BHK, 2.5 BHK and 3 BHK. Premium 2 BHK also available.");
        assert_eq!(h.config, "2 BHK, 2.5 BHK, 3 BHK");
    }

    #[test]
    fn unit_sizes_ranges() {
        let h = parse_highlights("Sizes from 1150 - 1480 sqft and 2100 sq.ft penthouses");
        assert_eq!(h.unit_sizes, "1150-1480 sqft; 2100 sqft");
    }

    #[test]
    fn open_space_percent() {
        let h = parse_highlights("80% open space across the township");
        assert_eq!(h.open_space_percent, "80");
    }

    #[test]
    fn rera_markers() {
        assert_eq!(parse_highlights("RERA Regn No: TG-123-456").rera_number, "TG-123-456");
        assert_eq!(parse_highlights("RERA: A52100").rera_number, "A52100");
        assert_eq!(parse_highlights("rera number P02400005678").rera_number, "P02400005678");
    }

    #[test]
    fn rera_bound() {
        let long = format!("RERA No {}", "X".repeat(100));
        let h = parse_highlights(&long);
        assert!(h.rera_number.len() <= 60);
        assert!(!h.rera_number.to_uppercase().contains("KEY HIGHLIGHT"));
    }

    #[test]
    fn fill_missing_keeps_existing() {
        let mut h = parse_highlights("12 Acres");
        fill_missing(&mut h, "totally different page claiming 99 acres and 500 flats");
        assert_eq!(h.total_acres, "12");
        assert_eq!(h.total_units, "500");
    }

    #[test]
    fn misses_leave_fields_empty() {
        let h = parse_highlights("a page about nothing in particular");
        assert_eq!(h, Highlights::default());
    }

    #[test]
    fn find_highlights_by_heading() {
        let html = r#"<div><h2>Key Highlights</h2><p>24 Acres</p></div>"#;
        let doc = Html::parse_document(html);
        let (text, img) = find_highlights(&doc);
        assert!(text.unwrap().contains("24 Acres"));
        assert!(img.is_none());
    }

    #[test]
    fn find_highlights_by_class() {
        let html = r#"<div class="project-highlights">G+18, 240 Units</div>"#;
        let doc = Html::parse_document(html);
        let (text, _) = find_highlights(&doc);
        assert!(text.unwrap().contains("240 Units"));
    }

    #[test]
    fn find_highlights_image_fallback() {
        let html = r#"<p>welcome</p><img src="/img/key-highlights.png" alt="">"#;
        let doc = Html::parse_document(html);
        let (text, img) = find_highlights(&doc);
        assert!(text.is_none());
        assert_eq!(img.as_deref(), Some("/img/key-highlights.png"));
    }
}
