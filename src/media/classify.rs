use crate::extract::amenities::AMENITY_KEYWORDS;
use crate::record::DISK_FOLDERS;

const FLOOR_PLAN_WORDS: &[&str] = &["floor", "plan"];
const BANNER_WORDS: &[&str] = &["banner", "hero", "slide", "carousel"];
// "icon" is deliberately not here: a bare icon classifies as an amenity
// asset, and only logo/favicon/brand pull it into logos first.
const LOGO_WORDS: &[&str] = &["logo", "favicon", "brand"];

/// Assign a discovered URL to exactly one media folder. Pure string
/// heuristics over the lowercased URL, so repeated runs always agree.
pub fn classify(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    let path = lower.split(['?', '#']).next().unwrap_or(&lower).to_string();

    // An explicit folder name in the path wins outright.
    for folder in DISK_FOLDERS {
        if path.contains(folder) {
            return folder;
        }
    }

    if FLOOR_PLAN_WORDS.iter().any(|w| lower.contains(w)) {
        return "floor_plans";
    }
    if lower.contains("brochure") || path.ends_with(".pdf") {
        return "brochures";
    }
    if BANNER_WORDS.iter().any(|w| lower.contains(w)) {
        return "banners";
    }
    if LOGO_WORDS.iter().any(|w| lower.contains(w)) {
        return "logos";
    }
    if lower.contains("layout") {
        return "layouts";
    }
    if AMENITY_KEYWORDS.iter().any(|w| lower.contains(w)) || lower.contains("icon") {
        return "amenities";
    }
    "photos"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_folder_in_path() {
        assert_eq!(classify("https://x.com/media/brochures/a.jpg"), "brochures");
        assert_eq!(classify("https://x.com/floor_plans/t1.png"), "floor_plans");
        assert_eq!(classify("https://x.com/amenities/x.png"), "amenities");
    }

    #[test]
    fn keyword_groups_in_order() {
        assert_eq!(classify("https://x.com/img/tower-a-floorplan.png"), "floor_plans");
        assert_eq!(classify("https://x.com/files/project.pdf"), "brochures");
        assert_eq!(classify("https://x.com/img/hero-shot.jpg"), "banners");
        assert_eq!(classify("https://x.com/assets/favicon.ico"), "logos");
        assert_eq!(classify("https://x.com/img/site-layout.jpg"), "layouts");
        assert_eq!(classify("https://x.com/img/gym.svg"), "amenities");
        assert_eq!(classify("https://x.com/img/sunset.jpg"), "photos");
    }

    #[test]
    fn floor_beats_brochure() {
        assert_eq!(classify("https://x.com/floor-plan-brochure.pdf"), "floor_plans");
    }

    #[test]
    fn logo_beats_bare_icon() {
        assert_eq!(classify("https://x.com/img/logo-icon.png"), "logos");
        assert_eq!(classify("https://x.com/img/arrow-icon.png"), "amenities");
    }

    #[test]
    fn pdf_query_string_ignored_for_extension() {
        assert_eq!(classify("https://x.com/download?file=a.pdf"), "photos");
        assert_eq!(classify("https://x.com/download/a.pdf?v=2"), "brochures");
    }

    #[test]
    fn deterministic() {
        let url = "https://x.com/assets/pool-icon.png";
        let first = classify(url);
        for _ in 0..5 {
            assert_eq!(classify(url), first);
        }
    }
}
