use std::collections::HashMap;

use tracing::debug;

use crate::extract::amenities::AmenityCandidate;
use crate::extract::news::NewsEntry;
use crate::record::{Amenity, AMENITIES_FOLDER};

/// Filename noise that leaks into amenity names when they were derived from
/// icon files rather than page text.
const NOISE_TOKENS: &[&str] = &[
    "area", "img", "image", "cotta", "terra", "lobby", "hall", "saloon", "salon", "clubhouse",
    "club",
];

/// Identifying strings stripped from amenity names: builder/project ids and
/// display names, matched case-insensitively.
pub struct CleanupContext {
    strip: Vec<String>,
}

impl CleanupContext {
    pub fn new(parts: &[&str]) -> Self {
        Self {
            strip: parts
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| p.len() >= 3)
                .collect(),
        }
    }
}

/// Link amenity candidates to downloaded icon files and produce the final
/// amenity list. Runs after downloads, when filenames are known.
pub fn link_amenities(
    candidates: &[AmenityCandidate],
    url_to_path: &HashMap<String, String>,
    amenity_files: &[String],
    ctx: &CleanupContext,
) -> Vec<Amenity> {
    let mut out = Vec::new();

    for candidate in candidates {
        let icon = match_file(
            &candidate.icon_urls,
            &[&candidate.key, &candidate.display],
            url_to_path,
            amenity_files,
            AMENITIES_FOLDER,
        );

        let name = clean_name(&candidate.display, ctx, !candidate.mapped);
        if name.is_empty() && icon.is_none() {
            debug!("Dropping amenity candidate {:?}", candidate.display);
            continue;
        }

        out.push(Amenity {
            name: if name.is_empty() { None } else { Some(name) },
            icon,
        });
    }

    out
}

/// Resolve each news entry's image to a saved filename in the news folder.
/// Returned pairs are (entry id, relative path or None).
pub fn link_news_images(
    entries: &[NewsEntry],
    url_to_path: &HashMap<String, String>,
    news_files: &[String],
) -> Vec<(String, Option<String>)> {
    entries
        .iter()
        .map(|entry| {
            let resolved = match_file(
                &entry.image_urls,
                &[&entry.id],
                url_to_path,
                news_files,
                "news",
            );
            (entry.id.clone(), resolved)
        })
        .collect()
}

/// Three-tier match: direct URL map hit, then filename containment of a key,
/// then best token-intersection score with at least one shared token.
fn match_file(
    captured_urls: &[String],
    keys: &[&str],
    url_to_path: &HashMap<String, String>,
    files: &[String],
    folder: &str,
) -> Option<String> {
    // (a) a captured URL was downloaded and landed in this folder
    for url in captured_urls {
        if let Some(path) = url_to_path.get(url) {
            if path.starts_with(&format!("{}/", folder)) {
                return Some(path.clone());
            }
        }
    }

    // (b) a filename contains the key outright
    for file in files {
        let squashed_file = squash(file);
        if keys
            .iter()
            .map(|k| squash(k))
            .filter(|k| !k.is_empty())
            .any(|k| squashed_file.contains(&k))
        {
            return Some(format!("{}/{}", folder, file));
        }
    }

    // (c) token overlap scoring
    let key_tokens: Vec<String> = keys
        .iter()
        .flat_map(|k| tokens(k))
        .collect();
    let mut best: Option<(usize, &String)> = None;
    for file in files {
        let file_tokens = tokens(file);
        let score = file_tokens
            .iter()
            .filter(|t| key_tokens.contains(t))
            .count();
        if score > 0 && best.map(|(s, _)| score > s).unwrap_or(true) {
            best = Some((score, file));
        }
    }
    best.map(|(_, file)| format!("{}/{}", folder, file))
}

/// Lowercase alphanumeric only, for containment checks.
fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Name tokens for intersection scoring. Short tokens and pure digit runs
/// (including the hash prefix) carry no signal and are dropped.
fn tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| t.len() >= 3 && !t.chars().all(|c| c.is_ascii_hexdigit()))
        .map(String::from)
        .collect()
}

/// Final amenity name cleanup: strip identifying substrings, optionally
/// strip noise tokens, collapse separators, title-case. Noise stripping is
/// skipped for names the synonym table curated.
pub fn clean_name(raw: &str, ctx: &CleanupContext, strip_noise: bool) -> String {
    let mut lower = raw.to_lowercase();
    for strip in &ctx.strip {
        while let Some(idx) = lower.find(strip.as_str()) {
            lower.replace_range(idx..idx + strip.len(), " ");
        }
    }

    let words: Vec<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .filter(|w| !strip_noise || !NOISE_TOKENS.contains(w))
        .collect();

    words
        .iter()
        .map(|w| title_case(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
