use std::path::Path;

use anyhow::{Context, Result};

/// Built-in canonical synonym table: normalized raw text → canonical display
/// name. Order matters for the substring tier, so more specific entries come
/// before the short generic ones they contain (e.g. "car parking" before
/// "parking", "parking" before "park").
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("swimming pool", "SWIMMING POOL"),
    ("infinity pool", "SWIMMING POOL"),
    ("kids pool", "KIDS POOL"),
    ("pool", "SWIMMING POOL"),
    ("gymnasium", "GYMNASIUM"),
    ("gym", "GYMNASIUM"),
    ("fitness", "GYMNASIUM"),
    ("clubhouse", "CLUB HOUSE"),
    ("club house", "CLUB HOUSE"),
    ("club", "CLUB HOUSE"),
    ("car parking", "CAR PARKING"),
    ("visitor parking", "CAR PARKING"),
    ("parking", "CAR PARKING"),
    ("cctv", "24X7 SECURITY"),
    ("security", "24X7 SECURITY"),
    ("elevator", "LIFT"),
    ("lift", "LIFT"),
    ("kids play", "CHILDREN PLAY AREA"),
    ("children play", "CHILDREN PLAY AREA"),
    ("playground", "CHILDREN PLAY AREA"),
    ("play area", "CHILDREN PLAY AREA"),
    ("landscaped garden", "LANDSCAPED GARDEN"),
    ("garden", "LANDSCAPED GARDEN"),
    ("school", "SCHOOL"),
    ("hospital", "HOSPITAL"),
    ("spa", "SPA"),
    ("squash", "SQUASH COURT"),
    ("tennis", "TENNIS COURT"),
    ("badminton", "BADMINTON COURT"),
    ("basketball", "BASKETBALL COURT"),
    ("jogging", "JOGGING TRACK"),
    ("cycling", "CYCLING TRACK"),
    ("meditation", "MEDITATION ZONE"),
    ("yoga", "YOGA DECK"),
    ("pet", "PET PARK"),
    ("amphitheatre", "AMPHITHEATRE"),
    ("amphitheater", "AMPHITHEATRE"),
    ("indoor games", "INDOOR GAMES"),
    ("multipurpose", "MULTIPURPOSE COURT"),
    ("senior citizen", "SENIOR CITIZEN AREA"),
    ("power backup", "POWER BACKUP"),
    ("rainwater", "RAINWATER HARVESTING"),
];

/// The fixed mapping from normalized raw amenity text to a standardized
/// display name. The compiled-in table is the default; a user-supplied JSON
/// map can extend or override it.
pub struct SynonymTable {
    entries: Vec<(String, String)>,
}

impl SynonymTable {
    pub fn builtin() -> Self {
        Self {
            entries: DEFAULT_SYNONYMS
                .iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Merge a `{"raw text": "CANONICAL NAME"}` JSON map over the builtin
    /// table. User entries are consulted first.
    pub fn with_overrides(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read synonym file {}", path.display()))?;
        let map: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&raw).context("Synonym file is not a string-to-string map")?;

        let mut entries: Vec<(String, String)> = map
            .into_iter()
            .map(|(raw, canonical)| (raw.to_lowercase(), canonical))
            .collect();
        entries.extend(Self::builtin().entries);
        Ok(Self { entries })
    }

    /// Exact-match tier only. Callers that matched here can adopt the
    /// canonical name as the display text outright.
    pub fn canonical_exact(&self, normalized: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(raw, _)| raw == normalized)
            .map(|(_, canonical)| canonical.as_str())
    }

    /// Look up a normalized amenity name: exact match first, then substring
    /// containment in either direction. Returns the canonical display name.
    pub fn canonical(&self, normalized: &str) -> Option<&str> {
        if normalized.is_empty() {
            return None;
        }
        if let Some(canonical) = self.canonical_exact(normalized) {
            return Some(canonical);
        }
        self.entries
            .iter()
            .find(|(raw, _)| normalized.contains(raw.as_str()) || raw.contains(normalized))
            .map(|(_, canonical)| canonical.as_str())
    }
}
