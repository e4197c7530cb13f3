use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::media::MediaStore;
use crate::record::{Amenity, KeyProjectDetails, ProjectRecord, RECORD_FOLDERS};

/// Merge every phase output into the canonical record. The typed
/// `ProjectRecord` is the top-level allow-list; helper data that never
/// belongs in the output simply has nowhere to go.
pub fn build_record(
    scraped_at: String,
    mut details: KeyProjectDetails,
    amenities: Vec<Amenity>,
    url_to_path: &HashMap<String, String>,
    store: &MediaStore,
) -> ProjectRecord {
    details.scraped_at = scraped_at.clone();

    let mut record = ProjectRecord {
        scraped_at,
        amenities,
        ..Default::default()
    };

    for path in url_to_path.values() {
        let Some((folder, _name)) = path.split_once('/') else {
            continue;
        };
        if let Some(entries) = record.folder_mut(folder) {
            if !entries.contains(path) {
                entries.push(path.clone());
            }
        }
    }

    // The JSON must reflect true on-disk state: folders the download pass
    // left empty are reseeded from whatever valid files already exist.
    for folder in RECORD_FOLDERS {
        let entries = record
            .folder_mut(folder)
            .expect("RECORD_FOLDERS entries are always addressable");
        if entries.is_empty() {
            *entries = store
                .list_valid(folder)
                .into_iter()
                .map(|name| format!("{}/{}", folder, name))
                .collect();
        }
        entries.sort();
    }

    if let Some(first) = record.logos.first() {
        let second = record.logos.get(1).unwrap_or(first);
        details.builder_logo = basename(first).to_string();
        details.project_logo = basename(second).to_string();
    }

    if details.flats_per_acre.is_empty() {
        details.flats_per_acre = derive_flats_per_acre(&details.total_units, &details.total_acres);
    }

    record.key_project_details = details;
    record
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Units per acre to one decimal, empty when either side is unknown.
fn derive_flats_per_acre(total_units: &str, total_acres: &str) -> String {
    let units: f64 = match total_units.parse() {
        Ok(v) => v,
        Err(_) => return String::new(),
    };
    let acres: f64 = match total_acres.parse() {
        Ok(v) if v > 0.0 => v,
        _ => return String::new(),
    };
    format!("{:.1}", units / acres)
}

/// Write the canonical record, creating parent directories as needed.
pub fn write_record(path: &Path, record: &ProjectRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Best-effort persistence of whatever state exists when the run is dying.
/// Never fails: the original error is the one worth reporting.
pub fn write_partial(path: &Path, record: &ProjectRecord) {
    match write_record(path, record) {
        Ok(()) => info!("Partial record saved to {}", path.display()),
        Err(e) => error!("Could not save partial record: {}", e),
    }
}

pub fn load_record(path: &Path) -> Result<ProjectRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::create(dir.path()).unwrap();
        (dir, store)
    }

    fn build(
        url_to_path: &HashMap<String, String>,
        store: &MediaStore,
        details: KeyProjectDetails,
    ) -> ProjectRecord {
        build_record(
            "2026-08-30T00:00:00Z".to_string(),
            details,
            Vec::new(),
            url_to_path,
            store,
        )
    }

    #[test]
    fn downloaded_paths_land_in_their_arrays() {
        let (_dir, store) = store();
        let mut map = HashMap::new();
        map.insert("u1".to_string(), "logos/aaa-logo.png".to_string());
        map.insert("u2".to_string(), "photos/bbb-view.jpg".to_string());
        map.insert("u3".to_string(), "amenities/ccc-pool.svg".to_string());
        let record = build(&map, &store, KeyProjectDetails::default());
        assert_eq!(record.logos, vec!["logos/aaa-logo.png"]);
        assert_eq!(record.photos, vec!["photos/bbb-view.jpg"]);
        // amenity icons are not a top-level array
        assert!(serde_json::to_value(&record)
            .unwrap()
            .get("amenities_files")
            .is_none());
    }

    #[test]
    fn empty_folders_reseed_from_disk() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("banners/abc123-old.png"), PNG).unwrap();
        let record = build(&HashMap::new(), &store, KeyProjectDetails::default());
        assert_eq!(record.banners, vec!["banners/abc123-old.png"]);
        assert!(record.photos.is_empty());
    }

    #[test]
    fn reseed_skips_invalid_files() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("photos/junk.png"), b"nope").unwrap();
        let record = build(&HashMap::new(), &store, KeyProjectDetails::default());
        assert!(record.photos.is_empty());
    }

    #[test]
    fn logo_designation() {
        let (_dir, store) = store();
        let mut map = HashMap::new();
        map.insert("u1".to_string(), "logos/aaa-builder.png".to_string());
        map.insert("u2".to_string(), "logos/bbb-project.png".to_string());
        let record = build(&map, &store, KeyProjectDetails::default());
        assert_eq!(record.key_project_details.builder_logo, "aaa-builder.png");
        assert_eq!(record.key_project_details.project_logo, "bbb-project.png");
    }

    #[test]
    fn single_logo_designates_both() {
        let (_dir, store) = store();
        let mut map = HashMap::new();
        map.insert("u1".to_string(), "logos/aaa-only.png".to_string());
        let record = build(&map, &store, KeyProjectDetails::default());
        assert_eq!(record.key_project_details.builder_logo, "aaa-only.png");
        assert_eq!(record.key_project_details.project_logo, "aaa-only.png");
    }

    #[test]
    fn flats_per_acre_derived() {
        let (_dir, store) = store();
        let details = KeyProjectDetails {
            total_units: "450".to_string(),
            total_acres: "12.5".to_string(),
            ..Default::default()
        };
        let record = build(&HashMap::new(), &store, details);
        assert_eq!(record.key_project_details.flats_per_acre, "36.0");
    }

    #[test]
    fn flats_per_acre_present_even_when_unknown() {
        let (_dir, store) = store();
        let record = build(&HashMap::new(), &store, KeyProjectDetails::default());
        assert_eq!(record.key_project_details.flats_per_acre, "");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["key_project_details"]
            .as_object()
            .unwrap()
            .contains_key("flats_per_acre"));
    }

    #[test]
    fn write_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/skyline-details.json");
        let record = ProjectRecord {
            scraped_at: "2026-08-30T00:00:00Z".to_string(),
            ..Default::default()
        };
        write_record(&path, &record).unwrap();
        let loaded = load_record(&path).unwrap();
        assert_eq!(loaded.scraped_at, record.scraped_at);
    }
}
