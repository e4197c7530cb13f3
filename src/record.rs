use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Media folders that surface as top-level arrays in the canonical record.
pub const RECORD_FOLDERS: &[&str] = &[
    "logos",
    "floor_plans",
    "brochures",
    "banners",
    "photos",
    "layouts",
    "news",
    "documents",
];

/// Amenity icons live in their own folder but are referenced only through
/// `Amenity::icon` paths, never as a top-level array.
pub const AMENITIES_FOLDER: &str = "amenities";

/// Every folder created under the media root.
pub const DISK_FOLDERS: &[&str] = &[
    "amenities",
    "logos",
    "floor_plans",
    "brochures",
    "banners",
    "photos",
    "layouts",
    "news",
    "documents",
];

/// Canonical identifying and descriptive facts for one project.
///
/// All numeric facts are kept as strings: the source pages mix integers,
/// decimals and ranges, and an unmatched field is the empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyProjectDetails {
    pub builder_id: String,
    pub builder_name: String,
    pub project_id: String,
    pub project_name: String,
    pub description: String,
    pub location: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub source_url: String,
    pub scraped_at: String,
    pub rera_number: String,
    pub total_acres: String,
    pub total_towers: String,
    pub total_floors: String,
    pub total_units: String,
    pub total_flats: String,
    pub config: String,
    pub unit_sizes: String,
    /// Always present, empty when unknown. Old records stored this under
    /// `flats_density`; the alias migrates them and the legacy key is never
    /// written back.
    #[serde(alias = "flats_density")]
    pub flats_per_acre: String,
    pub open_space_percent: String,
    pub builder_logo: String,
    pub project_logo: String,
}

/// One amenity in the final record. `icon` is a relative media path into the
/// amenities folder, or null when no file could be linked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Amenity {
    pub name: Option<String>,
    pub icon: Option<String>,
}

/// The canonical output document. The typed struct is the allow-list: only
/// these keys can ever serialize, and unknown keys in old records are dropped
/// on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    #[serde(rename = "scrapedAt")]
    pub scraped_at: String,
    pub key_project_details: KeyProjectDetails,
    pub amenities: Vec<Amenity>,
    pub logos: Vec<String>,
    #[serde(alias = "floorplans", alias = "floor-plans")]
    pub floor_plans: Vec<String>,
    pub brochures: Vec<String>,
    pub banners: Vec<String>,
    pub photos: Vec<String>,
    pub layouts: Vec<String>,
    pub news: Vec<String>,
    pub documents: Vec<String>,
}

impl ProjectRecord {
    pub fn folder(&self, name: &str) -> Option<&Vec<String>> {
        match name {
            "logos" => Some(&self.logos),
            "floor_plans" => Some(&self.floor_plans),
            "brochures" => Some(&self.brochures),
            "banners" => Some(&self.banners),
            "photos" => Some(&self.photos),
            "layouts" => Some(&self.layouts),
            "news" => Some(&self.news),
            "documents" => Some(&self.documents),
            _ => None,
        }
    }

    pub fn folder_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "logos" => Some(&mut self.logos),
            "floor_plans" => Some(&mut self.floor_plans),
            "brochures" => Some(&mut self.brochures),
            "banners" => Some(&mut self.banners),
            "photos" => Some(&mut self.photos),
            "layouts" => Some(&mut self.layouts),
            "news" => Some(&mut self.news),
            "documents" => Some(&mut self.documents),
            _ => None,
        }
    }
}

/// `<dataRoot>/<builderId>/<projectId>`
pub fn project_dir(data_root: &Path, builder_id: &str, project_id: &str) -> PathBuf {
    data_root.join(builder_id).join(project_id)
}

/// `<dataRoot>/<builderId>/<projectId>/<projectId>-details.json`
pub fn details_path(data_root: &Path, builder_id: &str, project_id: &str) -> PathBuf {
    project_dir(data_root, builder_id, project_id).join(format!("{}-details.json", project_id))
}

/// `<dataRoot>/<builderId>/<projectId>/media`
pub fn media_root(data_root: &Path, builder_id: &str, project_id: &str) -> PathBuf {
    project_dir(data_root, builder_id, project_id).join("media")
}
