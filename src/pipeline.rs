use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::assemble;
use crate::extract::{self, highlights, synonyms::SynonymTable};
use crate::fetch;
use crate::geo;
use crate::media::{self, MediaStore};
use crate::ocr::OcrEngine;
use crate::record::{self, KeyProjectDetails, ProjectRecord, AMENITIES_FOLDER};
use crate::resolve::{self, CleanupContext};

/// One pipeline invocation: one builder, one project, one page.
pub struct ScrapeJob {
    pub builder_id: String,
    pub project_id: String,
    pub url: String,
    pub data_root: PathBuf,
    pub synonyms: Option<PathBuf>,
}

pub struct ScrapeSummary {
    pub details_path: PathBuf,
    pub fields_filled: usize,
    pub amenities: usize,
    pub news_linked: usize,
    pub assets_saved: usize,
    pub assets_reused: usize,
    pub assets_skipped: usize,
}

/// Run the pipeline inside an error boundary: per-item failures are handled
/// inside the phases, and anything that still propagates triggers a
/// best-effort partial write before the error surfaces.
pub async fn run(
    client: &Client,
    job: &ScrapeJob,
    ocr: Option<&dyn OcrEngine>,
) -> Result<ScrapeSummary> {
    let details_path = record::details_path(&job.data_root, &job.builder_id, &job.project_id);
    let mut partial = ProjectRecord::default();

    match run_inner(client, job, ocr, &mut partial).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            warn!("Scrape failed, persisting partial state: {}", e);
            assemble::write_partial(&details_path, &partial);
            Err(e)
        }
    }
}

async fn run_inner(
    client: &Client,
    job: &ScrapeJob,
    ocr: Option<&dyn OcrEngine>,
    partial: &mut ProjectRecord,
) -> Result<ScrapeSummary> {
    let base = Url::parse(&job.url).with_context(|| format!("Invalid URL {}", job.url))?;
    let synonyms = match &job.synonyms {
        Some(path) => SynonymTable::with_overrides(path)?,
        None => SynonymTable::builtin(),
    };

    let media_root = record::media_root(&job.data_root, &job.builder_id, &job.project_id);
    let store = MediaStore::create(&media_root)?;
    let removed = store.clean_artifacts()?;
    if removed > 0 {
        info!("Removed {} invalid files from {}", removed, media_root.display());
    }

    info!("Fetching {}", job.url);
    let html = fetch::fetch_page(client, &job.url).await?;
    let scan = extract::scan_page(&html, &base, &synonyms);

    let mut details = KeyProjectDetails {
        builder_id: job.builder_id.clone(),
        builder_name: humanize(&job.builder_id),
        project_id: job.project_id.clone(),
        project_name: scan
            .project_name
            .clone()
            .unwrap_or_else(|| humanize(&job.project_id)),
        description: scan.description.clone().unwrap_or_default(),
        source_url: job.url.clone(),
        ..Default::default()
    };

    if let Some((lat, lng)) = scan.map_coords {
        details.latitude = Some(lat);
        details.longitude = Some(lng);
        if let Some(address) = geo::reverse_geocode(client, lat, lng).await {
            details.city = address.city.unwrap_or_default();
            details.location = address.location.unwrap_or_default();
            info!("Resolved location: {} / {}", details.location, details.city);
        }
    }

    let highlight_text = match &scan.highlights_text {
        Some(text) => Some(text.clone()),
        None => ocr_highlight_text(client, &scan.highlight_image_url, ocr).await,
    };
    let mut facts = highlight_text
        .as_deref()
        .map(highlights::parse_highlights)
        .unwrap_or_default();
    highlights::fill_missing(&mut facts, &scan.body_text);

    details.rera_number = facts.rera_number;
    details.total_acres = facts.total_acres;
    details.total_towers = facts.total_towers;
    details.total_floors = facts.total_floors;
    details.total_units = facts.total_units.clone();
    details.total_flats = facts.total_units;
    details.config = facts.config;
    details.unit_sizes = facts.unit_sizes;
    details.open_space_percent = facts.open_space_percent;

    let fields_filled = [
        &details.rera_number,
        &details.total_acres,
        &details.total_towers,
        &details.total_floors,
        &details.total_units,
        &details.config,
        &details.unit_sizes,
        &details.open_space_percent,
    ]
    .iter()
    .filter(|v| !v.is_empty())
    .count();

    partial.key_project_details = details.clone();

    info!("Discovered {} media URLs", scan.media_urls.len());
    let downloads = media::download_all(client, &store, &scan.media_urls).await;

    let cleanup = CleanupContext::new(&[
        job.builder_id.as_str(),
        job.project_id.as_str(),
        details.builder_name.as_str(),
        details.project_name.as_str(),
    ]);
    let amenity_files = store.list_valid(AMENITIES_FOLDER);
    let amenities = resolve::link_amenities(
        &scan.amenities,
        &downloads.url_to_path,
        &amenity_files,
        &cleanup,
    );

    let news_files = store.list_valid("news");
    let news_links = resolve::link_news_images(&scan.news, &downloads.url_to_path, &news_files);
    for (id, image) in &news_links {
        debug!("news entry {} -> {:?}", id, image);
    }
    let news_linked = news_links.iter().filter(|(_, image)| image.is_some()).count();

    let record = assemble::build_record(
        Utc::now().to_rfc3339(),
        details,
        amenities,
        &downloads.url_to_path,
        &store,
    );
    *partial = record.clone();

    let details_path = record::details_path(&job.data_root, &job.builder_id, &job.project_id);
    assemble::write_record(&details_path, &record)?;

    Ok(ScrapeSummary {
        details_path,
        fields_filled,
        amenities: record.amenities.len(),
        news_linked,
        assets_saved: downloads.saved,
        assets_reused: downloads.reused,
        assets_skipped: downloads.skipped,
    })
}

/// OCR fallback for the highlights layer. Absent engines, fetch errors and
/// OCR failures all fall through silently to the body-text pass.
async fn ocr_highlight_text(
    client: &Client,
    image_url: &Option<String>,
    ocr: Option<&dyn OcrEngine>,
) -> Option<String> {
    let url = image_url.as_ref()?;
    let engine = ocr?;
    let asset = match fetch::fetch_asset(client, url).await {
        Ok(asset) => asset,
        Err(e) => {
            debug!("Highlight image fetch failed: {}", e);
            return None;
        }
    };
    ocr_text(engine, url, &asset.bytes)
}

fn ocr_text(engine: &dyn OcrEngine, url: &str, bytes: &[u8]) -> Option<String> {
    match engine.extract_text(bytes) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            debug!("OCR failed on {}: {}", url, e);
            None
        }
    }
}

/// "acme_builders" → "Acme Builders", for ids used as display names.
fn humanize(id: &str) -> String {
    id.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
