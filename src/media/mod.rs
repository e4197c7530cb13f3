pub mod classify;
pub mod discover;
pub mod validate;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::fetch;
use crate::record::DISK_FOLDERS;

const HASH_PREFIX_LEN: usize = 12;
const BASENAME_MAX: usize = 40;

const KNOWN_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "webp", "gif", "svg", "ico", "pdf", "bin",
];

/// The project's media directory: nine fixed folders, hash-addressed
/// filenames, writes skipped when identical content already exists.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Create the media root and every folder, empty folders included.
    pub fn create(root: &Path) -> Result<Self> {
        for folder in DISK_FOLDERS {
            std::fs::create_dir_all(root.join(folder))
                .with_context(|| format!("Failed to create media folder {}", folder))?;
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pre-pass before each run: delete OS artifacts and files whose bytes
    /// no longer match their extension.
    pub fn clean_artifacts(&self) -> Result<usize> {
        let mut removed = 0;
        for folder in DISK_FOLDERS {
            let dir = self.root.join(folder);
            for entry in std::fs::read_dir(&dir)
                .with_context(|| format!("Failed to read folder {}", dir.display()))?
            {
                let path = entry?.path();
                if path.is_file() && !validate::is_valid_file(&path) {
                    warn!("Removing invalid media file {}", path.display());
                    std::fs::remove_file(&path)?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    /// Valid files currently in a folder, sorted by name.
    pub fn list_valid(&self, folder: &str) -> Vec<String> {
        let dir = self.root.join(folder);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && validate::is_valid_file(p))
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect();
        names.sort();
        names
    }

    /// Persist one asset into its folder. Returns the relative path
    /// `<folder>/<filename>` and whether bytes were actually written.
    ///
    /// A file whose name starts with the same hash prefix is reused as-is,
    /// which keeps output stable across runs even when the basename portion
    /// would differ.
    pub fn save(&self, folder: &str, url: &str, bytes: &[u8], ext: &str) -> Result<(String, bool)> {
        let hash = hash_prefix(bytes);

        if let Some(existing) = self.existing_with_prefix(folder, &hash) {
            return Ok((format!("{}/{}", folder, existing), false));
        }

        let filename = match sanitize_basename(url) {
            Some(base) => format!("{}-{}{}", hash, base, ext),
            None => format!("{}{}", hash, ext),
        };
        let dest = self.root.join(folder).join(&filename);
        if !dest.exists() {
            std::fs::write(&dest, bytes)
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            return Ok((format!("{}/{}", folder, filename), true));
        }
        Ok((format!("{}/{}", folder, filename), false))
    }

    fn existing_with_prefix(&self, folder: &str, hash: &str) -> Option<String> {
        let dir = self.root.join(folder);
        std::fs::read_dir(dir).ok()?.flatten().find_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if name.starts_with(hash) {
                Some(name)
            } else {
                None
            }
        })
    }
}

/// 12 hex chars of the SHA-256 of the content: the dedup key.
pub fn hash_prefix(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)[..HASH_PREFIX_LEN].to_string()
}

/// Derive a safe basename from the URL's last path segment: lowercase
/// alphanumeric/underscore, capped, None when nothing usable survives.
pub fn sanitize_basename(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    // Strip scheme and authority so a bare host never becomes a basename.
    let path = match without_query.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => without_query,
    };
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    let stem = segment.rsplit_once('.').map(|(s, _)| s).unwrap_or(segment);

    let mapped: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let cleaned = mapped.trim_matches('_');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }
    Some(cleaned.chars().take(BASENAME_MAX).collect())
}

/// Extension from the URL path when recognizable, else from the declared
/// content type, else `.bin`.
pub fn extension_for(url: &str, content_type: Option<&str>) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if let Some((_, ext)) = path.rsplit('/').next().and_then(|seg| seg.rsplit_once('.')) {
        let lower = ext.to_lowercase();
        if KNOWN_EXTENSIONS.contains(&lower.as_str()) {
            return format!(".{}", lower);
        }
    }
    match content_type.unwrap_or_default() {
        "image/png" => ".png".into(),
        "image/jpeg" | "image/jpg" => ".jpg".into(),
        "image/webp" => ".webp".into(),
        "image/gif" => ".gif".into(),
        "image/svg+xml" => ".svg".into(),
        "application/pdf" => ".pdf".into(),
        _ => ".bin".into(),
    }
}

/// Outcome of the download pass. `url_to_path` feeds the amenity/news
/// resolver; the counters feed the end-of-run summary.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub url_to_path: HashMap<String, String>,
    pub saved: usize,
    pub reused: usize,
    pub skipped: usize,
}

/// Fetch and persist every discovered URL, sequentially. Per-URL failures
/// (network, non-2xx, bad signature) log and skip; the loop never aborts.
pub async fn download_all(client: &Client, store: &MediaStore, urls: &[String]) -> DownloadSummary {
    let mut summary = DownloadSummary::default();

    let pb = ProgressBar::new(urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    for url in urls {
        pb.inc(1);
        let asset = match fetch::fetch_asset(client, url).await {
            Ok(asset) => asset,
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                summary.skipped += 1;
                continue;
            }
        };

        let ext = extension_for(url, asset.content_type.as_deref());
        let head_len = asset.bytes.len().min(512);
        if !validate::matches_signature(&ext, &asset.bytes[..head_len], asset.bytes.len() as u64) {
            warn!("Skipping {}: content does not match {}", url, ext);
            summary.skipped += 1;
            continue;
        }

        let folder = classify::classify(url);
        match store.save(folder, url, &asset.bytes, &ext) {
            Ok((rel_path, written)) => {
                debug!("{} -> {}", url, rel_path);
                if written {
                    summary.saved += 1;
                } else {
                    summary.reused += 1;
                }
                summary.url_to_path.insert(url.clone(), rel_path);
            }
            Err(e) => {
                warn!("Failed to store {}: {}", url, e);
                summary.skipped += 1;
            }
        }
    }

    pb.finish_and_clear();
    summary
}
