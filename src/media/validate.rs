use std::path::Path;

/// Smallest byte count accepted for an extension with no known signature.
const MIN_UNKNOWN_SIZE: u64 = 32;

/// Check leading bytes against the signature the extension promises.
/// `head` is the first chunk of the file (512 bytes is enough for every
/// signature checked here).
pub fn matches_signature(ext: &str, head: &[u8], total_len: u64) -> bool {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "jpg" | "jpeg" => head.starts_with(&[0xFF, 0xD8]),
        "png" => head.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "webp" => head.len() >= 12 && &head[0..4] == b"RIFF" && &head[8..12] == b"WEBP",
        "gif" => head.starts_with(b"GIF"),
        "svg" => {
            let text = String::from_utf8_lossy(head);
            text.contains("<svg") || text.trim_start().starts_with("<?xml")
        }
        "pdf" => head.starts_with(b"%PDF"),
        _ => total_len >= MIN_UNKNOWN_SIZE,
    }
}

/// Dotfiles, AppleDouble companions and Finder droppings.
pub fn is_os_artifact(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("._")
}

/// Validate a file already on disk by its own extension.
pub fn is_valid_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if is_os_artifact(name) {
        return false;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    let Ok(bytes) = read_head(path, 512) else {
        return false;
    };
    matches_signature(ext, &bytes, meta.len())
}

fn read_head(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    use std::io::Read;
    let mut file = std::fs::File::open(path)?;
    let mut buf = vec![0u8; limit];
    let n = file.read(&mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    #[test]
    fn signatures() {
        assert!(matches_signature("png", PNG, PNG.len() as u64));
        assert!(matches_signature(".jpg", &[0xFF, 0xD8, 0xFF, 0xE0], 4));
        assert!(matches_signature("pdf", b"%PDF-1.7", 8));
        assert!(matches_signature("gif", b"GIF89a", 6));
        assert!(matches_signature("svg", b"<svg xmlns=\"...\">", 17));
        assert!(matches_signature("svg", b"<?xml version=\"1.0\"?><svg>", 26));
        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBP");
        assert!(matches_signature("webp", &webp, 12));
    }

    #[test]
    fn mismatches() {
        assert!(!matches_signature("png", b"GIF89a", 6));
        assert!(!matches_signature("jpg", PNG, PNG.len() as u64));
        assert!(!matches_signature("pdf", b"<html>", 6));
    }

    #[test]
    fn unknown_ext_size_gate() {
        assert!(matches_signature("bin", &[0u8; 64], 64));
        assert!(!matches_signature("bin", &[0u8; 8], 8));
    }

    #[test]
    fn artifacts() {
        assert!(is_os_artifact(".DS_Store"));
        assert!(is_os_artifact("._photo.jpg"));
        assert!(is_os_artifact(".hidden"));
        assert!(!is_os_artifact("photo.jpg"));
    }

    #[test]
    fn file_validation() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.png");
        std::fs::write(&good, PNG).unwrap();
        assert!(is_valid_file(&good));

        let bad = dir.path().join("b.png");
        std::fs::write(&bad, b"not a png").unwrap();
        assert!(!is_valid_file(&bad));

        let artifact = dir.path().join(".DS_Store");
        std::fs::write(&artifact, b"junk").unwrap();
        assert!(!is_valid_file(&artifact));
    }
}
