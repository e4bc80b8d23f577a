//! Loading slide decks described by a JSON manifest.
//!
//! A manifest is a JSON array with one entry per presentation video:
//! ```json
//! [
//!   { "video_url": "https://example.com/watch?v=abc", "slides": { "1": "abc_1.png", "2": "abc_2.png" } }
//! ]
//! ```
//! Slide filenames are relative to a slides directory supplied by the caller.

use std::{
    cmp::Ordering,
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestError {
    #[error("Manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read manifest {}: {err}", .path.display())]
    Io { path: PathBuf, err: String },

    #[error("Failed to parse manifest {}: {err}", .path.display())]
    Parse { path: PathBuf, err: String },
}

/// One presentation video and the slides shown in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub video_url: String,

    /// Slide key to image filename. Keys are usually slide numbers.
    #[serde(default)]
    pub slides: BTreeMap<String, String>,
}

impl ManifestEntry {
    /// Slide filenames in deck order. Numeric keys come first in numeric order, any other keys
    /// follow in lexicographic order.
    pub fn ordered_slides(&self) -> Vec<&str> {
        let mut keyed = self.slides.iter().collect::<Vec<_>>();
        keyed.sort_by(|(k1, _), (k2, _)| deck_order(k1, k2));
        keyed.into_iter().map(|(_k, filename)| filename.as_str()).collect()
    }

    /// Paths of the slide images in deck order.
    pub fn slide_paths(&self, slides_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        self.ordered_slides()
            .into_iter()
            .map(|filename| slides_dir.as_ref().join(filename))
            .collect()
    }
}

fn deck_order(k1: &str, k2: &str) -> Ordering {
    match (k1.trim().parse::<u64>(), k2.trim().parse::<u64>()) {
        (Ok(n1), Ok(n2)) => n1.cmp(&n2).then_with(|| k1.cmp(k2)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => k1.cmp(k2),
    }
}

/// Read the manifest at `path`.
///
/// # Errors
/// Returns [`ManifestError::NotFound`] if there is no file at `path`, or
/// [`ManifestError::Parse`] if the file is not a valid manifest.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestEntry>, ManifestError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ManifestError::Io {
        path: path.to_path_buf(),
        err: e.to_string(),
    })?;

    parse_manifest(&contents).map_err(|e| ManifestError::Parse {
        path: path.to_path_buf(),
        err: e.to_string(),
    })
}

fn parse_manifest(contents: &str) -> Result<Vec<ManifestEntry>, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Every slide file referenced by `entries` that does not exist in `slides_dir`.
pub fn missing_slides(entries: &[ManifestEntry], slides_dir: impl AsRef<Path>) -> Vec<PathBuf> {
    entries
        .iter()
        .flat_map(|entry| entry.slide_paths(slides_dir.as_ref()))
        .filter(|path| !path.exists())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    const MANIFEST: &str = r#"[
        {
            "video_url": "https://example.com/watch?v=lecture1",
            "slides": { "10": "l1_10.png", "2": "l1_2.png", "1": "l1_1.png", "appendix": "l1_a.png" }
        },
        { "video_url": "https://example.com/watch?v=lecture2" }
    ]"#;

    #[test]
    fn test_parse() {
        let entries = parse_manifest(MANIFEST).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].slides.len(), 4);
        assert!(entries[1].slides.is_empty());
    }

    #[test]
    fn test_slides_are_in_natural_order() {
        let entries = parse_manifest(MANIFEST).unwrap();
        assert_eq!(
            entries[0].ordered_slides(),
            vec!["l1_1.png", "l1_2.png", "l1_10.png", "l1_a.png"]
        );

        let paths = entries[0].slide_paths("deck");
        assert_eq!(paths[0], Path::new("deck").join("l1_1.png"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = load_manifest(dir.path().join("video_url.json"));
        assert!(matches!(res, Err(ManifestError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_url.json");
        std::fs::write(&path, "{ \"video_url\": ").unwrap();

        let res = load_manifest(&path);
        assert!(matches!(res, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn test_missing_slides() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("video_url.json");
        std::fs::write(&manifest_path, MANIFEST).unwrap();
        std::fs::write(dir.path().join("l1_1.png"), b"").unwrap();
        std::fs::write(dir.path().join("l1_10.png"), b"").unwrap();

        let entries = load_manifest(&manifest_path).unwrap();
        let missing = missing_slides(&entries, dir.path());

        assert_eq!(
            missing,
            vec![dir.path().join("l1_2.png"), dir.path().join("l1_a.png")]
        );
    }
}
