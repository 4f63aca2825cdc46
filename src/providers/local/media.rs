use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{AssetKind, Assets};

use super::files::MEDIA_DIR;

/// `<root>/media/<file path relative to root, without extension>`.
pub(super) fn media_dir_for(file: &Path, root: &Path) -> Option<PathBuf> {
    let rel = file.strip_prefix(root).ok()?;
    let rel = rel.with_extension("");
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(root.join(MEDIA_DIR).join(rel))
}

/// The kind a media file provides, judged by its stem and extension.
///
/// Multi kinds also take numbered variants such as `screenshot_02`.
pub(super) fn kind_of(path: &Path) -> Option<AssetKind> {
    let stem = path.file_stem()?.to_str()?.to_ascii_lowercase();
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    AssetKind::ALL.into_iter().find(|kind| {
        if !kind.media_type().extensions().contains(&ext.as_str()) {
            return false;
        }
        let base = kind.file_stem();
        if stem == base {
            return true;
        }
        kind.is_multi()
            && stem
                .strip_prefix(base)
                .map(|rest| rest.trim_start_matches(['_', '-', 's']))
                .is_some_and(|rest| rest.is_empty() || rest.chars().all(|c| c.is_ascii_digit()))
    })
}

/// Tentatively add every recognised file of `media_dir` to `assets`.
/// Returns how many slots were filled.
pub(super) fn add_from_dir(assets: &mut Assets, media_dir: &Path) -> usize {
    let Ok(read) = fs::read_dir(media_dir) else {
        return 0;
    };
    let mut files: Vec<PathBuf> = read
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    let mut added = 0;
    for file in files {
        let Some(kind) = kind_of(&file) else {
            continue;
        };
        let file = fs::canonicalize(&file).unwrap_or(file);
        if assets.add_file_maybe(kind, &file) {
            added += 1;
        }
    }
    added
}
