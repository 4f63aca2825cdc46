use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::model::{Collection, FileFilter};

/// Directory under a collection root that holds media, never games.
pub(super) const MEDIA_DIR: &str = "media";

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
}

/// Does `filter` select the file? `path` is canonical, `rel` is relative to
/// the scanned root and is what regexes are matched against.
fn matches(filter: &FileFilter, path: &Path, rel: &Path) -> bool {
    if filter.files.iter().any(|f| f == path) {
        return true;
    }
    if let Some(ext) = extension_of(path) {
        if filter.extensions.iter().any(|e| *e == ext) {
            return true;
        }
    }
    match (&filter.regex, rel.to_str()) {
        (Some(re), Some(rel)) => re.is_match(rel),
        _ => false,
    }
}

/// Canonical paths of every file belonging to `coll`, sorted.
///
/// `root` is the metadata directory; the collection's extra directories are
/// scanned the same way. Explicitly listed files are always included.
pub(super) fn collect(
    coll: &Collection,
    root: &Path,
    metadata_files: &[String],
    settings: &LibrarySettings,
) -> Vec<PathBuf> {
    let mut found: BTreeSet<PathBuf> = coll.include.files.iter().cloned().collect();

    let has_walk_filter = !coll.include.extensions.is_empty() || coll.include.regex.is_some();
    if !has_walk_filter {
        return found.into_iter().collect();
    }

    let mut roots = vec![root.to_path_buf()];
    roots.extend(coll.directories.iter().cloned());
    roots.dedup();

    for scan_root in &roots {
        let mut walker = WalkDir::new(scan_root).follow_links(settings.follow_links);
        if let Some(d) = settings.max_depth {
            walker = walker.max_depth(d);
        }

        let media = scan_root.join(MEDIA_DIR);
        for entry in walker
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || ((settings.include_hidden || !is_hidden(e.path())) && e.path() != media)
            })
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if entry.depth() == 1
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| metadata_files.iter().any(|m| m == n))
            {
                continue;
            }

            let Ok(canonical) = fs::canonicalize(path) else {
                continue;
            };
            let rel = path.strip_prefix(scan_root).unwrap_or(path);
            if matches(&coll.include, &canonical, rel) && !matches(&coll.exclude, &canonical, rel) {
                found.insert(canonical);
            }
        }
    }

    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"x").unwrap();
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        let root = fs::canonicalize(root).unwrap();
        paths
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn metadata_names() -> Vec<String> {
        LibrarySettings::default().metadata_files
    }

    #[test]
    fn collects_by_extension_recursively_and_skips_media_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.ext");
        touch(dir.path(), "sub/b.EXT");
        touch(dir.path(), "media/a/box_front.ext");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "metadata.txt");

        let mut coll = Collection::new("c");
        coll.include.extensions = vec!["ext".into(), "txt".into()];
        let got = collect(&coll, dir.path(), &metadata_names(), &LibrarySettings::default());

        assert_eq!(names(&got, dir.path()), vec!["a.ext", "notes.txt", "sub/b.EXT"]);
    }

    #[test]
    fn exclusions_win_over_inclusions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "keep.ext");
        touch(dir.path(), "drop.ext");
        touch(dir.path(), "bios.ext");

        let mut coll = Collection::new("c");
        coll.include.extensions = vec!["ext".into()];
        coll.exclude.files = vec![fs::canonicalize(dir.path().join("drop.ext")).unwrap()];
        coll.exclude.regex = Some(Regex::new("^bios").unwrap());
        let got = collect(&coll, dir.path(), &metadata_names(), &LibrarySettings::default());

        assert_eq!(names(&got, dir.path()), vec!["keep.ext"]);
    }

    #[test]
    fn regex_matches_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "9999-in-1.ext");
        touch(dir.path(), "single.ext");

        let mut coll = Collection::new("c");
        coll.include.regex = Some(Regex::new(r"\d+-in-\d+").unwrap());
        let got = collect(&coll, dir.path(), &metadata_names(), &LibrarySettings::default());

        assert_eq!(names(&got, dir.path()), vec!["9999-in-1.ext"]);
    }

    #[test]
    fn no_walk_filter_means_only_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.ext");
        touch(dir.path(), "b.ext");

        let mut coll = Collection::new("c");
        coll.include.files = vec![fs::canonicalize(dir.path().join("b.ext")).unwrap()];
        let got = collect(&coll, dir.path(), &metadata_names(), &LibrarySettings::default());

        assert_eq!(names(&got, dir.path()), vec!["b.ext"]);
    }

    #[test]
    fn hidden_files_are_skipped_by_default() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".hidden.ext");
        touch(dir.path(), ".cache/inner.ext");
        touch(dir.path(), "visible.ext");

        let mut coll = Collection::new("c");
        coll.include.extensions = vec!["ext".into()];
        let got = collect(&coll, dir.path(), &metadata_names(), &LibrarySettings::default());
        assert_eq!(names(&got, dir.path()), vec!["visible.ext"]);

        let settings = LibrarySettings {
            include_hidden: true,
            ..LibrarySettings::default()
        };
        let got = collect(&coll, dir.path(), &metadata_names(), &settings);
        assert_eq!(got.len(), 3);
    }
}
