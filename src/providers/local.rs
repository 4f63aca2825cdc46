//! Collections declared in metadata text files inside the configured
//! directories.

mod files;
mod media;
mod metadata;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::model::{Game, GameFile, pretty_file_name};
use crate::search::SearchContext;

use super::Provider;
use metadata::{GameDraft, MetadataFile};

pub struct LocalProvider {
    directories: Vec<PathBuf>,
    settings: LibrarySettings,
    /// Canonical directories in which a metadata file was found.
    metadata_dirs: Vec<PathBuf>,
}

impl LocalProvider {
    pub fn new(directories: Vec<PathBuf>, settings: LibrarySettings) -> Self {
        Self {
            directories,
            settings,
            metadata_dirs: Vec::new(),
        }
    }

    /// The first recognised metadata file directly inside `dir`.
    fn metadata_file_in(&self, dir: &Path) -> Option<PathBuf> {
        self.settings
            .metadata_files
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
    }

    fn process_dir(&mut self, dir: &Path, ctx: &mut SearchContext) {
        let Some(meta_path) = self.metadata_file_in(dir) else {
            info!(
                "Collections: No metadata file found in `{}`, directory ignored",
                dir.display()
            );
            return;
        };
        info!("Collections: found `{}`", meta_path.display());

        let root = match fs::canonicalize(dir) {
            Ok(root) => root,
            Err(e) => {
                warn!("Collections: cannot resolve `{}`: {e}", dir.display());
                return;
            }
        };
        if !self.metadata_dirs.contains(&root) {
            self.metadata_dirs.push(root.clone());
        }

        let mut parsed = metadata::parse(&meta_path, &root, ctx);
        let drafts = std::mem::take(&mut parsed.games);
        for draft in drafts {
            commit_game(draft, &parsed, ctx);
        }

        for name in &parsed.collections {
            let Some(coll) = ctx.collection(name) else {
                continue;
            };
            let found = files::collect(coll, &root, &self.settings.metadata_files, &self.settings);
            let mut created = 0;
            for path in found {
                let idx = match ctx.game_index(&path) {
                    Some(idx) => idx,
                    None => {
                        created += 1;
                        ctx.add_game(Game::from_file(path))
                    }
                };
                ctx.add_to_collection(name, idx);
            }
            debug!(
                "Collections: `{name}` has {} games ({created} new from files)",
                ctx.collection_children(name).len()
            );
        }
    }

    /// Media root for a game file: the deepest metadata directory containing
    /// it, else the file's own directory.
    fn media_root_for(&self, file: &Path) -> Option<PathBuf> {
        self.metadata_dirs
            .iter()
            .filter(|d| file.starts_with(d))
            .max_by_key(|d| d.components().count())
            .cloned()
            .or_else(|| file.parent().map(Path::to_path_buf))
    }
}

/// Register a parsed game block, merging into an existing record when one of
/// its files is already known. Virtual games are matched by title within the
/// same metadata directory.
fn commit_game(draft: GameDraft, meta: &MetadataFile, ctx: &mut SearchContext) {
    let GameDraft {
        line,
        mut game,
        files,
        collection,
        assets,
    } = draft;

    let mut paths = Vec::new();
    for rel in &files {
        match fs::canonicalize(meta.dir.join(rel)) {
            Ok(p) if p.is_file() => {
                if !paths.contains(&p) {
                    paths.push(p);
                }
            }
            _ => meta.warn(line, format!("file `{rel}` not found, ignored")),
        }
    }

    if game.title.is_empty() {
        match paths.first() {
            Some(first) => game.title = pretty_file_name(first),
            None => {
                meta.warn(line, "game has no title and no files, ignored");
                return;
            }
        }
    }

    if let Some(dir) = game.launch_workdir.take() {
        game.launch_workdir = Some(meta.dir.join(dir));
    }

    for (kind, value) in assets {
        if !game.assets.set_from_directive(kind, &value, &meta.dir) {
            meta.warn(line, format!("asset `{value}` not found, ignored"));
        }
    }

    let idx = if paths.is_empty() {
        if !game.has_launch_cmd() {
            let inherited = collection
                .as_deref()
                .and_then(|c| ctx.collection(c))
                .and_then(|c| c.launch_cmd.clone());
            match inherited {
                Some(cmd) => game.launch_cmd = Some(cmd),
                None => {
                    meta.warn(
                        line,
                        format!(
                            "game `{}` has no files and no launch command, ignored",
                            game.title
                        ),
                    );
                    return;
                }
            }
        }
        match ctx.virtual_game_index(&meta.dir, &game.title) {
            Some(idx) => {
                if let Some(existing) = ctx.game_mut(idx) {
                    existing.merge_from(game);
                }
                idx
            }
            None => {
                let title = game.title.clone();
                let idx = ctx.add_game(game);
                ctx.register_virtual(meta.dir.clone(), title, idx);
                idx
            }
        }
    } else {
        match paths.iter().find_map(|p| ctx.game_index(p)) {
            Some(idx) => {
                if let Some(existing) = ctx.game_mut(idx) {
                    existing.merge_from(game);
                }
                for path in paths {
                    if !ctx.add_file_to_game(idx, GameFile::new(path.clone())) {
                        meta.warn(
                            line,
                            format!("`{}` already belongs to another game", path.display()),
                        );
                    }
                }
                idx
            }
            None => {
                for path in paths {
                    game.add_file(GameFile::new(path));
                }
                ctx.add_game(game)
            }
        }
    };

    if let Some(name) = collection {
        ctx.add_to_collection(&name, idx);
    }
}

/// Member games without their own command take the collection's.
fn inherit_launch_defaults(ctx: &mut SearchContext) {
    let defaults: Vec<(Vec<usize>, Option<String>, Option<PathBuf>)> = ctx
        .collections()
        .values()
        .filter(|c| c.launch_cmd.is_some() || c.launch_workdir.is_some())
        .map(|c| {
            (
                ctx.collection_children(c.name()).to_vec(),
                c.launch_cmd.clone(),
                c.launch_workdir.clone(),
            )
        })
        .collect();

    for (children, cmd, workdir) in defaults {
        for idx in children {
            let Some(game) = ctx.game_mut(idx) else {
                continue;
            };
            if !game.has_launch_cmd() && cmd.is_some() {
                game.launch_cmd = cmd.clone();
            }
            if game.launch_workdir.is_none() && workdir.is_some() {
                game.launch_workdir = workdir.clone();
            }
        }
    }
}

impl Provider for LocalProvider {
    fn name(&self) -> &'static str {
        "Collections"
    }

    fn find_lists(&mut self, ctx: &mut SearchContext) {
        let dirs = self.directories.clone();
        for dir in &dirs {
            self.process_dir(dir, ctx);
        }
        inherit_launch_defaults(ctx);
    }

    fn find_static_data(&mut self, ctx: &mut SearchContext) {
        let mut filled = 0;
        for idx in 0..ctx.games().len() {
            let files: Vec<PathBuf> = match ctx.game(idx) {
                Some(game) => game.files().iter().map(|f| f.path().to_path_buf()).collect(),
                None => continue,
            };
            for file in files {
                let Some(root) = self.media_root_for(&file) else {
                    continue;
                };
                let Some(media_dir) = media::media_dir_for(&file, &root) else {
                    continue;
                };
                if let Some(game) = ctx.game_mut(idx) {
                    filled += media::add_from_dir(&mut game.assets, &media_dir);
                }
            }
        }
        debug!("Collections: {filled} assets found in media directories");
    }
}
