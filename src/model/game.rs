use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use super::assets::Assets;

/// Play statistics, kept both per game and per file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayStats {
    pub play_count: u32,
    pub play_time: Duration,
    pub last_played: Option<DateTime<Utc>>,
}

/// Display name derived from a file name: the stem with `_` and `.` turned
/// into spaces.
pub fn pretty_file_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .replace(['_', '.'], " ")
}

/// A single launchable file of a game.
#[derive(Debug)]
pub struct GameFile {
    path: PathBuf,
    pub name: String,
    pub stats: PlayStats,
}

impl GameFile {
    /// `path` should already be canonical; the record never re-resolves it.
    pub fn new(path: PathBuf) -> Self {
        let name = pretty_file_name(&path);
        Self {
            path,
            name,
            stats: PlayStats::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One logical playable title.
#[derive(Debug)]
pub struct Game {
    pub title: String,
    pub summary: String,
    pub description: String,

    /// When set, the game is launched with this command instead of a file.
    pub launch_cmd: Option<String>,
    pub launch_workdir: Option<PathBuf>,
    files: Vec<GameFile>,

    pub player_count: u32,
    pub is_favorite: bool,
    pub rating: f32,
    pub release_date: Option<NaiveDate>,
    pub stats: PlayStats,

    pub developers: Vec<String>,
    pub publishers: Vec<String>,
    pub genres: Vec<String>,

    pub assets: Assets,
    /// Unrecognised `x-` metadata keys, such as catalog ids.
    pub extra: BTreeMap<String, String>,
}

impl Game {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: String::new(),
            description: String::new(),
            launch_cmd: None,
            launch_workdir: None,
            files: Vec::new(),
            player_count: 1,
            is_favorite: false,
            rating: 0.0,
            release_date: None,
            stats: PlayStats::default(),
            developers: Vec::new(),
            publishers: Vec::new(),
            genres: Vec::new(),
            assets: Assets::default(),
            extra: BTreeMap::new(),
        }
    }

    /// A game for a single file, titled after the file name.
    pub fn from_file(path: PathBuf) -> Self {
        let file = GameFile::new(path);
        let mut game = Self::new(file.name.clone());
        game.files.push(file);
        game
    }

    pub fn files(&self) -> &[GameFile] {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&GameFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Add a file unless one with the same path is already there.
    pub fn add_file(&mut self, file: GameFile) -> bool {
        if self.file(&file.path).is_some() {
            return false;
        }
        self.files.push(file);
        true
    }

    /// A virtual game has no files and is launched through its command.
    pub fn is_virtual(&self) -> bool {
        self.files.is_empty()
    }

    pub fn has_launch_cmd(&self) -> bool {
        self.launch_cmd.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// Fold `other` into this record in place.
    ///
    /// Non-empty scalars from `other` win, lists are extended without
    /// duplicates, files are added when new and explicit assets overwrite.
    pub fn merge_from(&mut self, other: Game) {
        let defaults = Game::new("");
        if !other.title.is_empty() {
            self.title = other.title;
        }
        if !other.summary.is_empty() {
            self.summary = other.summary;
        }
        if !other.description.is_empty() {
            self.description = other.description;
        }
        if other.launch_cmd.is_some() {
            self.launch_cmd = other.launch_cmd;
        }
        if other.launch_workdir.is_some() {
            self.launch_workdir = other.launch_workdir;
        }
        if other.player_count != defaults.player_count {
            self.player_count = other.player_count;
        }
        self.is_favorite |= other.is_favorite;
        if other.rating != defaults.rating {
            self.rating = other.rating;
        }
        if other.release_date.is_some() {
            self.release_date = other.release_date;
        }

        extend_unique(&mut self.developers, other.developers);
        extend_unique(&mut self.publishers, other.publishers);
        extend_unique(&mut self.genres, other.genres);

        for file in other.files {
            self.add_file(file);
        }
        self.assets.merge_from(other.assets);
        self.extra.extend(other.extra);
    }
}

/// Append the values of `src` that are non-empty and not yet in `dst`.
pub fn extend_unique(dst: &mut Vec<String>, src: impl IntoIterator<Item = String>) {
    for item in src {
        let item = item.trim().to_string();
        if !item.is_empty() && !dst.contains(&item) {
            dst.push(item);
        }
    }
}
