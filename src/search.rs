//! The shared accumulator of one aggregation run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::{Collection, Game, GameFile};

/// Games, collections and the de-duplication indices built by the providers.
///
/// Game indices are positions in an append-only list, so they stay valid for
/// the whole run and are the only way records refer to games.
#[derive(Debug, Default)]
pub struct SearchContext {
    games: Vec<Game>,
    path_to_game: HashMap<PathBuf, usize>,
    virtual_games: HashMap<(PathBuf, String), usize>,
    collections: HashMap<String, Collection>,
    collection_children: HashMap<String, Vec<usize>>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, idx: usize) -> Option<&Game> {
        self.games.get(idx)
    }

    pub fn game_mut(&mut self, idx: usize) -> Option<&mut Game> {
        self.games.get_mut(idx)
    }

    /// Index of the game owning the canonical `path`.
    pub fn game_index(&self, path: &Path) -> Option<usize> {
        self.path_to_game.get(path).copied()
    }

    /// Index of the file-less game titled `title` declared in the metadata
    /// directory `origin`.
    pub fn virtual_game_index(&self, origin: &Path, title: &str) -> Option<usize> {
        self.virtual_games
            .get(&(origin.to_path_buf(), title.to_string()))
            .copied()
    }

    /// Record `idx` as the file-less game `title` of `origin`. The first
    /// registration of a key wins.
    pub fn register_virtual(&mut self, origin: PathBuf, title: String, idx: usize) -> bool {
        if idx >= self.games.len() {
            return false;
        }
        *self.virtual_games.entry((origin, title)).or_insert(idx) == idx
    }

    pub fn path_index(&self) -> &HashMap<PathBuf, usize> {
        &self.path_to_game
    }

    /// Append a game and register its files.
    ///
    /// Callers are expected to have checked for an existing record first; a
    /// file already owned by another game keeps its original owner.
    pub fn add_game(&mut self, game: Game) -> usize {
        let idx = self.games.len();
        let paths: Vec<PathBuf> = game.files().iter().map(|f| f.path().to_path_buf()).collect();
        self.games.push(game);

        for path in paths {
            self.register_path(path, idx);
        }
        idx
    }

    /// Map `path` to `idx`. A path keeps the first index it was given.
    pub fn register_path(&mut self, path: PathBuf, idx: usize) -> bool {
        if idx >= self.games.len() {
            return false;
        }
        match self.path_to_game.get(&path) {
            Some(&existing) => existing == idx,
            None => {
                self.path_to_game.insert(path, idx);
                true
            }
        }
    }

    /// Add a file to an existing game and index it.
    pub fn add_file_to_game(&mut self, idx: usize, file: GameFile) -> bool {
        let path = file.path().to_path_buf();
        if self.path_to_game.get(&path).is_some_and(|&owner| owner != idx) {
            return false;
        }
        match self.games.get_mut(idx) {
            Some(game) => {
                game.add_file(file);
                self.register_path(path, idx)
            }
            None => false,
        }
    }

    pub fn collections(&self) -> &HashMap<String, Collection> {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// The collection called `name`, created on first use.
    pub fn collection_entry(&mut self, name: &str) -> &mut Collection {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name))
    }

    /// Member indices of a collection, in insertion order.
    pub fn collection_children(&self, name: &str) -> &[usize] {
        self.collection_children
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_children(&self, name: &str) -> bool {
        self.collection_children.contains_key(name)
    }

    /// Add a game to a collection once. Unknown indices are rejected.
    pub fn add_to_collection(&mut self, name: &str, idx: usize) -> bool {
        if idx >= self.games.len() {
            return false;
        }
        self.collection_entry(name);
        let children = self.collection_children.entry(name.to_string()).or_default();
        if children.contains(&idx) {
            return false;
        }
        children.push(idx);
        true
    }
}
