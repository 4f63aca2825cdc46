use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// The two catalog endpoints queried per game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Product details by id.
    Api,
    /// Store search by title.
    Embed,
}

impl Endpoint {
    pub const ALL: [Endpoint; 2] = [Endpoint::Api, Endpoint::Embed];

    fn suffix(self) -> &'static str {
        match self {
            Endpoint::Api => "api",
            Endpoint::Embed => "embed",
        }
    }
}

/// Raw response bodies on disk, one file per (id, endpoint).
#[derive(Debug, Clone)]
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    /// Entries live in `<root>/gog`.
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join("gog"),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str, endpoint: Endpoint) -> PathBuf {
        self.dir.join(format!("{id}.{}.json", endpoint.suffix()))
    }

    pub fn read(&self, id: &str, endpoint: Endpoint) -> Option<Vec<u8>> {
        fs::read(self.path_for(id, endpoint)).ok()
    }

    pub fn store(&self, id: &str, endpoint: Endpoint, body: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(id, endpoint), body)
    }

    pub fn delete(&self, id: &str, endpoint: Endpoint) {
        let path = self.path_for(id, endpoint);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("GOG: failed to remove `{}`: {e}", path.display()),
        }
    }
}
