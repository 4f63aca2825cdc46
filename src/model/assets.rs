use std::collections::HashMap;
use std::path::Path;

/// Category of a media asset attached to a game.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AssetKind {
    BoxFront,
    BoxBack,
    BoxSpine,
    BoxFull,
    Cartridge,
    Logo,
    Marquee,
    Bezel,
    Panel,
    CabinetLeft,
    CabinetRight,
    Tile,
    Banner,
    Steamgrid,
    Poster,
    Background,
    Music,
    Screenshots,
    Videos,
    Titlescreens,
}

/// What kind of file an asset slot expects; drives the extension filter of
/// the media directory search.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
    Audio,
}

impl AssetKind {
    pub const ALL: [AssetKind; 20] = [
        AssetKind::BoxFront,
        AssetKind::BoxBack,
        AssetKind::BoxSpine,
        AssetKind::BoxFull,
        AssetKind::Cartridge,
        AssetKind::Logo,
        AssetKind::Marquee,
        AssetKind::Bezel,
        AssetKind::Panel,
        AssetKind::CabinetLeft,
        AssetKind::CabinetRight,
        AssetKind::Tile,
        AssetKind::Banner,
        AssetKind::Steamgrid,
        AssetKind::Poster,
        AssetKind::Background,
        AssetKind::Music,
        AssetKind::Screenshots,
        AssetKind::Videos,
        AssetKind::Titlescreens,
    ];

    /// Multi slots hold an ordered list, single slots exactly one URI.
    pub fn is_multi(self) -> bool {
        matches!(
            self,
            AssetKind::Screenshots | AssetKind::Videos | AssetKind::Titlescreens
        )
    }

    pub fn media_type(self) -> MediaType {
        match self {
            AssetKind::Videos => MediaType::Video,
            AssetKind::Music => MediaType::Audio,
            _ => MediaType::Image,
        }
    }

    /// File stem used for this kind in a media directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            AssetKind::BoxFront => "box_front",
            AssetKind::BoxBack => "box_back",
            AssetKind::BoxSpine => "box_spine",
            AssetKind::BoxFull => "box_full",
            AssetKind::Cartridge => "cartridge",
            AssetKind::Logo => "logo",
            AssetKind::Marquee => "marquee",
            AssetKind::Bezel => "bezel",
            AssetKind::Panel => "panel",
            AssetKind::CabinetLeft => "cabinet_left",
            AssetKind::CabinetRight => "cabinet_right",
            AssetKind::Tile => "tile",
            AssetKind::Banner => "banner",
            AssetKind::Steamgrid => "steamgrid",
            AssetKind::Poster => "poster",
            AssetKind::Background => "background",
            AssetKind::Music => "music",
            AssetKind::Screenshots => "screenshot",
            AssetKind::Videos => "video",
            AssetKind::Titlescreens => "titlescreen",
        }
    }

    /// Look up a kind by name, as written in metadata files.
    ///
    /// Dashes and underscores are interchangeable and a trailing `s` is
    /// ignored, so `box-front`, `box_front` and `screenshots` all resolve.
    pub fn from_name(name: &str) -> Option<Self> {
        let norm = name.trim().to_ascii_lowercase().replace('-', "_");
        let norm = match norm.as_str() {
            "boxfront" | "box" => "box_front",
            "boxback" => "box_back",
            "boxspine" => "box_spine",
            "boxfull" => "box_full",
            "cart" => "cartridge",
            "wheel" => "logo",
            "fanart" => "background",
            other => other,
        };
        let singular = norm.strip_suffix('s').unwrap_or(norm);
        AssetKind::ALL
            .into_iter()
            .find(|k| k.file_stem() == norm || k.file_stem() == singular)
    }
}

impl MediaType {
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaType::Image => &["png", "jpg", "jpeg", "webp", "gif", "bmp"],
            MediaType::Video => &["mp4", "webm", "mkv", "avi"],
            MediaType::Audio => &["mp3", "ogg", "wav", "flac", "opus"],
        }
    }
}

/// URI for a local file.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn is_url(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Per-game media, keyed by [`AssetKind`].
#[derive(Debug, Default)]
pub struct Assets {
    single: HashMap<AssetKind, String>,
    multi: HashMap<AssetKind, Vec<String>>,
}

impl Assets {
    pub fn single(&self, kind: AssetKind) -> Option<&str> {
        self.single.get(&kind).map(String::as_str)
    }

    pub fn multi(&self, kind: AssetKind) -> &[String] {
        self.multi.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multi.values().all(Vec::is_empty)
    }

    /// Overwrite a single slot, or append to a multi slot.
    pub fn set(&mut self, kind: AssetKind, uri: String) {
        if kind.is_multi() {
            self.append_multi(kind, uri);
        } else {
            self.single.insert(kind, uri);
        }
    }

    /// Append to a multi slot unless the URI is already there.
    pub fn append_multi(&mut self, kind: AssetKind, uri: String) {
        let list = self.multi.entry(kind).or_default();
        if !list.contains(&uri) {
            list.push(uri);
        }
    }

    /// Take over every asset of `other`, overwriting single slots.
    pub fn merge_from(&mut self, other: Assets) {
        for (kind, uri) in other.single {
            self.single.insert(kind, uri);
        }
        for (kind, list) in other.multi {
            for uri in list {
                self.append_multi(kind, uri);
            }
        }
    }

    /// Tentative insertion: single slots are only filled when empty.
    fn add_maybe(&mut self, kind: AssetKind, uri: String) -> bool {
        if kind.is_multi() {
            let before = self.multi(kind).len();
            self.append_multi(kind, uri);
            return self.multi(kind).len() > before;
        }
        if self.single.contains_key(&kind) {
            return false;
        }
        self.single.insert(kind, uri);
        true
    }

    /// Add a local file if it exists and the slot accepts it.
    pub fn add_file_maybe(&mut self, kind: AssetKind, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        self.add_maybe(kind, file_uri(path))
    }

    /// Add a remote URL if the slot accepts it. URLs are not checked.
    pub fn add_url_maybe(&mut self, kind: AssetKind, url: String) -> bool {
        if url.is_empty() {
            return false;
        }
        self.add_maybe(kind, url)
    }

    /// Explicit directive: overwrites single slots. Local files must exist.
    pub fn set_file(&mut self, kind: AssetKind, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        self.set(kind, file_uri(path));
        true
    }

    /// Explicit directive that may be a URL or a path (relative to `base`).
    pub fn set_from_directive(&mut self, kind: AssetKind, value: &str, base: &Path) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        if is_url(value) {
            self.set(kind, value.to_string());
            return true;
        }
        let path = base.join(value);
        match std::fs::canonicalize(&path) {
            Ok(path) => self.set_file(kind, &path),
            Err(_) => false,
        }
    }
}
