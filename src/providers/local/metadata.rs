use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::warn;
use regex::Regex;

use crate::kvtext::{self, Entry, ValueMode};
use crate::model::{AssetKind, Collection, Game, extend_unique};
use crate::search::SearchContext;

/// A `game:` block (or bare `file:` declaration) waiting to be committed.
pub(super) struct GameDraft {
    pub line: usize,
    pub game: Game,
    /// File references as written, relative to the metadata directory.
    pub files: Vec<String>,
    /// Collection declared most recently before the block.
    pub collection: Option<String>,
    pub assets: Vec<(AssetKind, String)>,
}

impl GameDraft {
    fn new(line: usize, title: &str, collection: Option<String>) -> Self {
        Self {
            line,
            game: Game::new(title.trim()),
            files: Vec::new(),
            collection,
            assets: Vec::new(),
        }
    }
}

/// Everything a metadata file declared, in file order.
pub(super) struct MetadataFile {
    pub path: PathBuf,
    pub dir: PathBuf,
    pub collections: Vec<String>,
    pub games: Vec<GameDraft>,
}

impl MetadataFile {
    pub fn warn(&self, line: usize, msg: impl AsRef<str>) {
        warn!(
            "Collections: `{}`, line {}: {}",
            self.path.display(),
            line,
            msg.as_ref()
        );
    }

    pub fn warn_all(&self, line: usize, msgs: Vec<String>) {
        for msg in msgs {
            self.warn(line, msg);
        }
    }

    fn declare(&mut self, name: &str) {
        if !self.collections.iter().any(|c| c == name) {
            self.collections.push(name.to_string());
        }
    }
}

enum Target {
    None,
    Collection(String),
    Game(GameDraft),
}

/// Parse a metadata file. Collection attributes go straight into `ctx`
/// (re-declarations merge); game blocks are returned as drafts.
pub(super) fn parse(path: &Path, dir: &Path, ctx: &mut SearchContext) -> MetadataFile {
    let mut out = MetadataFile {
        path: path.to_path_buf(),
        dir: dir.to_path_buf(),
        collections: Vec::new(),
        games: Vec::new(),
    };

    let mut entries = Vec::new();
    let mut errors = Vec::new();
    let read = kvtext::read_file(
        path,
        ValueMode::List,
        |e| entries.push(e),
        |e| errors.push(e),
    );
    if let Err(e) = read {
        warn!("Collections: failed to read `{}`: {e}", path.display());
        return out;
    }
    for err in errors {
        out.warn(err.line, &err.message);
    }

    let mut target = Target::None;
    let mut current_collection: Option<String> = None;

    for entry in entries {
        let key = entry.key.to_ascii_lowercase();

        if key == "collection" {
            flush(&mut target, &mut out);
            let name = entry.text().trim().to_string();
            if name.is_empty() {
                out.warn(entry.line, "collection name is empty, block ignored");
                continue;
            }
            ctx.collection_entry(&name);
            out.declare(&name);
            current_collection = Some(name.clone());
            target = Target::Collection(name);
            continue;
        }

        if key == "game" {
            flush(&mut target, &mut out);
            target = Target::Game(GameDraft::new(
                entry.line,
                &entry.text(),
                current_collection.clone(),
            ));
            continue;
        }

        // `collection.<name>.<attr>` addresses a collection without opening a block
        if let Some(rest) = entry.key.strip_prefix("collection.") {
            match rest.rsplit_once('.') {
                Some((name, attr)) if !name.trim().is_empty() => {
                    let name = name.trim().to_string();
                    out.declare(&name);
                    let attr = attr.to_ascii_lowercase();
                    let coll = ctx.collection_entry(&name);
                    let skipped = apply_collection_attr(coll, &attr, &entry, dir);
                    out.warn_all(entry.line, skipped);
                }
                _ => out.warn(entry.line, format!("malformed key `{}`, ignored", entry.key)),
            }
            continue;
        }

        // a bare file declaration outside a game block opens a game of its own
        if key == "file" && !matches!(target, Target::Game(_)) {
            let collection = match &target {
                Target::Collection(name) => Some(name.clone()),
                _ => None,
            };
            let mut draft = GameDraft::new(entry.line, "", collection);
            draft.files.extend(non_empty(&entry.values));
            target = Target::Game(draft);
            continue;
        }

        match &mut target {
            Target::Collection(name) => {
                let skipped = apply_collection_attr(ctx.collection_entry(name), &key, &entry, dir);
                out.warn_all(entry.line, skipped);
            }
            Target::Game(draft) => {
                if let Err(msg) = apply_game_attr(draft, &key, &entry) {
                    out.warn(entry.line, msg);
                }
            }
            Target::None => out.warn(
                entry.line,
                format!(
                    "`{}` appears before any `collection:` or `game:` entry, ignored",
                    entry.key
                ),
            ),
        }
    }
    flush(&mut target, &mut out);
    out
}

fn flush(target: &mut Target, out: &mut MetadataFile) {
    if let Target::Game(draft) = std::mem::replace(target, Target::None) {
        out.games.push(draft);
    }
}

fn non_empty(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Values split on commas, for keys that hold short lists.
fn comma_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn extensions(values: &[String]) -> Vec<String> {
    comma_list(values)
        .into_iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

fn single_line(entry: &Entry) -> Result<String, String> {
    let text = entry.text();
    let text = text.trim();
    if text.is_empty() {
        return Err(format!("`{}` needs a value", entry.key));
    }
    Ok(text.to_string())
}

fn resolve_existing(base: &Path, rel: &str) -> Option<PathBuf> {
    fs::canonicalize(base.join(rel)).ok()
}

/// Apply one collection attribute. Returns a message per value that had to
/// be skipped; the other values of the entry still apply.
fn apply_collection_attr(
    coll: &mut Collection,
    key: &str,
    entry: &Entry,
    dir: &Path,
) -> Vec<String> {
    let mut skipped = Vec::new();
    let result = match key {
        "shortname" => single_line(entry).map(|v| coll.shortname = v),
        "summary" => {
            coll.summary = entry.text().trim().to_string();
            Ok(())
        }
        "description" => {
            coll.description = entry.text().trim().to_string();
            Ok(())
        }
        "launch" | "command" => single_line(entry).map(|v| coll.launch_cmd = Some(v)),
        "workdir" | "cwd" => {
            single_line(entry).map(|v| coll.launch_workdir = Some(dir.join(v)))
        }
        "extension" | "extensions" => {
            coll.include.extensions.extend(extensions(&entry.values));
            Ok(())
        }
        "ignore-extension" | "ignore-extensions" => {
            coll.exclude.extensions.extend(extensions(&entry.values));
            Ok(())
        }
        "files" => {
            for file in non_empty(&entry.values) {
                match resolve_existing(dir, &file) {
                    Some(path) => coll.include.files.push(path),
                    None => skipped.push(format!("file `{file}` not found, ignored")),
                }
            }
            Ok(())
        }
        "ignore-file" | "ignore-files" => {
            // missing ignored files are harmless
            coll.exclude
                .files
                .extend(non_empty(&entry.values).filter_map(|f| resolve_existing(dir, &f)));
            Ok(())
        }
        "regex" => compile(entry).map(|re| coll.include.regex = Some(re)),
        "ignore-regex" => compile(entry).map(|re| coll.exclude.regex = Some(re)),
        "directory" | "directories" => {
            for sub in non_empty(&entry.values) {
                match resolve_existing(dir, &sub) {
                    Some(path) if path.is_dir() => coll.directories.push(path),
                    _ => skipped.push(format!("directory `{sub}` not found, ignored")),
                }
            }
            Ok(())
        }
        _ if key.starts_with("x-") => Ok(()),
        _ => Err(format!(
            "unrecognized collection property `{}`, ignored",
            entry.key
        )),
    };
    if let Err(msg) = result {
        skipped.push(msg);
    }
    skipped
}

fn compile(entry: &Entry) -> Result<Regex, String> {
    let pattern = single_line(entry)?;
    Regex::new(&pattern).map_err(|e| format!("invalid regular expression `{pattern}`: {e}"))
}

fn apply_game_attr(draft: &mut GameDraft, key: &str, entry: &Entry) -> Result<(), String> {
    let game = &mut draft.game;
    match key {
        "file" | "files" => draft.files.extend(non_empty(&entry.values)),
        "developer" | "developers" => {
            extend_unique(&mut game.developers, comma_list(&entry.values))
        }
        "publisher" | "publishers" => {
            extend_unique(&mut game.publishers, comma_list(&entry.values))
        }
        "genre" | "genres" => extend_unique(&mut game.genres, comma_list(&entry.values)),
        "summary" => game.summary = entry.text().trim().to_string(),
        "description" => game.description = entry.text().trim().to_string(),
        "players" => game.player_count = parse_players(&single_line(entry)?)?,
        "release" => game.release_date = Some(parse_release(&single_line(entry)?)?),
        "rating" => game.rating = parse_rating(&single_line(entry)?)?,
        "favorite" | "favourite" => {
            game.is_favorite = match single_line(entry)?.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => true,
                "false" | "no" | "0" => false,
                other => return Err(format!("`{other}` is not a boolean value")),
            }
        }
        "launch" | "command" => game.launch_cmd = Some(single_line(entry)?),
        "workdir" | "cwd" => game.launch_workdir = Some(PathBuf::from(single_line(entry)?)),
        _ => {
            let asset_name = key
                .strip_prefix("assets.")
                .or_else(|| key.strip_prefix("x-"));
            match asset_name.and_then(AssetKind::from_name) {
                Some(kind) => draft.assets.push((kind, single_line(entry)?)),
                None if key.starts_with("x-") => {
                    game.extra.insert(key.to_string(), entry.text().trim().to_string());
                }
                None => return Err(format!("unrecognized game property `{}`, ignored", entry.key)),
            }
        }
    }
    Ok(())
}

/// `4`, or a range such as `1-4` (the upper bound counts).
pub(super) fn parse_players(val: &str) -> Result<u32, String> {
    let upper = val.rsplit('-').next().unwrap_or(val).trim();
    match upper.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("invalid player count `{val}`")),
    }
}

/// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`; missing parts default to the first.
pub(super) fn parse_release(val: &str) -> Result<NaiveDate, String> {
    let mut parts = val.splitn(3, '-').map(|p| p.trim().parse::<u32>());
    let date = match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(y)), None, None) => NaiveDate::from_ymd_opt(y as i32, 1, 1),
        (Some(Ok(y)), Some(Ok(m)), None) => NaiveDate::from_ymd_opt(y as i32, m, 1),
        (Some(Ok(y)), Some(Ok(m)), Some(Ok(d))) => NaiveDate::from_ymd_opt(y as i32, m, d),
        _ => None,
    };
    date.ok_or_else(|| format!("invalid release date `{val}`, expected YYYY-MM-DD"))
}

/// `80%` or a fraction in `0.0..=1.0`.
pub(super) fn parse_rating(val: &str) -> Result<f32, String> {
    let parsed = match val.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().map(|p| p / 100.0),
        None => val.parse::<f32>(),
    };
    match parsed {
        Ok(r) if (0.0..=1.0).contains(&r) => Ok(r),
        _ => Err(format!("invalid rating `{val}`, expected a percentage or 0.0-1.0")),
    }
}
