use super::*;
use std::fs;
use std::io;

fn parse(text: &str, mode: ValueMode) -> Vec<Result<Entry, ParseError>> {
    Reader::new(text.as_bytes(), mode).collect()
}

fn entries(text: &str, mode: ValueMode) -> Vec<Entry> {
    parse(text, mode).into_iter().filter_map(Result::ok).collect()
}

#[test]
fn skips_blank_lines_and_comments() {
    let got = entries(
        "\n# a comment\n   # indented comment\nkey: value\n\n",
        ValueMode::Joined,
    );
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].line, 4);
    assert_eq!(got[0].key, "key");
    assert_eq!(got[0].values, vec!["value".to_string()]);
}

#[test]
fn keys_may_contain_dots_and_spaces() {
    let got = entries("collection.My Games.summary: hello", ValueMode::Joined);
    assert_eq!(got[0].key, "collection.My Games.summary");
    assert_eq!(got[0].text(), "hello");
}

#[test]
fn urls_are_not_split_as_keys() {
    let got = entries(
        "x-background: https://example.com/a.png\n",
        ValueMode::Joined,
    );
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].key, "x-background");
    assert_eq!(got[0].text(), "https://example.com/a.png");
}

#[test]
fn plain_text_lines_continue_the_previous_entry() {
    let got = entries(
        "description: a very long\n  description\nnext: x\n",
        ValueMode::Joined,
    );
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].text(), "a very long\ndescription");
    assert_eq!(got[1].key, "next");
}

#[test]
fn trailing_backslash_joins_physical_lines() {
    let got = entries("launch: run.exe \\\n   --flag \\\n   --other\nk: v\n", ValueMode::Joined);
    assert_eq!(got[0].text(), "run.exe --flag --other");
    assert_eq!(got[1].line, 4);
}

#[test]
fn empty_key_opens_a_block_until_a_key_at_same_indentation() {
    let text = "\
description:
  first line
  Note: this stays in the block
  .
  after the break
developer: Dev
";
    let got = entries(text, ValueMode::Joined);
    assert_eq!(got.len(), 2);
    assert_eq!(
        got[0].text(),
        "first line\nNote: this stays in the block\n\nafter the break"
    );
    assert_eq!(got[1].key, "developer");
}

#[test]
fn indented_keys_outside_a_block_start_new_entries() {
    let text = "game: Foo\n  developer: Dev\n  genre: Action\n";
    let got = entries(text, ValueMode::List);
    let keys: Vec<&str> = got.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["game", "developer", "genre"]);
}

#[test]
fn list_mode_strips_bullets_and_keeps_lines_apart() {
    let text = "files:\n  - a.ext\n  - b.ext\ngenre: x\n";
    let got = entries(text, ValueMode::List);
    assert_eq!(got[0].values, vec!["a.ext".to_string(), "b.ext".to_string()]);

    let joined = entries(text, ValueMode::Joined);
    assert_eq!(joined[0].values, vec!["- a.ext\n- b.ext".to_string()]);
}

#[test]
fn malformed_lines_are_reported_and_the_stream_continues() {
    let got = parse("orphan text\n: no key\nkey: value\n", ValueMode::Joined);
    assert_eq!(got.len(), 3);
    assert_eq!(got[0].as_ref().unwrap_err().line, 1);
    assert_eq!(got[1].as_ref().unwrap_err().line, 2);
    let ok = got[2].as_ref().unwrap();
    assert_eq!(ok.key, "key");
    assert_eq!(ok.line, 3);
}

#[test]
fn block_key_with_no_lines_yields_an_empty_value() {
    let got = entries("summary:\nother: x\n", ValueMode::Joined);
    assert_eq!(got[0].values, vec![String::new()]);

    let got = entries("files:\nother: x\n", ValueMode::List);
    assert!(got[0].values.is_empty());
}

#[test]
fn read_file_reports_entries_and_errors_through_callbacks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata.txt");
    fs::write(&path, "junk\ncollection: A\nextensions: a, b\n").unwrap();

    let mut keys = Vec::new();
    let mut errors = Vec::new();
    read_file(
        &path,
        ValueMode::List,
        |e| keys.push(e.key),
        |e| errors.push(e.line),
    )
    .unwrap();

    assert_eq!(keys, vec!["collection".to_string(), "extensions".to_string()]);
    assert_eq!(errors, vec![1]);
}

#[test]
fn read_file_fails_only_when_the_file_cannot_be_opened() {
    let dir = tempfile::tempdir().unwrap();
    let res = read_file(&dir.path().join("missing.txt"), ValueMode::Joined, |_| {}, |_| {});
    assert!(res.is_err());
}

#[test]
fn invalid_utf8_line_is_reported_and_reading_continues() {
    let got: Vec<_> = Reader::new(&b"a: 1\nb: \xff\xfe\nc: 3\n"[..], ValueMode::Joined).collect();
    assert_eq!(got.len(), 3);

    let a = got[0].as_ref().unwrap();
    assert_eq!((a.key.as_str(), a.text()), ("a", "1".to_string()));
    assert_eq!(got[1].as_ref().unwrap_err().line, 2);
    let c = got[2].as_ref().unwrap();
    assert_eq!((c.key.as_str(), c.line), ("c", 3));
}

#[test]
fn invalid_utf8_inside_a_block_ends_that_block() {
    let text = &b"files:\n  a.ext\n  \xc3(.ext\n  b.ext\ngenre: x\n"[..];
    let got: Vec<_> = Reader::new(text, ValueMode::List).collect();

    let first = got[0].as_ref().unwrap();
    assert_eq!(first.values, vec!["a.ext".to_string()]);
    assert_eq!(got[1].as_ref().unwrap_err().line, 3);
    // the orphaned block line has nothing left to continue
    assert_eq!(got[2].as_ref().unwrap_err().line, 4);
    assert_eq!(got[3].as_ref().unwrap().key, "genre");
}

/// Hands out `data`, then fails.
struct BrokenSource {
    data: &'static [u8],
}

impl io::Read for BrokenSource {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::other("device gone"));
        }
        let n = self.data.len().min(out.len());
        out[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn read_failure_still_yields_the_entry_in_progress() {
    let source = io::BufReader::new(BrokenSource {
        data: b"title: A\n  continued",
    });
    let got: Vec<_> = Reader::new(source, ValueMode::Joined).collect();

    assert_eq!(got.len(), 2);
    assert_eq!(got[0].as_ref().unwrap().text(), "A");
    let err = got[1].as_ref().unwrap_err();
    assert!(err.message.contains("device gone"), "{err}");
}

#[test]
fn list_mode_keeps_dashes_in_prose_continuations() {
    let text = "description: Features:\n- fast\n- fun\ngenre: x\n";
    let got = entries(text, ValueMode::List);
    assert_eq!(got[0].text(), "Features:\n- fast\n- fun");
}
