use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

/// How continuation lines are folded into an entry's values.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueMode {
    /// All lines of an entry are joined with `\n` into a single value.
    Joined,
    /// Every line is a separate value; inside a `key:` block leading `- `
    /// bullet markers are removed.
    List,
}

/// One `key: value` record, with any continuation lines already folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based line number of the key.
    pub line: usize,
    pub key: String,
    pub values: Vec<String>,
}

impl Entry {
    /// The values merged back into one block of text.
    pub fn text(&self) -> String {
        merge_lines(&self.values)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

/// Join value lines into a single string.
pub fn merge_lines(values: &[String]) -> String {
    values.join("\n")
}

struct Pending {
    line: usize,
    key: String,
    indent: usize,
    // `key:` with nothing after the colon
    block: bool,
    lines: Vec<String>,
}

impl Pending {
    /// Bullet markers only mean something inside a `key:` block; prose
    /// continuation lines are kept as written.
    fn push(&mut self, text: &str, mode: ValueMode) {
        let text = match mode {
            ValueMode::List if self.block => text.strip_prefix("- ").unwrap_or(text).trim(),
            _ => text,
        };
        let text = if text == "." { "" } else { text };
        self.lines.push(text.to_string());
    }

    fn finish(self, mode: ValueMode) -> Entry {
        let values = match mode {
            ValueMode::Joined => vec![merge_lines(&self.lines)],
            ValueMode::List => self.lines,
        };
        Entry {
            line: self.line,
            key: self.key,
            values,
        }
    }
}

/// Streaming reader over a text source.
///
/// Yields one item per entry or per malformed line. A line that is not valid
/// UTF-8 is reported and skipped like any other malformed line. The reader
/// owns its source, so each file gets its own reader.
pub struct Reader<R> {
    source: R,
    buf: Vec<u8>,
    line_no: usize,
    mode: ValueMode,
    pending: Option<Pending>,
    // reported after the pending entry has been handed out
    queued: Option<ParseError>,
    eof: bool,
}

/// A physical line, or why it could not be read.
type RawLine = Result<String, String>;

impl<R: BufRead> Reader<R> {
    pub fn new(source: R, mode: ValueMode) -> Self {
        Self {
            source,
            buf: Vec::new(),
            line_no: 0,
            mode,
            pending: None,
            queued: None,
            eof: false,
        }
    }

    fn next_physical_line(&mut self) -> Option<RawLine> {
        if self.eof {
            return None;
        }
        self.buf.clear();
        match self.source.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.eof = true;
                None
            }
            Ok(_) => {
                self.line_no += 1;
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                }
                if self.buf.ends_with(b"\r") {
                    self.buf.pop();
                }
                Some(
                    String::from_utf8(std::mem::take(&mut self.buf))
                        .map_err(|_| "line is not valid UTF-8, ignored".to_string()),
                )
            }
            Err(e) => {
                // the source is unusable from here on
                self.eof = true;
                self.line_no += 1;
                Some(Err(format!("read failed: {e}")))
            }
        }
    }

    /// Next line with trailing-`\` continuations folded in, and the number
    /// of its first physical line.
    fn next_logical_line(&mut self) -> Option<(usize, RawLine)> {
        let first = self.next_physical_line()?;
        let start = self.line_no;

        let mut text = match first {
            Ok(text) => text,
            Err(msg) => return Some((start, Err(msg))),
        };
        while let Some(stripped) = text.trim_end().strip_suffix('\\') {
            let mut joined = stripped.trim_end().to_string();
            match self.next_physical_line() {
                Some(Ok(next)) => {
                    joined.push(' ');
                    joined.push_str(next.trim());
                }
                Some(Err(msg)) => return Some((start, Err(msg))),
                None => {
                    text = joined;
                    break;
                }
            }
            text = joined;
        }

        Some((start, Ok(text)))
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Entry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.queued.take() {
            return Some(Err(err));
        }

        loop {
            let (line_no, raw) = match self.next_logical_line() {
                None => return self.pending.take().map(|p| Ok(p.finish(self.mode))),
                Some((line_no, Err(message))) => {
                    // an unreadable line ends the entry it would have continued
                    let err = ParseError {
                        line: line_no,
                        message,
                    };
                    return match self.pending.take() {
                        Some(done) => {
                            self.queued = Some(err);
                            Some(Ok(done.finish(self.mode)))
                        }
                        None => Some(Err(err)),
                    };
                }
                Some((line_no, Ok(raw))) => (line_no, raw),
            };

            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let indent = raw.len() - raw.trim_start().len();

            if let Some(p) = self.pending.as_mut() {
                if p.block && indent > p.indent {
                    p.push(text, self.mode);
                    continue;
                }
            }

            if text == ":" || text.starts_with(": ") {
                return Some(Err(ParseError {
                    line: line_no,
                    message: "missing key before `:`".to_string(),
                }));
            }

            if let Some((key, value)) = split_key(text) {
                let mut next = Pending {
                    line: line_no,
                    key: key.to_string(),
                    indent,
                    block: value.is_empty(),
                    lines: Vec::new(),
                };
                if !value.is_empty() {
                    next.push(value, self.mode);
                }
                if let Some(done) = self.pending.replace(next) {
                    return Some(Ok(done.finish(self.mode)));
                }
                continue;
            }

            match self.pending.as_mut() {
                Some(p) => p.push(text, self.mode),
                None => {
                    return Some(Err(ParseError {
                        line: line_no,
                        message: "expected `key: value`, found text with no entry to continue"
                            .to_string(),
                    }));
                }
            }
        }
    }
}

/// Split `key: value` at the first colon followed by whitespace or the end of
/// the line. Keys may contain spaces and dots but never `://`.
fn split_key(line: &str) -> Option<(&str, &str)> {
    let mut from = 0;
    while let Some(off) = line[from..].find(':') {
        let pos = from + off;
        let rest = &line[pos + 1..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            let key = line[..pos].trim();
            if key.is_empty() || key.contains("://") {
                return None;
            }
            return Some((key, rest.trim()));
        }
        from = pos + 1;
    }
    None
}

/// Parse `path`, handing every entry to `on_entry` and every malformed line to
/// `on_error`. Only failing to open the file is an error for the caller.
pub fn read_file(
    path: &Path,
    mode: ValueMode,
    mut on_entry: impl FnMut(Entry),
    mut on_error: impl FnMut(ParseError),
) -> io::Result<()> {
    let file = File::open(path)?;
    for item in Reader::new(BufReader::new(file), mode) {
        match item {
            Ok(entry) => on_entry(entry),
            Err(err) => on_error(err),
        }
    }
    Ok(())
}
