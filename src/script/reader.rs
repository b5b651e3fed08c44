//! Line-oriented statement reader.
//!
//! Each non-blank physical line of a script is one statement. There is no
//! SQL-aware splitting: a statement spanning several lines is read as
//! several statements.

use std::io::BufRead;
use std::sync::Arc;

use super::encoding::Encoding;
use crate::error::PopulateError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One line of SQL read from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Line text without its line terminator
    pub text: String,
    /// 1-based line number within the script
    pub line: usize,
    /// Display name of the script the line came from
    pub script: Arc<str>,
}

impl Statement {
    /// Whether this is a `DROP` statement (trimmed, ASCII case-insensitive).
    pub fn is_drop(&self) -> bool {
        self.text
            .trim()
            .get(..4)
            .is_some_and(|head| head.eq_ignore_ascii_case("drop"))
    }
}

/// Lazy, forward-only iterator over the statements of one script.
///
/// Yields `Err` at most once, for an I/O or decoding failure, and then ends.
pub struct StatementReader {
    source: Box<dyn BufRead + Send>,
    script: Arc<str>,
    encoding: Encoding,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl StatementReader {
    /// Create a reader over already-opened script bytes.
    pub fn new(source: Box<dyn BufRead + Send>, script: Arc<str>, encoding: Encoding) -> Self {
        Self {
            source,
            script,
            encoding,
            line: 0,
            buf: Vec::with_capacity(256),
            done: false,
        }
    }

    /// Number of physical lines consumed so far, blank lines included.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    fn fail(&mut self, err: PopulateError) -> Option<Result<Statement, PopulateError>> {
        self.done = true;
        Some(Err(err))
    }
}

impl Iterator for StatementReader {
    type Item = Result<Statement, PopulateError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            self.buf.clear();
            match self.source.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(source) => {
                    let script = self.script.to_string();
                    return self.fail(PopulateError::Read { script, source });
                }
            }
            self.line += 1;

            let mut bytes = self.buf.as_slice();
            if let Some(rest) = bytes.strip_suffix(b"\n") {
                bytes = rest;
            }
            if let Some(rest) = bytes.strip_suffix(b"\r") {
                bytes = rest;
            }
            if self.line == 1 && self.encoding == Encoding::Utf8 {
                bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            }

            let Some(text) = self.encoding.decode(bytes) else {
                let err = PopulateError::Decode {
                    script: self.script.to_string(),
                    line: self.line,
                    encoding: self.encoding.name().to_string(),
                };
                return self.fail(err);
            };

            if text.trim().is_empty() {
                continue;
            }

            return Some(Ok(Statement {
                text,
                line: self.line,
                script: Arc::clone(&self.script),
            }));
        }
    }
}
