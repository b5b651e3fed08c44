//! SQL script sources.
//!
//! Provides:
//! - Script resources (files or in-memory buffers) with optional encoding
//! - Encoding resolution against a populator-wide default
//! - Line-oriented statement reading

pub mod encoding;
pub mod reader;

pub use encoding::Encoding;
pub use reader::{Statement, StatementReader};

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PopulateError;

/// Where a script's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptResource {
    /// A file on disk, opened when the script runs.
    File(PathBuf),
    /// An in-memory buffer with a descriptive name.
    Bytes { name: String, content: Arc<[u8]> },
}

impl ScriptResource {
    fn open(&self) -> io::Result<Box<dyn BufRead + Send>> {
        match self {
            Self::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Self::Bytes { content, .. } => Ok(Box::new(Cursor::new(Arc::clone(content)))),
        }
    }
}

impl fmt::Display for ScriptResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file [{}]", path.display()),
            Self::Bytes { name, .. } => write!(f, "bytes [{name}]"),
        }
    }
}

/// A SQL script to execute, with an optional explicit encoding.
///
/// Scripts without an encoding inherit the populator's default when the
/// run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    resource: ScriptResource,
    encoding: Option<String>,
}

impl Script {
    /// A script read from a file.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            resource: ScriptResource::File(path.as_ref().to_path_buf()),
            encoding: None,
        }
    }

    /// A script held in memory as raw bytes.
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            resource: ScriptResource::Bytes {
                name: name.into(),
                content: content.into(),
            },
            encoding: None,
        }
    }

    /// A script held in memory as text (stored as UTF-8).
    pub fn from_sql(name: impl Into<String>, sql: &str) -> Self {
        Self::from_bytes(name, sql.as_bytes())
    }

    /// Pin this script to an explicit encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn resource(&self) -> &ScriptResource {
        &self.resource
    }

    /// The explicit encoding, if one was set on the script itself.
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Resolve the encoding against a default and bind it to the script.
    pub fn resolve(&self, default_encoding: Option<&str>) -> Result<EncodedScript<'_>, PopulateError> {
        let encoding = match self.encoding.as_deref().or(default_encoding) {
            Some(name) => name
                .parse::<Encoding>()
                .map_err(|_| PopulateError::UnsupportedEncoding {
                    script: self.resource.to_string(),
                    encoding: name.to_string(),
                })?,
            None => Encoding::default(),
        };

        Ok(EncodedScript {
            script: self,
            encoding,
            name: Arc::from(self.resource.to_string()),
        })
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.resource.fmt(f)
    }
}

/// A script whose encoding has been resolved for one run.
#[derive(Debug, Clone)]
pub struct EncodedScript<'a> {
    script: &'a Script,
    encoding: Encoding,
    name: Arc<str>,
}

impl EncodedScript<'_> {
    pub fn script(&self) -> &Script {
        self.script
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Display name used in statements, errors and reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Open a fresh statement reader positioned at line 1.
    pub fn open(&self) -> Result<StatementReader, PopulateError> {
        let source = self
            .script
            .resource
            .open()
            .map_err(|source| PopulateError::Read {
                script: self.name.to_string(),
                source,
            })?;

        Ok(StatementReader::new(
            source,
            Arc::clone(&self.name),
            self.encoding,
        ))
    }
}
