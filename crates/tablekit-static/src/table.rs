//! File-backed static table.
//!
//! A table file holds one entry per line:
//!
//! ```text
//! # comments and blank lines are ignored
//! postmaster   root
//! example.com  192.0.2.10
//! relay.example.org
//! ```
//!
//! The first whitespace-separated word is the key and the remainder of the
//! line, trimmed, is the value. A key with no value is a list entry; it
//! resolves to itself. Entries keep their file order, which is the order
//! `fetch` cycles through them.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, hash_map};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tablekit::ServiceKind;
use thiserror::Error;

/// Source of raw table contents.
pub trait TableSource {
    /// Reads the full table contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents cannot be read.
    fn load(&self) -> Result<String, StaticTableError>;

    /// Describes where the contents come from, for diagnostics.
    fn describe(&self) -> String;
}

/// Table contents read from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: Utf8PathBuf,
}

impl FileSource {
    /// Creates a source reading the given path.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the table file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        self.path.as_path()
    }
}

impl TableSource for FileSource {
    fn load(&self) -> Result<String, StaticTableError> {
        std::fs::read_to_string(&self.path).map_err(|source| StaticTableError::Read {
            path: self.path.clone(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.path.to_string()
    }
}

/// Errors raised while loading a static table.
#[derive(Debug, Error)]
pub enum StaticTableError {
    /// The table file could not be read.
    #[error("failed to read table '{path}': {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A key appears more than once.
    #[error("duplicate key '{key}' on line {line}")]
    DuplicateKey {
        /// Repeated key.
        key: String,
        /// One-based line number of the repeat.
        line: usize,
    },
}

/// One parsed table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    value: Option<String>,
}

impl Entry {
    /// Returns the entry key.
    #[must_use]
    pub const fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the entry value, if the entry is not a list entry.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the value, or the key for list entries.
    #[must_use]
    pub fn resolved(&self) -> &str {
        self.value().unwrap_or(self.key())
    }
}

/// Parsed table entries in file order, indexed by key.
///
/// Keys are unique ignoring ASCII case, so a `domain` lookup can never be
/// ambiguous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    ordered: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Entries {
    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterates over the entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.ordered.iter()
    }

    /// Returns the entry at `position` in file order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Entry> {
        self.ordered.get(position)
    }

    /// Finds the entry for `key`.
    ///
    /// `domain` keys match ignoring ASCII case; every other kind matches
    /// exactly.
    #[must_use]
    pub fn find(&self, service: ServiceKind, key: &str) -> Option<&Entry> {
        let position = *self.index.get(&key.to_ascii_lowercase())?;
        self.ordered
            .get(position)
            .filter(|entry| service == ServiceKind::Domain || entry.key == key)
    }
}

/// Parses table contents into entries, preserving file order.
///
/// # Errors
///
/// Returns [`StaticTableError::DuplicateKey`] if a key repeats, ignoring ASCII
/// case.
pub fn parse_entries(contents: &str) -> Result<Entries, StaticTableError> {
    let mut entries = Entries::default();

    for (index, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once(char::is_whitespace)
            .map_or((line, None), |(head, rest)| (head, Some(rest.trim())));

        match entries.index.entry(key.to_ascii_lowercase()) {
            hash_map::Entry::Occupied(_) => {
                return Err(StaticTableError::DuplicateKey {
                    key: key.to_owned(),
                    line: index + 1,
                });
            }
            hash_map::Entry::Vacant(slot) => {
                slot.insert(entries.ordered.len());
            }
        }

        entries.ordered.push(Entry {
            key: key.to_owned(),
            value: value.map(str::to_owned),
        });
    }

    Ok(entries)
}

/// Static table answering table operations from its loaded entries.
///
/// Operations take `&self` so several handlers can share one table; the
/// entries and the `fetch` cursor use interior mutability because requests are
/// served one at a time.
#[derive(Debug)]
pub struct StaticTable<S> {
    source: S,
    entries: RefCell<Entries>,
    cursor: Cell<usize>,
}

impl<S: TableSource> StaticTable<S> {
    /// Loads the table from its source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    pub fn open(source: S) -> Result<Self, StaticTableError> {
        let entries = parse_entries(&source.load()?)?;
        Ok(Self {
            source,
            entries: RefCell::new(entries),
            cursor: Cell::new(0),
        })
    }

    /// Re-reads the source, replacing the entries and restarting `fetch`.
    ///
    /// On failure the previous entries stay active.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    pub fn reload(&self) -> Result<usize, StaticTableError> {
        let entries = parse_entries(&self.source.load()?)?;
        let count = entries.len();
        self.entries.replace(entries);
        self.cursor.set(0);
        Ok(count)
    }

    /// Returns the number of loaded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Describes the backing source.
    #[must_use]
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Reports whether `key` is present.
    #[must_use]
    pub fn contains(&self, service: ServiceKind, key: &str) -> bool {
        self.entries.borrow().find(service, key).is_some()
    }

    /// Resolves `key` to its value, or to itself for list entries.
    #[must_use]
    pub fn lookup(&self, service: ServiceKind, key: &str) -> Option<String> {
        self.entries
            .borrow()
            .find(service, key)
            .map(|entry| entry.resolved().to_owned())
    }

    /// Returns the next entry in file order, wrapping at the end.
    #[must_use]
    pub fn fetch_next(&self) -> Option<String> {
        let entries = self.entries.borrow();
        let position = match self.cursor.get() {
            next if next < entries.len() => next,
            _ => 0,
        };
        let entry = entries.get(position)?;
        self.cursor.set(position + 1);
        Some(entry.resolved().to_owned())
    }
}
