//! Bookmark operations layered on [`KeyPathStore`].
//!
//! A bookmark lives at key path `<file key>.<line>`; the record holds only
//! display data. The service never touches the JSON tree directly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::codec;
use crate::document::{Document, KeyPath};
use crate::error::{Result, StoreError};
use crate::store::KeyPathStore;

/// Stored payload of one bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub line: String,
    pub filetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

/// Bookmarks of one file, ordered by line number.
pub type FileBucket = BTreeMap<u32, BookmarkRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => write!(f, "next"),
            Self::Prev => write!(f, "prev"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Prev),
            other => Err(format!("invalid direction {other:?} (expected next|prev)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// One listed bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkEntry {
    pub path: PathBuf,
    pub lnum: u32,
    pub bookmark: BookmarkRecord,
}

#[derive(Debug, Clone)]
pub struct Bookmarks {
    store: KeyPathStore,
}

impl Bookmarks {
    pub fn new(store: KeyPathStore) -> Self {
        Self { store }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(KeyPathStore::new(path))
    }

    pub fn store(&self) -> &KeyPathStore {
        &self.store
    }

    /// Record a bookmark, replacing any record already at that line.
    pub fn create(
        &self,
        file: &Path,
        lnum: u32,
        line: &str,
        filetype: &str,
        annotation: Option<&str>,
    ) -> Result<()> {
        let key = line_key(file, lnum)?;
        let record = BookmarkRecord {
            line: line.to_string(),
            filetype: filetype.to_string(),
            annotation: annotation.filter(|a| !a.is_empty()).map(str::to_string),
        };
        self.store.push(&key, &record)
    }

    pub fn exists(&self, file: &Path, lnum: u32) -> Result<bool> {
        Ok(self.store.exists(&line_key(file, lnum)?))
    }

    /// Remove the bookmark at `lnum` if present, otherwise add one.
    pub fn toggle(&self, file: &Path, lnum: u32, line: &str, filetype: &str) -> Result<Toggled> {
        let key = line_key(file, lnum)?;
        if self.store.exists(&key) {
            self.store.delete(&key)?;
            debug!(target: "bookmark_core::service", file = %file.display(), lnum, "toggled off");
            return Ok(Toggled::Removed);
        }
        self.create(file, lnum, line, filetype, None)?;
        debug!(target: "bookmark_core::service", file = %file.display(), lnum, "toggled on");
        Ok(Toggled::Added)
    }

    /// Create or overwrite the bookmark at `lnum` with an annotation.
    pub fn annotate(
        &self,
        file: &Path,
        lnum: u32,
        line: &str,
        filetype: &str,
        annotation: &str,
    ) -> Result<()> {
        if annotation.trim().is_empty() {
            return Err(StoreError::EmptyAnnotation);
        }
        self.create(file, lnum, line, filetype, Some(annotation))
    }

    /// Remove the bookmark at `lnum`. The file bucket stays even if empty.
    pub fn delete(&self, file: &Path, lnum: u32) -> Result<()> {
        self.store.delete(&line_key(file, lnum)?)
    }

    /// Drop every bookmark of `file`, leaving an empty bucket behind.
    pub fn clear_file(&self, file: &Path) -> Result<()> {
        self.store.push(&file_key(file)?, &Value::Object(Map::new()))?;
        info!(target: "bookmark_core::service", file = %file.display(), "cleared file bookmarks");
        Ok(())
    }

    pub fn clear_all(&self) -> Result<()> {
        self.store.clear()
    }

    /// Typed bucket for `file`, `None` when the file has never been marked.
    pub fn bucket(&self, file: &Path) -> Result<Option<FileBucket>> {
        let Some(value) = self.store.fetch(&file_key(file)?) else {
            return Ok(None);
        };
        Ok(Some(decode_bucket(file, &value)))
    }

    /// Bookmarked line numbers of `file`, ascending.
    pub fn line_numbers(&self, file: &Path) -> Result<Vec<u32>> {
        let Some(value) = self.store.fetch(&file_key(file)?) else {
            return Ok(Vec::new());
        };
        let mut lines: Vec<u32> = value
            .as_object()
            .map(|bucket| bucket.keys().filter_map(|k| parse_line_key(k)).collect())
            .unwrap_or_default();
        lines.sort_unstable();
        Ok(lines)
    }

    /// Nearest bookmarked line strictly after (`Next`) or before (`Prev`)
    /// `lnum`. No wraparound.
    pub fn jump_target(&self, file: &Path, lnum: u32, direction: Direction) -> Result<Option<u32>> {
        let lines = self.line_numbers(file)?;
        let target = match direction {
            Direction::Next => lines.iter().copied().find(|&l| l > lnum),
            Direction::Prev => lines.iter().rev().copied().find(|&l| l < lnum),
        };
        Ok(target)
    }

    /// Snapshot of the whole document for listing.
    ///
    /// Each call re-reads storage; iterate the result as often as needed.
    pub fn list_all(&self) -> Listing {
        Listing {
            document: self.store.load(),
        }
    }
}

/// Counts of entries a listing leaves out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListingReport {
    pub listed: usize,
    /// File keys that failed to percent-decode.
    pub undecodable: usize,
    /// Decoded paths that are no longer regular files.
    pub stale: usize,
}

/// A loaded document viewed as bookmarks.
#[derive(Debug, Clone)]
pub struct Listing {
    document: Document,
}

impl Listing {
    /// Bookmarks of existing files; files in key order, lines ascending.
    ///
    /// Undecodable keys and stale files are skipped, never removed.
    pub fn iter(&self) -> impl Iterator<Item = BookmarkEntry> + '_ {
        self.document
            .iter()
            .filter_map(|(key, value)| {
                let path = live_path(key)?;
                let bucket = decode_bucket(&path, value);
                Some((path, bucket))
            })
            .flat_map(|(path, bucket)| {
                bucket.into_iter().map(move |(lnum, bookmark)| BookmarkEntry {
                    path: path.clone(),
                    lnum,
                    bookmark,
                })
            })
    }

    pub fn entries(&self) -> Vec<BookmarkEntry> {
        self.iter().collect()
    }

    pub fn report(&self) -> ListingReport {
        let mut report = ListingReport::default();
        for key in self.document.iter().map(|(key, _)| key) {
            match codec::decode(key) {
                Err(_) => report.undecodable += 1,
                Ok(path) if !Path::new(&path).is_file() => report.stale += 1,
                Ok(_) => {}
            }
        }
        report.listed = self.iter().count();
        report
    }
}

fn live_path(key: &str) -> Option<PathBuf> {
    let path = match codec::decode(key) {
        Ok(path) => PathBuf::from(path),
        Err(err) => {
            debug!(target: "bookmark_core::service", key, error = %err, "skipping undecodable file key");
            return None;
        }
    };
    if !path.is_file() {
        debug!(target: "bookmark_core::service", path = %path.display(), "skipping stale file");
        return None;
    }
    Some(path)
}

fn decode_bucket(file: &Path, value: &Value) -> FileBucket {
    let mut bucket = FileBucket::new();
    let Some(map) = value.as_object() else {
        debug!(target: "bookmark_core::service", file = %file.display(), "bucket is not an object");
        return bucket;
    };
    for (key, raw) in map {
        let Some(lnum) = parse_line_key(key) else {
            debug!(target: "bookmark_core::service", file = %file.display(), key = %key, "skipping non-numeric line key");
            continue;
        };
        match serde_json::from_value::<BookmarkRecord>(raw.clone()) {
            Ok(record) => {
                bucket.insert(lnum, record);
            }
            Err(err) => {
                debug!(target: "bookmark_core::service", file = %file.display(), lnum, error = %err, "skipping malformed record");
            }
        }
    }
    bucket
}

/// Positive line number written in canonical decimal form. `"05"` and
/// `"+5"` would otherwise alias line 5.
fn parse_line_key(key: &str) -> Option<u32> {
    let lnum = key.parse::<u32>().ok().filter(|&lnum| lnum > 0)?;
    (lnum.to_string() == key).then_some(lnum)
}

fn file_key(file: &Path) -> Result<KeyPath> {
    let raw = file
        .to_str()
        .ok_or_else(|| StoreError::NonUtf8Path(file.to_path_buf()))?;
    Ok(KeyPath::root().child(codec::encode(raw)))
}

fn line_key(file: &Path, lnum: u32) -> Result<KeyPath> {
    if lnum == 0 {
        return Err(StoreError::InvalidLine(lnum));
    }
    Ok(file_key(file)?.child(lnum.to_string()))
}
