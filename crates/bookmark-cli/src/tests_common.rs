#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bookmark_core::config::SignConfig;
use bookmark_core::{BookmarkEntry, BookmarkRecord, Direction, ListingReport, Toggled};

use crate::{BookmarkBackend, Cursor};

/// In-memory backend; every path is treated as existing.
pub(crate) struct MockBookmarkBackend {
    files: RefCell<BTreeMap<PathBuf, BTreeMap<u32, BookmarkRecord>>>,
    fail_with: Option<String>,
    undecodable: Cell<usize>,
    report_undecodable: Cell<bool>,
}

impl MockBookmarkBackend {
    pub(crate) fn new() -> Self {
        Self {
            files: RefCell::new(BTreeMap::new()),
            fail_with: None,
            undecodable: Cell::new(0),
            report_undecodable: Cell::new(true),
        }
    }

    /// Backend whose storage operations all fail with `message`.
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub(crate) fn seed(&self, path: PathBuf, lines: &[u32]) {
        let mut files = self.files.borrow_mut();
        let bucket = files.entry(path.clone()).or_default();
        for &lnum in lines {
            bucket.insert(
                lnum,
                BookmarkRecord {
                    line: format!("line {lnum}"),
                    filetype: crate::cursor::detect_filetype(&path).to_string(),
                    annotation: None,
                },
            );
        }
    }

    pub(crate) fn record(&self, path: &Path, lnum: u32) -> Option<BookmarkRecord> {
        self.files
            .borrow()
            .get(path)
            .and_then(|bucket| bucket.get(&lnum))
            .cloned()
    }

    pub(crate) fn set_undecodable(&self, count: usize) {
        self.undecodable.set(count);
    }

    pub(crate) fn set_report_undecodable(&self, report: bool) {
        self.report_undecodable.set(report);
    }

    fn check(&self) -> Result<(), String> {
        match &self.fail_with {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn put(&self, cursor: &Cursor, annotation: Option<&str>) {
        self.files
            .borrow_mut()
            .entry(cursor.path.clone())
            .or_default()
            .insert(
                cursor.lnum,
                BookmarkRecord {
                    line: cursor.line.clone(),
                    filetype: cursor.filetype.clone(),
                    annotation: annotation.map(str::to_string),
                },
            );
    }
}

impl BookmarkBackend for MockBookmarkBackend {
    fn resolve_path(&self, raw: &str) -> Result<PathBuf, String> {
        Ok(PathBuf::from(raw))
    }

    fn read_line(&self, _file: &Path, lnum: u32) -> Result<String, String> {
        Ok(format!("line {lnum}"))
    }

    fn toggle(&self, cursor: &Cursor) -> Result<Toggled, String> {
        self.check()?;
        if self.record(&cursor.path, cursor.lnum).is_some() {
            self.delete(&cursor.path, cursor.lnum)?;
            return Ok(Toggled::Removed);
        }
        self.put(cursor, None);
        Ok(Toggled::Added)
    }

    fn annotate(&self, cursor: &Cursor, annotation: &str) -> Result<(), String> {
        self.check()?;
        self.put(cursor, Some(annotation));
        Ok(())
    }

    fn delete(&self, file: &Path, lnum: u32) -> Result<(), String> {
        self.check()?;
        if let Some(bucket) = self.files.borrow_mut().get_mut(file) {
            bucket.remove(&lnum);
        }
        Ok(())
    }

    fn jump_target(
        &self,
        file: &Path,
        lnum: u32,
        direction: Direction,
    ) -> Result<Option<u32>, String> {
        let lines = self.line_numbers(file)?;
        Ok(match direction {
            Direction::Next => lines.into_iter().find(|&l| l > lnum),
            Direction::Prev => lines.into_iter().rev().find(|&l| l < lnum),
        })
    }

    fn line_numbers(&self, file: &Path) -> Result<Vec<u32>, String> {
        self.check()?;
        Ok(self
            .files
            .borrow()
            .get(file)
            .map(|bucket| bucket.keys().copied().collect())
            .unwrap_or_default())
    }

    fn list(&self) -> Result<(Vec<BookmarkEntry>, ListingReport), String> {
        self.check()?;
        let entries: Vec<BookmarkEntry> = self
            .files
            .borrow()
            .iter()
            .flat_map(|(path, bucket)| {
                bucket.iter().map(|(&lnum, record)| BookmarkEntry {
                    path: path.clone(),
                    lnum,
                    bookmark: record.clone(),
                })
            })
            .collect();
        let report = ListingReport {
            listed: entries.len(),
            undecodable: self.undecodable.get(),
            stale: 0,
        };
        Ok((entries, report))
    }

    fn clear_file(&self, file: &Path) -> Result<(), String> {
        self.check()?;
        self.files.borrow_mut().remove(file);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), String> {
        self.check()?;
        self.files.borrow_mut().clear();
        Ok(())
    }

    fn sign_config(&self) -> SignConfig {
        SignConfig::default()
    }

    fn report_undecodable(&self) -> bool {
        self.report_undecodable.get()
    }
}
