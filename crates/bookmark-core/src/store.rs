//! Key-path addressed store over a single JSON document on disk.
//!
//! Every call re-reads the backing file; every mutation rewrites the whole
//! document. There is no cache and no locking, so concurrent writers race
//! with last-write-wins at document granularity.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::document::{Document, KeyPath};
use crate::error::{Result, StoreError};

const EMPTY_DOCUMENT: &str = "{}";

#[derive(Debug, Clone)]
pub struct KeyPathStore {
    path: PathBuf,
}

impl KeyPathStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Read the whole document.
    ///
    /// Never fails: a missing directory, unreadable file, malformed JSON or
    /// the legacy array format all reset the file to `{}` and yield an
    /// empty document.
    pub fn load(&self) -> Document {
        let dir = self.dir();
        if !dir.is_dir() {
            debug!(
                target: "bookmark_core::store",
                dir = %dir.display(),
                "storage directory missing; creating"
            );
            if let Err(err) = fs::create_dir_all(dir) {
                warn!(
                    target: "bookmark_core::store",
                    dir = %dir.display(),
                    error = %err,
                    "create storage directory failed"
                );
            }
            self.heal();
            return Document::new();
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() == ErrorKind::NotFound {
                    debug!(
                        target: "bookmark_core::store",
                        path = %self.path.display(),
                        "bookmark file missing; initializing"
                    );
                } else {
                    warn!(
                        target: "bookmark_core::store",
                        path = %self.path.display(),
                        error = %err,
                        "bookmark file unreadable; resetting"
                    );
                }
                self.heal();
                return Document::new();
            }
        };

        match Document::parse(&raw) {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    target: "bookmark_core::store",
                    path = %self.path.display(),
                    reason = %err,
                    "bookmark file corrupt; resetting"
                );
                self.heal();
                Document::new()
            }
        }
    }

    fn heal(&self) {
        if let Err(err) = write_atomic(&self.path, EMPTY_DOCUMENT) {
            warn!(
                target: "bookmark_core::store",
                error = %err,
                "reset bookmark file failed"
            );
        }
    }

    /// Value at `key`, or the whole document for the root path.
    pub fn fetch(&self, key: &KeyPath) -> Option<Value> {
        let document = self.load();
        if key.is_root() {
            return Some(document.into_value());
        }
        document.lookup(key).cloned()
    }

    pub fn exists(&self, key: &KeyPath) -> bool {
        self.load().contains(key)
    }

    /// Write `data` at `key`, creating intermediate objects, then persist.
    pub fn push<T: Serialize + ?Sized>(&self, key: &KeyPath, data: &T) -> Result<()> {
        if key.is_root() {
            return Err(StoreError::EmptyKeyPath);
        }
        let value = serde_json::to_value(data)?;
        let mut document = self.load();
        document.insert(key, value);
        self.write(&document)?;
        debug!(target: "bookmark_core::store", key = %key, "pushed");
        Ok(())
    }

    /// Remove the terminal key of `key`. Absent keys are a no-op and leave
    /// the file untouched.
    pub fn delete(&self, key: &KeyPath) -> Result<()> {
        if key.is_root() {
            return Err(StoreError::EmptyKeyPath);
        }
        let mut document = self.load();
        if document.remove(key).is_none() {
            return Ok(());
        }
        self.write(&document)?;
        debug!(target: "bookmark_core::store", key = %key, "deleted");
        Ok(())
    }

    /// Reset the backing file to `{}`. No-op unless it is a regular file.
    pub fn clear(&self) -> Result<()> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => {}
            _ => return Ok(()),
        }
        write_atomic(&self.path, EMPTY_DOCUMENT)?;
        info!(
            target: "bookmark_core::store",
            path = %self.path.display(),
            "cleared all bookmarks"
        );
        Ok(())
    }

    fn write(&self, document: &Document) -> Result<()> {
        let raw = document.to_json_pretty()?;
        write_atomic(&self.path, &raw)
    }
}

/// Replace `path` with `contents` through a sibling temp file and rename.
///
/// A symlinked `path` is resolved first so the link survives and its
/// target receives the new contents.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if let Some(parent) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
    }
    let temp = target.with_extension("json.tmp");
    fs::write(&temp, contents).map_err(|err| StoreError::io(&temp, err))?;
    if let Err(err) = fs::rename(&temp, &target) {
        let _ = fs::remove_file(&temp);
        return Err(StoreError::io(&target, err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    fn store_in(dir: &Path) -> KeyPathStore {
        KeyPathStore::new(dir.join("bookmark.json"))
    }

    fn raw(store: &KeyPathStore) -> Value {
        let text = fs::read_to_string(store.path()).expect("read backing file");
        serde_json::from_str(&text).expect("backing file is json")
    }

    #[test]
    fn load_creates_missing_directory_and_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = KeyPathStore::new(tmp.path().join("nested/state/bookmark.json"));

        assert!(store.load().is_empty());
        assert_eq!(raw(&store), json!({}));
    }

    #[test]
    fn load_initializes_missing_file_in_existing_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());

        assert!(store.load().is_empty());
        assert_eq!(raw(&store), json!({}));
    }

    #[test]
    fn load_recovers_from_garbage() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        fs::write(store.path(), b"\x00\xffnot json{{").expect("write garbage");

        assert_eq!(store.load(), Document::new());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{}");
    }

    #[test]
    fn load_discards_legacy_array_format() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        fs::write(store.path(), "[1,2,3]").expect("write legacy");

        assert!(store.load().is_empty());
        assert_eq!(raw(&store), json!({}));
    }

    #[test]
    fn load_resets_scalar_root() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        fs::write(store.path(), "\"just a string\"").expect("write scalar");

        assert!(store.load().is_empty());
        assert_eq!(raw(&store), json!({}));
    }

    #[test]
    fn load_returns_existing_object() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        fs::write(store.path(), "\n  {\"a\": {\"1\": 2}}\n").expect("write");

        assert_eq!(store.load().into_value(), json!({"a": {"1": 2}}));
    }

    #[test]
    fn fetch_walks_segments_and_returns_none_when_absent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        store
            .push(&"a.b.c".into(), &json!("deep"))
            .expect("push");

        assert_eq!(store.fetch(&"a.b.c".into()), Some(json!("deep")));
        assert_eq!(store.fetch(&"a.b".into()), Some(json!({"c": "deep"})));
        assert_eq!(store.fetch(&"a.x.c".into()), None);
        assert_eq!(
            store.fetch(&KeyPath::root()),
            Some(json!({"a": {"b": {"c": "deep"}}}))
        );
    }

    #[test]
    fn exists_tracks_push_and_delete() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        let key = KeyPath::parse("file.12");

        assert!(!store.exists(&key));
        store.push(&key, &json!({"line": "x"})).expect("push");
        assert!(store.exists(&key));
        store.delete(&key).expect("delete");
        assert!(!store.exists(&key));
        assert!(store.exists(&"file".into()));
    }

    #[test]
    fn push_overwrites_wholesale_and_writes_pretty_json() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        store
            .push(&"f.1".into(), &json!({"line": "a", "annotation": "n"}))
            .expect("push");
        store.push(&"f.1".into(), &json!({"line": "b"})).expect("push");

        assert_eq!(raw(&store), json!({"f": {"1": {"line": "b"}}}));
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"f\": {"), "not pretty: {text}");
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn push_to_root_is_rejected() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        let err = store.push(&KeyPath::root(), &json!({})).unwrap_err();
        assert!(matches!(err, StoreError::EmptyKeyPath));
    }

    #[test]
    fn delete_of_missing_key_does_not_rewrite() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        fs::write(store.path(), "{\"f\":{\"1\":{}}}").expect("write compact");

        store.delete(&"g.1".into()).expect("delete missing parent");
        store.delete(&"f.2".into()).expect("delete missing leaf");
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "{\"f\":{\"1\":{}}}"
        );
    }

    #[test]
    fn delete_keeps_empty_parent_object() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        store.push(&"f.3".into(), &json!({})).expect("push");
        store.delete(&"f.3".into()).expect("delete");

        assert_eq!(raw(&store), json!({"f": {}}));
    }

    #[test]
    fn clear_is_noop_without_regular_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        store.clear().expect("clear missing");
        assert!(!store.path().exists());

        let dir_store = KeyPathStore::new(tmp.path());
        dir_store.clear().expect("clear directory");
        assert!(tmp.path().is_dir());
    }

    #[test]
    fn clear_twice_yields_empty_document() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        store.push(&"f.1".into(), &json!({})).expect("push");

        store.clear().expect("clear");
        let once = fs::read_to_string(store.path()).unwrap();
        store.clear().expect("clear again");
        let twice = fs::read_to_string(store.path()).unwrap();

        assert_eq!(once, "{}");
        assert_eq!(once, twice);
        assert!(store.load().is_empty());
    }

    #[test]
    fn push_fails_with_io_when_parent_is_a_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("write blocker");
        let store = KeyPathStore::new(blocker.join("bookmark.json"));

        assert!(store.load().is_empty());
        let err = store.push(&"f.1".into(), &json!({})).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "err={err}");
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[test]
    fn failed_write_leaves_document_unchanged() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        let store = store_in(&root);
        store.push(&"f.1".into(), &json!({"line": "a"})).expect("push");
        let before = fs::read_to_string(store.path()).unwrap();
        fs::create_dir(store.path().with_extension("json.tmp")).expect("occupy temp path");

        let err = store.push(&"f.2".into(), &json!({"line": "b"})).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "err={err}");
        let err = store.delete(&"f.1".into()).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "err={err}");
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn push_through_symlink_updates_link_target() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().canonicalize().expect("canonicalize");
        let real = root.join("dotfiles.json");
        fs::write(&real, "{}").expect("write target");
        let link = root.join("bookmark.json");
        std::os::unix::fs::symlink(&real, &link).expect("symlink");
        let store = KeyPathStore::new(&link);

        store.push(&"f.3".into(), &json!({"line": "x"})).expect("push");

        assert!(fs::symlink_metadata(&link)
            .expect("link metadata")
            .file_type()
            .is_symlink());
        let text = fs::read_to_string(&real).expect("read target");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value, json!({"f": {"3": {"line": "x"}}}));

        store.clear().expect("clear");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "{}");
    }
}
