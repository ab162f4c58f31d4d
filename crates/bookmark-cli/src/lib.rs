//! bookmark-cli: command-line surface for line bookmarks.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use bookmark_core::config::{Config, SignConfig};
use bookmark_core::{BookmarkEntry, Bookmarks, Direction, ListingReport, Toggled};

static VERSION: OnceLock<String> = OnceLock::new();

/// Set the version string for `--version` output.
pub fn set_version(version: &str) {
    let _ = VERSION.set(version.to_string());
}

fn get_version() -> &'static str {
    VERSION.get().map(|s| s.as_str()).unwrap_or("dev")
}

fn help_text() -> String {
    "\
bookmark marks, annotates and navigates lines of files.

Usage:
  bookmark [command]

Available Commands:
  annotate    Bookmark a line with a note
  clear       Remove bookmarks of a file or of all files
  delete      Remove the bookmark on a line
  help        Help about any command
  list        List bookmarks of all existing files
  next        Print the next bookmarked line after a line
  prev        Print the previous bookmarked line before a line
  signs       Print the gutter sign script for a file
  toggle      Add or remove the bookmark on a line

Flags:
      --config PATH   config file (default $XDG_CONFIG_HOME/bookmark/config.yaml)
  -h, --help          help for bookmark
  -v, --version       version for bookmark

Use \"bookmark [command] --help\" for more information about a command.\n"
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub(crate) fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    pub(crate) fn usage_error(message: impl AsRef<str>) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("{}\n", message.as_ref()),
            exit_code: 2,
        }
    }

    pub(crate) fn failure(message: impl AsRef<str>) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("Error: {}\n", message.as_ref()),
            exit_code: 1,
        }
    }
}

/// Current-line facts the editor would supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub path: PathBuf,
    pub lnum: u32,
    pub line: String,
    pub filetype: String,
}

pub trait BookmarkBackend {
    /// Absolute form of a user-supplied path.
    fn resolve_path(&self, raw: &str) -> Result<PathBuf, String>;
    /// Text of line `lnum` (1-based); empty past end of file.
    fn read_line(&self, file: &Path, lnum: u32) -> Result<String, String>;
    fn toggle(&self, cursor: &Cursor) -> Result<Toggled, String>;
    fn annotate(&self, cursor: &Cursor, annotation: &str) -> Result<(), String>;
    fn delete(&self, file: &Path, lnum: u32) -> Result<(), String>;
    fn jump_target(
        &self,
        file: &Path,
        lnum: u32,
        direction: Direction,
    ) -> Result<Option<u32>, String>;
    fn line_numbers(&self, file: &Path) -> Result<Vec<u32>, String>;
    fn list(&self) -> Result<(Vec<BookmarkEntry>, ListingReport), String>;
    fn clear_file(&self, file: &Path) -> Result<(), String>;
    fn clear_all(&self) -> Result<(), String>;
    fn sign_config(&self) -> SignConfig;
    fn report_undecodable(&self) -> bool;
}

pub struct FilesystemBookmarkBackend {
    bookmarks: Bookmarks,
    config: Config,
}

impl FilesystemBookmarkBackend {
    pub fn new(config: Config) -> Self {
        Self {
            bookmarks: Bookmarks::open(config.storage_path()),
            config,
        }
    }
}

impl BookmarkBackend for FilesystemBookmarkBackend {
    fn resolve_path(&self, raw: &str) -> Result<PathBuf, String> {
        let path = PathBuf::from(raw);
        if let Ok(abs) = path.canonicalize() {
            return Ok(abs);
        }
        if path.is_absolute() {
            return Ok(path);
        }
        let cwd = std::env::current_dir().map_err(|e| format!("current dir: {e}"))?;
        Ok(cwd.join(path))
    }

    fn read_line(&self, file: &Path, lnum: u32) -> Result<String, String> {
        let text = match std::fs::read(file) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => return Err(format!("read {}: {e}", file.display())),
        };
        let index = usize::try_from(lnum.saturating_sub(1)).unwrap_or(usize::MAX);
        Ok(text
            .lines()
            .nth(index)
            .map(|l| l.trim_end_matches('\r').to_string())
            .unwrap_or_default())
    }

    fn toggle(&self, cursor: &Cursor) -> Result<Toggled, String> {
        self.bookmarks
            .toggle(&cursor.path, cursor.lnum, &cursor.line, &cursor.filetype)
            .map_err(|e| e.to_string())
    }

    fn annotate(&self, cursor: &Cursor, annotation: &str) -> Result<(), String> {
        self.bookmarks
            .annotate(
                &cursor.path,
                cursor.lnum,
                &cursor.line,
                &cursor.filetype,
                annotation,
            )
            .map_err(|e| e.to_string())
    }

    fn delete(&self, file: &Path, lnum: u32) -> Result<(), String> {
        self.bookmarks.delete(file, lnum).map_err(|e| e.to_string())
    }

    fn jump_target(
        &self,
        file: &Path,
        lnum: u32,
        direction: Direction,
    ) -> Result<Option<u32>, String> {
        self.bookmarks
            .jump_target(file, lnum, direction)
            .map_err(|e| e.to_string())
    }

    fn line_numbers(&self, file: &Path) -> Result<Vec<u32>, String> {
        self.bookmarks.line_numbers(file).map_err(|e| e.to_string())
    }

    fn list(&self) -> Result<(Vec<BookmarkEntry>, ListingReport), String> {
        let listing = self.bookmarks.list_all();
        Ok((listing.entries(), listing.report()))
    }

    fn clear_file(&self, file: &Path) -> Result<(), String> {
        self.bookmarks.clear_file(file).map_err(|e| e.to_string())
    }

    fn clear_all(&self) -> Result<(), String> {
        self.bookmarks.clear_all().map_err(|e| e.to_string())
    }

    fn sign_config(&self) -> SignConfig {
        self.config.sign.clone()
    }

    fn report_undecodable(&self) -> bool {
        self.config.listing.report_undecodable
    }
}

pub mod annotate;
pub mod clear;
pub mod cursor;
pub mod delete;
pub mod jump;
pub mod list;
pub mod logging;
pub mod signs;
pub mod toggle;

#[cfg(test)]
pub(crate) mod tests_common;

/// Remove a global `--config PATH` / `--config=PATH` flag from `args`.
pub fn take_config_flag(args: &mut Vec<String>) -> Result<Option<String>, String> {
    let Some(index) = args
        .iter()
        .position(|a| a == "--config" || a.starts_with("--config="))
    else {
        return Ok(None);
    };
    let flag = args.remove(index);
    if let Some(value) = flag.strip_prefix("--config=") {
        return Ok(Some(value.to_string()));
    }
    if index >= args.len() {
        return Err("flag needs an argument: --config".to_string());
    }
    Ok(Some(args.remove(index)))
}

pub fn run_cli_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let Some((cmd, rest)) = args.split_first() else {
        return CommandOutput::success(help_text());
    };

    match *cmd {
        "--help" | "-h" | "help" => CommandOutput::success(help_text()),
        "--version" | "-v" => {
            CommandOutput::success(format!("bookmark version {}\n", get_version()))
        }
        "annotate" => annotate::run_annotate_for_test(rest, backend),
        "clear" => clear::run_clear_for_test(rest, backend),
        "delete" | "rm" => delete::run_delete_for_test(rest, backend),
        "list" | "ls" => list::run_list_for_test(rest, backend),
        "next" => jump::run_jump_for_test(Direction::Next, rest, backend),
        "prev" => jump::run_jump_for_test(Direction::Prev, rest, backend),
        "signs" => signs::run_signs_for_test(rest, backend),
        "toggle" => toggle::run_toggle_for_test(rest, backend),
        _ => CommandOutput {
            stdout: String::new(),
            stderr: format!("Error: unknown command \"{cmd}\" for \"bookmark\"\n"),
            exit_code: 1,
        },
    }
}

pub fn run_cli(args: &[String], backend: &dyn BookmarkBackend) -> CommandOutput {
    let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    run_cli_for_test(&refs, backend)
}
