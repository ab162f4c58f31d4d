use std::io::Write;
use std::path::PathBuf;

use bookmark_core::BookmarkEntry;
use serde::Serialize;
use tabwriter::TabWriter;

use crate::{BookmarkBackend, CommandOutput};

/// Zero-based position a list item opens at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: u32,
    pub character: u32,
}

/// One row of the bookmark list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub label: String,
    pub filter_text: String,
    pub path: PathBuf,
    pub lnum: u32,
    pub line: String,
    pub filetype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub location: Location,
}

impl From<BookmarkEntry> for ListItem {
    fn from(entry: BookmarkEntry) -> Self {
        let path = entry.path.display().to_string();
        let annotation = entry.bookmark.annotation.unwrap_or_default();
        Self {
            label: format!("{path} line: {}\t\t{annotation}", entry.lnum),
            filter_text: format!("{annotation}{path}"),
            path: entry.path,
            lnum: entry.lnum,
            line: entry.bookmark.line,
            filetype: entry.bookmark.filetype,
            annotation: if annotation.is_empty() {
                None
            } else {
                Some(annotation)
            },
            location: Location {
                line: entry.lnum.saturating_sub(1),
                character: 0,
            },
        }
    }
}

pub fn run_list_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let mut json = false;
    let mut positional = 0usize;
    for arg in args {
        match *arg {
            "-h" | "--help" | "help" => return CommandOutput::success(format!("{HELP_TEXT}\n")),
            "--json" => json = true,
            "" => {}
            v if v.starts_with('-') => return CommandOutput::usage_error(format!("unknown flag: {v}")),
            _ => positional += 1,
        }
    }
    if positional > 0 {
        return CommandOutput::usage_error(format!("expected at most 0 args, got {positional}"));
    }

    let (entries, report) = match backend.list() {
        Ok(v) => v,
        Err(e) => return CommandOutput::failure(format!("list bookmarks: {e}")),
    };
    let items: Vec<ListItem> = entries.into_iter().map(ListItem::from).collect();

    let stdout = if json {
        match serde_json::to_string_pretty(&items) {
            Ok(encoded) => format!("{encoded}\n"),
            Err(e) => return CommandOutput::failure(format!("encode bookmarks: {e}")),
        }
    } else {
        format_list(&items)
    };

    let mut stderr = String::new();
    if report.undecodable > 0 && backend.report_undecodable() {
        stderr = format!(
            "warning: skipped {} bookmark file key(s) that could not be decoded\n",
            report.undecodable
        );
    }
    CommandOutput {
        stdout,
        stderr,
        exit_code: 0,
    }
}

fn format_list(items: &[ListItem]) -> String {
    let mut tw = TabWriter::new(Vec::new());
    for item in items {
        let _ = writeln!(&mut tw, "{}", item.label);
    }
    let bytes = tabwriter_into_bytes(tw);
    String::from_utf8_lossy(&bytes).into_owned()
}

fn tabwriter_into_bytes(mut tw: TabWriter<Vec<u8>>) -> Vec<u8> {
    loop {
        match tw.into_inner() {
            Ok(v) => return v,
            Err(e) => tw = e.into_inner(),
        }
    }
}

const HELP_TEXT: &str = "\
List bookmarks of all existing files

Usage:
  bookmark list [flags]

Rows are the list labels (\"PATH line: LNUM<TAB><TAB>ANNOTATION\") with
the tab-separated columns aligned into a table; --json keeps the raw labels.
Bookmarks of files that no longer exist are left out but kept in storage.

Flags:
  -h, --help   help for list
      --json   Output as JSON";
