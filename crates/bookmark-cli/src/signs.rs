//! Gutter sign scripts.
//!
//! After every change the markers of a file are cleared and placed again
//! from storage; nothing is updated incrementally. Mutations also fire the
//! `User BookmarkChange` autocommand so user config can react.

use std::fmt::Write as _;
use std::path::Path;

use bookmark_core::config::SignConfig;

use crate::{BookmarkBackend, CommandOutput};

pub const SIGN_GROUP: &str = "bookmark";
pub const SIGN_NAME: &str = "Bookmark";
pub const SIGN_HIGHLIGHT_GROUP: &str = "BookmarkSign";
pub const CHANGE_EVENT: &str = "BookmarkChange";

/// `highlight` link plus `sign define` for the bookmark marker.
pub fn render_define(sign: &SignConfig) -> String {
    format!(
        "hi link {SIGN_HIGHLIGHT_GROUP} {}\nsign define {SIGN_NAME} text={} texthl={SIGN_HIGHLIGHT_GROUP}\n",
        sign.highlight, sign.text
    )
}

/// Unplace every bookmark sign of `file`, then place one per line.
pub fn render_refresh(file: &Path, lines: &[u32]) -> String {
    let file = file.display();
    let mut out = format!("silent! sign unplace * group={SIGN_GROUP} file={file}\n");
    for lnum in lines {
        let _ = writeln!(
            out,
            "sign place {lnum} line={lnum} name={SIGN_NAME} group={SIGN_GROUP} file={file}"
        );
    }
    out
}

/// Notify `User` autocommands that bookmarks changed.
pub fn render_changed() -> String {
    format!("silent! doautocmd <nomodeline> User {CHANGE_EVENT}\n")
}

fn refresh_output(backend: &dyn BookmarkBackend, file: &Path) -> CommandOutput {
    match backend.line_numbers(file) {
        Ok(lines) => CommandOutput::success(render_refresh(file, &lines)),
        Err(e) => CommandOutput::failure(e),
    }
}

/// Sign refresh for `file` followed by the change event.
pub(crate) fn changed_output(backend: &dyn BookmarkBackend, file: &Path) -> CommandOutput {
    let mut out = refresh_output(backend, file);
    if out.exit_code == 0 {
        out.stdout.push_str(&render_changed());
    }
    out
}

pub fn run_signs_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let mut define = false;
    let mut positional: Vec<&str> = Vec::new();
    for arg in args {
        match *arg {
            "-h" | "--help" | "help" => return CommandOutput::success(format!("{HELP_TEXT}\n")),
            "--define" => define = true,
            "" => {}
            v if v.starts_with('-') => return CommandOutput::usage_error(format!("unknown flag: {v}")),
            v => positional.push(v),
        }
    }

    if define {
        if !positional.is_empty() {
            return CommandOutput::usage_error("--define takes no arguments");
        }
        return CommandOutput::success(render_define(&backend.sign_config()));
    }

    let [file] = positional.as_slice() else {
        return CommandOutput::usage_error(format!(
            "expected 1 arg (FILE), got {}",
            positional.len()
        ));
    };
    let path = match backend.resolve_path(file) {
        Ok(p) => p,
        Err(e) => return CommandOutput::failure(e),
    };
    refresh_output(backend, &path)
}

const HELP_TEXT: &str = "\
Print the gutter sign script for a file

Usage:
  bookmark signs FILE
  bookmark signs --define

Flags:
      --define   print the sign definition instead
  -h, --help     help for signs";
