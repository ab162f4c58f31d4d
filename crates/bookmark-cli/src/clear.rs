use tracing::info;

use crate::signs::{changed_output, render_changed};
use crate::{BookmarkBackend, CommandOutput};

pub fn run_clear_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let mut all = false;
    let mut positional: Vec<&str> = Vec::new();
    for arg in args {
        match *arg {
            "-h" | "--help" | "help" => return CommandOutput::success(format!("{HELP_TEXT}\n")),
            "--all" | "-a" => all = true,
            "" => {}
            v if v.starts_with('-') => return CommandOutput::usage_error(format!("unknown flag: {v}")),
            v => positional.push(v),
        }
    }

    if all {
        if !positional.is_empty() {
            return CommandOutput::usage_error("--all takes no FILE argument");
        }
        if let Err(e) = backend.clear_all() {
            return CommandOutput::failure(format!("clear bookmarks: {e}"));
        }
        info!("cleared bookmarks for all files");
        return CommandOutput::success(render_changed());
    }

    let [file] = positional.as_slice() else {
        return CommandOutput::usage_error(format!(
            "expected 1 arg (FILE) or --all, got {}",
            positional.len()
        ));
    };
    let path = match backend.resolve_path(file) {
        Ok(p) => p,
        Err(e) => return CommandOutput::failure(e),
    };
    if let Err(e) = backend.clear_file(&path) {
        return CommandOutput::failure(format!("clear bookmarks: {e}"));
    }
    changed_output(backend, &path)
}

const HELP_TEXT: &str = "\
Remove bookmarks of a file or of all files

Usage:
  bookmark clear FILE
  bookmark clear --all

Prints the refreshed sign script for FILE, then fires User BookmarkChange.

Flags:
  -a, --all    remove bookmarks of every file
  -h, --help   help for clear";
