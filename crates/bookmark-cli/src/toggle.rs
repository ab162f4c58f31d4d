use bookmark_core::Toggled;
use tracing::debug;

use crate::cursor::resolve_cursor;
use crate::signs::changed_output;
use crate::{BookmarkBackend, CommandOutput};

pub fn run_toggle_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let mut filetype: Option<String> = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut i = 0usize;
    while i < args.len() {
        match args[i] {
            "-h" | "--help" | "help" => return CommandOutput::success(format!("{HELP_TEXT}\n")),
            "--filetype" => {
                let Some(v) = args.get(i + 1) else {
                    return CommandOutput::usage_error("flag needs an argument: --filetype");
                };
                filetype = Some((*v).to_string());
                i += 2;
                continue;
            }
            v if v.starts_with("--filetype=") => {
                filetype = Some(v.trim_start_matches("--filetype=").to_string());
            }
            "" => {}
            v if v.starts_with('-') => return CommandOutput::usage_error(format!("unknown flag: {v}")),
            v => positional.push(v),
        }
        i += 1;
    }

    let [file, lnum] = positional.as_slice() else {
        return CommandOutput::usage_error(format!(
            "expected 2 args (FILE LNUM), got {}",
            positional.len()
        ));
    };
    let cursor = match resolve_cursor(backend, file, lnum, filetype.as_deref()) {
        Ok(c) => c,
        Err(out) => return out,
    };

    match backend.toggle(&cursor) {
        Ok(Toggled::Added) => debug!(path = %cursor.path.display(), lnum = cursor.lnum, "bookmark added"),
        Ok(Toggled::Removed) => debug!(path = %cursor.path.display(), lnum = cursor.lnum, "bookmark removed"),
        Err(e) => return CommandOutput::failure(format!("toggle bookmark: {e}")),
    }
    changed_output(backend, &cursor.path)
}

const HELP_TEXT: &str = "\
Add or remove the bookmark on a line

Usage:
  bookmark toggle FILE LNUM [flags]

Prints the refreshed sign script for FILE, then fires User BookmarkChange.

Flags:
      --filetype NAME   language tag to record (default: from extension)
  -h, --help            help for toggle";
