use crate::cursor::resolve_position;
use crate::signs::changed_output;
use crate::{BookmarkBackend, CommandOutput};

pub fn run_delete_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let mut positional: Vec<&str> = Vec::new();
    for arg in args {
        match *arg {
            "-h" | "--help" | "help" => return CommandOutput::success(format!("{HELP_TEXT}\n")),
            "" => {}
            v if v.starts_with('-') => return CommandOutput::usage_error(format!("unknown flag: {v}")),
            v => positional.push(v),
        }
    }
    let [file, lnum] = positional.as_slice() else {
        return CommandOutput::usage_error(format!(
            "expected 2 args (FILE LNUM), got {}",
            positional.len()
        ));
    };
    let (path, lnum) = match resolve_position(backend, file, lnum) {
        Ok(v) => v,
        Err(out) => return out,
    };
    if let Err(e) = backend.delete(&path, lnum) {
        return CommandOutput::failure(format!("delete bookmark: {e}"));
    }
    changed_output(backend, &path)
}

const HELP_TEXT: &str = "\
Remove the bookmark on a line

Usage:
  bookmark delete FILE LNUM

Removing a line that has no bookmark does nothing.
Prints the refreshed sign script for FILE, then fires User BookmarkChange.

Flags:
  -h, --help   help for delete";
