use bookmark_core::Direction;

use crate::cursor::resolve_position;
use crate::{BookmarkBackend, CommandOutput};

/// Print the jump target line, or nothing when there is none.
pub fn run_jump_for_test(
    direction: Direction,
    args: &[&str],
    backend: &dyn BookmarkBackend,
) -> CommandOutput {
    let mut positional: Vec<&str> = Vec::new();
    for arg in args {
        match *arg {
            "-h" | "--help" | "help" => return CommandOutput::success(help_text(direction)),
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

    match backend.jump_target(&path, lnum, direction) {
        Ok(Some(target)) => CommandOutput::success(format!("{target}\n")),
        Ok(None) => CommandOutput::success(String::new()),
        Err(e) => CommandOutput::failure(format!("{direction} bookmark: {e}")),
    }
}

fn help_text(direction: Direction) -> String {
    let (summary, relation) = match direction {
        Direction::Next => ("Print the next bookmarked line after a line", "after"),
        Direction::Prev => ("Print the previous bookmarked line before a line", "before"),
    };
    format!(
        "{summary}\n\nUsage:\n  bookmark {direction} FILE LNUM\n\n\
         Prints the nearest bookmarked line strictly {relation} LNUM in FILE,\n\
         or nothing when there is none. Does not wrap around.\n\n\
         Flags:\n  -h, --help   help for {direction}\n"
    )
}
