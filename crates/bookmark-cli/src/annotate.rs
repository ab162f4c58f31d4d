use crate::cursor::resolve_cursor;
use crate::signs::changed_output;
use crate::{BookmarkBackend, CommandOutput};

pub fn run_annotate_for_test(args: &[&str], backend: &dyn BookmarkBackend) -> CommandOutput {
    let mut filetype: Option<String> = None;
    let mut positional: Vec<&str> = Vec::new();

    let mut i = 0usize;
    while i < args.len() {
        match args[i] {
            "-h" | "--help" => return CommandOutput::success(format!("{HELP_TEXT}\n")),
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
            "--" => {
                positional.extend_from_slice(&args[i + 1..]);
                break;
            }
            v if v.starts_with('-') && positional.len() < 2 => {
                return CommandOutput::usage_error(format!("unknown flag: {v}"));
            }
            v => positional.push(v),
        }
        i += 1;
    }

    if positional.len() < 2 {
        return CommandOutput::usage_error(format!(
            "expected at least 2 args (FILE LNUM [TEXT...]), got {}",
            positional.len()
        ));
    }
    let (file, lnum) = (positional[0], positional[1]);
    let annotation = positional[2..].join(" ");
    let annotation = annotation.trim();
    // Blank input means the prompt was cancelled.
    if annotation.is_empty() {
        return CommandOutput::success(String::new());
    }

    let cursor = match resolve_cursor(backend, file, lnum, filetype.as_deref()) {
        Ok(c) => c,
        Err(out) => return out,
    };
    if let Err(e) = backend.annotate(&cursor, annotation) {
        return CommandOutput::failure(format!("annotate bookmark: {e}"));
    }
    changed_output(backend, &cursor.path)
}

const HELP_TEXT: &str = "\
Bookmark a line with a note

Usage:
  bookmark annotate FILE LNUM TEXT... [flags]

Replaces any bookmark already on the line. Blank TEXT does nothing.
Prints the refreshed sign script for FILE, then fires User BookmarkChange.

Flags:
      --filetype NAME   language tag to record (default: from extension)
  -h, --help            help for annotate";
