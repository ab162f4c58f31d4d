//! Resolve `FILE LNUM` arguments into the facts an editor would supply.

use std::path::{Path, PathBuf};

use crate::{BookmarkBackend, CommandOutput, Cursor};

/// Parse a 1-based line number argument.
pub fn parse_lnum(raw: &str) -> Result<u32, String> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(format!("invalid line number {raw:?}: lines start at 1")),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("invalid line number {raw:?}")),
    }
}

/// Resolve `file` and `lnum` arguments to an absolute path and line.
pub fn resolve_position(
    backend: &dyn BookmarkBackend,
    file: &str,
    lnum: &str,
) -> Result<(PathBuf, u32), CommandOutput> {
    let lnum = parse_lnum(lnum).map_err(CommandOutput::usage_error)?;
    if file.trim().is_empty() {
        return Err(CommandOutput::usage_error("file path required"));
    }
    let path = backend.resolve_path(file).map_err(CommandOutput::failure)?;
    Ok((path, lnum))
}

/// Build the full cursor, reading the line text through the backend.
pub fn resolve_cursor(
    backend: &dyn BookmarkBackend,
    file: &str,
    lnum: &str,
    filetype: Option<&str>,
) -> Result<Cursor, CommandOutput> {
    let (path, lnum) = resolve_position(backend, file, lnum)?;
    let line = backend
        .read_line(&path, lnum)
        .map_err(CommandOutput::failure)?;
    let filetype = match filetype.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => f.to_string(),
        None => detect_filetype(&path).to_string(),
    };
    Ok(Cursor {
        path,
        lnum,
        line,
        filetype,
    })
}

/// Language tag for a path, from its file name or extension.
pub fn detect_filetype(path: &Path) -> &'static str {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    match name {
        "Makefile" | "makefile" | "GNUmakefile" => return "make",
        "Dockerfile" => return "dockerfile",
        "CMakeLists.txt" => return "cmake",
        _ => {}
    }
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "rs" => "rust",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "go" => "go",
        "py" => "python",
        "rb" => "ruby",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "ts" => "typescript",
        "tsx" => "typescriptreact",
        "java" => "java",
        "kt" => "kotlin",
        "lua" => "lua",
        "vim" => "vim",
        "sh" | "bash" => "sh",
        "zsh" => "zsh",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "html" | "htm" => "html",
        "css" => "css",
        "sql" => "sql",
        "txt" => "text",
        _ => "",
    }
}
