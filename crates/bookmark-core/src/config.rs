//! Bookmark configuration.
//!
//! Precedence: defaults < config file < environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const ENV_STORAGE_DIR: &str = "BOOKMARK_STORAGE_DIR";
pub const ENV_STORAGE_FILE: &str = "BOOKMARK_STORAGE_FILE";
pub const DEFAULT_STORAGE_FILE: &str = "bookmark.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub sign: SignConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub file: String,
}

/// Gutter marker appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignConfig {
    pub text: String,
    pub highlight: String,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            text: "🔖".to_string(),
            highlight: "Tag".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub report_undecodable: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            report_undecodable: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn default_from_env() -> Self {
        let dir = match std::env::var("XDG_DATA_HOME") {
            Ok(xdg) if !xdg.trim().is_empty() => PathBuf::from(xdg.trim()).join("bookmark"),
            _ => {
                let home = std::env::var("HOME").unwrap_or_default();
                if home.is_empty() {
                    PathBuf::from(".bookmark")
                } else {
                    PathBuf::from(home)
                        .join(".local")
                        .join("share")
                        .join("bookmark")
                }
            }
        };
        Self {
            storage: StorageConfig {
                dir,
                file: DEFAULT_STORAGE_FILE.to_string(),
            },
            sign: SignConfig::default(),
            listing: ListingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Location of the bookmark document.
    pub fn storage_path(&self) -> PathBuf {
        self.storage.dir.join(&self.storage.file)
    }

    fn apply_env(&mut self) -> Result<(), String> {
        if let Ok(dir) = std::env::var(ENV_STORAGE_DIR) {
            if !dir.trim().is_empty() {
                self.storage.dir = expand_tilde(dir.trim())?;
            }
        }
        if let Ok(file) = std::env::var(ENV_STORAGE_FILE) {
            if !file.trim().is_empty() {
                self.storage.file = file.trim().to_string();
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    storage: PartialStorageConfig,
    #[serde(default)]
    sign: PartialSignConfig,
    #[serde(default)]
    listing: PartialListingConfig,
    #[serde(default)]
    logging: PartialLoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PartialStorageConfig {
    #[serde(default)]
    dir: String,
    #[serde(default)]
    file: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialSignConfig {
    #[serde(default)]
    text: String,
    #[serde(default)]
    highlight: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialListingConfig {
    #[serde(default)]
    report_undecodable: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
}

/// Load config. An explicit `config_file` must be readable; the default
/// location is optional. Returns the file actually used, if any.
pub fn load_config(config_file: Option<&str>) -> Result<(Config, Option<PathBuf>), String> {
    let mut cfg = Config::default_from_env();

    let explicit = config_file
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);

    let (path_to_try, required) = match explicit {
        Some(path) => (Some(path), true),
        None => (default_config_path(), false),
    };

    let mut used = None;
    if let Some(path) = path_to_try {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                apply_yaml(&mut cfg, &text)?;
                used = Some(path);
            }
            Err(err) => {
                if required {
                    return Err(format!("failed to load config file {}: {err}", path.display()));
                }
            }
        }
    }

    cfg.apply_env()?;
    Ok((cfg, used))
}

fn apply_yaml(cfg: &mut Config, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let partial: PartialConfig =
        serde_yaml::from_str(text).map_err(|err| format!("parse config: {err}"))?;
    apply_partial(cfg, partial)
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) -> Result<(), String> {
    if !partial.storage.dir.trim().is_empty() {
        cfg.storage.dir = expand_tilde(partial.storage.dir.trim())?;
    }
    if !partial.storage.file.trim().is_empty() {
        cfg.storage.file = partial.storage.file.trim().to_string();
    }
    if !partial.sign.text.trim().is_empty() {
        cfg.sign.text = partial.sign.text.trim().to_string();
    }
    if !partial.sign.highlight.trim().is_empty() {
        cfg.sign.highlight = partial.sign.highlight.trim().to_string();
    }
    if let Some(report) = partial.listing.report_undecodable {
        cfg.listing.report_undecodable = report;
    }
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = partial.logging.level.trim().to_string();
    }
    Ok(())
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("bookmark").join("config.yaml"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("bookmark")
                    .join("config.yaml"),
            );
        }
    }
    None
}

fn expand_tilde(input: &str) -> Result<PathBuf, String> {
    if input == "~" {
        let home = std::env::var("HOME").map_err(|_| "failed to resolve HOME".to_string())?;
        return Ok(PathBuf::from(home));
    }
    if let Some(rest) = input.strip_prefix("~/") {
        let home = std::env::var("HOME").map_err(|_| "failed to resolve HOME".to_string())?;
        return Ok(PathBuf::from(home).join(rest));
    }
    Ok(Path::new(input).to_path_buf())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn defaults_point_at_bookmark_json() {
        let cfg = Config::default_from_env();
        assert_eq!(cfg.storage.file, "bookmark.json");
        assert!(cfg.storage_path().ends_with("bookmark.json"));
        assert_eq!(cfg.sign.text, "🔖");
        assert_eq!(cfg.sign.highlight, "Tag");
        assert!(cfg.listing.report_undecodable);
        assert_eq!(cfg.logging.level, "warn");
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut cfg = Config::default_from_env();
        apply_yaml(
            &mut cfg,
            "storage:\n  dir: /var/lib/marks\n  file: marks.json\nsign:\n  text: '>>'\n  highlight: Search\nlisting:\n  report_undecodable: false\nlogging:\n  level: debug\n",
        )
        .expect("apply yaml");

        assert_eq!(cfg.storage_path(), PathBuf::from("/var/lib/marks/marks.json"));
        assert_eq!(
            cfg.sign,
            SignConfig {
                text: ">>".to_string(),
                highlight: "Search".to_string(),
            }
        );
        assert!(!cfg.listing.report_undecodable);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let mut cfg = Config::default_from_env();
        apply_yaml(&mut cfg, "sign:\n  highlight: Todo\n").expect("apply yaml");
        assert_eq!(cfg.sign.text, "🔖");
        assert_eq!(cfg.sign.highlight, "Todo");
        assert_eq!(cfg.storage.file, "bookmark.json");
    }

    #[test]
    fn empty_yaml_is_ok() {
        let mut cfg = Config::default_from_env();
        apply_yaml(&mut cfg, "\n").expect("empty yaml");
        assert_eq!(cfg.storage.file, "bookmark.json");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let mut cfg = Config::default_from_env();
        let err = apply_yaml(&mut cfg, "storage: [unclosed").unwrap_err();
        assert!(err.starts_with("parse config:"), "err={err}");
    }

    #[test]
    fn explicit_missing_config_file_is_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let missing = tmp.path().join("nope.yaml");
        let err = load_config(Some(missing.to_str().unwrap())).unwrap_err();
        assert!(err.contains("failed to load config file"), "err={err}");
    }

    #[test]
    fn explicit_config_file_is_used() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "storage:\n  file: other.json\n").expect("write config");

        let (cfg, used) = load_config(Some(path.to_str().unwrap())).expect("load");
        assert_eq!(used, Some(path));
        // BOOKMARK_STORAGE_FILE wins when set.
        if std::env::var(ENV_STORAGE_FILE).is_err() {
            assert_eq!(cfg.storage.file, "other.json");
        }
    }

    #[test]
    fn expand_tilde_leaves_plain_paths() {
        assert_eq!(
            expand_tilde("/abs/path").expect("expand"),
            PathBuf::from("/abs/path")
        );
    }
}
