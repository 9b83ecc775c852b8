//! Configuration loader (C10): parses the `key=value` config file into
//! [`AppConfig`]. Load failure of any kind is logged and defaulted — config
//! loading never returns `Err` to its caller (§4.12, §7).

use std::path::{Path, PathBuf};

use tracing::warn;

/// Process configuration. `url` and `auth` are read normally but their
/// `Debug` output is masked; no `tracing` call anywhere in this crate is
/// allowed to interpolate the raw field (§3, §6).
#[derive(Clone)]
pub struct AppConfig {
    pub enabled: bool,
    pub height: u32,
    pub width: u32,
    pub quality: u8,
    pub url: String,
    pub auth: String,
    pub quiet_interval_secs: u64,
    pub debug_store_path: PathBuf,
    pub model_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 300,
            width: 400,
            quality: 95,
            url: String::new(),
            auth: String::new(),
            quiet_interval_secs: 120,
            debug_store_path: PathBuf::from("/tmp/.store"),
            model_dir: PathBuf::from("/opt/camwatch/models"),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("enabled", &self.enabled)
            .field("height", &self.height)
            .field("width", &self.width)
            .field("quality", &self.quality)
            .field("url", &"***")
            .field("auth", &"***")
            .field("quiet_interval_secs", &self.quiet_interval_secs)
            .field("debug_store_path", &self.debug_store_path)
            .field("model_dir", &self.model_dir)
            .finish()
    }
}

impl AppConfig {
    /// Debug-switch check: presence of `debug_store_path`, not its content,
    /// toggles the extra raw/transformed JPEG dumps (§6).
    pub fn debug_dump_enabled(&self) -> bool {
        self.debug_store_path.exists()
    }

    /// Load from a `key=value` text file. One assignment per line, `#`
    /// comments and blank lines ignored. A missing file or any unparseable
    /// key is logged at `warn` and that key's default is substituted; this
    /// function never returns `Err`.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file unreadable, using defaults");
                return Self::default();
            }
        };
        Self::parse(&text)
    }

    fn parse(text: &str) -> Self {
        let mut cfg = Self::default();
        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!(line = lineno + 1, "config line has no '=', ignoring");
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            apply_key(&mut cfg, key, value, lineno + 1);
        }
        cfg
    }
}

fn apply_key(cfg: &mut AppConfig, key: &str, value: &str, lineno: usize) {
    match key {
        "enabled" => match value.parse() {
            Ok(v) => cfg.enabled = v,
            Err(_) => warn!(line = lineno, key, value, "unparseable bool, keeping default"),
        },
        "height" => match value.parse() {
            Ok(v) => cfg.height = v,
            Err(_) => warn!(line = lineno, key, value, "unparseable u32, keeping default"),
        },
        "width" => match value.parse() {
            Ok(v) => cfg.width = v,
            Err(_) => warn!(line = lineno, key, value, "unparseable u32, keeping default"),
        },
        "quality" => match value.parse::<u8>() {
            Ok(v) if v <= 100 => cfg.quality = v,
            _ => warn!(line = lineno, key, value, "quality must be 0-100, keeping default"),
        },
        "url" => cfg.url = value.to_string(),
        "auth" => cfg.auth = value.to_string(),
        "quiet_interval_secs" => match value.parse() {
            Ok(v) => cfg.quiet_interval_secs = v,
            Err(_) => warn!(line = lineno, key, value, "unparseable u64, keeping default"),
        },
        "debug_store_path" => cfg.debug_store_path = PathBuf::from(value),
        "model_dir" => cfg.model_dir = PathBuf::from(value),
        other => warn!(line = lineno, key = other, "unrecognized config key, ignoring"),
    }
}
