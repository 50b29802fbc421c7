//! Configuration parsing – reads a KEY=VALUE file (`dashcam.conf`).
//!
//! The CLI and the simulator load the same file; each ignores fields it
//! does not need.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::protocol::DEFAULT_HOST;

/// Application configuration, shared between the CLI and the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // ── client (cli) ─────────────────────────────────────────────────
    /// Base URL of the dashcam.
    pub host: String,
    /// Where downloads land when no `--out` is given.
    pub download_dir: PathBuf,
    pub page_size: i64,

    // ── simulator ────────────────────────────────────────────────────
    pub sim_listen_addr: String,
    /// Local directory standing in for the SD card (`/mnt/card`).
    pub sim_card_dir: PathBuf,
    /// Delay before a `rec` change becomes visible to `getparamvalue`.
    pub sim_rec_settle: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            download_dir: PathBuf::from("./dashcam"),
            page_size: 100,
            sim_listen_addr: "127.0.0.1:8169".to_string(),
            sim_card_dir: PathBuf::from("./card"),
            sim_rec_settle: Duration::from_millis(3000),
        }
    }
}

impl Config {
    /// Default config path.
    pub fn default_path() -> &'static str {
        "/etc/dashcam/dashcam.conf"
    }
}

/// Parse a `KEY=VALUE` configuration file.
///
/// Lines starting with `#` are comments.  Values may be optionally
/// double-quoted.  Unknown keys are silently ignored, missing keys keep
/// their defaults.
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config: {}", path.display()))?;

    let config = parse(&text);
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Build a [`Config`] from the text of a `KEY=VALUE` file.
pub fn parse(text: &str) -> Config {
    let map = parse_conf(text);
    let defaults = Config::default();

    let get = |key: &str| -> Option<String> { map.get(key).filter(|v| !v.is_empty()).cloned() };

    Config {
        host: get("DASHCAM_HOST")
            .map(|h| h.trim_end_matches('/').to_string())
            .unwrap_or(defaults.host),
        download_dir: get("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.download_dir),
        page_size: get("PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.page_size),
        sim_listen_addr: get("SIM_LISTEN_ADDR").unwrap_or(defaults.sim_listen_addr),
        sim_card_dir: get("SIM_CARD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.sim_card_dir),
        sim_rec_settle: get("SIM_REC_SETTLE_MS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.sim_rec_settle),
    }
}

/// Parse `KEY=VALUE` lines into a map, stripping optional double-quotes.
fn parse_conf(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, val)) = line.split_once('=') {
            let key = key.trim();
            let val = val.trim().trim_matches('"');
            map.insert(key.to_string(), val.to_string());
        }
    }
    map
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conf() {
        let text = r#"
# comment
DASHCAM_HOST="http://10.0.0.7/"
PAGE_SIZE=25
SIM_CARD_DIR=/srv/card
"#;
        let map = parse_conf(text);
        assert_eq!(map["DASHCAM_HOST"], "http://10.0.0.7/");
        assert_eq!(map["PAGE_SIZE"], "25");
        assert!(!map.contains_key("# comment"));
    }

    #[test]
    fn test_parse_overrides_and_defaults() {
        let config = parse("DASHCAM_HOST=http://10.0.0.7/\nPAGE_SIZE=25\nSIM_REC_SETTLE_MS=0\n");
        assert_eq!(config.host, "http://10.0.0.7");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sim_rec_settle, Duration::ZERO);
        assert_eq!(config.download_dir, PathBuf::from("./dashcam"));
        assert_eq!(config.sim_listen_addr, "127.0.0.1:8169");
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = parse("PAGE_SIZE=lots\nDASHCAM_HOST=\n");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_load_file() {
        let dir = std::env::temp_dir().join("dashcam_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashcam.conf");
        std::fs::write(&path, "DOWNLOAD_DIR=/tmp/dashcam-out\n").unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/tmp/dashcam-out"));
        assert!(load(&dir.join("missing.conf")).is_err());
    }
}
