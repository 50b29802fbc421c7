//! Simulated device state: the SD card directory and the parameter table.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::DateTime;
use dashcam_common::protocol::{FolderListing, VideoDescriptor, CREATED_AT_FORMAT, REC_PARAM};
use tracing::{debug, warn};

/// Device path the SD card is mounted at.
pub const CARD_PREFIX: &str = "/mnt/card";

/// Shared state for route handlers.
#[derive(Clone)]
pub struct DeviceState {
    card_dir: PathBuf,
    rec_settle: Duration,
    params: Arc<Mutex<HashMap<String, i64>>>,
}

impl DeviceState {
    /// A device that is recording, with a 3 s lag on `rec` changes.
    pub fn new(card_dir: PathBuf) -> Self {
        let params = HashMap::from([(REC_PARAM.to_string(), 1)]);
        Self {
            card_dir,
            rec_settle: Duration::from_secs(3),
            params: Arc::new(Mutex::new(params)),
        }
    }

    /// Delay before a written `rec` value is reported back.
    pub fn with_rec_settle(mut self, settle: Duration) -> Self {
        self.rec_settle = settle;
        self
    }

    pub fn with_param(self, name: &str, value: i64) -> Self {
        self.params_lock().insert(name.to_string(), value);
        self
    }

    pub fn card_dir(&self) -> &Path {
        &self.card_dir
    }

    /// Local directory backing a device folder code.
    pub fn folder_dir(&self, code: &str) -> PathBuf {
        self.card_dir.join(code)
    }

    /// Map a device path under [`CARD_PREFIX`] to the local file.
    ///
    /// Returns `None` for paths outside the card or containing `..`.
    pub fn card_path(&self, device_path: &str) -> Option<PathBuf> {
        let rel = Path::new(device_path.strip_prefix(CARD_PREFIX)?.strip_prefix('/')?);
        if rel.as_os_str().is_empty()
            || rel.components().any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.card_dir.join(rel))
    }

    // ── listing ──────────────────────────────────────────────────────

    /// Recordings of one folder, newest first.
    pub fn recordings(&self, code: &str) -> std::io::Result<Vec<VideoDescriptor>> {
        let dir = self.folder_dir(code);
        if !dir.exists() {
            return Ok(vec![]);
        }

        let mut found: Vec<(SystemTime, String, u64)> = Vec::new();
        for entry in std::fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || path.extension().and_then(|e| e.to_str()) == Some("jpg") {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let modified = meta.modified().unwrap_or(UNIX_EPOCH);
            found.push((modified, name, meta.len()));
        }

        found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        Ok(found
            .into_iter()
            .map(|(modified, name, len)| {
                let created_at = modified
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs() as i64)
                    .unwrap_or_default();
                VideoDescriptor {
                    path: format!("{CARD_PREFIX}/{code}/{name}"),
                    duration_secs: -1,
                    size_kb: len.div_ceil(1024),
                    created_at,
                    created_at_str: DateTime::from_timestamp(created_at, 0)
                        .map(|dt| dt.format(CREATED_AT_FORMAT).to_string())
                        .unwrap_or_default(),
                    kind: 2,
                }
            })
            .collect())
    }

    /// The block `/app/getfilelist` returns for `[start, end]`, or `None`
    /// when the folder is empty or the window selects nothing.
    pub fn list_window(
        &self,
        code: &str,
        start: i64,
        end: i64,
    ) -> std::io::Result<Option<FolderListing>> {
        let all = self.recordings(code)?;
        let total_count = all.len() as u64;
        let Some(range) = window_range(all.len(), start, end) else {
            return Ok(None);
        };
        Ok(Some(FolderListing {
            category: code.to_string(),
            total_count,
            videos: all[range].to_vec(),
        }))
    }

    // ── parameters ───────────────────────────────────────────────────

    pub fn get_param(&self, name: &str) -> Option<i64> {
        self.params_lock().get(name).copied()
    }

    /// Store a parameter.  `rec` changes become visible only after the
    /// settle delay, like on the real device.
    pub fn set_param(&self, name: &str, value: i64) {
        if name == REC_PARAM && !self.rec_settle.is_zero() {
            debug!("rec={value} acknowledged, applying in {:?}", self.rec_settle);
            let state = self.clone();
            let name = name.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(state.rec_settle).await;
                state.params_lock().insert(name, value);
            });
            return;
        }
        self.params_lock().insert(name.to_string(), value);
    }

    fn params_lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        self.params.lock().unwrap_or_else(|poisoned| {
            warn!("Parameter table lock poisoned, continuing");
            poisoned.into_inner()
        })
    }
}

/// Clamp the inclusive window `[start, end]` to `0..len`.
fn window_range(len: usize, start: i64, end: i64) -> Option<std::ops::Range<usize>> {
    let start = start.max(0);
    let end = end.min(len as i64 - 1);
    if len == 0 || start > end {
        return None;
    }
    Some(start as usize..end as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_range() {
        assert_eq!(window_range(5, 0, 99), Some(0..5));
        assert_eq!(window_range(5, 2, 3), Some(2..4));
        assert_eq!(window_range(5, 4, 4), Some(4..5));
        assert_eq!(window_range(5, 5, 9), None);
        assert_eq!(window_range(0, 0, 99), None);
        assert_eq!(window_range(5, -10, -1), None);
        assert_eq!(window_range(5, 3, 2), None);
    }

    #[test]
    fn test_card_path() {
        let state = DeviceState::new(PathBuf::from("/srv/card"));
        assert_eq!(
            state.card_path("/mnt/card/video_front/a.ts"),
            Some(PathBuf::from("/srv/card/video_front/a.ts"))
        );
        assert_eq!(state.card_path("/mnt/card/../etc/passwd"), None);
        assert_eq!(state.card_path("/etc/passwd"), None);
        assert_eq!(state.card_path("/mnt/card/"), None);
        assert_eq!(state.card_path("/mnt/cardx/a.ts"), None);
    }

    #[test]
    fn test_params_without_settle() {
        let state = DeviceState::new(PathBuf::from("/srv/card")).with_rec_settle(Duration::ZERO);
        assert_eq!(state.get_param("rec"), Some(1));
        state.set_param("rec", 0);
        assert_eq!(state.get_param("rec"), Some(0));
        state.set_param("mic", 1);
        assert_eq!(state.get_param("mic"), Some(1));
        assert_eq!(state.get_param("nope"), None);
    }

    #[tokio::test]
    async fn test_rec_change_lags() {
        let state = DeviceState::new(PathBuf::from("/srv/card"))
            .with_rec_settle(Duration::from_millis(20))
            .with_param("rec", 0);
        state.set_param("rec", 1);
        assert_eq!(state.get_param("rec"), Some(0));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(state.get_param("rec"), Some(1));
    }

    #[test]
    fn test_recordings_newest_first() {
        let card = std::env::temp_dir().join(format!("dashcam_sim_rec_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&card);
        let folder = card.join("emr");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("20250101_000000_f.ts"), vec![0u8; 2048]).unwrap();
        std::fs::write(folder.join("20250101_000100_f.ts"), b"x").unwrap();
        std::fs::write(folder.join("20250101_000100_f.ts.jpg"), b"thumb").unwrap();

        let state = DeviceState::new(card.clone());
        let videos = state.recordings("emr").unwrap();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].path, "/mnt/card/emr/20250101_000100_f.ts");
        assert_eq!(videos[1].size_kb, 2);
        assert_eq!(videos[0].created_at_str.len(), 14);

        let listing = state.list_window("emr", 1, 1).unwrap().unwrap();
        assert_eq!(listing.total_count, 2);
        assert_eq!(listing.videos.len(), 1);
        assert_eq!(listing.videos[0].path, "/mnt/card/emr/20250101_000000_f.ts");

        assert!(state.recordings("park").unwrap().is_empty());
        assert!(state.list_window("park", 0, 99).unwrap().is_none());
    }
}
