//! Mirror one category of recordings into a local directory.
//!
//! Walks the listing page by page and downloads every recording whose
//! `.mp4` is not already present.  Individual failures are logged and
//! skipped so one bad file does not stop the run.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, error, info};

use dashcam_client::{Category, Dashcam, ListQuery};

/// Outcome of a sync run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

pub async fn sync_category(
    cam: &Dashcam,
    category: Category,
    page_size: i64,
    out_dir: &Path,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    let mut page = 1;

    info!("Syncing {category} into {}", out_dir.display());

    loop {
        // ── list the next page ───────────────────────────────────────
        let query = ListQuery::new(category).page(page).page_size(page_size);
        let listing = match cam.list(query).await? {
            Some(l) if !l.videos.is_empty() => l,
            _ => {
                debug!("Page {page} of {category} is empty – done");
                break;
            }
        };

        info!(
            "Page {page}: {} recording(s) of {}",
            listing.videos.len(),
            listing.total_count
        );

        for video in &listing.videos {
            let local = out_dir.join(format!("{}.mp4", video.file_name()));
            if local.exists() {
                debug!("Already have {}", local.display());
                report.skipped += 1;
                continue;
            }

            // ── download ─────────────────────────────────────────────
            match cam.download_video(video, out_dir).await {
                Ok(_) => report.downloaded += 1,
                Err(e) => {
                    error!("Failed to download {}: {e}", video.path);
                    report.failed += 1;
                }
            }
        }

        if listing.videos.len() < page_size.max(1) as usize {
            break;
        }
        page += 1;
    }

    info!(
        "Sync of {category} finished: {} downloaded, {} already present, {} failed",
        report.downloaded, report.skipped, report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use dashcam_sim::DeviceState;
    use tokio::net::TcpListener;

    async fn start_sim(card: PathBuf) -> Dashcam {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            dashcam_sim::serve(listener, DeviceState::new(card)).await.unwrap();
        });
        Dashcam::new(&format!("http://{addr}")).unwrap()
    }

    #[tokio::test]
    async fn test_sync_downloads_missing_only() {
        let root = std::env::temp_dir().join(format!("dashcam_cli_sync_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let card = root.join("card");
        let folder = card.join("emr");
        std::fs::create_dir_all(&folder).unwrap();
        for i in 0..3 {
            std::fs::write(folder.join(format!("20250101_00000{i}_f.ts")), vec![i as u8; 1000]).unwrap();
        }
        let out = root.join("out");
        let cam = start_sim(card).await;

        let first = sync_category(&cam, Category::Locked, 2, &out).await.unwrap();
        assert_eq!(
            first,
            SyncReport {
                downloaded: 3,
                skipped: 0,
                failed: 0
            }
        );
        assert_eq!(
            std::fs::read(out.join("20250101_000002_f.ts.mp4")).unwrap(),
            vec![2u8; 1000]
        );

        let second = sync_category(&cam, Category::Locked, 2, &out).await.unwrap();
        assert_eq!(second.downloaded, 0);
        assert_eq!(second.skipped, 3);
    }

    #[tokio::test]
    async fn test_sync_empty_category() {
        let root = std::env::temp_dir().join(format!("dashcam_cli_empty_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("card")).unwrap();
        let cam = start_sim(root.join("card")).await;

        let report = sync_category(&cam, Category::Parked, 100, &root.join("out"))
            .await
            .unwrap();
        assert_eq!(report, SyncReport::default());
    }
}
