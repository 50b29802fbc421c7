//! Thumbnails and video bodies.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashcam_common::protocol::{basename, VideoDescriptor, THUMBNAIL_ENDPOINT};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::transport::{ByteStream, Query};
use crate::Dashcam;

/// A recording, named either by its device path or by a listed descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRef<'a> {
    Path(&'a str),
    Descriptor(&'a VideoDescriptor),
}

impl<'a> VideoRef<'a> {
    /// Device path, e.g. `/mnt/card/video_front/20250101_000000_f.ts`.
    pub fn path(&self) -> &'a str {
        match self {
            VideoRef::Path(p) => p,
            VideoRef::Descriptor(d) => &d.path,
        }
    }

    /// Name local copies are derived from.
    pub fn file_name(&self) -> &'a str {
        basename(self.path())
    }
}

impl<'a> From<&'a str> for VideoRef<'a> {
    fn from(path: &'a str) -> Self {
        VideoRef::Path(path)
    }
}

impl<'a> From<&'a String> for VideoRef<'a> {
    fn from(path: &'a String) -> Self {
        VideoRef::Path(path)
    }
}

impl<'a> From<&'a VideoDescriptor> for VideoRef<'a> {
    fn from(video: &'a VideoDescriptor) -> Self {
        VideoRef::Descriptor(video)
    }
}

impl Dashcam {
    /// Thumbnail image of a recording.
    pub async fn get_thumbnail<'a>(&self, video: impl Into<VideoRef<'a>>) -> Result<Bytes> {
        let path = video.into().path();
        self.transport
            .get_bytes(THUMBNAIL_ENDPOINT, Query::Raw(&format!("file={path}")))
            .await
            .map_err(|e| Error::media(path, e))
    }

    /// Save the thumbnail as `<target_dir>/<basename>.jpg`.
    ///
    /// Missing directories are created.  The file appears at its final path
    /// only once it is complete.
    pub async fn download_thumbnail<'a>(
        &self,
        video: impl Into<VideoRef<'a>>,
        target_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let video = video.into();
        let thumbnail = self.get_thumbnail(video).await?;

        let dest = target_dir
            .as_ref()
            .join(format!("{}.jpg", video.file_name()));
        write_atomically(&dest, &thumbnail).await?;
        info!("Saved thumbnail {} → {}", video.path(), dest.display());
        Ok(dest)
    }

    /// Whole video body in memory.
    ///
    /// Recordings are commonly tens of megabytes; prefer
    /// [`Dashcam::download_video`] for anything but short clips.
    pub async fn get_video<'a>(&self, video: impl Into<VideoRef<'a>>) -> Result<Bytes> {
        let path = video.into().path();
        self.transport
            .get_bytes(path, Query::None)
            .await
            .map_err(|e| Error::media(path, e))
    }

    /// Stream the video body to `<target_dir>/<basename>.mp4`.
    ///
    /// Only one chunk is held in memory at a time.  The body is written to a
    /// `.part` file that is renamed once flushed; on any error the partial
    /// file is removed and nothing appears at the final path.  The device
    /// is slow, so this can take over a minute per recording.
    pub async fn download_video<'a>(
        &self,
        video: impl Into<VideoRef<'a>>,
        target_dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let video = video.into();
        let path = video.path();
        let dir = target_dir.as_ref();
        let dest = dir.join(format!("{}.mp4", video.file_name()));

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| Error::fs(dir, e))?;

        let stream = self
            .transport
            .get_stream(path, Query::None)
            .await
            .map_err(|e| Error::media(path, e))?;

        let part = part_path(&dest);
        let written = match stream_to_file(stream, &part).await {
            Ok(n) => n,
            Err(e) => {
                remove_partial(&part).await;
                return Err(match e {
                    fs @ Error::Filesystem { .. } => fs,
                    other => Error::media(path, other),
                });
            }
        };

        if let Err(e) = tokio::fs::rename(&part, &dest).await {
            remove_partial(&part).await;
            return Err(Error::fs(&dest, e));
        }

        info!("Downloaded {} → {} ({} bytes)", path, dest.display(), written);
        Ok(dest)
    }
}

/// Copy `stream` into a new file at `out`, chunk by chunk.
async fn stream_to_file(mut stream: ByteStream, out: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(out)
        .await
        .map_err(|e| Error::fs(out, e))?;

    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| Error::fs(out, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| Error::fs(out, e))?;
    file.sync_all().await.map_err(|e| Error::fs(out, e))?;
    Ok(written)
}

/// Write `data` to `dest` via a `.part` sibling, creating parent directories.
async fn write_atomically(dest: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::fs(parent, e))?;
    }

    let part = part_path(dest);
    if let Err(e) = tokio::fs::write(&part, data).await {
        remove_partial(&part).await;
        return Err(Error::fs(&part, e));
    }
    if let Err(e) = tokio::fs::rename(&part, dest).await {
        remove_partial(&part).await;
        return Err(Error::fs(dest, e));
    }
    Ok(())
}

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Temporary sibling of `dest`, unique per call so concurrent downloads of
/// the same recording never write into each other's file.
fn part_path(dest: &Path) -> PathBuf {
    let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = dest.as_os_str().to_owned();
    name.push(format!(".{}.{seq}.part", std::process::id()));
    PathBuf::from(name)
}

async fn remove_partial(part: &Path) {
    match tokio::fs::remove_file(part).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Cannot remove partial file {}: {e}", part.display()),
    }
}
