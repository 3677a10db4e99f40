use std::path::{Path, PathBuf};

use glint_vision::{FrameSource, GlintError, Result, StopHandle};
use image::RgbaImage;
use tracing::warn;

const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Replays a directory of still images as a video feed, one image per pass.
///
/// The next frame is decoded ahead of time so `dimensions` always describes the
/// frame `snapshot` is about to return.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    cursor: usize,
    pending: Option<RgbaImage>,
    current: RgbaImage,
    looping: bool,
    on_exhausted: StopHandle,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path, looping: bool, on_exhausted: StopHandle) -> Result<Self> {
        let paths = list_frames(dir)?;
        let mut source = Self {
            paths,
            cursor: 0,
            pending: None,
            current: RgbaImage::new(0, 0),
            looping,
            on_exhausted,
        };
        source.preload();
        if source.pending.is_none() {
            return Err(GlintError::CaptureUnavailable {
                reason: format!("no decodable frames in {}", dir.display()),
            });
        }
        Ok(source)
    }

    /// Decodes the next readable image into `pending`, wrapping when looping.
    fn preload(&mut self) {
        let mut attempts = 0;
        while attempts < self.paths.len() {
            if self.cursor == self.paths.len() {
                if !self.looping {
                    break;
                }
                self.cursor = 0;
            }
            let path = &self.paths[self.cursor];
            self.cursor += 1;
            attempts += 1;
            match image::open(path) {
                Ok(decoded) => {
                    self.pending = Some(decoded.into_rgba8());
                    return;
                }
                Err(err) => warn!(path = %path.display(), %err, "skipping unreadable frame"),
            }
        }
        self.pending = None;
    }
}

impl FrameSource for ImageSequenceSource {
    fn is_ready(&self) -> bool {
        self.pending.is_some()
    }

    fn dimensions(&self) -> (u32, u32) {
        self.pending
            .as_ref()
            .map_or((0, 0), |image| image.dimensions())
    }

    fn snapshot(&mut self) -> Result<&[u8]> {
        let Some(frame) = self.pending.take() else {
            return Err(GlintError::StreamEnded);
        };
        self.current = frame;
        self.preload();
        if self.pending.is_none() {
            self.on_exhausted.stop();
        }
        Ok(self.current.as_raw())
    }
}

pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|err| GlintError::CaptureUnavailable {
        reason: format!("{}: {err}", dir.display()),
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();
    Ok(paths)
}
