//! A [`CameraRuntime`] that replays still images from a directory, one
//! per decode tick. Useful at a workstation without a camera and for
//! end-to-end checks of printed labels.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use image::DynamicImage;
use log::{debug, info, warn};

use crate::camera::{
    CameraRuntime, FacingMode, MediaStream, PermissionState,
    TrackCapabilities, VideoInput, VideoTrack,
};
use crate::error::CameraError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct ReplayCameraRuntime {
    source: PathBuf,
    frames: Arc<[DynamicImage]>,
    torch: bool,
}

impl ReplayCameraRuntime {
    /// Load every readable image in `dir`, in file-name order.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CameraError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|err| {
            CameraError::Device(format!("{}: {err}", dir.display()))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_image(path))
            .collect();
        paths.sort();

        let frames: Vec<DynamicImage> = paths
            .iter()
            .filter_map(|path| match image::open(path) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    warn!("skipping {}: {err}", path.display());
                    None
                }
            })
            .collect();

        info!("loaded {} replay frames from {}", frames.len(), dir.display());
        Ok(Self {
            source: dir.to_path_buf(),
            frames: frames.into(),
            torch: false,
        })
    }

    pub fn from_frames(frames: Vec<DynamicImage>) -> Self {
        Self {
            source: PathBuf::new(),
            frames: frames.into(),
            torch: false,
        }
    }

    /// Report a torch on the replayed track.
    pub fn with_torch(mut self, torch: bool) -> Self {
        self.torch = torch;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
}

#[async_trait]
impl CameraRuntime for ReplayCameraRuntime {
    async fn query_permission(&self) -> Result<PermissionState, CameraError> {
        Ok(PermissionState::Granted)
    }

    async fn video_inputs(&self) -> Result<Vec<VideoInput>, CameraError> {
        if self.frames.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![VideoInput {
            device_id: "replay-0".to_string(),
            label: format!("Replay ({})", self.source.display()),
        }])
    }

    async fn open_stream(
        &self,
        facing: FacingMode,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        if self.frames.is_empty() {
            return Err(CameraError::NoDevices);
        }
        debug!("opening replay stream ({facing:?})");
        let track = Arc::new(ReplayTrack {
            frames: Arc::clone(&self.frames),
            cursor: AtomicUsize::new(0),
            torch: self.torch,
            torch_on: AtomicBool::new(false),
            live: AtomicBool::new(true),
        });
        Ok(Arc::new(ReplayStream { track }))
    }
}

#[derive(Debug)]
struct ReplayStream {
    track: Arc<ReplayTrack>,
}

impl MediaStream for ReplayStream {
    fn video_tracks(&self) -> Vec<Arc<dyn VideoTrack>> {
        vec![Arc::clone(&self.track) as Arc<dyn VideoTrack>]
    }
}

#[derive(Debug)]
struct ReplayTrack {
    frames: Arc<[DynamicImage]>,
    cursor: AtomicUsize,
    torch: bool,
    torch_on: AtomicBool,
    live: AtomicBool,
}

#[async_trait]
impl VideoTrack for ReplayTrack {
    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities { torch: self.torch }
    }

    async fn apply_torch(&self, on: bool) -> Result<(), CameraError> {
        if !self.torch {
            return Err(CameraError::Unsupported("torch"));
        }
        self.torch_on.store(on, Ordering::Relaxed);
        Ok(())
    }

    fn current_frame(&self) -> Option<DynamicImage> {
        if !self.is_live() || self.frames.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.frames.get(index % self.frames.len()).cloned()
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }

    fn stop(&self) {
        self.live.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn solid(shade: u8) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            4,
            Rgba([shade, shade, shade, 255]),
        ))
    }

    #[tokio::test]
    async fn frames_cycle_until_stopped() {
        let runtime = ReplayCameraRuntime::from_frames(vec![solid(0), solid(255)]);
        let stream = runtime.open_stream(FacingMode::Environment).await.unwrap();
        let track = stream.video_tracks().remove(0);

        let shades: Vec<u8> = (0..3)
            .map(|_| track.current_frame().unwrap().to_rgba8().get_pixel(0, 0).0[0])
            .collect();
        assert_eq!(shades, vec![0, 255, 0]);

        assert_eq!(stream.stop_all(), 1);
        assert!(track.current_frame().is_none());
        assert_eq!(stream.stop_all(), 0);
    }

    #[tokio::test]
    async fn empty_runtime_has_no_devices() {
        let runtime = ReplayCameraRuntime::from_frames(Vec::new());
        assert!(runtime.video_inputs().await.unwrap().is_empty());
        assert!(matches!(
            runtime.open_stream(FacingMode::Environment).await,
            Err(CameraError::NoDevices)
        ));
    }

    #[test]
    fn directory_load_skips_non_images() {
        let dir = tempfile::tempdir().unwrap();
        solid(10).save(dir.path().join("b.png")).unwrap();
        solid(20).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let runtime = ReplayCameraRuntime::from_dir(dir.path()).unwrap();

        assert_eq!(runtime.frame_count(), 2);
        assert_eq!(runtime.frames[0].to_rgba8().get_pixel(0, 0).0[0], 20);
    }

    #[tokio::test]
    async fn torch_is_reported_only_when_enabled() {
        let plain = ReplayCameraRuntime::from_frames(vec![solid(0)]);
        let track = plain
            .open_stream(FacingMode::Environment)
            .await
            .unwrap()
            .video_tracks()
            .remove(0);
        assert!(!track.capabilities().torch);
        assert_eq!(
            track.apply_torch(true).await,
            Err(CameraError::Unsupported("torch"))
        );

        let lit = ReplayCameraRuntime::from_frames(vec![solid(0)]).with_torch(true);
        let track = lit
            .open_stream(FacingMode::Environment)
            .await
            .unwrap()
            .video_tracks()
            .remove(0);
        assert!(track.capabilities().torch);
        assert!(track.apply_torch(true).await.is_ok());
    }
}
