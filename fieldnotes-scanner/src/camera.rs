//! Boundary to the platform camera.
//!
//! The capture loop only talks to these traits; the `fieldnotes-scan` binary
//! plugs in [`crate::replay::ReplayCameraRuntime`], tests plug in fakes.

use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::CameraError;

/// Camera permission as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Not yet determined (the pre-check has not run or failed).
    #[default]
    Unknown,
    /// The runtime will ask the user; the explicit request step is needed.
    Prompt,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear-facing, the camera pointed at the machine label.
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackCapabilities {
    pub torch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInput {
    pub device_id: String,
    pub label: String,
}

#[async_trait]
pub trait CameraRuntime: Send + Sync {
    /// Non-intrusive permission query; never prompts the user.
    async fn query_permission(&self) -> Result<PermissionState, CameraError>;

    async fn video_inputs(&self) -> Result<Vec<VideoInput>, CameraError>;

    /// Open a live stream. Prompts for permission when still undecided.
    async fn open_stream(
        &self,
        facing: FacingMode,
    ) -> Result<Arc<dyn MediaStream>, CameraError>;
}

pub trait MediaStream: Send + Sync {
    fn video_tracks(&self) -> Vec<Arc<dyn VideoTrack>>;

    /// Stop every track still live. Returns how many were stopped.
    fn stop_all(&self) -> usize {
        self.video_tracks()
            .iter()
            .filter(|track| track.is_live())
            .map(|track| track.stop())
            .count()
    }
}

#[async_trait]
pub trait VideoTrack: Send + Sync {
    fn capabilities(&self) -> TrackCapabilities;

    /// Apply the torch constraint; `on = true` lights the torch.
    async fn apply_torch(&self, on: bool) -> Result<(), CameraError>;

    /// The frame currently displayed, if the track has produced one.
    fn current_frame(&self) -> Option<DynamicImage>;

    fn is_live(&self) -> bool;

    fn stop(&self);
}
