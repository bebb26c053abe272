//! Camera and collaborator fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};

use crate::camera::{
    CameraRuntime, FacingMode, MediaStream, PermissionState,
    TrackCapabilities, VideoInput, VideoTrack,
};
use crate::decode::{DecodedPayload, Decoder};
use crate::error::CameraError;

#[derive(Debug)]
pub struct FakeTrack {
    pub torch: bool,
    pub fail_torch: bool,
    pub live: AtomicBool,
    pub torch_on: AtomicBool,
    pub frame: Mutex<Option<DynamicImage>>,
}

impl FakeTrack {
    pub fn new(torch: bool) -> Arc<Self> {
        Arc::new(Self {
            torch,
            fail_torch: false,
            live: AtomicBool::new(true),
            torch_on: AtomicBool::new(false),
            frame: Mutex::new(Some(DynamicImage::new_rgba8(64, 48))),
        })
    }

    pub fn failing_torch() -> Arc<Self> {
        Arc::new(Self {
            torch: true,
            fail_torch: true,
            live: AtomicBool::new(true),
            torch_on: AtomicBool::new(false),
            frame: Mutex::new(None),
        })
    }

    pub fn with_frame(frame: DynamicImage) -> Arc<Self> {
        let track = Self::new(false);
        *track.frame.lock().unwrap() = Some(frame);
        track
    }
}

#[async_trait]
impl VideoTrack for FakeTrack {
    fn capabilities(&self) -> TrackCapabilities {
        TrackCapabilities { torch: self.torch }
    }

    async fn apply_torch(&self, on: bool) -> Result<(), CameraError> {
        if self.fail_torch {
            return Err(CameraError::Device("constraint rejected".into()));
        }
        self.torch_on.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn current_frame(&self) -> Option<DynamicImage> {
        self.frame.lock().unwrap().clone()
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct FakeStream {
    pub tracks: Vec<Arc<FakeTrack>>,
}

impl FakeStream {
    pub fn new(tracks: Vec<Arc<FakeTrack>>) -> Arc<Self> {
        Arc::new(Self { tracks })
    }

    pub fn live_tracks(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }
}

impl MediaStream for FakeStream {
    fn video_tracks(&self) -> Vec<Arc<dyn VideoTrack>> {
        self.tracks
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn VideoTrack>)
            .collect()
    }
}

#[derive(Debug)]
pub struct FakeRuntime {
    pub permission: Result<PermissionState, CameraError>,
    pub inputs: usize,
    pub deny_with: Option<String>,
    pub torch: bool,
    pub opened: Mutex<Vec<Arc<FakeStream>>>,
}

impl FakeRuntime {
    pub fn granted(torch: bool) -> Self {
        Self {
            permission: Ok(PermissionState::Granted),
            inputs: 1,
            deny_with: None,
            torch,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened_streams(&self) -> Vec<Arc<FakeStream>> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl CameraRuntime for FakeRuntime {
    async fn query_permission(&self) -> Result<PermissionState, CameraError> {
        self.permission.clone()
    }

    async fn video_inputs(&self) -> Result<Vec<VideoInput>, CameraError> {
        Ok((0..self.inputs)
            .map(|i| VideoInput {
                device_id: format!("cam-{i}"),
                label: format!("Camera {i}"),
            })
            .collect())
    }

    async fn open_stream(
        &self,
        _facing: FacingMode,
    ) -> Result<Arc<dyn MediaStream>, CameraError> {
        if let Some(reason) = &self.deny_with {
            return Err(CameraError::PermissionDenied(reason.clone()));
        }
        let stream = FakeStream::new(vec![FakeTrack::new(self.torch)]);
        self.opened.lock().unwrap().push(Arc::clone(&stream));
        Ok(stream)
    }
}

/// Replays a fixed sequence of decode results, then misses forever.
#[derive(Debug, Default)]
pub struct ScriptedDecoder {
    pub script: Mutex<VecDeque<Option<String>>>,
    pub always: Option<String>,
    pub calls: AtomicUsize,
}

impl ScriptedDecoder {
    pub fn always(payload: &str) -> Arc<Self> {
        Arc::new(Self {
            always: Some(payload.to_string()),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Decoder for ScriptedDecoder {
    fn decode(&self, _buffer: &RgbaImage) -> Option<DecodedPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front().flatten();
        scripted.or_else(|| self.always.clone()).map(DecodedPayload)
    }
}
