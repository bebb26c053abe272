//! The QR capture loop.
//!
//! ```text
//! Idle --arm--> Armed --attach--> Sampling --decode hit--> Locked
//!   \______________\__________________\_______________________\--cancel/teardown--> TornDown
//! ```
//!
//! One tokio task drives a fixed-cadence interval; ticks never overlap.
//! The first successful decode takes the lock and schedules exactly one
//! navigation; later ticks are no-ops until teardown.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::camera::MediaStream;
use crate::decode::{DecodedPayload, Decoder};
use crate::error::{ClientError, ScanError};
use crate::frame::FrameSampler;
use crate::navigation::{Navigator, Route};
use crate::settings::ScannerSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    /// Permission granted, waiting for the live surface.
    Armed,
    Sampling,
    /// A code was decoded; navigation is pending or done.
    Locked(DecodedPayload),
    TornDown,
}

impl ScanState {
    pub fn is_locked(&self) -> bool {
        matches!(self, ScanState::Locked(_))
    }
}

/// The signed-in user's session, ended when the technician cancels a scan.
#[async_trait]
pub trait UserSession: Send + Sync {
    async fn end_session(&self) -> Result<(), ClientError>;
}

/// Outcome of [`ScanController::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelReport {
    pub tracks_stopped: usize,
    pub session_ended: bool,
}

struct CaptureTask {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct ScanController {
    settings: ScannerSettings,
    decoder: Arc<dyn Decoder>,
    navigator: Arc<dyn Navigator>,
    user_session: Arc<dyn UserSession>,
    state: watch::Sender<ScanState>,
    stream: Option<Arc<dyn MediaStream>>,
    capture: Option<CaptureTask>,
}

impl std::fmt::Debug for ScanController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanController")
            .field("state", &*self.state.borrow())
            .field("settings", &self.settings)
            .field("capturing", &self.capture.is_some())
            .finish_non_exhaustive()
    }
}

impl ScanController {
    pub fn new(
        settings: ScannerSettings,
        decoder: Arc<dyn Decoder>,
        navigator: Arc<dyn Navigator>,
        user_session: Arc<dyn UserSession>,
    ) -> Self {
        let (state, _) = watch::channel(ScanState::Idle);
        Self {
            settings,
            decoder,
            navigator,
            user_session,
            state,
            stream: None,
            capture: None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanState> {
        self.state.subscribe()
    }

    /// The live stream, while sampling or locked.
    pub fn stream(&self) -> Option<Arc<dyn MediaStream>> {
        self.stream.clone()
    }

    /// Permission granted: Idle -> Armed.
    pub fn arm(&mut self) -> Result<(), ScanError> {
        self.transition("arm", ScanState::Idle, ScanState::Armed)
    }

    /// Live surface attached: Armed -> Sampling. Starts the repeating decode
    /// tick immediately.
    pub fn attach(
        &mut self,
        stream: Arc<dyn MediaStream>,
    ) -> Result<(), ScanError> {
        self.transition("attach", ScanState::Armed, ScanState::Sampling)?;

        let (stop, stop_rx) = watch::channel(false);
        let capture = CaptureLoop {
            sampler: FrameSampler::from_settings(&self.settings),
            decoder: Arc::clone(&self.decoder),
            navigator: Arc::clone(&self.navigator),
            state: self.state.clone(),
            stream: Arc::clone(&stream),
            tick_interval: self.settings.tick_interval,
            dispatch_delay: self.settings.dispatch_delay,
        };
        let handle = tokio::spawn(capture.run(stop_rx));

        self.stream = Some(stream);
        self.capture = Some(CaptureTask { stop, handle });
        debug!(
            "capture loop started ({:?} cadence)",
            self.settings.tick_interval
        );
        Ok(())
    }

    /// Navigation away from the capture view: clear the timer and release
    /// the camera. The user stays signed in. Returns the tracks stopped.
    pub async fn teardown(&mut self) -> usize {
        let stopped = self.release().await;
        self.state.send_replace(ScanState::TornDown);
        stopped
    }

    /// Explicit cancel: clear the timer, stop every track, then end the
    /// user's session. Session failures are logged, never raised.
    pub async fn cancel(&mut self) -> CancelReport {
        let tracks_stopped = self.release().await;

        let session_ended = match self.user_session.end_session().await {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to end session on cancel: {err}");
                false
            }
        };

        self.state.send_replace(ScanState::TornDown);
        info!("scan cancelled ({tracks_stopped} tracks stopped)");
        CancelReport {
            tracks_stopped,
            session_ended,
        }
    }

    async fn release(&mut self) -> usize {
        if let Some(task) = self.capture.take() {
            task.stop.send_replace(true);
            if let Err(err) = task.handle.await {
                warn!("capture loop ended abnormally: {err}");
            }
        }
        self.stream.take().map_or(0, |stream| stream.stop_all())
    }

    fn transition(
        &self,
        action: &'static str,
        from: ScanState,
        to: ScanState,
    ) -> Result<(), ScanError> {
        let mut rejected = None;
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                rejected = Some(state.clone());
                false
            }
        });
        match rejected {
            None => Ok(()),
            Some(state) => Err(ScanError::InvalidTransition { action, state }),
        }
    }
}

impl Drop for ScanController {
    /// A controller dropped without `teardown` or `cancel` still releases
    /// the camera. The loop is aborted rather than joined.
    fn drop(&mut self) {
        if let Some(task) = self.capture.take() {
            task.stop.send_replace(true);
            task.handle.abort();
        }
        if let Some(stream) = self.stream.take() {
            let stopped = stream.stop_all();
            debug!("scan controller dropped; stopped {stopped} tracks");
        }
    }
}

struct CaptureLoop {
    sampler: FrameSampler,
    decoder: Arc<dyn Decoder>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<ScanState>,
    stream: Arc<dyn MediaStream>,
    tick_interval: Duration,
    dispatch_delay: Duration,
}

impl CaptureLoop {
    async fn run(self, mut stop: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let dispatch = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(dispatch);
        let mut pending: Option<DecodedPayload> = None;

        loop {
            tokio::select! {
                biased;
                _ = stop.changed() => break,
                () = &mut dispatch, if pending.is_some() => {
                    if let Some(payload) = pending.take() {
                        let route = Route::machine(payload.0);
                        info!("dispatching {route}");
                        self.navigator.navigate(route);
                    }
                }
                _ = ticker.tick() => {
                    if let Some(payload) = self.tick() {
                        dispatch.as_mut().reset(Instant::now() + self.dispatch_delay);
                        pending = Some(payload);
                    }
                }
            }
        }
        debug!("capture loop stopped");
    }

    /// One decode tick. Returns the payload only on the tick that takes the
    /// lock.
    fn tick(&self) -> Option<DecodedPayload> {
        if *self.state.borrow() != ScanState::Sampling {
            return None;
        }
        let track = self.stream.video_tracks().into_iter().next()?;
        let frame = track.current_frame()?;
        let buffer = self.sampler.sample(&frame);
        let payload = self.decoder.decode(&buffer)?;

        let locked = self.state.send_if_modified(|state| {
            if *state == ScanState::Sampling {
                *state = ScanState::Locked(payload.clone());
                true
            } else {
                false
            }
        });
        locked.then_some(payload)
    }
}
