use std::sync::Arc;

use log::{debug, error, info};

use crate::camera::{CameraRuntime, FacingMode, PermissionState};
use crate::error::CameraError;
use crate::session::ScanSession;

pub const PREVIOUSLY_DENIED_MESSAGE: &str =
    "Camera access was previously denied. Please update your browser settings.";

/// Mediates camera permission for a [`ScanSession`] and records whether the
/// rear camera exposes a torch. Never retries on its own.
#[derive(Clone)]
pub struct PermissionGate {
    runtime: Arc<dyn CameraRuntime>,
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate").finish_non_exhaustive()
    }
}

impl PermissionGate {
    pub fn new(runtime: Arc<dyn CameraRuntime>) -> Self {
        Self { runtime }
    }

    /// Pre-check run when the capture view mounts. A granted permission
    /// skips the request step and runs the capability probe; a failing query
    /// leaves the session untouched.
    pub async fn check_existing(
        &self,
        session: &mut ScanSession,
    ) -> PermissionState {
        match self.runtime.query_permission().await {
            Ok(PermissionState::Granted) => {
                session.permission = PermissionState::Granted;
                self.probe_capabilities(session).await;
            }
            Ok(PermissionState::Denied) => {
                session.permission = PermissionState::Denied;
                session.error = Some(PREVIOUSLY_DENIED_MESSAGE.to_string());
            }
            Ok(state) => session.permission = state,
            Err(err) => error!("Error checking camera permission: {err}"),
        }
        session.permission
    }

    /// Explicit "Allow Camera Access" step.
    pub async fn request_access(
        &self,
        session: &mut ScanSession,
    ) -> Result<(), CameraError> {
        match self.runtime.open_stream(FacingMode::Environment).await {
            Ok(stream) => {
                session.permission = PermissionState::Granted;
                session.error = None;
                self.probe_capabilities(session).await;
                stream.stop_all();
                info!("camera access granted");
                Ok(())
            }
            Err(err) => {
                let reason = format!(
                    "Camera access denied. Please check your browser settings. {err}"
                );
                session.permission = PermissionState::Denied;
                session.error = Some(reason.clone());
                Err(CameraError::PermissionDenied(reason))
            }
        }
    }

    /// Open a throwaway rear-camera stream, read the first track's torch
    /// capability, and release the stream.
    pub async fn probe_capabilities(&self, session: &mut ScanSession) {
        session.flashlight_supported = match self.probe_torch().await {
            Ok(supported) => supported,
            Err(CameraError::NoDevices) => {
                debug!("no video inputs; skipping capability probe");
                false
            }
            Err(err) => {
                error!("Error checking flashlight support: {err}");
                false
            }
        };
    }

    async fn probe_torch(&self) -> Result<bool, CameraError> {
        if self.runtime.video_inputs().await?.is_empty() {
            return Err(CameraError::NoDevices);
        }
        let stream = self.runtime.open_stream(FacingMode::Environment).await?;
        let torch = stream
            .video_tracks()
            .first()
            .is_some_and(|track| track.capabilities().torch);
        stream.stop_all();
        Ok(torch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRuntime;

    fn gate(runtime: &Arc<FakeRuntime>) -> PermissionGate {
        PermissionGate::new(Arc::clone(runtime) as Arc<dyn CameraRuntime>)
    }

    #[tokio::test]
    async fn granted_precheck_skips_request_and_probes_torch() {
        let runtime = Arc::new(FakeRuntime::granted(true));
        let mut session = ScanSession::new();

        let state = gate(&runtime).check_existing(&mut session).await;

        assert_eq!(state, PermissionState::Granted);
        assert!(!session.needs_permission_request());
        assert!(session.flashlight_supported);
        let probes = runtime.opened_streams();
        assert_eq!(probes.len(), 1);
        assert_eq!(probes[0].live_tracks(), 0);
    }

    #[tokio::test]
    async fn previously_denied_records_message() {
        let runtime = Arc::new(FakeRuntime {
            permission: Ok(PermissionState::Denied),
            ..FakeRuntime::granted(false)
        });
        let mut session = ScanSession::new();

        gate(&runtime).check_existing(&mut session).await;

        assert_eq!(session.error.as_deref(), Some(PREVIOUSLY_DENIED_MESSAGE));
        assert!(runtime.opened_streams().is_empty());
    }

    #[tokio::test]
    async fn failing_query_leaves_state_unknown() {
        let runtime = Arc::new(FakeRuntime {
            permission: Err(CameraError::QueryUnavailable("no api".into())),
            ..FakeRuntime::granted(false)
        });
        let mut session = ScanSession::new();

        let state = gate(&runtime).check_existing(&mut session).await;

        assert_eq!(state, PermissionState::Unknown);
        assert_eq!(session.error, None);
    }

    #[tokio::test]
    async fn denied_request_records_reason() {
        let runtime = Arc::new(FakeRuntime {
            permission: Ok(PermissionState::Prompt),
            deny_with: Some("NotAllowedError".into()),
            ..FakeRuntime::granted(false)
        });
        let mut session = ScanSession::new();
        let gate = gate(&runtime);

        assert_eq!(
            gate.check_existing(&mut session).await,
            PermissionState::Prompt
        );
        let err = gate.request_access(&mut session).await.unwrap_err();

        let expected =
            "Camera access denied. Please check your browser settings. NotAllowedError";
        assert_eq!(err, CameraError::PermissionDenied(expected.into()));
        assert_eq!(session.error.as_deref(), Some(expected));
    }

    #[tokio::test]
    async fn granted_request_releases_every_stream() {
        let runtime = Arc::new(FakeRuntime::granted(false));
        let mut session = ScanSession::new();

        gate(&runtime).request_access(&mut session).await.unwrap();

        assert_eq!(session.permission, PermissionState::Granted);
        assert!(!session.flashlight_supported);
        let opened = runtime.opened_streams();
        assert_eq!(opened.len(), 2);
        assert!(opened.iter().all(|s| s.live_tracks() == 0));
    }

    #[tokio::test]
    async fn probe_is_skipped_without_video_inputs() {
        let runtime = Arc::new(FakeRuntime {
            inputs: 0,
            ..FakeRuntime::granted(true)
        });
        let mut session = ScanSession::new();

        gate(&runtime).probe_capabilities(&mut session).await;

        assert!(!session.flashlight_supported);
        assert!(runtime.opened_streams().is_empty());
    }
}
