use std::sync::Arc;

use log::{debug, error};

use crate::camera::MediaStream;
use crate::session::ScanSession;

/// Torch control for the active capture stream.
pub struct Flashlight {
    stream: Arc<dyn MediaStream>,
}

impl std::fmt::Debug for Flashlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flashlight").finish_non_exhaustive()
    }
}

impl Flashlight {
    pub fn new(stream: Arc<dyn MediaStream>) -> Self {
        Self { stream }
    }

    /// Invert the torch on the first video track. Does nothing when the
    /// probe found no torch; constraint failures are logged and the flag is
    /// left as it was.
    pub async fn toggle(&self, session: &mut ScanSession) {
        if !session.flashlight_supported {
            debug!("torch toggle ignored: not supported");
            return;
        }
        let Some(track) = self.stream.video_tracks().into_iter().next() else {
            debug!("torch toggle ignored: no active track");
            return;
        };

        let target = !session.flashlight_on;
        match track.apply_torch(target).await {
            Ok(()) => session.flashlight_on = target,
            Err(err) => error!("Error toggling flashlight: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStream, FakeTrack};
    use std::sync::atomic::Ordering;

    fn supported_session() -> ScanSession {
        ScanSession {
            flashlight_supported: true,
            ..ScanSession::new()
        }
    }

    #[tokio::test]
    async fn toggle_flips_torch_and_flag() {
        let track = FakeTrack::new(true);
        let flashlight = Flashlight::new(FakeStream::new(vec![track.clone()]));
        let mut session = supported_session();

        flashlight.toggle(&mut session).await;
        assert!(session.flashlight_on);
        assert!(track.torch_on.load(Ordering::SeqCst));

        flashlight.toggle(&mut session).await;
        assert!(!session.flashlight_on);
        assert!(!track.torch_on.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unsupported_torch_is_a_noop() {
        let track = FakeTrack::new(true);
        let flashlight = Flashlight::new(FakeStream::new(vec![track.clone()]));
        let mut session = ScanSession::new();

        flashlight.toggle(&mut session).await;

        assert!(!session.flashlight_on);
        assert!(!track.torch_on.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn rejected_constraint_keeps_flag() {
        let flashlight =
            Flashlight::new(FakeStream::new(vec![FakeTrack::failing_torch()]));
        let mut session = supported_session();

        flashlight.toggle(&mut session).await;

        assert!(!session.flashlight_on);
    }
}
