use crate::camera::PermissionState;
use crate::controller::ScanState;

/// UI-facing state of one capture view, alive from mount until navigation
/// away or cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSession {
    pub permission: PermissionState,
    pub flashlight_supported: bool,
    pub flashlight_on: bool,
    /// Set once the controller has locked on a decoded code; never cleared
    /// within the session. Drives the busy overlay. Updated through
    /// [`ScanSession::observe`].
    pub scanning: bool,
    /// Human-readable error shown above the viewfinder.
    pub error: Option<String>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the "Allow Camera Access" step has to be shown.
    pub fn needs_permission_request(&self) -> bool {
        self.permission != PermissionState::Granted
    }

    /// Fold the controller's state into the UI flags.
    pub fn observe(&mut self, state: &ScanState) {
        self.scanning |= state.is_locked();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodedPayload;

    #[test]
    fn scanning_follows_the_lock_and_stays_set() {
        let mut session = ScanSession::new();

        session.observe(&ScanState::Sampling);
        assert!(!session.scanning);

        session.observe(&ScanState::Locked(DecodedPayload("MCH-001".into())));
        assert!(session.scanning);

        session.observe(&ScanState::TornDown);
        assert!(session.scanning);
    }
}
