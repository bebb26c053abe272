use std::time::Duration;

/// Timing and buffer geometry of the capture loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerSettings {
    /// Cadence of the decode tick.
    pub tick_interval: Duration,
    /// Delay between locking on a code and dispatching navigation.
    pub dispatch_delay: Duration,
    /// Pause after a successful service submission before returning to the
    /// scanner root.
    pub submit_redirect_delay: Duration,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            dispatch_delay: Duration::from_millis(200),
            submit_redirect_delay: Duration::from_millis(100),
            frame_width: 640,
            frame_height: 480,
        }
    }
}
