use std::fmt;

use log::warn;
use tokio::sync::mpsc;

/// Client-side destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The capture view.
    ScannerRoot,
    /// Machine detail page for a decoded payload.
    Machine { id: String },
}

impl Route {
    pub fn machine(id: impl Into<String>) -> Self {
        Route::Machine { id: id.into() }
    }

    /// Path with the payload percent-encoded into the `id` query parameter.
    pub fn path(&self) -> String {
        match self {
            Route::ScannerRoot => "/".to_string(),
            Route::Machine { id } => {
                format!("/machine?id={}", urlencoding::encode(id))
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Forwards routes to whoever owns the receiving end (the binary's main
/// loop, or a test).
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Route>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Route>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: Route) {
        if let Err(err) = self.tx.send(route) {
            warn!("navigation to {} dropped: receiver closed", err.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_route_carries_payload_in_query() {
        assert_eq!(Route::machine("MCH-001").path(), "/machine?id=MCH-001");
        assert_eq!(Route::ScannerRoot.path(), "/");
    }

    #[test]
    fn payload_is_percent_encoded_not_validated() {
        assert_eq!(
            Route::machine("A&B 7/x").path(),
            "/machine?id=A%26B%207%2Fx"
        );
        assert_eq!(Route::machine("").path(), "/machine?id=");
    }

    #[tokio::test]
    async fn channel_navigator_delivers_routes_in_order() {
        let (nav, mut rx) = ChannelNavigator::new();
        nav.navigate(Route::machine("MCH-001"));
        nav.navigate(Route::ScannerRoot);
        assert_eq!(rx.recv().await, Some(Route::machine("MCH-001")));
        assert_eq!(rx.recv().await, Some(Route::ScannerRoot));
    }
}
