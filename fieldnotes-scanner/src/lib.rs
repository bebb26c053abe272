//! Client half of Fieldnotes: the QR capture loop and the machine-detail
//! workflow that consumes the HTTP API.
//!
//! A scan runs through [`PermissionGate`] (camera access and torch probe),
//! [`ScanController`] (fixed-cadence sample and decode, one-shot lock,
//! delayed navigation) and finally [`MachineDetails`] for the decoded
//! identifier.

pub mod camera;
pub mod client;
pub mod controller;
pub mod decode;
pub mod detail;
pub mod error;
pub mod flashlight;
pub mod frame;
pub mod navigation;
pub mod permission;
pub mod replay;
pub mod session;
pub mod settings;

#[cfg(test)]
mod testing;

pub use camera::{
    CameraRuntime, FacingMode, MediaStream, PermissionState, VideoTrack,
};
pub use client::{
    ApiClient, MachineDirectory, ServiceSubmitter, SparePartSource,
};
pub use controller::{CancelReport, ScanController, ScanState, UserSession};
pub use decode::{DecodedPayload, Decoder, QrDecoder};
pub use detail::{
    DetailView, MachineDetails, MachineSummary, Notification,
    NotificationKind, SubmitOutcome,
};
pub use error::{CameraError, ClientError, ScanError};
pub use flashlight::Flashlight;
pub use frame::FrameSampler;
pub use navigation::{ChannelNavigator, Navigator, Route};
pub use permission::PermissionGate;
pub use replay::ReplayCameraRuntime;
pub use session::ScanSession;
pub use settings::ScannerSettings;
