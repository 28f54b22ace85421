//! Concurrent capture engine
//!
//! A dedicated thread owns the capture device and the loaded calibration.
//! Callers talk to it only through [`PropertyChannel`] mailboxes and receive
//! frames and notifications through an [`EventSink`].

pub mod capture_loop;
pub mod config;
pub mod events;
pub mod handle;
pub mod mailbox;
pub mod state;

pub use capture_loop::{CaptureLoop, StepOutcome};
pub use config::EngineConfig;
pub use events::{CallbackSink, CaptureEvent, EventSink, NullSink};
pub use handle::{CaptureEngine, EngineHandle};
pub use mailbox::{DeviceRequest, LifecycleRequest, Mailbox, PropertyChannel};
pub use state::{CameraSettings, EngineState, SharedSettings, SharedState};
