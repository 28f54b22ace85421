//! Notifications published by the capture loop.

use crate::video::camera::properties::{PropertyId, PropertyRanges, SupportedProperties};
use crate::video::frame::VideoFrame;
use std::sync::mpsc::{Sender, SyncSender, TrySendError};

use super::state::CameraSettings;

/// Everything the engine tells the outside world
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    /// A device opened; `width`/`height` are what the driver actually delivers
    DeviceOpened {
        device_index: i32,
        width: i32,
        height: i32,
    },
    /// Published once per open, before the first frame
    PropertiesSupported {
        device_index: i32,
        supported: SupportedProperties,
    },
    /// Published once per open (before the first frame) and after each refresh
    RangesDiscovered {
        device_index: i32,
        ranges: PropertyRanges,
    },
    /// One corrected frame
    Frame(VideoFrame),
    /// The requested device could not be opened; the engine is idle
    OpenFailed { device_index: i32, reason: String },
    Closed { device_index: i32 },
    /// A property write was refused (no device, or the driver rejected it)
    PropertyRejected {
        property: PropertyId,
        value: i32,
        reason: String,
    },
    /// Snapshot of the most recently requested settings
    SettingsChanged(CameraSettings),
}

impl CaptureEvent {
    pub fn is_frame(&self) -> bool {
        matches!(self, CaptureEvent::Frame(_))
    }
}

/// Receiver of engine notifications
///
/// `publish` runs on the capture thread and must return quickly.
pub trait EventSink: Send + Sync {
    /// Returns `false` if the sink did not take the event. The capture loop
    /// drops refused frames and retries refused notifications.
    fn publish(&self, event: CaptureEvent) -> bool;
}

impl EventSink for Sender<CaptureEvent> {
    fn publish(&self, event: CaptureEvent) -> bool {
        self.send(event).is_ok()
    }
}

/// Bounded queue: a full queue refuses the event instead of stalling capture
impl EventSink for SyncSender<CaptureEvent> {
    fn publish(&self, event: CaptureEvent) -> bool {
        match self.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Adapts a closure into an [`EventSink`]
pub struct CallbackSink<F>(F);

impl<F> CallbackSink<F>
where
    F: Fn(CaptureEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        CallbackSink(callback)
    }
}

impl<F> EventSink for CallbackSink<F>
where
    F: Fn(CaptureEvent) + Send + Sync,
{
    fn publish(&self, event: CaptureEvent) -> bool {
        (self.0)(event);
        true
    }
}

/// Sink that drops everything
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: CaptureEvent) -> bool {
        true
    }
}
