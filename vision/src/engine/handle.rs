//! Owning handle for the capture thread.

use crate::calibration::intrinsics::CameraIntrinsics;
use crate::calibration::store::CalibrationStore;
use crate::error::{Result, VisionError};
use crate::video::camera::backend::{CaptureBackend, OpenCvBackend};
use crate::video::camera::config::OpenRequest;
use crate::video::camera::controller::DeviceController;
use crate::video::camera::properties::PropertyId;
use crate::video::correction::FrameCorrector;
use logging::Logger;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::capture_loop::CaptureLoop;
use super::config::EngineConfig;
use super::events::{CaptureEvent, EventSink};
use super::mailbox::{DeviceRequest, PropertyChannel};
use super::state::{CameraSettings, EngineState, SharedSettings, SharedState};

/// Cloneable, thread-safe front end to a running [`CaptureEngine`]
///
/// Every method returns immediately; requests take effect on a later loop
/// iteration.
#[derive(Clone)]
pub struct EngineHandle {
    channel: Arc<PropertyChannel>,
    state: SharedState,
    sink: Arc<dyn EventSink>,
    settings: SharedSettings,
}

impl EngineHandle {
    pub fn request_open(&self, request: OpenRequest) {
        self.channel.post(DeviceRequest::Open(request));
        self.update_settings(|s| {
            s.device_index = Some(request.device_index());
            s.width = request.width();
            s.height = request.height();
        });
    }

    pub fn request_close(&self) {
        self.channel.post(DeviceRequest::Close);
    }

    /// Posts an absolute value; a newer post to the same property replaces this one
    pub fn set_property(&self, property: PropertyId, value: i32) {
        self.channel.post(DeviceRequest::SetProperty(property, value));
        self.update_settings(|s| s.set(property, value));
    }

    /// Republish `RangesDiscovered` from live device values
    pub fn refresh_ranges(&self) {
        self.channel.request_refresh();
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    /// Requested values, overwritten by what the device reports on open and refresh
    pub fn settings(&self) -> CameraSettings {
        self.settings.get()
    }

    fn update_settings(&self, apply: impl FnOnce(&mut CameraSettings)) {
        let snapshot = self.settings.update(apply);
        self.sink.publish(CaptureEvent::SettingsChanged(snapshot));
    }
}

/// A running capture loop on its own thread
///
/// Dropping the engine stops the loop and waits for the device to be released.
pub struct CaptureEngine {
    handle: EngineHandle,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    logger: Logger,
}

impl CaptureEngine {
    /// Starts the capture thread over `backend`.
    ///
    /// `intrinsics` is fixed for the engine's lifetime; `None` disables correction.
    pub fn start<B, S>(
        backend: B,
        intrinsics: Option<&CameraIntrinsics>,
        sink: S,
        config: EngineConfig,
        logger: Logger,
    ) -> Result<Self>
    where
        B: CaptureBackend + 'static,
        S: EventSink + 'static,
    {
        let corrector = FrameCorrector::new(intrinsics)?;
        let channel = Arc::new(PropertyChannel::new());
        let state = SharedState::new();
        let sink: Arc<dyn EventSink> = Arc::new(sink);
        let stop = Arc::new(AtomicBool::new(false));

        let capture_loop = CaptureLoop::new(
            DeviceController::new(backend, logger.for_component("device")),
            corrector,
            Arc::clone(&channel),
            Arc::clone(&sink),
            state.clone(),
            config.clone(),
            logger.for_component("capture"),
        );
        let settings = capture_loop.settings();

        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || capture_loop.run(&thread_stop))
            .map_err(|e| VisionError::Engine(format!("Failed to spawn capture thread: {}", e)))?;

        logger.info(&format!("Capture engine started on thread '{}'", config.thread_name));

        Ok(CaptureEngine {
            handle: EngineHandle {
                channel,
                state,
                sink,
                settings,
            },
            stop,
            thread: Some(thread),
            logger,
        })
    }

    /// Starts an OpenCV-backed engine, loading calibration from `store`
    pub fn with_store<S: EventSink + 'static>(
        store: &CalibrationStore,
        sink: S,
        config: EngineConfig,
        logger: Logger,
    ) -> Result<Self> {
        let intrinsics = store.load();
        if intrinsics.is_none() {
            logger.info("No calibration found, frames will not be corrected");
        }
        Self::start(OpenCvBackend::new(), intrinsics.as_ref(), sink, config, logger)
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn request_open(&self, request: OpenRequest) {
        self.handle.request_open(request);
    }

    pub fn request_close(&self) {
        self.handle.request_close();
    }

    pub fn set_property(&self, property: PropertyId, value: i32) {
        self.handle.set_property(property, value);
    }

    pub fn refresh_ranges(&self) {
        self.handle.refresh_ranges();
    }

    pub fn state(&self) -> EngineState {
        self.handle.state()
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signals the loop and waits for it to release the device and exit
    pub fn stop(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        self.stop.store(true, Ordering::Release);
        thread
            .join()
            .map_err(|_| VisionError::Engine("Capture thread panicked".to_string()))?;
        self.logger.info("Capture engine stopped");
        Ok(())
    }
}

impl Drop for CaptureEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            self.logger.error(&e.to_string());
        }
    }
}
