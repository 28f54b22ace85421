//! The capture loop body.
//!
//! One iteration: apply a pending open/close, apply a pending range refresh,
//! forward pending property writes, then pull and correct one frame. The
//! loop sleeps only between iterations, never while holding anything a
//! caller could wait on.
//!
//! Under sink backpressure only frames are shed. Control notifications the
//! sink refuses are kept in order and retried at the start of each iteration,
//! and no frame is published while any of them is still pending.

use crate::common::constants::events::CONTROL_BACKLOG_LIMIT;
use crate::common::constants::logging::CAMERA_LOG_INTERVAL;
use crate::video::camera::backend::CaptureBackend;
use crate::video::camera::config::OpenRequest;
use crate::video::camera::controller::DeviceController;
use crate::video::camera::properties::PropertyId;
use crate::video::correction::FrameCorrector;
use logging::Logger;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use super::config::EngineConfig;
use super::events::{CaptureEvent, EventSink};
use super::mailbox::{LifecycleRequest, PropertyChannel};
use super::state::{CameraSettings, EngineState, SharedSettings, SharedState};

/// What one iteration did, which decides how long to sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No device open
    Idle,
    /// Device open, nothing ready
    NoFrame,
    /// A frame was published
    Frame,
}

/// State owned by the capture thread
pub struct CaptureLoop<B: CaptureBackend> {
    device: DeviceController<B>,
    corrector: FrameCorrector,
    channel: Arc<PropertyChannel>,
    sink: Arc<dyn EventSink>,
    state: SharedState,
    settings: SharedSettings,
    config: EngineConfig,
    logger: Logger,
    backlog: VecDeque<CaptureEvent>,
    published: u64,
    dropped: u64,
}

impl<B: CaptureBackend> CaptureLoop<B> {
    pub fn new(
        device: DeviceController<B>,
        corrector: FrameCorrector,
        channel: Arc<PropertyChannel>,
        sink: Arc<dyn EventSink>,
        state: SharedState,
        config: EngineConfig,
        logger: Logger,
    ) -> Self {
        CaptureLoop {
            device,
            corrector,
            channel,
            sink,
            state,
            settings: SharedSettings::new(),
            config,
            logger,
            backlog: VecDeque::new(),
            published: 0,
            dropped: 0,
        }
    }

    /// Runs until `stop` is set, then releases the device
    pub fn run(mut self, stop: &AtomicBool) {
        self.logger.info(&format!(
            "Capture loop started (correction {})",
            if self.corrector.is_active() { "on" } else { "off" }
        ));

        while !stop.load(Ordering::Acquire) {
            match self.step() {
                StepOutcome::Frame => {}
                StepOutcome::NoFrame => sleep_for(self.config.no_frame_retry_interval),
                StepOutcome::Idle => sleep_for(self.config.idle_poll_interval),
            }
        }

        self.close_device();
        self.flush_backlog();
        if !self.backlog.is_empty() {
            self.logger.warn(&format!(
                "{} notification(s) undelivered at shutdown",
                self.backlog.len()
            ));
        }
        self.logger.info(&format!(
            "Capture loop stopped ({} frames published, {} dropped by sink)",
            self.published, self.dropped
        ));
    }

    /// One loop iteration
    pub fn step(&mut self) -> StepOutcome {
        self.flush_backlog();

        match self.channel.take_lifecycle() {
            Some(LifecycleRequest::Open(request)) => self.open_device(request),
            Some(LifecycleRequest::Close) => self.close_device(),
            None => {}
        }

        if self.channel.take_refresh() {
            self.refresh_ranges();
        }

        self.apply_properties();

        if self.device.is_open() {
            self.capture_frame()
        } else {
            StepOutcome::Idle
        }
    }

    pub fn device(&self) -> &DeviceController<B> {
        &self.device
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    /// Settings record this loop keeps in line with the open device
    pub fn settings(&self) -> SharedSettings {
        self.settings.clone()
    }

    /// Control notifications refused by the sink and awaiting retry
    pub fn pending_notifications(&self) -> usize {
        self.backlog.len()
    }

    fn open_device(&mut self, request: OpenRequest) {
        self.close_device();
        self.state.set(EngineState::Opening);

        let index = request.device_index();
        match self.device.open(index, request.width(), request.height()) {
            Ok(()) => {
                let stale = self.channel.discard_properties();
                if stale > 0 {
                    self.logger.debug(&format!(
                        "Discarded {} property write(s) posted before device {} opened",
                        stale, index
                    ));
                }

                let (width, height) = self.device.resolution();
                let ranges = *self.device.ranges();
                self.publish(CaptureEvent::DeviceOpened {
                    device_index: index,
                    width,
                    height,
                });
                self.publish(CaptureEvent::PropertiesSupported {
                    device_index: index,
                    supported: *self.device.supported(),
                });
                self.publish(CaptureEvent::RangesDiscovered {
                    device_index: index,
                    ranges,
                });
                let discovered = CameraSettings::discovered(index, width, height, &ranges);
                self.settings.replace(discovered);
                self.publish(CaptureEvent::SettingsChanged(discovered));
                self.state.set(EngineState::Streaming);
            }
            Err(e) => {
                self.state.set(EngineState::Idle);
                self.publish(CaptureEvent::OpenFailed {
                    device_index: index,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn close_device(&mut self) {
        if let Some(index) = self.device.device_index() {
            self.device.close();
            self.publish(CaptureEvent::Closed {
                device_index: index,
            });
        }
        self.state.set(EngineState::Idle);
    }

    fn refresh_ranges(&mut self) {
        let Some(index) = self.device.device_index() else {
            self.logger.debug("Range refresh requested with no device open");
            return;
        };

        match self.device.refresh_ranges() {
            Ok(ranges) => {
                let ranges = *ranges;
                let refreshed = self.settings.update(|s| {
                    for (property, range) in ranges.iter() {
                        s.set(property, range.current);
                    }
                });
                self.publish(CaptureEvent::RangesDiscovered {
                    device_index: index,
                    ranges,
                });
                self.publish(CaptureEvent::SettingsChanged(refreshed));
            }
            Err(e) => self.logger.warn(&format!("Range refresh failed: {}", e)),
        }
    }

    fn apply_properties(&mut self) {
        for property in PropertyId::ALL {
            let Some(value) = self.channel.take_property(property) else {
                continue;
            };

            if let Err(e) = self.device.set(property, value) {
                self.logger
                    .warn(&format!("Rejected {} = {}: {}", property, value, e));
                self.publish(CaptureEvent::PropertyRejected {
                    property,
                    value,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn capture_frame(&mut self) -> StepOutcome {
        let raw = match self.device.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return StepOutcome::NoFrame,
            Err(e) => {
                self.logger.debug(&format!("Frame read failed: {}", e));
                return StepOutcome::NoFrame;
            }
        };

        let corrected = match self.corrector.correct(&raw) {
            Ok(frame) => frame.with_sequence(self.device.frame_count()),
            Err(e) => {
                self.logger.warn(&format!("Frame correction failed: {}", e));
                return StepOutcome::NoFrame;
            }
        };

        if self.publish(CaptureEvent::Frame(corrected)) {
            self.published += 1;
        }

        if self.published > 0 && self.published.is_multiple_of(CAMERA_LOG_INTERVAL) {
            self.logger
                .debug(&format!("Frames published: {}", self.published));
        }
        StepOutcome::Frame
    }

    /// Hands `event` to the sink. Frames are dropped when the sink is full;
    /// anything else is queued for retry instead.
    fn publish(&mut self, event: CaptureEvent) -> bool {
        if event.is_frame() {
            let delivered = self.backlog.is_empty() && self.sink.publish(event);
            if !delivered {
                self.dropped += 1;
            }
            return delivered;
        }

        if self.backlog.is_empty() && self.sink.publish(event.clone()) {
            return true;
        }

        if self.backlog.len() >= CONTROL_BACKLOG_LIMIT {
            self.backlog.pop_front();
            self.logger
                .warn("Notification backlog full, oldest notification dropped");
        }
        self.backlog.push_back(event);
        false
    }

    /// Retries queued control notifications in order, stopping at the first refusal
    fn flush_backlog(&mut self) {
        while let Some(event) = self.backlog.front() {
            if !self.sink.publish(event.clone()) {
                break;
            }
            self.backlog.pop_front();
        }
    }
}

fn sleep_for(interval: std::time::Duration) {
    if interval.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(interval);
    }
}
