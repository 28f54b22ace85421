//! Device lifecycle and property access for exactly one capture device.

use crate::error::{Result, VisionError};
use crate::video::frame::VideoFrame;
use logging::Logger;
use opencv::videoio::{CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};

use super::backend::CaptureBackend;
use super::properties::{PropertyId, PropertyRange, PropertyRanges, SupportedProperties};

/// Owns one [`CaptureBackend`] and the discovered capabilities of the open device
///
/// Only the capture thread holds a `DeviceController`; nothing here is shared.
pub struct DeviceController<B: CaptureBackend> {
    backend: B,
    logger: Logger,
    device_index: Option<i32>,
    supported: SupportedProperties,
    ranges: PropertyRanges,
    frame_count: u64,
}

impl<B: CaptureBackend> DeviceController<B> {
    pub fn new(backend: B, logger: Logger) -> Self {
        DeviceController {
            backend,
            logger,
            device_index: None,
            supported: SupportedProperties::default(),
            ranges: PropertyRanges::default(),
            frame_count: 0,
        }
    }

    /// Opens `index`, releasing any held device first.
    ///
    /// A `(0, 0)` resolution keeps the device default. On failure the
    /// controller is left closed and the driver message is returned verbatim.
    pub fn open(&mut self, index: i32, width: i32, height: i32) -> Result<()> {
        self.close();

        self.logger.info(&format!(
            "Opening device {} ({})",
            index,
            if width > 0 && height > 0 {
                format!("{}x{}", width, height)
            } else {
                "default resolution".to_string()
            }
        ));

        if let Err(e) = self.backend.open(index, width, height) {
            self.backend.release();
            self.logger
                .error(&format!("Failed to open device {}: {}", index, e));
            return Err(e);
        }

        if !self.backend.is_opened() {
            self.backend.release();
            let err = VisionError::Device(format!("Camera {} is not available", index));
            self.logger.error(&err.to_string());
            return Err(err);
        }

        self.device_index = Some(index);
        self.frame_count = 0;
        self.discover();

        let (w, h) = self.resolution();
        if width > 0 && height > 0 && (w, h) != (width, height) {
            self.logger.debug(&format!(
                "Device {} did not accept {}x{}, delivering {}x{}",
                index, width, height, w, h
            ));
        }
        self.logger.info(&format!(
            "Device {} opened at {}x{}, {} of {} properties supported",
            index,
            w,
            h,
            self.supported.count(),
            PropertyId::ALL.len()
        ));
        Ok(())
    }

    /// Releases the device. Closing a closed controller is a no-op.
    pub fn close(&mut self) {
        if let Some(index) = self.device_index.take() {
            self.backend.release();
            self.supported = SupportedProperties::default();
            self.ranges = PropertyRanges::default();
            self.logger.info(&format!(
                "Device {} closed after {} frames",
                index, self.frame_count
            ));
        }
    }

    pub fn is_open(&self) -> bool {
        self.device_index.is_some()
    }

    pub fn device_index(&self) -> Option<i32> {
        self.device_index
    }

    /// Actual frame size reported by the driver
    pub fn resolution(&self) -> (i32, i32) {
        (
            self.backend.get(CAP_PROP_FRAME_WIDTH) as i32,
            self.backend.get(CAP_PROP_FRAME_HEIGHT) as i32,
        )
    }

    /// Last known range of `property`
    pub fn get(&self, property: PropertyId) -> PropertyRange {
        self.ranges.get(property)
    }

    pub fn ranges(&self) -> &PropertyRanges {
        &self.ranges
    }

    pub fn supported(&self) -> &SupportedProperties {
        &self.supported
    }

    /// Writes `value` to the device and records it as the current value
    pub fn set(&mut self, property: PropertyId, value: i32) -> Result<()> {
        if !self.is_open() {
            return Err(VisionError::DeviceNotOpen);
        }

        if !self.backend.set(property.cap_prop(), f64::from(value)) {
            return Err(VisionError::Device(format!(
                "Driver rejected {} = {}",
                property, value
            )));
        }

        let mut range = self.ranges.get(property);
        range.current = value;
        self.ranges.set(property, range);

        self.logger.debug(&format!("Set {} = {}", property, value));
        Ok(())
    }

    /// Re-reads every property's current value from the device
    pub fn refresh_ranges(&mut self) -> Result<&PropertyRanges> {
        if !self.is_open() {
            return Err(VisionError::DeviceNotOpen);
        }

        for property in PropertyId::ALL {
            let raw = self.backend.get(property.cap_prop());
            self.ranges.set(property, PropertyRange::from_reading(raw));
        }
        Ok(&self.ranges)
    }

    /// Pulls the next raw frame from the device
    pub fn read_frame(&mut self) -> Result<Option<VideoFrame>> {
        if !self.is_open() {
            return Err(VisionError::DeviceNotOpen);
        }

        let frame = self.backend.read()?;
        if frame.is_some() {
            self.frame_count += 1;
        }
        Ok(frame)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Checks support and seeds ranges for every property
    fn discover(&mut self) {
        for property in PropertyId::ALL {
            let prop = property.cap_prop();
            let raw = self.backend.get(prop);

            // Without an explicit capability query, a zero reading counts as unsupported
            let supported = self.backend.query_support(prop).unwrap_or(raw != 0.0);

            self.supported.set(property, supported);
            self.ranges.set(property, PropertyRange::from_reading(raw));
            self.logger.debug(&format!(
                "{}: supported={}, raw={}",
                property, supported, raw
            ));
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: CaptureBackend> Drop for DeviceController<B> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Backend with a property table that echoes writes
    #[derive(Default)]
    struct EchoBackend {
        opened: bool,
        fail_open: bool,
        props: HashMap<i32, f64>,
        support: Option<bool>,
        releases: usize,
    }

    impl CaptureBackend for EchoBackend {
        fn open(&mut self, index: i32, _width: i32, _height: i32) -> Result<()> {
            if self.fail_open {
                self.opened = true;
                return Err(VisionError::Device(format!("no device {}", index)));
            }
            self.opened = true;
            Ok(())
        }

        fn is_opened(&self) -> bool {
            self.opened
        }

        fn release(&mut self) {
            self.opened = false;
            self.releases += 1;
        }

        fn get(&self, prop: i32) -> f64 {
            self.props.get(&prop).copied().unwrap_or(0.0)
        }

        fn set(&mut self, prop: i32, value: f64) -> bool {
            self.props.insert(prop, value);
            true
        }

        fn read(&mut self) -> Result<Option<VideoFrame>> {
            Ok(None)
        }

        fn query_support(&self, _prop: i32) -> Option<bool> {
            self.support
        }
    }

    fn controller(backend: EchoBackend) -> DeviceController<EchoBackend> {
        DeviceController::new(backend, Logger::discard())
    }

    #[test]
    fn test_open_discovers_ranges_with_midpoint_heuristic() {
        let mut backend = EchoBackend::default();
        backend.props.insert(PropertyId::Brightness.cap_prop(), 64.0);
        let mut device = controller(backend);

        device.open(0, 0, 0).unwrap();

        assert!(device.is_open());
        assert_eq!(device.get(PropertyId::Brightness).current, 64);
        assert_eq!(device.get(PropertyId::Contrast).current, 126);
        assert_eq!(device.get(PropertyId::Contrast).max, 255);
        assert!(device.supported().contains(PropertyId::Brightness));
        assert!(!device.supported().contains(PropertyId::Contrast));
    }

    #[test]
    fn test_explicit_support_overrides_zero_heuristic() {
        let backend = EchoBackend {
            support: Some(true),
            ..Default::default()
        };
        let mut device = controller(backend);

        device.open(0, 0, 0).unwrap();
        assert_eq!(device.supported().count(), 8);
    }

    #[test]
    fn test_failed_open_leaves_controller_closed() {
        let backend = EchoBackend {
            fail_open: true,
            ..Default::default()
        };
        let mut device = controller(backend);

        let err = device.open(7, 0, 0).unwrap_err();
        assert!(err.to_string().contains("no device 7"));
        assert!(!device.is_open());
        assert!(!device.backend().is_opened());
    }

    #[test]
    fn test_set_updates_current() {
        let mut device = controller(EchoBackend::default());
        device.open(0, 0, 0).unwrap();

        device.set(PropertyId::Brightness, 200).unwrap();
        assert_eq!(device.get(PropertyId::Brightness).current, 200);
        assert_eq!(
            device.backend().get(PropertyId::Brightness.cap_prop()),
            200.0
        );
    }

    #[test]
    fn test_set_while_closed_is_rejected() {
        let mut device = controller(EchoBackend::default());
        assert!(matches!(
            device.set(PropertyId::Focus, 10),
            Err(VisionError::DeviceNotOpen)
        ));
    }

    #[test]
    fn test_reopen_releases_previous_device() {
        let mut device = controller(EchoBackend::default());
        device.open(0, 0, 0).unwrap();
        device.open(1, 640, 480).unwrap();

        assert_eq!(device.device_index(), Some(1));
        assert!(device.backend().releases >= 1);
    }

    #[test]
    fn test_refresh_ranges_reads_live_values() {
        let mut device = controller(EchoBackend::default());
        device.open(0, 0, 0).unwrap();
        device.set(PropertyId::Focus, 40).unwrap();

        let ranges = device.refresh_ranges().unwrap();
        assert_eq!(ranges.get(PropertyId::Focus).current, 40);
        assert_eq!(ranges.get(PropertyId::Exposure).current, 126);
    }

    #[test]
    fn test_refused_resolution_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("device.log");
        let logger = Logger::new(log_path.clone(), logging::LogLevel::Debug).unwrap();

        let mut backend = EchoBackend::default();
        backend.props.insert(CAP_PROP_FRAME_WIDTH, 320.0);
        backend.props.insert(CAP_PROP_FRAME_HEIGHT, 240.0);
        let mut device = DeviceController::new(backend, logger);

        device.open(0, 640, 480).unwrap();
        assert_eq!(device.resolution(), (320, 240));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        let mut content = String::new();
        while std::time::Instant::now() < deadline && !content.contains("did not accept") {
            std::thread::sleep(std::time::Duration::from_millis(10));
            content = std::fs::read_to_string(&log_path).unwrap_or_default();
        }
        assert!(content.contains("Device 0 did not accept 640x480, delivering 320x240"));
    }
}
