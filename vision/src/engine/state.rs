//! Engine state shared between the capture thread and its handles.

use crate::video::camera::properties::{PropertyId, PropertyRanges};
use std::sync::{Arc, Mutex, MutexGuard};
use std::sync::atomic::{AtomicU8, Ordering};

/// Capture loop state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No device open
    Idle,
    /// An open request is being handled
    Opening,
    /// A device is open and frames are being pulled
    Streaming,
}

impl EngineState {
    fn to_u8(self) -> u8 {
        match self {
            EngineState::Idle => 0,
            EngineState::Opening => 1,
            EngineState::Streaming => 2,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Opening,
            2 => EngineState::Streaming,
            _ => EngineState::Idle,
        }
    }
}

/// Lock-free cell holding the current [`EngineState`]; written only by the capture loop
#[derive(Debug, Clone)]
pub struct SharedState(Arc<AtomicU8>);

impl SharedState {
    pub fn new() -> Self {
        SharedState(Arc::new(AtomicU8::new(EngineState::Idle.to_u8())))
    }

    pub fn get(&self) -> EngineState {
        EngineState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, state: EngineState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Most recently requested camera settings
///
/// `None` for a property means nothing has been requested or discovered yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraSettings {
    pub device_index: Option<i32>,
    pub width: i32,
    pub height: i32,
    values: [Option<i32>; 8],
}

impl CameraSettings {
    pub fn get(&self, property: PropertyId) -> Option<i32> {
        self.values[property.index()]
    }

    pub fn set(&mut self, property: PropertyId, value: i32) {
        self.values[property.index()] = Some(value);
    }

    /// Settings describing a freshly opened device
    pub fn discovered(device_index: i32, width: i32, height: i32, ranges: &PropertyRanges) -> Self {
        let mut settings = CameraSettings {
            device_index: Some(device_index),
            width,
            height,
            values: [None; 8],
        };
        for (property, range) in ranges.iter() {
            settings.set(property, range.current);
        }
        settings
    }
}

/// Settings record shared by every handle and the capture loop
///
/// Callers write requested values; the loop overwrites the record with what a
/// device actually reports when it opens or ranges are refreshed.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings(Arc<Mutex<CameraSettings>>);

impl SharedSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> CameraSettings {
        *self.lock()
    }

    /// Applies `change` and returns the resulting record
    pub fn update(&self, change: impl FnOnce(&mut CameraSettings)) -> CameraSettings {
        let mut guard = self.lock();
        change(&mut guard);
        *guard
    }

    pub fn replace(&self, settings: CameraSettings) {
        *self.lock() = settings;
    }

    fn lock(&self) -> MutexGuard<'_, CameraSettings> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::camera::properties::PropertyRange;

    #[test]
    fn test_shared_state_transitions() {
        let state = SharedState::new();
        let observer = state.clone();
        assert_eq!(observer.get(), EngineState::Idle);

        state.set(EngineState::Opening);
        assert_eq!(observer.get(), EngineState::Opening);
        state.set(EngineState::Streaming);
        assert_eq!(observer.get(), EngineState::Streaming);
    }

    #[test]
    fn test_settings_record() {
        let mut settings = CameraSettings::default();
        assert_eq!(settings.get(PropertyId::Brightness), None);

        settings.set(PropertyId::Brightness, 200);
        assert_eq!(settings.get(PropertyId::Brightness), Some(200));
    }

    #[test]
    fn test_discovered_settings() {
        let mut ranges = PropertyRanges::default();
        ranges.set(
            PropertyId::Focus,
            PropertyRange {
                min: 0,
                max: 255,
                current: 30,
            },
        );

        let settings = CameraSettings::discovered(2, 640, 480, &ranges);
        assert_eq!(settings.device_index, Some(2));
        assert_eq!(settings.get(PropertyId::Focus), Some(30));
        assert_eq!(settings.get(PropertyId::Brightness), Some(126));
    }

    #[test]
    fn test_shared_settings_visible_to_clones() {
        let settings = SharedSettings::new();
        let observer = settings.clone();

        let updated = settings.update(|s| s.set(PropertyId::Contrast, 5));
        assert_eq!(observer.get(), updated);

        let mut ranges = PropertyRanges::default();
        ranges.set(
            PropertyId::Brightness,
            PropertyRange {
                min: 0,
                max: 255,
                current: 64,
            },
        );
        observer.replace(CameraSettings::discovered(0, 64, 48, &ranges));
        assert_eq!(settings.get().get(PropertyId::Brightness), Some(64));
        assert_eq!(settings.get().width, 64);
    }
}
