//! Single-slot, lock-free, last-write-wins mailboxes.
//!
//! Every cell is one `AtomicU64`. Bit 63 marks a pending value, so the full
//! range of the payload (including negative numbers) is deliverable and
//! "nothing pending" never collides with a real value.

use crate::video::camera::config::OpenRequest;
use crate::video::camera::properties::PropertyId;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const PRESENT: u64 = 1 << 63;
const CLOSE: u64 = 1 << 62;
const FIELD_MASK: u64 = 0xFFFF;

/// Mailbox for one `i32` property value
#[derive(Debug, Default)]
pub struct Mailbox(AtomicU64);

impl Mailbox {
    pub const fn new() -> Self {
        Mailbox(AtomicU64::new(0))
    }

    /// Stores `value`, replacing any value not yet taken
    pub fn post(&self, value: i32) {
        self.0
            .store(PRESENT | u64::from(value as u32), Ordering::Release);
    }

    /// Removes and returns the pending value, if any
    pub fn take(&self) -> Option<i32> {
        let raw = self.0.swap(0, Ordering::AcqRel);
        (raw & PRESENT != 0).then_some(raw as u32 as i32)
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire) & PRESENT != 0
    }
}

/// Device lifecycle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    Open(OpenRequest),
    Close,
}

impl LifecycleRequest {
    /// Layout: bit 63 present, bit 62 close, bits 32..48 index, 16..32 width, 0..16 height
    fn pack(self) -> u64 {
        match self {
            LifecycleRequest::Close => PRESENT | CLOSE,
            LifecycleRequest::Open(request) => {
                PRESENT
                    | ((request.device_index() as u64 & FIELD_MASK) << 32)
                    | ((request.width() as u64 & FIELD_MASK) << 16)
                    | (request.height() as u64 & FIELD_MASK)
            }
        }
    }

    fn unpack(raw: u64) -> Option<Self> {
        if raw & PRESENT == 0 {
            return None;
        }
        if raw & CLOSE != 0 {
            return Some(LifecycleRequest::Close);
        }

        let index = ((raw >> 32) & FIELD_MASK) as i32;
        let width = ((raw >> 16) & FIELD_MASK) as i32;
        let height = (raw & FIELD_MASK) as i32;

        // Packed values were validated on the way in
        OpenRequest::new(index)
            .and_then(|r| r.with_resolution(width, height))
            .ok()
            .map(LifecycleRequest::Open)
    }
}

/// Mailbox for open/close requests
#[derive(Debug, Default)]
pub struct LifecycleMailbox(AtomicU64);

impl LifecycleMailbox {
    pub const fn new() -> Self {
        LifecycleMailbox(AtomicU64::new(0))
    }

    pub fn post(&self, request: LifecycleRequest) {
        self.0.store(request.pack(), Ordering::Release);
    }

    pub fn take(&self) -> Option<LifecycleRequest> {
        LifecycleRequest::unpack(self.0.swap(0, Ordering::AcqRel))
    }
}

/// Anything a caller can ask of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRequest {
    Open(OpenRequest),
    Close,
    SetProperty(PropertyId, i32),
}

/// Every mailbox the capture loop drains
///
/// Posting never blocks and never waits for the capture loop; mailboxes for
/// different properties are independent of each other.
#[derive(Debug, Default)]
pub struct PropertyChannel {
    lifecycle: LifecycleMailbox,
    properties: [Mailbox; 8],
    refresh: AtomicBool,
}

impl PropertyChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, request: DeviceRequest) {
        match request {
            DeviceRequest::Open(open) => self.lifecycle.post(LifecycleRequest::Open(open)),
            DeviceRequest::Close => self.lifecycle.post(LifecycleRequest::Close),
            DeviceRequest::SetProperty(property, value) => {
                self.properties[property.index()].post(value)
            }
        }
    }

    pub fn post_property(&self, property: PropertyId, value: i32) {
        self.properties[property.index()].post(value);
    }

    /// Asks the loop to re-read property ranges on its next iteration
    pub fn request_refresh(&self) {
        self.refresh.store(true, Ordering::Release);
    }

    pub fn take_lifecycle(&self) -> Option<LifecycleRequest> {
        self.lifecycle.take()
    }

    pub fn take_property(&self, property: PropertyId) -> Option<i32> {
        self.properties[property.index()].take()
    }

    pub fn take_refresh(&self) -> bool {
        self.refresh.swap(false, Ordering::AcqRel)
    }

    /// Empties every property mailbox, returning how many values were dropped
    pub fn discard_properties(&self) -> usize {
        PropertyId::ALL
            .into_iter()
            .filter(|p| self.take_property(*p).is_some())
            .count()
    }
}
