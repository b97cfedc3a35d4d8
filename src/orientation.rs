//! Orientation samples and the bounded queue the controller drains each tick.

use heapless::Deque;

/// One orientation reading. Angles are in degrees in device-local axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrientationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Reliability tier, higher is better. 0 means "do not trust".
    pub status: u8,
}

impl OrientationSample {
    pub const fn new(x: f32, y: f32, z: f32, status: u8) -> Self {
        Self { x, y, z, status }
    }
}

pub const SAMPLE_QUEUE_DEPTH: usize = 8;

/// Samples buffered since the last tick. Only the newest one is ever used.
#[derive(Debug, Default)]
pub struct SampleQueue {
    samples: Deque<OrientationSample, SAMPLE_QUEUE_DEPTH>,
}

impl SampleQueue {
    pub const fn new() -> Self {
        Self {
            samples: Deque::new(),
        }
    }

    /// Queue a sample, dropping the oldest one when full.
    pub fn push(&mut self, sample: OrientationSample) {
        if self.samples.is_full() {
            let _ = self.samples.pop_front();
        }
        // Cannot fail, a slot was just freed.
        let _ = self.samples.push_back(sample);
    }

    /// Newest sample, emptying the queue.
    pub fn take_latest(&mut self) -> Option<OrientationSample> {
        let latest = self.samples.pop_back();
        self.samples.clear();
        latest
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Anything that can produce orientation samples when polled.
///
/// A poll that has nothing new, or fails, simply pushes nothing.
pub trait OrientationSource {
    fn poll(&mut self, now_ms: u64, queue: &mut SampleQueue);
}
