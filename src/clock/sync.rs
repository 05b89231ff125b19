//! Synchronized delay-locked loop
//!
//! The audio callback owns the clock model, but every other engine thread
//! wants to convert between frames and time. [`synchronized`] splits one
//! loop into a unique writer half and a cloneable reader half sharing a
//! [`DoubleBuffer`]: the writer mutates a shadow copy of the model and
//! publishes it atomically; readers snapshot the published model and retry
//! when a publish lands mid-read. Nobody ever blocks.

use std::sync::Arc;

use super::config::ClockConfig;
use super::dll::DelayLockedLoop;
use super::shared::DoubleBuffer;

/// Create a synchronized delay-locked loop, split into writer and reader
/// halves
///
/// Both slots start rate-initialized from `config`. The writer half is
/// unique and belongs on the audio callback thread; the reader half clones
/// cheaply into any thread that needs conversions.
///
/// # Example
/// ```
/// use frameclock::{synchronized, ClockConfig};
///
/// let (mut writer, reader) = synchronized(ClockConfig::default());
/// writer.init_from_callback(0);
/// writer.inc_frame(10667);
/// assert_eq!(reader.current_frame(), 512);
/// ```
pub fn synchronized(config: ClockConfig) -> (ClockWriter, ClockReader) {
    let dll = DelayLockedLoop::new(config.buffer_size, config.sample_rate);
    let shared = Arc::new(DoubleBuffer::new(dll));

    tracing::debug!(
        buffer_size = config.buffer_size,
        sample_rate = config.sample_rate,
        period_usecs = dll.period_usecs(),
        "synchronized clock created"
    );

    (
        ClockWriter {
            shared: Arc::clone(&shared),
        },
        ClockReader { shared },
    )
}

/// Writer half of a synchronized delay-locked loop
///
/// Deliberately not `Clone`, with mutators taking `&mut self`: exactly one
/// thread can drive the clock, so the publish step can never race itself.
pub struct ClockWriter {
    shared: Arc<DoubleBuffer<DelayLockedLoop>>,
}

impl ClockWriter {
    /// Re-derive the period and reset the model (both timebases restart)
    pub fn init_from_rate(&mut self, buffer_size: u32, sample_rate: u32) {
        self.mutate(|dll| dll.init_from_rate(buffer_size, sample_rate));
    }

    /// Open the first wakeup bracket from an observed callback timestamp
    pub fn init_from_callback(&mut self, callback_usecs: u64) {
        self.mutate(|dll| dll.init_from_callback(callback_usecs));
    }

    /// Advance the loop by one period; call once per audio callback
    pub fn inc_frame(&mut self, callback_usecs: u64) {
        self.mutate(|dll| dll.inc_frame(callback_usecs));
    }

    /// Mint an additional reader sharing this clock
    pub fn reader(&self) -> ClockReader {
        ClockReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Copy the published model forward, mutate the shadow slot, publish it
    fn mutate(&mut self, apply: impl FnOnce(&mut DelayLockedLoop)) {
        // The shadow slot is two publishes stale; seed it from the latest
        // published model so every mutation builds on full state.
        let current = self.shared.read_current();
        // SAFETY: &mut self on a non-Clone writer makes this the only
        // write transaction in existence.
        let slot = unsafe { self.shared.begin_write() };
        *slot = current;
        apply(slot);
        self.shared.end_write();
        let published = self.shared.try_publish();
        debug_assert!(published, "single-writer publish cannot fail");
    }
}

/// Reader half of a synchronized delay-locked loop
///
/// Cheap to clone and safe to share: every method computes on a
/// self-consistent snapshot of the most recently published model, without
/// blocking the writer or other readers.
#[derive(Clone)]
pub struct ClockReader {
    shared: Arc<DoubleBuffer<DelayLockedLoop>>,
}

impl ClockReader {
    /// Map a wall-clock instant to a frame position
    pub fn time_to_frames(&self, timestamp_usecs: u64) -> u64 {
        self.snapshot().time_to_frames(timestamp_usecs)
    }

    /// Map a frame position to a wall-clock instant
    pub fn frames_to_time(&self, frame_pos: u64) -> u64 {
        self.snapshot().frames_to_time(frame_pos)
    }

    /// Cumulative frame count at the start of the current bracket
    pub fn current_frame(&self) -> u64 {
        self.snapshot().current_frame()
    }

    /// Wall-clock start of the current bracket in microseconds
    pub fn current_time(&self) -> u64 {
        self.snapshot().current_time()
    }

    /// Consistent snapshot of the published clock model
    pub fn snapshot(&self) -> DelayLockedLoop {
        self.versioned_snapshot().1
    }

    /// Consistent snapshot plus the publication version it was read at
    ///
    /// The version identifies exactly which published state produced the
    /// snapshot, making reader results reproducible from a single-threaded
    /// replay (the coherency stress tests rely on this). Retry on a racing
    /// publish happens inside [`DoubleBuffer::versioned_read`].
    pub fn versioned_snapshot(&self) -> (u32, DelayLockedLoop) {
        self.shared.versioned_read()
    }
}
