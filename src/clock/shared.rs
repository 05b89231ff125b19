//! Lock-free double-buffered state publication
//!
//! A two-slot cell shared between exactly one writer and any number of
//! readers. The writer mutates the slot readers are not looking at, then
//! publishes it by bumping an atomic version whose low bit selects the
//! current slot. Readers copy the current slot out by value and use the
//! version to detect a publish racing with the copy, retrying instead of
//! ever blocking.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{fence, AtomicBool, AtomicU32, Ordering};

/// Two-slot double buffer with atomic publication
///
/// `T` must be `Copy`: readers take value snapshots, never references, so
/// a publish cannot invalidate anything a reader holds. The single-writer
/// discipline is the caller's contract (see
/// [`begin_write`](DoubleBuffer::begin_write)); the
/// [`synchronized`](crate::synchronized) wrapper discharges it by keeping
/// its writer half unique.
pub struct DoubleBuffer<T> {
    /// The two state slots; the version's low bit selects the current one
    slots: [UnsafeCell<T>; 2],
    /// Publication version, bumped exactly once per publish
    version: AtomicU32,
    /// Write transaction opened but not yet ended
    write_open: AtomicBool,
}

// SAFETY: readers only ever copy slot contents out by value, and the sole
// writer has exclusive access to the non-current slot. A reader's copy can
// race with the writer re-acquiring that slot after a publish; the version
// check detects this and the torn copy is discarded unread.
unsafe impl<T: Copy + Send> Sync for DoubleBuffer<T> {}

impl<T: Copy> DoubleBuffer<T> {
    /// Create a buffer with both slots holding `value`
    pub fn new(value: T) -> Self {
        Self {
            slots: [UnsafeCell::new(value), UnsafeCell::new(value)],
            version: AtomicU32::new(0),
            write_open: AtomicBool::new(false),
        }
    }

    /// Publication version; changes exactly once per publish
    pub fn current_version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    /// Validated snapshot of the current slot
    pub fn read_current(&self) -> T {
        self.versioned_read().1
    }

    /// Validated snapshot plus the publication version it was read at
    ///
    /// Copies the current slot as raw bytes, then re-checks the version:
    /// a publish moving mid-copy means the bytes may be torn, so they are
    /// discarded and the copy retried. The loop terminates because
    /// publishes are paced by the writer's period, not by reader
    /// contention.
    pub fn versioned_read(&self) -> (u32, T) {
        loop {
            let before = self.version.load(Ordering::Acquire);
            let index = (before & 1) as usize;
            // Copy as MaybeUninit: torn bytes must not materialize as a T
            // until the version check has passed.
            let copy = unsafe {
                ptr::read_volatile(self.slots[index].get().cast::<MaybeUninit<T>>())
            };
            fence(Ordering::Acquire);
            if self.version.load(Ordering::Acquire) == before {
                // SAFETY: the version was stable across the whole copy, so
                // the writer never reacquired this slot mid-read and the
                // bytes are a fully written T.
                return (before, unsafe { copy.assume_init() });
            }
            tracing::trace!(version = before, "publish race during read");
        }
    }

    /// Exclusive access to the non-current slot
    ///
    /// # Safety
    /// Single writer only: the returned reference must not coexist with
    /// another `begin_write` borrow, and all write-protocol calls must come
    /// from the one thread driving writes.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn begin_write(&self) -> &mut T {
        let was_open = self.write_open.swap(true, Ordering::Acquire);
        debug_assert!(!was_open, "write transaction already open");
        let next = ((self.version.load(Ordering::Acquire) & 1) ^ 1) as usize;
        &mut *self.slots[next].get()
    }

    /// Close the write transaction
    ///
    /// Orders the slot writes before any subsequent publish. Must be called
    /// before [`try_publish`](DoubleBuffer::try_publish).
    pub fn end_write(&self) {
        fence(Ordering::Release);
        self.write_open.store(false, Ordering::Release);
    }

    /// Publish the just-written slot as current
    ///
    /// Returns `false` only when the write protocol was violated (a write
    /// transaction is still open). Under the single-writer
    /// begin/end/publish discipline this always succeeds.
    pub fn try_publish(&self) -> bool {
        if self.write_open.load(Ordering::Acquire) {
            return false;
        }
        self.version.fetch_add(1, Ordering::Release);
        true
    }
}
