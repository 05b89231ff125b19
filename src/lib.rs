//! Frameclock - clock synchronization for real-time audio engines
//!
//! This library tracks the relationship between a sample-accurate frame
//! counter and a microsecond wall-clock timebase when the two drift
//! independently (audio interface clock vs. host CPU clock). A delay-locked
//! loop smooths wakeup jitter and drift, and a lock-free double-buffer lets
//! the audio callback update the clock model while any number of other
//! threads convert between timebases without blocking.

pub mod clock;
pub mod filter;

pub use clock::config::{ClockConfig, ClockConfigError};
pub use clock::dll::DelayLockedLoop;
pub use clock::shared::DoubleBuffer;
pub use clock::sync::{synchronized, ClockReader, ClockWriter};
pub use filter::MovingAverageFilter;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default sample rate for clock recovery (48kHz, the common engine rate)
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Default period size in frames (512 frames per callback)
pub const DEFAULT_BUFFER_SIZE: u32 = 512;
