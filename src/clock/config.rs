//! Clock configuration
//!
//! A validated pair of buffer size and sample rate. The constructor rejects
//! zero values up front so the loop itself never has to special-case a
//! division by zero mid-callback.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dll::DelayLockedLoop;
use crate::{DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};

/// Errors from clock configuration validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockConfigError {
    /// Buffer size of zero frames
    #[error("buffer size must be greater than zero frames")]
    ZeroBufferSize,

    /// Sample rate of zero Hz
    #[error("sample rate must be greater than zero Hz")]
    ZeroSampleRate,
}

/// Timing parameters for a synchronized clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Frames delivered per audio callback
    pub buffer_size: u32,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl ClockConfig {
    /// Create a validated configuration
    ///
    /// # Arguments
    /// * `buffer_size` - Frames per callback, must be non-zero
    /// * `sample_rate` - Sample rate in Hz, must be non-zero
    ///
    /// # Example
    /// ```
    /// use frameclock::ClockConfig;
    ///
    /// let config = ClockConfig::new(512, 48000).unwrap();
    /// assert_eq!(config.period_usecs(), 10667);
    ///
    /// assert!(ClockConfig::new(0, 48000).is_err());
    /// ```
    pub fn new(buffer_size: u32, sample_rate: u32) -> Result<Self, ClockConfigError> {
        if buffer_size == 0 {
            return Err(ClockConfigError::ZeroBufferSize);
        }
        if sample_rate == 0 {
            return Err(ClockConfigError::ZeroSampleRate);
        }
        Ok(Self {
            buffer_size,
            sample_rate,
        })
    }

    /// Nominal callback period in microseconds
    pub fn period_usecs(&self) -> u64 {
        DelayLockedLoop::nominal_period(self.buffer_size, self.sample_rate)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = ClockConfig::new(256, 96000).unwrap();
        assert_eq!(config.buffer_size, 256);
        assert_eq!(config.sample_rate, 96000);
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        assert_eq!(
            ClockConfig::new(0, 48000),
            Err(ClockConfigError::ZeroBufferSize)
        );
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert_eq!(
            ClockConfig::new(512, 0),
            Err(ClockConfigError::ZeroSampleRate)
        );
    }

    #[test]
    fn test_default_config() {
        let config = ClockConfig::default();
        assert_eq!(config.buffer_size, 512);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.period_usecs(), 10667);
    }

    #[test]
    fn test_period_follows_rate() {
        assert_eq!(ClockConfig::new(512, 48000).unwrap().period_usecs(), 10667);
        assert_eq!(ClockConfig::new(512, 96000).unwrap().period_usecs(), 5333);
        assert_eq!(ClockConfig::new(512, 44100).unwrap().period_usecs(), 11610);
        assert_eq!(ClockConfig::new(256, 192000).unwrap().period_usecs(), 1333);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ClockConfig::new(128, 44100).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: ClockConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_deserialize_from_literal() {
        let config: ClockConfig =
            serde_json::from_str(r#"{"buffer_size":512,"sample_rate":48000}"#).unwrap();
        assert_eq!(config, ClockConfig::default());
    }
}
