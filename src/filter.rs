//! Moving-average smoothing of time measurements
//!
//! Keeps a fixed 64-slot history of microsecond samples and reports their
//! arithmetic mean. Useful for smoothing jittery timing measurements
//! (wakeup deltas, measured latencies) before they feed into scheduling
//! decisions.

/// Number of history slots in the filter window
pub const FILTER_SIZE: usize = 64;

/// Fixed-window moving average over time samples
///
/// Maintains the most recent [`FILTER_SIZE`] values (newest first) and
/// reports their integer mean. The history starts zero-filled, so the mean
/// is biased toward zero until the window has warmed up - callers that need
/// an unbiased value must insert [`FILTER_SIZE`] samples first.
///
/// Not concurrency-safe: a filter belongs to a single logical owner.
#[derive(Debug, Clone)]
pub struct MovingAverageFilter {
    /// Sample history in microseconds, newest at index 0
    history: [u64; FILTER_SIZE],
}

impl MovingAverageFilter {
    /// Create a new filter with a zero-filled history
    ///
    /// # Example
    /// ```
    /// use frameclock::filter::MovingAverageFilter;
    ///
    /// let mut filter = MovingAverageFilter::new();
    /// for _ in 0..64 {
    ///     filter.add_value(250);
    /// }
    /// assert_eq!(filter.mean(), 250);
    /// ```
    pub fn new() -> Self {
        Self {
            history: [0; FILTER_SIZE],
        }
    }

    /// Insert a sample, evicting the oldest one
    ///
    /// Shifts every slot one position toward "oldest" and stores the new
    /// value at the newest position. O(window) per call.
    ///
    /// # Arguments
    /// * `value_usecs` - Time sample in microseconds
    pub fn add_value(&mut self, value_usecs: u64) {
        self.history.copy_within(0..FILTER_SIZE - 1, 1);
        self.history[0] = value_usecs;
    }

    /// Arithmetic mean over the whole window
    ///
    /// Integer division over all [`FILTER_SIZE`] slots, including any
    /// still-zero warm-up slots. The window sum saturates rather than
    /// wrapping when the samples are large enough to overflow it.
    pub fn mean(&self) -> u64 {
        let sum = self
            .history
            .iter()
            .fold(0u64, |acc, &value| acc.saturating_add(value));
        sum / FILTER_SIZE as u64
    }

    /// Clear the history back to the zero-filled state
    pub fn reset(&mut self) {
        self.history = [0; FILTER_SIZE];
    }
}

impl Default for MovingAverageFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_mean_is_zero() {
        let filter = MovingAverageFilter::new();
        assert_eq!(filter.mean(), 0);
    }

    #[test]
    fn test_partial_window_biased_toward_zero() {
        let mut filter = MovingAverageFilter::new();
        filter.add_value(6400);

        // One sample against 63 zero slots
        assert_eq!(filter.mean(), 100);

        filter.add_value(6400);
        assert_eq!(filter.mean(), 200);
    }

    #[test]
    fn test_partial_window_integer_division() {
        let mut filter = MovingAverageFilter::new();
        filter.add_value(100);
        filter.add_value(200);
        filter.add_value(300);

        // 600 / 64 truncates
        assert_eq!(filter.mean(), 9);
    }

    #[test]
    fn test_full_window_mean_is_exact() {
        let mut filter = MovingAverageFilter::new();
        for _ in 0..FILTER_SIZE {
            filter.add_value(10667);
        }
        assert_eq!(filter.mean(), 10667);
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut filter = MovingAverageFilter::new();
        for _ in 0..FILTER_SIZE {
            filter.add_value(1000);
        }
        assert_eq!(filter.mean(), 1000);

        // Half the window replaced: mean sits halfway
        for _ in 0..FILTER_SIZE / 2 {
            filter.add_value(2000);
        }
        assert_eq!(filter.mean(), 1500);

        // Fully replaced: the old values no longer contribute
        for _ in 0..FILTER_SIZE / 2 {
            filter.add_value(2000);
        }
        assert_eq!(filter.mean(), 2000);
    }

    #[test]
    fn test_window_keeps_most_recent_values() {
        let mut filter = MovingAverageFilter::new();

        // 65 inserts of the same value: the first one must have been evicted
        // without affecting the mean of a saturated window
        for _ in 0..FILTER_SIZE + 1 {
            filter.add_value(500);
        }
        assert_eq!(filter.mean(), 500);

        // One outlier only shifts the mean by outlier/64
        filter.add_value(500 + 64);
        assert_eq!(filter.mean(), 501);
    }

    #[test]
    fn test_mean_saturates_instead_of_overflowing() {
        let mut filter = MovingAverageFilter::new();
        for _ in 0..FILTER_SIZE {
            filter.add_value(u64::MAX);
        }

        // The window sum clamps at u64::MAX instead of wrapping
        assert_eq!(filter.mean(), u64::MAX / FILTER_SIZE as u64);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut filter = MovingAverageFilter::new();
        for _ in 0..FILTER_SIZE {
            filter.add_value(123);
        }
        assert_eq!(filter.mean(), 123);

        filter.reset();
        assert_eq!(filter.mean(), 0);
    }

    #[test]
    fn test_default_matches_new() {
        let filter = MovingAverageFilter::default();
        assert_eq!(filter.mean(), 0);
    }
}
