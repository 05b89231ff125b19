//! Delay-locked loop for audio clock recovery
//!
//! An audio callback fires once per buffer, but the timestamps it observes
//! jitter around the nominal period and drift as the interface clock and the
//! host clock diverge. The loop here keeps a model of that relationship:
//! each observed wakeup feeds a two-pole (proportional + integral) filter
//! that predicts the next wakeup, and the bracket between the current and
//! predicted wakeup supports linear interpolation between frame positions
//! and microsecond timestamps in both directions.

/// Loop gain. Larger values track jitter faster but amplify noise; smaller
/// values filter more but react slower to real drift. Set once, never
/// altered.
const FILTER_COEFFICIENT: f64 = 0.01;

/// Second-order delay-locked loop between a frame counter and a
/// microsecond clock
///
/// Single-threaded: mutate it from one logical owner only. For the
/// shared writer/reader form see [`synchronized`](crate::synchronized).
///
/// A loop starts empty. Establish the period with [`init_from_rate`]
/// (or construct through [`new`]), open the first wakeup bracket with
/// [`init_from_callback`], then feed every subsequent wakeup timestamp to
/// [`inc_frame`].
///
/// [`init_from_rate`]: DelayLockedLoop::init_from_rate
/// [`init_from_callback`]: DelayLockedLoop::init_from_callback
/// [`inc_frame`]: DelayLockedLoop::inc_frame
/// [`new`]: DelayLockedLoop::new
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DelayLockedLoop {
    /// Cumulative frame count at `current_wakeup`
    frames: u64,
    /// Start of the current period bracket (microseconds)
    current_wakeup: u64,
    /// Last observed callback timestamp (microseconds)
    current_callback: u64,
    /// Predicted end of the current bracket (microseconds)
    next_wakeup: u64,
    /// Accumulated drift correction (the loop's integral term)
    second_order_integrator: f64,
    /// Frames per callback period
    buffer_size: u32,
    /// Sample rate in Hz
    sample_rate: u32,
    /// Nominal period between wakeups (microseconds)
    period_usecs: u64,
}

impl DelayLockedLoop {
    /// Create a loop initialized for the given period parameters
    ///
    /// # Arguments
    /// * `buffer_size` - Frames per callback period
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Example
    /// ```
    /// use frameclock::DelayLockedLoop;
    ///
    /// let dll = DelayLockedLoop::new(512, 48000);
    /// assert_eq!(dll.period_usecs(), 10667);
    /// ```
    pub fn new(buffer_size: u32, sample_rate: u32) -> Self {
        let mut dll = Self::default();
        dll.init_from_rate(buffer_size, sample_rate);
        dll
    }

    /// Nominal period in microseconds for one buffer at the given rate
    ///
    /// Rounded to the nearest microsecond: 512 frames at 48kHz is 10667.
    /// A zero sample rate saturates to `u64::MAX` rather than failing;
    /// degenerate parameters are the caller's contract (see
    /// [`ClockConfig`](crate::ClockConfig) for validated construction).
    pub fn nominal_period(buffer_size: u32, sample_rate: u32) -> u64 {
        (1_000_000.0 / f64::from(sample_rate) * f64::from(buffer_size)).round() as u64
    }

    /// Reset the loop and derive the period from buffer size and sample rate
    ///
    /// Clears the wakeup bracket, frame counter, and integrator. Must run
    /// before [`init_from_callback`](DelayLockedLoop::init_from_callback)
    /// has a period to work with.
    pub fn init_from_rate(&mut self, buffer_size: u32, sample_rate: u32) {
        self.frames = 0;
        self.current_wakeup = 0;
        self.current_callback = 0;
        self.next_wakeup = 0;
        self.second_order_integrator = 0.0;
        self.buffer_size = buffer_size;
        self.sample_rate = sample_rate;
        self.period_usecs = Self::nominal_period(buffer_size, sample_rate);

        tracing::debug!(
            buffer_size,
            sample_rate,
            period_usecs = self.period_usecs,
            "delay-locked loop rate init"
        );
    }

    /// Open the first wakeup bracket from an observed callback timestamp
    ///
    /// Resets the frame counter and integrator but keeps the established
    /// period. `current_wakeup` restarts at zero, so the first bracket
    /// spans `[0, callback_usecs + period)`.
    ///
    /// # Arguments
    /// * `callback_usecs` - Wakeup timestamp in microseconds
    pub fn init_from_callback(&mut self, callback_usecs: u64) {
        self.frames = 0;
        self.current_wakeup = 0;
        self.second_order_integrator = 0.0;
        self.current_callback = callback_usecs;
        self.next_wakeup = callback_usecs.saturating_add(self.period_usecs);

        tracing::trace!(
            callback_usecs,
            next_wakeup = self.next_wakeup,
            "delay-locked loop callback init"
        );
    }

    /// Advance the loop by one period from the observed wakeup timestamp
    ///
    /// The control step. The error between the predicted and actual wakeup
    /// feeds both a proportional term and the accumulated integral term;
    /// together they pull the next prediction toward the real callback
    /// cadence without chasing every jittery wakeup.
    ///
    /// # Arguments
    /// * `callback_usecs` - Actual wakeup timestamp in microseconds
    pub fn inc_frame(&mut self, callback_usecs: u64) {
        let delta = callback_usecs as i64 - self.next_wakeup as i64;
        self.current_wakeup = self.next_wakeup;
        self.current_callback = callback_usecs;
        self.frames += u64::from(self.buffer_size);
        self.second_order_integrator += 0.5 * FILTER_COEFFICIENT * delta as f64;
        let correction =
            (FILTER_COEFFICIENT * (delta as f64 + self.second_order_integrator)).floor();
        self.next_wakeup = (self.current_wakeup as i64)
            .saturating_add(self.period_usecs as i64)
            .saturating_add(correction as i64) as u64;
    }

    /// Map a wall-clock instant to a frame position
    ///
    /// Linear interpolation inside the current bracket. A timestamp clearly
    /// before the bracket clamps to `max(frames, 1)`; a collapsed bracket
    /// (loop never initialized, or a degenerate correction) clamps the same
    /// way instead of dividing by zero. Results saturate rather than wrap
    /// at the numeric extremes.
    ///
    /// # Arguments
    /// * `timestamp_usecs` - Wall-clock instant in microseconds
    ///
    /// # Returns
    /// The frame position corresponding to the timestamp
    pub fn time_to_frames(&self, timestamp_usecs: u64) -> u64 {
        let span = self.next_wakeup.saturating_sub(self.current_wakeup);
        if span == 0 {
            return self.frames.max(1);
        }
        let offset = timestamp_usecs as i64 - self.current_wakeup as i64;
        let delta = (offset as f64 / span as f64 * f64::from(self.buffer_size)).round() as i64;
        if delta < 0 {
            self.frames.max(1)
        } else {
            self.frames.saturating_add(delta as u64)
        }
    }

    /// Map a frame position to a wall-clock instant
    ///
    /// The inverse of [`time_to_frames`](DelayLockedLoop::time_to_frames),
    /// with the matching clamp: a frame position before the bracket returns
    /// `max(current_wakeup, 1)`.
    ///
    /// # Arguments
    /// * `frame_pos` - Frame position to locate in time
    ///
    /// # Returns
    /// The wall-clock instant in microseconds
    pub fn frames_to_time(&self, frame_pos: u64) -> u64 {
        let span = self.next_wakeup.saturating_sub(self.current_wakeup);
        if span == 0 || self.buffer_size == 0 {
            return self.current_wakeup.max(1);
        }
        let offset = frame_pos as i64 - self.frames as i64;
        let delta = (offset as f64 * span as f64 / f64::from(self.buffer_size)).round() as i64;
        if delta < 0 {
            self.current_wakeup.max(1)
        } else {
            self.current_wakeup.saturating_add(delta as u64)
        }
    }

    /// Cumulative frame count at the start of the current bracket
    pub fn current_frame(&self) -> u64 {
        self.frames
    }

    /// Wall-clock start of the current bracket in microseconds
    pub fn current_time(&self) -> u64 {
        self.current_wakeup
    }

    /// Nominal period between wakeups in microseconds
    pub fn period_usecs(&self) -> u64 {
        self.period_usecs
    }

    /// Frames per callback period
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
