//! Frame scheduler
//!
//! Decouples the platform's callback rate (display refresh) from the
//! simulation rate: a step only runs once more than `frame_delay_ms` has
//! elapsed since the last processed frame. The next callback is requested
//! only after the current one finished, so steps never overlap.

/// Opaque id of a requested platform frame (`requestAnimationFrame` id in the browser)
pub type FrameHandle = i32;

/// Platform side of the scheduler
pub trait FrameDriver {
    /// Request one future frame callback
    fn request(&mut self) -> FrameHandle;
    /// Cancel a previously requested callback
    fn cancel(&mut self, handle: FrameHandle);
}

/// Pause/resume-able frame clock
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frame_delay_ms: f64,
    last_time: f64,
    /// `None` is the "no active frame" sentinel
    active: Option<FrameHandle>,
}

impl FrameScheduler {
    pub fn new(frame_delay_ms: f64) -> Self {
        Self {
            frame_delay_ms: frame_delay_ms.max(0.0),
            last_time: 0.0,
            active: None,
        }
    }

    pub fn frame_delay_ms(&self) -> f64 {
        self.frame_delay_ms
    }

    pub fn set_frame_delay(&mut self, frame_delay_ms: f64) {
        self.frame_delay_ms = frame_delay_ms.max(0.0);
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Begin the repeating callback
    pub fn start<D: FrameDriver + ?Sized>(&mut self, driver: &mut D) {
        self.resume(driver);
    }

    /// Stop future scheduling. Returns `false` if already paused.
    pub fn pause<D: FrameDriver + ?Sized>(&mut self, driver: &mut D) -> bool {
        match self.active.take() {
            Some(handle) => {
                driver.cancel(handle);
                true
            }
            None => false,
        }
    }

    /// Restart scheduling. Returns `false` if already running.
    pub fn resume<D: FrameDriver + ?Sized>(&mut self, driver: &mut D) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(driver.request());
        true
    }

    /// Pause when running, resume when paused. Returns the new running state.
    pub fn toggle<D: FrameDriver + ?Sized>(&mut self, driver: &mut D) -> bool {
        if self.is_running() {
            self.pause(driver);
        } else {
            self.resume(driver);
        }
        self.is_running()
    }

    /// Called at the top of a platform frame callback.
    ///
    /// Returns `true` when the simulation step should run for this frame.
    pub fn begin_frame(&mut self, now_ms: f64) -> bool {
        if self.active.is_none() {
            return false;
        }
        let elapsed = now_ms - self.last_time;
        if elapsed > self.frame_delay_ms {
            self.last_time = now_ms;
            true
        } else {
            false
        }
    }

    /// Called after the step returned; schedules the next frame if still running
    pub fn end_frame<D: FrameDriver + ?Sized>(&mut self, driver: &mut D) {
        if self.active.is_some() {
            self.active = Some(driver.request());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeDriver {
        next: FrameHandle,
        requested: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameDriver for FakeDriver {
        fn request(&mut self) -> FrameHandle {
            self.next += 1;
            self.requested.push(self.next);
            self.next
        }

        fn cancel(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    #[test]
    fn test_start_requests_one_frame() {
        let mut driver = FakeDriver::default();
        let mut scheduler = FrameScheduler::new(100.0);
        assert!(!scheduler.is_running());

        scheduler.start(&mut driver);
        assert!(scheduler.is_running());
        assert_eq!(driver.requested, vec![1]);

        // Already running: no second request
        assert!(!scheduler.resume(&mut driver));
        assert_eq!(driver.requested.len(), 1);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut driver = FakeDriver::default();
        let mut scheduler = FrameScheduler::new(0.0);
        scheduler.start(&mut driver);

        assert!(scheduler.pause(&mut driver));
        assert!(!scheduler.pause(&mut driver));
        assert_eq!(driver.cancelled, vec![1]);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_delay_gates_steps() {
        let mut driver = FakeDriver::default();
        let mut scheduler = FrameScheduler::new(100.0);
        scheduler.start(&mut driver);

        assert!(scheduler.begin_frame(101.0));
        assert!(!scheduler.begin_frame(150.0));
        assert!(!scheduler.begin_frame(201.0)); // exactly 100ms is not enough
        assert!(scheduler.begin_frame(201.5));
    }

    #[test]
    fn test_paused_frames_do_not_step_or_reschedule() {
        let mut driver = FakeDriver::default();
        let mut scheduler = FrameScheduler::new(0.0);
        scheduler.start(&mut driver);
        scheduler.pause(&mut driver);

        assert!(!scheduler.begin_frame(1000.0));
        scheduler.end_frame(&mut driver);
        assert_eq!(driver.requested.len(), 1);
    }

    #[test]
    fn test_pause_during_step_stops_loop() {
        let mut driver = FakeDriver::default();
        let mut scheduler = FrameScheduler::new(0.0);
        scheduler.start(&mut driver);

        assert!(scheduler.begin_frame(16.0));
        // The step itself decides to stop (snake died)
        scheduler.pause(&mut driver);
        scheduler.end_frame(&mut driver);
        assert_eq!(driver.requested.len(), 1);

        // Resume picks the loop back up
        assert!(scheduler.toggle(&mut driver));
        assert_eq!(driver.requested.len(), 2);
    }

    #[test]
    fn test_end_frame_chains_next_request() {
        let mut driver = FakeDriver::default();
        let mut scheduler = FrameScheduler::new(0.0);
        scheduler.start(&mut driver);
        for t in 1..=3 {
            scheduler.begin_frame(t as f64 * 16.0);
            scheduler.end_frame(&mut driver);
        }
        assert_eq!(driver.requested, vec![1, 2, 3, 4]);
        // Pausing cancels the most recent request
        scheduler.pause(&mut driver);
        assert_eq!(driver.cancelled, vec![4]);
    }
}
