/// Tracks the running peak of a wealth path and its largest drawdown.
///
/// Drawdown at a point is `(peak - value) / peak`. It stays within `[0, 1]`
/// as long as the path never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawdownTracker {
    peak: f64,
    max_drawdown: f64,
}

impl DrawdownTracker {
    /// Starts tracking from an initial value.
    #[must_use]
    pub fn new(initial_value: f64) -> Self {
        Self {
            peak: initial_value,
            max_drawdown: 0.0,
        }
    }

    /// Records the next value and returns the drawdown at that point.
    #[inline]
    pub fn update(&mut self, value: f64) -> f64 {
        if value > self.peak {
            self.peak = value;
        }
        if self.peak <= 0.0 {
            return 0.0;
        }
        let drawdown = (self.peak - value) / self.peak;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        drawdown
    }

    #[must_use]
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawdown_tracking() {
        let mut tracker = DrawdownTracker::new(100.0);
        tracker.update(120.0);
        assert_eq!(tracker.update(90.0), 0.25);
        tracker.update(130.0);
        tracker.update(117.0);
        assert_eq!(tracker.update(130.0), 0.0);
        assert_eq!(tracker.max_drawdown(), 0.25);
    }

    #[test]
    fn test_monotonic_path_has_no_drawdown() {
        let mut tracker = DrawdownTracker::new(1.0);
        for v in [1.0, 1.5, 2.0, 2.0, 3.0] {
            tracker.update(v);
        }
        assert_eq!(tracker.max_drawdown(), 0.0);
    }

    #[test]
    fn test_zero_peak_reports_no_drawdown() {
        let mut tracker = DrawdownTracker::new(0.0);
        assert_eq!(tracker.update(0.0), 0.0);
        assert_eq!(tracker.max_drawdown(), 0.0);
    }
}
