//! Platform helpers
//!
//! Handles browser/native timing concerns that sit outside the simulation:
//! - Frame-rate tracking for the HUD

use std::collections::VecDeque;

use crate::consts::FPS_HISTORY_LEN;

/// Moving average of the render frame rate
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    last_time: Option<f64>,
    history: VecDeque<f64>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `time_ms` (animation-frame timestamp)
    pub fn record(&mut self, time_ms: f64) {
        if let Some(last) = self.last_time {
            let elapsed = time_ms - last;
            if elapsed > 0.0 {
                self.history.push_back(1000.0 / elapsed);
                if self.history.len() > FPS_HISTORY_LEN {
                    self.history.pop_front();
                }
            }
        }
        self.last_time = Some(time_ms);
    }

    /// Average over the recorded window (0 before two frames)
    pub fn average_fps(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    pub fn samples(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_no_rate() {
        let mut stats = FrameStats::new();
        stats.record(100.0);
        assert_eq!(stats.average_fps(), 0.0);
        assert_eq!(stats.samples(), 0);
    }

    #[test]
    fn test_average_and_window() {
        let mut stats = FrameStats::new();
        let mut t = 0.0;
        stats.record(t);
        for _ in 0..(FPS_HISTORY_LEN + 50) {
            t += 20.0;
            stats.record(t);
        }
        assert_eq!(stats.samples(), FPS_HISTORY_LEN);
        assert!((stats.average_fps() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_timestamp_ignored() {
        let mut stats = FrameStats::new();
        stats.record(0.0);
        stats.record(0.0);
        stats.record(10.0);
        assert_eq!(stats.samples(), 1);
        assert!((stats.average_fps() - 100.0).abs() < 1e-9);
    }
}
