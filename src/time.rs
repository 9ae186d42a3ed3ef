//! Fixed-interval tick scheduler using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. TickScheduler converts
//! this into whole passive-production firings (one per `interval_ms`),
//! so game logic stays deterministic and testable without a real clock.

pub struct TickScheduler {
    /// Milliseconds per firing (1000ms = one firing per second).
    interval_ms: f64,
    /// Largest delta a single frame may contribute.
    max_frame_ms: f64,
    /// Accumulated milliseconds not yet consumed as firings.
    accumulator: f64,
    /// Total firings since creation.
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None before the first frame.
    last_timestamp: Option<f64>,
}

impl TickScheduler {
    /// `interval_ms` is floored at 1ms. `GameConfig::validate` rejects a non-positive `max_frame_ms`.
    pub fn new(interval_ms: f64, max_frame_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(1.0),
            max_frame_ms: max_frame_ms.max(0.0),
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp (from `performance.now()` or similar).
    /// Returns how many firings elapsed since the previous call.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            // バックグラウンドタブ復帰時の大量発火を防ぐ
            Some(prev) => (now_ms - prev).clamp(0.0, self.max_frame_ms),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.interval_ms) as u32;
        self.accumulator -= ticks as f64 * self.interval_ms;
        self.total_ticks += ticks as u64;
        ticks
    }
}
