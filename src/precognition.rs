//! Countdown bounding how long a press may wait for contact and still complete a grab.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Lower bound applied to any configured precognition duration, in seconds.
pub const DEFAULT_MIN_PRECOGNITION: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecognitionGate {
    floor: f32,
    start_time: f32,
    remaining: f32,
    enabled: bool,
}

impl PrecognitionGate {
    /// Creates a disabled, expired gate. Non-positive or non-finite floors fall back to
    /// [`DEFAULT_MIN_PRECOGNITION`].
    pub fn new(floor: f32) -> Self {
        let floor = if floor.is_finite() && floor > 0.0 {
            floor
        } else {
            DEFAULT_MIN_PRECOGNITION
        };
        Self {
            floor,
            start_time: floor,
            remaining: 0.0,
            enabled: false,
        }
    }

    /// Sets the window length to `max(duration, floor)`.
    pub fn arm(&mut self, duration: f32) {
        let effective = clamp_to_floor(duration, self.floor);
        if effective != duration {
            warn!(
                requested = duration,
                floor = self.floor,
                "grab precognition below minimum, clamping"
            );
        }
        self.start_time = effective;
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resumes the countdown. An expired window restarts from `start_time`.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        if self.remaining <= 0.0 {
            self.remaining = self.start_time;
        }
    }

    /// Pauses the countdown without touching `remaining`.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Opens a fresh window of `start_time`.
    pub fn restart(&mut self) {
        self.enabled = true;
        self.remaining = self.start_time;
    }

    /// Closes the window immediately.
    pub fn cancel(&mut self) {
        self.remaining = 0.0;
    }

    /// Advances the countdown by `delta` seconds while enabled.
    pub fn tick(&mut self, delta: f32) {
        if !self.enabled || self.remaining <= 0.0 {
            return;
        }
        self.remaining = (self.remaining - delta.max(0.0)).max(0.0);
        trace!(remaining = self.remaining, "precognition tick");
    }

    /// Whether a contact arriving now still counts as anticipated.
    pub fn is_open(&self) -> bool {
        self.enabled && self.remaining > 0.0
    }
}

impl Default for PrecognitionGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PRECOGNITION)
    }
}

pub(crate) fn clamp_to_floor(duration: f32, floor: f32) -> f32 {
    // NaN compares false, so it also lands on the floor.
    if duration >= floor {
        duration
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_clamps_non_positive_durations() {
        let mut gate = PrecognitionGate::new(0.01);
        for d in [0.0, -1.0, -0.0001, 0.005, f32::NAN] {
            gate.arm(d);
            assert_eq!(gate.start_time(), 0.01);
        }
        gate.arm(0.25);
        assert_eq!(gate.start_time(), 0.25);
    }

    #[test]
    fn bad_floor_falls_back_to_default() {
        assert_eq!(PrecognitionGate::new(0.0).floor(), DEFAULT_MIN_PRECOGNITION);
        assert_eq!(PrecognitionGate::new(-3.0).floor(), DEFAULT_MIN_PRECOGNITION);
    }

    #[test]
    fn countdown_only_advances_while_enabled() {
        let mut gate = PrecognitionGate::new(0.01);
        gate.arm(1.0);
        gate.restart();

        gate.tick(0.25);
        assert_eq!(gate.remaining(), 0.75);

        gate.disable();
        gate.tick(0.5);
        assert_eq!(gate.remaining(), 0.75);
        assert!(!gate.is_open());

        gate.enable();
        assert_eq!(gate.remaining(), 0.75);
        assert!(gate.is_open());
    }

    #[test]
    fn reenabling_after_expiry_restarts_window() {
        let mut gate = PrecognitionGate::new(0.01);
        gate.arm(0.5);
        gate.restart();
        gate.tick(2.0);
        assert_eq!(gate.remaining(), 0.0);
        assert!(!gate.is_open());

        gate.disable();
        gate.enable();
        assert_eq!(gate.remaining(), 0.5);
        assert!(gate.is_open());
    }

    #[test]
    fn cancel_closes_window() {
        let mut gate = PrecognitionGate::default();
        gate.arm(1.0);
        gate.restart();
        gate.cancel();
        assert!(!gate.is_open());
    }
}
