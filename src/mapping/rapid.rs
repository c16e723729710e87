//! Rapid-fire filtering
//!
//! The filter performs no timing: whether the current frame is a rapid frame
//! comes from the caller, usually a [`RapidCadence`].

use crate::mapping::button_map::LogicalButton;

/// Whether an asserted logical button reaches the port output this frame
pub const fn include(button: &LogicalButton, is_rapid_frame: bool) -> bool {
    !button.rapid || is_rapid_frame
}

/// Frame cadence generator for rapid-fire buttons
///
/// Alternates between `period` rapid frames and `period` quiet frames.
#[derive(Debug, Clone)]
pub struct RapidCadence {
    period: u32,
    counter: u32,
    rapid: bool,
}

impl RapidCadence {
    pub fn new(period: u32) -> Self {
        Self {
            period: period.max(1),
            counter: 0,
            rapid: true,
        }
    }

    /// Advances one frame and returns whether that frame is a rapid frame.
    pub fn tick(&mut self) -> bool {
        let current = self.rapid;
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            self.rapid = !self.rapid;
        }
        current
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.rapid = true;
    }
}

impl Default for RapidCadence {
    fn default() -> Self {
        Self::new(2)
    }
}
