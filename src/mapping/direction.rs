//! Direction resolution from digital pads and analog sticks
//!
//! Thresholds are evaluated in the physical controller's frame of reference;
//! rotation is applied to the resolved result only.
//!
//! ```text
//! digital (masked) ──┐
//! analog sticks ─────┼──► Directions ──► rotate ──► port bits
//! alternate pad ─────┘
//! ```

use crate::controller::peripheral::{PeripheralType, RawSample, StickPair};
use crate::controller::raw;
use serde::{Deserialize, Serialize};

/// Deflection needed on an accessory stick
pub const EXPANSION_ANALOG_THRESHOLD: f32 = 0.5;

/// Deflection needed on the alternate pad's main stick
pub const ALTERNATE_ANALOG_THRESHOLD: f32 = 0.3;

/// Display rotation of the emulated screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate270,
}

impl Rotation {
    /// Anything other than 90 or 270 maps to no rotation.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Rotation::Rotate90,
            270 => Rotation::Rotate270,
            _ => Rotation::Rotate0,
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Rotate0 => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate270 => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Directions {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Directions {
    pub const NONE: Directions = Directions {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    pub const fn union(self, other: Directions) -> Directions {
        Directions {
            up: self.up || other.up,
            down: self.down || other.down,
            left: self.left || other.left,
            right: self.right || other.right,
        }
    }

    /// Relabels physical directions for a rotated display.
    ///
    /// At 270 degrees physical up drives left, left drives down, down drives
    /// right and right drives up. 90 degrees is the inverse.
    pub const fn rotate(self, rotation: Rotation) -> Directions {
        match rotation {
            Rotation::Rotate0 => self,
            Rotation::Rotate270 => Directions {
                left: self.up,
                down: self.left,
                right: self.down,
                up: self.right,
            },
            Rotation::Rotate90 => Directions {
                right: self.up,
                up: self.left,
                left: self.down,
                down: self.right,
            },
        }
    }

    pub const fn to_bits(self, bits: &DirectionBits) -> u16 {
        let mut out = 0;
        if self.up {
            out |= bits.up;
        }
        if self.down {
            out |= bits.down;
        }
        if self.left {
            out |= bits.left;
        }
        if self.right {
            out |= bits.right;
        }
        out
    }

    fn from_stick(stick: StickPair, threshold: f32) -> Directions {
        Directions {
            up: stick.y > threshold,
            down: stick.y < -threshold,
            left: stick.x < -threshold,
            right: stick.x > threshold,
        }
    }
}

/// Port output bits of the four directions for one target system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionBits {
    pub up: u16,
    pub down: u16,
    pub left: u16,
    pub right: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionResolver {
    rotation_supported: bool,
    secondary_stick: bool,
}

impl DirectionResolver {
    pub const fn new(rotation_supported: bool, secondary_stick: bool) -> Self {
        Self {
            rotation_supported,
            secondary_stick,
        }
    }

    /// Resolves the four directions for one slot.
    ///
    /// `masked_held` must be the primary sample's held bits after D-pad masking.
    pub fn resolve(
        &self,
        primary: &RawSample,
        masked_held: u32,
        alternate: Option<&RawSample>,
        rotation: Rotation,
    ) -> Directions {
        let mut directions = primary_digital(primary.peripheral, masked_held)
            .union(Directions::from_stick(
                primary.primary_stick,
                EXPANSION_ANALOG_THRESHOLD,
            ));

        if self.secondary_stick {
            directions = directions.union(Directions::from_stick(
                primary.secondary_stick,
                EXPANSION_ANALOG_THRESHOLD,
            ));
        }

        if let Some(alt) = alternate {
            directions = directions
                .union(alternate_digital(alt.held))
                .union(Directions::from_stick(
                    alt.primary_stick,
                    ALTERNATE_ANALOG_THRESHOLD,
                ));
        }

        if self.rotation_supported {
            directions.rotate(rotation)
        } else {
            directions
        }
    }
}

fn primary_digital(peripheral: PeripheralType, held: u32) -> Directions {
    // Without the analog accessory the primary pad is held sideways
    let sideways = peripheral != PeripheralType::SecondaryAnalogAccessory;
    let mote = if sideways {
        Directions {
            up: held & raw::MOTE_RIGHT != 0,
            down: held & raw::MOTE_LEFT != 0,
            left: held & raw::MOTE_UP != 0,
            right: held & raw::MOTE_DOWN != 0,
        }
    } else {
        Directions {
            up: held & raw::MOTE_UP != 0,
            down: held & raw::MOTE_DOWN != 0,
            left: held & raw::MOTE_LEFT != 0,
            right: held & raw::MOTE_RIGHT != 0,
        }
    };

    if peripheral == PeripheralType::ExtendedAnalogAccessory {
        mote.union(Directions {
            up: held & raw::CLASSIC_UP != 0,
            down: held & raw::CLASSIC_DOWN != 0,
            left: held & raw::CLASSIC_LEFT != 0,
            right: held & raw::CLASSIC_RIGHT != 0,
        })
    } else {
        mote
    }
}

fn alternate_digital(held: u32) -> Directions {
    Directions {
        up: held & raw::ALT_UP != 0,
        down: held & raw::ALT_DOWN != 0,
        left: held & raw::ALT_LEFT != 0,
        right: held & raw::ALT_RIGHT != 0,
    }
}
