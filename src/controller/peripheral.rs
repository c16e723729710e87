//! Peripheral classification and per-frame raw samples

use crate::controller::raw;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Physical peripheral a sample was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeripheralType {
    /// Primary pad without any accessory, held sideways
    PrimaryDigitalOnly,
    /// Primary pad plus an analog stick accessory (two extra buttons)
    SecondaryAnalogAccessory,
    /// Full dual-stick pad plugged into the primary pad
    ExtendedAnalogAccessory,
    /// Independently polled second pad type
    AlternatePad,
}

impl PeripheralType {
    pub const ALL: [PeripheralType; 4] = [
        PeripheralType::PrimaryDigitalOnly,
        PeripheralType::SecondaryAnalogAccessory,
        PeripheralType::ExtendedAnalogAccessory,
        PeripheralType::AlternatePad,
    ];

    pub const fn index(self) -> usize {
        match self {
            PeripheralType::PrimaryDigitalOnly => 0,
            PeripheralType::SecondaryAnalogAccessory => 1,
            PeripheralType::ExtendedAnalogAccessory => 2,
            PeripheralType::AlternatePad => 3,
        }
    }

    /// Button map tables consulted for a sample of this type.
    ///
    /// The extended accessory leaves the primary pad's own buttons live, so
    /// both tables apply.
    pub const fn map_sources(self) -> &'static [PeripheralType] {
        match self {
            PeripheralType::PrimaryDigitalOnly => &[PeripheralType::PrimaryDigitalOnly],
            PeripheralType::SecondaryAnalogAccessory => {
                &[PeripheralType::SecondaryAnalogAccessory]
            }
            PeripheralType::ExtendedAnalogAccessory => &[
                PeripheralType::ExtendedAnalogAccessory,
                PeripheralType::PrimaryDigitalOnly,
            ],
            PeripheralType::AlternatePad => &[PeripheralType::AlternatePad],
        }
    }

    /// Key used in configuration files
    pub const fn config_key(self) -> &'static str {
        match self {
            PeripheralType::PrimaryDigitalOnly => "primary",
            PeripheralType::SecondaryAnalogAccessory => "secondary",
            PeripheralType::ExtendedAnalogAccessory => "extended",
            PeripheralType::AlternatePad => "alternate",
        }
    }
}

impl Display for PeripheralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeripheralType::PrimaryDigitalOnly => write!(f, "Primary pad"),
            PeripheralType::SecondaryAnalogAccessory => write!(f, "Analog accessory"),
            PeripheralType::ExtendedAnalogAccessory => write!(f, "Extended accessory"),
            PeripheralType::AlternatePad => write!(f, "Alternate pad"),
        }
    }
}

/// Opaque accessory descriptor reported by the polling layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpansionDescriptor(pub u8);

impl ExpansionDescriptor {
    pub const NONE: ExpansionDescriptor = ExpansionDescriptor(0x00);
    pub const SECONDARY_ANALOG: ExpansionDescriptor = ExpansionDescriptor(0x01);
    pub const EXTENDED_ANALOG: ExpansionDescriptor = ExpansionDescriptor(0x02);
}

/// Classifies the primary source of a slot. Never fails: unknown bits are
/// ignored and an empty descriptor means no accessory.
pub fn classify(descriptor: ExpansionDescriptor) -> PeripheralType {
    if descriptor.0 & ExpansionDescriptor::EXTENDED_ANALOG.0 != 0 {
        PeripheralType::ExtendedAnalogAccessory
    } else if descriptor.0 & ExpansionDescriptor::SECONDARY_ANALOG.0 != 0 {
        PeripheralType::SecondaryAnalogAccessory
    } else {
        PeripheralType::PrimaryDigitalOnly
    }
}

/// Analog stick position, both axes in `-1.0..=1.0`, positive up and right
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickPair {
    pub x: f32,
    pub y: f32,
}

impl StickPair {
    pub const CENTER: StickPair = StickPair { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One device's state for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Bits that went down this frame
    pub pressed: u32,
    /// Bits currently held
    pub held: u32,
    pub primary_stick: StickPair,
    /// Only populated for peripherals with a second stick
    pub secondary_stick: StickPair,
    pub peripheral: PeripheralType,
}

impl RawSample {
    /// Builds the primary-source sample of a slot from its accessory descriptor.
    pub fn from_descriptor(
        descriptor: ExpansionDescriptor,
        pressed: u32,
        held: u32,
        primary_stick: StickPair,
        secondary_stick: StickPair,
    ) -> Self {
        let peripheral = classify(descriptor);
        let primary_stick = match peripheral {
            PeripheralType::PrimaryDigitalOnly => StickPair::CENTER,
            _ => primary_stick,
        };
        let secondary_stick = match peripheral {
            PeripheralType::ExtendedAnalogAccessory => secondary_stick,
            _ => StickPair::CENTER,
        };

        Self {
            pressed,
            held,
            primary_stick,
            secondary_stick,
            peripheral,
        }
    }

    pub fn alternate(
        pressed: u32,
        held: u32,
        main_stick: StickPair,
        sub_stick: StickPair,
    ) -> Self {
        Self {
            pressed,
            held,
            primary_stick: main_stick,
            secondary_stick: sub_stick,
            peripheral: PeripheralType::AlternatePad,
        }
    }

    pub fn idle(peripheral: PeripheralType) -> Self {
        Self {
            pressed: 0,
            held: 0,
            primary_stick: StickPair::CENTER,
            secondary_stick: StickPair::CENTER,
            peripheral,
        }
    }

    /// Held bits used for direction resolution and button mapping.
    ///
    /// The primary pad's D-pad shares its bits with the accessory layout, so it
    /// is dropped while the analog accessory is the direction source.
    pub fn masked_held(&self) -> u32 {
        match self.peripheral {
            PeripheralType::SecondaryAnalogAccessory => self.held & !raw::MOTE_DPAD,
            _ => self.held,
        }
    }
}

/// Everything polled for one controller slot in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotSample {
    pub primary: RawSample,
    pub alternate: Option<RawSample>,
}

impl SlotSample {
    pub fn disconnected() -> Self {
        Self {
            primary: RawSample::idle(PeripheralType::PrimaryDigitalOnly),
            alternate: None,
        }
    }
}

impl Default for SlotSample {
    fn default() -> Self {
        Self::disconnected()
    }
}

/// Peripheral polling primitive
///
/// `scan` is called once per frame before any slot is sampled; `sample` must
/// not block.
pub trait Poller {
    fn scan(&mut self) {}

    fn sample(&mut self, slot: usize) -> SlotSample;
}

impl<P: Poller + ?Sized> Poller for &mut P {
    fn scan(&mut self) {
        (**self).scan()
    }

    fn sample(&mut self, slot: usize) -> SlotSample {
        (**self).sample(slot)
    }
}
