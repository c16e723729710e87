//! Target system profiles
//!
//! Emulated systems differ only in data: the logical button list, where the
//! directions live in the port output, how many ports are polled, whether
//! the display can be rotated and what the special button does. Each system
//! is one static [`SystemProfile`].

use crate::controller::peripheral::PeripheralType::{
    AlternatePad, ExtendedAnalogAccessory, PrimaryDigitalOnly, SecondaryAnalogAccessory,
};
use crate::controller::raw::*;
use crate::mapping::button_map::{ButtonMapEntry, ButtonMapTable, LogicalButton};
use crate::mapping::direction::DirectionBits;
use crate::mapping::special::{SpecialAction, MEDIA_SWAP_PLAN};
use crate::mapping::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

macro_rules! entry {
    ($peripheral:expr, $index:expr, $mask:expr) => {
        ButtonMapEntry::new($peripheral, $index, $mask)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSystem {
    Nes,
    Lynx,
}

impl TargetSystem {
    pub const ALL: [TargetSystem; 2] = [TargetSystem::Nes, TargetSystem::Lynx];

    pub fn profile(self) -> &'static SystemProfile {
        match self {
            TargetSystem::Nes => &NES_PROFILE,
            TargetSystem::Lynx => &LYNX_PROFILE,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            TargetSystem::Nes => "nes",
            TargetSystem::Lynx => "lynx",
        }
    }
}

impl Display for TargetSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.profile().name)
    }
}

impl FromStr for TargetSystem {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetSystem::ALL
            .into_iter()
            .find(|system| system.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MappingError::UnknownSystem(s.to_string()))
    }
}

/// Kind of media loaded into the emulated system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Cartridge,
    /// Multi-sided disk media
    Disk,
    /// Coin-operated arcade board
    Arcade,
}

impl FromStr for MediaKind {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cartridge" | "cart" => Ok(MediaKind::Cartridge),
            "disk" => Ok(MediaKind::Disk),
            "arcade" | "vs" => Ok(MediaKind::Arcade),
            other => Err(MappingError::ConfigError(format!(
                "Unknown media kind: {}",
                other
            ))),
        }
    }
}

#[derive(Debug)]
pub struct SystemProfile {
    pub system: TargetSystem,
    pub name: &'static str,
    pub buttons: &'static [LogicalButton],
    pub directions: DirectionBits,
    /// Controller ports polled every frame
    pub slots: usize,
    pub rotation_supported: bool,
    /// Whether the right stick of an extended accessory also drives directions
    pub secondary_stick_directions: bool,
    /// Native screen size (width, height)
    pub screen: (u16, u16),
    pub default_map: &'static [ButtonMapEntry],
}

impl SystemProfile {
    pub fn default_table(&self) -> Result<ButtonMapTable, MappingError> {
        ButtonMapTable::from_entries(self.buttons.len(), self.default_map)
    }

    /// Special button behaviour for the given media
    pub fn special_action(&self, media: MediaKind) -> SpecialAction {
        if !self.buttons.iter().any(|b| b.special) {
            return SpecialAction::None;
        }
        match media {
            MediaKind::Cartridge => SpecialAction::None,
            MediaKind::Disk => SpecialAction::Sequence(MEDIA_SWAP_PLAN),
            MediaKind::Arcade => SpecialAction::CoinInsert,
        }
    }
}

pub const NES_A: u16 = 0x01;
pub const NES_B: u16 = 0x02;
pub const NES_SELECT: u16 = 0x04;
pub const NES_START: u16 = 0x08;
pub const NES_UP: u16 = 0x10;
pub const NES_DOWN: u16 = 0x20;
pub const NES_LEFT: u16 = 0x40;
pub const NES_RIGHT: u16 = 0x80;

const NES_BUTTONS: [LogicalButton; 7] = [
    LogicalButton::plain("A", NES_A),
    LogicalButton::plain("B", NES_B),
    LogicalButton::plain("Select", NES_SELECT),
    LogicalButton::plain("Start", NES_START),
    LogicalButton::rapid("A Rapid", NES_A),
    LogicalButton::rapid("B Rapid", NES_B),
    LogicalButton::special("Special"),
];

const NES_MAP: [ButtonMapEntry; 26] = [
    entry!(PrimaryDigitalOnly, 0, MOTE_TWO),
    entry!(PrimaryDigitalOnly, 1, MOTE_ONE),
    entry!(PrimaryDigitalOnly, 2, MOTE_MINUS),
    entry!(PrimaryDigitalOnly, 3, MOTE_PLUS),
    entry!(PrimaryDigitalOnly, 5, MOTE_B),
    entry!(PrimaryDigitalOnly, 6, MOTE_A),
    entry!(SecondaryAnalogAccessory, 0, MOTE_A),
    entry!(SecondaryAnalogAccessory, 1, MOTE_B),
    entry!(SecondaryAnalogAccessory, 2, MOTE_MINUS),
    entry!(SecondaryAnalogAccessory, 3, MOTE_PLUS),
    entry!(SecondaryAnalogAccessory, 4, CHUK_C),
    entry!(SecondaryAnalogAccessory, 5, CHUK_Z),
    entry!(SecondaryAnalogAccessory, 6, MOTE_TWO),
    entry!(ExtendedAnalogAccessory, 0, CLASSIC_A),
    entry!(ExtendedAnalogAccessory, 1, CLASSIC_B),
    entry!(ExtendedAnalogAccessory, 2, CLASSIC_MINUS),
    entry!(ExtendedAnalogAccessory, 3, CLASSIC_PLUS),
    entry!(ExtendedAnalogAccessory, 4, CLASSIC_X),
    entry!(ExtendedAnalogAccessory, 5, CLASSIC_Y),
    entry!(ExtendedAnalogAccessory, 6, CLASSIC_L | CLASSIC_R),
    entry!(AlternatePad, 0, ALT_A),
    entry!(AlternatePad, 1, ALT_B),
    entry!(AlternatePad, 2, ALT_Y),
    entry!(AlternatePad, 3, ALT_START),
    entry!(AlternatePad, 4, ALT_X),
    entry!(AlternatePad, 6, ALT_R),
];

pub static NES_PROFILE: SystemProfile = SystemProfile {
    system: TargetSystem::Nes,
    name: "NES",
    buttons: &NES_BUTTONS,
    directions: DirectionBits {
        up: NES_UP,
        down: NES_DOWN,
        left: NES_LEFT,
        right: NES_RIGHT,
    },
    slots: 4,
    rotation_supported: false,
    secondary_stick_directions: false,
    screen: (256, 256),
    default_map: &NES_MAP,
};

pub const LYNX_A: u16 = 0x001;
pub const LYNX_B: u16 = 0x002;
pub const LYNX_OPTION_2: u16 = 0x004;
pub const LYNX_OPTION_1: u16 = 0x008;
pub const LYNX_LEFT: u16 = 0x010;
pub const LYNX_RIGHT: u16 = 0x020;
pub const LYNX_UP: u16 = 0x040;
pub const LYNX_DOWN: u16 = 0x080;
pub const LYNX_PAUSE: u16 = 0x100;

const LYNX_BUTTONS: [LogicalButton; 7] = [
    LogicalButton::plain("A", LYNX_A),
    LogicalButton::plain("B", LYNX_B),
    LogicalButton::plain("Option 1", LYNX_OPTION_1),
    LogicalButton::plain("Option 2", LYNX_OPTION_2),
    LogicalButton::plain("Pause", LYNX_PAUSE),
    LogicalButton::rapid("A Rapid", LYNX_A),
    LogicalButton::rapid("B Rapid", LYNX_B),
];

const LYNX_MAP: [ButtonMapEntry; 25] = [
    entry!(PrimaryDigitalOnly, 0, MOTE_TWO),
    entry!(PrimaryDigitalOnly, 1, MOTE_ONE),
    entry!(PrimaryDigitalOnly, 2, MOTE_MINUS),
    entry!(PrimaryDigitalOnly, 3, MOTE_A),
    entry!(PrimaryDigitalOnly, 4, MOTE_PLUS),
    entry!(PrimaryDigitalOnly, 6, MOTE_B),
    entry!(SecondaryAnalogAccessory, 0, MOTE_A),
    entry!(SecondaryAnalogAccessory, 1, MOTE_B),
    entry!(SecondaryAnalogAccessory, 2, MOTE_MINUS),
    entry!(SecondaryAnalogAccessory, 3, MOTE_TWO),
    entry!(SecondaryAnalogAccessory, 4, MOTE_PLUS),
    entry!(SecondaryAnalogAccessory, 5, CHUK_C),
    entry!(SecondaryAnalogAccessory, 6, CHUK_Z),
    entry!(ExtendedAnalogAccessory, 0, CLASSIC_A),
    entry!(ExtendedAnalogAccessory, 1, CLASSIC_B),
    entry!(ExtendedAnalogAccessory, 2, CLASSIC_L),
    entry!(ExtendedAnalogAccessory, 3, CLASSIC_R),
    entry!(ExtendedAnalogAccessory, 4, CLASSIC_PLUS),
    entry!(ExtendedAnalogAccessory, 5, CLASSIC_X),
    entry!(ExtendedAnalogAccessory, 6, CLASSIC_Y),
    entry!(AlternatePad, 0, ALT_A),
    entry!(AlternatePad, 1, ALT_B),
    entry!(AlternatePad, 2, ALT_L),
    entry!(AlternatePad, 3, ALT_R),
    entry!(AlternatePad, 4, ALT_START),
];

pub static LYNX_PROFILE: SystemProfile = SystemProfile {
    system: TargetSystem::Lynx,
    name: "Lynx",
    buttons: &LYNX_BUTTONS,
    directions: DirectionBits {
        up: LYNX_UP,
        down: LYNX_DOWN,
        left: LYNX_LEFT,
        right: LYNX_RIGHT,
    },
    slots: 1,
    rotation_supported: true,
    secondary_stick_directions: false,
    screen: (160, 102),
    default_map: &LYNX_MAP,
};
