//! Raw bit layout of the physical peripherals
//!
//! Every polled device reports a `u32` of held/pressed bits. The primary pad and
//! its accessories share one bit space: the primary pad uses the low half, the
//! secondary accessory adds two buttons right above it and the extended
//! accessory occupies the high half. The alternate pad is polled on its own and
//! has an independent layout.
//!
//! ```text
//!  31            16 15  14  13  12 11-8  7    4    3  2  1   0
//! [ extended pad   ][ - ][ C][ Z][+][dpad][home][-][A][B][1][2]
//! ```

use crate::controller::peripheral::PeripheralType;

pub const MOTE_TWO: u32 = 0x0001;
pub const MOTE_ONE: u32 = 0x0002;
pub const MOTE_B: u32 = 0x0004;
pub const MOTE_A: u32 = 0x0008;
pub const MOTE_MINUS: u32 = 0x0010;
pub const MOTE_HOME: u32 = 0x0080;
pub const MOTE_LEFT: u32 = 0x0100;
pub const MOTE_RIGHT: u32 = 0x0200;
pub const MOTE_DOWN: u32 = 0x0400;
pub const MOTE_UP: u32 = 0x0800;
pub const MOTE_PLUS: u32 = 0x1000;

/// D-pad bits of the primary pad, cleared while a secondary accessory is attached
pub const MOTE_DPAD: u32 = MOTE_LEFT | MOTE_RIGHT | MOTE_DOWN | MOTE_UP;

pub const CHUK_Z: u32 = 0x2000;
pub const CHUK_C: u32 = 0x4000;

pub const CLASSIC_UP: u32 = 0x0001 << 16;
pub const CLASSIC_LEFT: u32 = 0x0002 << 16;
pub const CLASSIC_ZR: u32 = 0x0004 << 16;
pub const CLASSIC_X: u32 = 0x0008 << 16;
pub const CLASSIC_A: u32 = 0x0010 << 16;
pub const CLASSIC_Y: u32 = 0x0020 << 16;
pub const CLASSIC_B: u32 = 0x0040 << 16;
pub const CLASSIC_ZL: u32 = 0x0080 << 16;
pub const CLASSIC_R: u32 = 0x0200 << 16;
pub const CLASSIC_PLUS: u32 = 0x0400 << 16;
pub const CLASSIC_HOME: u32 = 0x0800 << 16;
pub const CLASSIC_MINUS: u32 = 0x1000 << 16;
pub const CLASSIC_L: u32 = 0x2000 << 16;
pub const CLASSIC_DOWN: u32 = 0x4000 << 16;
pub const CLASSIC_RIGHT: u32 = 0x8000 << 16;

pub const ALT_LEFT: u32 = 0x0001;
pub const ALT_RIGHT: u32 = 0x0002;
pub const ALT_DOWN: u32 = 0x0004;
pub const ALT_UP: u32 = 0x0008;
pub const ALT_Z: u32 = 0x0010;
pub const ALT_R: u32 = 0x0020;
pub const ALT_L: u32 = 0x0040;
pub const ALT_A: u32 = 0x0100;
pub const ALT_B: u32 = 0x0200;
pub const ALT_X: u32 = 0x0400;
pub const ALT_Y: u32 = 0x0800;
pub const ALT_START: u32 = 0x1000;

/// Exit bits checked against the pressed mask of the primary source
pub const PRIMARY_HOME: u32 = MOTE_HOME | CLASSIC_HOME;

/// The alternate pad has no home button; the Z trigger is reserved for it
pub const ALT_HOME: u32 = ALT_Z;

/// Name table used by configuration files
const MOTE_NAMES: [(&str, u32); 11] = [
    ("MOTE_TWO", MOTE_TWO),
    ("MOTE_ONE", MOTE_ONE),
    ("MOTE_B", MOTE_B),
    ("MOTE_A", MOTE_A),
    ("MOTE_MINUS", MOTE_MINUS),
    ("MOTE_HOME", MOTE_HOME),
    ("MOTE_LEFT", MOTE_LEFT),
    ("MOTE_RIGHT", MOTE_RIGHT),
    ("MOTE_DOWN", MOTE_DOWN),
    ("MOTE_UP", MOTE_UP),
    ("MOTE_PLUS", MOTE_PLUS),
];

const CHUK_NAMES: [(&str, u32); 2] = [("CHUK_Z", CHUK_Z), ("CHUK_C", CHUK_C)];

const CLASSIC_NAMES: [(&str, u32); 15] = [
    ("CLASSIC_UP", CLASSIC_UP),
    ("CLASSIC_LEFT", CLASSIC_LEFT),
    ("CLASSIC_ZR", CLASSIC_ZR),
    ("CLASSIC_X", CLASSIC_X),
    ("CLASSIC_A", CLASSIC_A),
    ("CLASSIC_Y", CLASSIC_Y),
    ("CLASSIC_B", CLASSIC_B),
    ("CLASSIC_ZL", CLASSIC_ZL),
    ("CLASSIC_R", CLASSIC_R),
    ("CLASSIC_PLUS", CLASSIC_PLUS),
    ("CLASSIC_HOME", CLASSIC_HOME),
    ("CLASSIC_MINUS", CLASSIC_MINUS),
    ("CLASSIC_L", CLASSIC_L),
    ("CLASSIC_DOWN", CLASSIC_DOWN),
    ("CLASSIC_RIGHT", CLASSIC_RIGHT),
];

const ALT_NAMES: [(&str, u32); 12] = [
    ("ALT_LEFT", ALT_LEFT),
    ("ALT_RIGHT", ALT_RIGHT),
    ("ALT_DOWN", ALT_DOWN),
    ("ALT_UP", ALT_UP),
    ("ALT_Z", ALT_Z),
    ("ALT_R", ALT_R),
    ("ALT_L", ALT_L),
    ("ALT_A", ALT_A),
    ("ALT_B", ALT_B),
    ("ALT_X", ALT_X),
    ("ALT_Y", ALT_Y),
    ("ALT_START", ALT_START),
];

fn find(table: &[(&str, u32)], name: &str) -> Option<u32> {
    table
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, bit)| *bit)
}

/// Resolves a raw button name for the given peripheral table.
///
/// A table may only reference bits that are physically reachable while that
/// peripheral is attached: the secondary accessory table sees the primary pad
/// plus its own two buttons, the extended accessory only its own layout.
pub fn bit_by_name(peripheral: PeripheralType, name: &str) -> Option<u32> {
    match peripheral {
        PeripheralType::PrimaryDigitalOnly => find(&MOTE_NAMES, name),
        PeripheralType::SecondaryAnalogAccessory => {
            find(&MOTE_NAMES, name).or_else(|| find(&CHUK_NAMES, name))
        }
        PeripheralType::ExtendedAnalogAccessory => find(&CLASSIC_NAMES, name),
        PeripheralType::AlternatePad => find(&ALT_NAMES, name),
    }
}

/// Names of every bit of `mask` the peripheral table can reference.
pub fn names_for_mask(peripheral: PeripheralType, mask: u32) -> Vec<&'static str> {
    let (own, extra): (&[(&'static str, u32)], &[(&'static str, u32)]) = match peripheral {
        PeripheralType::PrimaryDigitalOnly => (&MOTE_NAMES, &[]),
        PeripheralType::SecondaryAnalogAccessory => (&MOTE_NAMES, &CHUK_NAMES),
        PeripheralType::ExtendedAnalogAccessory => (&CLASSIC_NAMES, &[]),
        PeripheralType::AlternatePad => (&ALT_NAMES, &[]),
    };
    own.iter()
        .chain(extra)
        .filter(|(_, bit)| mask & bit != 0)
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_names_resolve_back() {
        let names = names_for_mask(PeripheralType::ExtendedAnalogAccessory, CLASSIC_L | CLASSIC_R);
        assert_eq!(names, ["CLASSIC_R", "CLASSIC_L"]);
        let mask = names
            .iter()
            .filter_map(|n| bit_by_name(PeripheralType::ExtendedAnalogAccessory, n))
            .fold(0, |acc, bit| acc | bit);
        assert_eq!(mask, CLASSIC_L | CLASSIC_R);
        assert!(names_for_mask(PeripheralType::PrimaryDigitalOnly, CHUK_C).is_empty());
    }

    #[test]
    fn names_are_scoped_per_peripheral() {
        assert_eq!(
            bit_by_name(PeripheralType::SecondaryAnalogAccessory, "chuk_c"),
            Some(CHUK_C)
        );
        assert_eq!(
            bit_by_name(PeripheralType::SecondaryAnalogAccessory, "MOTE_A"),
            Some(MOTE_A)
        );
        assert_eq!(bit_by_name(PeripheralType::PrimaryDigitalOnly, "CHUK_C"), None);
        assert_eq!(bit_by_name(PeripheralType::AlternatePad, "MOTE_A"), None);
        assert_eq!(
            bit_by_name(PeripheralType::ExtendedAnalogAccessory, "CLASSIC_RIGHT"),
            Some(CLASSIC_RIGHT)
        );
    }

    #[test]
    fn primary_and_extended_layouts_do_not_overlap() {
        let primary = MOTE_NAMES.iter().chain(CHUK_NAMES.iter()).fold(0, |acc, (_, b)| acc | b);
        let extended = CLASSIC_NAMES.iter().fold(0, |acc, (_, b)| acc | b);
        assert_eq!(primary & extended, 0);
    }
}
