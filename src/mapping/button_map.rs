//! Logical button tables and the per-peripheral raw bitmask map

use crate::controller::peripheral::PeripheralType;
use crate::controller::raw;
use crate::mapping::MappingError;
use tracing::debug;

/// Upper bound on logical buttons per target system
pub const MAX_LOGICAL_BUTTONS: usize = 16;

/// One entry in a target system's logical button list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalButton {
    pub name: &'static str,
    /// Bit set in the port output when the button is asserted
    pub bit: u16,
    /// Only asserted on rapid frames
    pub rapid: bool,
    /// Routed to the special action state instead of the port output
    pub special: bool,
}

impl LogicalButton {
    pub const fn plain(name: &'static str, bit: u16) -> Self {
        Self {
            name,
            bit,
            rapid: false,
            special: false,
        }
    }

    pub const fn rapid(name: &'static str, bit: u16) -> Self {
        Self {
            name,
            bit,
            rapid: true,
            special: false,
        }
    }

    pub const fn special(name: &'static str) -> Self {
        Self {
            name,
            bit: 0,
            rapid: false,
            special: true,
        }
    }
}

/// (peripheral, logical button index) -> raw bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMapEntry {
    pub peripheral: PeripheralType,
    pub index: usize,
    pub mask: u32,
}

impl ButtonMapEntry {
    pub const fn new(peripheral: PeripheralType, index: usize, mask: u32) -> Self {
        Self {
            peripheral,
            index,
            mask,
        }
    }
}

/// Read-only during gameplay. Storage is fixed size so lookups never allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonMapTable {
    masks: [[u32; MAX_LOGICAL_BUTTONS]; 4],
    button_count: usize,
}

impl ButtonMapTable {
    pub fn empty(button_count: usize) -> Result<Self, MappingError> {
        if button_count > MAX_LOGICAL_BUTTONS {
            return Err(MappingError::TooManyButtons {
                count: button_count,
                max: MAX_LOGICAL_BUTTONS,
            });
        }

        Ok(Self {
            masks: [[0; MAX_LOGICAL_BUTTONS]; 4],
            button_count,
        })
    }

    pub fn from_entries(
        button_count: usize,
        entries: &[ButtonMapEntry],
    ) -> Result<Self, MappingError> {
        let mut table = Self::empty(button_count)?;
        for entry in entries {
            table.bind(entry.peripheral, entry.index, entry.mask)?;
        }
        Ok(table)
    }

    /// Builds a table from configuration names.
    ///
    /// `entries` yields (peripheral, logical button name, raw button names).
    pub fn from_names<'a, I>(
        system: &str,
        buttons: &[LogicalButton],
        entries: I,
    ) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (PeripheralType, &'a str, &'a [String])>,
    {
        let mut table = Self::empty(buttons.len())?;

        for (peripheral, logical, raw_names) in entries {
            let index = buttons
                .iter()
                .position(|b| b.name.eq_ignore_ascii_case(logical))
                .ok_or_else(|| MappingError::UnknownLogicalButton {
                    system: system.to_string(),
                    name: logical.to_string(),
                })?;

            for name in raw_names {
                let bit = raw::bit_by_name(peripheral, name).ok_or_else(|| {
                    MappingError::UnknownRawButton {
                        peripheral: peripheral.to_string(),
                        name: name.clone(),
                    }
                })?;
                table.bind(peripheral, index, bit)?;
            }
        }

        debug!("Built {} button table with {} buttons", system, buttons.len());
        Ok(table)
    }

    /// ORs `mask` into the entry for `(peripheral, index)`.
    pub fn bind(
        &mut self,
        peripheral: PeripheralType,
        index: usize,
        mask: u32,
    ) -> Result<(), MappingError> {
        if index >= self.button_count {
            return Err(MappingError::ConfigError(format!(
                "Button index {} out of range ({} buttons)",
                index, self.button_count
            )));
        }
        self.masks[peripheral.index()][index] |= mask;
        Ok(())
    }

    /// Raw bits that trigger logical button `index` on `peripheral`.
    ///
    /// Indices past the table yield 0 ("not asserted") instead of failing.
    pub fn lookup(&self, peripheral: PeripheralType, index: usize) -> u32 {
        if index >= self.button_count {
            return 0;
        }
        self.masks[peripheral.index()][index]
    }

    /// Union of the tables `sources` for one logical button
    pub fn lookup_any(&self, sources: &[PeripheralType], index: usize) -> u32 {
        sources
            .iter()
            .fold(0, |acc, peripheral| acc | self.lookup(*peripheral, index))
    }

    pub fn button_count(&self) -> usize {
        self.button_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTONS: [LogicalButton; 3] = [
        LogicalButton::plain("A", 0x01),
        LogicalButton::rapid("A Rapid", 0x01),
        LogicalButton::special("Special"),
    ];

    #[test]
    fn lookup_is_total() {
        let table = ButtonMapTable::empty(BUTTONS.len()).unwrap();
        for peripheral in PeripheralType::ALL {
            for index in 0..MAX_LOGICAL_BUTTONS + 4 {
                assert_eq!(table.lookup(peripheral, index), 0);
            }
        }
    }

    #[test]
    fn entries_are_ored() {
        let table = ButtonMapTable::from_entries(
            BUTTONS.len(),
            &[
                ButtonMapEntry::new(PeripheralType::PrimaryDigitalOnly, 0, raw::MOTE_TWO),
                ButtonMapEntry::new(PeripheralType::PrimaryDigitalOnly, 0, raw::MOTE_A),
                ButtonMapEntry::new(PeripheralType::ExtendedAnalogAccessory, 0, raw::CLASSIC_A),
            ],
        )
        .unwrap();

        assert_eq!(
            table.lookup(PeripheralType::PrimaryDigitalOnly, 0),
            raw::MOTE_TWO | raw::MOTE_A
        );
        assert_eq!(
            table.lookup_any(PeripheralType::ExtendedAnalogAccessory.map_sources(), 0),
            raw::MOTE_TWO | raw::MOTE_A | raw::CLASSIC_A
        );
    }

    #[test]
    fn from_names_resolves_and_rejects() {
        let raw_names = vec!["CHUK_C".to_string(), "mote_b".to_string()];
        let table = ButtonMapTable::from_names(
            "test",
            &BUTTONS,
            [(
                PeripheralType::SecondaryAnalogAccessory,
                "a rapid",
                raw_names.as_slice(),
            )],
        )
        .unwrap();
        assert_eq!(
            table.lookup(PeripheralType::SecondaryAnalogAccessory, 1),
            raw::CHUK_C | raw::MOTE_B
        );

        let bad = vec!["CLASSIC_A".to_string()];
        let err = ButtonMapTable::from_names(
            "test",
            &BUTTONS,
            [(PeripheralType::AlternatePad, "A", bad.as_slice())],
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::UnknownRawButton { .. }));

        let err = ButtonMapTable::from_names(
            "test",
            &BUTTONS,
            [(PeripheralType::AlternatePad, "Turbo", bad.as_slice())],
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::UnknownLogicalButton { .. }));
    }

    #[test]
    fn oversized_tables_are_rejected() {
        assert!(matches!(
            ButtonMapTable::empty(MAX_LOGICAL_BUTTONS + 1),
            Err(MappingError::TooManyButtons { .. })
        ));
    }
}
