//! # Persistence Module
//!
//! Configuration types for the host binary. A single TOML file carries the
//! host loop settings and one button map per target system.
//!
//! ## Error Handling Strategy
//! File operations use `color_eyre`. Invalid button names surface as
//! [`MappingError`]s; the affected system then falls back to its built-in
//! default map so the host stays usable with a broken config.

pub mod config_loader;

use crate::controller::collector::{AccessoryMode, PollerSettings};
use crate::controller::peripheral::PeripheralType;
use crate::controller::raw;
use crate::mapping::button_map::ButtonMapTable;
use crate::mapping::direction::Rotation;
use crate::mapping::system::{SystemProfile, TargetSystem};
use crate::mapping::MappingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Logical button name -> raw button names that assert it
pub type PeripheralMap = BTreeMap<String, Vec<String>>;

/// Settings of the host frame loop and the gamepad poller.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Frames translated per second
    pub frame_rate: u32,
    /// Frames per rapid-fire half cycle
    pub rapid_period: u32,
    pub stick_deadzone: f32,
    /// Poll gamepads 4..8 as alternate pads of slots 0..4
    pub alternate_pads: bool,
    pub accessory: AccessoryMode,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            rapid_period: 2,
            stick_deadzone: 0.05,
            alternate_pads: true,
            accessory: AccessoryMode::Auto,
        }
    }
}

impl HostConfig {
    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            joystick_deadzone: self.stick_deadzone.clamp(0.0, 0.95),
            accessory: self.accessory,
            alternate_pads: self.alternate_pads,
        }
    }
}

/// Per-system settings: display rotation and the button map.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    /// Display rotation in degrees, only honored by systems that rotate
    pub rotation: i32,
    /// Peripheral config key (`primary`, `secondary`, ...) -> map
    pub buttons: BTreeMap<String, PeripheralMap>,
}

impl SystemConfig {
    /// Config equivalent of the system's built-in default map.
    pub fn from_profile(profile: &SystemProfile) -> Self {
        let mut buttons: BTreeMap<String, PeripheralMap> = BTreeMap::new();

        for entry in profile.default_map {
            let Some(button) = profile.buttons.get(entry.index) else {
                continue;
            };
            buttons
                .entry(entry.peripheral.config_key().to_string())
                .or_default()
                .entry(button.name.to_string())
                .or_default()
                .extend(
                    raw::names_for_mask(entry.peripheral, entry.mask)
                        .into_iter()
                        .map(String::from),
                );
        }

        Self {
            rotation: 0,
            buttons,
        }
    }

    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.rotation)
    }

    /// Validates every name and builds the table for `profile`.
    pub fn to_table(&self, profile: &SystemProfile) -> Result<ButtonMapTable, MappingError> {
        let mut entries = Vec::new();

        for (key, map) in &self.buttons {
            let peripheral = PeripheralType::ALL
                .into_iter()
                .find(|p| p.config_key().eq_ignore_ascii_case(key))
                .ok_or_else(|| {
                    MappingError::ConfigError(format!("Unknown peripheral section '{}'", key))
                })?;

            for (logical, raw_names) in map {
                entries.push((peripheral, logical.as_str(), raw_names.as_slice()));
            }
        }

        ButtonMapTable::from_names(profile.name, profile.buttons, entries)
    }
}

/// Complete content of the config file.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PadportConfig {
    pub host: HostConfig,
    /// System key (`nes`, `lynx`) -> settings
    pub systems: BTreeMap<String, SystemConfig>,
}

impl PadportConfig {
    /// Config with every known system spelled out with its default map.
    pub fn with_defaults() -> Self {
        let systems = TargetSystem::ALL
            .into_iter()
            .map(|system| {
                (
                    system.key().to_string(),
                    SystemConfig::from_profile(system.profile()),
                )
            })
            .collect();

        Self {
            host: HostConfig::default(),
            systems,
        }
    }

    pub fn system(&self, system: TargetSystem) -> Option<&SystemConfig> {
        self.systems.get(system.key())
    }

    pub fn rotation(&self, system: TargetSystem) -> Rotation {
        self.system(system)
            .map(SystemConfig::rotation)
            .unwrap_or_default()
    }

    /// Button table for `system`, falling back to the built-in default map
    /// when the configured one is missing or invalid.
    pub fn button_table(&self, system: TargetSystem) -> Result<ButtonMapTable, MappingError> {
        let profile = system.profile();

        match self.system(system) {
            Some(config) => match config.to_table(profile) {
                Ok(table) => {
                    debug!("Using configured button map for {}", profile.name);
                    Ok(table)
                }
                Err(e) => {
                    warn!(
                        "Invalid button map for {}: {}. Using default map",
                        profile.name, e
                    );
                    profile.default_table()
                }
            },
            None => {
                debug!("No button map configured for {}, using default", profile.name);
                profile.default_table()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_reproduces_default_tables() {
        let config = PadportConfig::with_defaults();

        for system in TargetSystem::ALL {
            let profile = system.profile();
            let from_config = config.system(system).unwrap().to_table(profile).unwrap();
            let builtin = profile.default_table().unwrap();

            for peripheral in PeripheralType::ALL {
                for index in 0..profile.buttons.len() {
                    assert_eq!(
                        from_config.lookup(peripheral, index),
                        builtin.lookup(peripheral, index),
                        "{} {} button {}",
                        system,
                        peripheral,
                        index
                    );
                }
            }
        }
    }

    #[test]
    fn invalid_map_falls_back_to_default() {
        let mut config = PadportConfig::default();
        let mut primary = PeripheralMap::new();
        primary.insert("A".to_string(), vec!["CLASSIC_A".to_string()]);
        let mut buttons = BTreeMap::new();
        buttons.insert("primary".to_string(), primary);
        config.systems.insert(
            "nes".to_string(),
            SystemConfig {
                rotation: 0,
                buttons,
            },
        );

        let nes = TargetSystem::Nes.profile();
        assert!(matches!(
            config.system(TargetSystem::Nes).unwrap().to_table(nes),
            Err(MappingError::UnknownRawButton { .. })
        ));

        let table = config.button_table(TargetSystem::Nes).unwrap();
        let builtin = nes.default_table().unwrap();
        assert_eq!(
            table.lookup(PeripheralType::PrimaryDigitalOnly, 0),
            builtin.lookup(PeripheralType::PrimaryDigitalOnly, 0)
        );
    }

    #[test]
    fn unknown_peripheral_section_is_rejected() {
        let mut buttons = BTreeMap::new();
        buttons.insert("keyboard".to_string(), PeripheralMap::new());
        let config = SystemConfig {
            rotation: 0,
            buttons,
        };

        assert!(matches!(
            config.to_table(TargetSystem::Lynx.profile()),
            Err(MappingError::ConfigError(_))
        ));
    }

    #[test]
    fn rotation_from_degrees() {
        let mut config = PadportConfig::default();
        assert_eq!(config.rotation(TargetSystem::Lynx), Rotation::Rotate0);

        config.systems.insert(
            "lynx".to_string(),
            SystemConfig {
                rotation: -90,
                buttons: BTreeMap::new(),
            },
        );
        assert_eq!(config.rotation(TargetSystem::Lynx), Rotation::Rotate270);
    }

    #[test]
    fn deadzone_is_clamped_for_poller() {
        let host = HostConfig {
            stick_deadzone: 3.0,
            ..HostConfig::default()
        };
        assert_eq!(host.poller_settings().joystick_deadzone, 0.95);
    }
}
