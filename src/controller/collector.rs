use crate::controller::peripheral::{
    classify, ExpansionDescriptor, PeripheralType, Poller, RawSample, SlotSample, StickPair,
};
use crate::controller::raw::*;
use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

// Roles past this index are alternate pads of slot (role - SLOT_COUNT)
const SLOT_COUNT: usize = 4;
const ROLE_COUNT: usize = SLOT_COUNT * 2;

// Which accessory a connected gamepad pretends to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessoryMode {
    // Derived from the axes the device exposes
    #[default]
    Auto,
    None,
    Secondary,
    Extended,
}

// Poller settings
#[derive(Clone, Debug)]
pub struct PollerSettings {
    pub joystick_deadzone: f32,
    pub accessory: AccessoryMode,
    pub alternate_pads: bool,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            joystick_deadzone: 0.05,
            accessory: AccessoryMode::Auto,
            alternate_pads: true,
        }
    }
}

// Poller errors
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Failed to initialize poller: {0}")]
    InitializationError(String),
}

// Pad roles handed out on connect. A role stays with its pad until that pad
// disconnects, so other pads never shift slots.
#[derive(Debug, Clone)]
struct PadRoles<Id> {
    roles: [Option<Id>; ROLE_COUNT],
}

impl<Id: Copy + Eq> PadRoles<Id> {
    fn new() -> Self {
        Self {
            roles: [None; ROLE_COUNT],
        }
    }

    // Lowest free role, or the one the pad already holds
    fn assign(&mut self, id: Id) -> Option<usize> {
        if let Some(role) = self.role_of(id) {
            return Some(role);
        }
        let free = self.roles.iter().position(Option::is_none)?;
        self.roles[free] = Some(id);
        Some(free)
    }

    fn release(&mut self, id: Id) -> Option<usize> {
        let role = self.role_of(id)?;
        self.roles[role] = None;
        Some(role)
    }

    fn role_of(&self, id: Id) -> Option<usize> {
        self.roles.iter().position(|held| *held == Some(id))
    }

    fn pad_at(&self, role: usize) -> Option<Id> {
        self.roles.get(role).copied().flatten()
    }
}

fn describe_role(role: usize) -> String {
    if role < SLOT_COUNT {
        format!("slot {}", role)
    } else {
        format!("alternate pad of slot {}", role - SLOT_COUNT)
    }
}

// Host-side polling primitive backed by gilrs
pub struct GilrsPoller {
    gilrs: Gilrs,
    settings: PollerSettings,
    roles: PadRoles<GamepadId>,
    // Held bits of the previous frame, to derive pressed bits
    previous_held: HashMap<GamepadId, u32>,
}

impl GilrsPoller {
    pub fn create(settings: Option<PollerSettings>) -> Result<Self, PollerError> {
        let settings = settings.unwrap_or_default();
        debug!("Creating gilrs poller with settings: {:?}", settings);

        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(PollerError::InitializationError(e.to_string()));
            }
        };

        let mut roles = PadRoles::new();
        let count = gilrs.gamepads().count();
        if count == 0 {
            warn!("No gamepad connected, all slots idle until one appears");
        } else {
            info!("Found {} gamepads:", count);
            for (id, gamepad) in gilrs.gamepads() {
                match roles.assign(id) {
                    Some(role) => info!(
                        "  ID: {}, Name: {} -> {}",
                        id,
                        gamepad.name(),
                        describe_role(role)
                    ),
                    None => warn!(
                        "  ID: {}, Name: {} ignored, all roles taken",
                        id,
                        gamepad.name()
                    ),
                }
            }
        }

        Ok(Self {
            gilrs,
            settings,
            roles,
            previous_held: HashMap::with_capacity(ROLE_COUNT),
        })
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.settings
    }

    fn read(&mut self, role: usize, alternate: bool) -> Option<RawSample> {
        let deadzone = self.settings.joystick_deadzone;
        let accessory = self.settings.accessory;

        let (id, descriptor, held, main_stick, sub_stick) = {
            let id = self.roles.pad_at(role)?;
            let gamepad = self.gilrs.connected_gamepad(id)?;
            let descriptor = if alternate {
                ExpansionDescriptor::NONE
            } else {
                descriptor_for(&gamepad, accessory)
            };
            let layout = if alternate {
                &ALT_LAYOUT[..]
            } else {
                layout_for(descriptor)
            };
            let held = layout
                .iter()
                .filter(|(button, _)| gamepad.is_pressed(*button))
                .fold(0, |acc, (_, bit)| acc | bit);
            (
                id,
                descriptor,
                held,
                read_stick(&gamepad, Axis::LeftStickX, Axis::LeftStickY, deadzone),
                read_stick(&gamepad, Axis::RightStickX, Axis::RightStickY, deadzone),
            )
        };

        let previous = self.previous_held.insert(id, held).unwrap_or(0);
        let pressed = held & !previous;

        Some(if alternate {
            RawSample::alternate(pressed, held, main_stick, sub_stick)
        } else {
            RawSample::from_descriptor(descriptor, pressed, held, main_stick, sub_stick)
        })
    }
}

impl Poller for GilrsPoller {
    fn scan(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => match self.roles.assign(id) {
                    Some(role) => info!("Gamepad connected: {} -> {}", id, describe_role(role)),
                    None => warn!("Gamepad connected: {} ignored, all roles taken", id),
                },
                EventType::Disconnected => {
                    if let Some(role) = self.roles.release(id) {
                        info!(
                            "Gamepad disconnected: {}, {} is free",
                            id,
                            describe_role(role)
                        );
                    }
                    self.previous_held.remove(&id);
                }
                _ => {}
            }
        }
    }

    fn sample(&mut self, slot: usize) -> SlotSample {
        let Some(primary) = self.read(slot, false) else {
            return SlotSample::disconnected();
        };
        let alternate = if self.settings.alternate_pads {
            self.read(slot + SLOT_COUNT, true)
        } else {
            None
        };

        SlotSample { primary, alternate }
    }
}

fn descriptor_for(gamepad: &Gamepad<'_>, mode: AccessoryMode) -> ExpansionDescriptor {
    match mode {
        AccessoryMode::None => ExpansionDescriptor::NONE,
        AccessoryMode::Secondary => ExpansionDescriptor::SECONDARY_ANALOG,
        AccessoryMode::Extended => ExpansionDescriptor::EXTENDED_ANALOG,
        AccessoryMode::Auto => {
            if gamepad.axis_code(Axis::RightStickX).is_some() {
                ExpansionDescriptor::EXTENDED_ANALOG
            } else if gamepad.axis_code(Axis::LeftStickX).is_some() {
                ExpansionDescriptor::SECONDARY_ANALOG
            } else {
                ExpansionDescriptor::NONE
            }
        }
    }
}

fn layout_for(descriptor: ExpansionDescriptor) -> &'static [(Button, u32)] {
    match classify(descriptor) {
        PeripheralType::ExtendedAnalogAccessory => &EXTENDED_LAYOUT,
        PeripheralType::SecondaryAnalogAccessory => &SECONDARY_LAYOUT,
        _ => &BARE_LAYOUT,
    }
}

fn read_stick(gamepad: &Gamepad<'_>, x: Axis, y: Axis, deadzone: f32) -> StickPair {
    StickPair::new(
        apply_deadzone(gamepad.value(x), deadzone),
        apply_deadzone(gamepad.value(y), deadzone),
    )
}

// Physical d-pad up is the sideways pad's right edge
const BARE_LAYOUT: [(Button, u32); 11] = [
    (Button::South, MOTE_TWO),
    (Button::East, MOTE_ONE),
    (Button::West, MOTE_B),
    (Button::North, MOTE_A),
    (Button::Start, MOTE_PLUS),
    (Button::Select, MOTE_MINUS),
    (Button::Mode, MOTE_HOME),
    (Button::DPadUp, MOTE_RIGHT),
    (Button::DPadDown, MOTE_LEFT),
    (Button::DPadLeft, MOTE_UP),
    (Button::DPadRight, MOTE_DOWN),
];

const SECONDARY_LAYOUT: [(Button, u32); 13] = [
    (Button::South, MOTE_A),
    (Button::East, MOTE_B),
    (Button::West, CHUK_C),
    (Button::North, CHUK_Z),
    (Button::LeftTrigger, MOTE_ONE),
    (Button::RightTrigger, MOTE_TWO),
    (Button::Start, MOTE_PLUS),
    (Button::Select, MOTE_MINUS),
    (Button::Mode, MOTE_HOME),
    (Button::DPadUp, MOTE_UP),
    (Button::DPadDown, MOTE_DOWN),
    (Button::DPadLeft, MOTE_LEFT),
    (Button::DPadRight, MOTE_RIGHT),
];

const EXTENDED_LAYOUT: [(Button, u32); 15] = [
    (Button::South, CLASSIC_B),
    (Button::East, CLASSIC_A),
    (Button::West, CLASSIC_Y),
    (Button::North, CLASSIC_X),
    (Button::LeftTrigger, CLASSIC_L),
    (Button::RightTrigger, CLASSIC_R),
    (Button::LeftTrigger2, CLASSIC_ZL),
    (Button::RightTrigger2, CLASSIC_ZR),
    (Button::Start, CLASSIC_PLUS),
    (Button::Select, CLASSIC_MINUS),
    (Button::Mode, CLASSIC_HOME),
    (Button::DPadUp, CLASSIC_UP),
    (Button::DPadDown, CLASSIC_DOWN),
    (Button::DPadLeft, CLASSIC_LEFT),
    (Button::DPadRight, CLASSIC_RIGHT),
];

// No Mode row: the Z trigger doubles as the alternate pad's home
const ALT_LAYOUT: [(Button, u32); 12] = [
    (Button::South, ALT_A),
    (Button::West, ALT_B),
    (Button::East, ALT_X),
    (Button::North, ALT_Y),
    (Button::LeftTrigger, ALT_L),
    (Button::RightTrigger, ALT_R),
    (Button::RightTrigger2, ALT_Z),
    (Button::Start, ALT_START),
    (Button::DPadUp, ALT_UP),
    (Button::DPadDown, ALT_DOWN),
    (Button::DPadLeft, ALT_LEFT),
    (Button::DPadRight, ALT_RIGHT),
];

// Helper function to apply deadzone to analog stick values
fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        // Rescale the value to the range outside the deadzone
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}
