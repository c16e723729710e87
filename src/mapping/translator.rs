//! Frame input translator
//!
//! Runs once per frame and turns one [`SlotSample`] per controller slot into
//! the port bits of the emulated system.
//!
//! ```text
//! Poller ──► SlotSample ──► [mask d-pad] ──► mapped buttons ──► rapid filter ──┐
//!                               │                                             ├──► port bits
//!                               └──────────► DirectionResolver ───────────────┘
//!                                                 special bit ──► SpecialActionState
//! ```

use crate::controller::peripheral::{PeripheralType, Poller, SlotSample};
use crate::controller::raw;
use crate::mapping::button_map::ButtonMapTable;
use crate::mapping::direction::{DirectionResolver, Rotation};
use crate::mapping::rapid;
use crate::mapping::special::{EmulatorHooks, SpecialAction, SpecialActionState};
use crate::mapping::system::SystemProfile;
use crate::mapping::MappingError;
use tracing::info;

/// Number of controller slots polled by the host
pub const MAX_SLOTS: usize = 4;

/// Result of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutput {
    pub ports: [u16; MAX_SLOTS],
    /// The host should unwind its main loop
    pub exit_requested: bool,
}

/// Result of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotOutput {
    pub bits: u16,
    /// The special button's physical condition is met on this slot
    pub special_held: bool,
}

/// Per-frame inputs that are not read from the peripherals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameContext {
    pub rotation: Rotation,
    pub is_rapid_frame: bool,
    /// External power/reset signal
    pub hardware_exit: bool,
}

#[derive(Debug, Clone)]
pub struct FrameInputTranslator {
    profile: &'static SystemProfile,
    table: ButtonMapTable,
    resolver: DirectionResolver,
}

impl FrameInputTranslator {
    pub fn new(profile: &'static SystemProfile, table: ButtonMapTable) -> Result<Self, MappingError> {
        if table.button_count() != profile.buttons.len() {
            return Err(MappingError::TableMismatch {
                table: table.button_count(),
                expected: profile.buttons.len(),
            });
        }

        info!(
            "Translator ready for {} ({} slots, rotation {})",
            profile.name,
            profile.slots,
            if profile.rotation_supported { "on" } else { "off" }
        );

        Ok(Self {
            profile,
            table,
            resolver: DirectionResolver::new(
                profile.rotation_supported,
                profile.secondary_stick_directions,
            ),
        })
    }

    pub fn profile(&self) -> &'static SystemProfile {
        self.profile
    }

    pub fn table(&self) -> &ButtonMapTable {
        &self.table
    }

    /// Port bits for one slot. Pure: depends only on the sample and context.
    pub fn translate_slot(&self, sample: &SlotSample, context: &FrameContext) -> SlotOutput {
        let primary = &sample.primary;
        let masked_held = primary.masked_held();
        let sources = primary.peripheral.map_sources();

        let mut out = SlotOutput::default();

        for (index, button) in self.profile.buttons.iter().enumerate() {
            let mut asserted = masked_held & self.table.lookup_any(sources, index) != 0;
            if let Some(alt) = &sample.alternate {
                asserted |= alt.held & self.table.lookup(PeripheralType::AlternatePad, index) != 0;
            }

            if !asserted {
                continue;
            }
            if button.special {
                out.special_held = true;
            } else if rapid::include(button, context.is_rapid_frame) {
                out.bits |= button.bit;
            }
        }

        let directions = self.resolver.resolve(
            primary,
            masked_held,
            sample.alternate.as_ref(),
            context.rotation,
        );
        out.bits |= directions.to_bits(&self.profile.directions);

        out
    }

    /// Polls every slot of the system, feeds the special state and checks exit.
    pub fn translate_frame<P, H>(
        &self,
        poller: &mut P,
        special: &mut SpecialActionState,
        action: &SpecialAction,
        context: &FrameContext,
        hooks: &mut H,
    ) -> FrameOutput
    where
        P: Poller + ?Sized,
        H: EmulatorHooks + ?Sized,
    {
        poller.scan();

        let mut output = FrameOutput {
            exit_requested: context.hardware_exit,
            ..FrameOutput::default()
        };
        let mut special_held = false;

        let slots = self.profile.slots.min(MAX_SLOTS);
        for (slot, port) in output.ports.iter_mut().enumerate().take(slots) {
            let sample = poller.sample(slot);

            if slot == 0 && exit_pressed(&sample) {
                output.exit_requested = true;
            }

            let slot_output = self.translate_slot(&sample, context);
            *port = slot_output.bits;
            special_held |= slot_output.special_held;
        }

        special.update(special_held, action, hooks);

        output
    }
}

fn exit_pressed(sample: &SlotSample) -> bool {
    sample.primary.pressed & raw::PRIMARY_HOME != 0
        || sample
            .alternate
            .is_some_and(|alt| alt.pressed & raw::ALT_HOME != 0)
}
