//! Input session with statum state machine
//!
//! A session owns everything that carries over between frames: the global
//! special action state and the rotation of the active system entry.
//!
//! # State Machine
//!
//! ```text
//! Configured ──► Running ──► Ended
//!                  │  ▲
//!                  └──┘
//!           (on_session_reload)
//! ```

use crate::controller::peripheral::Poller;
use crate::mapping::button_map::ButtonMapTable;
use crate::mapping::direction::Rotation;
use crate::mapping::special::{EmulatorHooks, SpecialAction, SpecialActionState, SpecialPhase};
use crate::mapping::system::{MediaKind, TargetSystem};
use crate::mapping::translator::{FrameContext, FrameInputTranslator, FrameOutput};
use crate::mapping::MappingError;
use statum::{machine, state};
use tracing::{debug, info};

#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Configured, // Tables loaded, no frame processed yet
    Running,    // Translating frames
    Ended,      // Host left its main loop
}

#[machine]
pub struct InputSession<S: SessionState> {
    system: TargetSystem,
    translator: FrameInputTranslator,
    special: SpecialActionState,
    special_action: SpecialAction,
    media: MediaKind,
    rotation: Rotation,
    frames: u64,
}

impl<S: SessionState> InputSession<S> {
    pub fn system(&self) -> TargetSystem {
        self.system
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn media(&self) -> MediaKind {
        self.media
    }

    pub fn special_phase(&self) -> SpecialPhase {
        self.special.phase()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl InputSession<Configured> {
    pub fn create(
        system: TargetSystem,
        table: ButtonMapTable,
        rotation: Rotation,
        media: MediaKind,
    ) -> Result<Self, MappingError> {
        let profile = system.profile();
        info!("Creating input session for {} ({:?} media)", profile.name, media);

        let translator = FrameInputTranslator::new(profile, table)?;
        let rotation = if profile.rotation_supported {
            rotation
        } else {
            Rotation::Rotate0
        };

        Ok(Self::new(
            system,
            translator,
            SpecialActionState::new(),
            profile.special_action(media),
            media,
            rotation,
            0,
        ))
    }

    pub fn start(self) -> InputSession<Running> {
        info!("Starting input session: {}", self.system);
        self.transition()
    }
}

impl InputSession<Running> {
    /// Translates one frame for every slot of the system.
    pub fn process_frame<P, H>(
        &mut self,
        poller: &mut P,
        is_rapid_frame: bool,
        hardware_exit: bool,
        hooks: &mut H,
    ) -> FrameOutput
    where
        P: Poller + ?Sized,
        H: EmulatorHooks + ?Sized,
    {
        let context = FrameContext {
            rotation: self.rotation,
            is_rapid_frame,
            hardware_exit,
        };
        self.frames += 1;

        self.translator.translate_frame(
            poller,
            &mut self.special,
            &self.special_action,
            &context,
            hooks,
        )
    }

    /// New media was loaded: drop any running special action.
    pub fn on_session_reload(&mut self, media: MediaKind) {
        info!("Session reload ({:?} media)", media);
        self.special.reset();
        self.media = media;
        self.special_action = self.translator.profile().special_action(media);
    }

    /// Only takes effect on systems that support rotation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        if self.translator.profile().rotation_supported {
            debug!("Rotation set to {} degrees", rotation.degrees());
            self.rotation = rotation;
        }
    }

    pub fn end(self) -> InputSession<Ended> {
        info!(
            "Ending input session: {} after {} frames",
            self.system, self.frames
        );
        self.transition()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::peripheral::{ExpansionDescriptor, RawSample, SlotSample, StickPair};
    use crate::controller::raw;
    use crate::mapping::special::tests::RecordingHooks;
    use crate::mapping::system::{LYNX_LEFT, LYNX_UP};

    struct HeldPoller {
        held: u32,
    }

    impl Poller for HeldPoller {
        fn sample(&mut self, _slot: usize) -> SlotSample {
            SlotSample {
                primary: RawSample::from_descriptor(
                    ExpansionDescriptor::NONE,
                    0,
                    self.held,
                    StickPair::CENTER,
                    StickPair::CENTER,
                ),
                alternate: None,
            }
        }
    }

    fn running(system: TargetSystem, rotation: Rotation, media: MediaKind) -> InputSession<Running> {
        let table = system.profile().default_table().unwrap();
        InputSession::create(system, table, rotation, media)
            .unwrap()
            .start()
    }

    #[test]
    fn reload_mid_sequence_goes_idle_and_stays_quiet() {
        let mut session = running(TargetSystem::Nes, Rotation::Rotate0, MediaKind::Disk);
        let mut hooks = RecordingHooks::default();
        let mut poller = HeldPoller { held: raw::MOTE_A };

        session.process_frame(&mut poller, false, false, &mut hooks);
        assert!(matches!(
            session.special_phase(),
            SpecialPhase::SequenceRunning { .. }
        ));

        poller.held = 0;
        for _ in 0..5 {
            session.process_frame(&mut poller, false, false, &mut hooks);
        }

        session.on_session_reload(MediaKind::Disk);
        assert_eq!(session.special_phase(), SpecialPhase::Idle);

        for _ in 0..40 {
            session.process_frame(&mut poller, false, false, &mut hooks);
            assert_eq!(session.special_phase(), SpecialPhase::Idle);
        }
        assert!(hooks.calls.is_empty());
        assert_eq!(session.frames(), 46);
    }

    #[test]
    fn reload_switches_special_action() {
        let mut session = running(TargetSystem::Nes, Rotation::Rotate0, MediaKind::Cartridge);
        let mut hooks = RecordingHooks::default();
        let mut poller = HeldPoller { held: raw::MOTE_A };

        session.process_frame(&mut poller, false, false, &mut hooks);
        assert!(hooks.calls.is_empty());

        session.on_session_reload(MediaKind::Arcade);
        assert_eq!(session.media(), MediaKind::Arcade);
        session.process_frame(&mut poller, false, false, &mut hooks);
        assert_eq!(hooks.calls.len(), 1);
    }

    #[test]
    fn rotation_is_carried_by_session() {
        let mut session = running(TargetSystem::Lynx, Rotation::Rotate0, MediaKind::Cartridge);
        let mut hooks = RecordingHooks::default();
        let mut poller = HeldPoller {
            held: raw::MOTE_RIGHT,
        };

        let out = session.process_frame(&mut poller, false, false, &mut hooks);
        assert_eq!(out.ports[0], LYNX_UP);

        session.set_rotation(Rotation::Rotate270);
        let out = session.process_frame(&mut poller, false, false, &mut hooks);
        assert_eq!(out.ports[0], LYNX_LEFT);
    }

    #[test]
    fn rotation_ignored_without_support() {
        let mut session = running(TargetSystem::Nes, Rotation::Rotate90, MediaKind::Cartridge);
        assert_eq!(session.rotation(), Rotation::Rotate0);
        session.set_rotation(Rotation::Rotate270);
        assert_eq!(session.rotation(), Rotation::Rotate0);

        let ended = session.end();
        assert_eq!(ended.system(), TargetSystem::Nes);
    }
}
