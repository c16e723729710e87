//! Special action state machine
//!
//! A "special" logical button does not produce port bits. Its rising edge
//! either fires a single action right away or starts a timed sequence of media
//! operations. The state is global per session, not per slot.
//!
//! ```text
//!            edge (single step)               release
//!   Idle ─────────────────────────► Suppressed ───────► Idle
//!    │
//!    │ edge (sequence)      ticks reach 0, released
//!    └──────► SequenceRunning ───────────────────────► Idle
//!                      │       ticks reach 0, held
//!                      └─────────────────────────────► Suppressed
//! ```

use tracing::{debug, info};

/// Action hooks of the emulation core.
///
/// Fire and forget: failures are the core's business.
pub trait EmulatorHooks {
    fn request_media_eject(&mut self);
    fn request_media_select(&mut self);
    /// `None` inserts the default media side
    fn request_media_insert(&mut self, slot: Option<u8>);
    fn request_coin_insert(&mut self);
}

impl<H: EmulatorHooks + ?Sized> EmulatorHooks for &mut H {
    fn request_media_eject(&mut self) {
        (**self).request_media_eject()
    }

    fn request_media_select(&mut self) {
        (**self).request_media_select()
    }

    fn request_media_insert(&mut self, slot: Option<u8>) {
        (**self).request_media_insert(slot)
    }

    fn request_coin_insert(&mut self) {
        (**self).request_coin_insert()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaStep {
    Eject,
    Select,
    Insert,
}

impl MediaStep {
    fn fire<H: EmulatorHooks + ?Sized>(self, hooks: &mut H) {
        match self {
            MediaStep::Eject => hooks.request_media_eject(),
            MediaStep::Select => hooks.request_media_select(),
            MediaStep::Insert => hooks.request_media_insert(None),
        }
    }
}

/// Timed multi-step special action.
///
/// `steps` are (ticks remaining, step) pairs in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencePlan {
    pub total_ticks: u16,
    pub steps: &'static [(u16, MediaStep)],
}

/// Disk side swap: eject, pick the next side, insert it
pub const MEDIA_SWAP_PLAN: SequencePlan = SequencePlan {
    total_ticks: 30,
    steps: &[
        (20, MediaStep::Eject),
        (10, MediaStep::Select),
        (0, MediaStep::Insert),
    ],
};

/// What the special button does for the loaded media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialAction {
    /// The press is consumed and nothing happens
    #[default]
    None,
    CoinInsert,
    Sequence(SequencePlan),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialPhase {
    #[default]
    Idle,
    /// Already fired for the current press
    Suppressed,
    SequenceRunning { step: u8, ticks_remaining: u16 },
}

/// Global special action state of one session
#[derive(Debug, Clone, Default)]
pub struct SpecialActionState {
    phase: SpecialPhase,
}

impl SpecialActionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SpecialPhase {
        self.phase
    }

    /// Abandons any running sequence silently.
    pub fn reset(&mut self) {
        if self.phase != SpecialPhase::Idle {
            debug!("Special action reset from {:?}", self.phase);
        }
        self.phase = SpecialPhase::Idle;
    }

    /// Advances one frame. `held` is true if any slot asserts the special button.
    pub fn update<H: EmulatorHooks + ?Sized>(
        &mut self,
        held: bool,
        action: &SpecialAction,
        hooks: &mut H,
    ) {
        self.phase = match self.phase {
            SpecialPhase::Idle if held => Self::on_press(action, hooks),
            SpecialPhase::Idle => SpecialPhase::Idle,
            SpecialPhase::Suppressed if held => SpecialPhase::Suppressed,
            SpecialPhase::Suppressed => SpecialPhase::Idle,
            SpecialPhase::SequenceRunning {
                step,
                ticks_remaining,
            } => Self::advance(step, ticks_remaining, held, action, hooks),
        };
    }

    fn on_press<H: EmulatorHooks + ?Sized>(action: &SpecialAction, hooks: &mut H) -> SpecialPhase {
        match action {
            SpecialAction::None => {
                debug!("Special button pressed, no action for this media");
                SpecialPhase::Suppressed
            }
            SpecialAction::CoinInsert => {
                info!("Inserting coin");
                hooks.request_coin_insert();
                SpecialPhase::Suppressed
            }
            SpecialAction::Sequence(plan) => {
                info!("Starting media swap sequence ({} ticks)", plan.total_ticks);
                SpecialPhase::SequenceRunning {
                    step: 0,
                    ticks_remaining: plan.total_ticks,
                }
            }
        }
    }

    fn advance<H: EmulatorHooks + ?Sized>(
        mut step: u8,
        ticks_remaining: u16,
        held: bool,
        action: &SpecialAction,
        hooks: &mut H,
    ) -> SpecialPhase {
        let released = if held {
            SpecialPhase::Suppressed
        } else {
            SpecialPhase::Idle
        };

        let SpecialAction::Sequence(plan) = action else {
            debug!("Special action changed while a sequence was running");
            return released;
        };

        let ticks = ticks_remaining.saturating_sub(1);
        while let Some((at, media_step)) = plan.steps.get(usize::from(step)) {
            if ticks > *at {
                break;
            }
            debug!("Media step {:?} at tick {}", media_step, ticks);
            media_step.fire(&mut *hooks);
            step += 1;
        }

        if ticks == 0 {
            info!("Media swap sequence finished");
            released
        } else {
            SpecialPhase::SequenceRunning {
                step,
                ticks_remaining: ticks,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum HookCall {
        Eject,
        Select,
        Insert(Option<u8>),
        Coin,
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingHooks {
        pub calls: Vec<(u32, HookCall)>,
        pub frame: u32,
    }

    impl EmulatorHooks for RecordingHooks {
        fn request_media_eject(&mut self) {
            self.calls.push((self.frame, HookCall::Eject));
        }

        fn request_media_select(&mut self) {
            self.calls.push((self.frame, HookCall::Select));
        }

        fn request_media_insert(&mut self, slot: Option<u8>) {
            self.calls.push((self.frame, HookCall::Insert(slot)));
        }

        fn request_coin_insert(&mut self) {
            self.calls.push((self.frame, HookCall::Coin));
        }
    }

    #[test]
    fn coin_fires_once_per_press() {
        let mut state = SpecialActionState::new();
        let mut hooks = RecordingHooks::default();

        for frame in 1..=10 {
            hooks.frame = frame;
            state.update(true, &SpecialAction::CoinInsert, &mut hooks);
            assert_eq!(state.phase(), SpecialPhase::Suppressed);
        }
        hooks.frame = 11;
        state.update(false, &SpecialAction::CoinInsert, &mut hooks);
        assert_eq!(state.phase(), SpecialPhase::Idle);
        assert_eq!(hooks.calls, vec![(1, HookCall::Coin)]);

        hooks.frame = 12;
        state.update(true, &SpecialAction::CoinInsert, &mut hooks);
        assert_eq!(hooks.calls.len(), 2);
    }

    #[test]
    fn media_swap_sequence_timing() {
        let action = SpecialAction::Sequence(MEDIA_SWAP_PLAN);
        let mut state = SpecialActionState::new();
        let mut hooks = RecordingHooks::default();

        hooks.frame = 1;
        state.update(true, &action, &mut hooks);
        assert_eq!(
            state.phase(),
            SpecialPhase::SequenceRunning {
                step: 0,
                ticks_remaining: 30
            }
        );

        // Frame n leaves 31 - n ticks remaining
        for frame in 2..=31 {
            hooks.frame = frame;
            state.update(false, &action, &mut hooks);
        }

        assert_eq!(
            hooks.calls,
            vec![
                (11, HookCall::Eject),
                (21, HookCall::Select),
                (31, HookCall::Insert(None)),
            ]
        );
        assert_eq!(state.phase(), SpecialPhase::Idle);
    }

    #[test]
    fn held_through_sequence_suppresses_retrigger() {
        let action = SpecialAction::Sequence(MEDIA_SWAP_PLAN);
        let mut state = SpecialActionState::new();
        let mut hooks = RecordingHooks::default();

        for _ in 0..40 {
            state.update(true, &action, &mut hooks);
        }
        assert_eq!(state.phase(), SpecialPhase::Suppressed);
        assert_eq!(hooks.calls.len(), 3);

        state.update(false, &action, &mut hooks);
        assert_eq!(state.phase(), SpecialPhase::Idle);
    }

    #[test]
    fn reset_abandons_sequence() {
        let action = SpecialAction::Sequence(MEDIA_SWAP_PLAN);
        let mut state = SpecialActionState::new();
        let mut hooks = RecordingHooks::default();

        state.update(true, &action, &mut hooks);
        for _ in 0..12 {
            state.update(false, &action, &mut hooks);
        }
        assert_eq!(hooks.calls.len(), 1);

        state.reset();
        assert_eq!(state.phase(), SpecialPhase::Idle);
        for _ in 0..40 {
            state.update(false, &action, &mut hooks);
        }
        assert_eq!(state.phase(), SpecialPhase::Idle);
        assert_eq!(hooks.calls.len(), 1);
    }

    #[test]
    fn no_action_consumes_press() {
        let mut state = SpecialActionState::new();
        let mut hooks = RecordingHooks::default();
        state.update(true, &SpecialAction::None, &mut hooks);
        assert_eq!(state.phase(), SpecialPhase::Suppressed);
        assert!(hooks.calls.is_empty());
    }
}
