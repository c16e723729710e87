//! Translation of physical controller state into emulated port bits.
//!
//! Every frame the [`translator`] samples each controller slot, looks up the
//! [`button_map`] tables for the classified peripheral, filters rapid-fire
//! buttons ([`rapid`]), resolves directions ([`direction`]) and feeds the
//! special button into the global [`special`] action state. The per-system
//! differences live in static [`system`] profiles, and a [`session`] ties it
//! all together for the lifetime of one loaded game.

pub mod button_map;
pub mod direction;
pub mod error;
pub mod rapid;
pub mod session;
pub mod special;
pub mod system;
pub mod translator;

// Re-exports for easier access
pub use button_map::{ButtonMapEntry, ButtonMapTable, LogicalButton};
pub use direction::{DirectionResolver, Directions, Rotation};
pub use error::MappingError;
pub use rapid::RapidCadence;
pub use session::InputSession;
pub use special::{EmulatorHooks, SpecialAction, SpecialActionState, SpecialPhase};
pub use system::{MediaKind, SystemProfile, TargetSystem};
pub use translator::{FrameInputTranslator, FrameOutput, MAX_SLOTS};
