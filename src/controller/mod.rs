//! Controller subsystem for raw peripheral input
//!
//! 1. [`raw`] - Bit layout of every supported peripheral
//! 2. [`peripheral`] - Classification and per-frame samples
//! 3. [`collector`] - gilrs-backed polling for the host
//!
//! # Architecture
//!
//! ```text
//! Gamepads ──► GilrsPoller ──► SlotSample ──► mapping::translator
//!              (scan/sample)   (classified)
//! ```

pub mod collector;
pub mod peripheral;
pub mod raw;

pub use collector::{AccessoryMode, GilrsPoller, PollerError, PollerSettings};
pub use peripheral::{
    classify, ExpansionDescriptor, PeripheralType, Poller, RawSample, SlotSample, StickPair,
};
