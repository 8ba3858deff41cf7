//! Ship electrical-circuit simulation.
//!
//! Models a ship's electrical system as a graph of elements bound to the
//! ship's mass points: generators produce current, cables and switches route
//! it, and sinks (lamps, engines, pumps, doors, sounds, smoke emitters)
//! consume it and act on the surrounding physical world.
//!
//! # Structure
//!
//! - [`material`] — immutable element definitions and the frozen registry
//! - [`state`] — per-type mutable state payloads
//! - [`elements`] — the structure-of-arrays element store and per-tick driver
//! - [`event`] — transition events drained by the frontend
//! - [`params`] — tunable simulation parameters
//!
//! Circuit propagation and the sink state machines live in `impl` blocks on
//! [`elements::ElectricalElements`] split across `circuit` and `sinks`.
//!
//! # Determinism
//!
//! All randomness flows through a caller-provided
//! [`shipcircuit_core::rng::SimRng`]; with a fixed seed and scripted clocks,
//! every flicker, failure, and smoke puff replays exactly.

pub mod elements;
pub mod event;
pub mod material;
pub mod params;
pub mod state;

mod circuit;
mod sinks;

#[cfg(feature = "data-loader")]
pub mod data_loader;
