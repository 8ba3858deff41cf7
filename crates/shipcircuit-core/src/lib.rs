//! Shipcircuit Core -- the foundation for the ship electrical simulation.
//!
//! This crate provides the shared vocabulary the electrical subsystem is
//! built on: stable element/point/spring indices, visit sequence numbers,
//! the two time domains (wall clock and simulation time), a deterministic
//! PRNG, 2-D vector math with factory octants, asymmetric-watermark
//! hysteresis helpers, and the physical collaborators the circuit reads
//! from and writes to ([`points::Points`], [`springs::Springs`],
//! [`ocean::OceanSurface`], [`physics::ShipPhysicsHandler`]).
//!
//! # Time Domains
//!
//! The simulation deliberately runs on two clocks:
//!
//! - **Wall clock** ([`time::WallClockTime`]) paces visual effects such as
//!   lamp flicker, so they stay frame-rate independent.
//! - **Simulation time** (seconds as `f32`) paces gameplay effects such as
//!   spark disable windows, so they stay deterministic under replay.
//!
//! Deadlines in both domains are stored timestamps compared against the
//! values threaded into each call; nothing sleeps or suspends.

pub mod hysteresis;
pub mod id;
pub mod math;
pub mod ocean;
pub mod physics;
pub mod points;
pub mod rng;
pub mod seq;
pub mod springs;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
