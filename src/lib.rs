//! Simulation core of a real-time arcade shooter.
//!
//! The [`engine::Engine`] owns the authoritative [`entities::GameState`] and
//! drives the per-frame pipeline; everything else is a subsystem it lends the
//! state to for the duration of one call.

pub mod audio;
pub mod collision;
pub mod config;
pub mod enemy_spawner;
pub mod engine;
pub mod entities;
pub mod error;
pub mod net;
pub mod physics;
pub mod powerup_spawner;
pub mod vector;
