//! Pulse Player - window, frame loop and scene collection
//!
//! This crate provides the `PlayerApp` application handler, the TOML/CLI
//! configuration and the six heart scenes built on the shared simulation.

pub mod config;
mod player_app;
pub mod scenes;

pub use config::PulseConfig;
pub use player_app::PlayerApp;
