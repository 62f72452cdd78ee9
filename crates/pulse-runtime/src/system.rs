//! Runtime system trait

use crate::clock::GameClock;
use pulse_core::Result;

/// A system that can be ticked by the frame loop
///
/// `update` runs once per frame before drawing; `resize` runs while the loop
/// is in its resizing state, before the next update.
pub trait RuntimeSystem {
    /// Called once before the first frame with the initial window size
    fn initialize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Called once per frame with the ticked clock
    fn update(&mut self, clock: &GameClock) -> Result<()>;

    /// Called when window-sized data has to be rebuilt
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Called when the system is being shut down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
