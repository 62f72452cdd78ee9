//! Pulse Runtime - frame loop infrastructure
//!
//! Provides the building blocks of the window loop:
//! - `GameClock` - elapsed time, per-frame steps and frame-rate cap
//! - `InputState` - keyboard tracking with named action bindings
//! - `LoopState` - running / resizing / stopped state machine
//! - `RuntimeSystem` - trait for systems ticked by the frame loop

mod clock;
mod input;
mod state;
mod system;

pub use clock::{GameClock, NOMINAL_FPS};
pub use input::{actions, InputState};
pub use state::{LoopEvent, LoopState};
pub use system::RuntimeSystem;
