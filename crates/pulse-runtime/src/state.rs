//! Loop state machine driving the window's frame loop.
//!
//! `Running` is the steady state. A resize moves the loop into `Resizing`,
//! which the frame handler resolves by reallocating window-sized buffers and
//! calling [`LoopState::resized`]. `Stopped` is terminal.

/// Events that can change the loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Quit,
    Resize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Running,
    /// Window-sized buffers must be rebuilt before the next frame
    Resizing { width: u32, height: u32 },
    Stopped,
}

impl LoopState {
    /// Apply an event and return the next state.
    ///
    /// Zero-sized resizes (minimized windows) are ignored. Several resizes in
    /// one frame collapse into the last one.
    pub fn handle(self, event: LoopEvent) -> LoopState {
        match (self, event) {
            (LoopState::Stopped, _) => LoopState::Stopped,
            (_, LoopEvent::Quit) => LoopState::Stopped,
            (state, LoopEvent::Resize { width, height }) if width == 0 || height == 0 => state,
            (_, LoopEvent::Resize { width, height }) => LoopState::Resizing { width, height },
        }
    }

    /// Buffers were rebuilt; return to `Running` unless stopped meanwhile
    pub fn resized(self) -> LoopState {
        match self {
            LoopState::Resizing { .. } => LoopState::Running,
            other => other,
        }
    }

    pub fn is_running(&self) -> bool {
        !matches!(self, LoopState::Stopped)
    }

    /// Size the loop is waiting to resize to, if any
    pub fn pending_size(&self) -> Option<(u32, u32)> {
        match *self {
            LoopState::Resizing { width, height } => Some((width, height)),
            _ => None,
        }
    }
}
