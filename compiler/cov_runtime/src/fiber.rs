//! Fiber state.
//!
//! A fiber is a suspendable sequence of execution with a private memory
//! manager. Scheduling is left to the embedder; the instance only swaps a
//! fiber's manager in while the fiber runs.

use std::fmt;

use cov_memory::{MemoryConfig, MemoryManager};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FiberState {
    #[default]
    Ready,
    Running,
    Suspended,
    Finished,
}

impl fmt::Display for FiberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FiberState::Ready => "ready",
            FiberState::Running => "running",
            FiberState::Suspended => "suspended",
            FiberState::Finished => "finished",
        })
    }
}

#[derive(Debug)]
pub struct Fiber {
    pub(crate) state: FiberState,
    /// `None` while the manager is lent to a running instance.
    pub(crate) memory: Option<MemoryManager>,
}

impl Fiber {
    pub fn new(name: &str, config: MemoryConfig) -> Self {
        Fiber {
            state: FiberState::Ready,
            memory: Some(MemoryManager::with_config(name, config)),
        }
    }

    pub fn state(&self) -> FiberState {
        self.state
    }

    pub fn memory(&self) -> Option<&MemoryManager> {
        self.memory.as_ref()
    }

    /// Mark the fiber finished and release its stack.
    pub fn finish(&mut self) {
        self.state = FiberState::Finished;
        self.memory = None;
    }
}
