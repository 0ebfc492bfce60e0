pub mod action;
pub mod keyboard;

pub use action::{ActionId, ActionKind, ActionSpec, RunningAction};
pub use keyboard::{KeyEdge, KeyId, TriggerKind};

use smallvec::SmallVec;

/// Итог одного кадра диспетчера
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    /// Действия, вызванные в этом кадре, в порядке вызова
    pub invoked: SmallVec<[ActionId; 4]>,
    /// Сколько окон нажатий закрылось в этом кадре
    pub resolved_windows: usize,
}

impl FrameReport {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.invoked.is_empty() && self.resolved_windows == 0
    }
}
