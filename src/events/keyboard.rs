use serde::{Deserialize, Serialize};
use std::fmt;

/// Условие срабатывания действия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Каждый кадр, пока клавиша активна
    Hold,
    /// На кадре перехода false → true
    Press,
    /// На кадре перехода true → false
    Release,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriggerKind::Hold => "hold",
            TriggerKind::Press => "press",
            TriggerKind::Release => "release",
        };
        write!(f, "{}", name)
    }
}

/// Слот клавиши в KeyIndex. Выдаётся только индексом, поэтому всегда валиден
/// для того индекса, из которого получен.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub(crate) u16);

impl KeyId {
    pub fn slot(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KEY_{}", self.0)
    }
}

/// Фронт состояния клавиши между двумя соседними кадрами
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEdge {
    Pressed,
    Released,
    Held,
    Idle,
}

impl KeyEdge {
    pub fn from_levels(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => KeyEdge::Pressed,
            (true, false) => KeyEdge::Released,
            (true, true) => KeyEdge::Held,
            (false, false) => KeyEdge::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, KeyEdge::Pressed | KeyEdge::Held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_from_levels() {
        assert_eq!(KeyEdge::from_levels(false, true), KeyEdge::Pressed);
        assert_eq!(KeyEdge::from_levels(true, false), KeyEdge::Released);
        assert_eq!(KeyEdge::from_levels(true, true), KeyEdge::Held);
        assert_eq!(KeyEdge::from_levels(false, false), KeyEdge::Idle);

        assert!(KeyEdge::Pressed.is_active());
        assert!(!KeyEdge::Released.is_active());
    }

    #[test]
    fn test_trigger_kind_display() {
        assert_eq!(TriggerKind::Hold.to_string(), "hold");
        assert_eq!(TriggerKind::Release.to_string(), "release");
    }
}
