use crate::error::Result;
use crate::events::{KeyEdge, KeyId};
use crate::mappings::KeyIndex;
use std::sync::Arc;

/// Состояние клавиш за текущий и предыдущий кадры.
///
/// Фронты считаются только относительно непосредственно предыдущего кадра:
/// `begin_frame` сначала копирует текущее состояние в предыдущее и лишь
/// затем принимает новые уровни.
#[derive(Debug, Clone)]
pub struct KeyStateTracker {
    keys: Arc<KeyIndex>,
    current: Vec<bool>,
    previous: Vec<bool>,
}

impl KeyStateTracker {
    pub fn new(keys: Arc<KeyIndex>) -> Self {
        let len = keys.len();
        Self {
            keys,
            current: vec![false; len],
            previous: vec![false; len],
        }
    }

    pub fn keys(&self) -> &KeyIndex {
        &self.keys
    }

    /// Начать новый кадр: уровни источника объединяются по ИЛИ с инъекциями
    pub fn begin_frame(&mut self, levels: &[bool], injected: &[bool]) {
        std::mem::swap(&mut self.previous, &mut self.current);

        for (slot, state) in self.current.iter_mut().enumerate() {
            let level = levels.get(slot).copied().unwrap_or(false);
            let forced = injected.get(slot).copied().unwrap_or(false);
            *state = level || forced;
        }
    }

    pub fn edge(&self, key: KeyId) -> KeyEdge {
        let slot = key.slot();
        KeyEdge::from_levels(self.previous[slot], self.current[slot])
    }

    pub fn is_active(&self, key: KeyId) -> bool {
        self.edge(key).is_active()
    }

    pub fn pressed(&self, key: KeyId) -> bool {
        self.edge(key) == KeyEdge::Pressed
    }

    pub fn released(&self, key: KeyId) -> bool {
        self.edge(key) == KeyEdge::Released
    }

    /// Запрос по имени: незарегистрированная клавиша - ошибка, а не `false`
    pub fn is_active_named(&self, name: &str) -> Result<bool> {
        Ok(self.is_active(self.keys.resolve(name)?))
    }

    pub fn pressed_named(&self, name: &str) -> Result<bool> {
        Ok(self.pressed(self.keys.resolve(name)?))
    }

    pub fn released_named(&self, name: &str) -> Result<bool> {
        Ok(self.released(self.keys.resolve(name)?))
    }
}
