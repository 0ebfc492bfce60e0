use crate::error::Result;
use crate::mappings::KeyIndex;
use std::sync::Arc;

use super::r#trait::InputSource;

/// Уровни клавиш, которые выставляет код хоста (кнопки, опрос устройства)
#[derive(Debug, Clone)]
pub struct ManualInput {
    keys: Arc<KeyIndex>,
    levels: Vec<bool>,
}

impl ManualInput {
    pub fn new(keys: Arc<KeyIndex>) -> Self {
        let len = keys.len();
        Self {
            keys,
            levels: vec![false; len],
        }
    }

    pub fn hold(&mut self, name: &str) -> Result<()> {
        self.set(name, true)
    }

    pub fn release(&mut self, name: &str) -> Result<()> {
        self.set(name, false)
    }

    pub fn set(&mut self, name: &str, active: bool) -> Result<()> {
        let key = self.keys.resolve(name)?;
        self.levels[key.slot()] = active;
        Ok(())
    }

    pub fn release_all(&mut self) {
        self.levels.fill(false);
    }
}

impl InputSource for ManualInput {
    fn sample(&mut self, levels: &mut [bool]) -> Result<()> {
        for (dst, src) in levels.iter_mut().zip(self.levels.iter()) {
            *dst |= *src;
        }
        Ok(())
    }
}
