use crate::error::{ComboError, Result};
use crate::events::KeyId;
use std::collections::HashMap;

/// Преобразование имён клавиш в слоты
/// Строится один раз из конфигурации и далее только читается
#[derive(Debug, Clone, Default)]
pub struct KeyIndex {
    names: Vec<String>,
    slots: HashMap<String, KeyId>,
}

impl KeyIndex {
    /// Построить индекс из списка имён (регистр не учитывается)
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();

        for name in names {
            let normalized = Self::normalize(name.as_ref());
            if normalized.is_empty() {
                return Err(crate::combo_error!(invalid_binding, "пустое имя клавиши"));
            }
            if index.slots.contains_key(&normalized) {
                return Err(crate::combo_error!(
                    invalid_binding,
                    "клавиша '{}' зарегистрирована дважды",
                    normalized
                ));
            }
            let slot = u16::try_from(index.names.len())
                .map_err(|_| crate::combo_error!(internal, "слишком много клавиш"))?;

            index.slots.insert(normalized.clone(), KeyId(slot));
            index.names.push(normalized);
        }

        Ok(index)
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Получить слот клавиши по её имени
    pub fn resolve(&self, name: &str) -> Result<KeyId> {
        match self.slots.get(&Self::normalize(name)) {
            Some(id) => Ok(*id),
            None => ComboError::unknown_key(name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(&Self::normalize(name))
    }

    pub fn name(&self, key: KeyId) -> &str {
        self.names.get(key.slot()).map(String::as_str).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(slot, name)| (KeyId(slot as u16), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let index = KeyIndex::new(["W", "space"]).unwrap();

        assert_eq!(index.resolve("w").unwrap().slot(), 0);
        assert_eq!(index.resolve(" Space ").unwrap().slot(), 1);
        assert_eq!(index.name(KeyId(1)), "space");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_unknown_key() {
        let index = KeyIndex::new(["a"]).unwrap();
        assert!(matches!(index.resolve("b"), Err(ComboError::UnknownKey(ref k)) if k == "b"));
        assert!(!index.contains("b"));
    }

    #[test]
    fn test_duplicate_and_empty_names_rejected() {
        assert!(matches!(
            KeyIndex::new(["a", "A"]),
            Err(ComboError::InvalidBinding(_))
        ));
        assert!(matches!(KeyIndex::new(["  "]), Err(ComboError::InvalidBinding(_))));
    }
}
