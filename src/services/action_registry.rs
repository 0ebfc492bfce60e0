use crate::error::{ComboError, Result};
use crate::events::{ActionId, ActionKind, ActionSpec, KeyId, TriggerKind};
use crate::mappings::KeyIndex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Обработчик действия. Вызывается без аргументов; ошибка пробрасывается
/// вызывающему `Dispatcher::step`.
pub type ActionCallback = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

struct RegisteredAction {
    spec: ActionSpec,
    callbacks: Vec<ActionCallback>,
}

impl fmt::Debug for RegisteredAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAction")
            .field("spec", &self.spec)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Статическая таблица действий.
///
/// Простые действия: (клавиша, условие) -> действие.
/// Мульти-тап: (клавиша, число нажатий) -> действие, пара уникальна.
#[derive(Debug)]
pub struct ActionRegistry {
    keys: Arc<KeyIndex>,
    actions: Vec<RegisteredAction>,
    simple: Vec<ActionId>,
    multi_tap: HashMap<(KeyId, u32), ActionId>,
    // Клавиши с мульти-тап действиями в порядке первой регистрации
    tracked: Vec<KeyId>,
}

impl ActionRegistry {
    pub fn new(keys: Arc<KeyIndex>) -> Self {
        Self {
            keys,
            actions: Vec::new(),
            simple: Vec::new(),
            multi_tap: HashMap::new(),
            tracked: Vec::new(),
        }
    }

    pub fn keys(&self) -> &Arc<KeyIndex> {
        &self.keys
    }

    pub fn register_simple(
        &mut self,
        name: impl Into<String>,
        key: &str,
        trigger: TriggerKind,
    ) -> Result<ActionId> {
        let key = self.keys.resolve(key)?;
        let id = self.push(ActionSpec::simple(name, key, trigger));
        self.simple.push(id);
        Ok(id)
    }

    pub fn register_multi_tap(
        &mut self,
        name: impl Into<String>,
        key: &str,
        required_count: u32,
        trigger: TriggerKind,
        immediate: bool,
    ) -> Result<ActionId> {
        let key_id = self.keys.resolve(key)?;
        let name = name.into();

        if required_count == 0 {
            return Err(crate::combo_error!(
                invalid_binding,
                "действие '{}': число нажатий должно быть не меньше 1",
                name
            ));
        }
        if self.multi_tap.contains_key(&(key_id, required_count)) {
            return Err(ComboError::AmbiguousBinding {
                key: self.keys.name(key_id).to_string(),
                count: required_count,
            });
        }

        let id = self.push(ActionSpec::multi_tap(name, key_id, required_count, trigger, immediate));
        self.multi_tap.insert((key_id, required_count), id);
        if !self.tracked.contains(&key_id) {
            self.tracked.push(key_id);
        }
        Ok(id)
    }

    fn push(&mut self, spec: ActionSpec) -> ActionId {
        let id = ActionId(self.actions.len());
        info!("Зарегистрировано действие {}: {}", id, spec);
        self.actions.push(RegisteredAction {
            spec,
            callbacks: Vec::new(),
        });
        id
    }

    /// Добавить обработчик; обработчики вызываются в порядке добавления
    pub fn subscribe<F>(&mut self, action: ActionId, callback: F) -> Result<()>
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let entry = self.actions.get_mut(action.index()).ok_or_else(|| {
            crate::combo_error!(invalid_binding, "действие {} не зарегистрировано", action)
        })?;
        entry.callbacks.push(Box::new(callback));
        Ok(())
    }

    /// Все действия в порядке регистрации
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &ActionSpec)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(index, entry)| (ActionId(index), &entry.spec))
    }

    /// Все действия с данным именем в порядке регистрации
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ActionId> + 'a {
        self.iter()
            .filter(move |(_, spec)| spec.name == name)
            .map(|(id, _)| id)
    }

    pub fn spec(&self, action: ActionId) -> Option<&ActionSpec> {
        self.actions.get(action.index()).map(|entry| &entry.spec)
    }

    pub fn simple_actions(&self) -> &[ActionId] {
        &self.simple
    }

    pub fn tracked_keys(&self) -> &[KeyId] {
        &self.tracked
    }

    pub fn multi_tap(&self, key: KeyId, count: u32) -> Option<ActionId> {
        self.multi_tap.get(&(key, count)).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Вызвать все обработчики действия; первая ошибка прерывает вызов
    pub fn invoke(&mut self, action: ActionId) -> Result<()> {
        let entry = self
            .actions
            .get_mut(action.index())
            .ok_or_else(|| crate::combo_error!(internal, "действие {} не найдено", action))?;

        let RegisteredAction { spec, callbacks } = entry;
        crate::debug_if_enabled!("Вызов действия {}", spec);

        for callback in callbacks.iter_mut() {
            callback().map_err(|source| ComboError::ActionFailed {
                action: spec.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Параметры мульти-тап действия, если это оно
    pub fn multi_tap_params(&self, action: ActionId) -> Option<(u32, bool)> {
        match self.spec(action)?.kind {
            ActionKind::MultiTap { required_count, immediate } => Some((required_count, immediate)),
            ActionKind::Simple => None,
        }
    }
}
