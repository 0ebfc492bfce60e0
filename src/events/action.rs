use crate::events::{KeyId, TriggerKind};
use std::fmt;

/// Индекс действия в ActionRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) usize);

impl ActionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Вид действия: простое или мульти-тап
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Simple,
    MultiTap {
        required_count: u32,
        /// Срабатывать сразу при достижении счётчика, не дожидаясь окна
        immediate: bool,
    },
}

/// Описание зарегистрированного действия (без обработчиков)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: String,
    pub key: KeyId,
    pub trigger: TriggerKind,
    pub kind: ActionKind,
}

impl ActionSpec {
    pub fn simple(name: impl Into<String>, key: KeyId, trigger: TriggerKind) -> Self {
        Self {
            name: name.into(),
            key,
            trigger,
            kind: ActionKind::Simple,
        }
    }

    pub fn multi_tap(
        name: impl Into<String>,
        key: KeyId,
        required_count: u32,
        trigger: TriggerKind,
        immediate: bool,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            trigger,
            kind: ActionKind::MultiTap { required_count, immediate },
        }
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Simple => write!(f, "{} [{} {}]", self.name, self.key, self.trigger),
            ActionKind::MultiTap { required_count, immediate } => write!(
                f,
                "{} [{} x{} {}{}]",
                self.name,
                self.key,
                required_count,
                self.trigger,
                if immediate { " immediate" } else { "" }
            ),
        }
    }
}

/// Разрешённое, но ещё не завершённое действие
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningAction {
    pub action: ActionId,
    pub key: KeyId,
    pub trigger: TriggerKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_spec_display() {
        let simple = ActionSpec::simple("jump", KeyId(4), TriggerKind::Press);
        assert_eq!(simple.to_string(), "jump [KEY_4 press]");

        let combo = ActionSpec::multi_tap("run", KeyId(0), 2, TriggerKind::Hold, true);
        assert_eq!(combo.to_string(), "run [KEY_0 x2 hold immediate]");
    }
}
