use crate::error::Result;
use crate::events::{ActionId, KeyId, RunningAction, TriggerKind};
use crate::services::{ActionRegistry, KeyStateTracker};
use smallvec::SmallVec;
use tracing::warn;

/// Разрешённые действия, ожидающие вызова.
///
/// Записи не дедуплицируются: несколько немедленных срабатываний одной
/// клавиши могут жить одновременно, пока их не вытеснит разрешение окна.
#[derive(Debug, Clone, Default)]
pub struct RunningActionSet {
    entries: Vec<RunningAction>,
}

impl RunningActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: RunningAction) {
        self.entries.push(entry);
    }

    /// Удалить все записи клавиши, вернуть число удалённых
    pub fn remove_key(&mut self, key: KeyId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunningAction> {
        self.entries.iter()
    }

    /// Вызвать и проредить записи по правилам их условия.
    ///
    /// Запись удаляется до вызова обработчика, поэтому при ошибке
    /// обработчика набор остаётся согласованным. Ошибка не останавливает
    /// обход; возвращается первая.
    pub fn run(
        &mut self,
        tracker: &KeyStateTracker,
        registry: &mut ActionRegistry,
        invoked: &mut SmallVec<[ActionId; 4]>,
    ) -> Result<()> {
        let mut failure = None;
        let mut index = 0;
        while index < self.entries.len() {
            let entry = self.entries[index];
            let (invoke, keep) = match entry.trigger {
                TriggerKind::Hold => {
                    let active = tracker.is_active(entry.key);
                    (active, active)
                }
                TriggerKind::Press => (true, false),
                TriggerKind::Release => {
                    // Нужен именно фронт: клавиша могла быть отпущена ещё до разрешения
                    let released = tracker.released(entry.key);
                    (released, !released)
                }
            };

            if keep {
                index += 1;
            } else {
                self.entries.remove(index);
            }

            if invoke {
                invoked.push(entry.action);
                if let Err(err) = registry.invoke(entry.action) {
                    warn!("{}", err);
                    failure.get_or_insert(err);
                }
            }
        }
        failure.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::KeyIndex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixture {
        tracker: KeyStateTracker,
        registry: ActionRegistry,
        key: KeyId,
        calls: Arc<AtomicUsize>,
        action: ActionId,
    }

    fn fixture(trigger: TriggerKind) -> Fixture {
        let keys = Arc::new(KeyIndex::new(["a"]).unwrap());
        let mut registry = ActionRegistry::new(keys.clone());
        let action = registry.register_multi_tap("tap", "a", 1, trigger, false).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        registry
            .subscribe(action, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        Fixture {
            tracker: KeyStateTracker::new(keys.clone()),
            registry,
            key: keys.resolve("a").unwrap(),
            calls,
            action,
        }
    }

    fn frame(f: &mut Fixture, set: &mut RunningActionSet, active: bool) -> usize {
        f.tracker.begin_frame(&[active], &[]);
        let mut invoked = SmallVec::new();
        set.run(&f.tracker, &mut f.registry, &mut invoked).unwrap();
        invoked.len()
    }

    #[test]
    fn test_press_fires_once() {
        let mut f = fixture(TriggerKind::Press);
        let mut set = RunningActionSet::new();
        set.push(RunningAction { action: f.action, key: f.key, trigger: TriggerKind::Press });

        assert_eq!(frame(&mut f, &mut set, false), 1);
        assert!(set.is_empty());
        assert_eq!(frame(&mut f, &mut set, false), 0);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hold_fires_while_active_then_dies() {
        let mut f = fixture(TriggerKind::Hold);
        let mut set = RunningActionSet::new();
        set.push(RunningAction { action: f.action, key: f.key, trigger: TriggerKind::Hold });

        assert_eq!(frame(&mut f, &mut set, true), 1);
        assert_eq!(frame(&mut f, &mut set, true), 1);
        assert_eq!(frame(&mut f, &mut set, false), 0);
        assert!(set.is_empty());
        assert_eq!(frame(&mut f, &mut set, true), 0);
        assert_eq!(f.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_release_waits_for_edge() {
        let mut f = fixture(TriggerKind::Release);
        let mut set = RunningActionSet::new();
        set.push(RunningAction { action: f.action, key: f.key, trigger: TriggerKind::Release });

        // Клавиша уже отпущена - уровень "вверх" не считается фронтом
        assert_eq!(frame(&mut f, &mut set, false), 0);
        assert_eq!(frame(&mut f, &mut set, true), 0);
        assert_eq!(set.len(), 1);
        assert_eq!(frame(&mut f, &mut set, false), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_error_keeps_walking_entries() {
        let mut f = fixture(TriggerKind::Press);
        let broken = f.registry.register_simple("broken", "a", TriggerKind::Press).unwrap();
        f.registry
            .subscribe(broken, || anyhow::bail!("сбой"))
            .unwrap();

        let mut set = RunningActionSet::new();
        set.push(RunningAction { action: broken, key: f.key, trigger: TriggerKind::Press });
        set.push(RunningAction { action: f.action, key: f.key, trigger: TriggerKind::Press });

        f.tracker.begin_frame(&[false], &[]);
        let mut invoked = SmallVec::new();
        assert!(set.run(&f.tracker, &mut f.registry, &mut invoked).is_err());
        assert_eq!(invoked.as_slice(), &[broken, f.action]);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_key() {
        let f = fixture(TriggerKind::Press);
        let mut set = RunningActionSet::new();
        let entry = RunningAction { action: f.action, key: f.key, trigger: TriggerKind::Press };
        set.push(entry);
        set.push(entry);
        set.push(RunningAction { key: KeyId(9), ..entry });

        assert_eq!(set.remove_key(f.key), 2);
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().key, KeyId(9));
    }
}
