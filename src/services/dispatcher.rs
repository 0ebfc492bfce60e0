use crate::config::Config;
use crate::error::Result;
use crate::events::{ActionId, FrameReport, RunningAction, TriggerKind};
use crate::mappings::KeyIndex;
use crate::services::{
    ActionRegistry, InputInjector, InputSource, KeyStateTracker, PressWindowTimer, RunningActionSet,
};
use crate::{debug_if_enabled, trace_if_enabled};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Покадровый диспетчер ввода.
///
/// Порядок внутри кадра фиксирован:
/// 1. снимок ввода и инъекций, обновление фронтов;
/// 2. простые действия;
/// 3. подсчёт нажатий и немедленные срабатывания мульти-тапа;
/// 4. продвижение таймеров и разрешение истёкших окон;
/// 5. вызов и прореживание запущенных действий.
///
/// Всё изменяемое состояние принадлежит диспетчеру; снаружи доступна
/// только инъекция через [`InputInjector`].
#[derive(Debug)]
pub struct Dispatcher {
    keys: Arc<KeyIndex>,
    tracker: KeyStateTracker,
    registry: ActionRegistry,
    timers: PressWindowTimer,
    running: RunningActionSet,
    injector: InputInjector,
    levels: Vec<bool>,
    injected: Vec<bool>,
    frame: u64,
}

impl Dispatcher {
    pub fn new(registry: ActionRegistry, pushes_interval: Duration) -> Self {
        let keys = registry.keys().clone();
        let len = keys.len();

        info!(
            "Инициализация Dispatcher: {} клавиш, {} действий, окно {}мс",
            len,
            registry.len(),
            pushes_interval.as_millis()
        );

        Self {
            tracker: KeyStateTracker::new(keys.clone()),
            injector: InputInjector::new(keys.clone()),
            keys,
            registry,
            timers: PressWindowTimer::new(pushes_interval),
            running: RunningActionSet::new(),
            levels: vec![false; len],
            injected: vec![false; len],
            frame: 0,
        }
    }

    /// Собрать диспетчер из привязок конфигурации (без обработчиков).
    /// Конфигурация проверяется заново: она могла быть собрана в коде.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let keys = Arc::new(KeyIndex::new(&config.keys)?);
        let mut registry = ActionRegistry::new(keys);

        for binding in &config.actions {
            registry.register_simple(binding.name.clone(), &binding.key, binding.trigger)?;
        }
        for combo in &config.combos {
            registry.register_multi_tap(
                combo.name.clone(),
                &combo.key,
                combo.count,
                combo.trigger,
                combo.immediate,
            )?;
        }

        Ok(Self::new(registry, config.pushes_interval()))
    }

    pub fn keys(&self) -> &Arc<KeyIndex> {
        &self.keys
    }

    pub fn injector(&self) -> InputInjector {
        self.injector.clone()
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Добавить обработчик к действию
    pub fn subscribe<F>(&mut self, action: ActionId, callback: F) -> Result<()>
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.registry.subscribe(action, callback)
    }

    pub fn tracker(&self) -> &KeyStateTracker {
        &self.tracker
    }

    pub fn press_timers(&self) -> &PressWindowTimer {
        &self.timers
    }

    pub fn running(&self) -> &RunningActionSet {
        &self.running
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Выполнить один кадр.
    ///
    /// Ошибка обработчика не прерывает кадр: все фазы отрабатывают до конца,
    /// иначе фронты этого кадра были бы потеряны. Вызывающему возвращается
    /// первая ошибка.
    pub fn step(&mut self, source: &mut dyn InputSource, delta: Duration) -> Result<FrameReport> {
        self.frame += 1;
        let mut report = FrameReport::new(self.frame);

        self.levels.fill(false);
        source.sample(&mut self.levels)?;
        self.injector.drain_into(&mut self.injected);
        self.tracker.begin_frame(&self.levels, &self.injected);

        let simple = self.fire_simple_actions(&mut report);
        self.count_presses();

        self.timers.advance(delta);
        self.resolve_expired(&mut report);

        let running = self
            .running
            .run(&self.tracker, &mut self.registry, &mut report.invoked);

        if !report.is_quiet() {
            trace_if_enabled!("Кадр {}: {:?}", self.frame, report);
        }
        simple.and(running).map(|()| report)
    }

    /// Нет открытых окон, и ни одна запущенная запись не может сработать
    /// без нового нажатия: остались только Release-записи отпущенных клавиш.
    pub fn is_settled(&self) -> bool {
        self.timers.is_empty()
            && self.running.iter().all(|entry| {
                entry.trigger == TriggerKind::Release && !self.tracker.is_active(entry.key)
            })
    }

    fn fire_simple_actions(&mut self, report: &mut FrameReport) -> Result<()> {
        let mut failure = None;
        for index in 0..self.registry.simple_actions().len() {
            let action = self.registry.simple_actions()[index];
            let Some(spec) = self.registry.spec(action) else {
                continue;
            };

            let fire = match spec.trigger {
                TriggerKind::Hold => self.tracker.is_active(spec.key),
                TriggerKind::Press => self.tracker.pressed(spec.key),
                TriggerKind::Release => self.tracker.released(spec.key),
            };

            if fire {
                report.invoked.push(action);
                if let Err(err) = self.registry.invoke(action) {
                    warn!("Кадр {}: {}", self.frame, err);
                    failure.get_or_insert(err);
                }
            }
        }
        failure.map_or(Ok(()), Err)
    }

    fn count_presses(&mut self) {
        for index in 0..self.registry.tracked_keys().len() {
            let key = self.registry.tracked_keys()[index];
            if !self.tracker.pressed(key) {
                continue;
            }

            let count = self.timers.register_press(key);
            debug_if_enabled!("Нажатие '{}' #{} в окне", self.keys.name(key), count);

            let Some(action) = self.registry.multi_tap(key, count) else {
                continue;
            };
            if let Some((_, true)) = self.registry.multi_tap_params(action) {
                if let Some(entry) = self.running_entry(action) {
                    debug_if_enabled!("Немедленное срабатывание действия {}", action);
                    self.running.push(entry);
                }
            }
        }
    }

    fn resolve_expired(&mut self, report: &mut FrameReport) {
        for timer in self.timers.take_expired() {
            // Разрешение окна вытесняет все немедленные срабатывания этой клавиши
            let superseded = self.running.remove_key(timer.key);
            let resolved = self.registry.multi_tap(timer.key, timer.count);

            debug_if_enabled!(
                "Окно '{}' закрыто: {} нажатий -> {:?} (вытеснено {})",
                self.keys.name(timer.key),
                timer.count,
                resolved.and_then(|id| self.registry.spec(id)).map(|s| s.name.as_str()),
                superseded
            );

            if let Some(entry) = resolved.and_then(|action| self.running_entry(action)) {
                self.running.push(entry);
            }
            report.resolved_windows += 1;
        }
    }

    fn running_entry(&self, action: ActionId) -> Option<RunningAction> {
        self.registry.spec(action).map(|spec| RunningAction {
            action,
            key: spec.key,
            trigger: spec.trigger,
        })
    }
}
