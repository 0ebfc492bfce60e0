use crate::events::KeyId;
use smallvec::SmallVec;
use std::time::Duration;

/// Счётчик нажатий одной клавиши внутри окна
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTimer {
    pub key: KeyId,
    pub count: u32,
    /// Время с последнего нажатия
    pub elapsed: Duration,
}

/// Таймеры окон нажатий.
///
/// Не больше одного таймера на клавишу. `count` только растёт, `elapsed`
/// сбрасывается каждым новым нажатием; таймер удаляется ровно один раз,
/// когда `elapsed >= window`.
#[derive(Debug, Clone)]
pub struct PressWindowTimer {
    window: Duration,
    // Порядок создания определяет порядок разрешения в одном кадре
    timers: SmallVec<[PressTimer; 4]>,
}

impl PressWindowTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            timers: SmallVec::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Учесть нажатие и вернуть текущее число нажатий в окне
    pub fn register_press(&mut self, key: KeyId) -> u32 {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.key == key) {
            timer.count += 1;
            timer.elapsed = Duration::ZERO;
            return timer.count;
        }

        self.timers.push(PressTimer {
            key,
            count: 1,
            elapsed: Duration::ZERO,
        });
        1
    }

    pub fn advance(&mut self, delta: Duration) {
        for timer in self.timers.iter_mut() {
            timer.elapsed = timer.elapsed.saturating_add(delta);
        }
    }

    /// Извлечь истёкшие таймеры в порядке их создания
    pub fn take_expired(&mut self) -> SmallVec<[PressTimer; 4]> {
        let window = self.window;
        let mut expired = SmallVec::new();

        self.timers.retain(|timer| {
            if timer.elapsed >= window {
                expired.push(*timer);
                false
            } else {
                true
            }
        });

        expired
    }

    pub fn get(&self, key: KeyId) -> Option<&PressTimer> {
        self.timers.iter().find(|t| t.key == key)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
