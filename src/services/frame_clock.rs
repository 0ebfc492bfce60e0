use std::time::{Duration, Instant};

/// Источник длительности кадра
#[derive(Debug, Clone)]
pub enum FrameClock {
    /// Фиксированный шаг (детерминированное воспроизведение)
    Fixed(Duration),
    /// Реальное время между тиками, ограниченное сверху
    Measured { last: Option<Instant>, max_delta: Duration },
}

impl FrameClock {
    pub fn fixed(step: Duration) -> Self {
        FrameClock::Fixed(step)
    }

    pub fn measured(max_delta: Duration) -> Self {
        FrameClock::Measured {
            last: None,
            max_delta,
        }
    }

    /// Длительность прошедшего кадра. Первый измеренный кадр длится ноль.
    pub fn tick(&mut self) -> Duration {
        match self {
            FrameClock::Fixed(step) => *step,
            FrameClock::Measured { last, max_delta } => {
                let now = Instant::now();
                let delta = last
                    .map(|previous| now.duration_since(previous))
                    .unwrap_or(Duration::ZERO);
                *last = Some(now);
                // После долгой паузы (отладчик, сон) окна не должны схлопываться разом
                delta.min(*max_delta)
            }
        }
    }
}
