use crate::config::ScriptStep;
use crate::error::Result;
use crate::events::KeyId;
use crate::mappings::KeyIndex;
use crate::services::InputInjector;
use smallvec::SmallVec;
use tracing::info;

use super::r#trait::InputSource;

#[derive(Debug, Clone)]
struct ResolvedStep {
    frames: u32,
    held: SmallVec<[KeyId; 4]>,
    inject: Vec<String>,
}

/// Воспроизведение заранее записанной последовательности кадров
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    steps: Vec<ResolvedStep>,
    looping: bool,
    injector: InputInjector,
    step: usize,
    frame_in_step: u32,
    finished: bool,
}

impl ScriptedInput {
    /// Имена клавиш проверяются сразу, а не на первом кадре
    pub fn new(
        steps: &[ScriptStep],
        looping: bool,
        keys: &KeyIndex,
        injector: InputInjector,
    ) -> Result<Self> {
        let mut resolved = Vec::with_capacity(steps.len());

        for (i, step) in steps.iter().enumerate() {
            if step.frames == 0 {
                return Err(crate::combo_error!(
                    invalid_binding,
                    "шаг скрипта #{}: frames должно быть больше 0",
                    i + 1
                ));
            }
            let held = step
                .held
                .iter()
                .map(|name| keys.resolve(name))
                .collect::<Result<SmallVec<_>>>()?;
            for name in &step.inject {
                keys.resolve(name)?;
            }

            resolved.push(ResolvedStep {
                frames: step.frames,
                held,
                inject: step.inject.clone(),
            });
        }

        let total: u64 = resolved.iter().map(|s| u64::from(s.frames)).sum();
        info!(
            "Скрипт ввода: {} шагов, {} кадров (повтор: {})",
            resolved.len(),
            total,
            looping
        );

        Ok(Self {
            finished: resolved.is_empty(),
            steps: resolved,
            looping,
            injector,
            step: 0,
            frame_in_step: 0,
        })
    }
}

impl InputSource for ScriptedInput {
    fn sample(&mut self, levels: &mut [bool]) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        let current = &self.steps[self.step];
        if self.frame_in_step == 0 {
            for name in &current.inject {
                self.injector.inject(name)?;
            }
        }
        for key in &current.held {
            levels[key.slot()] = true;
        }

        self.frame_in_step += 1;
        if self.frame_in_step >= current.frames {
            self.frame_in_step = 0;
            self.step += 1;
            if self.step >= self.steps.len() {
                if self.looping {
                    self.step = 0;
                } else {
                    self.finished = true;
                    crate::debug_if_enabled!("Скрипт ввода завершён");
                }
            }
        }
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}
