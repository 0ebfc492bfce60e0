use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::events::TriggerKind;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub timing: TimingConfig,
    /// Все клавиши, которые может спросить диспетчер
    pub keys: Vec<String>,
    #[serde(default)]
    pub script_loop: bool,
    #[serde(default)]
    pub actions: Vec<ActionBinding>,
    #[serde(default)]
    pub combos: Vec<ComboBinding>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
    // Оптимизационный индекс - не сериализуется, строится после загрузки
    #[serde(skip)]
    key_set: HashSet<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Окно мульти-тапа после последнего нажатия
    pub pushes_interval_ms: u64,
    pub frame_ms: u64,
}

/// Простое действие: клавиша + условие
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionBinding {
    pub name: String,
    pub key: String,
    pub trigger: TriggerKind,
}

/// Мульти-тап действие: клавиша + число нажатий в окне
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComboBinding {
    pub name: String,
    pub key: String,
    pub count: u32,
    pub trigger: TriggerKind,
    #[serde(default)]
    pub immediate: bool,
}

/// Шаг скрипта ввода: `held` удерживаются все `frames` кадров,
/// `inject` инъектируются на первом кадре шага
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScriptStep {
    #[serde(default = "default_step_frames")]
    pub frames: u32,
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default)]
    pub inject: Vec<String>,
}

fn default_step_frames() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
                filter: "combo_input=info".to_string(),
            },
            timing: TimingConfig {
                pushes_interval_ms: 300,
                frame_ms: 16,
            },
            keys: ["w", "a", "s", "d", "space"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            script_loop: false,
            actions: vec![
                ActionBinding {
                    name: "walk_forward".to_string(),
                    key: "w".to_string(),
                    trigger: TriggerKind::Hold,
                },
                ActionBinding {
                    name: "jump".to_string(),
                    key: "space".to_string(),
                    trigger: TriggerKind::Press,
                },
            ],
            combos: vec![ComboBinding {
                name: "run_forward".to_string(),
                key: "w".to_string(),
                count: 2,
                trigger: TriggerKind::Hold,
                immediate: false,
            }],
            script: Vec::new(),
            key_set: HashSet::new(),
        };
        config.build_optimization_indexes();
        config
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("COMBO_").split("__"));

        let mut config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.build_optimization_indexes();
        config.validate()?;

        Ok(config)
    }

    /// Строит оптимизационные индексы для быстрого поиска
    pub fn build_optimization_indexes(&mut self) {
        self.key_set = self
            .keys
            .iter()
            .map(|key| key.trim().to_lowercase())
            .collect();
    }

    pub fn is_known_key(&self, key: &str) -> bool {
        self.key_set.contains(&key.trim().to_lowercase())
    }

    pub fn pushes_interval(&self) -> Duration {
        Duration::from_millis(self.timing.pushes_interval_ms)
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_millis(self.timing.frame_ms)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация таймингов
        if self.timing.pushes_interval_ms == 0 {
            anyhow::bail!("pushes_interval_ms должно быть больше 0");
        }
        if self.timing.frame_ms == 0 {
            anyhow::bail!("frame_ms должно быть больше 0");
        }

        // Валидация клавиш
        if self.key_set.len() != self.keys.len() {
            anyhow::bail!("Список keys содержит повторяющиеся клавиши");
        }
        if self.keys.iter().any(|k| k.trim().is_empty()) {
            anyhow::bail!("Список keys содержит пустую клавишу");
        }

        // Валидация привязок
        for (i, action) in self.actions.iter().enumerate() {
            self.check_binding("actions", i, &action.name, &action.key)?;
        }

        let mut combo_slots = HashSet::new();
        for (i, combo) in self.combos.iter().enumerate() {
            self.check_binding("combos", i, &combo.name, &combo.key)?;

            if combo.count == 0 {
                anyhow::bail!("count должно быть не меньше 1 в combos #{}", i + 1);
            }
            if !combo_slots.insert((combo.key.trim().to_lowercase(), combo.count)) {
                anyhow::bail!(
                    "Неоднозначная привязка в combos #{}: '{}' x{} уже занято",
                    i + 1,
                    combo.key,
                    combo.count
                );
            }
        }

        // Валидация скрипта
        for (i, step) in self.script.iter().enumerate() {
            if step.frames == 0 {
                anyhow::bail!("frames должно быть больше 0 в script #{}", i + 1);
            }
            for key in step.held.iter().chain(step.inject.iter()) {
                if !self.is_known_key(key) {
                    anyhow::bail!("Неизвестная клавиша '{}' в script #{}", key, i + 1);
                }
            }
        }

        Ok(())
    }

    fn check_binding(&self, section: &str, i: usize, name: &str, key: &str) -> Result<()> {
        if name.is_empty() {
            anyhow::bail!("Пустое имя действия в {} #{}", section, i + 1);
        }
        if !self.is_known_key(key) {
            anyhow::bail!(
                "Клавиша '{}' в {} #{} не указана в keys",
                key,
                section,
                i + 1
            );
        }
        Ok(())
    }

    /// Клавиши, на которые есть хотя бы одна привязка
    pub fn get_bound_keys(&self) -> HashSet<String> {
        self.actions
            .iter()
            .map(|a| a.key.trim().to_lowercase())
            .chain(self.combos.iter().map(|c| c.key.trim().to_lowercase()))
            .collect()
    }
}
