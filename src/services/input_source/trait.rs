use crate::config::Config;
use crate::error::Result;
use crate::mappings::KeyIndex;
use crate::services::InputInjector;
use std::sync::Arc;
use tracing::warn;

/// Trait for per-frame input sources (hardware bridges, on-screen buttons, scripts)
pub trait InputSource {
    /// Fill `levels[slot]` for every key that is active this frame.
    /// `levels` is cleared by the caller before each call.
    fn sample(&mut self, levels: &mut [bool]) -> Result<()>;

    /// A finite source reports `true` once it has nothing more to replay
    fn is_finished(&self) -> bool {
        false
    }
}

/// Factory function to create an input source: a script replay when the config
/// has one, otherwise an idle manual source fed only by injections
pub fn create_input_source(
    config: &Config,
    keys: Arc<KeyIndex>,
    injector: InputInjector,
) -> Result<Box<dyn InputSource + Send>> {
    if config.script.is_empty() {
        warn!("Скрипт ввода пуст - источник ввода будет получать только инъекции");
        Ok(Box::new(super::manual::ManualInput::new(keys)))
    } else {
        Ok(Box::new(super::scripted::ScriptedInput::new(
            &config.script,
            config.script_loop,
            &keys,
            injector,
        )?))
    }
}
