//! Покадровое разрешение ввода в действия.
//!
//! Источник ввода каждый кадр сообщает, какие клавиши активны; [`Dispatcher`]
//! превращает уровни во фронты, вызывает простые действия (удержание,
//! нажатие, отпускание) и разрешает мульти-тап комбинации по окну времени
//! после последнего нажатия.

pub mod config;
pub mod error;
pub mod events;
pub mod mappings;
pub mod services;
mod utils;

pub use config::Config;
pub use error::{ComboError, Result};
pub use events::{ActionId, FrameReport, KeyId, TriggerKind};
pub use mappings::KeyIndex;
pub use services::{ActionRegistry, Dispatcher, InputInjector, InputSource, ManualInput};
