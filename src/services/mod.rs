pub mod action_registry;
pub mod dispatcher;
pub mod frame_clock;
pub mod injector;
pub mod input_source;
pub mod key_state;
pub mod player_controller;
pub mod press_timer;
pub mod running_actions;

pub use action_registry::{ActionCallback, ActionRegistry};
pub use dispatcher::Dispatcher;
pub use frame_clock::FrameClock;
pub use injector::InputInjector;
pub use input_source::{create_input_source, InputSource, ManualInput, ScriptedInput};
pub use key_state::KeyStateTracker;
pub use player_controller::PlayerController;
pub use press_timer::{PressTimer, PressWindowTimer};
pub use running_actions::RunningActionSet;
