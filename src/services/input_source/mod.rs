mod manual;
mod scripted;
mod r#trait;

pub use self::manual::ManualInput;
pub use self::r#trait::{create_input_source, InputSource};
pub use self::scripted::ScriptedInput;
