pub mod command;
pub mod recording;

pub use command::CommandLauncher;
pub use recording::{LaunchEvent, RecordingLauncher};
