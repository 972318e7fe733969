// Keyseq Event Handling
// evdev event source for the Linux host

pub mod r#loop;

pub use evdev::InputEvent;
pub use r#loop::{DeviceInfo, EventLoop, EventLoopError, EventLoopResult};
