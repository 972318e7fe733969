// Keyseq Input Layer
// Device selection and key event classification

mod device;
mod event;

pub use device::{is_keyboard, is_virtual_device, DeviceFilter, VIRTUAL_DEVICE_PREFIX};
pub use event::{is_key_event, KeyEventFilter, EV_KEY};
