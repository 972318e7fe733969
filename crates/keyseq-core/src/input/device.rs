// Keyseq Input Layer - Device Selection
// Keyboard detection and the explicit device filter

/// Name prefix of the uinput device keyseq creates. Never grabbed, or the
/// replacement events would loop back into the engine.
pub const VIRTUAL_DEVICE_PREFIX: &str = "keyseq (virtual)";

// QWERTY row key codes: Q, W, E, R, T, Y
const QWERTY_CODES: &[u16] = &[16, 17, 18, 19, 20, 21];

// Representative A-Z and SPACE codes: SPACE, A, Z
const A_Z_SPACE_CODES: &[u16] = &[57, 30, 44];

/// Whether a device with these EV_KEY capabilities is a typing keyboard.
///
/// Requires the whole QWERTY row plus SPACE, A and Z. Mice, power buttons
/// and media remotes also report EV_KEY but fail this check.
pub fn is_keyboard(has_ev_key: bool, supports: impl Fn(u16) -> bool) -> bool {
    has_ev_key
        && QWERTY_CODES.iter().all(|code| supports(*code))
        && A_Z_SPACE_CODES.iter().all(|code| supports(*code))
}

/// Check if a device name belongs to a keyseq virtual device.
pub fn is_virtual_device(name: &str) -> bool {
    name.starts_with(VIRTUAL_DEVICE_PREFIX)
}

/// Chooses which input devices keyseq reads from.
///
/// With no explicit entries, every non-virtual keyboard is selected.
/// Otherwise a device is selected iff its name or path is listed, which
/// lets an operator pick a device autodetection would skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    only: Vec<String>,
}

impl DeviceFilter {
    pub fn new(only: Vec<String>) -> Self {
        Self { only }
    }

    /// Autodetect keyboards
    pub fn autodetect() -> Self {
        Self::default()
    }

    pub fn is_autodetect(&self) -> bool {
        self.only.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.only
    }

    /// Decide whether a device is selected.
    pub fn matches(&self, name: &str, path: &str, is_keyboard: bool) -> bool {
        if !self.only.is_empty() {
            return self.only.iter().any(|entry| entry == name || entry == path);
        }
        is_keyboard && !is_virtual_device(name)
    }
}
