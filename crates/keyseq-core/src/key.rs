// Keyseq Key Code Type
// Opaque physical key codes plus Linux input-event-codes.h names

use std::fmt;
use std::str::FromStr;

/// Represents a single physical key code.
///
/// The value is platform-defined and only meaningful together with a
/// [`KeyCodeSet`](crate::translator::KeyCodeSet). Names returned by
/// [`KeyCode::name`] follow Linux input-event-codes.h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the evdev name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        KeyCode(code)
    }
}

impl From<KeyCode> for u16 {
    fn from(key: KeyCode) -> Self {
        key.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Name/code pairs for the evdev keys keyseq needs to talk about.
const KEY_NAMES: &[(&str, u16)] = &[
    ("RESERVED", 0),
    ("ESC", 1),
    ("1", 2),
    ("2", 3),
    ("3", 4),
    ("4", 5),
    ("5", 6),
    ("6", 7),
    ("7", 8),
    ("8", 9),
    ("9", 10),
    ("0", 11),
    ("MINUS", 12),
    ("EQUAL", 13),
    ("BACKSPACE", 14),
    ("TAB", 15),
    ("Q", 16),
    ("W", 17),
    ("E", 18),
    ("R", 19),
    ("T", 20),
    ("Y", 21),
    ("U", 22),
    ("I", 23),
    ("O", 24),
    ("P", 25),
    ("LEFT_BRACE", 26),
    ("RIGHT_BRACE", 27),
    ("ENTER", 28),
    ("LEFT_CTRL", 29),
    ("A", 30),
    ("S", 31),
    ("D", 32),
    ("F", 33),
    ("G", 34),
    ("H", 35),
    ("J", 36),
    ("K", 37),
    ("L", 38),
    ("SEMICOLON", 39),
    ("APOSTROPHE", 40),
    ("GRAVE", 41),
    ("LEFT_SHIFT", 42),
    ("BACKSLASH", 43),
    ("Z", 44),
    ("X", 45),
    ("C", 46),
    ("V", 47),
    ("B", 48),
    ("N", 49),
    ("M", 50),
    ("COMMA", 51),
    ("DOT", 52),
    ("SLASH", 53),
    ("RIGHT_SHIFT", 54),
    ("LEFT_ALT", 56),
    ("SPACE", 57),
    ("CAPSLOCK", 58),
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("NUMLOCK", 69),
    ("SCROLLLOCK", 70),
    ("F11", 87),
    ("F12", 88),
    ("RIGHT_CTRL", 97),
    ("SYSRQ", 99),
    ("RIGHT_ALT", 100),
    ("HOME", 102),
    ("UP", 103),
    ("PAGE_UP", 104),
    ("LEFT", 105),
    ("RIGHT", 106),
    ("END", 107),
    ("DOWN", 108),
    ("PAGE_DOWN", 109),
    ("INSERT", 110),
    ("DELETE", 111),
    ("PAUSE", 119),
    ("LEFT_META", 125),
    ("RIGHT_META", 126),
    ("MENU", 139),
    ("EJECTCD", 161),
];

/// Aliases accepted by [`key_from_name`] in addition to the canonical names.
const KEY_ALIASES: &[(&str, u16)] = &[
    ("ESCAPE", 1),
    ("KEY_1", 2),
    ("KEY_2", 3),
    ("KEY_3", 4),
    ("KEY_4", 5),
    ("KEY_5", 6),
    ("KEY_6", 7),
    ("KEY_7", 8),
    ("KEY_8", 9),
    ("KEY_9", 10),
    ("KEY_0", 11),
    ("RETURN", 28),
    ("PERIOD", 52),
    ("PRINT", 99),
    ("PRTSCR", 99),
];

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Look up an evdev key code by name (case-insensitive).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let name_upper = name.trim().to_ascii_uppercase();
    KEY_NAMES
        .iter()
        .chain(KEY_ALIASES.iter())
        .find(|(n, _)| *n == name_upper)
        .map(|(_, code)| KeyCode::from(*code))
}

/// Modifier key codes (Ctrl, Shift, Alt, Meta on both sides).
const MODIFIER_CODES: &[u16] = &[29, 42, 54, 56, 97, 100, 125, 126];

/// True for Ctrl, Shift, Alt and Meta keys
pub fn is_modifier(key: KeyCode) -> bool {
    MODIFIER_CODES.contains(&key.code())
}

/// Evdev key code that produces an unshifted ASCII punctuation character.
pub fn ascii_to_key(c: char) -> Option<KeyCode> {
    match c {
        ';' => Some(KeyCode::from(39)),  // SEMICOLON
        '\'' => Some(KeyCode::from(40)), // APOSTROPHE
        '=' => Some(KeyCode::from(13)),  // EQUAL
        '-' => Some(KeyCode::from(12)),  // MINUS
        '`' => Some(KeyCode::from(41)),  // GRAVE
        '[' => Some(KeyCode::from(26)),  // LEFT_BRACE
        ']' => Some(KeyCode::from(27)),  // RIGHT_BRACE
        ',' => Some(KeyCode::from(51)),  // COMMA
        '.' => Some(KeyCode::from(52)),  // DOT
        '/' => Some(KeyCode::from(53)),  // SLASH
        ' ' => Some(KeyCode::from(57)),  // SPACE
        '\\' => Some(KeyCode::from(43)), // BACKSLASH
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("a"), Some(KeyCode::from(30)));
        assert_eq!(key_from_name("A"), Some(KeyCode::from(30)));
        assert_eq!(key_from_name("ENTER"), Some(KeyCode::from(28)));
        assert_eq!(key_from_name("1"), Some(KeyCode::from(2)));
        assert_eq!(key_from_name("escape"), Some(KeyCode::from(1)));
        assert_eq!(key_from_name("PAUSE"), Some(KeyCode::from(119)));
        assert_eq!(key_from_name("NOT_A_KEY"), None);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(KeyCode::from(16).to_string(), "Q");
        assert_eq!(KeyCode::from(28).to_string(), "ENTER");
        assert_eq!(KeyCode::from(999).to_string(), "UNKNOWN");
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("semicolon".parse::<KeyCode>(), Ok(KeyCode::from(39)));
        assert!("nope".parse::<KeyCode>().is_err());
    }

    #[test]
    fn test_is_modifier() {
        assert!(is_modifier(KeyCode::from(42))); // LEFT_SHIFT
        assert!(is_modifier(KeyCode::from(126))); // RIGHT_META
        assert!(!is_modifier(KeyCode::from(16))); // Q
        assert!(!is_modifier(KeyCode::from(58))); // CAPSLOCK
    }

    #[test]
    fn test_ascii_to_key() {
        assert_eq!(ascii_to_key(';'), Some(KeyCode::from(39)));
        assert_eq!(ascii_to_key(' '), Some(KeyCode::from(57)));
        assert_eq!(ascii_to_key('x'), None);
    }
}
