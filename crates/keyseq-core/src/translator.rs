// Keyseq Key-Code Translator
// Fixed lookup from physical key codes to layout symbols

use strum_macros::{AsRefStr, Display, EnumString};

use crate::{KeyCode, Symbol};

/// Number of slots in the lookup table. Codes at or above this are unmapped.
const TABLE_SIZE: usize = 256;

/// Which platform numbering the incoming key codes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum KeyCodeSet {
    /// Linux input-event-codes.h (`KEY_Q = 16`)
    #[default]
    Evdev,
    /// macOS ANSI virtual key codes (`kVK_ANSI_Q = 12`)
    Mac,
}

// US QWERTY letters plus the four punctuation keys on the letter rows.
#[rustfmt::skip]
const EVDEV_KEYS: &[(u16, char)] = &[
    (16, 'q'), (17, 'w'), (18, 'e'), (19, 'r'), (20, 't'),
    (21, 'y'), (22, 'u'), (23, 'i'), (24, 'o'), (25, 'p'),
    (30, 'a'), (31, 's'), (32, 'd'), (33, 'f'), (34, 'g'),
    (35, 'h'), (36, 'j'), (37, 'k'), (38, 'l'), (39, ';'),
    (44, 'z'), (45, 'x'), (46, 'c'), (47, 'v'), (48, 'b'),
    (49, 'n'), (50, 'm'), (51, ','), (52, '.'), (53, '/'),
];

#[rustfmt::skip]
const MAC_KEYS: &[(u16, char)] = &[
    (12, 'q'), (13, 'w'), (14, 'e'), (15, 'r'), (17, 't'),
    (16, 'y'), (32, 'u'), (34, 'i'), (31, 'o'), (35, 'p'),
    (0, 'a'), (1, 's'), (2, 'd'), (3, 'f'), (5, 'g'),
    (4, 'h'), (38, 'j'), (40, 'k'), (37, 'l'), (41, ';'),
    (6, 'z'), (7, 'x'), (8, 'c'), (9, 'v'), (11, 'b'),
    (45, 'n'), (46, 'm'), (43, ','), (47, '.'), (44, '/'),
];

impl KeyCodeSet {
    fn pairs(self) -> &'static [(u16, char)] {
        match self {
            KeyCodeSet::Evdev => EVDEV_KEYS,
            KeyCodeSet::Mac => MAC_KEYS,
        }
    }
}

/// Maps raw key codes to symbols.
///
/// Built once; lookups are a bounds check and an array index.
#[derive(Debug, Clone)]
pub struct Translator {
    code_set: KeyCodeSet,
    table: [Option<Symbol>; TABLE_SIZE],
}

impl Translator {
    /// Build the lookup table for a code set
    pub fn new(code_set: KeyCodeSet) -> Self {
        let mut table = [None; TABLE_SIZE];
        for &(code, c) in code_set.pairs() {
            table[code as usize] = Some(Symbol(c));
        }
        Self { code_set, table }
    }

    /// The code set this table was built for
    pub fn code_set(&self) -> KeyCodeSet {
        self.code_set
    }

    /// Symbol for `code`, or `None` for modifiers, function keys and
    /// anything else outside the mapped set.
    pub fn translate(&self, code: KeyCode) -> Option<Symbol> {
        self.table.get(code.code() as usize).copied().flatten()
    }

    /// Reverse lookup: the key code that produces `symbol`, if any.
    pub fn code_for(&self, symbol: Symbol) -> Option<KeyCode> {
        self.table
            .iter()
            .position(|s| *s == Some(symbol))
            .map(|idx| KeyCode(idx as u16))
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(KeyCodeSet::default())
    }
}
