// Keyseq Symbol Type
// Logical characters produced by physical keys

use std::fmt;

use smallvec::SmallVec;

/// Inline storage size for symbol sequences.
///
/// Matches the default buffer capacity so the common case never touches
/// the heap.
pub const INLINE_SYMBOLS: usize = 8;

/// A sequence of symbols, oldest first.
pub type SymbolSeq = SmallVec<[Symbol; INLINE_SYMBOLS]>;

/// The logical character a physical key stands for under the assumed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Symbol(pub char);

impl Symbol {
    /// Get the character carried by this symbol
    pub fn as_char(self) -> char {
        self.0
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Symbol(c)
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split a string into one symbol per character.
pub fn symbols_of(s: &str) -> SymbolSeq {
    s.chars().map(Symbol).collect()
}

/// Parse a string that must hold exactly one character.
pub fn single_symbol(s: &str) -> Option<Symbol> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Symbol(c)),
        _ => None,
    }
}

/// Render a symbol sequence back to a string (for logs and errors).
pub fn render(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.0).collect()
}
