use std::fmt;

use crate::Symbol;

/// The engine's verdict on one key-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Forward the original event unchanged.
    PassThrough,
    /// Suppress the original event and emit one synthetic event carrying
    /// this symbol.
    Replace(Symbol),
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::PassThrough => write!(f, "pass-through"),
            Disposition::Replace(symbol) => write!(f, "replace({})", symbol),
        }
    }
}
