// Keyseq Key Buffer
// Bounded rolling window of the most recently typed symbols

use crate::symbol::SymbolSeq;
use crate::Symbol;

/// Default number of symbols kept in the buffer.
pub const DEFAULT_CAPACITY: usize = 8;

/// Ordered, bounded sequence of recently typed symbols, oldest first.
///
/// Pushing past capacity drops from the front, so the buffer always holds
/// the most recent `capacity` symbols. Storage is inline up to
/// [`DEFAULT_CAPACITY`]; larger capacities spill to the heap only as
/// symbols actually arrive.
#[derive(Debug, Clone)]
pub struct KeyBuffer {
    symbols: SymbolSeq,
    capacity: usize,
}

impl KeyBuffer {
    /// Create an empty buffer. `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "key buffer capacity must be non-zero");
        Self {
            symbols: SymbolSeq::new(),
            capacity,
        }
    }

    /// Append a symbol, dropping the oldest ones if capacity is exceeded.
    pub fn push(&mut self, symbol: Symbol) {
        if self.symbols.len() >= self.capacity {
            let excess = self.symbols.len() + 1 - self.capacity;
            self.symbols.drain(..excess);
        }
        self.symbols.push(symbol);
        debug_assert!(self.symbols.len() <= self.capacity);
    }

    /// True if `suffix` is exactly the tail of the buffer.
    ///
    /// An empty suffix never matches.
    pub fn ends_with(&self, suffix: &[Symbol]) -> bool {
        !suffix.is_empty() && self.symbols.ends_with(suffix)
    }

    /// Drop every buffered symbol
    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Buffered symbols, oldest first
    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for KeyBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
