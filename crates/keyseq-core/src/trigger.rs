// Keyseq Trigger Table
// Ordered mapping from typed sequences to replacement symbols

use std::fmt;

use indexmap::IndexMap;

use crate::symbol::{render, symbols_of, SymbolSeq};
use crate::Symbol;

/// Errors raised while building a trigger table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("Trigger sequence must contain at least one symbol")]
    EmptySequence,

    #[error("Trigger sequence declared twice: {0:?}")]
    Duplicate(String),
}

/// One (sequence, output) entry of a [`TriggerTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger<'a> {
    pub sequence: &'a [Symbol],
    pub output: Symbol,
}

impl fmt::Display for Trigger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", render(self.sequence), self.output)
    }
}

/// Ordered set of triggers.
///
/// Iteration order is declaration order and is part of the matching
/// contract: when two sequences both match the buffer tail, the one declared
/// first wins, regardless of length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerTable {
    entries: IndexMap<SymbolSeq, Symbol>,
}

impl TriggerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from ordered `(sequence, output)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, TriggerError>
    where
        I: IntoIterator<Item = (S, Symbol)>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for (sequence, output) in pairs {
            table.push(symbols_of(sequence.as_ref()), output)?;
        }
        Ok(table)
    }

    /// Append a trigger at the lowest precedence.
    pub fn push(&mut self, sequence: SymbolSeq, output: Symbol) -> Result<(), TriggerError> {
        if sequence.is_empty() {
            return Err(TriggerError::EmptySequence);
        }
        if self.entries.contains_key(&sequence) {
            return Err(TriggerError::Duplicate(render(&sequence)));
        }
        self.entries.insert(sequence, output);
        Ok(())
    }

    /// Triggers in declaration order
    pub fn iter(&self) -> impl Iterator<Item = Trigger<'_>> {
        self.entries.iter().map(|(sequence, output)| Trigger {
            sequence: sequence.as_slice(),
            output: *output,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The stock table: one digit per eight-key hand position.
pub fn default_triggers() -> TriggerTable {
    let mut table = TriggerTable::new();
    for (sequence, output) in [("qweasdzx", '1'), ("tyuhjkbm", '2'), ("iopkl;,.", '3')] {
        // Sequences are distinct and non-empty.
        let _ = table.push(symbols_of(sequence), Symbol(output));
    }
    table
}
