// Keyseq Sequence Engine
// Rolling buffer + suffix matcher deciding pass-through vs. replace
//
// `decide` runs on the input thread for every key-down. It performs no I/O,
// takes no locks and does not allocate for capacities up to
// DEFAULT_CAPACITY. Anything the host attaches around it (logging in
// particular) must be equally non-blocking; see `diagnostics::DecisionLog`.

use crate::buffer::{KeyBuffer, DEFAULT_CAPACITY};
use crate::symbol::render;
use crate::translator::{KeyCodeSet, Translator};
use crate::trigger::TriggerTable;
use crate::{Disposition, KeyCode, Symbol};

/// Largest accepted buffer capacity
pub const MAX_CAPACITY: usize = 1024;

/// Errors raised while constructing an engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Buffer capacity must be at least 1")]
    ZeroCapacity,

    #[error("Buffer capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge { capacity: usize, max: usize },

    #[error("Trigger {sequence:?} contains {symbol:?}, which no {code_set} key produces")]
    UnreachableSymbol {
        sequence: String,
        symbol: Symbol,
        code_set: KeyCodeSet,
    },

    #[error("Trigger {sequence:?} has {len} symbols but the buffer only holds {capacity}")]
    TriggerTooLong {
        sequence: String,
        len: usize,
        capacity: usize,
    },
}

/// Running counters, updated by `decide` without synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Key-downs that translated to a symbol
    pub mapped: u64,
    /// Key-downs ignored because their code has no symbol
    pub unmapped: u64,
    /// Key-downs answered with `Replace`
    pub replaced: u64,
}

/// Construction parameters for [`SequenceEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub capacity: usize,
    pub code_set: KeyCodeSet,
    pub triggers: TriggerTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            code_set: KeyCodeSet::default(),
            triggers: crate::trigger::default_triggers(),
        }
    }
}

/// The keystroke-sequence state machine. One instance per input stream.
///
/// Not meant to be shared: the host owns it on the thread that receives key
/// events and calls [`decide`](Self::decide) serially.
#[derive(Debug, Clone)]
pub struct SequenceEngine {
    translator: Translator,
    buffer: KeyBuffer,
    triggers: TriggerTable,
    stats: EngineStats,
}

impl SequenceEngine {
    /// Build an engine, rejecting tables that could never match.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if config.capacity == 0 {
            return Err(EngineError::ZeroCapacity);
        }
        if config.capacity > MAX_CAPACITY {
            return Err(EngineError::CapacityTooLarge {
                capacity: config.capacity,
                max: MAX_CAPACITY,
            });
        }
        if let Some(trigger) = config
            .triggers
            .iter()
            .find(|t| t.sequence.len() > config.capacity)
        {
            return Err(EngineError::TriggerTooLong {
                sequence: render(trigger.sequence),
                len: trigger.sequence.len(),
                capacity: config.capacity,
            });
        }

        let translator = Translator::new(config.code_set);
        for trigger in config.triggers.iter() {
            if let Some(&symbol) = trigger
                .sequence
                .iter()
                .find(|&&symbol| translator.code_for(symbol).is_none())
            {
                return Err(EngineError::UnreachableSymbol {
                    sequence: render(trigger.sequence),
                    symbol,
                    code_set: config.code_set,
                });
            }
        }

        Ok(Self {
            translator,
            buffer: KeyBuffer::new(config.capacity),
            triggers: config.triggers,
            stats: EngineStats::default(),
        })
    }

    /// Engine with the default capacity and code set around `triggers`.
    pub fn with_triggers(triggers: TriggerTable) -> Result<Self, EngineError> {
        Self::new(EngineConfig {
            triggers,
            ..EngineConfig::default()
        })
    }

    /// Consume one key-down and decide what happens to it.
    ///
    /// Total: never panics and never fails. Unmapped codes leave the buffer
    /// untouched. On a match the buffer is cleared.
    pub fn decide(&mut self, code: KeyCode) -> Disposition {
        let Some(symbol) = self.translator.translate(code) else {
            self.stats.unmapped = self.stats.unmapped.wrapping_add(1);
            return Disposition::PassThrough;
        };

        self.stats.mapped = self.stats.mapped.wrapping_add(1);
        self.buffer.push(symbol);
        debug_assert!(self.buffer.len() <= self.buffer.capacity());

        match self.match_tail() {
            Some(output) => {
                self.buffer.clear();
                self.stats.replaced = self.stats.replaced.wrapping_add(1);
                Disposition::Replace(output)
            }
            None => Disposition::PassThrough,
        }
    }

    /// First trigger, in declaration order, that is the buffer's tail.
    fn match_tail(&self) -> Option<Symbol> {
        self.triggers
            .iter()
            .find(|trigger| self.buffer.ends_with(trigger.sequence))
            .map(|trigger| trigger.output)
    }

    /// Forget everything typed so far
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Buffered symbols, oldest first
    pub fn buffer(&self) -> &[Symbol] {
        self.buffer.as_slice()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
