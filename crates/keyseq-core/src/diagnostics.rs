// Keyseq Diagnostics
// Non-blocking per-key decision logging for the input thread
//
// The input thread must never wait on a log sink. Records go through a
// bounded channel with a drop-newest policy: when the drain thread falls
// behind, new records are discarded and counted instead of queued.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::dispatch::Route;
use crate::symbol::{render, SymbolSeq};
use crate::{Action, KeyCode};

/// Log target used for per-key records
pub const DECISION_TARGET: &str = "keyseq::decision";

/// Default queue depth between the input thread and the drain thread
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// One routed key event, as seen by the input thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub code: KeyCode,
    pub action: Action,
    pub route: Route,
    /// Engine buffer right after the decision
    pub buffer: SymbolSeq,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {} -> {} buffer={:?}",
            self.code,
            self.code.code(),
            self.action,
            self.route,
            render(&self.buffer)
        )
    }
}

/// Outcome of [`DecisionLog::record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Enqueued,
    /// Queue full; the record was discarded
    DroppedNewest,
    /// Drain side is gone
    Closed,
}

/// Sending half, owned by the input thread.
#[derive(Debug, Clone)]
pub struct DecisionLog {
    tx: SyncSender<Decision>,
    dropped: Arc<AtomicU64>,
}

/// Receiving half, drained on a dedicated thread.
#[derive(Debug)]
pub struct DecisionDrain {
    rx: Receiver<Decision>,
    dropped: Arc<AtomicU64>,
}

/// Create a connected log/drain pair with room for `depth` records.
pub fn decision_log(depth: usize) -> (DecisionLog, DecisionDrain) {
    let (tx, rx) = mpsc::sync_channel(depth);
    let dropped = Arc::new(AtomicU64::new(0));
    (
        DecisionLog {
            tx,
            dropped: Arc::clone(&dropped),
        },
        DecisionDrain { rx, dropped },
    )
}

impl DecisionLog {
    /// Whether per-key records would be printed at all. Cheap; lets the
    /// input thread skip building a record.
    pub fn enabled(&self) -> bool {
        log::log_enabled!(target: DECISION_TARGET, log::Level::Debug)
    }

    /// Queue a record without blocking.
    pub fn record(&self, decision: Decision) -> RecordOutcome {
        match self.tx.try_send(decision) {
            Ok(()) => RecordOutcome::Enqueued,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                RecordOutcome::DroppedNewest
            }
            Err(TrySendError::Disconnected(_)) => RecordOutcome::Closed,
        }
    }

    /// Records discarded so far because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl DecisionDrain {
    /// Forward records to `log` until every [`DecisionLog`] is dropped.
    pub fn run(self) {
        let mut reported_drops = 0;
        for decision in self.rx.iter() {
            log::debug!(target: DECISION_TARGET, "{}", decision);

            let dropped = self.dropped.load(Ordering::Relaxed);
            if dropped > reported_drops {
                log::warn!(
                    "decision log fell behind: {} record(s) dropped",
                    dropped - reported_drops
                );
                reported_drops = dropped;
            }
        }
    }

    /// Run the drain on its own thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("keyseq-log".to_string())
            .spawn(move || self.run())
    }
}
