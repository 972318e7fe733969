// Keyseq Dispatcher
// Routes raw key events around the sequence engine

use std::fmt;

use crate::input::{is_key_event, KeyEventFilter};
use crate::output::PressedKeyState;
use crate::{Action, Disposition, KeyCode, SequenceEngine, Symbol};

/// What the host should do with one raw input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Re-emit the event unchanged
    Forward,
    /// Drop the event (release or repeat of a replaced key)
    Swallow,
    /// Drop the event and type this symbol instead
    Replace(Symbol),
    /// The emergency eject key was pressed; shut down
    Eject,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Forward => write!(f, "forward"),
            Route::Swallow => write!(f, "swallow"),
            Route::Replace(symbol) => write!(f, "replace({})", symbol),
            Route::Eject => write!(f, "eject"),
        }
    }
}

/// Host-side wrapper around a [`SequenceEngine`].
///
/// Filters which key actions reach `decide`, and remembers which keys had
/// their key-down replaced so the matching repeats and release are
/// swallowed instead of leaking through as orphan events.
#[derive(Debug)]
pub struct Dispatcher {
    engine: SequenceEngine,
    filter: KeyEventFilter,
    suppressed: PressedKeyState,
    eject_key: Option<KeyCode>,
    reset_key: Option<KeyCode>,
}

impl Dispatcher {
    pub fn new(engine: SequenceEngine, filter: KeyEventFilter) -> Self {
        Self {
            engine,
            filter,
            suppressed: PressedKeyState::new(),
            eject_key: None,
            reset_key: None,
        }
    }

    /// Key whose press requests shutdown. It never reaches the engine.
    pub fn with_eject_key(mut self, key: Option<KeyCode>) -> Self {
        self.eject_key = key;
        self
    }

    /// Key whose press clears the buffer. The key itself is forwarded.
    pub fn with_reset_key(mut self, key: Option<KeyCode>) -> Self {
        self.reset_key = key;
        self
    }

    /// Route a raw evdev event.
    pub fn on_event(&mut self, event_type: u16, code: u16, value: i32) -> Route {
        if !is_key_event(event_type) {
            return Route::Forward;
        }
        match Action::from_value(value) {
            Some(action) => self.on_key(KeyCode(code), action),
            None => Route::Forward,
        }
    }

    /// Route one key action.
    pub fn on_key(&mut self, code: KeyCode, action: Action) -> Route {
        if action == Action::Press && Some(code) == self.eject_key {
            return Route::Eject;
        }

        match action {
            Action::Release => {
                if self.suppressed.remove(code) {
                    Route::Swallow
                } else {
                    Route::Forward
                }
            }
            Action::Repeat if self.suppressed.is_pressed(code) => Route::Swallow,
            _ => {
                if action == Action::Press && Some(code) == self.reset_key {
                    self.engine.reset();
                    return Route::Forward;
                }
                if !self.filter.accepts(action) {
                    return Route::Forward;
                }
                match self.engine.decide(code) {
                    Disposition::PassThrough => Route::Forward,
                    Disposition::Replace(symbol) => {
                        self.suppressed.add(code);
                        Route::Replace(symbol)
                    }
                }
            }
        }
    }

    /// The host could not emit a replacement and forwarded the original
    /// key-down instead; let its release through as well.
    pub fn replacement_failed(&mut self, code: KeyCode) {
        self.suppressed.remove(code);
    }

    /// Forget buffered symbols and suppressed keys (e.g. after losing the
    /// device grab).
    pub fn reset(&mut self) {
        self.engine.reset();
        self.suppressed.clear();
    }

    pub fn engine(&self) -> &SequenceEngine {
        &self.engine
    }

    pub fn filter(&self) -> KeyEventFilter {
        self.filter
    }
}
