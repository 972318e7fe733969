// Keyseq Core Library
// Keystroke sequence engine plus the evdev/uinput host pieces

pub mod action;
pub mod buffer;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod disposition;
pub mod engine;
pub mod input;
pub mod key;
pub mod output;
pub mod symbol;
pub mod translator;
pub mod trigger;

#[cfg(feature = "pure-rust")]
pub mod event;

pub use action::Action;
pub use buffer::{KeyBuffer, DEFAULT_CAPACITY};
pub use diagnostics::{decision_log, Decision, DecisionDrain, DecisionLog, RecordOutcome};
pub use dispatch::{Dispatcher, Route};
pub use disposition::Disposition;
pub use engine::{EngineConfig, EngineError, EngineStats, SequenceEngine, MAX_CAPACITY};
pub use input::{
    is_key_event, is_keyboard, is_virtual_device, DeviceFilter, KeyEventFilter,
    VIRTUAL_DEVICE_PREFIX,
};
pub use key::KeyCode;
pub use output::{PlanError, PressedKeyState, ReplacementPlan};
pub use symbol::{Symbol, SymbolSeq};
pub use translator::{KeyCodeSet, Translator};
pub use trigger::{default_triggers, Trigger, TriggerError, TriggerTable};

#[cfg(feature = "pure-rust")]
pub use config::{Config, ConfigError};

#[cfg(feature = "pure-rust")]
pub use output::{UInputError, VirtualDevice};

#[cfg(feature = "pure-rust")]
pub use event::{EventLoop, EventLoopError, EventLoopResult};
