// Keyseq uinput Output Layer
// Re-emits forwarded events and types replacement characters

use std::time::Duration;

use evdev::{AttributeSet, EventType, InputEvent};

use super::plan::ReplacementPlan;
use super::state::PressedKeyState;
use crate::input::VIRTUAL_DEVICE_PREFIX;
use crate::key::is_modifier;
use crate::{Action, KeyCode, Symbol};

/// Error types for uinput operations
#[derive(Debug, thiserror::Error)]
pub enum UInputError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(#[source] std::io::Error),

    #[error("Failed to write event: {0}")]
    Write(#[source] std::io::Error),

    #[error(transparent)]
    Plan(#[from] super::plan::PlanError),
}

/// Virtual uinput keyboard that stands in for the grabbed devices.
pub struct VirtualDevice {
    device: evdev::uinput::VirtualDevice,
    held_modifiers: PressedKeyState,
    key_pre_delay: Duration,
    key_post_delay: Duration,
}

impl VirtualDevice {
    /// Create the virtual keyboard
    pub fn new() -> Result<Self, UInputError> {
        let mut keys = AttributeSet::new();
        for code in 0..256u16 {
            keys.insert(evdev::Key::new(code));
        }

        let device = evdev::uinput::VirtualDeviceBuilder::new()
            .map_err(UInputError::DeviceCreation)?
            .name(&format!("{} keyboard", VIRTUAL_DEVICE_PREFIX))
            .with_keys(&keys)
            .map_err(UInputError::DeviceCreation)?
            .build()
            .map_err(UInputError::DeviceCreation)?;

        Ok(Self {
            device,
            held_modifiers: PressedKeyState::new(),
            key_pre_delay: Duration::ZERO,
            key_post_delay: Duration::ZERO,
        })
    }

    /// Configure pacing around each injected key action.
    pub fn set_throttle_delays(&mut self, key_pre_delay_ms: u64, key_post_delay_ms: u64) {
        self.key_pre_delay = Duration::from_millis(key_pre_delay_ms);
        self.key_post_delay = Duration::from_millis(key_post_delay_ms);
    }

    /// Re-emit an original event unchanged.
    ///
    /// Key events are followed by their own SYN_REPORT. Incoming SYN events
    /// are dropped since every emit already carries one.
    pub fn forward(&mut self, event: &InputEvent) -> Result<(), UInputError> {
        if event.event_type() == EventType::SYNCHRONIZATION {
            return Ok(());
        }
        if event.event_type() == EventType::KEY {
            if let Some(action) = Action::from_value(event.value()) {
                self.track_modifier(KeyCode(event.code()), action);
            }
        }
        self.device.emit(&[*event]).map_err(UInputError::Write)
    }

    /// Type `symbol` in place of a suppressed key-down.
    ///
    /// The full plan is computed before the first write, so an untypeable
    /// symbol fails without emitting anything. If a write fails partway,
    /// the steps already emitted are undone so no key stays pressed.
    pub fn emit_replacement(&mut self, symbol: Symbol) -> Result<(), UInputError> {
        let held = self.held_modifiers.get_all();
        let plan = ReplacementPlan::for_symbol(symbol, &held)?;
        log::trace!("replacement {:?} -> {} steps", symbol, plan.len());

        for (emitted, &(key, action)) in plan.steps().iter().enumerate() {
            if let Err(e) = self.send_key_action(key, action) {
                for (key, action) in plan.undo_steps(emitted) {
                    if let Err(undo) = self.send_key_action(key, action) {
                        log::warn!("undo of {} {} failed: {}", key, action, undo);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn send_key_action(&mut self, key: KeyCode, action: Action) -> Result<(), UInputError> {
        if !self.key_pre_delay.is_zero() {
            std::thread::sleep(self.key_pre_delay);
        }
        let event = InputEvent::new(EventType::KEY, key.code(), action.value());
        self.device.emit(&[event]).map_err(UInputError::Write)?;
        if !self.key_post_delay.is_zero() {
            std::thread::sleep(self.key_post_delay);
        }
        Ok(())
    }

    fn track_modifier(&mut self, key: KeyCode, action: Action) {
        if !is_modifier(key) {
            return;
        }
        match action {
            Action::Press => self.held_modifiers.add(key),
            Action::Release => {
                self.held_modifiers.remove(key);
            }
            Action::Repeat => {}
        }
    }

    /// Release every modifier the virtual device still reports as held.
    pub fn release_all(&mut self) -> Result<(), UInputError> {
        for key in self.held_modifiers.get_all() {
            self.send_key_action(key, Action::Release)?;
        }
        self.held_modifiers.clear();
        Ok(())
    }
}
