// Keyseq Input Layer - Event Classification
// Which raw events are key events, and which key actions reach the engine

use strum_macros::{AsRefStr, Display, EnumString};

use crate::Action;

/// EV_KEY event type code from input-event-codes.h
pub const EV_KEY: u16 = 0x01;

/// Check if an event is a key event.
pub fn is_key_event(event_type: u16) -> bool {
    event_type == EV_KEY
}

/// Which key actions count as a "key-down" for the sequence engine.
///
/// Releases never reach the engine. Whether autorepeat does is a
/// deployment choice: a held key typing `qqq` through autorepeat will fire
/// a `qqq` trigger only under `KeyDownAndRepeat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum KeyEventFilter {
    #[default]
    KeyDown,
    KeyDownAndRepeat,
}

impl KeyEventFilter {
    /// True if an event with this action should be fed to `decide`.
    pub fn accepts(self, action: Action) -> bool {
        match (self, action) {
            (_, Action::Press) => true,
            (KeyEventFilter::KeyDownAndRepeat, Action::Repeat) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_key_event() {
        assert!(is_key_event(EV_KEY));
        assert!(!is_key_event(0x00)); // EV_SYN
        assert!(!is_key_event(0x02)); // EV_REL
        assert!(!is_key_event(0x04)); // EV_MSC
    }

    #[test]
    fn test_key_down_filter() {
        let filter = KeyEventFilter::KeyDown;
        assert!(filter.accepts(Action::Press));
        assert!(!filter.accepts(Action::Repeat));
        assert!(!filter.accepts(Action::Release));
    }

    #[test]
    fn test_key_down_and_repeat_filter() {
        let filter = KeyEventFilter::KeyDownAndRepeat;
        assert!(filter.accepts(Action::Press));
        assert!(filter.accepts(Action::Repeat));
        assert!(!filter.accepts(Action::Release));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("key-down".parse::<KeyEventFilter>(), Ok(KeyEventFilter::KeyDown));
        assert_eq!(
            "Key-Down-And-Repeat".parse::<KeyEventFilter>(),
            Ok(KeyEventFilter::KeyDownAndRepeat)
        );
        assert!("key-up".parse::<KeyEventFilter>().is_err());
        assert_eq!(KeyEventFilter::KeyDownAndRepeat.as_ref(), "key-down-and-repeat");
    }
}
