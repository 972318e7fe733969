// Keyseq End-to-End Test Scenarios
//
// These tests feed raw key events through the dispatcher the way the evdev
// host does, and check what would reach the virtual keyboard. They do not
// require actual hardware.
//
// Run with: cargo test --features pure-rust --test e2e_scenarios

use keyseq_core::{
    Action, Dispatcher, KeyCode, KeyEventFilter, ReplacementPlan, Route, SequenceEngine,
    Symbol, TriggerTable,
};

// Linux key codes
const KEY_1: KeyCode = KeyCode(2);
const KEY_9: KeyCode = KeyCode(10);
const ESC: KeyCode = KeyCode(1);
const Q: KeyCode = KeyCode(16);
const E: KeyCode = KeyCode(18);
const U: KeyCode = KeyCode(22);
const ENTER: KeyCode = KeyCode(28);
const LEFT_CTRL: KeyCode = KeyCode(29);
const LEFT_SHIFT: KeyCode = KeyCode(42);
const PAUSE: KeyCode = KeyCode(119);

const EV_SYN: u16 = 0x00;
const EV_KEY: u16 = 0x01;

// =========================================================================
// Test Helpers
// =========================================================================

fn dispatcher(pairs: &[(&str, char)], filter: KeyEventFilter) -> Dispatcher {
    let table = TriggerTable::from_pairs(pairs.iter().map(|&(s, c)| (s, Symbol(c)))).unwrap();
    Dispatcher::new(SequenceEngine::with_triggers(table).unwrap(), filter)
}

/// Press and release `key`, returning both routes
fn tap_key(dispatcher: &mut Dispatcher, key: KeyCode) -> [Route; 2] {
    [
        dispatcher.on_key(key, Action::Press),
        dispatcher.on_key(key, Action::Release),
    ]
}

// =========================================================================
// Dispatcher scenarios
// =========================================================================

#[test]
fn test_typing_a_trigger_replaces_only_the_last_key() {
    let mut d = dispatcher(&[("qq", 'X')], KeyEventFilter::KeyDown);

    assert_eq!(tap_key(&mut d, Q), [Route::Forward, Route::Forward]);
    assert_eq!(tap_key(&mut d, Q), [Route::Replace(Symbol('X')), Route::Swallow]);
    assert_eq!(tap_key(&mut d, Q), [Route::Forward, Route::Forward]);
}

#[test]
fn test_repeats_ignored_with_key_down_filter() {
    let mut d = dispatcher(&[("qqq", 'X')], KeyEventFilter::KeyDown);

    assert_eq!(d.on_key(Q, Action::Press), Route::Forward);
    for _ in 0..5 {
        assert_eq!(d.on_key(Q, Action::Repeat), Route::Forward);
    }
    assert_eq!(d.on_key(Q, Action::Release), Route::Forward);
    assert_eq!(d.engine().buffer().len(), 1);
}

#[test]
fn test_repeats_count_with_key_down_and_repeat_filter() {
    let mut d = dispatcher(&[("qqq", 'X')], KeyEventFilter::KeyDownAndRepeat);

    assert_eq!(d.on_key(Q, Action::Press), Route::Forward);
    assert_eq!(d.on_key(Q, Action::Repeat), Route::Forward);
    assert_eq!(d.on_key(Q, Action::Repeat), Route::Replace(Symbol('X')));
    // The key is still held: the rest of its repeats and its release belong
    // to the replaced key-down.
    assert_eq!(d.on_key(Q, Action::Repeat), Route::Swallow);
    assert_eq!(d.on_key(Q, Action::Release), Route::Swallow);
    assert_eq!(tap_key(&mut d, Q), [Route::Forward, Route::Forward]);
}

#[test]
fn test_modifiers_pass_through_without_breaking_sequence() {
    let mut d = dispatcher(&[("qq", 'X')], KeyEventFilter::KeyDown);

    assert_eq!(tap_key(&mut d, Q), [Route::Forward, Route::Forward]);
    assert_eq!(d.on_key(LEFT_SHIFT, Action::Press), Route::Forward);
    assert_eq!(d.on_key(Q, Action::Press), Route::Replace(Symbol('X')));
    assert_eq!(d.on_key(LEFT_SHIFT, Action::Release), Route::Forward);
    assert_eq!(d.on_key(Q, Action::Release), Route::Swallow);
}

#[test]
fn test_non_key_events_are_forwarded() {
    let mut d = dispatcher(&[("q", 'X')], KeyEventFilter::KeyDown);
    assert_eq!(d.on_event(EV_SYN, 0, 0), Route::Forward);
    assert_eq!(d.on_event(0x04, 4, 458772), Route::Forward);
    assert!(d.engine().buffer().is_empty());

    assert_eq!(d.on_event(EV_KEY, Q.code(), 1), Route::Replace(Symbol('X')));
    assert_eq!(d.on_event(EV_KEY, Q.code(), 0), Route::Swallow);
}

#[test]
fn test_unknown_key_values_are_forwarded() {
    let mut d = dispatcher(&[("q", 'X')], KeyEventFilter::KeyDown);
    assert_eq!(d.on_event(EV_KEY, Q.code(), 7), Route::Forward);
    assert!(d.engine().buffer().is_empty());
}

#[test]
fn test_eject_key() {
    let mut d = dispatcher(&[("qq", 'X')], KeyEventFilter::KeyDown).with_eject_key(Some(PAUSE));
    d.on_key(Q, Action::Press);
    assert_eq!(d.on_key(PAUSE, Action::Press), Route::Eject);
    assert_eq!(d.engine().buffer().len(), 1);
}

#[test]
fn test_reset_key_clears_buffer_and_is_typed() {
    let mut d = dispatcher(&[("qq", 'X')], KeyEventFilter::KeyDown).with_reset_key(Some(ESC));
    tap_key(&mut d, Q);
    assert_eq!(tap_key(&mut d, ESC), [Route::Forward, Route::Forward]);
    assert!(d.engine().buffer().is_empty());
    assert_eq!(d.on_key(Q, Action::Press), Route::Forward);
}

#[test]
fn test_failed_replacement_lets_release_through() {
    let mut d = dispatcher(&[("qq", '\u{7}')], KeyEventFilter::KeyDown);
    tap_key(&mut d, Q);
    let route = d.on_key(Q, Action::Press);
    assert_eq!(route, Route::Replace(Symbol('\u{7}')));
    assert!(ReplacementPlan::for_symbol(Symbol('\u{7}'), &[]).is_err());

    // The host forwarded the key-down instead.
    d.replacement_failed(Q);
    assert_eq!(d.on_key(Q, Action::Release), Route::Forward);
}

#[test]
fn test_dispatcher_reset_forgets_suppressed_keys() {
    let mut d = dispatcher(&[("q", 'X')], KeyEventFilter::KeyDown);
    assert_eq!(d.on_key(Q, Action::Press), Route::Replace(Symbol('X')));
    d.reset();
    assert_eq!(d.on_key(Q, Action::Release), Route::Forward);
}

// =========================================================================
// Replacement output
// =========================================================================

#[test]
fn test_plan_for_digit() {
    let plan = ReplacementPlan::for_symbol(Symbol('1'), &[]).unwrap();
    assert_eq!(
        plan.steps(),
        &[(KEY_1, Action::Press), (KEY_1, Action::Release)]
    );
}

#[test]
fn test_plan_restores_held_modifiers() {
    let plan = ReplacementPlan::for_symbol(Symbol('1'), &[LEFT_SHIFT]).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            (LEFT_SHIFT, Action::Release),
            (KEY_1, Action::Press),
            (KEY_1, Action::Release),
            (LEFT_SHIFT, Action::Press),
        ]
    );
}

#[test]
fn test_plan_for_non_ascii_uses_unicode_entry() {
    // U+00E9
    let plan = ReplacementPlan::for_symbol(Symbol('é'), &[]).unwrap();
    assert_eq!(
        plan.steps(),
        &[
            (LEFT_CTRL, Action::Press),
            (LEFT_SHIFT, Action::Press),
            (U, Action::Press),
            (U, Action::Release),
            (LEFT_SHIFT, Action::Release),
            (LEFT_CTRL, Action::Release),
            (E, Action::Press),
            (E, Action::Release),
            (KEY_9, Action::Press),
            (KEY_9, Action::Release),
            (ENTER, Action::Press),
            (ENTER, Action::Release),
        ]
    );
}

// =========================================================================
// Config to dispatcher
// =========================================================================

#[cfg(feature = "pure-rust")]
mod config_scenarios {
    use super::*;
    use keyseq_core::Config;

    const CONFIG: &str = r#"
        [engine]
        capacity = 4

        [events]
        filter = "key-down"

        [general]
        emergency_eject_key = "PAUSE"
        reset_key = "ESC"

        [[trigger]]
        sequence = "qqq"
        output = "é"
    "#;

    fn from_config(text: &str) -> Dispatcher {
        let config = Config::from_toml(text).unwrap();
        Dispatcher::new(config.build_engine().unwrap(), config.event_filter)
            .with_eject_key(config.emergency_eject_key)
            .with_reset_key(config.reset_key)
    }

    #[test]
    fn test_configured_trigger() {
        let mut d = from_config(CONFIG);
        assert_eq!(d.engine().capacity(), 4);
        tap_key(&mut d, Q);
        tap_key(&mut d, Q);
        assert_eq!(tap_key(&mut d, Q), [Route::Replace(Symbol('é')), Route::Swallow]);
    }

    #[test]
    fn test_configured_special_keys() {
        let mut d = from_config(CONFIG);
        tap_key(&mut d, Q);
        tap_key(&mut d, ESC);
        assert!(d.engine().buffer().is_empty());
        assert_eq!(d.on_key(PAUSE, Action::Press), Route::Eject);
    }

    #[test]
    fn test_default_config_types_digits() {
        let mut d = from_config("");
        let codes = [16, 17, 18, 30, 31, 32, 44, 45];
        let routes: Vec<Route> = codes
            .iter()
            .map(|&c| d.on_key(KeyCode(c), Action::Press))
            .collect();
        assert_eq!(routes[7], Route::Replace(Symbol('1')));
        assert!(routes[..7].iter().all(|r| *r == Route::Forward));
    }
}
