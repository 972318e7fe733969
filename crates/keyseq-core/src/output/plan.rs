// Keyseq Output Layer - Replacement Planning
// Turns a replacement symbol into the exact key actions to inject

use smallvec::SmallVec;

use crate::key::{ascii_to_key, key_from_name};
use crate::{Action, KeyCode, Symbol};

const LEFT_CTRL: KeyCode = KeyCode(29);
const LEFT_SHIFT: KeyCode = KeyCode(42);
const U: KeyCode = KeyCode(22);
const ENTER: KeyCode = KeyCode(28);
const TAB: KeyCode = KeyCode(15);

/// Why a symbol could not be turned into key actions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("No key sequence can type {0:?}")]
    Untypeable(char),
}

/// One injected key action
pub type Step = (KeyCode, Action);

/// Ordered key actions that type one replacement character.
///
/// Planning is pure and happens before anything is written to the output
/// device, so a symbol that cannot be typed is detected while the original
/// event can still be forwarded instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementPlan {
    steps: SmallVec<[Step; 16]>,
    held: SmallVec<[KeyCode; 8]>,
}

impl ReplacementPlan {
    /// Plan the key actions for `symbol`.
    ///
    /// `held_modifiers` are modifiers the user is physically holding; they
    /// are released around the replacement and pressed again afterwards so
    /// a held Shift or Ctrl does not alter the emitted character.
    pub fn for_symbol(symbol: Symbol, held_modifiers: &[KeyCode]) -> Result<Self, PlanError> {
        let c = symbol.as_char();
        let mut plan = Self {
            held: held_modifiers.iter().copied().collect(),
            ..Self::default()
        };

        for modifier in held_modifiers.iter().rev() {
            plan.push(*modifier, Action::Release);
        }

        if let Some((key, shift)) = ascii_key_and_shift(c) {
            plan.tap_with_shift(key, shift);
        } else if c.is_ascii_control() {
            return Err(PlanError::Untypeable(c));
        } else {
            plan.unicode_compose(c)?;
        }

        for modifier in held_modifiers {
            plan.push(*modifier, Action::Press);
        }

        Ok(plan)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Key actions that put the output back in its pre-plan state after
    /// only the first `emitted` steps were written.
    ///
    /// Keys the plan pressed are released, held modifiers the plan released
    /// are pressed again. Most recently touched keys come first.
    pub fn undo_steps(&self, emitted: usize) -> SmallVec<[Step; 8]> {
        let mut last: SmallVec<[Step; 8]> = SmallVec::new();
        for &(key, action) in self.steps.iter().take(emitted) {
            match last.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = action,
                None => last.push((key, action)),
            }
        }

        last.iter()
            .rev()
            .filter_map(|&(key, action)| {
                let was_down = self.held.contains(&key);
                match (was_down, action) {
                    (false, Action::Press) => Some((key, Action::Release)),
                    (true, Action::Release) => Some((key, Action::Press)),
                    _ => None,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(&mut self, key: KeyCode, action: Action) {
        self.steps.push((key, action));
    }

    fn tap(&mut self, key: KeyCode) {
        self.push(key, Action::Press);
        self.push(key, Action::Release);
    }

    fn tap_with_shift(&mut self, key: KeyCode, shift: bool) {
        if shift {
            self.push(LEFT_SHIFT, Action::Press);
            self.tap(key);
            self.push(LEFT_SHIFT, Action::Release);
        } else {
            self.tap(key);
        }
    }

    /// Ctrl+Shift+U, lowercase hex digits, Enter (GTK/IBus compose).
    fn unicode_compose(&mut self, c: char) -> Result<(), PlanError> {
        self.push(LEFT_CTRL, Action::Press);
        self.push(LEFT_SHIFT, Action::Press);
        self.tap(U);
        self.push(LEFT_SHIFT, Action::Release);
        self.push(LEFT_CTRL, Action::Release);

        for digit in format!("{:x}", c as u32).chars() {
            let key = key_from_name(&digit.to_string()).ok_or(PlanError::Untypeable(c))?;
            self.tap(key);
        }
        self.tap(ENTER);
        Ok(())
    }
}

/// Key and Shift state that type an ASCII character on a US layout.
fn ascii_key_and_shift(c: char) -> Option<(KeyCode, bool)> {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
        return key_from_name(&c.to_string()).map(|k| (k, false));
    }
    if c.is_ascii_uppercase() {
        return key_from_name(&c.to_ascii_lowercase().to_string()).map(|k| (k, true));
    }

    let shifted = |base: char| ascii_to_key(base).map(|k| (k, true));
    let shifted_digit = |digit: &str| key_from_name(digit).map(|k| (k, true));

    match c {
        '\n' => Some((ENTER, false)),
        '\t' => Some((TAB, false)),
        '_' => shifted('-'),
        '+' => shifted('='),
        '{' => shifted('['),
        '}' => shifted(']'),
        '|' => shifted('\\'),
        ':' => shifted(';'),
        '"' => shifted('\''),
        '<' => shifted(','),
        '>' => shifted('.'),
        '?' => shifted('/'),
        '~' => shifted('`'),
        '!' => shifted_digit("1"),
        '@' => shifted_digit("2"),
        '#' => shifted_digit("3"),
        '$' => shifted_digit("4"),
        '%' => shifted_digit("5"),
        '^' => shifted_digit("6"),
        '&' => shifted_digit("7"),
        '*' => shifted_digit("8"),
        '(' => shifted_digit("9"),
        ')' => shifted_digit("0"),
        _ => ascii_to_key(c).map(|k| (k, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_1: KeyCode = KeyCode(2);
    const KEY_A: KeyCode = KeyCode(30);

    #[test]
    fn test_digit_is_plain_tap() {
        let plan = ReplacementPlan::for_symbol(Symbol('1'), &[]).unwrap();
        assert_eq!(
            plan.steps(),
            &[(KEY_1, Action::Press), (KEY_1, Action::Release)]
        );
    }

    #[test]
    fn test_uppercase_wraps_shift() {
        let plan = ReplacementPlan::for_symbol(Symbol('A'), &[]).unwrap();
        assert_eq!(
            plan.steps(),
            &[
                (LEFT_SHIFT, Action::Press),
                (KEY_A, Action::Press),
                (KEY_A, Action::Release),
                (LEFT_SHIFT, Action::Release),
            ]
        );
    }

    #[test]
    fn test_shifted_punctuation() {
        let plan = ReplacementPlan::for_symbol(Symbol('!'), &[]).unwrap();
        assert_eq!(plan.steps()[0], (LEFT_SHIFT, Action::Press));
        assert_eq!(plan.steps()[1], (KEY_1, Action::Press));
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_held_modifiers_are_released_and_restored() {
        let right_shift = KeyCode(54);
        let plan = ReplacementPlan::for_symbol(Symbol('1'), &[LEFT_CTRL, right_shift]).unwrap();
        assert_eq!(
            plan.steps(),
            &[
                (right_shift, Action::Release),
                (LEFT_CTRL, Action::Release),
                (KEY_1, Action::Press),
                (KEY_1, Action::Release),
                (LEFT_CTRL, Action::Press),
                (right_shift, Action::Press),
            ]
        );
    }

    #[test]
    fn test_non_ascii_uses_unicode_compose() {
        // U+00E9 -> "e9"
        let plan = ReplacementPlan::for_symbol(Symbol('é'), &[]).unwrap();
        let e = key_from_name("e").unwrap();
        let nine = key_from_name("9").unwrap();
        assert_eq!(
            plan.steps(),
            &[
                (LEFT_CTRL, Action::Press),
                (LEFT_SHIFT, Action::Press),
                (U, Action::Press),
                (U, Action::Release),
                (LEFT_SHIFT, Action::Release),
                (LEFT_CTRL, Action::Release),
                (e, Action::Press),
                (e, Action::Release),
                (nine, Action::Press),
                (nine, Action::Release),
                (ENTER, Action::Press),
                (ENTER, Action::Release),
            ]
        );
    }

    #[test]
    fn test_control_characters_are_untypeable() {
        assert_eq!(
            ReplacementPlan::for_symbol(Symbol('\u{7}'), &[]),
            Err(PlanError::Untypeable('\u{7}'))
        );
    }

    #[test]
    fn test_newline_and_tab() {
        let plan = ReplacementPlan::for_symbol(Symbol('\n'), &[]).unwrap();
        assert_eq!(plan.steps()[0], (ENTER, Action::Press));
        let plan = ReplacementPlan::for_symbol(Symbol('\t'), &[]).unwrap();
        assert_eq!(plan.steps()[0], (TAB, Action::Press));
    }

    #[test]
    fn test_undo_after_partial_unicode_entry() {
        let plan = ReplacementPlan::for_symbol(Symbol('é'), &[]).unwrap();
        assert!(plan.undo_steps(0).is_empty());
        assert_eq!(
            plan.undo_steps(2).as_slice(),
            &[(LEFT_SHIFT, Action::Release), (LEFT_CTRL, Action::Release)]
        );
        // Shift is already back up after the fifth step, Ctrl is not.
        assert_eq!(plan.undo_steps(5).as_slice(), &[(LEFT_CTRL, Action::Release)]);
        assert!(plan.undo_steps(plan.len()).is_empty());
    }

    #[test]
    fn test_undo_presses_released_held_modifier() {
        let plan = ReplacementPlan::for_symbol(Symbol('1'), &[LEFT_SHIFT]).unwrap();
        assert_eq!(
            plan.undo_steps(2).as_slice(),
            &[(KEY_1, Action::Release), (LEFT_SHIFT, Action::Press)]
        );
        assert_eq!(plan.undo_steps(1).as_slice(), &[(LEFT_SHIFT, Action::Press)]);
        assert!(plan.undo_steps(plan.len()).is_empty());
    }

    #[test]
    fn test_undo_releases_shift_around_uppercase() {
        let plan = ReplacementPlan::for_symbol(Symbol('A'), &[]).unwrap();
        assert_eq!(
            plan.undo_steps(3).as_slice(),
            &[(LEFT_SHIFT, Action::Release)]
        );
    }
}
