//! Keyboard easter eggs: the Konami code and single-key effect triggers.

use std::collections::VecDeque;

pub const KONAMI_CODE: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "KeyB",
    "KeyA",
];

/// Sliding window over the most recent `KeyboardEvent.code` values.
#[derive(Debug, Default)]
pub struct KonamiDetector {
    recent: VecDeque<String>,
}

impl KonamiDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one key code; true when the sequence just completed (window resets).
    pub fn push(&mut self, code: &str) -> bool {
        self.recent.push_back(code.to_string());
        if self.recent.len() > KONAMI_CODE.len() {
            self.recent.pop_front();
        }
        let matched = self.recent.len() == KONAMI_CODE.len()
            && self.recent.iter().zip(KONAMI_CODE).all(|(a, b)| a == b);
        if matched {
            self.recent.clear();
        }
        matched
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    SpawnBlob,
    Confetti,
}

impl Shortcut {
    /// Map `KeyboardEvent.key`. Typing into a text field never triggers effects.
    pub fn from_key(key: &str, in_text_field: bool) -> Option<Shortcut> {
        if in_text_field {
            return None;
        }
        match key {
            "d" | "D" => Some(Shortcut::SpawnBlob),
            "c" | "C" => Some(Shortcut::Confetti),
            _ => None,
        }
    }

    /// DOM event announced for the presentation scripts.
    pub fn event_name(self) -> &'static str {
        match self {
            Shortcut::SpawnBlob => "dream:blob",
            Shortcut::Confetti => "dream:confetti",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_konami_detects_and_resets() {
        let mut d = KonamiDetector::new();
        d.push("KeyX");
        let hits: Vec<bool> = KONAMI_CODE.iter().map(|c| d.push(c)).collect();
        assert_eq!(hits.iter().filter(|h| **h).count(), 1);
        assert!(hits[9]);
        // the window was cleared, so the trailing "KeyA" cannot re-trigger
        assert!(!d.push("KeyA"));
    }

    #[test]
    fn test_konami_wrong_order() {
        let mut d = KonamiDetector::new();
        let mut codes = KONAMI_CODE;
        codes.swap(8, 9);
        assert!(!codes.iter().any(|c| d.push(c)));
    }

    #[test]
    fn test_single_key_shortcuts() {
        assert_eq!(Shortcut::from_key("d", false), Some(Shortcut::SpawnBlob));
        assert_eq!(Shortcut::from_key("C", false), Some(Shortcut::Confetti));
        assert_eq!(Shortcut::from_key("c", true), None);
        assert_eq!(Shortcut::from_key("x", false), None);
        assert_eq!(Shortcut::Confetti.event_name(), "dream:confetti");
    }
}
