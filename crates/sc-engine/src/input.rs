//! Cabinet Buttons
//!
//! Edge-latched input: the first press between ticks wins, later
//! presses are dropped until the tick consumes the latch.

use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

bitflags! {
    /// Pressed-button mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Buttons: u8 {
        /// Cycle the bet multiplier.
        const BET = 0b01;
        /// Start a spin.
        const SPIN = 0b10;
    }
}

/// Lock-free latch between input sources and the tick.
///
/// `press` stores only into an empty latch; the tick consumes the
/// whole latch with `take` exactly once at its start, so a press
/// accepted at any point lands in some tick and is never lost.
#[derive(Debug, Default)]
pub struct ButtonLatch {
    latched: AtomicU8,
}

impl ButtonLatch {
    pub fn new() -> Self {
        Self {
            latched: AtomicU8::new(0),
        }
    }

    /// Latch `buttons` if nothing is latched yet. Returns whether the
    /// press took.
    pub fn press(&self, buttons: Buttons) -> bool {
        if buttons.is_empty() {
            return false;
        }
        self.latched
            .compare_exchange(0, buttons.bits(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Currently latched buttons, without consuming them.
    pub fn peek(&self) -> Buttons {
        Buttons::from_bits_truncate(self.latched.load(Ordering::SeqCst))
    }

    /// Consume and reopen the latch in one step.
    pub fn take(&self) -> Buttons {
        Buttons::from_bits_truncate(self.latched.swap(0, Ordering::SeqCst))
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_press_wins() {
        let latch = ButtonLatch::new();

        assert!(latch.press(Buttons::BET));
        assert!(!latch.press(Buttons::SPIN));
        assert_eq!(latch.peek(), Buttons::BET);
    }

    #[test]
    fn test_take_consumes_and_reopens() {
        let latch = ButtonLatch::new();

        latch.press(Buttons::SPIN);
        assert_eq!(latch.take(), Buttons::SPIN);
        assert_eq!(latch.peek(), Buttons::empty());
        assert!(latch.press(Buttons::BET));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let latch = ButtonLatch::new();

        latch.press(Buttons::SPIN);
        assert_eq!(latch.peek(), Buttons::SPIN);
        assert_eq!(latch.peek(), Buttons::SPIN);
    }

    #[test]
    fn test_empty_press_is_ignored() {
        let latch = ButtonLatch::new();

        assert!(!latch.press(Buttons::empty()));
        assert!(latch.press(Buttons::SPIN));
    }
}
