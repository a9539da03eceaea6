//! Demo Autoplayer
//!
//! Presses the cabinet buttons by itself while enabled, for attract
//! loops and soak runs.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sc_engine::{ButtonLatch, Buttons, GamePhase};

pub struct Autoplayer {
    enabled: AtomicBool,
    rng: Mutex<StdRng>,
}

impl Autoplayer {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Flip autoplay; returns the new setting.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Maybe press something for the upcoming tick.
    ///
    /// Only acts while the cabinet sits idle: mostly spins, now and
    /// then fiddles with the bet, sometimes just watches.
    pub fn drive(&self, phase: GamePhase, latch: &ButtonLatch) {
        if !self.enabled() || phase != GamePhase::Idle {
            return;
        }

        let mut rng = self.rng.lock();
        if rng.random_ratio(1, 8) {
            latch.press(Buttons::BET);
        } else if rng.random_bool(0.7) {
            latch.press(Buttons::SPIN);
        }
    }
}

impl Default for Autoplayer {
    fn default() -> Self {
        Self::new()
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_player_never_presses() {
        let player = Autoplayer::new();
        let latch = ButtonLatch::new();

        for _ in 0..100 {
            player.drive(GamePhase::Idle, &latch);
        }
        assert_eq!(latch.peek(), Buttons::empty());
    }

    #[test]
    fn test_enabled_player_presses_eventually() {
        let player = Autoplayer::new();
        assert!(player.toggle());

        let latch = ButtonLatch::new();
        for _ in 0..1_000 {
            player.drive(GamePhase::Idle, &latch);
            if !latch.peek().is_empty() {
                return;
            }
        }
        panic!("autoplayer never pressed a button in 1000 chances");
    }

    #[test]
    fn test_player_waits_out_spins() {
        let player = Autoplayer::new();
        player.toggle();

        let latch = ButtonLatch::new();
        for _ in 0..100 {
            player.drive(GamePhase::Spin, &latch);
            player.drive(GamePhase::Win, &latch);
            player.drive(GamePhase::GameOver, &latch);
        }
        assert_eq!(latch.peek(), Buttons::empty());
    }
}
