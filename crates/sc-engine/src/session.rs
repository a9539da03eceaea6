//! Session State and Status Line

use serde::{Deserialize, Serialize};

/// Bet multipliers in cycling order.
pub const BET_LADDER: [u32; 3] = [1, 5, 10];

/// Paylines staked per spin; the stake of a spin is `bet × PAYLINES_STAKED`.
pub const PAYLINES_STAKED: u32 = 5;

/// Cheapest possible spin: the lowest bet across all paylines.
pub const MIN_STAKE: u32 = BET_LADDER[0] * PAYLINES_STAKED;

// ============ Phase ============

/// Lifecycle phase of the cabinet. Exactly one is active; a tick
/// handles the active phase only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for input.
    Idle,
    /// Reels in motion, countdown running.
    Spin,
    /// Win celebration, countdown running.
    Win,
    /// Balance exhausted, countdown to the session reset.
    GameOver,
}

// ============ Status Line ============

/// Status line shown under the reels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    GoodLuck,
    Spinning,
    LowBalance,
    WinBanner,
    GameOver,
    TryAgain,
    WinAgain,
}

impl Status {
    pub fn text(self) -> &'static str {
        match self {
            Status::GoodLuck => "Good luck",
            Status::Spinning => "Spinning...",
            Status::LowBalance => "Low balance",
            Status::WinBanner => "WIN WIN WIN WIN",
            Status::GameOver => "GAME OVER",
            Status::TryAgain => "Try again",
            Status::WinAgain => "Win again",
        }
    }
}

// ============ Session ============

/// Mutable session state threaded through the machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub balance: u32,
    pub bet: u32,
    pub phase: GamePhase,
    pub countdown: u8,
    pub status: Status,
}

impl GameSession {
    pub fn new(balance: u32) -> Self {
        Self {
            balance,
            bet: BET_LADDER[0],
            phase: GamePhase::Idle,
            countdown: 0,
            status: Status::GoodLuck,
        }
    }

    /// Cost of one spin at the current bet.
    pub fn stake(&self) -> u32 {
        self.bet * PAYLINES_STAKED
    }

    /// Cycle the bet multiplier 1 → 5 → 10 → 1.
    pub fn cycle_bet(&mut self) {
        let pos = BET_LADDER.iter().position(|&b| b == self.bet).unwrap_or(0);
        self.bet = BET_LADDER[(pos + 1) % BET_LADDER.len()];
    }
}

// ============ Stats ============

/// Lifetime counters for the running process. Not persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    pub wins: u64,
    pub losses: u64,
    pub total_wagered: u64,
    pub total_won: u64,
    pub best_payout: u64,
}

impl SessionStats {
    pub fn record_spin(&mut self, stake: u32) {
        self.spins += 1;
        self.total_wagered += u64::from(stake);
    }

    pub fn record_outcome(&mut self, won: bool, winnings: u32) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.total_won += u64::from(winnings);
        self.best_payout = self.best_payout.max(u64::from(winnings));
    }

    /// Fraction of spins that won anything.
    pub fn hit_rate(&self) -> f64 {
        if self.spins == 0 {
            return 0.0;
        }
        self.wins as f64 / self.spins as f64
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bet_cycles_through_ladder() {
        let mut session = GameSession::new(100);
        assert_eq!(session.bet, 1);
        session.cycle_bet();
        assert_eq!(session.bet, 5);
        session.cycle_bet();
        assert_eq!(session.bet, 10);
        session.cycle_bet();
        assert_eq!(session.bet, 1);
    }

    #[test]
    fn test_stake_covers_all_paylines() {
        let mut session = GameSession::new(100);
        assert_eq!(session.stake(), 5);
        session.cycle_bet();
        assert_eq!(session.stake(), 25);
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.record_spin(5);
        stats.record_outcome(true, 50);
        stats.record_spin(5);
        stats.record_outcome(false, 0);

        assert_eq!(stats.spins, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.total_wagered, 10);
        assert_eq!(stats.total_won, 50);
        assert_eq!(stats.best_payout, 50);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(Status::WinBanner.text(), "WIN WIN WIN WIN");
        assert_eq!(Status::GameOver.text(), "GAME OVER");
        assert_eq!(Status::Spinning.text(), "Spinning...");
    }
}
