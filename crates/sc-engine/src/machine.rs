//! Cabinet State Machine
//!
//! One `tick` per timer period drives the whole cabinet: input, the
//! active phase, reel motion, payout, LEDs, persistence.

use serde::{Deserialize, Serialize};

use sc_flash::{NvRegion, RecordStore, SessionRecord, StoreError};

use crate::config::CabinetConfig;
use crate::input::{ButtonLatch, Buttons};
use crate::paytable::WinEvaluation;
use crate::reel::{ReelBank, Window};
use crate::render::{LedState, RenderModel};
use crate::rng::FibonacciRng;
use crate::session::{BET_LADDER, GamePhase, GameSession, MIN_STAKE, SessionStats, Status};

/// Noteworthy outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    /// Nothing of note.
    Idle,
    /// Bet multiplier cycled.
    BetCycled,
    /// Stake taken, reels set in motion.
    SpinStarted,
    /// Spin refused for lack of funds.
    InsufficientBalance,
    /// Reels advanced one step.
    Reeling,
    /// Spin settled with at least one winning line.
    SpinWon,
    /// Spin settled with no winning line.
    SpinLost,
    /// Balance fell below the minimum stake; cabinet locked.
    SessionEnded,
    /// A celebration or lockout countdown advanced.
    CountingDown,
    /// Session reset to the default balance.
    SessionReset,
}

/// Report returned by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub event: TickEvent,
    pub redraw: bool,
}

// ============ Slot Machine ============

/// The complete cabinet core.
///
/// Owns every subsystem; the host supplies the timer cadence, the
/// button latch, and a surface for the frames.
pub struct SlotMachine<R: NvRegion> {
    config: CabinetConfig,
    rng: FibonacciRng,
    reels: ReelBank,
    window: Window,
    eval: WinEvaluation,
    session: GameSession,
    stats: SessionStats,
    leds: LedState,
    store: RecordStore<R>,
}

impl<R: NvRegion> SlotMachine<R> {
    /// Bring the cabinet up with the classic reels.
    pub fn boot(config: CabinetConfig, store: RecordStore<R>) -> Result<Self, StoreError> {
        Self::boot_with_reels(config, store, ReelBank::classic())
    }

    /// Bring the cabinet up: restore the balance, land the reels on
    /// their first window, greet the player.
    pub fn boot_with_reels(
        config: CabinetConfig,
        mut store: RecordStore<R>,
        mut reels: ReelBank,
    ) -> Result<Self, StoreError> {
        let fallback = SessionRecord::new(config.default_balance);
        let outcome = store.restore(fallback)?;

        let mut rng = FibonacciRng::new();
        let window = reels.spin_step(&mut rng);

        log::info!("cabinet ready: balance {}", outcome.record.balance);

        Ok(Self {
            config,
            rng,
            reels,
            window,
            eval: WinEvaluation::no_win(),
            session: GameSession::new(outcome.record.balance),
            stats: SessionStats::default(),
            leds: LedState::default(),
            store,
        })
    }

    /// Run one timer period.
    ///
    /// Consumes the button latch once up front, handles the active
    /// phase, steps the LEDs, and persists the balance. A press landing
    /// mid-tick stays latched for the next tick. A storage fault aborts
    /// the tick and is fatal to the cabinet; game-rule outcomes never
    /// are.
    pub fn tick(&mut self, latch: &ButtonLatch) -> Result<TickReport, StoreError> {
        let buttons = latch.take();
        let mut redraw = false;

        let event = match self.session.phase {
            GamePhase::Idle => {
                if buttons.contains(Buttons::BET) {
                    self.session.cycle_bet();
                    redraw = true;
                    TickEvent::BetCycled
                } else if buttons.contains(Buttons::SPIN) {
                    redraw = true;
                    self.try_start_spin()
                } else {
                    TickEvent::Idle
                }
            }
            GamePhase::Spin => {
                self.window = self.reels.spin_step(&mut self.rng);
                redraw = true;
                self.session.countdown = self.session.countdown.saturating_sub(1);
                if self.session.countdown == 0 {
                    self.settle()
                } else {
                    TickEvent::Reeling
                }
            }
            GamePhase::Win => {
                redraw = true;
                self.session.countdown = self.session.countdown.saturating_sub(1);
                if self.session.countdown == 0 {
                    self.session.status = Status::WinAgain;
                    self.session.phase = GamePhase::Idle;
                }
                TickEvent::CountingDown
            }
            GamePhase::GameOver => {
                redraw = true;
                self.session.countdown = self.session.countdown.saturating_sub(1);
                if self.session.countdown == 0 {
                    self.reset_session();
                    TickEvent::SessionReset
                } else {
                    TickEvent::CountingDown
                }
            }
        };

        self.leds.step(self.session.countdown > 0);
        self.store.save(SessionRecord::new(self.session.balance))?;

        Ok(TickReport { event, redraw })
    }

    /// Snapshot the current frame.
    pub fn frame(&self) -> RenderModel {
        RenderModel {
            balance: self.session.balance,
            bet: self.session.bet,
            window: self.window,
            win_mask: self.eval.win_mask,
            phase: self.session.phase,
            countdown: self.session.countdown,
            status: self.session.status,
            leds: self.leds,
            stats: self.stats,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn evaluation(&self) -> &WinEvaluation {
        &self.eval
    }

    pub fn config(&self) -> &CabinetConfig {
        &self.config
    }

    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    fn try_start_spin(&mut self) -> TickEvent {
        let stake = self.session.stake();
        if self.session.balance < stake {
            self.session.status = Status::LowBalance;
            return TickEvent::InsufficientBalance;
        }

        self.session.balance -= stake;
        self.session.phase = GamePhase::Spin;
        self.session.countdown = self.config.spin_ticks;
        self.session.status = Status::Spinning;
        self.stats.record_spin(stake);
        log::debug!(
            "spin started: stake {}, balance {}",
            stake,
            self.session.balance
        );
        TickEvent::SpinStarted
    }

    fn settle(&mut self) -> TickEvent {
        self.eval = WinEvaluation::evaluate(&self.window);
        let winnings = self.eval.total_payout * self.session.bet;
        self.stats.record_outcome(self.eval.any_win(), winnings);

        if self.eval.any_win() {
            self.session.balance = self
                .session
                .balance
                .saturating_add(winnings)
                .min(self.config.max_balance);
            self.session.phase = GamePhase::Win;
            self.session.countdown = self.config.win_ticks;
            self.session.status = Status::WinBanner;
            log::info!(
                "win: {} line(s), {} credits at bet {}, balance {}",
                self.eval.won_lines,
                winnings,
                self.session.bet,
                self.session.balance
            );
            TickEvent::SpinWon
        } else if self.session.balance < MIN_STAKE {
            self.session.phase = GamePhase::GameOver;
            self.session.countdown = self.config.game_over_ticks;
            self.session.status = Status::GameOver;
            log::info!(
                "balance {} below minimum stake, game over",
                self.session.balance
            );
            TickEvent::SessionEnded
        } else {
            self.session.phase = GamePhase::Idle;
            self.session.status = Status::TryAgain;
            TickEvent::SpinLost
        }
    }

    fn reset_session(&mut self) {
        log::info!(
            "session reset: balance back to {}",
            self.config.default_balance
        );
        self.session.balance = self.config.default_balance;
        self.session.bet = BET_LADDER[0];
        self.session.status = Status::GoodLuck;
        self.session.phase = GamePhase::Idle;
    }
}

// ============ Tests ============
