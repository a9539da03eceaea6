//! Render Model and Frame Handoff
//!
//! The tick side builds a self-contained [`RenderModel`] per frame and
//! publishes it through [`FrameHandoff`]; the drawing side paints it
//! onto any [`Surface`]. The surface never reads live game state.

use std::sync::atomic::{AtomicBool, Ordering};

use bitflags::bitflags;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::reel::{WINDOW_CELLS, WINDOW_COLS, WINDOW_ROWS, Window};
use crate::session::{GamePhase, SessionStats, Status};

bitflags! {
    /// Text draw attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TextStyle: u8 {
        /// Replace the cell background.
        const OVERWRITE = 0b001;
        /// Swap foreground and background.
        const INVERT = 0b010;
        /// Draw dimmed.
        const GRAYSCALE = 0b100;
    }
}

/// Drawing capability the cabinet renders through.
pub trait Surface {
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at pixel `(x, y)`.
    fn print_at(&mut self, text: &str, x: u16, y: u16, style: TextStyle);
}

// Fixed layout on the cabinet's 138x110 pixel panel.
const INFO_POS: (u16, u16) = (0, 0);
const CELL_X0: u16 = 35;
const CELL_DX: u16 = 32;
const CELL_Y0: u16 = 20;
const CELL_DY: u16 = 20;
const STATUS_POS: (u16, u16) = (0, 80);
const BET_POS: (u16, u16) = (0, 98);
const SPIN_POS: (u16, u16) = (111, 98);

// ============ Panel LEDs ============

/// The two panel LEDs beside the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedState {
    pub led1: bool,
    pub led2: bool,
}

impl LedState {
    /// Advance the blink pattern by one tick.
    ///
    /// While animating, a dark panel lights the first LED, then both
    /// toggle every tick, giving the alternating chase. Off otherwise.
    pub fn step(&mut self, animating: bool) {
        if animating && !self.led1 && !self.led2 {
            self.led1 = true;
        } else if animating {
            self.led1 = !self.led1;
            self.led2 = !self.led2;
        } else {
            self.led1 = false;
            self.led2 = false;
        }
    }
}

// ============ Render Model ============

/// Complete description of one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderModel {
    pub balance: u32,
    pub bet: u32,
    pub window: Window,
    pub win_mask: [bool; WINDOW_CELLS],
    pub phase: GamePhase,
    pub countdown: u8,
    pub status: Status,
    pub leds: LedState,
    pub stats: SessionStats,
}

impl RenderModel {
    /// Paint the full frame onto `surface`.
    ///
    /// Blink phases follow countdown parity, so they advance at the
    /// tick cadence: reels flash while spinning, the status banner and
    /// win cells flash in opposite phases during a win, the status
    /// flashes during game over.
    pub fn draw(&self, surface: &mut impl Surface) {
        let parity = self.countdown % 2 == 1;
        let mut style_info = TextStyle::OVERWRITE;
        let mut style_slot = TextStyle::OVERWRITE;
        let mut style_slotwin = TextStyle::OVERWRITE;
        let mut style_status = TextStyle::OVERWRITE;

        match self.phase {
            GamePhase::Idle => {
                style_info = TextStyle::INVERT | TextStyle::OVERWRITE;
                style_status = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
            }
            GamePhase::Spin => {
                style_info = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
                style_status = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
                if parity {
                    style_slot = TextStyle::INVERT | TextStyle::OVERWRITE;
                }
            }
            GamePhase::Win => {
                style_info = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
                style_slot = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
                if parity {
                    style_status = TextStyle::INVERT | TextStyle::OVERWRITE;
                } else {
                    style_slotwin = TextStyle::INVERT | TextStyle::OVERWRITE;
                }
            }
            GamePhase::GameOver => {
                style_info = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
                style_slot = TextStyle::GRAYSCALE | TextStyle::OVERWRITE;
                if parity {
                    style_status = TextStyle::INVERT | TextStyle::OVERWRITE;
                }
            }
        }

        surface.clear();
        surface.print_at(
            &format!("Balance: {}", self.balance),
            INFO_POS.0,
            INFO_POS.1,
            style_info,
        );

        for row in 0..WINDOW_ROWS {
            for col in 0..WINDOW_COLS {
                let cell = row * WINDOW_COLS + col;
                let style = if self.phase == GamePhase::Win && self.win_mask[cell] {
                    style_slotwin
                } else {
                    style_slot
                };
                surface.print_at(
                    &self.window.at(row, col).to_string(),
                    CELL_X0 + col as u16 * CELL_DX,
                    CELL_Y0 + row as u16 * CELL_DY,
                    style,
                );
            }
        }

        surface.print_at(self.status.text(), STATUS_POS.0, STATUS_POS.1, style_status);
        surface.print_at(
            &format!("Bet: {}x5", self.bet),
            BET_POS.0,
            BET_POS.1,
            style_info,
        );
        surface.print_at("SPIN", SPIN_POS.0, SPIN_POS.1, style_info);
    }
}

// ============ Frame Handoff ============

/// Double-buffered frame handoff between the tick and the drawer.
///
/// The tick publishes a full snapshot and raises the dirty flag; the
/// drawer takes the flag down, clones the frame out, and paints
/// outside the lock.
#[derive(Debug, Default)]
pub struct FrameHandoff {
    frame: Mutex<Option<RenderModel>>,
    dirty: AtomicBool,
}

impl FrameHandoff {
    pub fn new() -> Self {
        Self {
            frame: Mutex::new(None),
            dirty: AtomicBool::new(false),
        }
    }

    /// Publish a fresh frame and mark it pending.
    pub fn publish(&self, model: RenderModel) {
        *self.frame.lock() = Some(model);
        self.dirty.store(true, Ordering::Release);
    }

    /// Take the pending frame, if any.
    pub fn take(&self) -> Option<RenderModel> {
        if !self.dirty.swap(false, Ordering::Acquire) {
            return None;
        }
        self.frame.lock().clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reel::Symbol;

    #[derive(Default)]
    struct StubSurface {
        cleared: usize,
        calls: Vec<(String, u16, u16, TextStyle)>,
    }

    impl Surface for StubSurface {
        fn clear(&mut self) {
            self.cleared += 1;
        }

        fn print_at(&mut self, text: &str, x: u16, y: u16, style: TextStyle) {
            self.calls.push((text.to_string(), x, y, style));
        }
    }

    fn model(phase: GamePhase, countdown: u8) -> RenderModel {
        RenderModel {
            balance: 100,
            bet: 1,
            window: Window {
                cells: [Symbol::JACK; WINDOW_CELLS],
            },
            win_mask: [false; WINDOW_CELLS],
            phase,
            countdown,
            status: Status::GoodLuck,
            leds: LedState::default(),
            stats: SessionStats::default(),
        }
    }

    fn find<'a>(surface: &'a StubSurface, text: &str) -> &'a (String, u16, u16, TextStyle) {
        surface
            .calls
            .iter()
            .find(|(t, _, _, _)| t == text)
            .unwrap_or_else(|| panic!("nothing drew {text:?}"))
    }

    #[test]
    fn test_idle_frame_layout() {
        let mut surface = StubSurface::default();
        model(GamePhase::Idle, 0).draw(&mut surface);

        assert_eq!(surface.cleared, 1);

        let header = find(&surface, "Balance: 100");
        assert_eq!((header.1, header.2), (0, 0));
        assert_eq!(header.3, TextStyle::INVERT | TextStyle::OVERWRITE);

        let status = find(&surface, "Good luck");
        assert_eq!((status.1, status.2), (0, 80));
        assert_eq!(status.3, TextStyle::GRAYSCALE | TextStyle::OVERWRITE);

        let bet = find(&surface, "Bet: 1x5");
        assert_eq!((bet.1, bet.2), (0, 98));

        let spin = find(&surface, "SPIN");
        assert_eq!((spin.1, spin.2), (111, 98));
    }

    #[test]
    fn test_cells_land_on_grid() {
        let mut surface = StubSurface::default();
        model(GamePhase::Idle, 0).draw(&mut surface);

        let cells: Vec<_> = surface.calls.iter().filter(|(t, _, _, _)| t == "J").collect();
        assert_eq!(cells.len(), WINDOW_CELLS);
        assert!(cells.iter().any(|c| (c.1, c.2) == (35, 20)));
        assert!(cells.iter().any(|c| (c.1, c.2) == (67, 40)));
        assert!(cells.iter().any(|c| (c.1, c.2) == (99, 60)));
    }

    #[test]
    fn test_spin_cells_flash_on_odd_ticks() {
        let mut surface = StubSurface::default();
        model(GamePhase::Spin, 3).draw(&mut surface);
        let cell = find(&surface, "J");
        assert_eq!(cell.3, TextStyle::INVERT | TextStyle::OVERWRITE);

        let mut surface = StubSurface::default();
        model(GamePhase::Spin, 2).draw(&mut surface);
        let cell = find(&surface, "J");
        assert_eq!(cell.3, TextStyle::OVERWRITE);
    }

    #[test]
    fn test_spin_chrome_is_dimmed() {
        let mut spinning = model(GamePhase::Spin, 3);
        spinning.status = Status::Spinning;

        let mut surface = StubSurface::default();
        spinning.draw(&mut surface);

        let header = find(&surface, "Balance: 100");
        assert_eq!(header.3, TextStyle::GRAYSCALE | TextStyle::OVERWRITE);

        let status = find(&surface, "Spinning...");
        assert_eq!(status.3, TextStyle::GRAYSCALE | TextStyle::OVERWRITE);
    }

    #[test]
    fn test_game_over_dims_board_and_flashes_status() {
        let mut over = model(GamePhase::GameOver, 3);
        over.status = Status::GameOver;

        let mut surface = StubSurface::default();
        over.draw(&mut surface);

        let header = find(&surface, "Balance: 100");
        assert_eq!(header.3, TextStyle::GRAYSCALE | TextStyle::OVERWRITE);

        let cell = find(&surface, "J");
        assert_eq!(cell.3, TextStyle::GRAYSCALE | TextStyle::OVERWRITE);

        // odd countdown inverts the status, even leaves it plain
        let status = find(&surface, "GAME OVER");
        assert_eq!(status.3, TextStyle::INVERT | TextStyle::OVERWRITE);

        over.countdown = 2;
        let mut surface = StubSurface::default();
        over.draw(&mut surface);
        let status = find(&surface, "GAME OVER");
        assert_eq!(status.3, TextStyle::OVERWRITE);
    }

    #[test]
    fn test_win_cells_flash_opposite_to_banner() {
        let mut won = model(GamePhase::Win, 6);
        won.status = Status::WinBanner;
        won.win_mask[0] = true;
        won.win_mask[1] = true;
        won.win_mask[2] = true;

        let mut surface = StubSurface::default();
        won.draw(&mut surface);

        // even countdown: banner plain, win cells inverted, rest dimmed
        let banner = find(&surface, "WIN WIN WIN WIN");
        assert_eq!(banner.3, TextStyle::OVERWRITE);

        let top_left = surface
            .calls
            .iter()
            .find(|(t, x, y, _)| t == "J" && (*x, *y) == (35, 20))
            .unwrap();
        assert_eq!(top_left.3, TextStyle::INVERT | TextStyle::OVERWRITE);

        let bottom_left = surface
            .calls
            .iter()
            .find(|(t, x, y, _)| t == "J" && (*x, *y) == (35, 60))
            .unwrap();
        assert_eq!(bottom_left.3, TextStyle::GRAYSCALE | TextStyle::OVERWRITE);
    }

    #[test]
    fn test_led_chase() {
        let mut leds = LedState::default();

        leds.step(true);
        assert_eq!((leds.led1, leds.led2), (true, false));
        leds.step(true);
        assert_eq!((leds.led1, leds.led2), (false, true));
        leds.step(true);
        assert_eq!((leds.led1, leds.led2), (true, false));

        leds.step(false);
        assert_eq!((leds.led1, leds.led2), (false, false));
    }

    #[test]
    fn test_handoff_take_once() {
        let handoff = FrameHandoff::new();
        assert!(handoff.take().is_none());

        handoff.publish(model(GamePhase::Idle, 0));
        assert!(handoff.is_dirty());

        let frame = handoff.take();
        assert!(frame.is_some());
        assert!(!handoff.is_dirty());
        assert!(handoff.take().is_none());
    }
}
