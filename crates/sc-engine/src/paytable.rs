//! Payline Geometry and Win Evaluation

use serde::{Deserialize, Serialize};

use crate::reel::{WINDOW_CELLS, Window};

/// Paylines evaluated per spin.
pub const PAYLINE_COUNT: usize = 5;

/// Cell indices of each payline: the three rows, then the two diagonals.
pub const PAYLINES: [[usize; 3]; PAYLINE_COUNT] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 4, 8],
    [6, 4, 2],
];

/// Outcome of a single payline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOutcome {
    /// All three cells carried the same symbol.
    pub matched: bool,
    /// Symbol value paid, before the bet multiplier.
    pub payout: u32,
}

/// Full evaluation of one visible window.
///
/// A line of three identical unknown symbols counts as won but pays 0,
/// like any symbol without a paytable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvaluation {
    pub lines: [LineOutcome; PAYLINE_COUNT],
    /// Cells sitting on at least one winning line.
    pub win_mask: [bool; WINDOW_CELLS],
    pub won_lines: u8,
    /// Sum of line payouts, before the bet multiplier.
    pub total_payout: u32,
}

impl WinEvaluation {
    /// Evaluate every payline of `window`.
    pub fn evaluate(window: &Window) -> Self {
        let mut result = Self::no_win();

        for (line, outcome) in PAYLINES.iter().zip(&mut result.lines) {
            let first = window.cells[line[0]];
            if line.iter().all(|&cell| window.cells[cell] == first) {
                outcome.matched = true;
                outcome.payout = first.payout_value();
                for &cell in line {
                    result.win_mask[cell] = true;
                }
                result.won_lines += 1;
                result.total_payout += outcome.payout;
            }
        }

        result
    }

    /// Evaluation with nothing won, the state before the first settle.
    pub fn no_win() -> Self {
        Self {
            lines: [LineOutcome {
                matched: false,
                payout: 0,
            }; PAYLINE_COUNT],
            win_mask: [false; WINDOW_CELLS],
            won_lines: 0,
            total_payout: 0,
        }
    }

    /// At least one line matched.
    pub fn any_win(&self) -> bool {
        self.won_lines > 0
    }
}

impl Default for WinEvaluation {
    fn default() -> Self {
        Self::no_win()
    }
}

// ============ Tests ============
