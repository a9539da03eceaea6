//! Reel Strips and the Visible Window

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rng::FibonacciRng;

/// Rows visible in the window.
pub const WINDOW_ROWS: usize = 3;

/// Reels (columns) in the window.
pub const WINDOW_COLS: usize = 3;

/// Cells in the visible window.
pub const WINDOW_CELLS: usize = WINDOW_ROWS * WINDOW_COLS;

// ============ Symbols ============

/// One reel symbol, stored as its display byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub u8);

impl Symbol {
    pub const JACK: Symbol = Symbol(b'J');
    pub const QUEEN: Symbol = Symbol(b'Q');
    pub const KING: Symbol = Symbol(b'K');
    pub const ACE: Symbol = Symbol(b'A');

    /// Line payout for three of this symbol. Unknown symbols pay 0.
    pub fn payout_value(self) -> u32 {
        match self {
            Symbol::JACK => 10,
            Symbol::QUEEN => 25,
            Symbol::KING => 35,
            Symbol::ACE => 50,
            _ => 0,
        }
    }

    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============ Reel Strips ============

/// A cyclic strip of symbols with a window-read overhang.
///
/// The backing buffer stores the logical cycle plus a copy of its
/// first two symbols, so reading a three-row window at any stop
/// position never wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelStrip {
    symbols: Vec<Symbol>,
    len: usize,
    offset: usize,
}

impl ReelStrip {
    /// Rows duplicated past the cycle end.
    const OVERHANG: usize = WINDOW_ROWS - 1;

    /// Build from the logical cycle, e.g. `"JQAKQJAK"`.
    ///
    /// Panics if the cycle is shorter than the window height.
    pub fn from_cycle(cycle: &str) -> Self {
        assert!(
            cycle.len() >= WINDOW_ROWS,
            "reel cycle shorter than the window"
        );
        let mut symbols: Vec<Symbol> = cycle.bytes().map(Symbol).collect();
        let len = symbols.len();
        for i in 0..Self::OVERHANG {
            symbols.push(symbols[i]);
        }
        Self {
            symbols,
            len,
            offset: 0,
        }
    }

    /// Logical cycle length.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current stop position, always in `[0, len)`.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move the stop position forward by `step`.
    pub fn advance(&mut self, step: u8) {
        self.offset = (self.offset + step as usize) % self.len;
    }

    /// Symbol visible `row` positions below the stop.
    pub fn visible(&self, row: usize) -> Symbol {
        debug_assert!(row < WINDOW_ROWS);
        self.symbols[self.offset + row]
    }
}

// ============ Window ============

/// Row-major snapshot of the visible grid.
///
/// `cells[row * WINDOW_COLS + col]`; column `col` shows reel `col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub cells: [Symbol; WINDOW_CELLS],
}

impl Window {
    pub fn at(&self, row: usize, col: usize) -> Symbol {
        self.cells[row * WINDOW_COLS + col]
    }
}

// ============ Reel Bank ============

/// The three physical reels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelBank {
    strips: [ReelStrip; WINDOW_COLS],
}

impl ReelBank {
    pub fn new(strips: [ReelStrip; WINDOW_COLS]) -> Self {
        Self { strips }
    }

    /// The classic cabinet strips.
    pub fn classic() -> Self {
        Self::new([
            ReelStrip::from_cycle("JQAKQJAK"),
            ReelStrip::from_cycle("QAJQKJQKJ"),
            ReelStrip::from_cycle("KJAQKAQJA"),
        ])
    }

    /// Advance every reel by its own draw and snapshot the window.
    ///
    /// Draw order is reel 0, 1, 2, one step each.
    pub fn spin_step(&mut self, rng: &mut FibonacciRng) -> Window {
        for strip in &mut self.strips {
            strip.advance(rng.next_step());
        }
        self.window()
    }

    /// Snapshot the currently visible window without advancing.
    pub fn window(&self) -> Window {
        let mut cells = [Symbol(0); WINDOW_CELLS];
        for (col, strip) in self.strips.iter().enumerate() {
            for row in 0..WINDOW_ROWS {
                cells[row * WINDOW_COLS + col] = strip.visible(row);
            }
        }
        Window { cells }
    }

    pub fn strip(&self, col: usize) -> &ReelStrip {
        &self.strips[col]
    }
}

// ============ Tests ============
