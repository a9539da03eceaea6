//! ANSI Terminal Surface
//!
//! Maps the panel's pixel layout onto a character grid and repaints it
//! in place with escape sequences. Invert renders as reverse video,
//! grayscale as dim.

use std::io::Write;

use sc_engine::{Surface, TextStyle};

// Character cell size in panel pixels.
const CELL_W: u16 = 8;
const CELL_H: u16 = 18;

const GRID_ROWS: usize = 7;
const GRID_COLS: usize = 26;

pub struct TermSurface {
    cells: Vec<Vec<(char, TextStyle)>>,
    footer: String,
    primed: bool,
}

impl TermSurface {
    pub fn new() -> Self {
        Self {
            cells: vec![vec![(' ', TextStyle::empty()); GRID_COLS]; GRID_ROWS],
            footer: String::new(),
            primed: false,
        }
    }

    /// Replace the line shown under the panel. Survives `clear`.
    pub fn set_footer(&mut self, text: &str) {
        self.footer.clear();
        self.footer.push_str(text);
    }

    /// Repaint the whole grid in place.
    pub fn flush(&mut self) -> std::io::Result<()> {
        let mut out = String::with_capacity(GRID_ROWS * GRID_COLS * 8);
        if !self.primed {
            out.push_str("\x1b[2J");
            self.primed = true;
        }
        out.push_str("\x1b[H");

        for row in &self.cells {
            for &(ch, style) in row {
                if style.contains(TextStyle::INVERT) {
                    out.push_str("\x1b[7m");
                }
                if style.contains(TextStyle::GRAYSCALE) {
                    out.push_str("\x1b[2m");
                }
                out.push(ch);
                if style.intersects(TextStyle::INVERT | TextStyle::GRAYSCALE) {
                    out.push_str("\x1b[0m");
                }
            }
            out.push_str("\x1b[K\r\n");
        }
        out.push_str(&self.footer);
        out.push_str("\x1b[K\r\n");

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(out.as_bytes())?;
        stdout.flush()
    }
}

impl Default for TermSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for TermSurface {
    fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill((' ', TextStyle::empty()));
        }
    }

    fn print_at(&mut self, text: &str, x: u16, y: u16, style: TextStyle) {
        let row = (y / CELL_H) as usize;
        if row >= GRID_ROWS {
            return;
        }
        let col = (x / CELL_W) as usize;
        for (i, ch) in text.chars().enumerate() {
            let col = col + i;
            if col >= GRID_COLS {
                break;
            }
            self.cells[row][col] = (ch, style);
        }
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rows_map_to_distinct_lines() {
        let mut surface = TermSurface::new();
        surface.print_at("A", 0, 0, TextStyle::OVERWRITE);
        surface.print_at("B", 0, 20, TextStyle::OVERWRITE);
        surface.print_at("C", 0, 80, TextStyle::OVERWRITE);
        surface.print_at("D", 0, 98, TextStyle::OVERWRITE);

        assert_eq!(surface.cells[0][0].0, 'A');
        assert_eq!(surface.cells[1][0].0, 'B');
        assert_eq!(surface.cells[4][0].0, 'C');
        assert_eq!(surface.cells[5][0].0, 'D');
    }

    #[test]
    fn test_reel_columns_do_not_collide() {
        let mut surface = TermSurface::new();
        surface.print_at("J", 35, 20, TextStyle::OVERWRITE);
        surface.print_at("Q", 67, 20, TextStyle::OVERWRITE);
        surface.print_at("K", 99, 20, TextStyle::OVERWRITE);

        let line: String = surface.cells[1].iter().map(|&(ch, _)| ch).collect();
        let drawn: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(drawn, ['J', 'Q', 'K']);
    }

    #[test]
    fn test_overflow_is_clipped() {
        let mut surface = TermSurface::new();
        surface.print_at("WAY TOO LONG FOR THE LAST COLUMN", 200, 0, TextStyle::OVERWRITE);
        surface.print_at("X", 0, 4_000, TextStyle::OVERWRITE);
        // nothing to assert beyond not panicking; the grid is intact
        assert_eq!(surface.cells.len(), GRID_ROWS);
    }
}
