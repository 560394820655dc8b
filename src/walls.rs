use std::collections::HashSet;

use ratatui::style::Color;

use crate::display::Display;
use crate::world::{Pos, Size};

const WALL_CHAR: char = '#';

/// The border of the board, fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walls {
    cells: HashSet<Pos>,
}

impl Walls {
    /// Full top and bottom rows, plus the outer columns of every row between.
    pub fn build(size: Size) -> Self {
        let (w, h) = (size.width as i32, size.height as i32);
        let mut cells = HashSet::with_capacity((2 * w + 2 * h).max(0) as usize);

        for x in 0..w {
            cells.insert(Pos::new(x, 0));
            cells.insert(Pos::new(x, h - 1));
        }
        for y in 1..h - 1 {
            cells.insert(Pos::new(0, y));
            cells.insert(Pos::new(w - 1, y));
        }

        Walls { cells }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn draw(&self, display: &mut impl Display) {
        for pos in &self.cells {
            display.set_cell(*pos, WALL_CHAR, Color::Red, Color::Reset);
        }
    }
}
