use rand::seq::SliceRandom;
use rand::Rng;
use ratatui::style::Color;

use crate::display::Display;
use crate::error::SpawnError;
use crate::world::{Pos, Size, Snek, SnekHaus};

const MORSEL_CHAR: char = '♥';

/// Places a new morsel on a free cell and draws it.
pub fn spawn_morsel(
    haus: &mut SnekHaus,
    attempts: usize,
    rng: &mut impl Rng,
    display: &mut impl Display,
) -> Result<Pos, SpawnError> {
    let pos = pick_free_cell(haus.size, &haus.snek, attempts, rng)?;
    haus.morsels.push(pos);
    display.set_cell(pos, MORSEL_CHAR, Color::LightRed, Color::Reset);
    Ok(pos)
}

/// Picks a uniformly random interior cell the snek is not on.
///
/// Tries `attempts` random samples first, which almost always succeeds on a
/// roomy board, then falls back to choosing from the full list of free cells.
/// Fails only when the snek covers every interior cell.
pub fn pick_free_cell(
    size: Size,
    snek: &Snek,
    attempts: usize,
    rng: &mut impl Rng,
) -> Result<Pos, SpawnError> {
    let (w, h) = (size.width as i32, size.height as i32);
    if w < 3 || h < 3 {
        return Err(SpawnError::NoFreeCell);
    }

    for _ in 0..attempts {
        let pos = Pos::new(rng.gen_range(1..w - 1), rng.gen_range(1..h - 1));
        if !snek.occupies(pos) {
            return Ok(pos);
        }
    }

    let free: Vec<Pos> = (0..h)
        .flat_map(|y| (0..w).map(move |x| Pos::new(x, y)))
        .filter(|pos| size.is_interior(*pos) && !snek.occupies(*pos))
        .collect();
    free.choose(rng).copied().ok_or(SpawnError::NoFreeCell)
}
