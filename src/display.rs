use std::io::{self, Stdout};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::Widget,
    Terminal,
};

use crate::world::{Pos, Size};

/// Somewhere the game can put glyphs.
pub trait Display {
    fn size(&self) -> Size;

    /// Cells outside the display are silently dropped.
    fn set_cell(&mut self, pos: Pos, glyph: char, fg: Color, bg: Color);

    fn flush(&mut self) -> io::Result<()>;
}

/// Writes `text` left to right starting at `pos`, one glyph per cell.
pub fn print_at(display: &mut impl Display, pos: Pos, text: &str, fg: Color) {
    for (i, ch) in text.chars().enumerate() {
        display.set_cell(Pos::new(pos.x + i as i32, pos.y), ch, fg, Color::Reset);
    }
}

/// An off-screen cell grid.
#[derive(Debug, Clone)]
pub struct Screen {
    buffer: Buffer,
}

impl Screen {
    pub fn new(size: Size) -> Self {
        Screen {
            buffer: Buffer::empty(Rect::new(0, 0, size.width, size.height)),
        }
    }
}

#[cfg(test)]
impl Screen {
    /// The glyph at `pos`, or `None` off the grid.
    pub fn glyph(&self, pos: Pos) -> Option<char> {
        let (x, y) = to_cell(pos)?;
        self.buffer
            .cell((x, y))
            .and_then(|cell| cell.symbol().chars().next())
    }

    pub fn fg(&self, pos: Pos) -> Option<Color> {
        let (x, y) = to_cell(pos)?;
        self.buffer.cell((x, y)).map(|cell| cell.fg)
    }

    /// Every row as a string, handy for eyeballing a frame in a failing test.
    pub fn rows(&self) -> Vec<String> {
        let area = self.buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| self.glyph(Pos::new(x as i32, y as i32)).unwrap_or(' '))
                    .collect()
            })
            .collect()
    }
}

impl Display for Screen {
    fn size(&self) -> Size {
        Size::new(self.buffer.area.width, self.buffer.area.height)
    }

    fn set_cell(&mut self, pos: Pos, glyph: char, fg: Color, bg: Color) {
        let Some((x, y)) = to_cell(pos) else {
            return;
        };
        if let Some(cell) = self.buffer.cell_mut((x, y)) {
            cell.set_char(glyph).set_fg(fg).set_bg(bg);
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Widget for &Screen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let ours = self.buffer.area;
        for y in area.top()..area.bottom().min(ours.bottom()) {
            for x in area.left()..area.right().min(ours.right()) {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x, y)), buf.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
    }
}

fn to_cell(pos: Pos) -> Option<(u16, u16)> {
    Some((u16::try_from(pos.x).ok()?, u16::try_from(pos.y).ok()?))
}

/// The real terminal: raw mode, alternate screen, hidden cursor.
///
/// Dropping it restores the terminal if [`TerminalDisplay::restore`] was not
/// called, so a panic in the game loop does not leave the shell in raw mode.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    screen: Screen,
    restored: bool,
}

impl TerminalDisplay {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        match Self::enter() {
            Ok(display) => Ok(display),
            Err(e) => {
                if let Err(cleanup) = leave() {
                    warn!("Cleanup after failed terminal setup also failed: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let (width, height) = terminal::size()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        info!("Terminal ready at {}x{}", width, height);

        Ok(TerminalDisplay {
            terminal,
            screen: Screen::new(Size::new(width, height)),
            restored: false,
        })
    }

    pub fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        leave()?;
        self.terminal.show_cursor()
    }
}

fn leave() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

impl Display for TerminalDisplay {
    fn size(&self) -> Size {
        self.screen.size()
    }

    fn set_cell(&mut self, pos: Pos, glyph: char, fg: Color, bg: Color) {
        self.screen.set_cell(pos, glyph, fg, bg);
    }

    fn flush(&mut self) -> io::Result<()> {
        let screen = &self.screen;
        self.terminal
            .draw(|frame| frame.render_widget(screen, frame.area()))?;
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if !self.restored {
            if let Err(e) = leave() {
                warn!("Failed to restore terminal: {}", e);
            }
        }
    }
}
