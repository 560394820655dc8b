use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;
use ratatui::style::Color;

use crate::config::GameConfig;
use crate::display::{print_at, Display};
use crate::food::spawn_morsel;
use crate::input::Command;
use crate::session::{EndReason, SessionEnd};
use crate::walls::Walls;
use crate::world::{Pos, SnekHaus};

const SNEK_CHAR: char = '@';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Running,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Moved,
    /// Ate a morsel and a replacement was placed
    Nommed { length: usize },
    /// Ate a morsel but there is nowhere left to put another
    BoardFull,
    Crashed { at: Pos },
    /// The engine is already over; nothing moved
    Stopped,
}

/// Owns the world and advances it one tick at a time.
pub struct Engine<'d, D: Display, R: Rng> {
    haus: SnekHaus,
    walls: Walls,
    config: GameConfig,
    display: &'d mut D,
    rng: R,
    phase: Phase,
}

impl<'d, D: Display, R: Rng> Engine<'d, D, R> {
    pub fn new(haus: SnekHaus, walls: Walls, config: GameConfig, display: &'d mut D, rng: R) -> Self {
        Engine {
            haus,
            walls,
            config,
            display,
            rng,
            phase: Phase::Running,
        }
    }

    #[cfg(test)]
    pub fn haus(&self) -> &SnekHaus {
        &self.haus
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Applies one command from the input loop. Returns a reason when the
    /// command ends the session.
    pub fn apply(&mut self, command: Command) -> Option<EndReason> {
        match command {
            Command::Steer(direction) => {
                if self.haus.steer(direction) {
                    debug!("Heading {:?}", direction);
                }
            }
            Command::SpeedUp => {
                self.haus.speed_up(&self.config);
                info!("Speed up, tick interval now {:?}", self.haus.interval);
            }
            Command::SlowDown => {
                self.haus.slow_down(&self.config);
                info!("Slow down, tick interval now {:?}", self.haus.interval);
            }
            Command::SpawnFood => {
                match spawn_morsel(
                    &mut self.haus,
                    self.config.spawn_attempts,
                    &mut self.rng,
                    &mut *self.display,
                ) {
                    Ok(pos) => info!("Extra morsel at {:?}", pos),
                    Err(e) => warn!("Extra morsel skipped: {}", e),
                }
            }
            Command::Quit | Command::Interrupt => return command.end_reason(),
        }
        None
    }

    /// Moves the snek one cell along its heading and resolves what it hit.
    pub fn step(&mut self) -> StepResult {
        if self.phase == Phase::Over {
            return StepResult::Stopped;
        }

        let new_head = self.haus.snek.head().offset(self.haus.heading.into());
        self.haus.steered = false;

        // Checked against the body before it shifts, so the tail still counts.
        if self.walls.contains(new_head) || self.haus.snek.would_collide_with_body(new_head) {
            self.phase = Phase::Over;
            return StepResult::Crashed { at: new_head };
        }

        let old_tail = self.haus.snek.slither(new_head);

        if self.haus.nom(new_head) {
            self.haus.snek.grow(old_tail);
            self.haus.speed_up(&self.config);
            match spawn_morsel(
                &mut self.haus,
                self.config.spawn_attempts,
                &mut self.rng,
                &mut *self.display,
            ) {
                Ok(_) => StepResult::Nommed {
                    length: self.haus.snek.len(),
                },
                Err(_) => {
                    self.phase = Phase::Over;
                    StepResult::BoardFull
                }
            }
        } else {
            self.display
                .set_cell(old_tail, ' ', Color::Reset, Color::Reset);
            StepResult::Moved
        }
    }

    pub fn draw_snek(&mut self) -> io::Result<()> {
        for pos in self.haus.snek.segments() {
            self.display
                .set_cell(*pos, SNEK_CHAR, Color::White, Color::Reset);
        }
        self.display.flush()
    }

    /// Runs ticks until the snek crashes, the board fills up, or the session
    /// is ended from elsewhere. Signals `end` on the way out.
    pub fn run(mut self, commands: &Receiver<Command>, end: &SessionEnd) -> io::Result<EndReason> {
        let reason = self.run_ticks(commands, end);
        let reason = match reason {
            Ok(reason) => reason,
            Err(e) => {
                end.signal(EndReason::Failed);
                return Err(e);
            }
        };
        end.signal(reason);
        Ok(reason)
    }

    fn run_ticks(&mut self, commands: &Receiver<Command>, end: &SessionEnd) -> io::Result<EndReason> {
        loop {
            self.draw_snek()?;

            if let Some(reason) = self.wait_tick(commands, end) {
                info!("Engine stopping: {:?}", reason);
                return Ok(reason);
            }

            match self.step() {
                StepResult::Moved => {}
                StepResult::Nommed { length } => {
                    info!(
                        "Nom! length {} tick interval {:?}",
                        length, self.haus.interval
                    );
                }
                StepResult::Crashed { at } => {
                    info!("Crashed at {:?} with length {}", at, self.haus.snek.len());
                    self.show_banner("Game Over!")?;
                    return Ok(EndReason::Crashed);
                }
                StepResult::BoardFull => {
                    warn!("No free cell left for a morsel, ending session");
                    self.show_banner("Board Full!")?;
                    return Ok(EndReason::BoardFull);
                }
                StepResult::Stopped => return Ok(EndReason::Crashed),
            }
        }
    }

    /// Sleeps out the current tick while applying commands as they arrive.
    fn wait_tick(&mut self, commands: &Receiver<Command>, end: &SessionEnd) -> Option<EndReason> {
        let deadline = Instant::now() + self.haus.interval;
        loop {
            if let Some(reason) = end.reason() {
                return Some(reason);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match commands.recv_timeout(remaining) {
                Ok(command) => {
                    if let Some(reason) = self.apply(command) {
                        return Some(end.reason().unwrap_or(reason));
                    }
                }
                Err(RecvTimeoutError::Timeout) => return None,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Input channel closed");
                    return Some(end.reason().unwrap_or(EndReason::Quit));
                }
            }
        }
    }

    fn show_banner(&mut self, text: &str) -> io::Result<()> {
        let size = self.haus.size;
        let len = text.chars().count() as i32;
        let at = Pos::new(size.width as i32 / 2 - len / 2, size.height as i32 / 2);
        print_at(&mut *self.display, at, text, Color::Red);
        self.display.flush()?;
        thread::sleep(self.config.game_over_pause);
        Ok(())
    }
}
