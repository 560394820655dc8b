use std::io;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::{debug, info};

use crate::session::{EndReason, SessionEnd};
use crate::world::Direction;

/// What the input loop asks the engine to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    SpeedUp,
    SlowDown,
    SpawnFood,
    Quit,
    /// Ctrl+C, which raw mode delivers as a key instead of a signal
    Interrupt,
}

impl Command {
    /// The session end this command causes, if any.
    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            Command::Quit => Some(EndReason::Quit),
            Command::Interrupt => Some(EndReason::Interrupted),
            _ => None,
        }
    }
}

pub fn translate(event: &Event) -> Option<Command> {
    let Event::Key(key) = event else {
        return None;
    };
    // Only presses; some platforms also report releases and repeats
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Interrupt);
    }

    match key.code {
        KeyCode::Esc => Some(Command::Quit),
        KeyCode::Up => Some(Command::Steer(Direction::Up)),
        KeyCode::Down => Some(Command::Steer(Direction::Down)),
        KeyCode::Left => Some(Command::Steer(Direction::Left)),
        KeyCode::Right => Some(Command::Steer(Direction::Right)),
        KeyCode::Char('+') => Some(Command::SpeedUp),
        KeyCode::Char('-') => Some(Command::SlowDown),
        KeyCode::Char('n') => Some(Command::SpawnFood),
        _ => None,
    }
}

/// Where input events come from.
pub trait EventSource {
    /// Waits up to `timeout` for the next event.
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

/// Events from the terminal via crossterm.
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Forwards commands to the engine until the session ends.
///
/// Polls with `poll` as timeout so a session ended elsewhere is noticed
/// promptly. On quit, signals `end` before forwarding the command.
pub fn run_input_loop(
    source: &mut impl EventSource,
    commands: &Sender<Command>,
    end: &SessionEnd,
    poll: Duration,
) -> io::Result<()> {
    loop {
        if let Some(reason) = end.reason() {
            debug!("Input loop stopping: {:?}", reason);
            return Ok(());
        }

        let event = match source.poll_event(poll) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                end.signal(EndReason::Failed);
                return Err(e);
            }
        };
        let Some(command) = translate(&event) else {
            continue;
        };

        if let Some(reason) = command.end_reason() {
            info!("Input requested {:?}", reason);
            end.signal(reason);
            // The engine may already be gone, which is fine when quitting
            let _ = commands.send(command);
            return Ok(());
        }

        if commands.send(command).is_err() {
            debug!("Engine gone, input loop stopping");
            return Ok(());
        }
    }
}
