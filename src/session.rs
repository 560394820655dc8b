use std::sync::mpsc;
use std::sync::OnceLock;
use std::thread;

use log::{error, info, warn};
use rand::Rng;

use crate::config::GameConfig;
use crate::display::{Display, TerminalDisplay};
use crate::engine::Engine;
use crate::error::SnekError;
use crate::food::spawn_morsel;
use crate::input::{run_input_loop, EventSource, TerminalEvents};
use crate::walls::Walls;
use crate::world::SnekHaus;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    Crashed,
    BoardFull,
    Quit,
    Interrupted,
    Failed,
}

/// One-shot end-of-session signal shared by the engine and input loops.
///
/// The first `signal` wins; its reason is what both loops see.
#[derive(Debug, Default)]
pub struct SessionEnd {
    reason: OnceLock<EndReason>,
}

impl SessionEnd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the session had already ended.
    pub fn signal(&self, reason: EndReason) -> bool {
        self.reason.set(reason).is_ok()
    }

    pub fn reason(&self) -> Option<EndReason> {
        self.reason.get().copied()
    }
}

/// Plays one session on the real terminal and restores it afterwards.
pub fn run(config: GameConfig) -> Result<EndReason, SnekError> {
    let mut display = TerminalDisplay::new()?;
    let result = play(&mut display, TerminalEvents, config, rand::thread_rng());
    let restored = display.restore();
    info!("Terminal restored");

    let reason = result?;
    restored?;
    Ok(reason)
}

/// Draws the board, places the first morsel, then runs the input loop on its
/// own thread and the engine on this one until either ends the session.
pub fn play<D, E, R>(
    display: &mut D,
    mut events: E,
    config: GameConfig,
    mut rng: R,
) -> Result<EndReason, SnekError>
where
    D: Display,
    E: EventSource + Send,
    R: Rng,
{
    let size = display.size();
    if size.width < 3 || size.height < 3 {
        return Err(SnekError::TooSmall {
            width: size.width,
            height: size.height,
        });
    }

    let walls = Walls::build(size);
    walls.draw(display);

    let mut haus = SnekHaus::new(size, &config);
    if let Err(e) = spawn_morsel(&mut haus, config.spawn_attempts, &mut rng, display) {
        warn!("Cannot place the first morsel: {}", e);
        return Ok(EndReason::BoardFull);
    }
    info!(
        "Session start on {}x{} board, {} wall cells",
        size.width,
        size.height,
        walls.len()
    );

    let end = SessionEnd::new();
    let (tx, rx) = mpsc::channel();
    let poll = config.input_poll;

    thread::scope(|scope| {
        let end = &end;
        let input = scope.spawn(move || run_input_loop(&mut events, &tx, end, poll));

        let engine = Engine::new(haus, walls, config, display, rng);
        let outcome = engine.run(&rx, end);
        drop(rx);

        let input_outcome = input.join();
        let reason = outcome?;
        match input_outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Input loop failed: {}", e);
                return Err(SnekError::Terminal(e));
            }
            Err(_) => return Err(SnekError::InputThread),
        }

        info!("Session ended: {:?}", reason);
        Ok(reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Screen;
    use crate::world::{Pos, Size};
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Arc;
    use std::time::Duration;

    /// Hands out its events one per poll, then idles like a quiet keyboard.
    struct Keyboard {
        events: VecDeque<Event>,
    }

    impl Keyboard {
        fn pressing(codes: &[KeyCode]) -> Self {
            Keyboard {
                events: codes
                    .iter()
                    .map(|code| Event::Key(KeyEvent::new(*code, KeyModifiers::NONE)))
                    .collect(),
            }
        }
    }

    impl EventSource for Keyboard {
        fn poll_event(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
            match self.events.pop_front() {
                Some(event) => Ok(Some(event)),
                None => {
                    thread::sleep(timeout);
                    Ok(None)
                }
            }
        }
    }

    fn quick_config() -> GameConfig {
        GameConfig {
            initial_interval: Duration::from_millis(1),
            min_interval: Duration::from_millis(1),
            game_over_pause: Duration::ZERO,
            input_poll: Duration::from_millis(1),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_signal_is_single_fire() {
        let end = SessionEnd::new();
        assert_eq!(end.reason(), None);

        assert!(end.signal(EndReason::Quit));
        assert!(!end.signal(EndReason::Crashed));
        assert_eq!(end.reason(), Some(EndReason::Quit));
    }

    #[test]
    fn test_first_signal_wins_across_threads() {
        let end = Arc::new(SessionEnd::new());
        let handles: Vec<_> = [EndReason::Quit, EndReason::Crashed, EndReason::Interrupted]
            .into_iter()
            .map(|reason| {
                let end = Arc::clone(&end);
                thread::spawn(move || end.signal(reason))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(end.reason().is_some());
    }

    #[test]
    fn test_quit_key_ends_session() {
        let size = Size::new(20, 12);
        let mut screen = Screen::new(size);
        let config = GameConfig {
            initial_interval: Duration::from_secs(10),
            ..quick_config()
        };

        let reason = play(
            &mut screen,
            Keyboard::pressing(&[KeyCode::Esc]),
            config,
            StdRng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(reason, EndReason::Quit);
        assert_eq!(screen.glyph(Pos::new(0, 0)), Some('#'));
        assert_eq!(screen.glyph(size.center()), Some('@'));
    }

    #[test]
    fn test_crash_ends_session_and_stops_input() {
        let size = Size::new(20, 5);
        let mut screen = Screen::new(size);

        let reason = play(
            &mut screen,
            Keyboard::pressing(&[]),
            quick_config(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(reason, EndReason::Crashed);
        assert!(screen.rows()[2].contains("Game Over!"));
    }

    #[test]
    fn test_too_small_board_is_rejected() {
        let mut screen = Screen::new(Size::new(2, 8));

        let result = play(
            &mut screen,
            Keyboard::pressing(&[]),
            quick_config(),
            StdRng::seed_from_u64(5),
        );

        assert!(matches!(
            result,
            Err(SnekError::TooSmall {
                width: 2,
                height: 8
            })
        ));
    }

    #[test]
    fn test_no_room_for_first_morsel() {
        let mut screen = Screen::new(Size::new(3, 3));

        let reason = play(
            &mut screen,
            Keyboard::pressing(&[]),
            quick_config(),
            StdRng::seed_from_u64(5),
        )
        .unwrap();

        assert_eq!(reason, EndReason::BoardFull);
    }
}
