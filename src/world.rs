use std::collections::VecDeque;
use std::time::Duration;

use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub fn new(width: u16, height: u16) -> Self {
        Size { width, height }
    }

    pub fn center(&self) -> Pos {
        Pos::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    /// Interior cells are everything not on the border.
    pub fn is_interior(&self, pos: Pos) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && pos.x <= self.width as i32 - 2
            && pos.y <= self.height as i32 - 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PosDelta {
    pub x: i32,
    pub y: i32,
}

impl From<Direction> for PosDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => PosDelta { x: 0, y: -1 },
            Direction::Down => PosDelta { x: 0, y: 1 },
            Direction::Left => PosDelta { x: -1, y: 0 },
            Direction::Right => PosDelta { x: 1, y: 0 },
        }
    }
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn offset(&self, delta: PosDelta) -> Pos {
        Pos {
            x: self.x + delta.x,
            y: self.y + delta.y,
        }
    }
}

/// The snake, head at the front of the deque and tail at the back.
#[derive(Clone, Debug, PartialEq)]
pub struct Snek {
    body: VecDeque<Pos>,
}

impl Snek {
    pub fn new(head: Pos) -> Self {
        Snek {
            body: VecDeque::from([head]),
        }
    }

    /// Builds a snake from explicit segments, head first.
    #[cfg(test)]
    pub fn from_segments(segments: impl IntoIterator<Item = Pos>) -> Self {
        let body: VecDeque<Pos> = segments.into_iter().collect();
        assert!(!body.is_empty(), "a snek needs at least a head");
        Snek { body }
    }

    pub fn head(&self) -> Pos {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Pos> + '_ {
        self.body.iter()
    }

    pub fn occupies(&self, pos: Pos) -> bool {
        self.body.contains(&pos)
    }

    /// True when `pos` hits any segment except the current head.
    pub fn would_collide_with_body(&self, pos: Pos) -> bool {
        self.body.iter().skip(1).any(|segment| *segment == pos)
    }

    /// Pushes `new_head` and drops the tail, returning the vacated cell.
    pub fn slither(&mut self, new_head: Pos) -> Pos {
        self.body.push_front(new_head);
        // Length was >= 1 before the push, so there is always a tail to drop.
        self.body.pop_back().unwrap_or(new_head)
    }

    /// Re-attaches a previously dropped tail cell.
    pub fn grow(&mut self, tail: Pos) {
        self.body.push_back(tail);
    }
}

/// The whole mutable world of one session.
#[derive(Debug)]
pub struct SnekHaus {
    pub size: Size,
    pub snek: Snek,
    pub morsels: Vec<Pos>,
    pub heading: Direction,
    pub interval: Duration,
    /// Set once a heading change has been accepted for the current tick.
    pub steered: bool,
}

impl SnekHaus {
    pub fn new(size: Size, config: &GameConfig) -> Self {
        SnekHaus {
            size,
            snek: Snek::new(size.center()),
            morsels: Vec::new(),
            heading: Direction::Up,
            interval: config.initial_interval,
            steered: false,
        }
    }

    /// Applies a heading change unless one was already taken this tick or it
    /// would reverse a snake longer than one segment.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if self.steered {
            return false;
        }
        if self.snek.len() > 1 && direction == self.heading.opposite() {
            return false;
        }
        self.heading = direction;
        self.steered = true;
        true
    }

    pub fn speed_up(&mut self, config: &GameConfig) {
        self.interval = self
            .interval
            .saturating_sub(config.speed_step)
            .max(config.min_interval);
    }

    pub fn slow_down(&mut self, config: &GameConfig) {
        self.interval = self.interval.saturating_add(config.speed_step);
    }

    /// Removes one morsel at `pos`, if any.
    pub fn nom(&mut self, pos: Pos) -> bool {
        match self.morsels.iter().position(|m| *m == pos) {
            Some(index) => {
                self.morsels.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haus_with(segments: &[Pos], heading: Direction) -> SnekHaus {
        let config = GameConfig::default();
        let mut haus = SnekHaus::new(Size::new(10, 10), &config);
        haus.snek = Snek::from_segments(segments.iter().copied());
        haus.heading = heading;
        haus
    }

    #[test]
    fn test_opposite_directions() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);

        for dir in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_all_directions() {
        let pos = Pos::new(5, 5);

        assert_eq!(pos.offset(Direction::Up.into()), Pos::new(5, 4));
        assert_eq!(pos.offset(Direction::Down.into()), Pos::new(5, 6));
        assert_eq!(pos.offset(Direction::Left.into()), Pos::new(4, 5));
        assert_eq!(pos.offset(Direction::Right.into()), Pos::new(6, 5));
    }

    #[test]
    fn test_new_haus_starts_centered() {
        let config = GameConfig::default();
        let haus = SnekHaus::new(Size::new(20, 11), &config);

        assert_eq!(haus.snek.len(), 1);
        assert_eq!(haus.snek.head(), Pos::new(10, 5));
        assert_eq!(haus.heading, Direction::Up);
        assert_eq!(haus.interval, config.initial_interval);
        assert!(!haus.steered);
        assert!(haus.morsels.is_empty());
    }

    #[test]
    fn test_interior() {
        let size = Size::new(5, 5);
        assert!(size.is_interior(Pos::new(1, 1)));
        assert!(size.is_interior(Pos::new(3, 3)));
        assert!(!size.is_interior(Pos::new(0, 2)));
        assert!(!size.is_interior(Pos::new(4, 2)));
        assert!(!size.is_interior(Pos::new(2, 4)));
    }

    #[test]
    fn test_slither_and_grow() {
        let mut snek = Snek::from_segments([Pos::new(2, 2), Pos::new(2, 3), Pos::new(2, 4)]);

        let vacated = snek.slither(Pos::new(2, 1));
        assert_eq!(vacated, Pos::new(2, 4));
        assert_eq!(snek.len(), 3);
        assert_eq!(snek.head(), Pos::new(2, 1));
        assert!(!snek.occupies(Pos::new(2, 4)));

        snek.grow(vacated);
        let body: Vec<Pos> = snek.segments().copied().collect();
        assert_eq!(body, vec![Pos::new(2, 1), Pos::new(2, 2), Pos::new(2, 3), Pos::new(2, 4)]);
    }

    #[test]
    fn test_collision_detection() {
        let snek = Snek::from_segments([Pos::new(5, 5), Pos::new(5, 6), Pos::new(6, 6)]);

        assert!(snek.would_collide_with_body(Pos::new(5, 6)));
        assert!(snek.would_collide_with_body(Pos::new(6, 6)));
        assert!(!snek.would_collide_with_body(Pos::new(5, 5))); // head
        assert!(!snek.would_collide_with_body(Pos::new(4, 6)));
    }

    #[test]
    fn test_single_segment_accepts_any_heading() {
        for (from, to) in [
            (Direction::Up, Direction::Down),
            (Direction::Down, Direction::Up),
            (Direction::Left, Direction::Right),
            (Direction::Right, Direction::Left),
        ] {
            let mut haus = haus_with(&[Pos::new(5, 5)], from);
            assert!(haus.steer(to));
            assert_eq!(haus.heading, to);
        }
    }

    #[test]
    fn test_reverse_rejected_for_longer_snek() {
        let mut haus = haus_with(&[Pos::new(2, 2), Pos::new(2, 3), Pos::new(2, 4)], Direction::Up);

        assert!(!haus.steer(Direction::Down));
        assert_eq!(haus.heading, Direction::Up);
        assert!(!haus.steered, "rejected change must not latch");
    }

    #[test]
    fn test_latch_blocks_second_change() {
        let mut haus = haus_with(&[Pos::new(2, 2), Pos::new(2, 3), Pos::new(2, 4)], Direction::Up);

        assert!(haus.steer(Direction::Left));
        // Down would be legal from Left, but the tick already has its change.
        assert!(!haus.steer(Direction::Down));
        assert_eq!(haus.heading, Direction::Left);
    }

    #[test]
    fn test_same_heading_latches_once() {
        let mut haus = haus_with(&[Pos::new(2, 2), Pos::new(2, 1), Pos::new(2, 0)], Direction::Down);

        assert!(haus.steer(Direction::Down));
        assert_eq!(haus.heading, Direction::Down);
        assert!(haus.steered);
        assert!(!haus.steer(Direction::Down));
    }

    #[test]
    fn test_speed_up_is_clamped() {
        let config = GameConfig::default();
        let mut haus = SnekHaus::new(Size::new(10, 10), &config);

        haus.speed_up(&config);
        assert_eq!(haus.interval, config.initial_interval - config.speed_step);

        haus.interval = config.min_interval;
        haus.speed_up(&config);
        assert_eq!(haus.interval, config.min_interval);

        haus.interval = config.min_interval + config.speed_step / 2;
        haus.speed_up(&config);
        assert_eq!(haus.interval, config.min_interval);
    }

    #[test]
    fn test_slow_down_has_no_ceiling() {
        let config = GameConfig::default();
        let mut haus = SnekHaus::new(Size::new(10, 10), &config);

        for _ in 0..100 {
            haus.slow_down(&config);
        }
        assert_eq!(haus.interval, config.initial_interval + config.speed_step * 100);
    }

    #[test]
    fn test_nom_removes_exactly_one() {
        let config = GameConfig::default();
        let mut haus = SnekHaus::new(Size::new(10, 10), &config);
        haus.morsels = vec![Pos::new(3, 3), Pos::new(4, 4), Pos::new(3, 3)];

        assert!(haus.nom(Pos::new(3, 3)));
        assert_eq!(haus.morsels, vec![Pos::new(4, 4), Pos::new(3, 3)]);

        assert!(!haus.nom(Pos::new(7, 7)));
        assert_eq!(haus.morsels.len(), 2);
    }
}
