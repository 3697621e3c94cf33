//! Snake
//!
//! 20x15 field, WASD steering, food placed by the RNG. Eating grows the
//! snake and speeds the game up slightly. Running into a wall or yourself
//! ends it.

use core::fmt::Write as FmtWrite;

use embassy_time::{Duration, Instant};
use heapless::{String, Vec};
use nanorand::{Rng, WyRand};

use crate::cprintln;
use crate::shell::console::{ansi, Console};

const WIDTH: i8 = 20;
const HEIGHT: i8 = 15;

/// Cell count of the field; a snake this long has won
pub const MAX_LEN: usize = (WIDTH as usize) * (HEIGHT as usize);

/// Whether a snake of this length fills the whole field.
pub fn field_full(body_len: usize) -> bool {
    body_len >= MAX_LEN
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// A 180 degree turn is ignored so the snake cannot reverse into
    /// itself.
    pub fn opposes(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

struct Game {
    /// Head first
    body: Vec<(i8, i8), MAX_LEN>,
    direction: Direction,
    food: (i8, i8),
    score: u32,
    rng: WyRand,
}

/// What one step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Moved,
    Ate,
    Died,
    /// The snake fills the field; nowhere left to place food
    Won,
}

impl Game {
    fn new() -> Self {
        let mut body = Vec::new();
        let _ = body.push((WIDTH / 2, HEIGHT / 2));
        let _ = body.push((WIDTH / 2 - 1, HEIGHT / 2));
        let _ = body.push((WIDTH / 2 - 2, HEIGHT / 2));
        let mut game = Self {
            body,
            direction: Direction::Right,
            food: (0, 0),
            score: 0,
            rng: WyRand::new_seed(Instant::now().as_ticks()),
        };
        game.place_food();
        game
    }

    /// Places food on a free cell. `false` when no cell is free.
    fn place_food(&mut self) -> bool {
        if field_full(self.body.len()) {
            return false;
        }
        loop {
            let spot = (
                (self.rng.generate::<u8>() % WIDTH as u8) as i8,
                (self.rng.generate::<u8>() % HEIGHT as u8) as i8,
            );
            if !self.body.contains(&spot) {
                self.food = spot;
                return true;
            }
        }
    }

    fn step(&mut self) -> Step {
        let (dx, dy) = self.direction.delta();
        let head = self.body[0];
        let next = (head.0 + dx, head.1 + dy);

        if next.0 < 0 || next.0 >= WIDTH || next.1 < 0 || next.1 >= HEIGHT {
            return Step::Died;
        }
        // The tail cell vacates this tick unless we eat
        let growing = next == self.food;
        let occupied = if growing {
            self.body.contains(&next)
        } else {
            self.body[..self.body.len() - 1].contains(&next)
        };
        if occupied {
            return Step::Died;
        }

        let _ = self.body.insert(0, next);
        if growing {
            self.score += 10;
            if !self.place_food() {
                return Step::Won;
            }
            Step::Ate
        } else {
            self.body.pop();
            Step::Moved
        }
    }

    fn tick_interval(&self) -> u64 {
        // Speeds up with every apple
        300u64.saturating_sub(self.score as u64 / 10 * 10).max(100)
    }
}

async fn draw(console: &mut Console, game: &Game) {
    let mut frame: String<768> = String::new();
    let _ = frame.push_str(ansi::HOME);
    let _ = write!(frame, "score {:>4}\r\n", game.score);

    let _ = frame.push('+');
    for _ in 0..WIDTH {
        let _ = frame.push('-');
    }
    let _ = frame.push_str("+\r\n");
    for row in 0..HEIGHT {
        let _ = frame.push('|');
        for col in 0..WIDTH {
            let cell = (col, row);
            let c = if cell == game.body[0] {
                '@'
            } else if game.body.contains(&cell) {
                'o'
            } else if cell == game.food {
                '*'
            } else {
                ' '
            };
            let _ = frame.push(c);
        }
        let _ = frame.push_str("|\r\n");
    }
    let _ = frame.push('+');
    for _ in 0..WIDTH {
        let _ = frame.push('-');
    }
    let _ = frame.push_str("+\r\n");
    let _ = frame.push_str("wasd to steer, q to quit\r\n");
    console.write(&frame).await;
}

/// Runs the game until the snake dies or the player quits.
pub async fn run(console: &mut Console) {
    console.clear_screen().await;
    console.write(ansi::HIDE_CURSOR).await;

    let mut game = Game::new();
    let mut last_tick = Instant::now();
    let mut won = false;

    'game: loop {
        draw(console, &game).await;

        if let Some(key) = console.poll_key(Duration::from_millis(50)).await {
            let wanted = match key {
                b'w' => Some(Direction::Up),
                b's' => Some(Direction::Down),
                b'a' => Some(Direction::Left),
                b'd' => Some(Direction::Right),
                b'q' => break 'game,
                _ => None,
            };
            if let Some(dir) = wanted {
                if !dir.opposes(game.direction) {
                    game.direction = dir;
                }
            }
        }

        if last_tick.elapsed() >= Duration::from_millis(game.tick_interval()) {
            last_tick = Instant::now();
            match game.step() {
                Step::Died => break 'game,
                Step::Won => {
                    won = true;
                    break 'game;
                }
                _ => {}
            }
        }
    }

    console.write(ansi::SHOW_CURSOR).await;
    cprintln!(console);
    if won {
        cprintln!(console, "you filled the whole field! score {}", game.score);
    } else {
        cprintln!(console, "final score: {}", game.score);
    }
}
