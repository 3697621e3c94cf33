//! Tetris
//!
//! Classic falling blocks on a 10x20 well, drawn with ANSI cursor homing so
//! the frame repaints in place. Controls: a/d move, w rotate, s soft drop,
//! q quit. Clearing several lines at once scores quadratically and the fall
//! speed creeps up as lines clear.

use core::fmt::Write as FmtWrite;

use embassy_time::{Duration, Instant};
use heapless::String;
use nanorand::{Rng, WyRand};

use crate::cprintln;
use crate::shell::console::{ansi, Console};

const WIDTH: usize = 10;
const HEIGHT: usize = 20;

/// Piece shapes as offsets from the pivot; rotations are computed
const SHAPES: [[(i8, i8); 4]; 7] = [
    [(-1, 0), (0, 0), (1, 0), (2, 0)],  // I
    [(0, 0), (1, 0), (0, 1), (1, 1)],   // O
    [(-1, 0), (0, 0), (1, 0), (0, 1)],  // T
    [(0, 0), (1, 0), (-1, 1), (0, 1)],  // S
    [(-1, 0), (0, 0), (0, 1), (1, 1)],  // Z
    [(-1, 0), (0, 0), (1, 0), (1, 1)],  // J
    [(-1, 0), (0, 0), (1, 0), (-1, 1)], // L
];

type Board = [[bool; WIDTH]; HEIGHT];

/// Cell offsets of a piece at the given rotation.
pub fn cells(kind: usize, rotation: u8) -> [(i8, i8); 4] {
    let mut cells = SHAPES[kind % 7];
    if kind == 1 {
        // The O piece does not rotate
        return cells;
    }
    for _ in 0..rotation % 4 {
        for cell in &mut cells {
            *cell = (-cell.1, cell.0);
        }
    }
    cells
}

/// Whether the piece would overlap a wall, the floor or settled blocks.
pub fn collides(board: &Board, kind: usize, rotation: u8, x: i8, y: i8) -> bool {
    cells(kind, rotation).iter().any(|(dx, dy)| {
        let cx = x + dx;
        let cy = y + dy;
        if cx < 0 || cx >= WIDTH as i8 || cy >= HEIGHT as i8 {
            return true;
        }
        cy >= 0 && board[cy as usize][cx as usize]
    })
}

fn merge(board: &mut Board, kind: usize, rotation: u8, x: i8, y: i8) {
    for (dx, dy) in cells(kind, rotation) {
        let cx = x + dx;
        let cy = y + dy;
        if (0..WIDTH as i8).contains(&cx) && (0..HEIGHT as i8).contains(&cy) {
            board[cy as usize][cx as usize] = true;
        }
    }
}

/// Removes full rows, returning how many were cleared.
pub fn clear_lines(board: &mut Board) -> u32 {
    let mut cleared = 0;
    let mut row = HEIGHT;
    while row > 0 {
        row -= 1;
        if board[row].iter().all(|&c| c) {
            cleared += 1;
            for r in (1..=row).rev() {
                board[r] = board[r - 1];
            }
            board[0] = [false; WIDTH];
            row += 1;
        }
    }
    cleared
}

struct Game {
    board: Board,
    kind: usize,
    rotation: u8,
    x: i8,
    y: i8,
    score: u32,
    lines: u32,
    rng: WyRand,
}

impl Game {
    fn new() -> Self {
        let mut rng = WyRand::new_seed(Instant::now().as_ticks());
        let kind = (rng.generate::<u8>() % 7) as usize;
        Self {
            board: [[false; WIDTH]; HEIGHT],
            kind,
            rotation: 0,
            x: WIDTH as i8 / 2,
            y: 0,
            score: 0,
            lines: 0,
            rng,
        }
    }

    /// Locks the current piece and spawns the next. `false` means game over.
    fn lock_and_spawn(&mut self) -> bool {
        merge(&mut self.board, self.kind, self.rotation, self.x, self.y);
        let cleared = clear_lines(&mut self.board);
        self.lines += cleared;
        self.score += cleared * cleared * 100;

        self.kind = (self.rng.generate::<u8>() % 7) as usize;
        self.rotation = 0;
        self.x = WIDTH as i8 / 2;
        self.y = 0;
        !collides(&self.board, self.kind, self.rotation, self.x, self.y)
    }

    fn fall_interval(&self) -> u64 {
        // Starts at 600ms per row, 40ms faster per 5 cleared lines
        600u64.saturating_sub(self.lines as u64 / 5 * 40).max(120)
    }

    fn try_move(&mut self, dx: i8, dy: i8) -> bool {
        if collides(&self.board, self.kind, self.rotation, self.x + dx, self.y + dy) {
            return false;
        }
        self.x += dx;
        self.y += dy;
        true
    }

    fn try_rotate(&mut self) {
        let next = (self.rotation + 1) % 4;
        if !collides(&self.board, self.kind, next, self.x, self.y) {
            self.rotation = next;
        }
    }
}

async fn draw(console: &mut Console, game: &Game) {
    let mut frame: String<1024> = String::new();
    let _ = frame.push_str(ansi::HOME);
    let _ = write!(frame, "score {:>6}  lines {:>3}\r\n", game.score, game.lines);

    let piece = cells(game.kind, game.rotation);
    for row in 0..HEIGHT {
        let _ = frame.push('|');
        for col in 0..WIDTH {
            let on_piece = piece.iter().any(|(dx, dy)| {
                game.x + dx == col as i8 && game.y + dy == row as i8
            });
            let _ = frame.push(if on_piece || game.board[row][col] {
                '#'
            } else {
                ' '
            });
        }
        let _ = frame.push_str("|\r\n");
    }
    let _ = frame.push('+');
    for _ in 0..WIDTH {
        let _ = frame.push('-');
    }
    let _ = frame.push_str("+\r\n");
    let _ = frame.push_str("a/d move  w rotate  s drop  q quit\r\n");
    console.write(&frame).await;
}

/// Runs the game until the well fills or the player quits.
pub async fn run(console: &mut Console) {
    console.clear_screen().await;
    console.write(ansi::HIDE_CURSOR).await;

    let mut game = Game::new();
    let mut last_fall = Instant::now();

    loop {
        draw(console, &game).await;

        if let Some(key) = console.poll_key(Duration::from_millis(50)).await {
            match key {
                b'a' => {
                    game.try_move(-1, 0);
                }
                b'd' => {
                    game.try_move(1, 0);
                }
                b'w' => game.try_rotate(),
                b's' => {
                    if !game.try_move(0, 1) && !game.lock_and_spawn() {
                        break;
                    }
                    last_fall = Instant::now();
                }
                b'q' => {
                    game_over(console, &game, true).await;
                    return;
                }
                _ => {}
            }
        }

        if last_fall.elapsed() >= Duration::from_millis(game.fall_interval()) {
            last_fall = Instant::now();
            if !game.try_move(0, 1) && !game.lock_and_spawn() {
                break;
            }
        }
    }
    game_over(console, &game, false).await;
}

async fn game_over(console: &mut Console, game: &Game, quit: bool) {
    console.write(ansi::SHOW_CURSOR).await;
    cprintln!(console);
    if quit {
        cprintln!(console, "quit with score {}", game.score);
    } else {
        cprintln!(console, "game over! score {} ({} lines)", game.score, game.lines);
    }
}
