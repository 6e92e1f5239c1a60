//! Game state: playfield, active piece, queue, score, pause and game over.

use crate::bag::{Bag, PieceQueue};
use crate::piece::{ActivePiece, TetrominoKind};
use crate::playfield::Playfield;

/// Points per lock indexed by rows cleared (0..=4).
const LINE_CLEAR_POINTS: [u32; 5] = [0, 100, 300, 500, 800];

/// Points awarded for clearing `lines` rows with one lock.
pub fn line_clear_points(lines: u32) -> u32 {
    LINE_CLEAR_POINTS
        .get(lines as usize)
        .copied()
        .unwrap_or(LINE_CLEAR_POINTS[4])
}

/// Game state: playfield, current piece, upcoming pieces, score, flags.
#[derive(Debug, Clone)]
pub struct GameState {
    playfield: Playfield,
    piece: ActivePiece,
    queue: PieceQueue,
    score: u32,
    lines_cleared: u32,
    game_over: bool,
    paused: bool,
}

impl GameState {
    /// Empty playfield, two bags queued, head of the queue already spawned.
    pub fn new(bag: Bag) -> Self {
        let mut queue = PieceQueue::new(bag);
        let kind = queue.advance();
        log::debug!("new game, first piece {}", kind.name());
        Self {
            playfield: Playfield::new(),
            piece: ActivePiece::spawn(kind),
            queue,
            score: 0,
            lines_cleared: 0,
            game_over: false,
            paused: false,
        }
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn piece(&self) -> &ActivePiece {
        &self.piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Kind that spawns after the active piece locks.
    pub fn next_kind(&self) -> TetrominoKind {
        self.queue.peek_next()
    }

    /// Next `n` kinds after the active piece. Does not touch the queue.
    pub fn upcoming(&self, n: usize) -> impl Iterator<Item = TetrominoKind> + '_ {
        self.queue.upcoming(n)
    }

    fn accepts_input(&self) -> bool {
        !self.game_over && !self.paused
    }

    /// Shift the piece by (dx, dy) if the target is free.
    pub fn move_by(&mut self, dx: i32, dy: i32) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let moved = self.piece.shifted(dx, dy);
        if self.playfield.is_collision(moved.x, moved.y, &moved.shape) {
            return false;
        }
        self.piece = moved;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.move_by(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.move_by(1, 0)
    }

    /// Rotate clockwise; wall kick order: in place, one left, one right.
    /// No floor kicks.
    pub fn rotate(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let landed = self
            .piece
            .rotation_candidates()
            .into_iter()
            .find(|c| !self.playfield.is_collision(c.x, c.y, &c.shape));
        match landed {
            Some(candidate) => {
                self.piece = candidate;
                true
            }
            None => false,
        }
    }

    /// One row down; locks the piece when blocked. False when it locked
    /// or the game does not accept input.
    pub fn soft_drop(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        if self.move_by(0, 1) {
            return true;
        }
        self.lock_and_spawn();
        false
    }

    /// Drop to the lowest free row below and lock.
    pub fn hard_drop(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        while self.move_by(0, 1) {}
        self.lock_and_spawn();
        true
    }

    /// Drop-timer callback.
    pub fn tick(&mut self) -> bool {
        self.soft_drop()
    }

    /// Flip pause. Has no effect once the game is over.
    pub fn toggle_pause(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        self.paused = !self.paused;
        log::debug!("paused: {}", self.paused);
        true
    }

    fn lock_and_spawn(&mut self) {
        let piece = self.piece;
        let outcome = self
            .playfield
            .lock(piece.x, piece.y, &piece.shape, piece.kind.color());
        self.playfield = outcome.playfield;
        log::debug!("locked {} at ({}, {})", piece.kind.name(), piece.x, piece.y);

        if outcome.top_overflow {
            self.game_over = true;
            log::info!("game over: piece locked above the top, score {}", self.score);
            return;
        }

        if outcome.lines_cleared > 0 {
            let points = line_clear_points(outcome.lines_cleared);
            self.score += points;
            self.lines_cleared += outcome.lines_cleared;
            log::info!("cleared {} line(s) for {} points", outcome.lines_cleared, points);
        }

        let next = ActivePiece::spawn(self.queue.advance());
        self.piece = next;
        if self.playfield.is_collision(next.x, next.y, &next.shape) {
            self.game_over = true;
            log::info!("game over: {} cannot spawn, score {}", next.kind.name(), self.score);
        }
    }
}

#[cfg(test)]
impl GameState {
    /// Test helper: replace the playfield and the active piece.
    pub(crate) fn set_board(&mut self, playfield: Playfield, piece: ActivePiece) {
        self.playfield = playfield;
        self.piece = piece;
    }
}
