//! Playfield: the locked-cell grid, collision queries, locking and line clears.

use crate::piece::{PieceColor, Shape};

pub const WIDTH: usize = 10;
pub const HEIGHT: usize = 20;

/// Single cell: empty or the colour of the piece that locked there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceColor),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

pub type Row = [Cell; WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; WIDTH];

/// Grid of locked cells. y=0 is top; rows[0] is the top row.
///
/// A `Playfield` is a value: [`Playfield::lock`] returns a new grid and leaves
/// `self` untouched, so a half-applied lock is never observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playfield {
    rows: [Row; HEIGHT],
}

/// Result of writing a piece into the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    pub playfield: Playfield,
    /// Full rows removed (0..=4).
    pub lines_cleared: u32,
    /// Some occupied cell was above row 0; the board is finished.
    pub top_overflow: bool,
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Playfield {
    pub fn new() -> Self {
        Self {
            rows: [EMPTY_ROW; HEIGHT],
        }
    }

    pub fn width(&self) -> usize {
        WIDTH
    }

    pub fn height(&self) -> usize {
        HEIGHT
    }

    /// Cell at (x, y); `None` outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows.get(y as usize).and_then(|row| row.get(x as usize)).copied()
    }

    pub fn rows(&self) -> &[Row; HEIGHT] {
        &self.rows
    }

    /// True if `shape` placed with its top-left corner at (x, y) leaves the
    /// walls or floor or overlaps a locked cell. Cells above the top edge
    /// only have their column checked.
    pub fn is_collision(&self, x: i32, y: i32, shape: &Shape) -> bool {
        shape.cells().any(|(dx, dy)| {
            let (cx, cy) = (x + dx, y + dy);
            if cx < 0 || cx >= WIDTH as i32 || cy >= HEIGHT as i32 {
                return true;
            }
            if cy < 0 {
                return false;
            }
            self.get(cx, cy).is_some_and(Cell::is_filled)
        })
    }

    /// Write `shape` at (x, y) in `color`, then drop every full row.
    ///
    /// On top overflow the visible cells are still written but no rows are
    /// cleared.
    pub fn lock(&self, x: i32, y: i32, shape: &Shape, color: PieceColor) -> LockOutcome {
        let mut rows = self.rows;
        let mut top_overflow = false;
        for (dx, dy) in shape.cells() {
            let (cx, cy) = (x + dx, y + dy);
            if cy < 0 {
                top_overflow = true;
                continue;
            }
            if let Some(cell) = rows.get_mut(cy as usize).and_then(|row| row.get_mut(cx as usize)) {
                *cell = Cell::Filled(color);
            }
        }

        if top_overflow {
            return LockOutcome {
                playfield: Self { rows },
                lines_cleared: 0,
                top_overflow,
            };
        }

        let kept: Vec<Row> = rows
            .iter()
            .filter(|row| !row.iter().all(|c| c.is_filled()))
            .copied()
            .collect();
        let cleared = HEIGHT - kept.len();
        let mut cleared_rows = [EMPTY_ROW; HEIGHT];
        cleared_rows[cleared..].copy_from_slice(&kept);

        LockOutcome {
            playfield: Self { rows: cleared_rows },
            lines_cleared: cleared as u32,
            top_overflow: false,
        }
    }
}

#[cfg(test)]
impl Playfield {
    /// Test helper: fill row `y` except the listed columns.
    pub(crate) fn with_row_filled_except(mut self, y: usize, holes: &[usize]) -> Self {
        for (x, cell) in self.rows[y].iter_mut().enumerate() {
            *cell = if holes.contains(&x) {
                Cell::Empty
            } else {
                Cell::Filled(PieceColor::Red)
            };
        }
        self
    }

    pub(crate) fn with_cell(mut self, x: usize, y: usize, color: PieceColor) -> Self {
        self.rows[y][x] = Cell::Filled(color);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::TetrominoKind;

    fn filled_count(p: &Playfield) -> usize {
        p.rows().iter().flatten().filter(|c| c.is_filled()).count()
    }

    #[test]
    fn test_new_is_empty() {
        let p = Playfield::new();
        assert_eq!(p.height(), HEIGHT);
        assert_eq!(p.width(), WIDTH);
        assert_eq!(filled_count(&p), 0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let p = Playfield::new();
        assert_eq!(p.get(-1, 0), None);
        assert_eq!(p.get(0, -1), None);
        assert_eq!(p.get(WIDTH as i32, 0), None);
        assert_eq!(p.get(0, HEIGHT as i32), None);
        assert_eq!(p.get(0, 0), Some(Cell::Empty));
    }

    #[test]
    fn test_no_collision_inside_empty_grid() {
        let p = Playfield::new();
        for kind in TetrominoKind::ALL {
            assert!(!p.is_collision(3, 0, &kind.base_shape()), "{kind:?}");
            assert!(!p.is_collision(3, 10, &kind.base_shape()), "{kind:?}");
        }
    }

    #[test]
    fn test_collision_with_walls_and_floor() {
        let p = Playfield::new();
        let o = TetrominoKind::O.base_shape();
        assert!(p.is_collision(-1, 5, &o));
        assert!(p.is_collision(WIDTH as i32 - 1, 5, &o));
        assert!(p.is_collision(0, HEIGHT as i32 - 1, &o));
        assert!(!p.is_collision(0, HEIGHT as i32 - 2, &o));
        assert!(!p.is_collision(WIDTH as i32 - 2, 5, &o));
    }

    #[test]
    fn test_empty_columns_of_shape_may_hang_outside() {
        // Vertical I occupies column 1 of its 4x4 box only.
        let p = Playfield::new();
        let i = TetrominoKind::I.base_shape();
        assert!(!p.is_collision(-1, 0, &i));
        assert!(p.is_collision(-2, 0, &i));
    }

    #[test]
    fn test_above_top_only_checks_columns() {
        let p = Playfield::new().with_cell(4, 0, PieceColor::Red);
        let o = TetrominoKind::O.base_shape();
        // Both rows above the grid: no occupancy check.
        assert!(!p.is_collision(4, -2, &o));
        // Still bounded horizontally.
        assert!(p.is_collision(-1, -2, &o));
        // Lower row reaches the filled cell.
        assert!(p.is_collision(4, -1, &o));
    }

    #[test]
    fn test_collision_with_locked_cell() {
        let p = Playfield::new().with_cell(5, 10, PieceColor::Blue);
        let o = TetrominoKind::O.base_shape();
        assert!(p.is_collision(4, 9, &o));
        assert!(!p.is_collision(6, 9, &o));
    }

    #[test]
    fn test_lock_writes_color_without_mutating_original() {
        let p = Playfield::new();
        let o = TetrominoKind::O.base_shape();
        let out = p.lock(0, 18, &o, PieceColor::Yellow);
        assert_eq!(out.lines_cleared, 0);
        assert!(!out.top_overflow);
        assert_eq!(out.playfield.get(0, 18), Some(Cell::Filled(PieceColor::Yellow)));
        assert_eq!(out.playfield.get(1, 19), Some(Cell::Filled(PieceColor::Yellow)));
        assert_eq!(filled_count(&p), 0);
    }

    #[test]
    fn test_lock_clears_single_row() {
        // Bottom row full except columns 4 and 5; a marker sits just above.
        let p = Playfield::new()
            .with_row_filled_except(HEIGHT - 1, &[4, 5])
            .with_cell(0, HEIGHT - 2, PieceColor::Green);
        let o = TetrominoKind::O.base_shape();
        let out = p.lock(4, HEIGHT as i32 - 2, &o, PieceColor::Yellow);
        assert_eq!(out.lines_cleared, 1);
        assert_eq!(out.playfield.height(), HEIGHT);
        // Top row is fresh and empty.
        assert!(out.playfield.rows()[0].iter().all(|c| *c == Cell::Empty));
        // What was row 18 slid down to row 19: marker + O's upper half.
        let bottom = &out.playfield.rows()[HEIGHT - 1];
        assert_eq!(bottom[0], Cell::Filled(PieceColor::Green));
        assert_eq!(bottom[4], Cell::Filled(PieceColor::Yellow));
        assert_eq!(bottom[5], Cell::Filled(PieceColor::Yellow));
        assert_eq!(filled_count(&out.playfield), 3);
    }

    #[test]
    fn test_lock_clears_four_rows_with_i() {
        let mut p = Playfield::new();
        for y in HEIGHT - 4..HEIGHT {
            p = p.with_row_filled_except(y, &[0]);
        }
        // Vertical I fills column 0 when its box starts at x = -1.
        let i = TetrominoKind::I.base_shape();
        assert!(!p.is_collision(-1, HEIGHT as i32 - 4, &i));
        let out = p.lock(-1, HEIGHT as i32 - 4, &i, PieceColor::Cyan);
        assert_eq!(out.lines_cleared, 4);
        assert_eq!(filled_count(&out.playfield), 0);
    }

    #[test]
    fn test_non_adjacent_rows_keep_order() {
        let p = Playfield::new()
            .with_row_filled_except(HEIGHT - 1, &[0])
            .with_row_filled_except(HEIGHT - 2, &[0, 1, 2, 3])
            .with_row_filled_except(HEIGHT - 3, &[0]);
        let i = TetrominoKind::I.base_shape();
        // Column 0 over rows 16..=19: fills row 17 and 19 completely.
        let out = p.lock(-1, HEIGHT as i32 - 4, &i, PieceColor::Cyan);
        assert_eq!(out.lines_cleared, 2);
        let rows = out.playfield.rows();
        // Remaining partial row (the old row 18) is now at the bottom.
        assert_eq!(rows[HEIGHT - 1][0], Cell::Filled(PieceColor::Cyan));
        assert_eq!(rows[HEIGHT - 1][1], Cell::Empty);
        // The I cell at row 16 dropped two rows.
        assert_eq!(rows[HEIGHT - 2][0], Cell::Filled(PieceColor::Cyan));
        assert!(rows[HEIGHT - 2][1..].iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn test_lock_above_top_overflows() {
        let p = Playfield::new();
        let o = TetrominoKind::O.base_shape();
        let out = p.lock(4, -1, &o, PieceColor::Yellow);
        assert!(out.top_overflow);
        assert_eq!(out.lines_cleared, 0);
        assert_eq!(out.playfield.get(4, 0), Some(Cell::Filled(PieceColor::Yellow)));
        assert_eq!(out.playfield.height(), HEIGHT);
    }
}
