//! Tetromino kinds, shape matrices, clockwise rotation and the falling piece.

/// Largest bounding box of any shape (the I piece).
pub const MAX_SHAPE_SIZE: usize = 4;

/// Spawn column for every new piece.
pub const SPAWN_X: i32 = 3;
/// Spawn row for every new piece.
pub const SPAWN_Y: i32 = 0;

/// Tetromino kinds (I, J, L, O, S, T, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

/// Colour tag written into the grid when a piece locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Purple,
    Red,
}

impl PieceColor {
    /// Declaration order; used to index theme palettes.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    pub fn color(self) -> PieceColor {
        match self {
            Self::I => PieceColor::Cyan,
            Self::J => PieceColor::Blue,
            Self::L => PieceColor::Orange,
            Self::O => PieceColor::Yellow,
            Self::S => PieceColor::Green,
            Self::T => PieceColor::Purple,
            Self::Z => PieceColor::Red,
        }
    }

    /// Spawn orientation.
    pub fn base_shape(self) -> Shape {
        match self {
            Self::I => Shape::from_rows(&[&[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0], &[0, 1, 0, 0]]),
            Self::J => Shape::from_rows(&[&[0, 1, 0], &[0, 1, 0], &[1, 1, 0]]),
            Self::L => Shape::from_rows(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 1]]),
            Self::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            Self::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
            Self::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]]),
            Self::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::J => "J",
            Self::L => "L",
            Self::O => "O",
            Self::S => "S",
            Self::T => "T",
            Self::Z => "Z",
        }
    }
}

/// Square binary matrix of side `size` (2..=4). Cells outside `size` are always empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build from square rows of 0/1. Rows must all be `rows.len()` long.
    fn from_rows(rows: &[&[u8]]) -> Self {
        let size = rows.len().min(MAX_SHAPE_SIZE);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().take(size).enumerate() {
            for (c, &v) in row.iter().take(size).enumerate() {
                cells[r][c] = v != 0;
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col]
    }

    /// Occupied cells as (col, row) offsets from the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |row| {
            (0..self.size)
                .filter(move |&col| self.cells[row][col])
                .map(move |col| (col as i32, row as i32))
        })
    }

    /// 90° clockwise: new[row][col] = old[n - 1 - col][row].
    pub fn rotated_cw(&self) -> Self {
        let n = self.size;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (row, out_row) in cells.iter_mut().enumerate().take(n) {
            for (col, out) in out_row.iter_mut().enumerate().take(n) {
                *out = self.cells[n - 1 - col][row];
            }
        }
        Self { size: n, cells }
    }

    /// Tight bounds of the occupied cells: (min_col, min_row, max_col, max_row).
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        self.cells().fold(None, |acc, (c, r)| match acc {
            None => Some((c, r, c, r)),
            Some((c0, r0, c1, r1)) => Some((c0.min(c), r0.min(r), c1.max(c), r1.max(r))),
        })
    }
}

/// The falling piece: kind, current rotation and top-left grid offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: TetrominoKind,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl ActivePiece {
    pub fn spawn(kind: TetrominoKind) -> Self {
        Self {
            kind,
            shape: kind.base_shape(),
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Rotation candidates in wall-kick order: in place, one left, one right.
    pub fn rotation_candidates(&self) -> [Self; 3] {
        let rotated = Self {
            shape: self.shape.rotated_cw(),
            ..*self
        };
        [rotated, rotated.shifted(-1, 0), rotated.shifted(1, 0)]
    }

    /// Absolute (x, y) grid coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape.cells().map(move |(c, r)| (self.x + c, self.y + r))
    }
}
