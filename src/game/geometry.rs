//! Grid coordinates and cardinal directions.
//!
//! Coordinates are signed so that neighbor arithmetic can step off the board;
//! bounds are checked at lookup time by [`crate::game::State`], never here.

/// A cell coordinate on the board, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Column, growing eastward.
    pub x: i32,
    /// Row, growing southward.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The point one cell away in the given direction.
    #[must_use]
    pub const fn step(self, dir: Dir) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four orthogonal neighbor candidates in scan order
    /// (west, east, north, south). Callers filter for bounds.
    #[must_use]
    pub const fn neighbour_candidates(self) -> [Self; 4] {
        [
            Self::new(self.x - 1, self.y),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y - 1),
            Self::new(self.x, self.y + 1),
        ]
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A cardinal direction.
///
/// Entity facings are `Option<Dir>`; `None` is the undirected marker written
/// as `X` on the wire (roots and basic organs always carry it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    /// Toward smaller y.
    North,
    /// Toward larger x.
    East,
    /// Toward larger y.
    South,
    /// Toward smaller x.
    West,
}

impl Dir {
    /// All directions in reading order (N, E, S, W), for choice iteration.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit delta `(dx, dy)` for this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// The wire token for this direction.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
        }
    }

    /// Parse a wire token. `X` is not a direction; see [`facing_from_token`].
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "N" => Some(Self::North),
            "E" => Some(Self::East),
            "S" => Some(Self::South),
            "W" => Some(Self::West),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Wire token for a facing, `X` when undirected.
#[must_use]
pub const fn facing_token(facing: Option<Dir>) -> &'static str {
    match facing {
        Some(dir) => dir.token(),
        None => "X",
    }
}

/// Parse a facing wire token: a cardinal letter or `X` for undirected.
#[must_use]
pub fn facing_from_token(token: &str) -> Option<Option<Dir>> {
    if token == "X" {
        return Some(None);
    }
    Dir::from_token(token).map(Some)
}

/// The dominant direction from `from` toward `to`.
///
/// The larger axis displacement wins; ties (including the degenerate
/// `from == to`) resolve to the vertical axis. Exact for orthogonally
/// adjacent cells, which is the only case the rules rely on.
#[must_use]
pub const fn direction_between(from: Point, to: Point) -> Dir {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() > dy.abs() {
        if dx > 0 { Dir::East } else { Dir::West }
    } else if dy > 0 {
        Dir::South
    } else {
        Dir::North
    }
}
