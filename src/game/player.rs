//! Players, protein types, and per-player ledgers.

use serde::{Deserialize, Serialize};

/// One of the two players.
///
/// Cell ownership is `Option<Player>`; `None` marks unowned cells (walls,
/// proteins, empty space). Wire encoding: player one = `0`, player two = `1`,
/// unowned = `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// The first player (wire id 0).
    One,
    /// The second player (wire id 1).
    Two,
}

impl Player {
    /// Both players in wire order.
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Slot index for fixed-size per-player storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Wire id (`0` or `1`).
    #[must_use]
    pub const fn wire(self) -> i32 {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Parse a wire id; anything but `0`/`1` is not a player.
    #[must_use]
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::One),
            1 => Some(Self::Two),
            _ => None,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One => f.write_str("player one"),
            Self::Two => f.write_str("player two"),
        }
    }
}

/// Wire encoding of an owner field: `0`/`1` for the players, `-1` for none.
#[must_use]
pub const fn owner_wire(owner: Option<Player>) -> i32 {
    match owner {
        Some(player) => player.wire(),
        None => -1,
    }
}

/// Parse an owner wire field. Returns `None` for values outside `{-1, 0, 1}`.
#[must_use]
pub fn owner_from_wire(value: i32) -> Option<Option<Player>> {
    if value == -1 {
        return Some(None);
    }
    Player::from_wire(value).map(Some)
}

/// Fixed two-slot storage indexed by [`Player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerPlayer<T>([T; 2]);

impl<T> PerPlayer<T> {
    /// Build from one value per player.
    #[must_use]
    pub const fn new(one: T, two: T) -> Self {
        Self([one, two])
    }

    /// Iterate `(player, value)` pairs in wire order.
    pub fn entries(&self) -> impl Iterator<Item = (Player, &T)> {
        Player::ALL.iter().map(move |&p| (p, &self.0[p.index()]))
    }
}

impl<T: Copy> PerPlayer<T> {
    /// Build with the same value in both slots.
    #[must_use]
    pub const fn splat(value: T) -> Self {
        Self([value, value])
    }
}

impl<T> std::ops::Index<Player> for PerPlayer<T> {
    type Output = T;

    fn index(&self, player: Player) -> &T {
        &self.0[player.index()]
    }
}

impl<T> std::ops::IndexMut<Player> for PerPlayer<T> {
    fn index_mut(&mut self, player: Player) -> &mut T {
        &mut self.0[player.index()]
    }
}

/// One of the four protein resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protein {
    /// Protein A, the basic growth resource.
    A,
    /// Protein B.
    B,
    /// Protein C.
    C,
    /// Protein D.
    D,
}

impl Protein {
    /// All protein types in wire order.
    pub const ALL: [Self; 4] = [Self::A, Self::B, Self::C, Self::D];

    /// Slot index for fixed-size storage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    /// The wire token for this protein.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// A bundle of protein quantities: inventories, per-pass gains, organ costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProteinCounts {
    counts: [u32; 4],
}

impl ProteinCounts {
    /// The empty bundle.
    pub const ZERO: Self = Self { counts: [0; 4] };

    /// Build from explicit A, B, C, D quantities.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self {
            counts: [a, b, c, d],
        }
    }

    /// Build with the same quantity of every protein.
    #[must_use]
    pub const fn splat(each: u32) -> Self {
        Self { counts: [each; 4] }
    }

    /// Quantity of one protein.
    #[must_use]
    pub const fn of(&self, protein: Protein) -> u32 {
        self.counts[protein.index()]
    }

    /// Sum over all four proteins.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Whether every protein in `cost` is covered by this bundle.
    #[must_use]
    pub fn covers(&self, cost: Self) -> bool {
        self.counts
            .iter()
            .zip(cost.counts.iter())
            .all(|(have, need)| have >= need)
    }

    /// Add `amount` of one protein.
    pub fn credit(&mut self, protein: Protein, amount: u32) {
        self.counts[protein.index()] += amount;
    }

    /// Remove `cost` in full. Callers check [`Self::covers`] first; the
    /// subtraction saturates so a ledger can never wrap.
    pub fn deduct(&mut self, cost: Self) {
        debug_assert!(self.covers(cost));
        for (have, need) in self.counts.iter_mut().zip(cost.counts.iter()) {
            *have = have.saturating_sub(*need);
        }
    }

    /// Iterate `(protein, quantity)` pairs in wire order.
    pub fn entries(&self) -> impl Iterator<Item = (Protein, u32)> + '_ {
        Protein::ALL.iter().map(move |&p| (p, self.of(p)))
    }
}
