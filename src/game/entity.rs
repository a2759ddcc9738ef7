//! Board cells: kinds, organ costs, and the entity record.
//!
//! Every cell of the board holds exactly one [`Entity`]. Organs form trees:
//! each carries the id of its parent organ and of its organism's root, which
//! is what lets tentacle kills take whole subtrees down at once.

use crate::game::geometry::{Dir, Point};
use crate::game::player::{Player, Protein, ProteinCounts};

/// Identifier of a grown organ. `0` means "not an organ" and is what walls,
/// proteins, and empty cells carry.
pub type OrganId = u32;

/// What occupies a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Open space organs can grow into.
    Empty,
    /// Impassable rock; also what growth collisions decay into.
    Wall,
    /// An organism's seed organ.
    Root,
    /// The cheap filler organ.
    Basic,
    /// Collects one adjacent protein per pass.
    Harvester,
    /// Kills the enemy organ (and its subtree) directly in front.
    Tentacle,
    /// Shoots new roots in a straight line.
    Sporer,
    /// A protein source of the given type.
    Protein(Protein),
}

impl CellKind {
    /// The protein type, if this is a protein cell.
    #[must_use]
    pub const fn protein(self) -> Option<Protein> {
        match self {
            Self::Protein(protein) => Some(protein),
            _ => None,
        }
    }

    /// Whether this is one of the four protein kinds.
    #[must_use]
    pub const fn is_protein(self) -> bool {
        matches!(self, Self::Protein(_))
    }

    /// Whether this is a grown organ (root, basic, harvester, tentacle,
    /// sporer).
    #[must_use]
    pub const fn is_organ(self) -> bool {
        matches!(
            self,
            Self::Root | Self::Basic | Self::Harvester | Self::Tentacle | Self::Sporer
        )
    }

    /// The wire token for this kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Wall => "WALL",
            Self::Root => "ROOT",
            Self::Basic => "BASIC",
            Self::Harvester => "HARVESTER",
            Self::Tentacle => "TENTACLE",
            Self::Sporer => "SPORER",
            Self::Protein(protein) => protein.token(),
        }
    }

    /// Parse a wire token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "EMPTY" => Some(Self::Empty),
            "WALL" => Some(Self::Wall),
            "ROOT" => Some(Self::Root),
            "BASIC" => Some(Self::Basic),
            "HARVESTER" => Some(Self::Harvester),
            "TENTACLE" => Some(Self::Tentacle),
            "SPORER" => Some(Self::Sporer),
            "A" => Some(Self::Protein(Protein::A)),
            "B" => Some(Self::Protein(Protein::B)),
            "C" => Some(Self::Protein(Protein::C)),
            "D" => Some(Self::Protein(Protein::D)),
            _ => None,
        }
    }
}

/// The growable subset of [`CellKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganKind {
    /// Seed of a new organism; grown only by spores.
    Root,
    /// Filler.
    Basic,
    /// Income.
    Harvester,
    /// Offense.
    Tentacle,
    /// Reach.
    Sporer,
}

impl OrganKind {
    /// Every organ kind.
    pub const ALL: [Self; 5] = [
        Self::Root,
        Self::Basic,
        Self::Harvester,
        Self::Tentacle,
        Self::Sporer,
    ];

    /// Protein cost to grow one organ of this kind.
    #[must_use]
    pub const fn cost(self) -> ProteinCounts {
        match self {
            Self::Root => ProteinCounts::new(1, 1, 1, 1),
            Self::Basic => ProteinCounts::new(1, 0, 0, 0),
            Self::Harvester => ProteinCounts::new(0, 0, 1, 1),
            Self::Tentacle => ProteinCounts::new(0, 1, 1, 0),
            Self::Sporer => ProteinCounts::new(0, 1, 0, 1),
        }
    }

    /// Whether organs of this kind keep a facing direction. Roots and basic
    /// organs are undirected no matter what the grow command said.
    #[must_use]
    pub const fn is_directed(self) -> bool {
        matches!(self, Self::Harvester | Self::Tentacle | Self::Sporer)
    }

    /// The corresponding cell kind.
    #[must_use]
    pub const fn cell_kind(self) -> CellKind {
        match self {
            Self::Root => CellKind::Root,
            Self::Basic => CellKind::Basic,
            Self::Harvester => CellKind::Harvester,
            Self::Tentacle => CellKind::Tentacle,
            Self::Sporer => CellKind::Sporer,
        }
    }

    /// The wire token for this kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        self.cell_kind().token()
    }

    /// Parse a wire token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ROOT" => Some(Self::Root),
            "BASIC" => Some(Self::Basic),
            "HARVESTER" => Some(Self::Harvester),
            "TENTACLE" => Some(Self::Tentacle),
            "SPORER" => Some(Self::Sporer),
            _ => None,
        }
    }
}

/// Per-player "already harvested this pass" marks on a protein cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HarvestMask(u8);

impl HarvestMask {
    /// No player has harvested yet.
    pub const EMPTY: Self = Self(0);

    /// Whether `player` already harvested this cell this pass.
    #[must_use]
    pub const fn contains(self, player: Player) -> bool {
        self.0 & (1 << player.index()) != 0
    }

    /// Mark the cell harvested by `player`.
    pub const fn insert(&mut self, player: Player) {
        self.0 |= 1 << player.index();
    }

    /// Drop all marks.
    pub const fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Value snapshot of a displaced cell.
///
/// Created when an organ grows over something or when combat clears a cell;
/// consumed by the next resolution pass (wall decay, protein bonus, dying
/// animation) and then dropped. Depth is always one: taking a ghost of a
/// cell never captures the cell's own ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ghost {
    /// Kind of the displaced cell.
    pub kind: CellKind,
    /// Owner of the displaced cell.
    pub owner: Option<Player>,
    /// Organ id of the displaced cell (`0` for non-organs).
    pub organ_id: OrganId,
    /// Facing of the displaced cell.
    pub facing: Option<Dir>,
    /// Set when the cell was destroyed by combat rather than grown over.
    pub dying: bool,
}

/// One cell of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Where this cell sits.
    pub pos: Point,
    /// What occupies it.
    pub kind: CellKind,
    /// Who owns it; `None` for walls, proteins, and empty space.
    pub owner: Option<Player>,
    /// Organ id, `0` unless this is a grown organ.
    pub organ_id: OrganId,
    /// Facing direction; `None` for undirected cells.
    pub facing: Option<Dir>,
    /// Parent organ id, `0` for roots and non-organs.
    pub parent_id: OrganId,
    /// Organ id of this organism's root, `0` for roots and non-organs.
    pub root_id: OrganId,
    /// Harvest marks, meaningful on protein cells only.
    pub harvested: HarvestMask,
    /// Snapshot of whatever this entity displaced, pending resolution.
    pub ghost: Option<Box<Ghost>>,
    /// Renderer signal: grown this turn.
    pub is_growing: bool,
    /// Renderer signal: this cell has an animation to play.
    pub should_animate: bool,
}

impl Entity {
    /// An empty, unowned cell.
    #[must_use]
    pub const fn empty(pos: Point) -> Self {
        Self {
            pos,
            kind: CellKind::Empty,
            owner: None,
            organ_id: 0,
            facing: None,
            parent_id: 0,
            root_id: 0,
            harvested: HarvestMask::EMPTY,
            ghost: None,
            is_growing: false,
            should_animate: false,
        }
    }

    /// A wall cell.
    #[must_use]
    pub const fn wall(pos: Point) -> Self {
        let mut cell = Self::empty(pos);
        cell.kind = CellKind::Wall;
        cell
    }

    /// A protein source.
    #[must_use]
    pub const fn protein(pos: Point, protein: Protein) -> Self {
        let mut cell = Self::empty(pos);
        cell.kind = CellKind::Protein(protein);
        cell
    }

    /// A grown organ. Undirected kinds (root, basic) drop any facing the
    /// caller passed.
    #[must_use]
    pub fn organ(
        pos: Point,
        kind: OrganKind,
        owner: Player,
        organ_id: OrganId,
        facing: Option<Dir>,
        parent_id: OrganId,
        root_id: OrganId,
    ) -> Self {
        let mut cell = Self::empty(pos);
        cell.kind = kind.cell_kind();
        cell.owner = Some(owner);
        cell.organ_id = organ_id;
        cell.facing = if kind.is_directed() { facing } else { None };
        cell.parent_id = parent_id;
        cell.root_id = root_id;
        cell
    }

    /// Whether this cell is a grown organ.
    #[must_use]
    pub const fn is_organ(&self) -> bool {
        self.kind.is_organ()
    }

    /// Renderer signal: an organ was destroyed here this pass (the cell
    /// holds a dying ghost).
    #[must_use]
    pub fn is_dying(&self) -> bool {
        matches!(self.ghost.as_deref(), Some(ghost) if ghost.dying)
    }

    /// The protein type, if this is a protein cell.
    #[must_use]
    pub const fn protein_kind(&self) -> Option<Protein> {
        self.kind.protein()
    }

    /// Take a ghost snapshot of this cell. The cell's own pending ghost, if
    /// any, is not captured.
    #[must_use]
    pub const fn as_ghost(&self, dying: bool) -> Ghost {
        Ghost {
            kind: self.kind,
            owner: self.owner,
            organ_id: self.organ_id,
            facing: self.facing,
            dying,
        }
    }

    /// Demote this cell to a plain wall in place, dropping organ fields and
    /// any pending ghost.
    pub fn demote_to_wall(&mut self) {
        self.kind = CellKind::Wall;
        self.owner = None;
        self.organ_id = 0;
        self.facing = None;
        self.parent_id = 0;
        self.root_id = 0;
        self.ghost = None;
    }

    /// Value copy for lookahead: every field copied except the harvest
    /// marks, which reset so a speculative pass starts clean.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        let mut copy = self.clone();
        copy.harvested = HarvestMask::EMPTY;
        copy
    }
}
