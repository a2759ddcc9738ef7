//! The authoritative game state.
//!
//! Storage is one dense arena of [`Entity`] cells indexed `y * width + x`;
//! "the entity list" is an iteration view over the same cells, so the two
//! can never disagree. All rule mutations go through [`State::apply_action`]
//! and the four resolution phases ([`State::refresh_proteins`],
//! [`State::do_wall_collisions`], [`State::retrieve_proteins_bonus`],
//! [`State::do_tentacle_attacks`]); everything else is queries.

use std::collections::HashSet;

use crate::error::{GameError, GameResult, InvalidAction};
use crate::game::action::Action;
use crate::game::entity::{CellKind, Entity, OrganId, OrganKind};
use crate::game::geometry::{Dir, Point, direction_between};
use crate::game::player::{PerPlayer, Player, ProteinCounts};
use crate::protocol::{EntityLine, LineReader, parse_protein_line};

/// Hard cap on board width and height. Real boards are an order of
/// magnitude smaller; the cap only bounds allocations on hostile input.
pub const MAX_DIM: i32 = 512;

/// Income applied by one harvest pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestReport {
    /// Per-player proteins gained this pass.
    pub gains: PerPlayer<ProteinCounts>,
}

/// Growth collisions that decayed to walls this pass.
#[derive(Debug, Clone, Default)]
pub struct WallReport {
    /// Cells demoted to walls.
    pub walls: Vec<Point>,
}

/// Proteins credited for cells grown over a protein source.
#[derive(Debug, Clone, Copy, Default)]
pub struct BonusReport {
    /// Per-player bonus proteins credited this pass.
    pub bonus: PerPlayer<ProteinCounts>,
}

/// Organs destroyed by tentacles this pass.
#[derive(Debug, Clone, Default)]
pub struct CombatReport {
    /// Every cell cleared by combat, in discovery order.
    pub destroyed: Vec<Point>,
    /// How many organs each player lost.
    pub losses: PerPlayer<u32>,
}

/// The authoritative game state for one match.
#[derive(Debug, Clone)]
pub struct State {
    width: i32,
    height: i32,
    cells: Vec<Entity>,
    turn: u32,
    next_organ_id: OrganId,
    proteins: PerPlayer<ProteinCounts>,
    gains: PerPlayer<ProteinCounts>,
    required_actions: u32,
}

impl Default for State {
    /// An unsized board; callers follow up with [`State::set_map_size`] or
    /// ingest a frame via [`State::refresh_state`].
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            turn: 1,
            next_organ_id: 1,
            proteins: PerPlayer::default(),
            gains: PerPlayer::default(),
            required_actions: 1,
        }
    }
}

impl State {
    /// An empty board of the given dimensions.
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] when a dimension is outside
    /// `1..=MAX_DIM`.
    pub fn new(width: i32, height: i32) -> GameResult<Self> {
        let mut state = Self::default();
        state.resize(width, height, 0)?;
        Ok(state)
    }

    /// Parse a `"W H"` header and size the board accordingly, clearing it.
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] unless the line is exactly two positive
    /// integers within [`MAX_DIM`].
    pub fn set_map_size(&mut self, raw: &str) -> GameResult<()> {
        let mut parts = raw.split_whitespace();
        let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(GameError::malformed(1, "expected `W H`"));
        };
        let width: i32 = w
            .parse()
            .map_err(|_| GameError::malformed(1, format!("width is not a number: `{w}`")))?;
        let height: i32 = h
            .parse()
            .map_err(|_| GameError::malformed(1, format!("height is not a number: `{h}`")))?;
        self.resize(width, height, 1)
    }

    fn resize(&mut self, width: i32, height: i32, line_no: usize) -> GameResult<()> {
        if !(1..=MAX_DIM).contains(&width) || !(1..=MAX_DIM).contains(&height) {
            return Err(GameError::malformed(
                line_no,
                format!("board size {width}x{height} is outside 1..={MAX_DIM}"),
            ));
        }
        self.width = width;
        self.height = height;
        self.clear_cells();
        Ok(())
    }

    fn clear_cells(&mut self) {
        self.cells = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Entity::empty(Point::new(x, y))))
            .collect();
    }

    /// Board width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// The 1-based turn counter.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Move to the next turn.
    pub const fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// The id the next grown organ will take.
    #[must_use]
    pub const fn next_organ_id(&self) -> OrganId {
        self.next_organ_id
    }

    /// How many actions each player is expected to submit per turn (one per
    /// organism).
    #[must_use]
    pub const fn required_actions(&self) -> u32 {
        self.required_actions
    }

    /// Override the required-actions count (the map loader and tests use
    /// this; frames set it during ingestion).
    pub const fn set_required_actions(&mut self, count: u32) {
        self.required_actions = count;
    }

    /// A player's protein inventory.
    #[must_use]
    pub fn proteins(&self, player: Player) -> ProteinCounts {
        self.proteins[player]
    }

    /// Replace a player's protein inventory.
    pub fn set_proteins(&mut self, player: Player, counts: ProteinCounts) {
        self.proteins[player] = counts;
    }

    /// A player's income from the most recent harvest pass.
    #[must_use]
    pub fn gains(&self, player: Player) -> ProteinCounts {
        self.gains[player]
    }

    /// The arena index for a point, `None` when out of range.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn index_of(&self, point: Point) -> Option<usize> {
        if point.x < 0 || point.y < 0 || point.x >= self.width || point.y >= self.height {
            return None;
        }
        Some((point.y * self.width + point.x) as usize)
    }

    /// Borrow the cell at a point, `None` when out of range.
    #[must_use]
    pub fn get(&self, point: Point) -> Option<&Entity> {
        self.index_of(point).map(|idx| &self.cells[idx])
    }

    /// The entity at a point. Never fails: out-of-range points yield a
    /// synthesized empty cell, so callers must not rely on identity.
    #[must_use]
    pub fn entity_at(&self, point: Point) -> Entity {
        self.get(point)
            .cloned()
            .unwrap_or_else(|| Entity::empty(point))
    }

    /// Install an entity at its own position, keeping `next_organ_id`
    /// ahead of every placed organ id. Out-of-range placements are dropped
    /// (the parsing layers reject them before this point).
    pub fn place(&mut self, entity: Entity) {
        if let Some(idx) = self.index_of(entity.pos) {
            self.next_organ_id = self.next_organ_id.max(entity.organ_id + 1);
            self.cells[idx] = entity;
        }
    }

    /// Every cell of the board, row-major.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.cells.iter()
    }

    /// Every cell a player owns.
    pub fn cells_of(&self, player: Player) -> impl Iterator<Item = &Entity> {
        self.cells
            .iter()
            .filter(move |cell| cell.owner == Some(player))
    }

    /// How many cells a player owns.
    #[must_use]
    pub fn cell_count(&self, player: Player) -> u32 {
        u32::try_from(self.cells_of(player).count()).unwrap_or(u32::MAX)
    }

    /// A player's root organs.
    pub fn roots_of(&self, player: Player) -> impl Iterator<Item = &Entity> {
        self.cells_of(player)
            .filter(|cell| cell.kind == CellKind::Root)
    }

    /// Wholesale re-ingestion of a turn frame: entity count, entity
    /// descriptor lines, both protein lines, required-actions count.
    ///
    /// Rebuilds every cell, recomputes `next_organ_id` as one past the
    /// largest ingested organ id, then runs one harvest pass to restore the
    /// derived protein state (marks and gains).
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] if the board is unsized, a line is
    /// missing, a field does not parse, or an entity lies outside the board.
    pub fn refresh_state(&mut self, lines: &mut LineReader<'_>) -> GameResult<()> {
        if self.width == 0 {
            return Err(GameError::malformed(lines.line_no(), "board size not set"));
        }
        let count = lines.next_u32()?;
        self.clear_cells();

        let mut max_id = 0;
        for _ in 0..count {
            let raw = lines.next_line()?;
            let parsed = EntityLine::parse(raw, lines.line_no())?;
            if self.index_of(parsed.pos).is_none() {
                return Err(GameError::malformed(
                    lines.line_no(),
                    format!(
                        "entity at {} is outside the {}x{} board",
                        parsed.pos, self.width, self.height
                    ),
                ));
            }
            max_id = max_id.max(parsed.organ_id);
            self.place(parsed.into_entity());
        }

        let stock_one = parse_protein_line(lines.next_line()?, lines.line_no())?;
        let stock_two = parse_protein_line(lines.next_line()?, lines.line_no())?;
        self.proteins = PerPlayer::new(stock_one, stock_two);
        self.required_actions = lines.next_u32()?;
        self.next_organ_id = max_id + 1;

        self.refresh_proteins();
        Ok(())
    }

    /// Validate and apply one action.
    ///
    /// The checks run in a fixed order and nothing is mutated before the
    /// first failing one: root-via-grow, target bounds, opponent defense,
    /// cost, source organ existence and ownership, target occupancy. On
    /// success the new organ takes `next_organ_id`, remembers whatever it
    /// displaced as its ghost, and the full cost leaves the inventory.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidAction`] or [`GameError::InsufficientResources`];
    /// in both cases the state is exactly as before the call.
    pub fn apply_action(&mut self, action: &Action) -> GameResult<()> {
        let (player, source_id, target, kind, facing, is_spore) = match *action {
            Action::Wait { .. } => return Ok(()),
            Action::Grow {
                player,
                organ_id,
                target,
                kind,
                facing,
                ..
            } => (player, organ_id, target, kind, facing, false),
            Action::Spore {
                player,
                sporer_id,
                target,
                ..
            } => (player, sporer_id, target, OrganKind::Root, None, true),
        };

        if kind == OrganKind::Root && !is_spore {
            return Err(InvalidAction::RootViaGrow.into());
        }
        let Some(target_idx) = self.index_of(target) else {
            return Err(InvalidAction::OutOfBounds { target }.into());
        };
        if self.is_already_defended(target, player.opponent()) {
            return Err(InvalidAction::Defended { target }.into());
        }
        let cost = kind.cost();
        if !self.proteins[player].covers(cost) {
            return Err(GameError::InsufficientResources { kind });
        }

        let Some(source) = self
            .cells
            .iter()
            .find(|cell| cell.organ_id == source_id && cell.organ_id != 0)
        else {
            return Err(InvalidAction::UnknownOrgan {
                organ_id: source_id,
            }
            .into());
        };
        if source.owner != Some(player) {
            return Err(InvalidAction::NotYourOrgan {
                organ_id: source_id,
            }
            .into());
        }
        let source_pos = source.pos;
        let (parent_id, root_id) = if kind == OrganKind::Root {
            (0, 0)
        } else if source.kind == CellKind::Root {
            (source_id, source.organ_id)
        } else {
            (source_id, source.root_id)
        };

        let displaced = &self.cells[target_idx];
        if displaced.owner.is_some() && displaced.ghost.is_none() {
            return Err(InvalidAction::Occupied { target }.into());
        }
        let ghost = displaced.as_ghost(false);

        let mut organ = Entity::organ(
            target,
            kind,
            player,
            self.next_organ_id,
            facing,
            parent_id,
            root_id,
        );
        organ.is_growing = true;
        organ.ghost = Some(Box::new(ghost));
        self.cells[target_idx] = organ;
        self.next_organ_id += 1;
        self.proteins[player].deduct(cost);

        if is_spore && let Some(idx) = self.index_of(source_pos) {
            self.cells[idx].should_animate = true;
        }
        Ok(())
    }

    fn neighbours_where(&self, point: Point, keep: impl Fn(&Entity) -> bool) -> Vec<Point> {
        point
            .neighbour_candidates()
            .into_iter()
            .filter(|&n| self.get(n).is_some_and(&keep))
            .collect()
    }

    /// In-bounds neighbors that are empty or a protein, in scan order
    /// (west, east, north, south).
    #[must_use]
    pub fn neighbours(&self, point: Point) -> Vec<Point> {
        self.neighbours_where(point, |cell| {
            cell.kind == CellKind::Empty || cell.kind.is_protein()
        })
    }

    /// In-bounds neighbors that are anything but a wall, in scan order.
    #[must_use]
    pub fn neighbours_but_wall(&self, point: Point) -> Vec<Point> {
        self.neighbours_where(point, |cell| cell.kind != CellKind::Wall)
    }

    /// In-bounds neighbors of the given kinds, in scan order.
    #[must_use]
    pub fn neighbours_of_kinds(&self, point: Point, kinds: &[CellKind]) -> Vec<Point> {
        self.neighbours_where(point, |cell| kinds.contains(&cell.kind))
    }

    /// Whether `player` has a tentacle next to `point` facing exactly at it.
    #[must_use]
    pub fn is_already_defended(&self, point: Point, player: Player) -> bool {
        self.neighbours_but_wall(point).into_iter().any(|n| {
            self.get(n).is_some_and(|cell| {
                cell.owner == Some(player)
                    && cell.kind == CellKind::Tentacle
                    && cell.facing == Some(direction_between(cell.pos, point))
            })
        })
    }

    /// Whether `player` may grow onto `point` without being eaten: no
    /// opposing tentacle defends it.
    #[must_use]
    pub fn can_grow_here(&self, point: Point, player: Player) -> bool {
        !self.is_already_defended(point, player.opponent())
    }

    /// Every cell the organism rooted at `root_id` can grow into this turn:
    /// empty-or-protein neighbors of its organs, plus each sporer's line of
    /// sight. De-duplicated, first-seen order preserved.
    ///
    /// A defended cell in a sporer's line is skipped but does not block the
    /// cells behind it; any other obstacle ends the line.
    #[must_use]
    pub fn growable_cells(&self, root_id: OrganId, player: Player) -> Vec<Point> {
        let organs: Vec<(Point, CellKind, Option<Dir>)> = self
            .cells_of(player)
            .filter(|cell| cell.organ_id == root_id || cell.root_id == root_id)
            .map(|cell| (cell.pos, cell.kind, cell.facing))
            .collect();

        let mut seen: HashSet<Point> = HashSet::new();
        let mut result = Vec::new();
        let consider = |point: Point, seen: &mut HashSet<Point>, out: &mut Vec<Point>| {
            let growable = self
                .get(point)
                .is_some_and(|cell| cell.kind == CellKind::Empty || cell.kind.is_protein());
            if growable && self.can_grow_here(point, player) && seen.insert(point) {
                out.push(point);
            }
        };

        for &(pos, _, _) in &organs {
            for dir in Dir::ALL {
                consider(pos.step(dir), &mut seen, &mut result);
            }
        }
        for &(pos, kind, facing) in &organs {
            if kind != CellKind::Sporer {
                continue;
            }
            let Some(dir) = facing else { continue };
            let mut cursor = pos.step(dir);
            while let Some(cell) = self.get(cursor) {
                if cell.kind != CellKind::Empty && !cell.kind.is_protein() {
                    break;
                }
                consider(cursor, &mut seen, &mut result);
                cursor = cursor.step(dir);
            }
        }
        result
    }

    /// One harvest pass: clear every protein's harvest marks, zero both
    /// players' gains, then let every owned harvester collect from the
    /// protein directly in front of it. Idempotent recomputation; a protein
    /// yields at most one unit per player per pass no matter how many
    /// harvesters face it.
    pub fn refresh_proteins(&mut self) -> HarvestReport {
        for cell in &mut self.cells {
            if cell.kind.is_protein() {
                cell.harvested.clear();
            }
        }
        self.gains = PerPlayer::splat(ProteinCounts::ZERO);

        let harvesters: Vec<(Point, Player, Dir)> = self
            .cells
            .iter()
            .filter(|cell| cell.kind == CellKind::Harvester)
            .filter_map(|cell| match (cell.owner, cell.facing) {
                (Some(owner), Some(facing)) => Some((cell.pos, owner, facing)),
                _ => None,
            })
            .collect();

        for (pos, owner, facing) in harvesters {
            let front = pos.step(facing);
            let Some(idx) = self.index_of(front) else {
                continue;
            };
            let Some(protein) = self.cells[idx].protein_kind() else {
                continue;
            };
            if self.cells[idx].harvested.contains(owner) {
                continue;
            }
            self.cells[idx].harvested.insert(owner);
            self.gains[owner].credit(protein, 1);
            self.proteins[owner].credit(protein, 1);
        }
        HarvestReport { gains: self.gains }
    }

    /// Resolve growth collisions: dying ghosts and protein ghosts survive
    /// for the later phases, ghosts of empty cells are dropped, and a ghost
    /// of anything else demotes its cell to a wall.
    pub fn do_wall_collisions(&mut self) -> WallReport {
        let mut report = WallReport::default();
        for idx in 0..self.cells.len() {
            let Some(ghost) = self.cells[idx].ghost.as_deref() else {
                continue;
            };
            if ghost.dying || ghost.kind.is_protein() {
                continue;
            }
            if ghost.kind == CellKind::Empty {
                self.cells[idx].ghost = None;
                continue;
            }
            self.cells[idx].demote_to_wall();
            report.walls.push(self.cells[idx].pos);
        }
        report
    }

    /// Credit +3 of a protein to whoever grew over it, then drop every
    /// remaining ghost. After this phase no ghost from the previous pass
    /// survives.
    pub fn retrieve_proteins_bonus(&mut self) -> BonusReport {
        let mut report = BonusReport::default();
        for idx in 0..self.cells.len() {
            let Some(ghost) = self.cells[idx].ghost.take() else {
                continue;
            };
            if let (Some(protein), Some(owner)) = (ghost.kind.protein(), self.cells[idx].owner) {
                self.proteins[owner].credit(protein, 3);
                report.bonus[owner].credit(protein, 3);
            }
        }
        report
    }

    /// Tentacle combat. The tentacle list is snapshotted first, so mutual
    /// destruction works and a tentacle killed this pass still strikes.
    /// Each kill takes the victim and its whole subtree (organs whose
    /// parent chain reaches the victim), walked with an explicit stack.
    /// Destroyed cells become empty and hold their victim as a dying ghost
    /// for one pass.
    pub fn do_tentacle_attacks(&mut self) -> CombatReport {
        let tentacles: Vec<(Point, Player, Dir)> = self
            .cells
            .iter()
            .filter(|cell| cell.kind == CellKind::Tentacle)
            .filter_map(|cell| match (cell.owner, cell.facing) {
                (Some(owner), Some(facing)) => Some((cell.pos, owner, facing)),
                _ => None,
            })
            .collect();

        let mut doomed: Vec<Point> = Vec::new();
        let mut seen: HashSet<Point> = HashSet::new();

        for (pos, owner, facing) in tentacles {
            let front = pos.step(facing);
            let Some(victim) = self.get(front) else {
                continue;
            };
            let Some(victim_owner) = victim.owner else {
                continue;
            };
            if victim_owner == owner {
                continue;
            }

            let mut stack = vec![victim.organ_id];
            if seen.insert(front) {
                doomed.push(front);
            }
            while let Some(current) = stack.pop() {
                if current == 0 {
                    continue;
                }
                for cell in &self.cells {
                    if cell.owner == Some(victim_owner)
                        && cell.parent_id == current
                        && seen.insert(cell.pos)
                    {
                        doomed.push(cell.pos);
                        stack.push(cell.organ_id);
                    }
                }
            }
        }

        let mut losses = PerPlayer::splat(0u32);
        for &pos in &doomed {
            let Some(idx) = self.index_of(pos) else {
                continue;
            };
            let ghost = self.cells[idx].as_ghost(true);
            if let Some(owner) = self.cells[idx].owner {
                losses[owner] += 1;
            }
            let mut empty = Entity::empty(pos);
            empty.ghost = Some(Box::new(ghost));
            self.cells[idx] = empty;
        }
        CombatReport {
            destroyed: doomed,
            losses,
        }
    }

    /// Mark freshly grown organs for the renderer. True if any are pending.
    pub fn check_grow_animation(&mut self) -> bool {
        let mut any = false;
        for cell in &mut self.cells {
            if cell.is_growing {
                cell.should_animate = true;
                any = true;
            }
        }
        any
    }

    /// True if a sporer fired this turn (applying a spore marks the
    /// shooter).
    pub fn check_spore_animation(&mut self) -> bool {
        self.cells
            .iter()
            .any(|cell| cell.kind == CellKind::Sporer && cell.should_animate)
    }

    /// Mark tentacles with an enemy in front. True if any are pending.
    pub fn check_attack_animation(&mut self) -> bool {
        let striking: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                cell.kind == CellKind::Tentacle && {
                    let (Some(owner), Some(facing)) = (cell.owner, cell.facing) else {
                        return false;
                    };
                    self.get(cell.pos.step(facing))
                        .is_some_and(|front| front.owner.is_some_and(|fo| fo != owner))
                }
            })
            .map(|(idx, _)| idx)
            .collect();
        for &idx in &striking {
            self.cells[idx].should_animate = true;
        }
        !striking.is_empty()
    }

    /// Mark cells holding a dying ghost. True if any are pending.
    pub fn check_dying_animation(&mut self) -> bool {
        let mut any = false;
        for cell in &mut self.cells {
            if cell.is_dying() {
                cell.should_animate = true;
                any = true;
            }
        }
        any
    }

    /// Mark harvesters whose facing protein credited them this pass. True
    /// if any are pending.
    pub fn check_harvest_animation(&mut self) -> bool {
        let feeding: Vec<usize> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                cell.kind == CellKind::Harvester && {
                    let (Some(owner), Some(facing)) = (cell.owner, cell.facing) else {
                        return false;
                    };
                    self.get(cell.pos.step(facing))
                        .is_some_and(|front| front.harvested.contains(owner))
                }
            })
            .map(|(idx, _)| idx)
            .collect();
        for &idx in &feeding {
            self.cells[idx].should_animate = true;
        }
        !feeding.is_empty()
    }

    /// Clear growth flags and animation marks once a renderer consumed
    /// them.
    pub fn clean_growing_organs(&mut self) {
        for cell in &mut self.cells {
            cell.is_growing = false;
            cell.should_animate = false;
        }
    }

    /// Drop dying ghosts once a renderer consumed them.
    pub fn clean_dying_organs(&mut self) {
        for cell in &mut self.cells {
            if cell.is_dying() {
                cell.ghost = None;
            }
        }
    }

    /// Whether the board's cell kinds are symmetric under 180-degree
    /// rotation, the convention bundled boards follow to keep starts fair.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.entity_at(Point::new(x, y)).kind;
                let mirrored = self
                    .entity_at(Point::new(self.width - x - 1, self.height - y - 1))
                    .kind;
                if cell != mirrored {
                    return false;
                }
            }
        }
        true
    }

    /// Deep value copy for lookahead. Nothing is shared with the original;
    /// harvest marks reset so a speculative pass starts clean.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(Entity::snapshot).collect(),
            turn: self.turn,
            next_organ_id: self.next_organ_id,
            proteins: self.proteins,
            gains: self.gains,
            required_actions: self.required_actions,
        }
    }
}
