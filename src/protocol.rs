//! Text wire protocol for turn frames.
//!
//! A frame is the line-oriented snapshot a player program receives each
//! turn: entity count, one descriptor per non-empty cell, two protein
//! stock lines (own stock first), and the number of actions the player
//! owes. [`State::refresh_state`](crate::game::State::refresh_state)
//! consumes frames; [`write_turn_input`] produces them.

use std::str::FromStr;

use crate::error::{GameError, GameResult};
use crate::game::{
    CellKind, Dir, Entity, OrganId, Player, Point, ProteinCounts, State, facing_from_token,
    facing_token, owner_from_wire, owner_wire,
};

/// Line-at-a-time reader over a raw input block, tracking the 1-based
/// number of the line most recently handed out for error reporting.
#[derive(Debug)]
pub struct LineReader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> LineReader<'a> {
    /// Wrap a raw input block.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_no: 0,
        }
    }

    /// The 1-based number of the most recently read line.
    #[must_use]
    pub const fn line_no(&self) -> usize {
        self.line_no
    }

    /// The next raw line.
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] when the input is exhausted.
    pub fn next_line(&mut self) -> GameResult<&'a str> {
        self.line_no += 1;
        self.lines
            .next()
            .ok_or_else(|| GameError::malformed(self.line_no, "unexpected end of input"))
    }

    /// The next raw line, or `None` once the input is exhausted. For
    /// consumers that read to the end rather than a counted block.
    pub fn try_next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line)
    }

    /// The next line parsed as a single unsigned count.
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] on exhaustion or a non-numeric line.
    pub fn next_u32(&mut self) -> GameResult<u32> {
        let raw = self.next_line()?;
        raw.trim()
            .parse()
            .map_err(|_| GameError::malformed(self.line_no, format!("expected a count, got `{raw}`")))
    }
}

fn parse_num<T: FromStr>(field: &str, what: &str, line_no: usize) -> GameResult<T> {
    field
        .parse()
        .map_err(|_| GameError::malformed(line_no, format!("{what} is not a number: `{field}`")))
}

/// One entity descriptor line:
/// `x y TYPE owner organ_id DIR parent_id root_id`.
///
/// Owner is encoded absolutely on the wire: `0` player one, `1` player
/// two, `-1` unowned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLine {
    /// Board position.
    pub pos: Point,
    /// Cell contents.
    pub kind: CellKind,
    /// Owning player, if any.
    pub owner: Option<Player>,
    /// Organ id, `0` for non-organs.
    pub organ_id: OrganId,
    /// Facing direction, `None` on the wire token `X`.
    pub facing: Option<Dir>,
    /// Parent organ id, `0` for roots and non-organs.
    pub parent_id: OrganId,
    /// Owning root id, `0` for roots and non-organs.
    pub root_id: OrganId,
}

impl EntityLine {
    /// Parse one descriptor line.
    ///
    /// # Errors
    ///
    /// [`GameError::MalformedInput`] unless the line has exactly eight
    /// fields and every field parses.
    pub fn parse(raw: &str, line_no: usize) -> GameResult<Self> {
        let fields: Vec<&str> = raw.split_whitespace().collect();
        let &[x, y, kind, owner, organ_id, facing, parent_id, root_id] = fields.as_slice() else {
            return Err(GameError::malformed(
                line_no,
                format!("expected 8 entity fields, got {}", fields.len()),
            ));
        };
        let pos = Point::new(parse_num(x, "x", line_no)?, parse_num(y, "y", line_no)?);
        let kind = CellKind::from_token(kind)
            .ok_or_else(|| GameError::malformed(line_no, format!("unknown cell type `{kind}`")))?;
        let owner_raw: i32 = parse_num(owner, "owner", line_no)?;
        let owner = owner_from_wire(owner_raw).ok_or_else(|| {
            GameError::malformed(line_no, format!("unknown owner `{owner_raw}`"))
        })?;
        let organ_id = parse_num(organ_id, "organ id", line_no)?;
        let facing = facing_from_token(facing).ok_or_else(|| {
            GameError::malformed(line_no, format!("unknown direction `{facing}`"))
        })?;
        let parent_id = parse_num(parent_id, "parent id", line_no)?;
        let root_id = parse_num(root_id, "root id", line_no)?;
        Ok(Self {
            pos,
            kind,
            owner,
            organ_id,
            facing,
            parent_id,
            root_id,
        })
    }

    /// The wire form of this descriptor.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.pos.x,
            self.pos.y,
            self.kind.token(),
            owner_wire(self.owner),
            self.organ_id,
            facing_token(self.facing),
            self.parent_id,
            self.root_id
        )
    }

    /// Snapshot the wire-visible fields of a cell.
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            pos: entity.pos,
            kind: entity.kind,
            owner: entity.owner,
            organ_id: entity.organ_id,
            facing: entity.facing,
            parent_id: entity.parent_id,
            root_id: entity.root_id,
        }
    }

    /// Materialize a cell from the descriptor. Wire fields are taken as
    /// given; derived per-turn state (harvest marks, ghosts, animation
    /// flags) starts clean.
    #[must_use]
    pub fn into_entity(self) -> Entity {
        let mut entity = Entity::empty(self.pos);
        entity.kind = self.kind;
        entity.owner = self.owner;
        entity.organ_id = self.organ_id;
        entity.facing = self.facing;
        entity.parent_id = self.parent_id;
        entity.root_id = self.root_id;
        entity
    }
}

/// Parse a four-count protein stock line, A through D.
///
/// # Errors
///
/// [`GameError::MalformedInput`] unless the line is exactly four
/// unsigned integers.
pub fn parse_protein_line(raw: &str, line_no: usize) -> GameResult<ProteinCounts> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    let &[a, b, c, d] = fields.as_slice() else {
        return Err(GameError::malformed(
            line_no,
            format!("expected 4 protein counts, got {}", fields.len()),
        ));
    };
    Ok(ProteinCounts::new(
        parse_num(a, "protein A", line_no)?,
        parse_num(b, "protein B", line_no)?,
        parse_num(c, "protein C", line_no)?,
        parse_num(d, "protein D", line_no)?,
    ))
}

/// The wire form of a protein stock line.
#[must_use]
pub fn render_protein_line(counts: ProteinCounts) -> String {
    let parts: Vec<String> = counts
        .entries()
        .map(|(_, count)| count.to_string())
        .collect();
    parts.join(" ")
}

/// The `W H` size header a player receives once at game start.
#[must_use]
pub fn write_size_line(state: &State) -> String {
    format!("{} {}", state.width(), state.height())
}

/// Serialize one turn frame: non-empty entity descriptors, player one's
/// stock, player two's stock, and the perspective player's live root
/// count as the required-actions line. Owners and stocks are absolute;
/// only the action count depends on who receives the frame.
#[must_use]
pub fn write_turn_input(state: &State, perspective: Player) -> Vec<String> {
    let descriptors: Vec<String> = state
        .entities()
        .filter(|cell| cell.kind != CellKind::Empty)
        .map(|cell| EntityLine::from_entity(cell).render())
        .collect();

    let mut lines = Vec::with_capacity(descriptors.len() + 4);
    lines.push(descriptors.len().to_string());
    lines.extend(descriptors);
    lines.push(render_protein_line(state.proteins(Player::One)));
    lines.push(render_protein_line(state.proteins(Player::Two)));
    lines.push(state.roots_of(perspective).count().to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Action, OrganKind, Protein};

    #[test]
    fn test_line_reader_tracks_positions_and_eof() {
        let mut reader = LineReader::new("first\n7\n");
        assert_eq!(reader.next_line().unwrap(), "first");
        assert_eq!(reader.line_no(), 1);
        assert_eq!(reader.next_u32().unwrap(), 7);
        assert_eq!(reader.line_no(), 2);

        let err = reader.next_line().unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed input at line 3: unexpected end of input"
        );
    }

    #[test]
    fn test_entity_line_round_trip() {
        let raw = "3 2 TENTACLE 1 17 W 4 2";
        let line = EntityLine::parse(raw, 1).unwrap();
        assert_eq!(line.pos, Point::new(3, 2));
        assert_eq!(line.kind, CellKind::Tentacle);
        assert_eq!(line.owner, Some(Player::Two));
        assert_eq!(line.organ_id, 17);
        assert_eq!(line.facing, Some(Dir::West));
        assert_eq!(line.parent_id, 4);
        assert_eq!(line.root_id, 2);
        assert_eq!(line.render(), raw);
    }

    #[test]
    fn test_protein_descriptor_round_trip() {
        let raw = "5 0 B -1 0 X 0 0";
        let line = EntityLine::parse(raw, 1).unwrap();
        assert_eq!(line.kind, CellKind::Protein(Protein::B));
        assert_eq!(line.owner, None);
        assert_eq!(line.facing, None);
        assert_eq!(line.render(), raw);

        let entity = line.into_entity();
        assert_eq!(entity.protein_kind(), Some(Protein::B));
        assert!(entity.ghost.is_none());
        assert!(!entity.is_growing);
    }

    #[test]
    fn test_entity_line_rejects_bad_shapes() {
        assert!(EntityLine::parse("1 2 WALL -1 0 X 0", 1).is_err());
        assert!(EntityLine::parse("1 2 WALL -1 0 X 0 0 9", 1).is_err());
        assert!(EntityLine::parse("1 2 CASTLE -1 0 X 0 0", 1).is_err());
        assert!(EntityLine::parse("1 2 WALL 5 0 X 0 0", 1).is_err());
        assert!(EntityLine::parse("1 2 WALL -1 0 Q 0 0", 1).is_err());
        assert!(EntityLine::parse("one 2 WALL -1 0 X 0 0", 1).is_err());
    }

    #[test]
    fn test_protein_line_parses_and_renders() {
        let counts = parse_protein_line("3 0 12 1", 4).unwrap();
        assert_eq!(counts, ProteinCounts::new(3, 0, 12, 1));
        assert_eq!(render_protein_line(counts), "3 0 12 1");

        assert!(parse_protein_line("3 0 12", 4).is_err());
        assert!(parse_protein_line("3 0 12 x", 4).is_err());
        assert!(parse_protein_line("3 0 12 -1", 4).is_err());
    }

    #[test]
    fn test_turn_frame_round_trips_through_refresh() {
        let mut source = State::new(6, 4).unwrap();
        source.place(Entity::organ(
            Point::new(1, 1),
            OrganKind::Root,
            Player::One,
            1,
            None,
            0,
            0,
        ));
        source.place(Entity::organ(
            Point::new(2, 1),
            OrganKind::Sporer,
            Player::One,
            2,
            Some(Dir::East),
            1,
            1,
        ));
        source.place(Entity::organ(
            Point::new(4, 2),
            OrganKind::Root,
            Player::Two,
            3,
            None,
            0,
            0,
        ));
        source.place(Entity::wall(Point::new(0, 0)));
        source.place(Entity::protein(Point::new(5, 3), Protein::D));
        source.set_proteins(Player::One, ProteinCounts::new(1, 2, 3, 4));
        source.set_proteins(Player::Two, ProteinCounts::new(9, 8, 7, 6));

        let frame = write_turn_input(&source, Player::One).join("\n");
        let mut restored = State::new(6, 4).unwrap();
        restored.refresh_state(&mut LineReader::new(&frame)).unwrap();

        assert_eq!(restored.proteins(Player::One), ProteinCounts::new(1, 2, 3, 4));
        assert_eq!(restored.proteins(Player::Two), ProteinCounts::new(9, 8, 7, 6));
        assert_eq!(restored.required_actions(), 1);
        assert_eq!(restored.next_organ_id(), 4);
        for point in [
            Point::new(1, 1),
            Point::new(2, 1),
            Point::new(4, 2),
            Point::new(0, 0),
            Point::new(5, 3),
        ] {
            let original = source.get(point).unwrap();
            let copy = restored.get(point).unwrap();
            assert_eq!(original.kind, copy.kind, "kind mismatch at {point}");
            assert_eq!(original.owner, copy.owner);
            assert_eq!(original.organ_id, copy.organ_id);
            assert_eq!(original.facing, copy.facing);
            assert_eq!(original.parent_id, copy.parent_id);
            assert_eq!(original.root_id, copy.root_id);
        }
    }

    #[test]
    fn test_grown_organ_reappears_in_the_next_frame() {
        let mut state = State::new(4, 3).unwrap();
        state.place(Entity::organ(
            Point::new(0, 1),
            OrganKind::Root,
            Player::One,
            1,
            None,
            0,
            0,
        ));
        state.set_proteins(Player::One, ProteinCounts::splat(5));

        let line = "GROW 1 1 1 TENTACLE E";
        let action = Action::parse(line, Player::One, state.turn(), 1).unwrap();
        assert_eq!(action.output(), line);
        state.apply_action(&action).unwrap();

        let frame = write_turn_input(&state, Player::One);
        assert!(
            frame.iter().any(|entry| entry == "1 1 TENTACLE 0 2 E 1 1"),
            "new organ missing from the frame: {frame:?}"
        );
    }

    #[test]
    fn test_frame_stock_lines_stay_absolute_for_either_seat() {
        let mut state = State::new(3, 3).unwrap();
        state.place(Entity::organ(
            Point::new(1, 1),
            OrganKind::Root,
            Player::Two,
            1,
            None,
            0,
            0,
        ));
        state.set_proteins(Player::One, ProteinCounts::splat(1));
        state.set_proteins(Player::Two, ProteinCounts::splat(2));

        // Stocks keep wire order; only the action count follows the seat.
        let lines = write_turn_input(&state, Player::Two);
        assert_eq!(lines[lines.len() - 3], "1 1 1 1");
        assert_eq!(lines[lines.len() - 2], "2 2 2 2");
        assert_eq!(lines[lines.len() - 1], "1");

        let lines = write_turn_input(&state, Player::One);
        assert_eq!(lines[lines.len() - 3], "1 1 1 1");
        assert_eq!(lines[lines.len() - 2], "2 2 2 2");
        assert_eq!(lines[lines.len() - 1], "0");
    }
}
