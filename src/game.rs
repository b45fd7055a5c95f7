//! Shobu rules: board representation, move generation and move execution.
//!
//! The full board is four 4x4 sub-boards laid out as
//!
//! ```text
//!   2 | 3      Black's home boards
//!   --+--
//!   0 | 1      White's home boards
//! ```
//!
//! Boards 0 and 2 form the light column, boards 1 and 3 the dark one.
//! Squares are numbered row by row from the bottom-left corner of each
//! sub-board, so square `p` sits at column `p % 4` and row `p / 4`.
//!
//! A move is a passive move on one of the mover's home boards followed by an
//! active move with the same direction and length on a board of the other
//! colour. Only the active stone may push, and it pushes at most one
//! opposing stone. A player left with no stones on any sub-board loses.

use std::fmt;

use crate::constants::{
    BOTTOM_ROW, KEY_BLACK, KEY_EMPTY, KEY_WHITE, MAX_GAME_LEN, MAX_STEP, SIDE, SUB_BOARDS,
    TOP_ROW,
};
use crate::error::EngineError;

/// A square on a sub-board, 0..16.
pub type Square = u8;

/// A sub-board index, 0..4.
pub type BoardId = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    White,
    Black,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::White, Player::Black];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// The two sub-boards on which this player makes passive moves.
    pub fn home_boards(self) -> [BoardId; 2] {
        match self {
            Player::White => [0, 1],
            Player::Black => [2, 3],
        }
    }

    pub fn is_home(self, board: BoardId) -> bool {
        self.home_boards().contains(&board)
    }

    /// Character used for this player's stones in a board key.
    pub fn marker(self) -> u8 {
        match self {
            Player::White => KEY_WHITE,
            Player::Black => KEY_BLACK,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// One of the eight compass directions. North points towards row 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Column and row step, `(dx, dy)`.
    pub fn delta(self) -> (i8, i8) {
        match self {
            Direction::N => (0, 1),
            Direction::NE => (1, 1),
            Direction::E => (1, 0),
            Direction::SE => (1, -1),
            Direction::S => (0, -1),
            Direction::SW => (-1, -1),
            Direction::W => (-1, 0),
            Direction::NW => (-1, 1),
        }
    }

    /// Offset in square numbers (N = +4, E = +1, NE = +5, NW = +3).
    pub fn offset(self) -> i8 {
        let (dx, dy) = self.delta();
        dy * SIDE as i8 + dx
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The square one step away in `direction`, or `None` off the edge.
#[inline]
pub fn step(square: Square, direction: Direction) -> Option<Square> {
    let (dx, dy) = direction.delta();
    let x = (square % SIDE) as i8 + dx;
    let y = (square / SIDE) as i8 + dy;
    let side = SIDE as i8;
    if (0..side).contains(&x) && (0..side).contains(&y) {
        Some(y as u8 * SIDE + x as u8)
    } else {
        None
    }
}

/// Iterate over the squares set in a 16-bit mask, lowest first.
pub fn squares_of(mut mask: u16) -> impl Iterator<Item = Square> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let square = mask.trailing_zeros() as Square;
        mask &= mask - 1;
        Some(square)
    })
}

/// A Shobu move: a passive slide and an active slide sharing direction and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action {
    pub passive_board: BoardId,
    pub passive_stone: Square,
    pub active_board: BoardId,
    pub active_stone: Square,
    pub direction: Direction,
    pub length: u8,
}

impl Action {
    pub fn new(
        passive_board: BoardId,
        passive_stone: Square,
        active_board: BoardId,
        active_stone: Square,
        direction: Direction,
        length: u8,
    ) -> Self {
        Self {
            passive_board,
            passive_stone,
            active_board,
            active_stone,
            direction,
            length,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}:{} {}x{}",
            self.passive_board,
            self.passive_stone,
            self.active_board,
            self.active_stone,
            self.direction,
            self.length
        )
    }
}

/// What an action does to the opposing stones on the active board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MoveKind {
    Quiet,
    /// An opposing stone is displaced but stays on the board.
    Push,
    /// An opposing stone is pushed off the board.
    Capture,
}

/// The four sub-boards, each holding one stone mask per player.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    stones: [[u16; 2]; SUB_BOARDS],
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            stones: [[0; 2]; SUB_BOARDS],
        }
    }

    /// The starting position: White on row 0, Black on row 3 of every sub-board.
    pub fn initial() -> Self {
        let mut stones = [[0; 2]; SUB_BOARDS];
        for sub in &mut stones {
            sub[Player::White.index()] = BOTTOM_ROW;
            sub[Player::Black.index()] = TOP_ROW;
        }
        Self { stones }
    }

    /// Build a board from `(board, square, player)` triples.
    pub fn from_stones(stones: &[(BoardId, Square, Player)]) -> Self {
        let mut board = Self::empty();
        for &(b, square, player) in stones {
            board.place(b, square, player);
        }
        board
    }

    /// Put a stone on a square, replacing whatever stood there.
    pub fn place(&mut self, board: BoardId, square: Square, player: Player) {
        self.lift(board, square, player.opponent());
        self.put(board, square, player);
    }

    /// Remove any stone from a square.
    pub fn clear_square(&mut self, board: BoardId, square: Square) {
        self.lift(board, square, Player::White);
        self.lift(board, square, Player::Black);
    }

    #[inline]
    fn put(&mut self, board: BoardId, square: Square, player: Player) {
        self.stones[board as usize][player.index()] |= 1 << square;
    }

    #[inline]
    fn lift(&mut self, board: BoardId, square: Square, player: Player) {
        self.stones[board as usize][player.index()] &= !(1 << square);
    }

    /// Stone mask of `player` on `board`.
    #[inline]
    pub fn stones(&self, board: BoardId, player: Player) -> u16 {
        self.stones[board as usize][player.index()]
    }

    pub fn squares(&self, board: BoardId, player: Player) -> impl Iterator<Item = Square> {
        squares_of(self.stones(board, player))
    }

    #[inline]
    pub fn owner(&self, board: BoardId, square: Square) -> Option<Player> {
        let bit = 1 << square;
        Player::ALL
            .into_iter()
            .find(|&p| self.stones(board, p) & bit != 0)
    }

    #[inline]
    pub fn is_empty_at(&self, board: BoardId, square: Square) -> bool {
        let sub = self.stones[board as usize];
        (sub[0] | sub[1]) & (1 << square) == 0
    }

    pub fn count(&self, board: BoardId, player: Player) -> u32 {
        self.stones(board, player).count_ones()
    }

    /// Stones of `player` on the whole board.
    pub fn total(&self, player: Player) -> u32 {
        (0..SUB_BOARDS as BoardId).map(|b| self.count(b, player)).sum()
    }

    /// Fewest stones `player` has on any one sub-board.
    pub fn min_count(&self, player: Player) -> u32 {
        (0..SUB_BOARDS as BoardId)
            .map(|b| self.count(b, player))
            .min()
            .unwrap_or(0)
    }

    /// The player who has been wiped off some sub-board, if any.
    pub fn eliminated(&self) -> Option<Player> {
        Player::ALL.into_iter().find(|&p| self.min_count(p) == 0)
    }

    /// The board after `player` plays `action`. The action is assumed legal.
    pub fn with_action(&self, player: Player, action: &Action) -> Board {
        let mut next = *self;
        let (direction, length) = (action.direction, action.length);

        if let Some(to) = passive_slide(
            self,
            action.passive_board,
            action.passive_stone,
            direction,
            length,
        ) {
            next.lift(action.passive_board, action.passive_stone, player);
            next.put(action.passive_board, to, player);
        }

        if let Some(slide) = active_slide(
            self,
            action.active_board,
            action.active_stone,
            direction,
            length,
            player,
        ) {
            next.lift(action.active_board, action.active_stone, player);
            if let Some(push) = slide.push {
                next.lift(action.active_board, push.from, player.opponent());
                if let Some(dest) = push.to {
                    next.put(action.active_board, dest, player.opponent());
                }
            }
            next.put(action.active_board, slide.to, player);
        }

        next
    }

    /// Character for one square in the board key / text diagram.
    pub fn marker(&self, board: BoardId, square: Square) -> u8 {
        self.owner(board, square).map_or(KEY_EMPTY, Player::marker)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\n{self})")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (left, right) in [(2, 3), (0, 1)] {
            for row in (0..SIDE).rev() {
                for (i, b) in [left, right].into_iter().enumerate() {
                    if i > 0 {
                        write!(f, " |")?;
                    }
                    for col in 0..SIDE {
                        write!(f, " {}", self.marker(b, row * SIDE + col) as char)?;
                    }
                }
                writeln!(f)?;
            }
            if left == 2 {
                writeln!(f, "---------+---------")?;
            }
        }
        Ok(())
    }
}

/// Destination of a non-pushing slide, or `None` if the path is blocked or leaves the board.
fn passive_slide(
    board: &Board,
    b: BoardId,
    from: Square,
    direction: Direction,
    length: u8,
) -> Option<Square> {
    let mut square = from;
    for _ in 0..length {
        square = step(square, direction)?;
        if !board.is_empty_at(b, square) {
            return None;
        }
    }
    Some(square)
}

#[derive(Debug, Clone, Copy)]
struct Push {
    from: Square,
    /// `None` when the stone leaves the board.
    to: Option<Square>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveSlide {
    to: Square,
    push: Option<Push>,
}

/// Outcome of an active slide, or `None` if the slide is illegal.
fn active_slide(
    board: &Board,
    b: BoardId,
    from: Square,
    direction: Direction,
    length: u8,
    player: Player,
) -> Option<ActiveSlide> {
    let mut square = from;
    let mut victim = None;
    for _ in 0..length {
        square = step(square, direction)?;
        match board.owner(b, square) {
            None => {}
            Some(p) if p == player => return None,
            Some(_) => {
                if victim.is_some() {
                    return None;
                }
                victim = Some(square);
            }
        }
    }

    let Some(victim) = victim else {
        return Some(ActiveSlide {
            to: square,
            push: None,
        });
    };

    // The pushed stone ends just beyond the active stone.
    let landing = step(square, direction);
    if let Some(l) = landing {
        if !board.is_empty_at(b, l) {
            return None;
        }
    }
    Some(ActiveSlide {
        to: square,
        push: Some(Push {
            from: victim,
            to: landing,
        }),
    })
}

/// Boards of the other colour than `passive`.
#[inline]
fn active_boards(passive: BoardId) -> [BoardId; 2] {
    if passive % 2 == 0 { [1, 3] } else { [0, 2] }
}

/// All legal actions of `player` on `board`.
pub fn legal_actions_for(board: &Board, player: Player) -> Vec<Action> {
    let mut actions = Vec::with_capacity(256);
    for passive_board in player.home_boards() {
        for passive_stone in board.squares(passive_board, player) {
            for direction in Direction::ALL {
                for length in 1..=MAX_STEP {
                    if passive_slide(board, passive_board, passive_stone, direction, length)
                        .is_none()
                    {
                        continue;
                    }
                    for active_board in active_boards(passive_board) {
                        for active_stone in board.squares(active_board, player) {
                            if active_slide(
                                board,
                                active_board,
                                active_stone,
                                direction,
                                length,
                                player,
                            )
                            .is_some()
                            {
                                actions.push(Action::new(
                                    passive_board,
                                    passive_stone,
                                    active_board,
                                    active_stone,
                                    direction,
                                    length,
                                ));
                            }
                        }
                    }
                }
            }
        }
    }
    actions
}

/// Classify what `action` by `player` does to the opposing stones.
pub fn classify(board: &Board, player: Player, action: &Action) -> MoveKind {
    let slide = active_slide(
        board,
        action.active_board,
        action.active_stone,
        action.direction,
        action.length,
        player,
    );
    match slide.and_then(|s| s.push) {
        None => MoveKind::Quiet,
        Some(Push { to: None, .. }) => MoveKind::Capture,
        Some(Push { to: Some(_), .. }) => MoveKind::Push,
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win(Player),
    Draw,
}

/// A game state. Immutable: moves produce new states.
#[derive(Clone, PartialEq)]
pub struct State {
    board: Board,
    to_move: Player,
    ply: u32,
    move_limit: u32,
    actions: Vec<Action>,
    outcome: Option<Outcome>,
}

impl Default for State {
    fn default() -> Self {
        Self::initial()
    }
}

impl State {
    /// The starting position with Black to move.
    pub fn initial() -> Self {
        Self::new(Board::initial(), Player::Black)
    }

    /// A custom position with the default move limit.
    pub fn new(board: Board, to_move: Player) -> Self {
        Self::from_parts(board, to_move, 0, MAX_GAME_LEN)
    }

    /// A custom position with an explicit ply count and move limit.
    pub fn from_parts(board: Board, to_move: Player, ply: u32, move_limit: u32) -> Self {
        let mut outcome = if let Some(loser) = board.eliminated() {
            Some(Outcome::Win(loser.opponent()))
        } else if ply >= move_limit {
            Some(Outcome::Draw)
        } else {
            None
        };

        let actions = if outcome.is_none() {
            legal_actions_for(&board, to_move)
        } else {
            Vec::new()
        };
        // A player who cannot move loses.
        if outcome.is_none() && actions.is_empty() {
            outcome = Some(Outcome::Win(to_move.opponent()));
        }

        Self {
            board,
            to_move,
            ply,
            move_limit,
            actions,
            outcome,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    pub fn move_limit(&self) -> u32 {
        self.move_limit
    }

    /// Legal actions for the player to move. Empty exactly when terminal.
    #[inline]
    pub fn legal_actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_legal(&self, action: &Action) -> bool {
        self.actions.contains(action)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            Some(Outcome::Win(p)) => Some(p),
            _ => None,
        }
    }

    /// +1 if `player` won, -1 if they lost, 0 for a draw or a live game.
    pub fn utility(&self, player: Player) -> i32 {
        match self.outcome {
            Some(Outcome::Win(p)) if p == player => 1,
            Some(Outcome::Win(_)) => -1,
            Some(Outcome::Draw) | None => 0,
        }
    }

    /// The state after the player to move plays `action`.
    ///
    /// The action must come from [`State::legal_actions`]; use
    /// [`State::try_apply`] for unchecked input.
    pub fn apply(&self, action: &Action) -> State {
        debug_assert!(!self.is_terminal(), "apply called on a terminal state");
        debug_assert!(self.is_legal(action), "apply called with illegal action {action}");
        let board = self.board.with_action(self.to_move, action);
        State::from_parts(board, self.to_move.opponent(), self.ply + 1, self.move_limit)
    }

    /// Like [`State::apply`] but rejects terminal states and illegal actions.
    pub fn try_apply(&self, action: &Action) -> Result<State, EngineError> {
        if self.is_terminal() {
            return Err(EngineError::TerminalPosition);
        }
        if !self.is_legal(action) {
            return Err(EngineError::IllegalAction {
                action: *action,
                player: self.to_move,
            });
        }
        Ok(self.apply(action))
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("to_move", &self.to_move)
            .field("ply", &self.ply)
            .field("actions", &self.actions.len())
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)?;
        match self.outcome {
            Some(Outcome::Win(p)) => writeln!(f, "ply {}: {p} wins", self.ply),
            Some(Outcome::Draw) => writeln!(f, "ply {}: draw", self.ply),
            None => writeln!(f, "ply {}: {} to move", self.ply, self.to_move),
        }
    }
}
