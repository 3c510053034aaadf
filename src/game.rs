//! Game state machine: turn order, move legality, passes, and the
//! terminal rules.
//!
//! The engine never moves on its own. Every placement and every pass is
//! submitted by the host, including forced passes; when the side to move
//! has no legal reply the engine only reports it (see
//! [`MoveOutcome::must_pass`] and [`Game::has_legal_move`]) and waits for
//! an explicit [`Game::apply_pass`].

use rand::Rng;

use crate::board::{Board, Cell, Color};
use crate::map::BoardMap;
use crate::types::GameSnapshot;

/// Which color takes the first ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartingColor {
    Black,
    White,
    Random,
}

impl From<Color> for StartingColor {
    fn from(color: Color) -> StartingColor {
        match color {
            Color::Black => StartingColor::Black,
            Color::White => StartingColor::White,
        }
    }
}

/// Immutable rule set, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub map: BoardMap,
    /// Opposite edges are adjacent; flip lines wrap around.
    pub looped_board: bool,
    /// Any empty unblocked cell is playable, even without a capture.
    pub can_put_everywhere: bool,
    /// Inverted scoring: the smaller disc count wins.
    pub llotheo: bool,
    pub starting_color: StartingColor,
}

impl GameConfig {
    /// Default rules on the given map: flat board, captures required,
    /// standard scoring, black to start.
    pub fn new(map: BoardMap) -> GameConfig {
        GameConfig {
            map,
            looped_board: false,
            can_put_everywhere: false,
            llotheo: false,
            starting_color: StartingColor::Black,
        }
    }
}

/// Terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    BlackWins,
    WhiteWins,
    Draw,
}

/// Game phase. `Ended` carries the outcome so it is computed exactly
/// once, when the game ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Ended(Outcome),
}

/// One submitted action: placing a disc or passing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Place(usize),
    Pass,
}

/// One accepted ply together with the flips it caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    pub color: Color,
    pub action: Action,
    pub flips: Vec<usize>,
}

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Cells flipped to the mover's color, ascending.
    pub flips: Vec<usize>,
    /// Status after the placement.
    pub status: Status,
    /// The side now to move has no legal reply and must submit a pass.
    /// Always `false` once the game has ended.
    pub must_pass: bool,
}

/// Rejected submissions. The state is untouched whenever one of these
/// is returned.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("it is not {0}'s turn")]
    NotPlayersTurn(Color),
    #[error("the game has already ended")]
    GameEnded,
    #[error("illegal move at cell {0}")]
    IllegalMove(usize),
    #[error("{0} cannot pass while a legal move remains")]
    IllegalPass(Color),
}

/// Live game: board, turn, ply log, and terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    config: GameConfig,
    starting: Color,
    turn: Color,
    status: Status,
    log: Vec<Ply>,
}

impl Game {
    /// Starts a game, resolving [`StartingColor::Random`] with `rng`.
    /// The generator is consulted only for `Random`, so seeded callers
    /// get reproducible games.
    pub fn new<R: Rng>(config: GameConfig, rng: &mut R) -> Game {
        let starting = match config.starting_color {
            StartingColor::Black => Color::Black,
            StartingColor::White => Color::White,
            StartingColor::Random => {
                if rng.random() {
                    Color::Black
                } else {
                    Color::White
                }
            }
        };
        Game::with_starting_color(config, starting)
    }

    /// Starts a game with the coin toss already decided, ignoring
    /// `config.starting_color`. Hosts that resolve the toss themselves
    /// and log replay both enter here.
    pub fn with_starting_color(config: GameConfig, starting: Color) -> Game {
        let board = Board::from_map(&config.map, config.looped_board);
        let mut game = Game {
            board,
            config,
            starting,
            turn: starting,
            status: Status::InProgress,
            log: Vec::new(),
        };
        game.evaluate_end();
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Color that took (or would take) the first ply.
    pub fn starting_color(&self) -> Color {
        self.starting
    }

    /// Color to move. Once the game has ended, the color that would
    /// have moved next.
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.status, Status::Ended(_))
    }

    /// Terminal outcome, `None` while the game is in progress.
    pub fn result(&self) -> Option<Outcome> {
        match self.status {
            Status::Ended(outcome) => Some(outcome),
            Status::InProgress => None,
        }
    }

    /// Accepted plies in submission order.
    pub fn log(&self) -> &[Ply] {
        &self.log
    }

    /// Returns `(black_count, white_count)`.
    pub fn counts(&self) -> (u16, u16) {
        self.board.count()
    }

    /// Cells where `color` may currently place a disc, ascending.
    pub fn legal_moves(&self, color: Color) -> Vec<usize> {
        (0..self.board.cell_count())
            .filter(|&pos| self.can_put(color, pos))
            .collect()
    }

    /// Whether `color` has at least one legal move. Hosts use this to
    /// detect a forced pass.
    pub fn has_legal_move(&self, color: Color) -> bool {
        (0..self.board.cell_count()).any(|pos| self.can_put(color, pos))
    }

    /// Whether `color` may place at `pos` under the active rules. The
    /// cell must be empty and unblocked; unless `can_put_everywhere` is
    /// set the placement must also capture.
    pub fn can_put(&self, color: Color, pos: usize) -> bool {
        if self.board.get(pos) != Some(Cell::Empty) {
            return false;
        }
        self.config.can_put_everywhere || self.board.can_flip(color, pos)
    }

    /// Discs `color` would capture by playing `pos` right now. Empty
    /// when that placement would be illegal.
    pub fn flip_set_for(&self, color: Color, pos: usize) -> Vec<usize> {
        if !self.can_put(color, pos) {
            return Vec::new();
        }
        self.board.flip_set(color, pos)
    }

    /// Places a disc for `color` at `pos`, flips the captured discs,
    /// logs the ply, and hands the turn to the opponent.
    pub fn apply_move(&mut self, color: Color, pos: usize) -> Result<MoveOutcome, GameError> {
        if self.is_ended() {
            return Err(GameError::GameEnded);
        }
        if color != self.turn {
            return Err(GameError::NotPlayersTurn(color));
        }
        if !self.can_put(color, pos) {
            return Err(GameError::IllegalMove(pos));
        }

        let flips = self.board.flip_set(color, pos);
        self.board.set(pos, Cell::Disc(color));
        for &flip in &flips {
            self.board.set(flip, Cell::Disc(color));
        }
        self.log.push(Ply {
            color,
            action: Action::Place(pos),
            flips: flips.clone(),
        });
        self.turn = color.opponent();
        self.evaluate_end();

        let must_pass = !self.is_ended() && !self.has_legal_move(self.turn);
        Ok(MoveOutcome {
            flips,
            status: self.status,
            must_pass,
        })
    }

    /// Records a pass for `color` and hands the turn to the opponent.
    /// Only legal while `color` has no legal move.
    pub fn apply_pass(&mut self, color: Color) -> Result<(), GameError> {
        if self.is_ended() {
            return Err(GameError::GameEnded);
        }
        if color != self.turn {
            return Err(GameError::NotPlayersTurn(color));
        }
        if self.has_legal_move(color) {
            return Err(GameError::IllegalPass(color));
        }
        self.log.push(Ply {
            color,
            action: Action::Pass,
            flips: Vec::new(),
        });
        self.turn = color.opponent();
        self.evaluate_end();
        Ok(())
    }

    /// Flat host-facing view of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        let (black_count, white_count) = self.board.count();
        let last = self.log.last();
        GameSnapshot {
            width: self.board.width(),
            height: self.board.height(),
            board: self.board.to_bytes(),
            turn: self.turn.to_byte(),
            black_count,
            white_count,
            is_ended: self.is_ended(),
            winner: match self.status {
                Status::Ended(Outcome::BlackWins) => Some(Color::Black.to_byte()),
                Status::Ended(Outcome::WhiteWins) => Some(Color::White.to_byte()),
                _ => None,
            },
            just_passed: matches!(
                last,
                Some(Ply {
                    action: Action::Pass,
                    ..
                })
            ),
            flipped: last
                .map(|ply| ply.flips.iter().map(|&pos| pos as u16).collect())
                .unwrap_or_default(),
        }
    }

    // Terminal check, run at construction and after every accepted ply.
    // The game ends when no empty cell remains or when neither color has
    // a legal move.
    fn evaluate_end(&mut self) {
        if self.is_ended() {
            return;
        }
        let stuck = !self.has_legal_move(Color::Black) && !self.has_legal_move(Color::White);
        if !self.board.has_empty() || stuck {
            self.status = Status::Ended(self.outcome());
        }
    }

    // Disc-count comparison. Llotheo inverts it so the smaller count
    // wins; equal counts draw in both modes.
    fn outcome(&self) -> Outcome {
        let (black, white) = self.board.count();
        if black == white {
            return Outcome::Draw;
        }
        let black_ahead = black > white;
        let black_wins = if self.config.llotheo {
            !black_ahead
        } else {
            black_ahead
        };
        if black_wins {
            Outcome::BlackWins
        } else {
            Outcome::WhiteWins
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::map;

    fn config_on(rows: &[&str]) -> GameConfig {
        GameConfig::new(BoardMap::parse(rows).expect("test map must parse"))
    }

    fn standard_game() -> Game {
        let map = map::by_name("standard").expect("standard exists").clone();
        Game::with_starting_color(GameConfig::new(map), Color::Black)
    }

    #[test]
    fn standard_opening_has_four_legal_moves_for_black() {
        let game = standard_game();
        assert_eq!(game.legal_moves(Color::Black), vec![19, 26, 37, 44]);
        assert!(game.has_legal_move(Color::Black));
        assert!(!game.is_ended());
        assert_eq!(game.result(), None);
    }

    #[test]
    fn opening_capture_flips_one_disc_and_hands_the_turn() {
        let mut game = standard_game();
        let outcome = game.apply_move(Color::Black, 19).expect("d3 is legal");
        assert_eq!(outcome.flips, vec![27]);
        assert_eq!(outcome.status, Status::InProgress);
        assert!(!outcome.must_pass);
        assert_eq!(game.counts(), (4, 1));
        assert_eq!(game.board().empty_count(), 59);
        assert_eq!(game.turn(), Color::White);
        assert_eq!(game.log().len(), 1);
    }

    #[test]
    fn apply_move_rejects_out_of_turn_colors() {
        let mut game = standard_game();
        assert_eq!(
            game.apply_move(Color::White, 20),
            Err(GameError::NotPlayersTurn(Color::White))
        );
        assert_eq!(game.log().len(), 0);
    }

    #[test]
    fn apply_move_rejects_occupied_flipless_and_out_of_range_cells() {
        let mut game = standard_game();
        assert_eq!(
            game.apply_move(Color::Black, 27),
            Err(GameError::IllegalMove(27))
        );
        assert_eq!(
            game.apply_move(Color::Black, 0),
            Err(GameError::IllegalMove(0))
        );
        assert_eq!(
            game.apply_move(Color::Black, 9999),
            Err(GameError::IllegalMove(9999))
        );
        assert_eq!(game.counts(), (2, 2));
    }

    #[test]
    fn blocked_cells_are_never_legal_targets() {
        let map = map::by_name("rounded").expect("rounded exists").clone();
        let mut config = GameConfig::new(map);
        let mut game = Game::with_starting_color(config.clone(), Color::Black);
        assert_eq!(
            game.apply_move(Color::Black, 0),
            Err(GameError::IllegalMove(0))
        );

        config.can_put_everywhere = true;
        let mut game = Game::with_starting_color(config, Color::Black);
        assert_eq!(
            game.apply_move(Color::Black, 0),
            Err(GameError::IllegalMove(0))
        );
        assert!(!game.legal_moves(Color::Black).contains(&0));
    }

    #[test]
    fn can_put_everywhere_lifts_the_flip_requirement_but_keeps_flips() {
        let map = map::by_name("standard").expect("standard exists").clone();
        let mut config = GameConfig::new(map);
        config.can_put_everywhere = true;

        let mut game = Game::with_starting_color(config.clone(), Color::Black);
        let outcome = game.apply_move(Color::Black, 0).expect("corner is playable");
        assert!(outcome.flips.is_empty());
        assert_eq!(game.counts(), (3, 2));

        let mut game = Game::with_starting_color(config, Color::Black);
        let outcome = game.apply_move(Color::Black, 19).expect("d3 still captures");
        assert_eq!(outcome.flips, vec![27]);
    }

    #[test]
    fn flip_set_for_is_empty_when_the_move_is_illegal() {
        let game = standard_game();
        assert_eq!(game.flip_set_for(Color::Black, 19), vec![27]);
        assert!(game.flip_set_for(Color::Black, 0).is_empty());
        assert!(game.flip_set_for(Color::Black, 27).is_empty());
        assert!(game.flip_set_for(Color::White, 19).is_empty());
    }

    #[test]
    fn pass_is_rejected_while_a_legal_move_exists() {
        let mut game = standard_game();
        assert_eq!(
            game.apply_pass(Color::Black),
            Err(GameError::IllegalPass(Color::Black))
        );
        assert_eq!(game.turn(), Color::Black);
    }

    #[test]
    fn stuck_player_passes_explicitly_and_play_continues() {
        let rows = [
            "-wwwwwww",
            "bwwwwwww",
            "wwwwwwww",
            "wwwwwwww",
            "wwwwwwww",
            "wwwwwwww",
            "wwwwwwww",
            "wwwwwwww",
        ];
        let mut game = Game::with_starting_color(config_on(&rows), Color::Black);
        assert!(!game.is_ended());
        assert!(!game.has_legal_move(Color::Black));
        assert!(game.has_legal_move(Color::White));

        game.apply_pass(Color::Black).expect("black is stuck");
        assert_eq!(game.turn(), Color::White);
        assert!(game.snapshot().just_passed);
        assert_eq!(
            game.log().last(),
            Some(&Ply {
                color: Color::Black,
                action: Action::Pass,
                flips: Vec::new(),
            })
        );

        let outcome = game.apply_move(Color::White, 0).expect("a1 captures");
        assert_eq!(outcome.flips, vec![8]);
        assert_eq!(outcome.status, Status::Ended(Outcome::WhiteWins));
        assert_eq!(game.counts(), (0, 64));
        assert_eq!(game.result(), Some(Outcome::WhiteWins));
        assert_eq!(game.snapshot().winner, Some(2));
    }

    #[test]
    fn forced_pass_sequence_plays_out_to_the_end() {
        let mut game = Game::with_starting_color(config_on(&["bw-w-"]), Color::Black);
        let outcome = game.apply_move(Color::Black, 2).expect("capture at x2");
        assert_eq!(outcome.flips, vec![1]);
        assert_eq!(outcome.status, Status::InProgress);
        assert!(outcome.must_pass);

        game.apply_pass(Color::White).expect("white is stuck");
        let outcome = game.apply_move(Color::Black, 4).expect("final capture");
        assert_eq!(outcome.flips, vec![3]);
        assert_eq!(outcome.status, Status::Ended(Outcome::BlackWins));
        assert!(!outcome.must_pass);
        assert_eq!(game.counts(), (5, 0));
    }

    #[test]
    fn game_with_no_moves_for_either_color_ends_at_construction() {
        let mut config = config_on(&["b-w-"]);
        let game = Game::with_starting_color(config.clone(), Color::Black);
        assert!(game.is_ended());
        assert!(game.board().has_empty());
        assert!(game.legal_moves(Color::Black).is_empty());
        assert!(game.legal_moves(Color::White).is_empty());
        assert_eq!(game.result(), Some(Outcome::Draw));

        config.llotheo = true;
        let game = Game::with_starting_color(config, Color::Black);
        assert_eq!(game.result(), Some(Outcome::Draw));
    }

    #[test]
    fn full_board_ends_immediately_with_a_draw() {
        let game = Game::with_starting_color(config_on(&["bw", "wb"]), Color::Black);
        assert!(game.is_ended());
        assert_eq!(game.result(), Some(Outcome::Draw));
    }

    #[test]
    fn llotheo_awards_the_win_to_the_smaller_count() {
        let mut config = config_on(&["bb", "bw"]);
        let game = Game::with_starting_color(config.clone(), Color::Black);
        assert_eq!(game.result(), Some(Outcome::BlackWins));

        config.llotheo = true;
        let game = Game::with_starting_color(config, Color::Black);
        assert_eq!(game.result(), Some(Outcome::WhiteWins));
    }

    #[test]
    fn ended_game_rejects_every_submission() {
        let mut game = Game::with_starting_color(config_on(&["bw", "wb"]), Color::Black);
        assert!(game.is_ended());
        assert_eq!(game.apply_move(Color::Black, 0), Err(GameError::GameEnded));
        assert_eq!(game.apply_move(Color::White, 0), Err(GameError::GameEnded));
        assert_eq!(game.apply_pass(Color::Black), Err(GameError::GameEnded));
        assert_eq!(game.apply_pass(Color::White), Err(GameError::GameEnded));
    }

    #[test]
    fn looped_wrap_changes_move_legality() {
        let rows = ["----", "wwb-", "----", "----"];
        let mut config = config_on(&rows);

        let mut flat = Game::with_starting_color(config.clone(), Color::Black);
        assert_eq!(
            flat.apply_move(Color::Black, 7),
            Err(GameError::IllegalMove(7))
        );

        config.looped_board = true;
        let mut looped = Game::with_starting_color(config, Color::Black);
        let outcome = looped.apply_move(Color::Black, 7).expect("wraps and captures");
        assert_eq!(outcome.flips, vec![4, 5]);
    }

    #[test]
    fn random_starting_color_is_reproducible_from_the_seed() {
        let map = map::by_name("standard").expect("standard exists").clone();
        let mut config = GameConfig::new(map);
        config.starting_color = StartingColor::Random;

        for seed in 0..16 {
            let mut a = StdRng::seed_from_u64(seed);
            let mut b = StdRng::seed_from_u64(seed);
            let first = Game::new(config.clone(), &mut a);
            let second = Game::new(config.clone(), &mut b);
            assert_eq!(first.starting_color(), second.starting_color());
            assert_eq!(first.turn(), first.starting_color());
        }

        let mut saw_black = false;
        let mut saw_white = false;
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            match Game::new(config.clone(), &mut rng).starting_color() {
                Color::Black => saw_black = true,
                Color::White => saw_white = true,
            }
        }
        assert!(saw_black && saw_white);

        config.starting_color = StartingColor::White;
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Game::new(config, &mut rng).starting_color(), Color::White);
    }

    #[test]
    fn greedy_playout_preserves_invariants_and_terminates() {
        let mut game = standard_game();
        while !game.is_ended() {
            let turn = game.turn();
            match game.legal_moves(turn).first().copied() {
                Some(pos) => {
                    let expected = game.flip_set_for(turn, pos);
                    let outcome = game.apply_move(turn, pos).expect("chosen move is legal");
                    assert_eq!(outcome.flips, expected);
                    assert!(!outcome.flips.is_empty());
                }
                None => game.apply_pass(turn).expect("no legal move remains"),
            }
            let (black, white) = game.counts();
            assert_eq!(
                black + white + game.board().empty_count(),
                64,
                "discs and empties must account for every cell"
            );
        }

        for (index, ply) in game.log().iter().enumerate() {
            let expected = if index % 2 == 0 {
                Color::Black
            } else {
                Color::White
            };
            assert_eq!(ply.color, expected, "turn order must alternate strictly");
        }
        assert!(game.result().is_some());
        assert!(
            !game.board().has_empty()
                || (!game.has_legal_move(Color::Black) && !game.has_legal_move(Color::White))
        );
    }
}
