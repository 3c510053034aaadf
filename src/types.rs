//! Shared serializable types crossing the engine boundary.

use serde::Serialize;

/// Host-facing view of a game, flattened for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub width: u8,
    pub height: u8,
    /// Cell coding, row-major: 0 empty, 1 black, 2 white, 3 blocked.
    pub board: Vec<u8>,
    /// Color to move: 1 black, 2 white. Once the game has ended this is
    /// the color that would have moved next.
    pub turn: u8,
    pub black_count: u16,
    pub white_count: u16,
    pub is_ended: bool,
    /// Contract:
    /// - `None` while the game runs, and on a draw.
    /// - `Some(1)` / `Some(2)` for a black / white win.
    pub winner: Option<u8>,
    /// Contract:
    /// - `true` when the most recent ply was a pass.
    /// - `false` after a placement or before any ply.
    pub just_passed: bool,
    /// Flip set of the most recent placement; empty after a pass or at
    /// the start of the game.
    pub flipped: Vec<u16>,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::game::{Game, GameConfig};
    use crate::map;

    #[test]
    fn snapshot_serializes_to_the_documented_shape() {
        let config = GameConfig::new(map::by_name("standard").expect("standard exists").clone());
        let mut rng = StdRng::seed_from_u64(0);
        let mut game = Game::new(config, &mut rng);
        let first = game.legal_moves(crate::board::Color::Black)[0];
        game.apply_move(crate::board::Color::Black, first)
            .expect("opening move is legal");

        let value = serde_json::to_value(game.snapshot()).expect("snapshot serializes");
        assert_eq!(value["width"], 8);
        assert_eq!(value["height"], 8);
        assert_eq!(value["board"].as_array().map(Vec::len), Some(64));
        assert_eq!(value["turn"], 2);
        assert_eq!(value["black_count"], 4);
        assert_eq!(value["white_count"], 1);
        assert_eq!(value["is_ended"], false);
        assert!(value["winner"].is_null());
        assert_eq!(value["just_passed"], false);
        assert_eq!(value["flipped"].as_array().map(Vec::len), Some(1));
    }
}
