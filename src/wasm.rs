//! WASM bindings for the engine.
//!
//! Provides a JavaScript-friendly API: colors are the wire bytes
//! (1 black, 2 white), cells are row-major indices, snapshots are plain
//! objects, and every rule violation surfaces as a thrown error.

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

use crate::board::Color;
use crate::game::{Game, GameConfig, StartingColor};
use crate::map::{self, BoardMap};
use crate::serializer;

/// Names of the built-in map layouts.
#[wasm_bindgen(js_name = mapNames)]
pub fn map_names() -> Vec<String> {
    map::names().into_iter().map(str::to_owned).collect()
}

/// WASM-friendly wrapper owning one game.
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game on a built-in layout.
    /// `starting_color` is "black", "white" or "random"; `seed` drives
    /// the coin toss and only matters for "random".
    #[wasm_bindgen(constructor)]
    pub fn new(
        map_name: &str,
        looped_board: bool,
        can_put_everywhere: bool,
        llotheo: bool,
        starting_color: &str,
        seed: u64,
    ) -> Result<WasmGame, JsError> {
        let map = map::by_name(map_name)
            .ok_or_else(|| JsError::new(&format!("unknown map: {map_name}")))?
            .clone();
        WasmGame::start(map, looped_board, can_put_everywhere, llotheo, starting_color, seed)
    }

    /// Start a game on a caller-supplied layout given as string-art rows
    /// (`-` empty, `b` black, `w` white, `#` blocked).
    #[wasm_bindgen(js_name = withMapRows)]
    pub fn with_map_rows(
        rows: Vec<String>,
        looped_board: bool,
        can_put_everywhere: bool,
        llotheo: bool,
        starting_color: &str,
        seed: u64,
    ) -> Result<WasmGame, JsError> {
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let map = BoardMap::parse(&rows).map_err(|err| JsError::new(&err.to_string()))?;
        WasmGame::start(map, looped_board, can_put_everywhere, llotheo, starting_color, seed)
    }

    /// Restore a game from a binary record.
    pub fn deserialize(record: &[u8]) -> Result<WasmGame, JsError> {
        serializer::deserialize(record)
            .map(|inner| WasmGame { inner })
            .map_err(|err| JsError::new(&err.to_string()))
    }

    /// Canonical binary record of this game.
    pub fn serialize(&self) -> Vec<u8> {
        serializer::serialize(&self.inner)
    }

    /// Color to move (1 black, 2 white).
    pub fn turn(&self) -> u8 {
        self.inner.turn().to_byte()
    }

    #[wasm_bindgen(js_name = isEnded)]
    pub fn is_ended(&self) -> bool {
        self.inner.is_ended()
    }

    /// Winner (1 black, 2 white), or 0 while ongoing and on a draw.
    pub fn winner(&self) -> u8 {
        self.inner.snapshot().winner.unwrap_or(0)
    }

    /// Legal cells for a color, ascending.
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self, color: u8) -> Result<Vec<u16>, JsError> {
        let color = color_from_byte(color)?;
        Ok(self
            .inner
            .legal_moves(color)
            .into_iter()
            .map(|pos| pos as u16)
            .collect())
    }

    /// Whether a color has any legal move. A stuck player must pass.
    #[wasm_bindgen(js_name = hasLegalMove)]
    pub fn has_legal_move(&self, color: u8) -> Result<bool, JsError> {
        Ok(self.inner.has_legal_move(color_from_byte(color)?))
    }

    /// Cells a color would capture by playing `cell` right now; empty
    /// when that placement would be illegal.
    #[wasm_bindgen(js_name = flipSet)]
    pub fn flip_set(&self, color: u8, cell: u16) -> Result<Vec<u16>, JsError> {
        let color = color_from_byte(color)?;
        Ok(self
            .inner
            .flip_set_for(color, cell as usize)
            .into_iter()
            .map(|pos| pos as u16)
            .collect())
    }

    /// Apply a placement and return the updated snapshot.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, color: u8, cell: u16) -> Result<JsValue, JsError> {
        let color = color_from_byte(color)?;
        self.inner
            .apply_move(color, cell as usize)
            .map_err(|err| JsError::new(&err.to_string()))?;
        self.snapshot()
    }

    /// Apply an explicit pass and return the updated snapshot.
    #[wasm_bindgen(js_name = applyPass)]
    pub fn apply_pass(&mut self, color: u8) -> Result<JsValue, JsError> {
        let color = color_from_byte(color)?;
        self.inner
            .apply_pass(color)
            .map_err(|err| JsError::new(&err.to_string()))?;
        self.snapshot()
    }

    /// Current state as a plain object; see `GameSnapshot` for the shape.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot())
            .map_err(|err| JsError::new(&err.to_string()))
    }

    fn start(
        map: BoardMap,
        looped_board: bool,
        can_put_everywhere: bool,
        llotheo: bool,
        starting_color: &str,
        seed: u64,
    ) -> Result<WasmGame, JsError> {
        let starting_color = match starting_color {
            "black" => StartingColor::Black,
            "white" => StartingColor::White,
            "random" => StartingColor::Random,
            other => return Err(JsError::new(&format!("unknown starting color: {other}"))),
        };
        let config = GameConfig {
            map,
            looped_board,
            can_put_everywhere,
            llotheo,
            starting_color,
        };
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(WasmGame {
            inner: Game::new(config, &mut rng),
        })
    }
}

fn color_from_byte(byte: u8) -> Result<Color, JsError> {
    Color::from_byte(byte).ok_or_else(|| JsError::new(&format!("invalid color byte: {byte}")))
}
