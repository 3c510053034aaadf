//! Binary game records: encoding and replay-based reconstruction.
//!
//! A record stores the configuration, the resolved starting color, and
//! the full ply log. Decoding replays that log against a fresh game, so
//! a record that decodes cleanly is also a legal game; the board itself
//! is never persisted.
//!
//! Layout (little-endian):
//! - bytes 0..4: magic `RVSG`
//! - bytes 4..8: format version (u32, currently 1)
//! - bytes 8..12: ply count (u32)
//! - bytes 12..16: CRC32 of the payload
//! - bytes 16..20: reserved (0)
//! - payload: rule flags (u8), starting color (u8), width (u8),
//!   height (u8), the map pattern (width * height cell bytes), then one
//!   3-byte entry per ply: color (u8) and cell (u16, `0xFFFF` = pass).

use crate::board::{Cell, Color};
use crate::game::{Action, Game, GameConfig, GameError};
use crate::map::{BoardMap, MapError};

const MAGIC: &[u8; 4] = b"RVSG";
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 20;
const PLY_SIZE: usize = 3;
const PASS_CELL: u16 = u16::MAX;

const FLAG_LOOPED: u8 = 1 << 0;
const FLAG_PUT_EVERYWHERE: u8 = 1 << 1;
const FLAG_LLOTHEO: u8 = 1 << 2;
const KNOWN_FLAGS: u8 = FLAG_LOOPED | FLAG_PUT_EVERYWHERE | FLAG_LLOTHEO;

/// Errors surfaced while decoding or replaying a game record.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("record too short: expected at least {HEADER_SIZE} bytes, got {0}")]
    TooShort(usize),
    #[error("invalid record magic")]
    BadMagic,
    #[error("unsupported record version: expected {VERSION}, got {0}")]
    UnsupportedVersion(u32),
    #[error("CRC32 mismatch: header says {expected:#010x}, payload hashes to {actual:#010x}")]
    CrcMismatch { expected: u32, actual: u32 },
    #[error("unknown rule flag bits {0:#04x}")]
    UnknownFlags(u8),
    #[error("unexpected end of record while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("record has trailing bytes")]
    TrailingBytes,
    #[error("invalid cell byte {0} in the map pattern")]
    InvalidCell(u8),
    #[error("invalid color byte {0}")]
    InvalidColor(u8),
    #[error("invalid board definition: {0}")]
    InvalidConfiguration(#[from] MapError),
    #[error("corrupt move log: ply {ply} rejected: {source}")]
    CorruptLog { ply: usize, source: GameError },
}

/// Encodes a game into its canonical binary record.
///
/// The starting color is stored already resolved, so decoding a record
/// of a random-start game reproduces the same toss.
pub fn serialize(game: &Game) -> Vec<u8> {
    let config = game.config();
    let map = &config.map;

    let mut flags = 0u8;
    if config.looped_board {
        flags |= FLAG_LOOPED;
    }
    if config.can_put_everywhere {
        flags |= FLAG_PUT_EVERYWHERE;
    }
    if config.llotheo {
        flags |= FLAG_LLOTHEO;
    }

    let mut payload = Vec::with_capacity(4 + map.cell_count() + game.log().len() * PLY_SIZE);
    payload.push(flags);
    payload.push(game.starting_color().to_byte());
    payload.push(map.width());
    payload.push(map.height());
    payload.extend(map.cells().iter().map(|cell| cell.to_byte()));
    for ply in game.log() {
        payload.push(ply.color.to_byte());
        let cell = match ply.action {
            Action::Place(pos) => pos as u16,
            Action::Pass => PASS_CELL,
        };
        payload.extend_from_slice(&cell.to_le_bytes());
    }

    let mut record = Vec::with_capacity(HEADER_SIZE + payload.len());
    record.extend_from_slice(MAGIC);
    record.extend_from_slice(&VERSION.to_le_bytes());
    record.extend_from_slice(&(game.log().len() as u32).to_le_bytes());
    record.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    record.extend_from_slice(&0u32.to_le_bytes());
    record.extend_from_slice(&payload);
    record
}

/// Decodes a record and reconstructs the game by replaying its ply log
/// from the starting position. Any ply the rules reject maps to
/// [`SerializeError::CorruptLog`] with its index.
pub fn deserialize(data: &[u8]) -> Result<Game, SerializeError> {
    if data.len() < HEADER_SIZE {
        return Err(SerializeError::TooShort(data.len()));
    }
    if &data[0..4] != MAGIC {
        return Err(SerializeError::BadMagic);
    }
    let version = read_u32_le(data, 4);
    if version != VERSION {
        return Err(SerializeError::UnsupportedVersion(version));
    }
    let ply_count = read_u32_le(data, 8) as usize;
    let expected_crc = read_u32_le(data, 12);

    let payload = &data[HEADER_SIZE..];
    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(SerializeError::CrcMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    if payload.len() < 4 {
        return Err(SerializeError::UnexpectedEof("configuration"));
    }
    let (flags, starting, width, height) = (payload[0], payload[1], payload[2], payload[3]);
    if flags & !KNOWN_FLAGS != 0 {
        return Err(SerializeError::UnknownFlags(flags));
    }
    let starting = Color::from_byte(starting).ok_or(SerializeError::InvalidColor(starting))?;

    let cell_count = width as usize * height as usize;
    let mut cursor = 4;
    if payload.len() - cursor < cell_count {
        return Err(SerializeError::UnexpectedEof("map pattern"));
    }
    let cells = payload[cursor..cursor + cell_count]
        .iter()
        .map(|&byte| Cell::from_byte(byte).ok_or(SerializeError::InvalidCell(byte)))
        .collect::<Result<Vec<_>, _>>()?;
    cursor += cell_count;
    let map = BoardMap::from_cells(width, height, cells)?;

    // Sizing the log up front keeps a forged ply count from tricking us
    // into reading past the payload, and makes the trailing check exact.
    let remaining = payload.len() - cursor;
    let expected = ply_count
        .checked_mul(PLY_SIZE)
        .ok_or(SerializeError::UnexpectedEof("move log"))?;
    if remaining < expected {
        return Err(SerializeError::UnexpectedEof("move log"));
    }
    if remaining > expected {
        return Err(SerializeError::TrailingBytes);
    }

    let config = GameConfig {
        map,
        looped_board: flags & FLAG_LOOPED != 0,
        can_put_everywhere: flags & FLAG_PUT_EVERYWHERE != 0,
        llotheo: flags & FLAG_LLOTHEO != 0,
        starting_color: starting.into(),
    };
    let mut game = Game::with_starting_color(config, starting);

    for ply in 0..ply_count {
        let entry = &payload[cursor..cursor + PLY_SIZE];
        cursor += PLY_SIZE;
        let color = Color::from_byte(entry[0]).ok_or(SerializeError::InvalidColor(entry[0]))?;
        let cell = u16::from_le_bytes([entry[1], entry[2]]);
        let applied = if cell == PASS_CELL {
            game.apply_pass(color)
        } else {
            game.apply_move(color, cell as usize).map(|_| ())
        };
        applied.map_err(|source| SerializeError::CorruptLog { ply, source })?;
    }

    Ok(game)
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}
