//! Map definitions: the rectangular starting layout of a game.
//!
//! A map is parsed from string-art rows (`-` empty, `b` black, `w`
//! white, `#` blocked) or assembled from raw cells, and validated up
//! front so every [`BoardMap`] in circulation is structurally sound.
//! A catalog of named layouts ships with the engine.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::board::{Cell, Color};

/// Largest supported edge length. Keeps every cell index inside `u16`
/// for the wire formats.
pub const MAX_EDGE: usize = 255;

/// Fewest cells a playable map may have.
pub const MIN_CELLS: usize = 4;

/// Errors raised while validating a map definition.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("map must cover at least {MIN_CELLS} cells, got {0}")]
    TooSmall(usize),
    #[error("map exceeds the {MAX_EDGE}x{MAX_EDGE} limit")]
    TooLarge,
    #[error("row {row} is {got} cells wide, expected {expected}")]
    RaggedRow { row: usize, expected: usize, got: usize },
    #[error("unknown map symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("cell count {got} does not match {width}x{height}")]
    CellCountMismatch { width: u8, height: u8, got: usize },
}

/// Immutable starting layout: dimensions plus the initial occupancy
/// pattern, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardMap {
    width: u8,
    height: u8,
    cells: Vec<Cell>,
}

impl BoardMap {
    /// Parses string-art rows into a map. Every row must be the same
    /// width and only the four layout symbols are accepted.
    pub fn parse(rows: &[&str]) -> Result<BoardMap, MapError> {
        if rows.is_empty() {
            return Err(MapError::Empty);
        }
        let width = rows[0].chars().count();
        let height = rows.len();
        if width == 0 || width * height < MIN_CELLS {
            return Err(MapError::TooSmall(width * height));
        }
        if width > MAX_EDGE || height > MAX_EDGE {
            return Err(MapError::TooLarge);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, line) in rows.iter().enumerate() {
            let got = line.chars().count();
            if got != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    got,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                cells.push(match symbol {
                    '-' => Cell::Empty,
                    'b' => Cell::Disc(Color::Black),
                    'w' => Cell::Disc(Color::White),
                    '#' => Cell::Blocked,
                    symbol => return Err(MapError::UnknownSymbol { symbol, row, col }),
                });
            }
        }

        Ok(BoardMap {
            width: width as u8,
            height: height as u8,
            cells,
        })
    }

    /// Builds a map from raw cells. `cells.len()` must equal
    /// `width * height` and both dimensions must be positive.
    pub fn from_cells(width: u8, height: u8, cells: Vec<Cell>) -> Result<BoardMap, MapError> {
        let expected = width as usize * height as usize;
        if expected < MIN_CELLS {
            return Err(MapError::TooSmall(expected));
        }
        if cells.len() != expected {
            return Err(MapError::CellCountMismatch {
                width,
                height,
                got: cells.len(),
            });
        }
        Ok(BoardMap {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Starting cells, row-major.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

// Built-in layouts. Names are stable API; hosts address them through
// `by_name` and persist games with the full pattern, never the name.
const CATALOG_ROWS: &[(&str, &[&str])] = &[
    (
        "standard",
        &[
            "--------",
            "--------",
            "--------",
            "---wb---",
            "---bw---",
            "--------",
            "--------",
            "--------",
        ],
    ),
    (
        "six_by_six",
        &[
            "------",
            "------",
            "--wb--",
            "--bw--",
            "------",
            "------",
        ],
    ),
    (
        "ten_by_ten",
        &[
            "----------",
            "----------",
            "----------",
            "----------",
            "----wb----",
            "----bw----",
            "----------",
            "----------",
            "----------",
            "----------",
        ],
    ),
    (
        "rounded",
        &[
            "#------#",
            "--------",
            "--------",
            "---wb---",
            "---bw---",
            "--------",
            "--------",
            "#------#",
        ],
    ),
    (
        "window",
        &[
            "########",
            "#------#",
            "#------#",
            "#--wb--#",
            "#--bw--#",
            "#------#",
            "#------#",
            "########",
        ],
    ),
    (
        "cross",
        &[
            "###----###",
            "###----###",
            "###----###",
            "----------",
            "----wb----",
            "----bw----",
            "----------",
            "###----###",
            "###----###",
            "###----###",
        ],
    ),
    (
        "ring",
        &[
            "--------",
            "--------",
            "--bw----",
            "---##---",
            "---##---",
            "----wb--",
            "--------",
            "--------",
        ],
    ),
    (
        "sparse",
        &[
            "--------",
            "--#---#-",
            "--------",
            "---wb---",
            "---bw---",
            "--------",
            "-#---#--",
            "--------",
        ],
    ),
    (
        "pipeline",
        &[
            "------",
            "------",
            "------",
            "------",
            "--wb--",
            "--bw--",
            "------",
            "------",
            "------",
            "------",
        ],
    ),
];

static CATALOG: Lazy<BTreeMap<&'static str, BoardMap>> = Lazy::new(|| {
    CATALOG_ROWS
        .iter()
        .map(|(name, rows)| {
            let map = BoardMap::parse(rows).expect("catalog layouts are valid");
            (*name, map)
        })
        .collect()
});

/// Names of the built-in layouts, sorted.
pub fn names() -> Vec<&'static str> {
    CATALOG.keys().copied().collect()
}

/// Looks up a built-in layout by name.
pub fn by_name(name: &str) -> Option<&'static BoardMap> {
    CATALOG.get(name)
}
