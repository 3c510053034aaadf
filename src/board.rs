//! Board topology and flip-line tracing.
//!
//! The board is a row-major grid of [`Cell`]s whose shape comes from a
//! [`BoardMap`]. Capture rules never depend on whose turn it is; turn
//! order and legality checks live in [`crate::game`].

use std::fmt;

use crate::map::BoardMap;

/// The eight trace directions as `(dx, dy)` steps, row-major.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Disc color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Returns the opposing color.
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Wire coding: black is 1, white is 2.
    pub fn to_byte(self) -> u8 {
        match self {
            Color::Black => 1,
            Color::White => 2,
        }
    }

    /// Inverse of [`Color::to_byte`]; anything else is `None`.
    pub fn from_byte(byte: u8) -> Option<Color> {
        match byte {
            1 => Some(Color::Black),
            2 => Some(Color::White),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// One cell of the playing field. Blocked cells belong to the board
/// shape and never hold a disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Blocked,
    Disc(Color),
}

impl Cell {
    /// Wire coding: 0 empty, 1 black, 2 white, 3 blocked.
    pub fn to_byte(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Disc(color) => color.to_byte(),
            Cell::Blocked => 3,
        }
    }

    /// Inverse of [`Cell::to_byte`]; anything else is `None`.
    pub fn from_byte(byte: u8) -> Option<Cell> {
        match byte {
            0 => Some(Cell::Empty),
            1 => Some(Cell::Disc(Color::Black)),
            2 => Some(Cell::Disc(Color::White)),
            3 => Some(Cell::Blocked),
            _ => None,
        }
    }
}

/// Live grid plus the adjacency rules derived from its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u8,
    height: u8,
    looped: bool,
    cells: Vec<Cell>,
}

impl Board {
    /// Builds the starting grid described by `map`.
    pub fn from_map(map: &BoardMap, looped: bool) -> Board {
        Board {
            width: map.width(),
            height: map.height(),
            looped,
            cells: map.cells().to_vec(),
        }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    /// Total number of cells, playable or not.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the cell at `pos`, or `None` when out of range.
    pub fn get(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    pub(crate) fn set(&mut self, pos: usize, cell: Cell) {
        self.cells[pos] = cell;
    }

    /// Whether the shape allows a disc on `pos`, regardless of current
    /// occupancy. Out-of-range positions are not playable.
    pub fn is_playable(&self, pos: usize) -> bool {
        matches!(self.get(pos), Some(Cell::Empty) | Some(Cell::Disc(_)))
    }

    /// Adjacent cell in the given direction. Wraps around the edges when
    /// the board is looped; `None` off a true edge of a flat board or
    /// when `pos` is out of range.
    pub fn neighbor(&self, pos: usize, dir: (i32, i32)) -> Option<usize> {
        if pos >= self.cells.len() {
            return None;
        }
        let (x, y) = self.pos_to_xy(pos);
        self.step(x, y, dir).map(|(x, y)| self.xy_to_pos(x, y))
    }

    /// Opponent discs captured by `color` playing at `pos`, unioned over
    /// all eight directions, ascending. Empty when no direction holds a
    /// terminated run; whether the placement itself is allowed is the
    /// game's concern. On looped boards two directions can reach the
    /// same cell, so the union deduplicates.
    pub fn flip_set(&self, color: Color, pos: usize) -> Vec<usize> {
        let mut flips = Vec::new();
        for dir in DIRECTIONS {
            self.line_flips(color, pos, dir, &mut flips);
        }
        flips.sort_unstable();
        flips.dedup();
        flips
    }

    /// True when at least one direction yields a capture for `color` at `pos`.
    pub fn can_flip(&self, color: Color, pos: usize) -> bool {
        let mut probe = Vec::new();
        DIRECTIONS.into_iter().any(|dir| {
            probe.clear();
            self.line_flips(color, pos, dir, &mut probe);
            !probe.is_empty()
        })
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u16, u16) {
        let mut black = 0;
        let mut white = 0;
        for cell in &self.cells {
            match cell {
                Cell::Disc(Color::Black) => black += 1,
                Cell::Disc(Color::White) => white += 1,
                _ => {}
            }
        }
        (black, white)
    }

    /// Number of empty cells remaining.
    pub fn empty_count(&self) -> u16 {
        self.cells.iter().filter(|cell| **cell == Cell::Empty).count() as u16
    }

    /// Whether any empty cell remains. Blocked cells never count.
    pub fn has_empty(&self) -> bool {
        self.cells.iter().any(|cell| *cell == Cell::Empty)
    }

    /// Byte-codes the grid row-major: 0 empty, 1 black, 2 white, 3 blocked.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|cell| cell.to_byte()).collect()
    }

    // Walks one direction from `origin`. A contiguous opponent run closed
    // by a same-color disc is appended to `out`; anything else ends the
    // line with no capture. The walk stops after max(width, height) steps
    // and on returning to the origin, so looped orbits terminate.
    fn line_flips(&self, color: Color, origin: usize, dir: (i32, i32), out: &mut Vec<usize>) {
        if origin >= self.cells.len() {
            return;
        }
        let run_start = out.len();
        let (mut x, mut y) = self.pos_to_xy(origin);
        for _ in 0..self.width.max(self.height) {
            let Some(next) = self.step(x, y, dir) else {
                break;
            };
            (x, y) = next;
            let pos = self.xy_to_pos(x, y);
            if pos == origin {
                break;
            }
            match self.cells[pos] {
                Cell::Disc(c) if c == color => return,
                Cell::Disc(_) => out.push(pos),
                Cell::Empty | Cell::Blocked => break,
            }
        }
        out.truncate(run_start);
    }

    fn step(&self, x: i32, y: i32, (dx, dy): (i32, i32)) -> Option<(i32, i32)> {
        let (mut x, mut y) = (x + dx, y + dy);
        if self.looped {
            x = x.rem_euclid(self.width as i32);
            y = y.rem_euclid(self.height as i32);
        } else if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((x, y))
    }

    fn pos_to_xy(&self, pos: usize) -> (i32, i32) {
        let width = self.width as usize;
        ((pos % width) as i32, (pos / width) as i32)
    }

    fn xy_to_pos(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
