use serde::{Deserialize, Serialize};

use crate::Coord2;

/// What a cell holds; fixed once the board is initialized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Mine,
    /// Adjacent mine count, always in `1..=8`.
    Number(u8),
}

impl CellKind {
    /// Kind of a safe cell with `adjacent_mines` mines around it.
    pub const fn from_count(adjacent_mines: u8) -> Self {
        if adjacent_mines == 0 {
            Self::Empty
        } else {
            Self::Number(adjacent_mines)
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

/// One grid position and its durable state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) kind: CellKind,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    pub(crate) exploded: bool,
    pub(crate) position: Coord2,
}

impl Cell {
    pub(crate) const fn new(position: Coord2, kind: CellKind) -> Self {
        Self {
            kind,
            revealed: false,
            flagged: false,
            exploded: false,
            position,
        }
    }

    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Whether this is a mine the player set off.
    pub const fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub const fn position(&self) -> Coord2 {
        self.position
    }

    /// Hidden and not flagged, i.e. still a legal reveal target.
    pub(crate) const fn is_openable(&self) -> bool {
        !self.revealed && !self.flagged
    }
}

/// Player-visible state of a cell, as a renderer would draw it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Unknown,
    Flagged,
    /// Opened blank cell, also used for a hidden cell under a chord highlight.
    Empty,
    Number(u8),
    Mine,
    Exploded,
}

impl CellView {
    pub const fn of(cell: &Cell, highlighted: bool) -> Self {
        if cell.revealed {
            match cell.kind {
                CellKind::Empty => Self::Empty,
                CellKind::Number(count) => Self::Number(count),
                CellKind::Mine if cell.exploded => Self::Exploded,
                CellKind::Mine => Self::Mine,
            }
        } else if cell.flagged {
            Self::Flagged
        } else if highlighted {
            Self::Empty
        } else {
            Self::Unknown
        }
    }
}

impl Default for CellView {
    fn default() -> Self {
        Self::Unknown
    }
}
