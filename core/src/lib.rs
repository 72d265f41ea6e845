#![no_std]

extern crate alloc;

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use score::*;
pub use snapshot::*;
pub use types::*;

mod cell;
mod engine;
mod error;
mod generator;
mod score;
mod snapshot;
mod types;

/// Named difficulty, also the multiplier used when scoring a win.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl Difficulty {
    /// Custom boards score like beginner ones.
    pub const fn level(self) -> i64 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Expert => 3,
            Self::Custom => 1,
        }
    }

    /// The preset board for this difficulty, `None` for [`Difficulty::Custom`].
    pub const fn preset(self) -> Option<GameConfig> {
        match self {
            Self::Beginner => Some(GameConfig::BEGINNER),
            Self::Intermediate => Some(GameConfig::INTERMEDIATE),
            Self::Expert => Some(GameConfig::EXPERT),
            Self::Custom => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
    pub difficulty: Difficulty,
}

impl GameConfig {
    pub const BEGINNER: Self = Self::new_unchecked((9, 9), 10, Difficulty::Beginner);
    pub const INTERMEDIATE: Self = Self::new_unchecked((16, 16), 40, Difficulty::Intermediate);
    pub const EXPERT: Self = Self::new_unchecked((30, 16), 99, Difficulty::Expert);

    pub const fn new_unchecked(size: Coord2, mines: CellCount, difficulty: Difficulty) -> Self {
        Self {
            size,
            mines,
            difficulty,
        }
    }

    /// Rejects empty boards and boards without a single safe cell; nothing is clamped.
    pub fn new(size: Coord2, mines: CellCount, difficulty: Difficulty) -> Result<Self> {
        let config = Self::new_unchecked(size, mines, difficulty);
        config.validate()?;
        Ok(config)
    }

    pub fn custom(size: Coord2, mines: CellCount) -> Result<Self> {
        Self::new(size, mines, Difficulty::Custom)
    }

    pub fn validate(&self) -> Result<()> {
        let issue = if self.size.0 == 0 {
            ConfigIssue::ZeroWidth
        } else if self.size.1 == 0 {
            ConfigIssue::ZeroHeight
        } else if self.mines >= self.total_cells() {
            ConfigIssue::TooManyMines
        } else {
            return Ok(());
        };
        Err(GameError::InvalidConfiguration(issue))
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::BEGINNER
    }
}

/// Where the mines are, independent of any play state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Rejects masks that do not fit in [`Coord`] on either axis.
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Result<Self> {
        let (x, y) = mine_mask.dim();
        let max = usize::from(Coord::MAX);
        if x > max {
            return Err(GameError::InvalidConfiguration(ConfigIssue::TooWide));
        }
        if y > max {
            return Err(GameError::InvalidConfiguration(ConfigIssue::TooTall));
        }
        Ok(Self::from_sized_mask(mine_mask))
    }

    /// For masks built from a `Coord2` size.
    pub(crate) fn from_sized_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_sized_mask(mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.mine_mask)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.mine_mask
            .iter_neighbors(coords)
            .filter(|&pos| self[pos])
            .count() as u8
    }

    /// Kind of the cell at `coords` once the layout is turned into a board.
    pub fn kind_at(&self, coords: Coord2) -> CellKind {
        if self[coords] {
            CellKind::Mine
        } else {
            CellKind::from_count(self.adjacent_mine_count(coords))
        }
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, (x, y): Coord2) -> &Self::Output {
        &self.mine_mask[(x as usize, y as usize)]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    /// Chord with too few flags; only the highlight overlay changed.
    Highlighted,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Highlighted => true,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }

    /// Whether this outcome ended the game.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::HitMine | Self::Won)
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Won, _) => Won,
            (_, Won) => Won,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (Highlighted, _) => Highlighted,
            (_, Highlighted) => Highlighted,
            (NoChange, NoChange) => NoChange,
        }
    }
}
