use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything a renderer needs to draw one frame of a board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: Coord2,
    pub state: BoardState,
    pub mines_left: isize,
    pub views: Array2<CellView>,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        let size = board.size();
        let views = Array2::from_shape_fn(size.to_nd_index(), |(x, y)| {
            let coords = (x as Coord, y as Coord);
            board.view_at(coords).unwrap_or_default()
        });

        Self {
            size,
            state: board.state(),
            mines_left: board.mines_left(),
            views,
        }
    }

    pub fn view_at(&self, coords: Coord2) -> Option<CellView> {
        self.views.get(coords.to_nd_index()).copied()
    }
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_board(self)
    }
}
