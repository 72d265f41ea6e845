use core::time::Duration;

use crate::*;

const POINTS_PER_CELL: i64 = 1000;
const PENALTY_PER_SECOND: i64 = 10;
const PENALTY_PER_FLAG: i64 = 5;

/// Inputs for the score of a won game.
///
/// The total is `level * width * height * 1000 - seconds * 10 - flags * 5`, where `seconds` counts whole seconds
/// and `flags` counts every flag placed during the game. It is not clamped and can go below zero on long games.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoreSheet {
    pub difficulty: Difficulty,
    pub size: Coord2,
    pub elapsed: Duration,
    pub flags_used: u32,
}

impl ScoreSheet {
    pub fn total(&self) -> i64 {
        let cells = i64::from(mult(self.size.0, self.size.1));
        let seconds = i64::try_from(self.elapsed.as_secs()).unwrap_or(i64::MAX);

        self.difficulty
            .level()
            .saturating_mul(cells)
            .saturating_mul(POINTS_PER_CELL)
            .saturating_sub(seconds.saturating_mul(PENALTY_PER_SECOND))
            .saturating_sub(i64::from(self.flags_used) * PENALTY_PER_FLAG)
    }
}
