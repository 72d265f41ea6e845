use alloc::vec::Vec;
use core::num::Saturating;
use core::ops::BitOr;
use core::time::Duration;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// How long a caller should keep a chord highlight on screen before calling [`Board::clear_highlights`].
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(100);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    Active,
    Won,
    Lost,
}

impl BoardState {
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::Active
    }
}

/// Hidden cells pressed by a chord that lacked flags. Purely visual, never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlights {
    cells: HashSet<Coord2>,
}

impl Highlights {
    pub fn contains(&self, coords: Coord2) -> bool {
        self.cells.contains(&coords)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn replace(&mut self, coords: impl IntoIterator<Item = Coord2>) {
        self.cells.clear();
        self.cells.extend(coords);
    }

    fn clear(&mut self) -> bool {
        let had_any = !self.cells.is_empty();
        self.cells.clear();
        had_any
    }
}

/// A single game session: the grid, its rules, and the scoring state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: GameConfig,
    cells: Array2<Cell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
    flags_used: Saturating<u32>,
    elapsed: Duration,
    score: i64,
    state: BoardState,
    #[serde(skip)]
    highlights: Highlights,
}

impl Board {
    /// Starts a session with mines placed by [`LinearProbeGenerator`].
    pub fn initialize(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_generator(config, LinearProbeGenerator::new(seed))
    }

    pub fn with_generator(config: GameConfig, generator: impl MinefieldGenerator) -> Result<Self> {
        config.validate()?;
        let layout = generator.generate(config);
        Ok(Self::build(config, &layout))
    }

    /// Starts a session on a fixed layout.
    pub fn from_layout(layout: &MineLayout, difficulty: Difficulty) -> Result<Self> {
        let config = GameConfig::new(layout.size(), layout.mine_count(), difficulty)?;
        Ok(Self::build(config, layout))
    }

    fn build(config: GameConfig, layout: &MineLayout) -> Self {
        let cells = Array2::from_shape_fn(config.size.to_nd_index(), |(x, y)| {
            let coords = (x as Coord, y as Coord);
            Cell::new(coords, layout.kind_at(coords))
        });

        Self {
            config,
            cells,
            revealed_count: 0,
            flagged_count: 0,
            flags_used: Saturating(0),
            elapsed: Duration::ZERO,
            score: 0,
            state: BoardState::Active,
            highlights: Highlights::default(),
        }
    }

    /// Throws the current grid away and deals a new one with the same configuration.
    pub fn restart(&mut self, seed: u64) {
        let layout = LinearProbeGenerator::new(seed).generate(self.config);
        *self = Self::build(self.config, &layout);
        log::debug!("Restarted {:?} board with seed {}", self.config.size, seed);
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    /// Mines minus flags currently on the board; negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.flagged_count as isize)
    }

    pub fn flags_on_board(&self) -> CellCount {
        self.flagged_count
    }

    /// Flags placed over the whole session, removals not subtracted.
    pub fn flags_used(&self) -> u32 {
        self.flags_used.0
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Zero until the game is won, and zero again after a loss.
    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn cell(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    /// Every cell, column by column.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn is_highlighted(&self, coords: Coord2) -> bool {
        self.highlights.contains(coords)
    }

    pub fn view_at(&self, coords: Coord2) -> Option<CellView> {
        self.cell(coords)
            .map(|cell| CellView::of(cell, self.is_highlighted(coords)))
    }

    /// Adds to the session clock. The clock stops once the game is over.
    pub fn advance_time(&mut self, delta: Duration) {
        if !self.is_over() {
            self.elapsed = self.elapsed.saturating_add(delta);
        }
    }

    /// Drops the chord preview; returns whether anything was highlighted.
    pub fn clear_highlights(&mut self) -> bool {
        self.highlights.clear()
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        if self.is_over() {
            return MarkOutcome::NoChange;
        }
        let Some(cell) = self.cells.get_mut(coords.to_nd_index()) else {
            return MarkOutcome::NoChange;
        };
        if cell.revealed {
            return MarkOutcome::NoChange;
        }

        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.flagged_count += 1;
            self.flags_used += 1;
        } else {
            self.flagged_count -= 1;
        }
        MarkOutcome::Changed
    }

    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if self.is_over() {
            return RevealOutcome::NoChange;
        }
        let Some(&cell) = self.cells.get(coords.to_nd_index()) else {
            return RevealOutcome::NoChange;
        };

        match cell {
            Cell { flagged: true, .. } => RevealOutcome::NoChange,
            Cell {
                revealed: true,
                kind: CellKind::Number(_),
                ..
            } => self.chord(coords),
            Cell { revealed: true, .. } => RevealOutcome::NoChange,
            _ => {
                let outcome = self.open(coords);
                self.settle(outcome)
            }
        }
    }

    /// Opens the hidden, unflagged neighbors of a revealed number once enough flags surround it, otherwise
    /// highlights them.
    pub fn chord(&mut self, coords: Coord2) -> RevealOutcome {
        if self.is_over() {
            return RevealOutcome::NoChange;
        }
        let Some(&cell) = self.cells.get(coords.to_nd_index()) else {
            return RevealOutcome::NoChange;
        };
        let CellKind::Number(count) = cell.kind else {
            return RevealOutcome::NoChange;
        };
        if !cell.revealed {
            return RevealOutcome::NoChange;
        }

        let targets: SmallVec<[Coord2; 8]> = self
            .cells
            .iter_neighbors(coords)
            .filter(|&pos| self.cells[pos.to_nd_index()].is_openable())
            .collect();

        if self.count_flagged_neighbors(coords) < count {
            if targets.is_empty() {
                return RevealOutcome::NoChange;
            }
            self.highlights.replace(targets);
            return RevealOutcome::Highlighted;
        }

        // every target opens; each mine under a wrong flag goes off on its own
        let outcome = targets
            .into_iter()
            .map(|pos| {
                if self.cells[pos.to_nd_index()].kind.is_mine() {
                    self.explode(pos);
                    RevealOutcome::HitMine
                } else {
                    self.open(pos)
                }
            })
            .fold(RevealOutcome::NoChange, BitOr::bitor);
        self.settle(outcome)
    }

    /// Opens one hidden cell without evaluating the win condition.
    fn open(&mut self, coords: Coord2) -> RevealOutcome {
        let cell = self.cells[coords.to_nd_index()];
        if cell.revealed {
            return RevealOutcome::NoChange;
        }

        match cell.kind {
            CellKind::Mine => {
                self.explode(coords);
                RevealOutcome::HitMine
            }
            CellKind::Empty => {
                self.flood(coords);
                RevealOutcome::Revealed
            }
            CellKind::Number(_) => {
                self.uncover(coords);
                RevealOutcome::Revealed
            }
        }
    }

    /// Reveals the 4-connected blank region around `start` along with its numbered rim.
    fn flood(&mut self, start: Coord2) {
        let mut to_visit: Vec<Coord2> = Vec::from([start]);
        let mut opened = 0usize;

        while let Some(coords) = to_visit.pop() {
            let cell = self.cells[coords.to_nd_index()];
            if cell.revealed || cell.kind.is_mine() {
                continue;
            }

            self.uncover(coords);
            opened += 1;

            if cell.kind == CellKind::Empty {
                to_visit.extend(self.cells.iter_orthogonal(coords).filter(|&pos| {
                    let next = &self.cells[pos.to_nd_index()];
                    !next.revealed && !next.kind.is_mine()
                }));
            }
        }

        log::trace!("Flood from {:?} opened {} cells", start, opened);
    }

    /// Marks a safe cell revealed, dropping any flag sitting on it.
    fn uncover(&mut self, coords: Coord2) {
        let cell = &mut self.cells[coords.to_nd_index()];
        if cell.flagged {
            cell.flagged = false;
            self.flagged_count -= 1;
        }
        cell.revealed = true;
        self.revealed_count += 1;
    }

    fn explode(&mut self, coords: Coord2) {
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.revealed = true;
        cell.exploded = true;

        if self.state.is_over() {
            return;
        }

        for cell in self.cells.iter_mut().filter(|cell| cell.kind.is_mine()) {
            cell.revealed = true;
        }
        self.state = BoardState::Lost;
        self.score = 0;
        self.highlights.clear();
        log::debug!("Mine hit at {:?}, game lost", coords);
    }

    /// Turns a non-exploding outcome into [`RevealOutcome::Won`] when every safe cell is open.
    fn settle(&mut self, outcome: RevealOutcome) -> RevealOutcome {
        if outcome != RevealOutcome::Revealed || !self.all_safe_revealed() {
            return outcome;
        }

        for cell in self.cells.iter_mut().filter(|cell| cell.kind.is_mine()) {
            cell.flagged = true;
        }
        self.flagged_count = self.config.mines;
        self.state = BoardState::Won;
        self.highlights.clear();

        let sheet = ScoreSheet {
            difficulty: self.config.difficulty,
            size: self.config.size,
            elapsed: self.elapsed,
            flags_used: self.flags_used.0,
        };
        self.score = sheet.total();
        log::debug!(
            "Board {:?} won after {:?}, score {}",
            self.config.size,
            self.elapsed,
            self.score
        );

        RevealOutcome::Won
    }

    fn all_safe_revealed(&self) -> bool {
        self.revealed_count == self.config.total_cells() - self.config.mines
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.cells
            .iter_neighbors(coords)
            .filter(|&pos| self.cells[pos.to_nd_index()].flagged)
            .count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        let layout = MineLayout::from_mine_coords(size, mines).unwrap();
        Board::from_layout(&layout, Difficulty::Custom).unwrap()
    }

    fn kind(board: &Board, coords: Coord2) -> CellKind {
        board.cell(coords).unwrap().kind()
    }

    fn revealed(board: &Board, coords: Coord2) -> bool {
        board.cell(coords).unwrap().is_revealed()
    }

    #[test]
    fn numbers_match_two_corner_mines() {
        let board = board((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(kind(&board, (1, 1)), CellKind::Number(2));
        assert_eq!(kind(&board, (0, 1)), CellKind::Number(1));
        assert_eq!(kind(&board, (1, 0)), CellKind::Number(1));
        assert_eq!(kind(&board, (2, 0)), CellKind::Empty);
        assert_eq!(kind(&board, (0, 0)), CellKind::Mine);
    }

    #[test]
    fn revealing_a_number_opens_only_that_cell() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(board.reveal((1, 0)), RevealOutcome::Revealed);

        let open: Vec<_> = board
            .cells()
            .filter(|cell| cell.is_revealed())
            .map(|cell| cell.position())
            .collect();
        assert_eq!(open, [(1, 0)]);
    }

    #[test]
    fn flood_stops_at_numbers_and_skips_diagonals() {
        // mines split the board; (0, 0) region is bounded by numbers
        let mut board = board((5, 5), &[(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Revealed);

        for y in 0..5 {
            assert!(revealed(&board, (0, y)));
            assert!(revealed(&board, (1, y)));
            assert!(!revealed(&board, (2, y)));
            assert!(!revealed(&board, (3, y)));
            assert!(!revealed(&board, (4, y)));
        }
    }

    #[test]
    fn flood_reaches_far_corner_of_open_board() {
        let mut board = board((200, 200), &[(199, 199)]);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Won);
        assert_eq!(board.state(), BoardState::Won);
        assert!(!revealed(&board, (199, 199)));
        assert!(board.cell((199, 199)).unwrap().is_flagged());
    }

    #[test]
    fn flood_clears_flags_on_safe_cells() {
        let mut board = board((4, 1), &[(3, 0)]);
        board.toggle_flag((1, 0));
        assert_eq!(board.mines_left(), 0);

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Won);
        assert!(revealed(&board, (1, 0)));
        assert_eq!(board.flags_used(), 1);
        assert_eq!(board.flags_on_board(), 1);
        assert!(board.cell((3, 0)).unwrap().is_flagged());
    }

    #[test]
    fn mine_hit_reveals_every_mine_and_locks_board() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.reveal((1, 0));

        assert_eq!(board.reveal((0, 0)), RevealOutcome::HitMine);
        assert_eq!(board.state(), BoardState::Lost);
        assert!(board.cell((0, 0)).unwrap().is_exploded());
        assert!(revealed(&board, (2, 2)));
        assert!(!board.cell((2, 2)).unwrap().is_exploded());
        assert_eq!(board.score(), 0);

        let frozen = board.clone();
        assert_eq!(board.reveal((2, 0)), RevealOutcome::NoChange);
        assert_eq!(board.toggle_flag((2, 1)), MarkOutcome::NoChange);
        assert_eq!(board.chord((1, 0)), RevealOutcome::NoChange);
        board.advance_time(Duration::from_secs(5));
        assert_eq!(board, frozen);
    }

    #[test]
    fn flagged_cells_cannot_be_revealed() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.toggle_flag((0, 0));

        assert_eq!(board.reveal((0, 0)), RevealOutcome::NoChange);
        assert_eq!(board.state(), BoardState::Active);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut board = board((2, 2), &[(0, 0)]);
        let before = board.clone();

        assert_eq!(board.reveal((2, 0)), RevealOutcome::NoChange);
        assert_eq!(board.toggle_flag((0, 9)), MarkOutcome::NoChange);
        assert_eq!(board.chord((5, 5)), RevealOutcome::NoChange);
        assert_eq!(board, before);
    }

    #[test]
    fn flag_on_revealed_cell_is_noop() {
        let mut board = board((3, 3), &[(0, 0), (2, 2)]);
        board.reveal((1, 0));
        let before = board.clone();

        assert_eq!(board.toggle_flag((1, 0)), MarkOutcome::NoChange);
        assert_eq!(board.flags_used(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn flags_used_only_grows() {
        let mut board = board((3, 3), &[(0, 0)]);

        board.toggle_flag((2, 2));
        board.toggle_flag((2, 2));
        board.toggle_flag((2, 2));

        assert_eq!(board.flags_used(), 2);
        assert_eq!(board.flags_on_board(), 1);
        assert_eq!(board.mines_left(), 0);
    }

    #[test]
    fn chord_with_enough_flags_opens_neighbors() {
        let mut board = board((3, 3), &[(0, 1), (2, 1)]);
        board.reveal((1, 1));
        board.toggle_flag((0, 1));
        board.toggle_flag((2, 1));

        assert_eq!(board.reveal((1, 1)), RevealOutcome::Won);
        assert_eq!(kind(&board, (1, 0)), CellKind::Number(2));
        assert!(revealed(&board, (1, 0)));
        assert!(revealed(&board, (0, 2)));
        assert!(!revealed(&board, (0, 1)));
    }

    #[test]
    fn chord_with_too_few_flags_only_highlights() {
        let mut board = board((3, 3), &[(0, 1), (2, 1)]);
        board.reveal((1, 1));
        board.toggle_flag((0, 1));

        assert_eq!(board.chord((1, 1)), RevealOutcome::Highlighted);
        assert_eq!(board.cells().filter(|cell| cell.is_revealed()).count(), 1);
        assert!(board.is_highlighted((2, 1)));
        assert!(board.is_highlighted((0, 0)));
        assert!(!board.is_highlighted((0, 1)));
        assert!(!board.is_highlighted((1, 1)));
        assert_eq!(board.view_at((2, 1)), Some(CellView::Empty));

        assert!(board.clear_highlights());
        assert!(board.highlights().is_empty());
        assert_eq!(board.view_at((2, 1)), Some(CellView::Unknown));
        assert!(!board.clear_highlights());
    }

    #[test]
    fn chord_on_wrong_flag_explodes_neighbor() {
        let mut board = board((3, 3), &[(0, 1), (2, 1)]);
        board.reveal((1, 1));
        board.toggle_flag((0, 1));
        board.toggle_flag((1, 0));

        assert_eq!(board.chord((1, 1)), RevealOutcome::HitMine);
        assert!(board.cell((2, 1)).unwrap().is_exploded());
        assert!(!board.cell((0, 1)).unwrap().is_exploded());
        assert!(revealed(&board, (0, 1)));
        assert_eq!(board.state(), BoardState::Lost);
        for safe in [(0, 0), (2, 0), (0, 2), (1, 2), (2, 2)] {
            assert!(revealed(&board, safe), "{safe:?} stayed hidden");
        }
        assert!(!revealed(&board, (1, 0)));
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn chord_on_hidden_or_blank_cell_does_nothing() {
        let mut board = board((5, 1), &[(2, 0)]);

        assert_eq!(board.chord((1, 0)), RevealOutcome::NoChange);
        assert_eq!(board.reveal((0, 0)), RevealOutcome::Revealed);
        assert!(revealed(&board, (1, 0)));
        assert_eq!(board.chord((0, 0)), RevealOutcome::NoChange);
        assert_eq!(board.reveal((0, 0)), RevealOutcome::NoChange);
    }

    #[test]
    fn chord_marks_every_detonated_mine() {
        let mut board = board((3, 3), &[(0, 0), (2, 0)]);
        board.reveal((1, 1));
        board.toggle_flag((0, 2));
        board.toggle_flag((2, 2));

        assert_eq!(board.chord((1, 1)), RevealOutcome::HitMine);
        assert!(board.cell((0, 0)).unwrap().is_exploded());
        assert!(board.cell((2, 0)).unwrap().is_exploded());
        assert!(revealed(&board, (1, 0)));
        assert!(revealed(&board, (0, 1)));
        assert!(revealed(&board, (2, 1)));
        assert!(!revealed(&board, (0, 2)));
        assert!(board.cell((0, 2)).unwrap().is_flagged());
    }

    #[test]
    fn win_flags_mines_and_scores() {
        let layout = MineLayout::from_mine_coords((9, 9), &[(8, 8)]).unwrap();
        let mut board = Board::from_layout(&layout, Difficulty::Beginner).unwrap();
        board.toggle_flag((0, 5));
        board.toggle_flag((0, 5));
        board.advance_time(Duration::from_secs(12));

        assert_eq!(board.reveal((0, 0)), RevealOutcome::Won);
        assert!(board.is_over());
        assert!(board.cell((8, 8)).unwrap().is_flagged());
        assert_eq!(board.mines_left(), 0);
        assert_eq!(board.score(), 81_000 - 120 - 5);

        board.advance_time(Duration::from_secs(30));
        assert_eq!(board.elapsed(), Duration::from_secs(12));
    }

    #[test]
    fn outcomes_tell_caller_when_to_redraw_and_stop() {
        let mut board = board((3, 1), &[(2, 0)]);

        let flag = board.toggle_flag((2, 0));
        assert!(flag.has_update());
        assert!(!board.toggle_flag((9, 0)).has_update());

        let shut = board.reveal((2, 0));
        assert!(!shut.has_update());
        assert!(!shut.is_final());

        board.toggle_flag((2, 0));
        let opened = board.reveal((0, 0));
        assert_eq!(opened, RevealOutcome::Won);
        assert!(opened.has_update());
        assert!(opened.is_final());

        let after = board.reveal((1, 0));
        assert!(!after.has_update());
        assert!(!board.toggle_flag((2, 0)).has_update());
    }

    #[test]
    fn mine_hit_outcome_ends_session() {
        let mut board = board((2, 2), &[(1, 1)]);

        let opened = board.reveal((0, 0));
        assert!(opened.has_update());
        assert!(!opened.is_final());

        let hit = board.reveal((1, 1));
        assert!(hit.has_update());
        assert!(hit.is_final());
        assert!(board.is_over());
    }

    #[test]
    fn persisted_board_drops_highlights() {
        let mut board = board((3, 3), &[(0, 1), (2, 1)]);
        board.reveal((1, 1));
        board.toggle_flag((0, 1));
        board.chord((1, 1));
        assert!(!board.highlights().is_empty());

        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert!(restored.highlights().is_empty());
        assert_eq!(restored.flags_used(), 1);
        assert_eq!(restored.snapshot().view_at((1, 1)), Some(CellView::Number(2)));
        board.clear_highlights();
        assert_eq!(restored, board);
    }

    #[test]
    fn initialize_rejects_bad_config() {
        let config = GameConfig::new_unchecked((3, 3), 9, Difficulty::Custom);
        assert_eq!(
            Board::initialize(config, 1),
            Err(GameError::InvalidConfiguration(ConfigIssue::TooManyMines))
        );
    }

    #[test]
    fn restart_keeps_config_and_resets_session() {
        let mut board = Board::initialize(GameConfig::BEGINNER, 3).unwrap();
        board.toggle_flag((0, 0));
        board.advance_time(Duration::from_secs(4));

        board.restart(4);

        assert_eq!(board.config(), GameConfig::BEGINNER);
        assert_eq!(board.flags_used(), 0);
        assert_eq!(board.elapsed(), Duration::ZERO);
        assert_eq!(board.state(), BoardState::Active);
        assert_eq!(board.cells().filter(|cell| cell.kind().is_mine()).count(), 10);
        assert!(board.cells().all(|cell| !cell.is_revealed() && !cell.is_flagged()));
    }
}
