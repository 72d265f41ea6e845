use super::*;

/// Picks every mine uniformly among the cells still free, so each mine subset is equally likely.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformGenerator {
    seed: u64,
}

impl UniformGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for UniformGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        if let Some(layout) = degenerate_layout(config) {
            return layout;
        }

        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut free_cells = config.total_cells();
        let mut rng = SmallRng::seed_from_u64(self.seed);

        for _ in 0..config.mines {
            // index among the free cells only
            let mut place: CellCount = rng.random_range(0..free_cells);
            for cell in mines.iter_mut() {
                if *cell {
                    continue;
                }
                if place == 0 {
                    *cell = true;
                    free_cells -= 1;
                    break;
                }
                place -= 1;
            }
        }

        MineLayout::from_sized_mask(mines)
    }
}
