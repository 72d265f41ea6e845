use super::*;

/// Places each mine at a uniformly sampled coordinate, scanning forward along the row (wrapping to the next row,
/// then back to row 0) when that coordinate already holds a mine.
///
/// Collisions resolve deterministically, so for a given seed the layout is reproducible, but cells right after
/// existing mines are slightly favored over a uniform choice of mine subsets.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearProbeGenerator {
    seed: u64,
}

impl LinearProbeGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for LinearProbeGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        if let Some(layout) = degenerate_layout(config) {
            return layout;
        }

        let (width, height) = config.size;
        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut collisions = 0usize;

        for _ in 0..config.mines {
            let mut x = rng.random_range(0..width);
            let mut y = rng.random_range(0..height);

            while mines[(x, y).to_nd_index()] {
                collisions += 1;
                x += 1;
                if x >= width {
                    x = 0;
                    y += 1;
                    if y >= height {
                        y = 0;
                    }
                }
            }

            mines[(x, y).to_nd_index()] = true;
        }

        log::trace!(
            "Placed {} mines on {:?} with {} probe steps",
            config.mines,
            config.size,
            collisions
        );
        MineLayout::from_sized_mask(mines)
    }
}
