use ndarray::Array2;

use crate::*;
pub use probe::*;
pub use uniform::*;

mod probe;
mod uniform;

pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}

/// Layout for configs a generator cannot place mines into without looping forever.
fn degenerate_layout(config: GameConfig) -> Option<MineLayout> {
    let total_cells = config.total_cells();

    if total_cells == 0 {
        log::warn!("Cannot place mines on an empty board of size {:?}", config.size);
        return Some(MineLayout::from_sized_mask(Array2::default(
            config.size.to_nd_index(),
        )));
    }

    if config.mines >= total_cells {
        if config.mines > total_cells {
            log::warn!(
                "Minefield already full, generated anyway, requested {} but only fits {}",
                config.mines,
                total_cells
            );
        }
        return Some(MineLayout::from_sized_mask(Array2::from_elem(
            config.size.to_nd_index(),
            true,
        )));
    }

    None
}
