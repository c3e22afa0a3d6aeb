//! Removal validation folding the lock rule into the occupancy query.

use block_escape_core::RemovalCheck;

use crate::{
    block::{Block, BlockPhase},
    occupancy::OccupancyGrid,
};

/// Computes, per block, whether removal is currently legal.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValidationSystem;

impl ValidationSystem {
    /// Creates a new validation system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates a single block against the current occupancy.
    ///
    /// The blocking block is reported even when the block is locked so the
    /// presentation layer can shake both.
    #[must_use]
    pub fn check_removal(&self, block: &Block, grid: &OccupancyGrid) -> RemovalCheck {
        let blocking_block = grid.blocking_block(block.id(), block.footprint(), block.direction());
        let locked = block.is_locked();
        RemovalCheck {
            removable: !locked && blocking_block.is_none(),
            blocking_block,
            locked,
        }
    }

    /// Revalidates every block and caches the result in its `removable` flag.
    ///
    /// Blocks already leaving the level keep `removable == false`. A block
    /// that is only shaking is judged like an idle one.
    pub fn update_all_block_states(&self, blocks: &mut [Block], grid: &OccupancyGrid) {
        for block in blocks.iter_mut() {
            let removable = block.phase() != BlockPhase::Removing
                && self.check_removal(block, grid).removable;
            block.set_removable(removable);
        }
        log::trace!(
            "revalidated {} blocks, {} removable",
            blocks.len(),
            blocks.iter().filter(|block| block.is_removable()).count()
        );
    }

    /// Reports whether every block of the level has been removed.
    #[must_use]
    pub fn is_level_complete(&self, blocks: &[Block]) -> bool {
        blocks.is_empty()
    }
}
