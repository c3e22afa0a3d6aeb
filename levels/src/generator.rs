//! Seeded generator producing levels that are solvable by construction.

use block_escape_core::{
    Axis, BlockColor, BlockId, BlockSpec, BlockVariant, Direction, Footprint, GridCoord, GridSize,
    LevelData, LevelId,
};
use block_escape_world::occupancy::OccupancyGrid;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

const AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

const PALETTE: [BlockColor; 5] = [
    BlockColor::from_rgb(222, 196, 140),
    BlockColor::from_rgb(64, 160, 160),
    BlockColor::from_rgb(232, 110, 92),
    BlockColor::from_rgb(132, 176, 96),
    BlockColor::from_rgb(150, 120, 200),
];

/// Tuning knobs for [`generate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Edge length, in cells, of the cube blocks are placed in.
    pub extent: u32,
    /// Number of blocks the generator aims for.
    pub block_count: usize,
    /// Longest block, in cells, along its long axis.
    pub max_length: u32,
    /// Placement attempts allowed per requested block before giving up.
    pub attempts_per_block: usize,
    /// Whether to promote one block to a key and an earlier one to a lock.
    pub lock_pair: bool,
}

impl GeneratorConfig {
    /// Creates a configuration without a key/lock pair.
    #[must_use]
    pub const fn new(extent: u32, block_count: usize, max_length: u32) -> Self {
        Self {
            extent,
            block_count,
            max_length,
            attempts_per_block: 24,
            lock_pair: false,
        }
    }

    /// Returns a copy that requests a key/lock pair.
    #[must_use]
    pub const fn with_lock_pair(mut self) -> Self {
        self.lock_pair = true;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(4, 16, 3)
    }
}

/// Builds a level from `seed`.
///
/// Blocks are placed one at a time. Each block takes a direction whose ray
/// is clear of every block placed before it, so removing the blocks in
/// reverse placement order always succeeds. The key of a key/lock pair is
/// always placed after its lock for the same reason.
#[must_use]
pub fn generate(id: LevelId, seed: u64, config: &GeneratorConfig) -> LevelData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let extent = config.extent.max(1);
    let target = config.block_count.max(1);
    let budget = target.saturating_mul(config.attempts_per_block.max(1));

    let mut grid = OccupancyGrid::new();
    let mut blocks: Vec<BlockSpec> = Vec::with_capacity(target);
    let mut attempts = 0;
    while blocks.len() < target && attempts < budget {
        attempts += 1;

        let footprint = random_footprint(&mut rng, extent, config.max_length);
        if footprint.cells().any(|cell| grid.block_at(cell).is_some()) {
            continue;
        }

        let candidate = BlockId::new(blocks.len() as u32);
        let mut directions = Direction::ALL;
        directions.shuffle(&mut rng);
        let Some(direction) = directions
            .into_iter()
            .find(|direction| grid.blocking_block(candidate, footprint, *direction).is_none())
        else {
            continue;
        };

        grid.register(candidate, footprint);
        let color = PALETTE[rng.gen_range(0..PALETTE.len())];
        blocks.push(
            BlockSpec::new(
                footprint.origin(),
                footprint.size(),
                direction,
                BlockVariant::Standard,
            )
            .with_color(color),
        );
    }

    if config.lock_pair && blocks.len() >= 2 {
        let lock = rng.gen_range(0..blocks.len() - 1);
        let key = rng.gen_range(lock + 1..blocks.len());
        blocks[lock].variant = BlockVariant::Locked;
        blocks[key].variant = BlockVariant::Key;
    }

    log::debug!(
        "generated level {} with {} of {} blocks from seed {seed} after {attempts} attempts",
        id.get(),
        blocks.len(),
        target
    );

    LevelData::new(id, blocks).with_name(format!("Generated {seed}"))
}

fn random_footprint(rng: &mut ChaCha8Rng, extent: u32, max_length: u32) -> Footprint {
    let long_axis = AXES[rng.gen_range(0..AXES.len())];
    let length = rng.gen_range(1..=max_length.clamp(1, extent));
    let along = |axis: Axis| if axis == long_axis { length } else { 1 };
    let size = GridSize::new(along(Axis::X), along(Axis::Y), along(Axis::Z));

    let mut origin = GridCoord::new(0, 0, 0);
    for axis in AXES {
        let room = extent - size.along(axis);
        origin = origin.with(axis, rng.gen_range(0..=room) as i32);
    }
    Footprint::new(origin, size)
}
