//! Conversion of grid-space level data into centred world-space placements.

use block_escape_core::{Axis, BlockSpec, Footprint, GridSize, LevelData};
use glam::Vec3;
use serde::Deserialize;

/// Spacing parameters applied when laying out grid cells in world space.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// World-space edge length of a single cell.
    pub cell_size: f32,
    /// World-space spacing inserted between neighbouring cells.
    pub gap: f32,
}

impl ParserConfig {
    /// Creates a new parser configuration.
    #[must_use]
    pub const fn new(cell_size: f32, gap: f32) -> Self {
        Self { cell_size, gap }
    }

    /// Distance between the minimum corners of two adjacent cells.
    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.cell_size + self.gap
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new(1.0, 0.05)
    }
}

/// World-space placement of one block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockPlacement {
    /// Grid cells occupied by the block.
    pub footprint: Footprint,
    /// Centre of the block after the structure has been centred on the origin.
    pub center: Vec3,
    /// Full edge lengths of the block.
    pub extent: Vec3,
}

/// Output of [`LevelParser::parse`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedLevel {
    /// Placements in the order the level lists its blocks.
    pub placements: Vec<BlockPlacement>,
    /// Minimum corner of the centred bounding box.
    pub bounds_min: Vec3,
    /// Maximum corner of the centred bounding box.
    pub bounds_max: Vec3,
}

impl ParsedLevel {
    /// Edge lengths of the structure's bounding box.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.bounds_max - self.bounds_min
    }
}

/// Pure transform from [`LevelData`] to world-space placements.
#[derive(Clone, Copy, Debug, Default)]
pub struct LevelParser {
    config: ParserConfig,
}

impl LevelParser {
    /// Creates a parser using the provided spacing.
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Spacing the parser applies.
    #[must_use]
    pub const fn config(&self) -> ParserConfig {
        self.config
    }

    /// Lays out every block of `level` and centres the structure on the origin.
    #[must_use]
    pub fn parse(&self, level: &LevelData) -> ParsedLevel {
        let mut placements: Vec<BlockPlacement> =
            level.blocks().iter().map(|spec| self.place(spec)).collect();

        let Some(first) = placements.first() else {
            return ParsedLevel {
                placements,
                bounds_min: Vec3::ZERO,
                bounds_max: Vec3::ZERO,
            };
        };

        let half = first.extent * 0.5;
        let (mut min, mut max) = (first.center - half, first.center + half);
        for placement in &placements[1..] {
            let half = placement.extent * 0.5;
            min = min.min(placement.center - half);
            max = max.max(placement.center + half);
        }

        let offset = (min + max) * 0.5;
        for placement in &mut placements {
            placement.center -= offset;
        }

        ParsedLevel {
            placements,
            bounds_min: min - offset,
            bounds_max: max - offset,
        }
    }

    /// Uncentred world-space position of a block's minimum corner.
    #[must_use]
    pub fn corner(&self, spec: &BlockSpec) -> Vec3 {
        let pitch = self.config.pitch();
        let origin = spec.position;
        Vec3::new(
            origin.x() as f32 * pitch,
            origin.y() as f32 * pitch,
            origin.z() as f32 * pitch,
        )
    }

    /// Full edge lengths of a block spanning `size` cells, gaps included.
    #[must_use]
    pub fn extent(&self, size: GridSize) -> Vec3 {
        let span = |axis: Axis| {
            let cells = size.along(axis) as f32;
            cells * self.config.cell_size + (cells - 1.0) * self.config.gap
        };
        Vec3::new(span(Axis::X), span(Axis::Y), span(Axis::Z))
    }

    fn place(&self, spec: &BlockSpec) -> BlockPlacement {
        let extent = self.extent(spec.size);
        BlockPlacement {
            footprint: spec.footprint(),
            center: self.corner(spec) + extent * 0.5,
            extent,
        }
    }
}
