//! Sparse spatial index mapping occupied cells to their owning block.

use std::collections::HashMap;

use block_escape_core::{Axis, BlockId, Direction, Footprint, GridCoord};

/// Sparse occupancy index answering "what blocks this block's path?".
///
/// Besides the cell owners the grid remembers the inclusive bounds of every
/// cell registered since it was created. Obstruction scans stop once they
/// leave those bounds, so the scan depth always covers the whole structure
/// no matter how large a level grows. Bounds never shrink on `unregister`,
/// which keeps them a superset of the occupied region.
#[derive(Clone, Debug, Default)]
pub struct OccupancyGrid {
    cells: HashMap<GridCoord, BlockId>,
    bounds: Option<(GridCoord, GridCoord)>,
}

impl OccupancyGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every cell of `footprint` as owned by `block`.
    ///
    /// The cells must be free. Overlapping footprints are an authoring error
    /// caught by level validation, not by the grid.
    pub fn register(&mut self, block: BlockId, footprint: Footprint) {
        for cell in footprint.cells() {
            let previous = self.cells.insert(cell, block);
            debug_assert!(
                previous.is_none(),
                "cell {cell:?} registered twice ({previous:?} and {block:?})"
            );
        }
        self.extend_bounds(footprint);
    }

    /// Frees every cell of `footprint` previously registered for `block`.
    ///
    /// Must be called exactly once per registration, with the same footprint.
    pub fn unregister(&mut self, block: BlockId, footprint: Footprint) {
        for cell in footprint.cells() {
            if self.cells.get(&cell) == Some(&block) {
                let _ = self.cells.remove(&cell);
            }
        }
    }

    /// Returns the block owning the provided cell, if any.
    #[must_use]
    pub fn block_at(&self, cell: GridCoord) -> Option<BlockId> {
        self.cells.get(&cell).copied()
    }

    /// Finds the nearest block obstructing `footprint` along `direction`.
    ///
    /// The scan starts at the layer adjacent to the footprint on the side
    /// facing `direction` and walks one layer at a time. Each layer checks the
    /// full cross-section the footprint spans on the two other axes, so wide
    /// blocks check wide slices. The first foreign owner found in the nearest
    /// occupied layer is returned; cells owned by `block` itself are ignored.
    #[must_use]
    pub fn blocking_block(
        &self,
        block: BlockId,
        footprint: Footprint,
        direction: Direction,
    ) -> Option<BlockId> {
        let (min, max) = self.bounds?;
        let axis = direction.axis();
        let (first_axis, second_axis) = axis.others();
        let step = direction.sign();

        let mut layer = if step > 0 {
            footprint.end(axis)
        } else {
            footprint.start(axis).checked_sub(1)?
        };
        let layers = min.along(axis)..=max.along(axis);

        while layers.contains(&layer) {
            for second in footprint.start(second_axis)..=footprint.last(second_axis) {
                for first in footprint.start(first_axis)..=footprint.last(first_axis) {
                    let cell = footprint
                        .origin()
                        .with(axis, layer)
                        .with(first_axis, first)
                        .with(second_axis, second);
                    match self.cells.get(&cell) {
                        Some(owner) if *owner != block => return Some(*owner),
                        _ => {}
                    }
                }
            }
            layer = match layer.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }

        None
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Inclusive bounds of every cell registered since the grid was created.
    #[must_use]
    pub fn bounds(&self) -> Option<(GridCoord, GridCoord)> {
        self.bounds
    }

    fn extend_bounds(&mut self, footprint: Footprint) {
        let low = footprint.origin();
        let high = GridCoord::new(
            footprint.last(Axis::X),
            footprint.last(Axis::Y),
            footprint.last(Axis::Z),
        );
        self.bounds = Some(match self.bounds {
            None => (low, high),
            Some((min, max)) => (
                GridCoord::new(
                    min.x().min(low.x()),
                    min.y().min(low.y()),
                    min.z().min(low.z()),
                ),
                GridCoord::new(
                    max.x().max(high.x()),
                    max.y().max(high.y()),
                    max.z().max(high.z()),
                ),
            ),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_escape_core::GridSize;

    fn unit(x: i32, y: i32, z: i32) -> Footprint {
        Footprint::new(GridCoord::new(x, y, z), GridSize::UNIT)
    }

    #[test]
    fn scans_stop_at_the_edge_of_the_coordinate_range() {
        let mut low = OccupancyGrid::new();
        low.register(BlockId::new(0), unit(i32::MIN, 0, 0));
        let bottom = unit(i32::MIN, 0, 0);
        assert_eq!(low.blocking_block(BlockId::new(0), bottom, Direction::NegX), None);

        let mut high = OccupancyGrid::new();
        high.register(BlockId::new(1), unit(i32::MAX, 0, 0));
        let top = unit(i32::MAX, 0, 0);
        assert_eq!(high.block_at(top.origin()), Some(BlockId::new(1)));
        assert_eq!(high.bounds(), Some((top.origin(), top.origin())));
        assert_eq!(high.blocking_block(BlockId::new(1), top, Direction::PosX), None);
    }

    #[test]
    fn register_then_unregister_restores_cells() {
        let mut grid = OccupancyGrid::new();
        grid.register(BlockId::new(0), unit(5, 5, 5));
        let before: Vec<_> = (0..4).map(|x| grid.block_at(GridCoord::new(x, 0, 0))).collect();

        let wide = Footprint::new(GridCoord::new(0, 0, 0), GridSize::new(4, 2, 1));
        grid.register(BlockId::new(1), wide);
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.block_at(GridCoord::new(3, 1, 0)), Some(BlockId::new(1)));

        grid.unregister(BlockId::new(1), wide);
        let after: Vec<_> = (0..4).map(|x| grid.block_at(GridCoord::new(x, 0, 0))).collect();
        assert_eq!(before, after);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.block_at(GridCoord::new(5, 5, 5)), Some(BlockId::new(0)));
    }

    #[test]
    fn empty_grid_never_blocks() {
        let grid = OccupancyGrid::new();
        for direction in Direction::ALL {
            assert_eq!(grid.blocking_block(BlockId::new(0), unit(0, 0, 0), direction), None);
        }
    }

    #[test]
    fn returns_nearest_obstruction_along_direction() {
        let mut grid = OccupancyGrid::new();
        grid.register(BlockId::new(0), unit(0, 0, 0));
        grid.register(BlockId::new(1), unit(0, 0, 3));
        grid.register(BlockId::new(2), unit(0, 0, 6));

        assert_eq!(
            grid.blocking_block(BlockId::new(0), unit(0, 0, 0), Direction::PosZ),
            Some(BlockId::new(1))
        );
        assert_eq!(
            grid.blocking_block(BlockId::new(2), unit(0, 0, 6), Direction::NegZ),
            Some(BlockId::new(1))
        );
        assert_eq!(
            grid.blocking_block(BlockId::new(2), unit(0, 0, 6), Direction::PosZ),
            None
        );
        assert_eq!(
            grid.blocking_block(BlockId::new(0), unit(0, 0, 0), Direction::PosX),
            None
        );
    }

    #[test]
    fn tall_block_checks_every_row_of_its_cross_section() {
        let mut grid = OccupancyGrid::new();
        let tall = Footprint::new(GridCoord::new(0, 0, 0), GridSize::new(1, 3, 1));
        grid.register(BlockId::new(0), tall);

        for row in 0..3 {
            let mut probe = grid.clone();
            probe.register(BlockId::new(9), unit(1, row, 0));
            assert_eq!(
                probe.blocking_block(BlockId::new(0), tall, Direction::PosX),
                Some(BlockId::new(9)),
                "row {row} of the first +x layer must be scanned"
            );
        }

        grid.register(BlockId::new(9), unit(1, 3, 0));
        assert_eq!(grid.blocking_block(BlockId::new(0), tall, Direction::PosX), None);
    }

    #[test]
    fn wide_block_scans_wide_slice_in_later_layers() {
        let mut grid = OccupancyGrid::new();
        let wide = Footprint::new(GridCoord::new(0, 0, 0), GridSize::new(3, 1, 2));
        grid.register(BlockId::new(0), wide);
        grid.register(BlockId::new(1), unit(2, 4, 1));

        assert_eq!(
            grid.blocking_block(BlockId::new(0), wide, Direction::PosY),
            Some(BlockId::new(1))
        );
        assert_eq!(grid.blocking_block(BlockId::new(0), wide, Direction::NegY), None);
    }

    #[test]
    fn unregistered_block_no_longer_obstructs() {
        let mut grid = OccupancyGrid::new();
        grid.register(BlockId::new(0), unit(0, 0, 0));
        grid.register(BlockId::new(1), unit(0, 0, 1));
        grid.unregister(BlockId::new(1), unit(0, 0, 1));

        assert_eq!(
            grid.blocking_block(BlockId::new(0), unit(0, 0, 0), Direction::PosZ),
            None
        );
        assert_eq!(
            grid.bounds(),
            Some((GridCoord::new(0, 0, 0), GridCoord::new(0, 0, 1)))
        );
    }
}
