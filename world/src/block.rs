//! Authoritative block entity and the per-variant behaviour table.

use block_escape_core::{
    BlockColor, BlockId, BlockSnapshot, BlockSpec, BlockVariant, Direction, Footprint,
};

/// Animation phase a block is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockPhase {
    /// No animation is in flight.
    Idle,
    /// A shake or denial animation is playing; the block stays in the level.
    Feedback,
    /// The block left the occupancy grid and its removal animation is playing.
    Removing,
}

/// Behaviour attached to a block variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VariantBehavior {
    starts_locked: bool,
    unlocks_on_removal: bool,
}

const fn behavior(variant: BlockVariant) -> VariantBehavior {
    match variant {
        BlockVariant::Standard => VariantBehavior {
            starts_locked: false,
            unlocks_on_removal: false,
        },
        BlockVariant::Key => VariantBehavior {
            starts_locked: false,
            unlocks_on_removal: true,
        },
        BlockVariant::Locked => VariantBehavior {
            starts_locked: true,
            unlocks_on_removal: false,
        },
    }
}

/// Puzzle-relevant state of one block, independent of how it is drawn.
#[derive(Clone, Debug)]
pub struct Block {
    id: BlockId,
    footprint: Footprint,
    direction: Direction,
    variant: BlockVariant,
    color: Option<BlockColor>,
    locked: bool,
    removable: bool,
    phase: BlockPhase,
}

impl Block {
    /// Creates a block from its level specification.
    #[must_use]
    pub fn from_spec(id: BlockId, spec: &BlockSpec) -> Self {
        Self {
            id,
            footprint: spec.footprint(),
            direction: spec.direction,
            variant: spec.variant,
            color: spec.color,
            locked: behavior(spec.variant).starts_locked,
            removable: false,
            phase: BlockPhase::Idle,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> BlockId {
        self.id
    }

    /// Cells occupied by the block.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }

    /// Direction the block must travel to be removed.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Fixed variant of the block.
    #[must_use]
    pub const fn variant(&self) -> BlockVariant {
        self.variant
    }

    /// Optional tint carried over from the level data.
    #[must_use]
    pub const fn color(&self) -> Option<BlockColor> {
        self.color
    }

    /// Whether the block is a locked block that has not been released.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Cached result of the last validation pass.
    #[must_use]
    pub const fn is_removable(&self) -> bool {
        self.removable
    }

    /// Current animation phase.
    #[must_use]
    pub const fn phase(&self) -> BlockPhase {
        self.phase
    }

    /// Whether a removal or feedback animation is in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.phase != BlockPhase::Idle
    }

    /// Whether removing this block releases every locked block.
    #[must_use]
    pub const fn unlocks_on_removal(&self) -> bool {
        behavior(self.variant).unlocks_on_removal
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot {
            id: self.id,
            footprint: self.footprint,
            direction: self.direction,
            variant: self.variant,
            locked: self.locked,
            removable: self.removable,
            animating: self.is_animating(),
            color: self.color,
        }
    }

    pub(crate) fn set_removable(&mut self, removable: bool) {
        self.removable = removable;
    }

    /// Releases the lock. Returns `true` only on the one transition from locked to unlocked.
    pub(crate) fn unlock(&mut self) -> bool {
        let was_locked = self.locked;
        self.locked = false;
        was_locked
    }

    pub(crate) fn begin_removal(&mut self) {
        self.phase = BlockPhase::Removing;
        self.removable = false;
    }

    pub(crate) fn begin_feedback(&mut self) {
        if self.phase == BlockPhase::Idle {
            self.phase = BlockPhase::Feedback;
        }
    }

    pub(crate) fn finish_feedback(&mut self) -> bool {
        if self.phase == BlockPhase::Feedback {
            self.phase = BlockPhase::Idle;
            return true;
        }
        false
    }
}
