//! Greedy solver that plays a level through the world.
//!
//! Removing a block only ever clears paths and releases locks, so taking any
//! removable block never leads to a dead end: a level is solvable exactly when
//! the greedy walk empties it.

use block_escape_core::{BlockId, Command, GameState, LevelData, LevelDataError};
use block_escape_world::{self as world, query, World};

/// Result of solving a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Solution {
    /// Every block was removed; indices follow the level's block list.
    Solved(Vec<usize>),
    /// The walk stalled with blocks left; indices of the removed blocks so far.
    Stuck(Vec<usize>),
}

impl Solution {
    /// Reports whether the level was cleared.
    #[must_use]
    pub const fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    /// Removal order, in block-list indices.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        match self {
            Self::Solved(order) | Self::Stuck(order) => order,
        }
    }
}

/// Plays `level` to completion, always removing the lowest-indexed removable block.
pub fn solve(level: &LevelData) -> Result<Solution, LevelDataError> {
    level.validate()?;

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: level.clone(),
        },
        &mut events,
    );
    let ids: Vec<BlockId> = query::blocks(&world).iter().map(|block| block.id()).collect();

    let mut order = Vec::with_capacity(ids.len());
    while query::state(&world) == GameState::Playing {
        let Some(next) = query::blocks(&world)
            .iter()
            .find(|block| block.is_removable())
            .map(|block| block.id())
        else {
            break;
        };

        events.clear();
        world::apply(&mut world, Command::ClickBlock { block: next }, &mut events);
        world::apply(&mut world, Command::CompleteRemoval { block: next }, &mut events);
        if let Some(index) = ids.iter().position(|id| *id == next) {
            order.push(index);
        }
    }

    log::debug!(
        "solver removed {} of {} blocks in level {}",
        order.len(),
        ids.len(),
        level.id().get()
    );

    if query::state(&world) == GameState::Won {
        Ok(Solution::Solved(order))
    } else {
        Ok(Solution::Stuck(order))
    }
}
