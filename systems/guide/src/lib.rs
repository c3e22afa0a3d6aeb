#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Guided mode: restricts input to a single hinted block at a time.

use block_escape_core::{BlockId, BlockView, Command, Event};

/// Picks the block a player should remove next.
///
/// The hint is the lowest-id block that is idle and currently removable.
#[must_use]
pub fn next_hint(blocks: &BlockView) -> Option<BlockId> {
    blocks
        .iter()
        .find(|block| block.removable && !block.animating)
        .map(|block| block.id)
}

/// Pure system that keeps the restricted block pointed at the current hint.
#[derive(Debug, Default)]
pub struct Guide {
    enabled: bool,
    hint: Option<BlockId>,
}

impl Guide {
    /// Creates a guide, optionally enabled from the start.
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            hint: None,
        }
    }

    /// Reports whether guided mode is active.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Block the guide currently restricts input to.
    #[must_use]
    pub const fn hint(&self) -> Option<BlockId> {
        self.hint
    }

    /// Turns guided mode on or off, emitting the restriction update.
    pub fn set_enabled(&mut self, enabled: bool, blocks: &BlockView, out: &mut Vec<Command>) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.refresh(blocks, out);
        } else {
            self.hint = None;
            out.push(Command::SetRestrictedBlock { block: None });
        }
    }

    /// Consumes world events and re-targets the hint when the level changes.
    pub fn handle(&mut self, events: &[Event], blocks: &BlockView, out: &mut Vec<Command>) {
        if !self.enabled {
            return;
        }

        let retarget = events.iter().any(|event| {
            matches!(
                event,
                Event::LevelLoaded { .. } | Event::BlockRemoved { .. }
            )
        });
        if retarget {
            self.refresh(blocks, out);
        }
    }

    fn refresh(&mut self, blocks: &BlockView, out: &mut Vec<Command>) {
        let hint = next_hint(blocks);
        log::debug!("guide hint: {hint:?}");
        self.hint = hint;
        out.push(Command::SetRestrictedBlock { block: hint });
    }
}
