#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative puzzle state management for Block Escape.
//!
//! The world owns the active blocks, the occupancy grid and the game state
//! machine. Removal happens in two phases: a click that passes validation
//! frees the block's cells immediately, and the block only leaves the level
//! once the presentation layer reports that its removal animation finished
//! via [`Command::CompleteRemoval`]. Revalidation and win detection run in
//! that second phase.

pub mod block;
pub mod occupancy;
mod state;
pub mod validation;

use block_escape_core::{
    BlockId, Command, Event, FeedbackKind, GameState, LevelData, LevelId, RemovalCheck,
    RemovalDenial,
};

use self::{
    block::{Block, BlockPhase},
    occupancy::OccupancyGrid,
    state::GameStateMachine,
    validation::ValidationSystem,
};

pub use self::state::TransitionError;

/// Represents the authoritative Block Escape world state.
#[derive(Debug)]
pub struct World {
    level: Option<LevelId>,
    blocks: Vec<Block>,
    occupancy: OccupancyGrid,
    validation: ValidationSystem,
    machine: GameStateMachine,
    score: u32,
    input_enabled: bool,
    restricted: Option<BlockId>,
    next_block_id: u32,
}

impl World {
    /// Creates an empty world waiting for its first level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: None,
            blocks: Vec::new(),
            occupancy: OccupancyGrid::new(),
            validation: ValidationSystem::new(),
            machine: GameStateMachine::new(),
            score: 0,
            input_enabled: true,
            restricted: None,
            next_block_id: 0,
        }
    }

    fn block_index(&self, block: BlockId) -> Option<usize> {
        self.blocks.iter().position(|candidate| candidate.id() == block)
    }

    fn transition_to(&mut self, next: GameState, out_events: &mut Vec<Event>) -> bool {
        match self.machine.transition(next) {
            Ok(from) => {
                log::debug!("game state {from:?} -> {next:?}");
                out_events.push(Event::StateChanged { from, to: next });
                true
            }
            Err(error) => {
                log::warn!("{error}");
                out_events.push(Event::TransitionRejected {
                    from: error.from,
                    to: error.to,
                });
                false
            }
        }
    }

    fn load_level(&mut self, level: &LevelData, out_events: &mut Vec<Event>) {
        if let Err(reason) = level.validate() {
            log::warn!("rejected level {}: {reason}", level.id().get());
            out_events.push(Event::LevelRejected {
                level: level.id(),
                reason,
            });
            return;
        }

        if self.machine.current() != GameState::Loading
            && !self.transition_to(GameState::Loading, out_events)
        {
            return;
        }

        self.blocks.clear();
        self.occupancy = OccupancyGrid::new();
        self.score = 0;
        self.level = Some(level.id());
        for spec in level.blocks() {
            let block = Block::from_spec(BlockId::new(self.next_block_id), spec);
            self.next_block_id = self.next_block_id.wrapping_add(1);
            self.occupancy.register(block.id(), block.footprint());
            self.blocks.push(block);
        }
        self.validation
            .update_all_block_states(&mut self.blocks, &self.occupancy);

        if self.restricted.take().is_some() {
            out_events.push(Event::RestrictionChanged { block: None });
        }

        if !self.transition_to(GameState::Playing, out_events) {
            return;
        }

        log::info!(
            "loaded level {} with {} blocks",
            level.id().get(),
            self.blocks.len()
        );
        out_events.push(Event::LevelLoaded {
            level: level.id(),
            block_count: self.blocks.len(),
            input_enabled: self.input_enabled,
        });
    }

    fn accepts_click(&self, block: BlockId) -> Option<usize> {
        if !self.machine.current().accepts_input() {
            log::debug!("ignored click on {block:?}: state {:?}", self.machine.current());
            return None;
        }
        if !self.input_enabled {
            log::debug!("ignored click on {block:?}: input disabled");
            return None;
        }
        if self.restricted.is_some_and(|allowed| allowed != block) {
            log::debug!("ignored click on {block:?}: input restricted to {:?}", self.restricted);
            return None;
        }
        let index = self.block_index(block)?;
        if self.blocks[index].is_animating() {
            log::debug!("ignored click on {block:?}: animation in flight");
            return None;
        }
        Some(index)
    }

    fn begin_removal(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let block = &mut self.blocks[index];
        self.occupancy.unregister(block.id(), block.footprint());
        block.begin_removal();
        let (id, direction, variant) = (block.id(), block.direction(), block.variant());
        let releases_locks = block.unlocks_on_removal();

        self.score = self.score.saturating_add(1);
        out_events.push(Event::RemovalStarted {
            block: id,
            direction,
            variant,
        });
        out_events.push(Event::ScoreChanged { score: self.score });

        if releases_locks {
            let released: Vec<BlockId> = self
                .blocks
                .iter_mut()
                .filter_map(|candidate| candidate.unlock().then(|| candidate.id()))
                .collect();
            if !released.is_empty() {
                log::debug!("key {id:?} released {} locked blocks", released.len());
                out_events.push(Event::BlocksUnlocked { blocks: released });
            }
        }
    }

    fn deny_removal(&mut self, index: usize, check: RemovalCheck, out_events: &mut Vec<Event>) {
        let Some(reason) = check.denial() else {
            return;
        };
        let block = &mut self.blocks[index];
        block.begin_feedback();
        let id = block.id();

        let kind = match reason {
            RemovalDenial::Locked { .. } => FeedbackKind::Denied,
            RemovalDenial::Blocked { .. } => FeedbackKind::Blocked,
        };
        out_events.push(Event::RemovalDenied { block: id, reason });
        out_events.push(Event::FeedbackRequested { block: id, kind });

        let Some(blocker) = check.blocking_block else {
            return;
        };
        if let Some(other) = self.blocks.iter_mut().find(|other| other.id() == blocker) {
            if !other.is_animating() {
                other.begin_feedback();
                out_events.push(Event::FeedbackRequested {
                    block: blocker,
                    kind: FeedbackKind::Obstruction,
                });
            }
        }
    }

    fn finish_removal(&mut self, block: BlockId, out_events: &mut Vec<Event>) {
        let Some(index) = self.block_index(block) else {
            log::debug!("ignored removal completion for unknown {block:?}");
            return;
        };
        if self.blocks[index].phase() != BlockPhase::Removing {
            log::debug!("ignored removal completion for {block:?}: not removing");
            return;
        }

        let _ = self.blocks.remove(index);
        self.validation
            .update_all_block_states(&mut self.blocks, &self.occupancy);
        out_events.push(Event::BlockRemoved {
            block,
            remaining: self.blocks.len(),
        });
        self.check_completion(out_events);
    }

    fn check_completion(&mut self, out_events: &mut Vec<Event>) {
        if self.machine.current() != GameState::Playing
            || !self.validation.is_level_complete(&self.blocks)
        {
            return;
        }
        let Some(level) = self.level else {
            return;
        };
        if self.transition_to(GameState::Won, out_events) {
            log::info!("level {} completed with score {}", level.get(), self.score);
            out_events.push(Event::LevelCompleted { level });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => world.load_level(&level, out_events),
        Command::ClickBlock { block } => {
            let Some(index) = world.accepts_click(block) else {
                return;
            };
            out_events.push(Event::BlockClicked { block });
            let check = world
                .validation
                .check_removal(&world.blocks[index], &world.occupancy);
            if check.removable {
                world.begin_removal(index, out_events);
            } else {
                world.deny_removal(index, check, out_events);
            }
        }
        Command::CompleteRemoval { block } => world.finish_removal(block, out_events),
        Command::CompleteFeedback { block } => {
            if let Some(index) = world.block_index(block) {
                let _ = world.blocks[index].finish_feedback();
            }
        }
        Command::RotateStructure { delta } => {
            if world.machine.current().accepts_input()
                && world.input_enabled
                && world.restricted.is_none()
            {
                out_events.push(Event::StructureRotated { delta });
            }
        }
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::SetRestrictedBlock { block } => {
            if world.restricted != block {
                world.restricted = block;
                out_events.push(Event::RestrictionChanged { block });
            }
        }
        Command::SetInputEnabled { enabled } => {
            if world.input_enabled != enabled {
                world.input_enabled = enabled;
                out_events.push(Event::InputEnabledChanged { enabled });
            }
        }
        Command::Pause => {
            let _ = world.transition_to(GameState::Paused, out_events);
        }
        Command::Resume => {
            if world.transition_to(GameState::Playing, out_events) {
                world.check_completion(out_events);
            }
        }
        Command::EndSession { reason } => {
            if world.transition_to(GameState::GameOver, out_events) {
                log::info!("session ended: {reason:?}");
                out_events.push(Event::SessionEnded { reason });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use block_escape_core::{BlockId, BlockView, GameState, LevelId, RemovalCheck};

    use super::{block::Block, occupancy::OccupancyGrid, World};

    /// Current lifecycle state.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.machine.current()
    }

    /// Identifier of the loaded level, if any.
    #[must_use]
    pub fn level(world: &World) -> Option<LevelId> {
        world.level
    }

    /// Score accumulated in the current level.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Whether gameplay input is globally enabled.
    #[must_use]
    pub fn input_enabled(world: &World) -> bool {
        world.input_enabled
    }

    /// Block input is restricted to, if guided mode is active.
    #[must_use]
    pub fn restricted_block(world: &World) -> Option<BlockId> {
        world.restricted
    }

    /// Active blocks, including blocks whose removal animation is in flight.
    #[must_use]
    pub fn blocks(world: &World) -> &[Block] {
        &world.blocks
    }

    /// Looks up a single active block.
    #[must_use]
    pub fn block(world: &World, block: BlockId) -> Option<&Block> {
        world.blocks.iter().find(|candidate| candidate.id() == block)
    }

    /// Number of blocks still in the level.
    #[must_use]
    pub fn remaining_blocks(world: &World) -> usize {
        world.blocks.len()
    }

    /// Captures a read-only view of the active blocks.
    #[must_use]
    pub fn block_view(world: &World) -> BlockView {
        BlockView::from_snapshots(world.blocks.iter().map(Block::snapshot).collect())
    }

    /// Provides read-only access to the occupancy grid.
    #[must_use]
    pub fn occupancy(world: &World) -> &OccupancyGrid {
        &world.occupancy
    }

    /// Exposes the validation system bound to the current world state.
    #[must_use]
    pub fn validation(world: &World) -> ValidationView<'_> {
        ValidationView { world }
    }

    /// Read-only access to removal validation for guided-mode logic.
    #[derive(Clone, Copy, Debug)]
    pub struct ValidationView<'a> {
        world: &'a World,
    }

    impl ValidationView<'_> {
        /// Evaluates the removal of a block against the current occupancy.
        #[must_use]
        pub fn check_removal(&self, id: BlockId) -> Option<RemovalCheck> {
            let target = block(self.world, id)?;
            Some(
                self.world
                    .validation
                    .check_removal(target, &self.world.occupancy),
            )
        }

        /// Reports whether every block of the level has been removed.
        #[must_use]
        pub fn is_level_complete(&self) -> bool {
            self.world.validation.is_level_complete(&self.world.blocks)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_escape_core::{BlockSpec, BlockVariant, Direction, GridCoord, GridSize, LevelDataError};

    fn level(blocks: Vec<BlockSpec>) -> LevelData {
        LevelData::new(LevelId::new(1), blocks)
    }

    fn loaded(blocks: Vec<BlockSpec>) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                level: level(blocks),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn load_level_registers_blocks_and_starts_playing() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                level: level(vec![
                    BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosZ),
                    BlockSpec::new(
                        GridCoord::new(0, 0, 1),
                        GridSize::new(2, 2, 1),
                        Direction::PosZ,
                        BlockVariant::Standard,
                    ),
                ]),
            },
            &mut events,
        );

        assert_eq!(query::state(&world), GameState::Playing);
        assert_eq!(query::occupancy(&world).len(), 5);
        assert_eq!(
            events,
            vec![
                Event::StateChanged {
                    from: GameState::Loading,
                    to: GameState::Playing,
                },
                Event::LevelLoaded {
                    level: LevelId::new(1),
                    block_count: 2,
                    input_enabled: true,
                },
            ]
        );
        let view = query::block_view(&world);
        let removable: Vec<bool> = view.iter().map(|block| block.removable).collect();
        assert_eq!(removable, vec![false, true]);
    }

    #[test]
    fn invalid_level_keeps_previous_puzzle() {
        let mut world = loaded(vec![BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosX)]);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                level: LevelData::new(LevelId::new(9), Vec::new()),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::LevelRejected {
                level: LevelId::new(9),
                reason: LevelDataError::Empty,
            }]
        );
        assert_eq!(query::level(&world), Some(LevelId::new(1)));
        assert_eq!(query::remaining_blocks(&world), 1);
    }

    #[test]
    fn removal_frees_cells_before_animation_completes() {
        let mut world = loaded(vec![
            BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosZ),
            BlockSpec::unit(GridCoord::new(0, 0, 1), Direction::PosZ),
        ]);
        let lower = query::blocks(&world)[0].id();
        let upper = query::blocks(&world)[1].id();
        let mut events = Vec::new();

        apply(&mut world, Command::ClickBlock { block: upper }, &mut events);

        assert_eq!(query::occupancy(&world).block_at(GridCoord::new(0, 0, 1)), None);
        assert_eq!(query::remaining_blocks(&world), 2);
        assert_eq!(query::score(&world), 1);
        assert!(query::validation(&world)
            .check_removal(lower)
            .is_some_and(|check| check.removable));
        assert!(!query::block(&world, lower).is_some_and(Block::is_removable));
    }

    #[test]
    fn repeated_click_during_removal_is_ignored() {
        let mut world = loaded(vec![BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY)]);
        let block = query::blocks(&world)[0].id();
        let mut events = Vec::new();

        apply(&mut world, Command::ClickBlock { block }, &mut events);
        events.clear();
        apply(&mut world, Command::ClickBlock { block }, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::score(&world), 1);
    }

    #[test]
    fn pause_defers_win_until_resume() {
        let mut world = loaded(vec![BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY)]);
        let block = query::blocks(&world)[0].id();
        let mut events = Vec::new();

        apply(&mut world, Command::ClickBlock { block }, &mut events);
        apply(&mut world, Command::Pause, &mut events);
        apply(&mut world, Command::CompleteRemoval { block }, &mut events);
        assert_eq!(query::state(&world), GameState::Paused);

        events.clear();
        apply(&mut world, Command::Resume, &mut events);
        assert_eq!(query::state(&world), GameState::Won);
        assert_eq!(
            events.last(),
            Some(&Event::LevelCompleted {
                level: LevelId::new(1)
            })
        );
    }

    #[test]
    fn invalid_transition_is_reported_not_forced() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::Resume, &mut events);

        assert_eq!(
            events,
            vec![Event::TransitionRejected {
                from: GameState::Loading,
                to: GameState::Playing,
            }]
        );
        assert_eq!(query::state(&world), GameState::Loading);
    }

    #[test]
    fn block_ids_are_never_reused_across_loads() {
        let spec = vec![BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY)];
        let mut world = loaded(spec.clone());
        let first = query::blocks(&world)[0].id();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                level: level(spec),
            },
            &mut events,
        );
        let second = query::blocks(&world)[0].id();
        assert_ne!(first, second);

        events.clear();
        apply(&mut world, Command::CompleteRemoval { block: first }, &mut events);
        assert!(events.is_empty());
    }
}
