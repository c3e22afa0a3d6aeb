#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game manager tying the world, level catalogue and pure systems together.
//!
//! Every public operation becomes one or more world commands. Events produced
//! by the world are fed to the engagement and guide systems; the commands
//! they emit are applied in FIFO order until the queue drains. Events are
//! also forwarded to the collaborators and registered callbacks.

pub mod collaborators;
mod config;

use std::{collections::VecDeque, time::Duration};

use block_escape_core::{
    BlockId, BlockView, Command, Event, GameState, LevelData, LevelDataError, LevelId,
    RemovalDenial, RotationDelta, SessionEndReason,
};
use block_escape_levels::LevelRegistry;
use block_escape_system_engagement::Engagement;
use block_escape_system_guide::Guide;
use block_escape_world::{self as world, query, World};
use thiserror::Error;

pub use self::{
    collaborators::{
        AnimationKind, AnimationTicket, Animator, AudioSink, ScoreBoard, Silent, SoundCue,
        TicketQueue,
    },
    config::{FallbackPolicy, ManagerConfig},
};
pub use block_escape_system_engagement::Config as EngagementConfig;
pub use block_escape_world::query::ValidationView;

/// Errors reported by [`GameManager`].
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The level data breaks the authoring invariants and no fallback applied.
    #[error("level {} is invalid", .level.get())]
    InvalidLevel {
        /// Identifier carried by the rejected data.
        level: LevelId,
        /// Violated invariant.
        #[source]
        source: LevelDataError,
    },
    /// The registry holds no level that could be loaded.
    #[error("no level available to load")]
    NoLevel,
    /// No level has been loaded yet.
    #[error("no level is loaded")]
    NothingLoaded,
    /// The configuration document could not be parsed.
    #[error("invalid manager configuration")]
    Config(#[from] toml::de::Error),
}

type WinCallback = Box<dyn FnMut(LevelId)>;
type RemovedCallback = Box<dyn FnMut(usize)>;
type TimeoutCallback = Box<dyn FnMut(SessionEndReason)>;

/// Top-level orchestrator owning the puzzle state and its collaborators.
pub struct GameManager {
    world: World,
    registry: LevelRegistry,
    engagement: Engagement,
    guide: Guide,
    fallback: FallbackPolicy,
    current: Option<LevelData>,
    animator: Box<dyn Animator>,
    score_board: Box<dyn ScoreBoard>,
    audio: Box<dyn AudioSink>,
    on_win: Vec<WinCallback>,
    on_block_removed: Vec<RemovedCallback>,
    on_timeout: Vec<TimeoutCallback>,
}

impl GameManager {
    /// Creates a manager over `registry` that hands animations to `animator`.
    ///
    /// Score and audio output default to [`Silent`].
    #[must_use]
    pub fn new(
        registry: LevelRegistry,
        config: ManagerConfig,
        animator: Box<dyn Animator>,
    ) -> Self {
        let mut manager = Self {
            world: World::new(),
            registry,
            engagement: Engagement::new(config.engagement),
            guide: Guide::new(config.guided),
            fallback: config.fallback,
            current: None,
            animator,
            score_board: Box::new(Silent),
            audio: Box::new(Silent),
            on_win: Vec::new(),
            on_block_removed: Vec::new(),
            on_timeout: Vec::new(),
        };
        if config.start_input_disabled {
            manager.dispatch(Command::SetInputEnabled { enabled: false });
        }
        manager
    }

    /// Replaces the score board.
    #[must_use]
    pub fn with_score_board(mut self, score_board: Box<dyn ScoreBoard>) -> Self {
        self.score_board = score_board;
        self
    }

    /// Replaces the audio sink.
    #[must_use]
    pub fn with_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = audio;
        self
    }

    /// Registers a callback invoked when a level is cleared.
    pub fn on_win(&mut self, callback: impl FnMut(LevelId) + 'static) {
        self.on_win.push(Box::new(callback));
    }

    /// Registers a callback invoked with the remaining block count after each removal.
    pub fn on_block_removed(&mut self, callback: impl FnMut(usize) + 'static) {
        self.on_block_removed.push(Box::new(callback));
    }

    /// Registers a callback invoked when an engagement timer ends the session.
    pub fn on_timeout(&mut self, callback: impl FnMut(SessionEndReason) + 'static) {
        self.on_timeout.push(Box::new(callback));
    }

    /// Loads `level`, returning the identifier of the level actually loaded.
    ///
    /// Invalid data is handled according to the configured [`FallbackPolicy`].
    pub fn load_level(&mut self, level: LevelData) -> Result<LevelId, ManagerError> {
        if let Err(source) = level.validate() {
            log::warn!("level {} rejected: {source}", level.id().get());
            return match self.fallback {
                FallbackPolicy::DefaultLevel => {
                    let fallback = self
                        .registry
                        .get(LevelId::FIRST)
                        .filter(|candidate| candidate.validate().is_ok())
                        .cloned()
                        .ok_or(ManagerError::InvalidLevel {
                            level: level.id(),
                            source,
                        })?;
                    Ok(self.install(fallback))
                }
                FallbackPolicy::KeepCurrent => Err(ManagerError::InvalidLevel {
                    level: level.id(),
                    source,
                }),
            };
        }
        Ok(self.install(level))
    }

    /// Loads level `number` from the registry, falling back to level 1.
    pub fn load_level_number(&mut self, number: u32) -> Result<LevelId, ManagerError> {
        let level = self
            .registry
            .resolve(LevelId::new(number))
            .cloned()
            .ok_or(ManagerError::NoLevel)?;
        self.load_level(level)
    }

    /// Loads the level after the current one, wrapping to the first level.
    pub fn load_next_level(&mut self) -> Result<LevelId, ManagerError> {
        let next = self
            .current_level()
            .and_then(|current| self.registry.next_after(current))
            .or_else(|| self.registry.first())
            .cloned()
            .ok_or(ManagerError::NoLevel)?;
        self.load_level(next)
    }

    /// Reloads the level currently being played from its original data.
    pub fn restart_current_level(&mut self) -> Result<LevelId, ManagerError> {
        let level = self.current.clone().ok_or(ManagerError::NothingLoaded)?;
        Ok(self.install(level))
    }

    /// Forwards a click on `block` from the input layer.
    pub fn click_block(&mut self, block: BlockId) {
        self.dispatch(Command::ClickBlock { block });
    }

    /// Forwards a drag rotation from the input layer.
    pub fn rotate_structure(&mut self, delta: RotationDelta) {
        self.dispatch(Command::RotateStructure { delta });
    }

    /// Advances the engagement timers.
    pub fn tick(&mut self, dt: Duration) {
        self.dispatch(Command::Tick { dt });
    }

    /// Pauses play.
    pub fn pause(&mut self) {
        self.dispatch(Command::Pause);
    }

    /// Resumes play.
    pub fn resume(&mut self) {
        self.dispatch(Command::Resume);
    }

    /// Restricts input to `block`, or lifts the restriction.
    pub fn set_restricted_block(&mut self, block: Option<BlockId>) {
        self.dispatch(Command::SetRestrictedBlock { block });
    }

    /// Enables player input.
    pub fn enable_input(&mut self) {
        self.dispatch(Command::SetInputEnabled { enabled: true });
    }

    /// Disables player input.
    pub fn disable_input(&mut self) {
        self.dispatch(Command::SetInputEnabled { enabled: false });
    }

    /// Turns guided mode on or off.
    pub fn set_guided(&mut self, enabled: bool) {
        let view = query::block_view(&self.world);
        let mut commands = Vec::new();
        self.guide.set_enabled(enabled, &view, &mut commands);
        for command in commands {
            self.dispatch(command);
        }
    }

    /// Returns a finished animation's ticket.
    pub fn complete_animation(&mut self, ticket: AnimationTicket) {
        let block = ticket.block();
        match ticket.kind() {
            AnimationKind::Removal { .. } => self.dispatch(Command::CompleteRemoval { block }),
            AnimationKind::Feedback { .. } => self.dispatch(Command::CompleteFeedback { block }),
        }
    }

    /// Current game state.
    #[must_use]
    pub fn state(&self) -> GameState {
        query::state(&self.world)
    }

    /// Snapshot of every block still in the level.
    #[must_use]
    pub fn blocks(&self) -> BlockView {
        query::block_view(&self.world)
    }

    /// Removal validation bound to the current level.
    #[must_use]
    pub fn validation(&self) -> ValidationView<'_> {
        query::validation(&self.world)
    }

    /// Number of blocks still in the level.
    #[must_use]
    pub fn remaining_blocks(&self) -> usize {
        query::remaining_blocks(&self.world)
    }

    /// Blocks removed in the current level.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Identifier of the level being played.
    #[must_use]
    pub fn current_level(&self) -> Option<LevelId> {
        query::level(&self.world)
    }

    /// Reports whether player input is enabled.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        query::input_enabled(&self.world)
    }

    /// Block input is currently restricted to, if any.
    #[must_use]
    pub fn restricted_block(&self) -> Option<BlockId> {
        query::restricted_block(&self.world)
    }

    /// Block a player should remove next, whether or not guided mode is active.
    #[must_use]
    pub fn hint(&self) -> Option<BlockId> {
        block_escape_system_guide::next_hint(&query::block_view(&self.world))
    }

    /// Reports whether guided mode is active.
    #[must_use]
    pub fn is_guided(&self) -> bool {
        self.guide.is_enabled()
    }

    /// Level catalogue the manager loads from.
    #[must_use]
    pub fn registry(&self) -> &LevelRegistry {
        &self.registry
    }

    /// Engagement timers, for display.
    #[must_use]
    pub fn engagement(&self) -> &Engagement {
        &self.engagement
    }

    fn install(&mut self, level: LevelData) -> LevelId {
        let id = level.id();
        log::info!("loading level {} ({} blocks)", id.get(), level.blocks().len());
        self.current = Some(level.clone());
        self.dispatch(Command::LoadLevel { level });
        id
    }

    fn dispatch(&mut self, command: Command) {
        let mut queue = VecDeque::from([command]);
        while let Some(command) = queue.pop_front() {
            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            let mut follow_up = Vec::new();
            self.engagement.handle(&events, &mut follow_up);
            let view = query::block_view(&self.world);
            self.guide.handle(&events, &view, &mut follow_up);

            for event in events {
                self.notify(event);
            }
            queue.extend(follow_up);
        }
    }

    fn notify(&mut self, event: Event) {
        match event {
            Event::LevelLoaded { level, .. } => {
                self.score_board.reset_score();
                self.score_board.set_level_number(level);
            }
            Event::RemovalStarted {
                block, direction, ..
            } => {
                self.audio.play(SoundCue::Remove);
                self.animator.play(AnimationTicket::new(
                    block,
                    AnimationKind::Removal { direction },
                ));
            }
            Event::ScoreChanged { .. } => self.score_board.increment_score(),
            Event::BlocksUnlocked { .. } => self.audio.play(SoundCue::Unlock),
            Event::RemovalDenied { reason, .. } => self.audio.play(match reason {
                RemovalDenial::Locked { .. } => SoundCue::Denied,
                RemovalDenial::Blocked { .. } => SoundCue::Blocked,
            }),
            Event::FeedbackRequested { block, kind } => {
                self.animator
                    .play(AnimationTicket::new(block, AnimationKind::Feedback { kind }));
            }
            Event::BlockRemoved { remaining, .. } => {
                for callback in &mut self.on_block_removed {
                    callback(remaining);
                }
            }
            Event::LevelCompleted { level } => {
                self.audio.play(SoundCue::Win);
                for callback in &mut self.on_win {
                    callback(level);
                }
            }
            Event::SessionEnded { reason } => {
                self.audio.play(SoundCue::SessionOver);
                for callback in &mut self.on_timeout {
                    callback(reason);
                }
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for GameManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameManager")
            .field("state", &self.state())
            .field("level", &self.current_level())
            .field("remaining", &self.remaining_blocks())
            .field("guided", &self.guide.is_enabled())
            .finish_non_exhaustive()
    }
}
