//! Seams to the presentation, scoring and audio layers.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use block_escape_core::{BlockId, Direction, FeedbackKind, LevelId};

/// What an [`AnimationTicket`] asks the presentation layer to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    /// The block slides out along its removal direction.
    Removal {
        /// Direction of travel.
        direction: Direction,
    },
    /// The block shakes in place.
    Feedback {
        /// Why the block shakes.
        kind: FeedbackKind,
    },
}

/// Single-use token handed to the [`Animator`].
///
/// The ticket is not `Clone`: returning it through
/// `GameManager::complete_animation` consumes it, so each animation completes
/// at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct AnimationTicket {
    block: BlockId,
    kind: AnimationKind,
}

impl AnimationTicket {
    pub(crate) const fn new(block: BlockId, kind: AnimationKind) -> Self {
        Self { block, kind }
    }

    /// Block being animated.
    #[must_use]
    pub const fn block(&self) -> BlockId {
        self.block
    }

    /// Animation to play.
    #[must_use]
    pub const fn kind(&self) -> AnimationKind {
        self.kind
    }
}

/// Plays removal and feedback animations.
///
/// Implementations hand every ticket back to the manager once the animation
/// has finished.
pub trait Animator {
    /// Starts the animation described by `ticket`.
    fn play(&mut self, ticket: AnimationTicket);
}

/// Displays the score and current level number.
pub trait ScoreBoard {
    /// Adds one removed block to the score.
    fn increment_score(&mut self);
    /// Clears the score for a new level.
    fn reset_score(&mut self);
    /// Shows the number of the level being played.
    fn set_level_number(&mut self, level: LevelId);
}

/// Sound effects triggered by the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A block starts sliding out.
    Remove,
    /// Locked blocks were released.
    Unlock,
    /// A locked block was clicked.
    Denied,
    /// A blocked block was clicked.
    Blocked,
    /// The level was cleared.
    Win,
    /// An engagement timer ended the session.
    SessionOver,
}

/// Fire-and-forget audio output.
pub trait AudioSink {
    /// Plays `cue`.
    fn play(&mut self, cue: SoundCue);
}

/// Score board and audio sink that ignore everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl ScoreBoard for Silent {
    fn increment_score(&mut self) {}

    fn reset_score(&mut self) {}

    fn set_level_number(&mut self, _level: LevelId) {}
}

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Animator that parks tickets until the host drains them.
///
/// Clones share the same queue, so a host keeps one handle and gives the
/// other to the manager.
#[derive(Clone, Debug, Default)]
pub struct TicketQueue {
    tickets: Rc<RefCell<VecDeque<AnimationTicket>>>,
}

impl TicketQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the oldest pending ticket.
    #[must_use]
    pub fn pop(&self) -> Option<AnimationTicket> {
        self.tickets.borrow_mut().pop_front()
    }

    /// Takes every pending ticket in arrival order.
    #[must_use]
    pub fn drain(&self) -> Vec<AnimationTicket> {
        self.tickets.borrow_mut().drain(..).collect()
    }

    /// Number of pending tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.borrow().len()
    }

    /// Reports whether no ticket is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.borrow().is_empty()
    }
}

impl Animator for TicketQueue {
    fn play(&mut self, ticket: AnimationTicket) {
        self.tickets.borrow_mut().push_back(ticket);
    }
}
