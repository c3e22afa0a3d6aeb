//! Table-enforced game state machine.

use block_escape_core::GameState;
use thiserror::Error;

/// Requested transition that is not part of the state table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("game state transition {from:?} -> {to:?} is not permitted")]
pub struct TransitionError {
    /// State the machine remained in.
    pub from: GameState,
    /// State that was requested.
    pub to: GameState,
}

/// Owner of the current [`GameState`]. Every change goes through [`Self::transition`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct GameStateMachine {
    current: GameState,
}

impl GameStateMachine {
    pub(crate) const fn new() -> Self {
        Self {
            current: GameState::Loading,
        }
    }

    pub(crate) const fn current(&self) -> GameState {
        self.current
    }

    /// Moves to `next` if the table allows it, returning the previous state.
    pub(crate) fn transition(&mut self, next: GameState) -> Result<GameState, TransitionError> {
        let from = self.current;
        if !from.can_transition_to(next) {
            return Err(TransitionError { from, to: next });
        }
        self.current = next;
        Ok(from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_loading() {
        assert_eq!(GameStateMachine::new().current(), GameState::Loading);
    }

    #[test]
    fn rejected_transition_leaves_state_untouched() {
        let mut machine = GameStateMachine::new();
        assert_eq!(
            machine.transition(GameState::Won),
            Err(TransitionError {
                from: GameState::Loading,
                to: GameState::Won,
            })
        );
        assert_eq!(machine.current(), GameState::Loading);
    }

    #[test]
    fn walks_full_lifecycle() {
        let mut machine = GameStateMachine::new();
        assert_eq!(machine.transition(GameState::Playing), Ok(GameState::Loading));
        assert_eq!(machine.transition(GameState::Paused), Ok(GameState::Playing));
        assert_eq!(machine.transition(GameState::Playing), Ok(GameState::Paused));
        assert_eq!(machine.transition(GameState::Won), Ok(GameState::Playing));
        assert!(machine.transition(GameState::Paused).is_err());
        assert_eq!(machine.transition(GameState::Loading), Ok(GameState::Won));
    }
}
