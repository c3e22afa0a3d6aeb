#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Engagement timers that end idle or overlong sessions and unstick input.

use std::time::Duration;

use block_escape_core::{Command, Event, GameState, SessionEndReason};
use serde::Deserialize;

const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_ENGAGEMENT: Duration = Duration::from_secs(180);
const DEFAULT_INPUT_FAILSAFE: Duration = Duration::from_secs(5);

/// Timer limits; a `None` limit disables that timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "RawConfig")]
pub struct Config {
    idle_timeout: Option<Duration>,
    max_engagement: Option<Duration>,
    input_failsafe: Option<Duration>,
}

impl Config {
    /// Creates a new configuration from the three timer limits.
    #[must_use]
    pub const fn new(
        idle_timeout: Option<Duration>,
        max_engagement: Option<Duration>,
        input_failsafe: Option<Duration>,
    ) -> Self {
        Self {
            idle_timeout,
            max_engagement,
            input_failsafe,
        }
    }

    /// Configuration with every timer disabled.
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(None, None, None)
    }

    /// Window without interaction after which the session ends.
    #[must_use]
    pub const fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Absolute session length after which the session ends.
    #[must_use]
    pub const fn max_engagement(&self) -> Option<Duration> {
        self.max_engagement
    }

    /// Delay after which disabled input is force-enabled.
    #[must_use]
    pub const fn input_failsafe(&self) -> Option<Duration> {
        self.input_failsafe
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            Some(DEFAULT_IDLE_TIMEOUT),
            Some(DEFAULT_MAX_ENGAGEMENT),
            Some(DEFAULT_INPUT_FAILSAFE),
        )
    }
}

/// Millisecond form used by configuration files. A limit of `0` disables
/// that timer; a missing key keeps the default.
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    idle_timeout_ms: u64,
    max_engagement_ms: u64,
    input_failsafe_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        let millis = |limit: Duration| u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        Self {
            idle_timeout_ms: millis(DEFAULT_IDLE_TIMEOUT),
            max_engagement_ms: millis(DEFAULT_MAX_ENGAGEMENT),
            input_failsafe_ms: millis(DEFAULT_INPUT_FAILSAFE),
        }
    }
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        let limit = |millis: u64| (millis > 0).then_some(Duration::from_millis(millis));
        Self::new(
            limit(raw.idle_timeout_ms),
            limit(raw.max_engagement_ms),
            limit(raw.input_failsafe_ms),
        )
    }
}

/// Single cancellable countdown.
#[derive(Clone, Copy, Debug)]
struct Timer {
    limit: Option<Duration>,
    remaining: Option<Duration>,
}

impl Timer {
    const fn new(limit: Option<Duration>) -> Self {
        Self {
            limit,
            remaining: None,
        }
    }

    fn arm(&mut self) {
        self.remaining = self.limit;
    }

    fn cancel(&mut self) {
        self.remaining = None;
    }

    /// Counts down by `dt`, returning `true` exactly once when the timer expires.
    fn advance(&mut self, dt: Duration) -> bool {
        match self.remaining {
            Some(remaining) if dt >= remaining => {
                self.remaining = None;
                true
            }
            Some(remaining) => {
                self.remaining = Some(remaining - dt);
                false
            }
            None => false,
        }
    }
}

/// Pure system owning the idle, maximum-engagement and input-failsafe timers.
#[derive(Debug)]
pub struct Engagement {
    idle: Timer,
    max_engagement: Timer,
    input_failsafe: Timer,
    active: bool,
    paused: bool,
}

impl Engagement {
    /// Creates a new engagement system with every timer disarmed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            idle: Timer::new(config.idle_timeout),
            max_engagement: Timer::new(config.max_engagement),
            input_failsafe: Timer::new(config.input_failsafe),
            active: false,
            paused: false,
        }
    }

    /// Consumes world events and emits the commands of expired timers.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::LevelLoaded { input_enabled, .. } => {
                    self.active = true;
                    self.paused = false;
                    self.idle.arm();
                    self.max_engagement.arm();
                    if *input_enabled {
                        self.input_failsafe.cancel();
                    } else {
                        self.input_failsafe.arm();
                    }
                }
                Event::BlockClicked { .. } | Event::StructureRotated { .. } => {
                    if self.active {
                        self.idle.arm();
                    }
                }
                Event::InputEnabledChanged { enabled: true } => self.input_failsafe.cancel(),
                Event::InputEnabledChanged { enabled: false } => {
                    if self.active {
                        self.input_failsafe.arm();
                    }
                }
                Event::StateChanged { to, .. } => match to {
                    GameState::Won | GameState::GameOver | GameState::Loading => self.cancel_all(),
                    GameState::Paused => self.paused = true,
                    GameState::Playing => self.paused = false,
                },
                Event::TimeAdvanced { dt } if self.active && !self.paused => {
                    self.advance(*dt, out);
                }
                _ => {}
            }
        }
    }

    /// Time left on the idle timer, if armed.
    #[must_use]
    pub const fn idle_remaining(&self) -> Option<Duration> {
        self.idle.remaining
    }

    /// Time left on the maximum-engagement timer, if armed.
    #[must_use]
    pub const fn max_engagement_remaining(&self) -> Option<Duration> {
        self.max_engagement.remaining
    }

    /// Time left on the input failsafe, if armed.
    #[must_use]
    pub const fn input_failsafe_remaining(&self) -> Option<Duration> {
        self.input_failsafe.remaining
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        if self.input_failsafe.advance(dt) {
            log::info!("input failsafe elapsed, forcing input on");
            out.push(Command::SetInputEnabled { enabled: true });
        }

        let reason = if self.max_engagement.advance(dt) {
            Some(SessionEndReason::MaxEngagement)
        } else if self.idle.advance(dt) {
            Some(SessionEndReason::Idle)
        } else {
            None
        };

        if let Some(reason) = reason {
            log::info!("engagement timer elapsed: {reason:?}");
            self.cancel_all();
            out.push(Command::EndSession { reason });
        }
    }

    fn cancel_all(&mut self) {
        self.active = false;
        self.idle.cancel();
        self.max_engagement.cancel();
        self.input_failsafe.cancel();
    }
}
