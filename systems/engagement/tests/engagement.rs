use std::time::Duration;

use block_escape_core::{
    BlockSpec, Command, Direction, Event, GameState, GridCoord, LevelData, LevelId,
    SessionEndReason,
};
use block_escape_system_engagement::{Config, Engagement};
use block_escape_world::{self as world, query, World};

fn millis(value: u64) -> Option<Duration> {
    Some(Duration::from_millis(value))
}

fn level() -> LevelData {
    LevelData::new(
        LevelId::FIRST,
        vec![
            BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY),
            BlockSpec::unit(GridCoord::new(3, 0, 0), Direction::PosY),
        ],
    )
}

/// Applies `command` and feeds the resulting events through the engagement
/// system until no further commands are produced.
fn step(world: &mut World, engagement: &mut Engagement, command: Command) -> Vec<Command> {
    let mut emitted = Vec::new();
    let mut pending = vec![command];
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        let mut commands = Vec::new();
        engagement.handle(&events, &mut commands);
        emitted.extend(commands.iter().cloned());
        pending = commands;
    }
    emitted
}

fn tick(value: u64) -> Command {
    Command::Tick {
        dt: Duration::from_millis(value),
    }
}

fn loaded(config: Config) -> (World, Engagement) {
    let mut world = World::new();
    let mut engagement = Engagement::new(config);
    let _ = step(&mut world, &mut engagement, Command::LoadLevel { level: level() });
    (world, engagement)
}

#[test]
fn idle_timeout_ends_session() {
    let (mut world, mut engagement) = loaded(Config::new(millis(1_000), None, None));

    assert!(step(&mut world, &mut engagement, tick(600)).is_empty());
    let emitted = step(&mut world, &mut engagement, tick(400));

    assert_eq!(
        emitted,
        vec![Command::EndSession {
            reason: SessionEndReason::Idle
        }]
    );
    assert_eq!(query::state(&world), GameState::GameOver);
}

#[test]
fn interaction_rearms_idle_timer() {
    let (mut world, mut engagement) = loaded(Config::new(millis(1_000), None, None));
    let block = query::blocks(&world)[1].id();

    assert!(step(&mut world, &mut engagement, tick(900)).is_empty());
    assert!(step(&mut world, &mut engagement, Command::ClickBlock { block }).is_empty());
    assert_eq!(engagement.idle_remaining(), millis(1_000));

    assert!(step(&mut world, &mut engagement, tick(900)).is_empty());
    assert_eq!(query::state(&world), GameState::Playing);
}

#[test]
fn max_engagement_fires_despite_activity() {
    let (mut world, mut engagement) = loaded(Config::new(millis(500), millis(1_200), None));

    for _ in 0..3 {
        let _ = step(&mut world, &mut engagement, tick(400));
        let _ = step(
            &mut world,
            &mut engagement,
            Command::RotateStructure {
                delta: block_escape_core::RotationDelta::new(0.2, 0.0),
            },
        );
    }

    assert_eq!(query::state(&world), GameState::GameOver);
    assert!(engagement.max_engagement_remaining().is_none());
    assert!(engagement.idle_remaining().is_none());
}

#[test]
fn pause_stops_time_accrual() {
    let (mut world, mut engagement) = loaded(Config::new(millis(1_000), None, None));

    let _ = step(&mut world, &mut engagement, Command::Pause);
    assert!(step(&mut world, &mut engagement, tick(5_000)).is_empty());
    assert_eq!(query::state(&world), GameState::Paused);

    let _ = step(&mut world, &mut engagement, Command::Resume);
    assert_eq!(engagement.idle_remaining(), millis(1_000));
}

#[test]
fn winning_cancels_every_timer() {
    let (mut world, mut engagement) = loaded(Config::new(millis(1_000), millis(2_000), None));
    let ids: Vec<_> = query::blocks(&world).iter().map(|block| block.id()).collect();

    for block in ids {
        let _ = step(&mut world, &mut engagement, Command::ClickBlock { block });
        let _ = step(&mut world, &mut engagement, Command::CompleteRemoval { block });
    }
    assert_eq!(query::state(&world), GameState::Won);
    assert!(engagement.idle_remaining().is_none());
    assert!(engagement.max_engagement_remaining().is_none());

    assert!(step(&mut world, &mut engagement, tick(10_000)).is_empty());
}

#[test]
fn failsafe_enables_input_once() {
    let (mut world, mut engagement) = loaded(Config::new(None, None, millis(300)));

    let _ = step(
        &mut world,
        &mut engagement,
        Command::SetInputEnabled { enabled: false },
    );
    assert_eq!(engagement.input_failsafe_remaining(), millis(300));

    let emitted = step(&mut world, &mut engagement, tick(300));
    assert_eq!(emitted, vec![Command::SetInputEnabled { enabled: true }]);
    assert!(query::input_enabled(&world));
    assert!(step(&mut world, &mut engagement, tick(300)).is_empty());
}

#[test]
fn enabling_input_cancels_failsafe() {
    let (mut world, mut engagement) = loaded(Config::new(None, None, millis(300)));

    let _ = step(
        &mut world,
        &mut engagement,
        Command::SetInputEnabled { enabled: false },
    );
    let _ = step(
        &mut world,
        &mut engagement,
        Command::SetInputEnabled { enabled: true },
    );
    assert!(engagement.input_failsafe_remaining().is_none());
    assert!(step(&mut world, &mut engagement, tick(1_000)).is_empty());
}

#[test]
fn reload_replaces_stale_timers() {
    let (mut world, mut engagement) = loaded(Config::new(millis(1_000), None, None));

    let _ = step(&mut world, &mut engagement, tick(900));
    let _ = step(&mut world, &mut engagement, Command::LoadLevel { level: level() });
    assert_eq!(engagement.idle_remaining(), millis(1_000));

    assert!(step(&mut world, &mut engagement, tick(200)).is_empty());
    assert_eq!(query::state(&world), GameState::Playing);
}

#[test]
fn events_before_any_level_do_nothing() {
    let mut engagement = Engagement::new(Config::default());
    let mut commands = Vec::new();
    engagement.handle(
        &[
            Event::InputEnabledChanged { enabled: false },
            Event::TimeAdvanced {
                dt: Duration::from_secs(3_600),
            },
        ],
        &mut commands,
    );
    assert!(commands.is_empty());
    assert!(engagement.input_failsafe_remaining().is_none());
}

#[test]
fn config_reads_millisecond_fields() {
    let config: Config = toml::from_str("idle_timeout_ms = 2500\n").expect("config parses");
    assert_eq!(config.idle_timeout(), millis(2_500));
    assert_eq!(config.max_engagement(), Config::default().max_engagement());

    let empty: Config = toml::from_str("").expect("empty config parses");
    assert_eq!(empty, Config::default());
}

#[test]
fn zero_limit_disables_a_timer() {
    let config: Config =
        toml::from_str("idle_timeout_ms = 0\ninput_failsafe_ms = 0\n").expect("config parses");
    assert_eq!(config.idle_timeout(), None);
    assert_eq!(config.input_failsafe(), None);
    assert_eq!(config.max_engagement(), Config::default().max_engagement());

    let off: Config = toml::from_str(
        "idle_timeout_ms = 0\nmax_engagement_ms = 0\ninput_failsafe_ms = 0\n",
    )
    .expect("config parses");
    assert_eq!(off, Config::disabled());
}
