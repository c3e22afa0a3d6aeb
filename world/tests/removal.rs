use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use block_escape_core::{
    BlockId, BlockSpec, BlockVariant, Command, Direction, Event, FeedbackKind, GameState,
    GridCoord, GridSize, LevelData, LevelId, RemovalDenial, RotationDelta,
};
use block_escape_world::{self as world, query, World};

fn load(blocks: Vec<BlockSpec>) -> (World, Vec<BlockId>) {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelData::new(LevelId::new(1), blocks),
        },
        &mut events,
    );
    let ids = query::blocks(&world).iter().map(|block| block.id()).collect();
    (world, ids)
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

/// Clicks a block and plays every requested animation to completion.
fn remove(world: &mut World, block: BlockId) -> Vec<Event> {
    let mut events = run(world, Command::ClickBlock { block });
    let shaken: Vec<BlockId> = events
        .iter()
        .filter_map(|event| match event {
            Event::FeedbackRequested { block, .. } => Some(*block),
            _ => None,
        })
        .collect();
    for shaken_block in shaken {
        events.extend(run(world, Command::CompleteFeedback { block: shaken_block }));
    }
    events.extend(run(world, Command::CompleteRemoval { block }));
    events
}

fn key_and_lock() -> Vec<BlockSpec> {
    vec![
        BlockSpec::new(
            GridCoord::new(0, 0, 0),
            GridSize::UNIT,
            Direction::PosY,
            BlockVariant::Key,
        ),
        BlockSpec::new(
            GridCoord::new(3, 0, 0),
            GridSize::UNIT,
            Direction::PosY,
            BlockVariant::Locked,
        ),
    ]
}

#[test]
fn locked_block_is_denied_until_key_removed() {
    let (mut world, ids) = load(key_and_lock());
    let (key, locked) = (ids[0], ids[1]);

    let events = run(&mut world, Command::ClickBlock { block: locked });
    assert!(
        events.contains(&Event::RemovalDenied {
            block: locked,
            reason: RemovalDenial::Locked { blocking: None },
        }),
        "locked click must be denied, got {events:?}"
    );
    assert!(events.contains(&Event::FeedbackRequested {
        block: locked,
        kind: FeedbackKind::Denied,
    }));
    let _ = run(&mut world, Command::CompleteFeedback { block: locked });

    let events = run(&mut world, Command::ClickBlock { block: key });
    assert!(events.contains(&Event::BlocksUnlocked {
        blocks: vec![locked]
    }));

    let check = query::validation(&world)
        .check_removal(locked)
        .expect("locked block still present");
    assert!(check.removable, "key removal must release the lock");
}

#[test]
fn standard_removal_leaves_locked_blocks_locked() {
    let mut specs = key_and_lock();
    specs.push(BlockSpec::unit(GridCoord::new(6, 0, 0), Direction::PosY));
    let (mut world, ids) = load(specs);

    let events = remove(&mut world, ids[2]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::BlocksUnlocked { .. })));
    assert!(query::block(&world, ids[1]).is_some_and(|block| block.is_locked()));
}

#[test]
fn blocked_click_shakes_clicked_block_and_blocker() {
    let (mut world, ids) = load(vec![
        BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosZ),
        BlockSpec::unit(GridCoord::new(0, 0, 1), Direction::PosZ),
    ]);

    let events = run(&mut world, Command::ClickBlock { block: ids[0] });
    assert_eq!(
        events,
        vec![
            Event::BlockClicked { block: ids[0] },
            Event::RemovalDenied {
                block: ids[0],
                reason: RemovalDenial::Blocked { by: ids[1] },
            },
            Event::FeedbackRequested {
                block: ids[0],
                kind: FeedbackKind::Blocked,
            },
            Event::FeedbackRequested {
                block: ids[1],
                kind: FeedbackKind::Obstruction,
            },
        ]
    );
    assert_eq!(query::score(&world), 0);

    let ignored = run(&mut world, Command::ClickBlock { block: ids[1] });
    assert!(ignored.is_empty(), "blocker is animating its feedback");

    let _ = run(&mut world, Command::CompleteFeedback { block: ids[1] });
    let events = run(&mut world, Command::ClickBlock { block: ids[1] });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::RemovalStarted { .. })));
}

#[test]
fn revalidation_during_shake_keeps_cached_flag_accurate() {
    let (mut world, ids) = load(vec![
        BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosZ),
        BlockSpec::unit(GridCoord::new(0, 0, 1), Direction::PosZ),
        BlockSpec::unit(GridCoord::new(5, 0, 0), Direction::PosY),
    ]);
    let (lower, upper, lone) = (ids[0], ids[1], ids[2]);

    let _ = run(&mut world, Command::ClickBlock { block: lower });
    let _ = run(&mut world, Command::ClickBlock { block: lone });
    let _ = run(&mut world, Command::CompleteRemoval { block: lone });
    let _ = run(&mut world, Command::CompleteFeedback { block: upper });

    let check = query::validation(&world)
        .check_removal(upper)
        .expect("upper block still present");
    assert!(check.removable);
    assert!(query::block(&world, upper).is_some_and(|block| block.is_removable()));
    assert!(query::block_view(&world)
        .iter()
        .any(|snapshot| snapshot.id == upper && snapshot.removable && !snapshot.animating));
}

#[test]
fn stacked_pair_becomes_removable_after_upper_completes() {
    let (mut world, ids) = load(vec![
        BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosZ),
        BlockSpec::unit(GridCoord::new(0, 0, 1), Direction::PosZ),
    ]);
    assert!(!query::block(&world, ids[0]).is_some_and(|block| block.is_removable()));

    let events = remove(&mut world, ids[1]);
    assert!(events.contains(&Event::BlockRemoved {
        block: ids[1],
        remaining: 1,
    }));
    assert!(query::block(&world, ids[0]).is_some_and(|block| block.is_removable()));
}

#[test]
fn win_fires_only_after_last_completion() {
    let (mut world, ids) = load(vec![
        BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::NegX),
        BlockSpec::unit(GridCoord::new(0, 2, 0), Direction::PosX),
    ]);

    let events = remove(&mut world, ids[0]);
    assert!(!query::validation(&world).is_level_complete());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::LevelCompleted { .. })));

    let _ = run(&mut world, Command::ClickBlock { block: ids[1] });
    assert_eq!(query::state(&world), GameState::Playing);

    let events = run(&mut world, Command::CompleteRemoval { block: ids[1] });
    assert_eq!(
        events,
        vec![
            Event::BlockRemoved {
                block: ids[1],
                remaining: 0,
            },
            Event::StateChanged {
                from: GameState::Playing,
                to: GameState::Won,
            },
            Event::LevelCompleted {
                level: LevelId::new(1)
            },
        ]
    );
    assert!(query::validation(&world).is_level_complete());
    assert_eq!(query::score(&world), 2);
}

#[test]
fn restricted_block_filters_clicks_and_rotation() {
    let (mut world, ids) = load(vec![
        BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY),
        BlockSpec::unit(GridCoord::new(4, 0, 0), Direction::PosY),
    ]);

    let _ = run(
        &mut world,
        Command::SetRestrictedBlock {
            block: Some(ids[1]),
        },
    );
    assert!(run(&mut world, Command::ClickBlock { block: ids[0] }).is_empty());
    assert!(run(
        &mut world,
        Command::RotateStructure {
            delta: RotationDelta::new(0.1, 0.0),
        }
    )
    .is_empty());

    let events = run(&mut world, Command::ClickBlock { block: ids[1] });
    assert!(events.contains(&Event::BlockClicked { block: ids[1] }));
}

#[test]
fn disabled_input_and_paused_state_ignore_clicks() {
    let (mut world, ids) = load(vec![BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY)]);

    let _ = run(&mut world, Command::SetInputEnabled { enabled: false });
    assert!(run(&mut world, Command::ClickBlock { block: ids[0] }).is_empty());

    let _ = run(&mut world, Command::SetInputEnabled { enabled: true });
    let _ = run(&mut world, Command::Pause);
    assert!(run(&mut world, Command::ClickBlock { block: ids[0] }).is_empty());
    assert_eq!(query::remaining_blocks(&world), 1);
}

#[test]
fn end_session_moves_to_game_over_and_blocks_input() {
    let (mut world, ids) = load(vec![BlockSpec::unit(GridCoord::new(0, 0, 0), Direction::PosY)]);

    let events = run(
        &mut world,
        Command::EndSession {
            reason: block_escape_core::SessionEndReason::Idle,
        },
    );
    assert_eq!(query::state(&world), GameState::GameOver);
    assert_eq!(
        events.last(),
        Some(&Event::SessionEnded {
            reason: block_escape_core::SessionEndReason::Idle
        })
    );
    assert!(run(&mut world, Command::ClickBlock { block: ids[0] }).is_empty());

    let events = run(&mut world, Command::Pause);
    assert_eq!(
        events,
        vec![Event::TransitionRejected {
            from: GameState::GameOver,
            to: GameState::Paused,
        }]
    );
}

#[test]
fn replay_of_scripted_session_is_deterministic() {
    let first = replay();
    let second = replay();
    assert_eq!(first, second, "replay diverged between runs");
}

fn replay() -> u64 {
    let (mut world, ids) = load(vec![
        BlockSpec::new(
            GridCoord::new(0, 0, 0),
            GridSize::new(1, 3, 1),
            Direction::PosX,
            BlockVariant::Standard,
        ),
        BlockSpec::unit(GridCoord::new(1, 2, 0), Direction::PosZ),
        BlockSpec::new(
            GridCoord::new(1, 0, 0),
            GridSize::UNIT,
            Direction::NegY,
            BlockVariant::Key,
        ),
        BlockSpec::new(
            GridCoord::new(0, 0, 2),
            GridSize::new(2, 1, 1),
            Direction::PosZ,
            BlockVariant::Locked,
        ),
    ]);

    let mut script = Vec::new();
    for id in [ids[0], ids[3], ids[1], ids[2], ids[0], ids[3]] {
        script.push(Command::ClickBlock { block: id });
        script.push(Command::CompleteFeedback { block: id });
        script.push(Command::CompleteRemoval { block: id });
        script.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
    }

    let mut hasher = DefaultHasher::new();
    for command in script {
        for event in run(&mut world, command) {
            format!("{event:?}").hash(&mut hasher);
        }
    }
    query::state(&world).hash(&mut hasher);
    hasher.finish()
}

#[test]
fn scripted_session_clears_every_block() {
    let (mut world, ids) = load(vec![
        BlockSpec::new(
            GridCoord::new(0, 0, 0),
            GridSize::new(1, 3, 1),
            Direction::PosX,
            BlockVariant::Standard,
        ),
        BlockSpec::unit(GridCoord::new(1, 2, 0), Direction::PosZ),
        BlockSpec::new(
            GridCoord::new(1, 0, 0),
            GridSize::UNIT,
            Direction::NegY,
            BlockVariant::Key,
        ),
    ]);

    let _ = remove(&mut world, ids[0]);
    assert_eq!(query::remaining_blocks(&world), 3, "tall block is blocked by both");

    let _ = remove(&mut world, ids[1]);
    let _ = remove(&mut world, ids[2]);
    let _ = remove(&mut world, ids[0]);
    assert_eq!(query::state(&world), GameState::Won);
}
