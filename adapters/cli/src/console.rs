//! Line-based front end for `block-escape play`.

use std::{
    io::{self, BufRead, Write},
    time::Instant,
};

use anyhow::{Context, Result};
use block_escape_core::{
    BlockId, BlockSnapshot, BlockVariant, Direction, FeedbackKind, GameState, LevelData, LevelId,
    RotationDelta, SessionEndReason,
};
use block_escape_levels::LevelRegistry;
use block_escape_manager::{
    AnimationKind, AudioSink, GameManager, ManagerConfig, ScoreBoard, SoundCue, TicketQueue,
};

const HELP: &str = "\
commands:
  click <id>            remove a block
  rotate <yaw> <pitch>  turn the structure (radians)
  hint                  show the block to remove next
  blocks                list the remaining blocks
  pause | resume        suspend or continue the session
  restart | next        reload this level or load the next one
  level <number>        jump to a level
  guided on|off         restrict input to the hinted block
  quit                  leave the game";

#[derive(Debug, PartialEq)]
enum Input {
    Click(BlockId),
    Rotate(RotationDelta),
    Hint,
    Blocks,
    Pause,
    Resume,
    Restart,
    Next,
    Level(u32),
    Guided(bool),
    Help,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let input = match words.next()? {
        "click" | "c" => Input::Click(BlockId::new(words.next()?.parse().ok()?)),
        "rotate" | "r" => {
            let yaw = words.next()?.parse().ok()?;
            let pitch = words.next().map_or(Some(0.0), |word| word.parse().ok())?;
            Input::Rotate(RotationDelta::new(yaw, pitch))
        }
        "hint" | "h" => Input::Hint,
        "blocks" | "b" => Input::Blocks,
        "pause" => Input::Pause,
        "resume" => Input::Resume,
        "restart" => Input::Restart,
        "next" | "n" => Input::Next,
        "level" | "l" => Input::Level(words.next()?.parse().ok()?),
        "guided" => match words.next()? {
            "on" => Input::Guided(true),
            "off" => Input::Guided(false),
            _ => return None,
        },
        "help" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ => return None,
    };
    if words.next().is_some() {
        return None;
    }
    Some(input)
}

#[derive(Debug, Default)]
struct ConsoleScore {
    score: u32,
}

impl ScoreBoard for ConsoleScore {
    fn increment_score(&mut self) {
        self.score += 1;
        println!("score {}", self.score);
    }

    fn reset_score(&mut self) {
        self.score = 0;
    }

    fn set_level_number(&mut self, level: LevelId) {
        println!("== level {} ==", level.get());
    }
}

#[derive(Debug, Default)]
struct ConsoleAudio;

impl AudioSink for ConsoleAudio {
    fn play(&mut self, cue: SoundCue) {
        let sound = match cue {
            SoundCue::Remove => "whoosh",
            SoundCue::Unlock => "click-clack",
            SoundCue::Denied => "clunk",
            SoundCue::Blocked => "thud",
            SoundCue::Win => "fanfare",
            SoundCue::SessionOver => "gong",
        };
        println!("  *{sound}*");
    }
}

/// Runs an interactive session on stdin until the player quits or input ends.
pub(crate) fn play(
    registry: LevelRegistry,
    config: ManagerConfig,
    level: LevelData,
) -> Result<()> {
    let tickets = TicketQueue::new();
    let mut manager = GameManager::new(registry, config, Box::new(tickets.clone()))
        .with_score_board(Box::new(ConsoleScore::default()))
        .with_audio(Box::new(ConsoleAudio));
    manager.on_win(|level| {
        println!("level {} cleared! type `next` to continue", level.get());
    });
    manager.on_block_removed(|remaining| println!("{remaining} blocks left"));
    manager.on_timeout(|reason| match reason {
        SessionEndReason::Idle => println!("session ended: no moves for too long"),
        SessionEndReason::MaxEngagement => println!("session ended: time is up"),
    });

    let _ = manager.load_level(level).context("failed to load level")?;
    settle(&mut manager, &tickets);
    print_blocks(&manager);
    println!("type `help` for commands");

    let stdin = io::stdin();
    let mut last = Instant::now();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read input")?;
        let now = Instant::now();
        manager.tick(now.duration_since(last));
        last = now;

        if line.trim().is_empty() {
            prompt()?;
            continue;
        }
        let Some(input) = parse_input(&line) else {
            println!("unknown command, type `help`");
            prompt()?;
            continue;
        };
        if input == Input::Quit {
            break;
        }
        run(&mut manager, input);
        settle(&mut manager, &tickets);
        if manager.state() == GameState::GameOver {
            println!("type `restart` or `next` to play again");
        }
        prompt()?;
    }
    println!("final score {}", manager.score());
    Ok(())
}

fn run(manager: &mut GameManager, input: Input) {
    let loaded = match input {
        Input::Click(block) => {
            manager.click_block(block);
            return;
        }
        Input::Rotate(delta) => {
            manager.rotate_structure(delta);
            return;
        }
        Input::Hint => {
            match manager.hint() {
                Some(block) => println!("try #{}", block.get()),
                None => println!("no block can be removed right now"),
            }
            return;
        }
        Input::Blocks => {
            print_blocks(manager);
            return;
        }
        Input::Pause => {
            manager.pause();
            println!("{:?}", manager.state());
            return;
        }
        Input::Resume => {
            manager.resume();
            println!("{:?}", manager.state());
            return;
        }
        Input::Guided(enabled) => {
            manager.set_guided(enabled);
            println!("guided mode {}", if enabled { "on" } else { "off" });
            return;
        }
        Input::Help | Input::Quit => {
            println!("{HELP}");
            return;
        }
        Input::Restart => manager.restart_current_level(),
        Input::Next => manager.load_next_level(),
        Input::Level(number) => manager.load_level_number(number),
    };
    match loaded {
        Ok(_) => print_blocks(manager),
        Err(error) => println!("could not load level: {error}"),
    }
}

/// Plays every queued animation to completion.
fn settle(manager: &mut GameManager, tickets: &TicketQueue) {
    while let Some(ticket) = tickets.pop() {
        let block = ticket.block().get();
        match ticket.kind() {
            AnimationKind::Removal { direction } => {
                println!("  #{block} slides out {}", direction_label(direction));
            }
            AnimationKind::Feedback { kind } => {
                let reason = match kind {
                    FeedbackKind::Denied => "it is locked",
                    FeedbackKind::Blocked => "its path is blocked",
                    FeedbackKind::Obstruction => "it is in the way",
                };
                println!("  #{block} shakes: {reason}");
            }
        }
        manager.complete_animation(ticket);
    }
}

fn print_blocks(manager: &GameManager) {
    let view = manager.blocks();
    let restricted = manager.restricted_block();
    for snapshot in view.iter() {
        println!("{}", describe(snapshot, restricted));
    }
}

fn describe(snapshot: &BlockSnapshot, restricted: Option<BlockId>) -> String {
    let origin = snapshot.footprint.origin();
    let size = snapshot.footprint.size();
    let variant = match snapshot.variant {
        BlockVariant::Standard => "",
        BlockVariant::Key => " key",
        BlockVariant::Locked if snapshot.locked => " locked",
        BlockVariant::Locked => " unlocked",
    };
    let status = if snapshot.removable { "free" } else { "stuck" };
    let marker = if restricted == Some(snapshot.id) { " <" } else { "" };
    format!(
        "#{:<3} at ({}, {}, {}) size {}x{}x{} moves {}{variant} [{status}]{marker}",
        snapshot.id.get(),
        origin.x(),
        origin.y(),
        origin.z(),
        size.x(),
        size.y(),
        size.z(),
        direction_label(snapshot.direction),
    )
}

const fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::PosX => "+x",
        Direction::NegX => "-x",
        Direction::PosY => "+y",
        Direction::NegY => "-y",
        Direction::PosZ => "+z",
        Direction::NegZ => "-z",
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush().context("failed to flush stdout")
}
