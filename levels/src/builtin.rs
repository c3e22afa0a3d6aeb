//! Levels shipped with the game.

use block_escape_core::{
    BlockColor, BlockSpec, BlockVariant, CameraHint, Direction, GridCoord, GridSize, LevelData,
    LevelId,
};

const SAND: BlockColor = BlockColor::from_rgb(222, 196, 140);
const TEAL: BlockColor = BlockColor::from_rgb(64, 160, 160);
const CORAL: BlockColor = BlockColor::from_rgb(232, 110, 92);
const GOLD: BlockColor = BlockColor::from_rgb(240, 190, 40);
const SLATE: BlockColor = BlockColor::from_rgb(96, 104, 120);

const fn block(x: i32, y: i32, z: i32, direction: Direction) -> BlockSpec {
    BlockSpec::unit(GridCoord::new(x, y, z), direction)
}

const fn long(x: i32, y: i32, z: i32, size: GridSize, direction: Direction) -> BlockSpec {
    BlockSpec::new(
        GridCoord::new(x, y, z),
        size,
        direction,
        BlockVariant::Standard,
    )
}

const fn key(x: i32, y: i32, z: i32, direction: Direction) -> BlockSpec {
    BlockSpec::new(
        GridCoord::new(x, y, z),
        GridSize::UNIT,
        direction,
        BlockVariant::Key,
    )
    .with_color(GOLD)
}

const fn locked(spec: BlockSpec) -> BlockSpec {
    BlockSpec::new(spec.position, spec.size, spec.direction, BlockVariant::Locked).with_color(SLATE)
}

pub(crate) fn levels() -> Vec<LevelData> {
    vec![
        first_steps(),
        crossroads(),
        long_haul(),
        key_master(),
        deep_stack(),
    ]
}

fn first_steps() -> LevelData {
    LevelData::new(
        LevelId::new(1),
        vec![
            block(0, 0, 0, Direction::PosX).with_color(SAND),
            block(1, 0, 0, Direction::PosX).with_color(SAND),
            block(2, 0, 0, Direction::PosX).with_color(SAND),
            block(0, 1, 0, Direction::PosY).with_color(TEAL),
        ],
    )
    .with_name("First Steps")
    .with_camera(CameraHint {
        distance: 6.0,
        yaw: 0.4,
        pitch: 0.3,
    })
}

fn crossroads() -> LevelData {
    LevelData::new(
        LevelId::new(2),
        vec![
            block(0, 1, 0, Direction::PosY).with_color(TEAL),
            block(1, 1, 0, Direction::PosY).with_color(TEAL),
            block(0, 1, 1, Direction::PosY).with_color(TEAL),
            block(1, 1, 1, Direction::PosY).with_color(TEAL),
            block(0, 0, 0, Direction::PosY).with_color(SAND),
            block(1, 0, 0, Direction::NegX).with_color(CORAL),
            block(0, 0, 1, Direction::PosZ).with_color(SAND),
            block(1, 0, 1, Direction::NegY).with_color(CORAL),
        ],
    )
    .with_name("Crossroads")
}

fn long_haul() -> LevelData {
    LevelData::new(
        LevelId::new(3),
        vec![
            long(0, 0, 0, GridSize::new(1, 3, 1), Direction::PosX).with_color(CORAL),
            block(1, 0, 0, Direction::PosZ).with_color(SAND),
            long(1, 1, 0, GridSize::new(2, 1, 1), Direction::PosY).with_color(TEAL),
            block(1, 2, 0, Direction::PosX).with_color(SAND),
            long(0, 0, 1, GridSize::new(3, 1, 1), Direction::NegY).with_color(CORAL),
        ],
    )
    .with_name("Long Haul")
}

fn key_master() -> LevelData {
    LevelData::new(
        LevelId::new(4),
        vec![
            key(0, 0, 0, Direction::NegX),
            locked(block(1, 0, 0, Direction::PosX)),
            locked(long(2, 0, 0, GridSize::new(1, 2, 1), Direction::PosX)),
            block(1, 1, 0, Direction::PosY).with_color(TEAL),
            block(0, 1, 0, Direction::NegY).with_color(SAND),
        ],
    )
    .with_name("Key Master")
}

fn deep_stack() -> LevelData {
    let mut blocks = Vec::new();
    for y in 0..3 {
        for x in 0..3 {
            let spec = match (x, y) {
                (0, 0) => locked(block(x, y, 0, Direction::NegZ)),
                (1, 1) => block(x, y, 0, Direction::PosZ).with_color(CORAL),
                _ => block(x, y, 0, Direction::NegZ).with_color(SAND),
            };
            blocks.push(spec);
        }
    }
    blocks.push(long(0, 0, 1, GridSize::new(3, 1, 1), Direction::NegY).with_color(CORAL));
    for y in 1..3 {
        for x in 0..3 {
            let direction = if x == 1 {
                Direction::PosY
            } else {
                Direction::PosZ
            };
            blocks.push(block(x, y, 1, direction).with_color(TEAL));
        }
    }
    blocks.push(key(1, 1, 2, Direction::PosZ));

    LevelData::new(LevelId::new(5), blocks)
        .with_name("Deep Stack")
        .with_camera(CameraHint {
            distance: 9.0,
            yaw: 0.6,
            pitch: 0.45,
        })
}
