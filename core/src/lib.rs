#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Block Escape engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative puzzle world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems
//! to react to deterministically. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active puzzle with the provided level.
    LoadLevel {
        /// Declarative description of the level to build.
        level: LevelData,
    },
    /// Reports that the player clicked a block.
    ClickBlock {
        /// Block resolved by the presentation layer's hit test.
        block: BlockId,
    },
    /// Signals that the removal animation of a block has finished.
    CompleteRemoval {
        /// Block whose removal animation completed.
        block: BlockId,
    },
    /// Signals that the feedback animation of a block has finished.
    CompleteFeedback {
        /// Block whose feedback animation completed.
        block: BlockId,
    },
    /// Forwards a structure rotation gesture. Rotation never affects puzzle state.
    RotateStructure {
        /// Rotation requested by the input source.
        delta: RotationDelta,
    },
    /// Advances the session clock by the provided delta time.
    Tick {
        /// Duration of wall time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Restricts gameplay input to a single block, or lifts the restriction.
    SetRestrictedBlock {
        /// Only block allowed to receive clicks, if any.
        block: Option<BlockId>,
    },
    /// Globally enables or disables gameplay input.
    SetInputEnabled {
        /// Whether input should be processed.
        enabled: bool,
    },
    /// Requests that a playing session pause.
    Pause,
    /// Requests that a paused session resume.
    Resume,
    /// Forces the session into its game-over state.
    EndSession {
        /// Reason the session ended.
        reason: SessionEndReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a level was built and is ready to play.
    LevelLoaded {
        /// Identifier of the loaded level.
        level: LevelId,
        /// Number of blocks created for the level.
        block_count: usize,
        /// Whether gameplay input was enabled when the level finished loading.
        input_enabled: bool,
    },
    /// Reports that a level could not be loaded; the previous puzzle is kept.
    LevelRejected {
        /// Identifier of the rejected level.
        level: LevelId,
        /// Specific reason the level data was refused.
        reason: LevelDataError,
    },
    /// Announces a game state transition.
    StateChanged {
        /// State before the transition.
        from: GameState,
        /// State after the transition.
        to: GameState,
    },
    /// Reports that a requested transition is not part of the state table.
    TransitionRejected {
        /// State the world remained in.
        from: GameState,
        /// State that was requested.
        to: GameState,
    },
    /// Confirms that a click passed the input guards and was evaluated.
    BlockClicked {
        /// Block that received the click.
        block: BlockId,
    },
    /// Forwards an accepted rotation gesture untouched.
    StructureRotated {
        /// Rotation requested by the input source.
        delta: RotationDelta,
    },
    /// Confirms that a block was authorised for removal and left the occupancy grid.
    RemovalStarted {
        /// Block that began its removal.
        block: BlockId,
        /// Direction the block travels while leaving the structure.
        direction: Direction,
        /// Variant of the departing block.
        variant: BlockVariant,
    },
    /// Reports that a clicked block may not be removed.
    RemovalDenied {
        /// Block that was clicked.
        block: BlockId,
        /// Why the removal was refused.
        reason: RemovalDenial,
    },
    /// Requests a feedback animation on a block.
    FeedbackRequested {
        /// Block that should play the feedback animation.
        block: BlockId,
        /// Cue the presentation layer should show.
        kind: FeedbackKind,
    },
    /// Confirms that locked blocks were released by a key removal.
    BlocksUnlocked {
        /// Blocks that transitioned from locked to unlocked.
        blocks: Vec<BlockId>,
    },
    /// Confirms that a block finished its removal and left the level.
    BlockRemoved {
        /// Block that was dropped from the level.
        block: BlockId,
        /// Number of blocks still present.
        remaining: usize,
    },
    /// Reports the score after it changed.
    ScoreChanged {
        /// Current score for the level.
        score: u32,
    },
    /// Announces that every block of the level was removed.
    LevelCompleted {
        /// Identifier of the completed level.
        level: LevelId,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration that elapsed in the tick.
        dt: Duration,
    },
    /// Reports a change of the guided-mode input restriction.
    RestrictionChanged {
        /// Only block allowed to receive clicks, if any.
        block: Option<BlockId>,
    },
    /// Reports that gameplay input was enabled or disabled.
    InputEnabledChanged {
        /// Whether input is now processed.
        enabled: bool,
    },
    /// Announces that the session was forced to end.
    SessionEnded {
        /// Reason the session ended.
        reason: SessionEndReason,
    },
}

/// Top-level lifecycle state of a puzzle session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// A level is being built; no input is accepted.
    Loading,
    /// The level is live and accepts gameplay input.
    Playing,
    /// The session is suspended.
    Paused,
    /// Every block was removed.
    Won,
    /// The session was ended before the level was cleared.
    GameOver,
}

impl GameState {
    /// Reports whether the transition table contains the edge `self -> next`.
    ///
    /// `Playing` and `Paused` may return to `Loading` so a level can be
    /// restarted or skipped while it is still running.
    #[must_use]
    pub const fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (Self::Loading, Self::Playing)
                | (Self::Playing, Self::Paused)
                | (Self::Playing, Self::Won)
                | (Self::Playing, Self::GameOver)
                | (Self::Playing, Self::Loading)
                | (Self::Paused, Self::Playing)
                | (Self::Paused, Self::GameOver)
                | (Self::Paused, Self::Loading)
                | (Self::Won, Self::Loading)
                | (Self::GameOver, Self::Loading)
        )
    }

    /// Reports whether gameplay input is processed in this state.
    #[must_use]
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Reason a session was forced to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEndReason {
    /// No interaction happened within the idle window.
    Idle,
    /// The absolute engagement window elapsed.
    MaxEngagement,
}

/// Why a clicked block may not be removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalDenial {
    /// The block is a locked block that no key has released yet.
    Locked {
        /// Nearest block in the removal path, if any.
        blocking: Option<BlockId>,
    },
    /// Another block sits in the removal path.
    Blocked {
        /// Nearest obstructing block.
        by: BlockId,
    },
}

/// Feedback cue requested from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// The clicked block is locked.
    Denied,
    /// The clicked block is obstructed.
    Blocked,
    /// The block obstructs the one that was clicked.
    Obstruction,
}

/// Rotation gesture passed through the engine untouched.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct RotationDelta {
    /// Rotation around the vertical axis in radians.
    pub yaw: f32,
    /// Rotation around the horizontal axis in radians.
    pub pitch: f32,
}

impl RotationDelta {
    /// Creates a new rotation delta.
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}

/// One of the three grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
    /// Depth axis.
    Z,
}

impl Axis {
    /// The two axes perpendicular to this one, in x, y, z order.
    #[must_use]
    pub const fn others(self) -> (Axis, Axis) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::X, Self::Z),
            Self::Z => (Self::X, Self::Y),
        }
    }
}

/// Axis-aligned removal direction of a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards increasing x.
    #[serde(rename = "+x")]
    PosX,
    /// Towards decreasing x.
    #[serde(rename = "-x")]
    NegX,
    /// Towards increasing y.
    #[serde(rename = "+y")]
    PosY,
    /// Towards decreasing y.
    #[serde(rename = "-y")]
    NegY,
    /// Towards increasing z.
    #[serde(rename = "+z")]
    PosZ,
    /// Towards decreasing z.
    #[serde(rename = "-z")]
    NegZ,
}

impl Direction {
    /// Every direction in canonical order.
    pub const ALL: [Self; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Axis the direction travels along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::PosX | Self::NegX => Axis::X,
            Self::PosY | Self::NegY => Axis::Y,
            Self::PosZ | Self::NegZ => Axis::Z,
        }
    }

    /// `1` for positive directions, `-1` for negative ones.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::PosX | Self::PosY | Self::PosZ => 1,
            Self::NegX | Self::NegY | Self::NegZ => -1,
        }
    }

    /// Signed unit vector matching the direction.
    #[must_use]
    pub const fn unit_vector(self) -> GridCoord {
        match self {
            Self::PosX => GridCoord::new(1, 0, 0),
            Self::NegX => GridCoord::new(-1, 0, 0),
            Self::PosY => GridCoord::new(0, 1, 0),
            Self::NegY => GridCoord::new(0, -1, 0),
            Self::PosZ => GridCoord::new(0, 0, 1),
            Self::NegZ => GridCoord::new(0, 0, -1),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }
}

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct GridCoord {
    x: i32,
    y: i32,
    z: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along the x axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Component along the y axis.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Component along the z axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Component along the provided axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy of the coordinate with one component replaced.
    #[must_use]
    pub const fn with(self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => Self::new(value, self.y, self.z),
            Axis::Y => Self::new(self.x, value, self.z),
            Axis::Z => Self::new(self.x, self.y, value),
        }
    }

    /// Coordinate reached by moving `steps` cells in `direction`.
    #[must_use]
    pub const fn offset(self, direction: Direction, steps: i32) -> Self {
        let unit = direction.unit_vector();
        Self::new(
            self.x + unit.x * steps,
            self.y + unit.y * steps,
            self.z + unit.z * steps,
        )
    }
}

impl From<[i32; 3]> for GridCoord {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<GridCoord> for [i32; 3] {
    fn from(coord: GridCoord) -> Self {
        [coord.x, coord.y, coord.z]
    }
}

/// Number of cells a block spans along each axis. Every component is at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 3]", into = "[u32; 3]")]
pub struct GridSize {
    x: u32,
    y: u32,
    z: u32,
}

impl GridSize {
    /// Size of a single cell.
    pub const UNIT: Self = Self::new(1, 1, 1);

    /// Creates a new size, clamping zero components to one.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        const fn at_least_one(value: u32) -> u32 {
            if value == 0 {
                1
            } else {
                value
            }
        }

        Self {
            x: at_least_one(x),
            y: at_least_one(y),
            z: at_least_one(z),
        }
    }

    /// Extent along the x axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Extent along the y axis.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Extent along the z axis.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Extent along the provided axis.
    #[must_use]
    pub const fn along(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Number of cells covered by the size.
    #[must_use]
    pub const fn volume(&self) -> u64 {
        (self.x as u64)
            .saturating_mul(self.y as u64)
            .saturating_mul(self.z as u64)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::UNIT
    }
}

impl From<[u32; 3]> for GridSize {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<GridSize> for [u32; 3] {
    fn from(size: GridSize) -> Self {
        [size.x, size.y, size.z]
    }
}

/// Axis-aligned box of cells `[origin, origin + size)` occupied by a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    origin: GridCoord,
    size: GridSize,
}

impl Footprint {
    /// Constructs a footprint from its minimum corner and size.
    #[must_use]
    pub const fn new(origin: GridCoord, size: GridSize) -> Self {
        Self { origin, size }
    }

    /// Minimum corner of the footprint.
    #[must_use]
    pub const fn origin(&self) -> GridCoord {
        self.origin
    }

    /// Dimensions of the footprint measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// First cell index covered along `axis`.
    #[must_use]
    pub const fn start(&self, axis: Axis) -> i32 {
        self.origin.along(axis)
    }

    /// One past the last cell index covered along `axis`.
    ///
    /// Saturates at `i32::MAX` for footprints reaching past the grid; level
    /// validation rejects those before they reach the world.
    #[must_use]
    pub fn end(&self, axis: Axis) -> i32 {
        let extent = i32::try_from(self.size.along(axis)).unwrap_or(i32::MAX);
        self.origin.along(axis).saturating_add(extent)
    }

    /// Last cell index covered along `axis`, saturating like [`Self::end`].
    #[must_use]
    pub fn last(&self, axis: Axis) -> i32 {
        let extent = i32::try_from(self.size.along(axis) - 1).unwrap_or(i32::MAX);
        self.origin.along(axis).saturating_add(extent)
    }

    /// Reports whether every covered cell lies within `-limit..=limit` on all axes.
    #[must_use]
    pub fn lies_within(&self, limit: i32) -> bool {
        let limit = i64::from(limit);
        [Axis::X, Axis::Y, Axis::Z].into_iter().all(|axis| {
            let start = i64::from(self.origin.along(axis));
            let last = start + i64::from(self.size.along(axis)) - 1;
            start >= -limit && last <= limit
        })
    }

    /// Reports whether the cell lies inside the footprint.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        [Axis::X, Axis::Y, Axis::Z]
            .into_iter()
            .all(|axis| (self.start(axis)..=self.last(axis)).contains(&cell.along(axis)))
    }

    /// Iterates every covered cell, x fastest, then y, then z.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> {
        let (x0, y0, z0) = (self.start(Axis::X), self.start(Axis::Y), self.start(Axis::Z));
        let (x1, y1, z1) = (self.last(Axis::X), self.last(Axis::Y), self.last(Axis::Z));
        (z0..=z1).flat_map(move |z| {
            (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| GridCoord::new(x, y, z)))
        })
    }
}

/// Unique identifier assigned to a block by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    /// Creates a new block identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a level within a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(u32);

impl LevelId {
    /// Level every registry falls back to.
    pub const FIRST: Self = Self(1);

    /// Creates a new level identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the level number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Fixed category of a block that determines its special behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockVariant {
    /// Removable whenever its path is clear.
    #[default]
    Standard,
    /// Releases every locked block when removed.
    Key,
    /// Never removable until a key block has been removed.
    Locked,
}

/// Visual tint attached to a block specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct BlockColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl BlockColor {
    /// Creates a new block color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl From<[u8; 3]> for BlockColor {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl From<BlockColor> for [u8; 3] {
    fn from(color: BlockColor) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// Declarative description of one block inside a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    /// Minimum corner of the block's footprint.
    pub position: GridCoord,
    /// Number of cells spanned along each axis.
    #[serde(default)]
    pub size: GridSize,
    /// Direction the block must travel to be removed.
    pub direction: Direction,
    /// Behavioural category of the block.
    #[serde(default)]
    pub variant: BlockVariant,
    /// Optional tint used by the presentation layer.
    #[serde(default)]
    pub color: Option<BlockColor>,
}

impl BlockSpec {
    /// Creates a block specification without a color.
    #[must_use]
    pub const fn new(
        position: GridCoord,
        size: GridSize,
        direction: Direction,
        variant: BlockVariant,
    ) -> Self {
        Self {
            position,
            size,
            direction,
            variant,
            color: None,
        }
    }

    /// Creates a single-cell standard block.
    #[must_use]
    pub const fn unit(position: GridCoord, direction: Direction) -> Self {
        Self::new(position, GridSize::UNIT, direction, BlockVariant::Standard)
    }

    /// Returns a copy carrying the provided color.
    #[must_use]
    pub const fn with_color(mut self, color: BlockColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Cells occupied by the block.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        Footprint::new(self.position, self.size)
    }
}

/// Optional framing hint handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraHint {
    /// Distance from the structure's centre.
    pub distance: f32,
    /// Initial yaw in radians.
    #[serde(default)]
    pub yaw: f32,
    /// Initial pitch in radians.
    #[serde(default)]
    pub pitch: f32,
}

/// Immutable declarative description of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    id: LevelId,
    #[serde(default)]
    name: Option<String>,
    blocks: Vec<BlockSpec>,
    #[serde(default)]
    camera: Option<CameraHint>,
}

impl LevelData {
    /// Creates a level from its identifier and ordered block specifications.
    #[must_use]
    pub fn new(id: LevelId, blocks: Vec<BlockSpec>) -> Self {
        Self {
            id,
            name: None,
            blocks,
            camera: None,
        }
    }

    /// Returns a copy carrying a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns a copy carrying a camera hint.
    #[must_use]
    pub fn with_camera(mut self, camera: CameraHint) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Identifier of the level.
    #[must_use]
    pub const fn id(&self) -> LevelId {
        self.id
    }

    /// Display name of the level, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Ordered block specifications.
    #[must_use]
    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    /// Presentation hint, if any.
    #[must_use]
    pub const fn camera(&self) -> Option<&CameraHint> {
        self.camera.as_ref()
    }

    /// Checks the authoring invariants the world relies on.
    ///
    /// A level must contain at least one block, every block must fit inside
    /// [`GRID_LIMIT`] and cover at most [`MAX_BLOCK_CELLS`] cells, and no two
    /// footprints may share a cell.
    pub fn validate(&self) -> Result<(), LevelDataError> {
        if self.blocks.is_empty() {
            return Err(LevelDataError::Empty);
        }

        for (index, spec) in self.blocks.iter().enumerate() {
            let footprint = spec.footprint();
            if !footprint.lies_within(GRID_LIMIT) {
                return Err(LevelDataError::OutOfBounds { index });
            }
            let cells = footprint.size().volume();
            if cells > MAX_BLOCK_CELLS {
                return Err(LevelDataError::TooLarge { index, cells });
            }
        }

        let mut owners: HashMap<GridCoord, usize> = HashMap::new();
        for (index, spec) in self.blocks.iter().enumerate() {
            for cell in spec.footprint().cells() {
                if let Some(first) = owners.insert(cell, index) {
                    return Err(LevelDataError::Overlap {
                        first,
                        second: index,
                        cell,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Largest absolute coordinate a level cell may use on any axis.
pub const GRID_LIMIT: i32 = 1 << 16;

/// Largest number of cells a single block may cover.
pub const MAX_BLOCK_CELLS: u64 = 4_096;

/// Reasons level data may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum LevelDataError {
    /// The level contains no blocks.
    #[error("level contains no blocks")]
    Empty,
    /// Two block footprints share a cell.
    #[error("blocks #{first} and #{second} both occupy cell {cell:?}")]
    Overlap {
        /// Index of the first block claiming the cell.
        first: usize,
        /// Index of the second block claiming the cell.
        second: usize,
        /// Cell claimed twice.
        cell: GridCoord,
    },
    /// A block reaches outside the supported grid.
    #[error("block #{index} lies outside the grid limit of {GRID_LIMIT}")]
    OutOfBounds {
        /// Index of the offending block.
        index: usize,
    },
    /// A block covers more cells than any block may.
    #[error("block #{index} covers {cells} cells, more than {MAX_BLOCK_CELLS}")]
    TooLarge {
        /// Index of the offending block.
        index: usize,
        /// Cells the block covers.
        cells: u64,
    },
}

/// Outcome of validating a single block's removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RemovalCheck {
    /// Whether the block may be removed right now.
    pub removable: bool,
    /// Nearest block in the removal path, if any.
    pub blocking_block: Option<BlockId>,
    /// Whether the block is a locked block that has not been released.
    pub locked: bool,
}

impl RemovalCheck {
    /// Converts a failed check into the denial reported to the presentation layer.
    #[must_use]
    pub const fn denial(&self) -> Option<RemovalDenial> {
        if self.removable {
            return None;
        }
        if self.locked {
            return Some(RemovalDenial::Locked {
                blocking: self.blocking_block,
            });
        }
        match self.blocking_block {
            Some(by) => Some(RemovalDenial::Blocked { by }),
            None => None,
        }
    }
}

/// Immutable representation of a single block's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSnapshot {
    /// Unique identifier assigned to the block.
    pub id: BlockId,
    /// Cells occupied by the block.
    pub footprint: Footprint,
    /// Direction the block must travel to be removed.
    pub direction: Direction,
    /// Behavioural category of the block.
    pub variant: BlockVariant,
    /// Whether the block is still locked.
    pub locked: bool,
    /// Cached result of the last validation pass.
    pub removable: bool,
    /// Whether a removal or feedback animation is in flight.
    pub animating: bool,
    /// Optional tint used by the presentation layer.
    pub color: Option<BlockColor>,
}

/// Read-only snapshot describing all blocks within the level.
#[derive(Clone, Debug, Default)]
pub struct BlockView {
    snapshots: Vec<BlockSnapshot>,
}

impl BlockView {
    /// Creates a new block view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BlockSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured block snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single block.
    #[must_use]
    pub fn get(&self, block: BlockId) -> Option<&BlockSnapshot> {
        self.snapshots
            .binary_search_by_key(&block, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of blocks captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BlockSnapshot> {
        self.snapshots
    }
}
