#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level catalogue, file loading, world-space layout and level generation.

mod builtin;
mod error;
pub mod generator;
pub mod parser;
pub mod registry;
pub mod solver;

pub use self::{
    error::LevelError,
    generator::{generate, GeneratorConfig},
    parser::{BlockPlacement, LevelParser, ParsedLevel, ParserConfig},
    registry::LevelRegistry,
    solver::{solve, Solution},
};
