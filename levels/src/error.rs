use std::{io, path::PathBuf};

use block_escape_core::{LevelDataError, LevelId};
use thiserror::Error;

/// Errors produced while loading or exporting level documents.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file could not be read.
    #[error("failed to read level file {}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file extension does not name a supported document format.
    #[error("unsupported level file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// A TOML document could not be parsed.
    #[error("invalid TOML level document")]
    Toml(#[from] toml::de::Error),
    /// A level document could not be rendered as TOML.
    #[error("failed to render TOML level document")]
    TomlRender(#[from] toml::ser::Error),
    /// A JSON document could not be parsed or rendered.
    #[error("invalid JSON level document")]
    Json(#[from] serde_json::Error),
    /// A level breaks the authoring invariants.
    #[error("level {} is invalid", .level.get())]
    Invalid {
        /// Identifier of the offending level.
        level: LevelId,
        /// Violated invariant.
        #[source]
        source: LevelDataError,
    },
    /// Two levels in one document share an identifier.
    #[error("level {} is defined more than once", .0.get())]
    Duplicate(LevelId),
}
