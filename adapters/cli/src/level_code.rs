use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use block_escape_core::{LevelData, LevelDataError};
use thiserror::Error;

const CODE_DOMAIN: &str = "blocks";
const CODE_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Encodes a level as a single-line share code: `blocks:v1:<count>:<payload>`.
pub(crate) fn encode(level: &LevelData) -> Result<String, LevelCodeError> {
    let json = serde_json::to_vec(level).map_err(LevelCodeError::InvalidPayload)?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    Ok(format!(
        "{CODE_DOMAIN}:{CODE_VERSION}:{}:{payload}",
        level.blocks().len()
    ))
}

/// Decodes and validates a share code produced by [`encode`].
pub(crate) fn decode(value: &str) -> Result<LevelData, LevelCodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LevelCodeError::Empty);
    }

    let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
    let domain = parts.next().ok_or(LevelCodeError::MissingField("domain"))?;
    let version = parts.next().ok_or(LevelCodeError::MissingField("version"))?;
    let count = parts.next().ok_or(LevelCodeError::MissingField("block count"))?;
    let payload = parts.next().ok_or(LevelCodeError::MissingField("payload"))?;

    if domain != CODE_DOMAIN {
        return Err(LevelCodeError::InvalidDomain(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(LevelCodeError::UnsupportedVersion(version.to_owned()));
    }
    let count: usize = count
        .parse()
        .map_err(|_| LevelCodeError::InvalidCount(count.to_owned()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.as_bytes())
        .map_err(LevelCodeError::InvalidEncoding)?;
    let level: LevelData = serde_json::from_slice(&bytes).map_err(LevelCodeError::InvalidPayload)?;

    if level.blocks().len() != count {
        return Err(LevelCodeError::CountMismatch {
            declared: count,
            actual: level.blocks().len(),
        });
    }
    level.validate().map_err(LevelCodeError::InvalidLevel)?;
    Ok(level)
}

/// Errors that can occur while decoding level share codes.
#[derive(Debug, Error)]
pub(crate) enum LevelCodeError {
    /// The code was empty or whitespace.
    #[error("level code was empty")]
    Empty,
    /// A `:`-separated field is missing.
    #[error("level code is missing the {0}")]
    MissingField(&'static str),
    /// The code does not start with the expected domain.
    #[error("level code prefix '{0}' is not supported")]
    InvalidDomain(String),
    /// The code uses an unknown version.
    #[error("level code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The block count field is not a number.
    #[error("could not parse block count '{0}'")]
    InvalidCount(String),
    /// The declared block count disagrees with the payload.
    #[error("level code declares {declared} blocks but carries {actual}")]
    CountMismatch { declared: usize, actual: usize },
    /// The payload is not valid base64.
    #[error("could not decode level code")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload is not a level document.
    #[error("could not parse level code payload")]
    InvalidPayload(#[source] serde_json::Error),
    /// The decoded level breaks the authoring invariants.
    #[error("level code describes an invalid level")]
    InvalidLevel(#[source] LevelDataError),
}
