pub(crate) mod bootstrap;
pub(crate) mod input_tape;
pub(crate) mod loop_runner;
pub(crate) mod scripts;

use fregg_engine::{LevelPackError, SessionError};
use thiserror::Error;

use input_tape::InputTapeError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Config {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to load level pack: {0}")]
    LevelPack(#[from] LevelPackError),
    #[error("failed to load input tape: {0}")]
    InputTape(#[from] InputTapeError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
