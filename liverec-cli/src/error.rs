use recorder_core::SessionError;
use thiserror::Error;

use crate::engine::EngineError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("session setup failed: {0}")]
    Session(#[from] SessionError),

    #[error("engine setup failed: {0}")]
    Engine(#[from] EngineError),

    #[error("stream error: {0}")]
    Stream(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
