//! Error types.
//!
//! [`SceneError`] is the only failure the scene manager itself can raise.
//! Everything the windowed shell can fail with is collected in [`AppError`].

use thiserror::Error;

/// Errors raised by the scene manager and its frame buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A scene name was requested that was never registered.
    #[error("scene '{0}' not found")]
    UnknownScene(String),

    /// A frame buffer could not be allocated with the given size.
    #[error("cannot allocate a {width}x{height} frame buffer")]
    Surface { width: u32, height: u32 },
}

/// Errors raised when building a transition.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TransitionError {
    /// Durations must be finite and strictly positive.
    #[error("invalid transition duration {0}s (must be finite and > 0)")]
    InvalidDuration(f32),
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Font loading errors.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("failed to read font file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse font: {0}")]
    Parse(&'static str),
}

/// Top-level error returned by [`run`](crate::run).
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// Adapter, device or surface setup failed.
    #[error("GPU error: {0}")]
    Gpu(String),
}
