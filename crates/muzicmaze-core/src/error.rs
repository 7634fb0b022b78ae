use thiserror::Error;

#[derive(Error, Debug)]
pub enum MazeError {
    /// A geometric invariant of the maze was broken. There is no recovery.
    #[error("Geometry invariant violated: {0}")]
    Geometry(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Bootstrap failed: no bridge track for seeds {seed1} and {seed2}")]
    BootstrapFailed { seed1: String, seed2: String },
}

pub type Result<T> = std::result::Result<T, MazeError>;
