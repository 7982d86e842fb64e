// error_handling.rs - Error taxonomy for the viewer and its remote collaborator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Maze service request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Maze service returned a malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Maze service replied with status {status:?}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ServiceStatus {
        status: String,
        message: Option<String>,
    },

    #[error("Invalid maze data: {reason}")]
    InvalidMaze { reason: String },

    #[error("Cell ({x}, {y}) is a wall")]
    CellIsWall { x: u32, y: u32 },

    #[error("Cell ({x}, {y}) is outside the maze")]
    OutOfBounds { x: u32, y: u32 },

    #[error("Could not parse maze JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image export failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("No maze loaded")]
    NoMaze,

    #[error("A playback is already running")]
    PlaybackBusy,
}

pub type Result<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    pub fn invalid_maze(reason: impl Into<String>) -> Self {
        Self::InvalidMaze {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// True for failures talking to the remote service (transport, decoding or a non-ok status)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::MalformedResponse { .. } | Self::ServiceStatus { .. }
        )
    }
}
