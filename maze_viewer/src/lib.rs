// lib.rs - Library exports for maze-viewer
// Render/animation pipeline for the maze demo: flat and 3D views, timed replays
// and the client for the remote maze service.

pub mod animation;
pub mod config;
pub mod error_handling;
pub mod remote_service;
pub mod renderer;
pub mod renderer_2d;
pub mod renderer_3d;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use animation::{PlaybackController, PlaybackHandle, PlaybackOutcome, PlaybackPhase, PlaybackRequest, PlaybackStyle};
pub use config::ViewerConfig;
pub use error_handling::{Result, ViewerError};
pub use remote_service::{HttpMazeService, MazeService, SolveMethod};
pub use renderer::{Renderer, Surfaces, ViewMode};
pub use renderer_2d::{Renderer2D, CELL_SIZE};
pub use renderer_3d::Renderer3D;
pub use session::{Command, Session};
pub use types::{Coordinate, MazeModel};
