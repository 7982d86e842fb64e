// session.rs - Viewer session: current maze, views, playback and the command table

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::animation::{PlaybackController, PlaybackHandle, PlaybackOutcome, PlaybackRequest, PlaybackStep};
use crate::config::ViewerConfig;
use crate::error_handling::{Result, ViewerError};
use crate::remote_service::{GenerateRequest, MazeService, SolveMethod, SolveRequest, TrainRequest};
use crate::renderer::{Surfaces, ViewMode};
use crate::renderer_2d::Renderer2D;
use crate::types::MazeModel;

/// User actions the front end can issue
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Generate {
        width: u32,
        height: u32,
        algo: Option<String>,
    },
    Solve {
        method: SolveMethod,
    },
    Train {
        episodes: u32,
    },
    /// Click on the flat canvas, in canvas pixels
    ClickCanvas {
        px: f32,
        py: f32,
    },
    MoveStart {
        x: u32,
        y: u32,
    },
    Save {
        path: PathBuf,
    },
    Load {
        path: PathBuf,
    },
    ToggleView,
    CancelPlayback,
}

struct ActivePlayback {
    handle: PlaybackHandle,
    /// Status shown once the replay runs to completion
    done_message: String,
}

/// Everything the viewer knows, owned in one place.
///
/// Failures never escape as panics: every command leaves a status line, and
/// the returned error says what went wrong.
pub struct Session {
    service: Box<dyn MazeService>,
    config: ViewerConfig,
    maze: Option<MazeModel>,
    surfaces: Arc<Mutex<Surfaces>>,
    controller: PlaybackController,
    playback: Option<ActivePlayback>,
    status: String,
}

impl Session {
    pub fn new(service: Box<dyn MazeService>, config: ViewerConfig) -> Self {
        let surfaces = Arc::new(Mutex::new(Surfaces::new()));
        let controller = PlaybackController::new(surfaces.clone())
            .with_reveal_delay(config.solution_reveal_delay);
        Self {
            service,
            config,
            maze: None,
            surfaces,
            controller,
            playback: None,
            status: String::new(),
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn maze(&self) -> Option<&MazeModel> {
        self.maze.as_ref()
    }

    pub fn surfaces(&self) -> Arc<Mutex<Surfaces>> {
        self.surfaces.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.controller.is_playing()
    }

    /// Set callback invoked for every rendered playback step
    pub fn set_step_callback<F>(&mut self, callback: F)
    where
        F: Fn(PlaybackStep) + Send + Sync + 'static,
    {
        self.controller.set_step_callback(callback);
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        log::info!("{}", self.status);
    }

    /// Run one command. The status line is updated whether it succeeds or not.
    pub async fn dispatch(&mut self, command: Command) -> Result<()> {
        log::debug!("Dispatching {command:?}");
        let result = match command {
            Command::Generate { width, height, algo } => self.generate(width, height, algo).await,
            Command::Solve { method } => self.solve(method).await,
            Command::Train { episodes } => self.train(episodes).await,
            Command::ClickCanvas { px, py } => self.click_canvas(px, py).await,
            Command::MoveStart { x, y } => self.move_start(x, y).await,
            Command::Save { path } => self.save(path).await,
            Command::Load { path } => self.load(path).await,
            Command::ToggleView => self.toggle_view().await,
            Command::CancelPlayback => self.cancel_playback().await,
        };
        if let Err(e) = &result {
            log::warn!("Command failed: {e}");
        }
        result
    }

    /// Wait for the running replay, if any, and report how it ended
    pub async fn settle(&mut self) -> Option<PlaybackOutcome> {
        let ActivePlayback { handle, done_message } = self.playback.take()?;
        let outcome = handle.wait().await;
        match outcome {
            PlaybackOutcome::Completed => self.set_status(done_message),
            PlaybackOutcome::Cancelled => self.set_status("Playback cancelled."),
        }
        Some(outcome)
    }

    fn ensure_idle(&mut self) -> Result<()> {
        if self.is_playing() {
            self.set_status("Playback in progress.");
            return Err(ViewerError::PlaybackBusy);
        }
        Ok(())
    }

    /// A maze must be present and its start on a path cell before solving or training
    fn ensure_playable(&mut self) -> Result<()> {
        let checked = match &self.maze {
            None => Err(ViewerError::NoMaze),
            Some(maze) => maze.validate(),
        };
        if let Err(e) = checked {
            self.set_status(match e {
                ViewerError::NoMaze => "Generate or load a maze first.",
                _ => "Move the start onto a path cell first.",
            });
            return Err(e);
        }
        Ok(())
    }

    /// Replace the current maze and repaint the views
    async fn install(&mut self, maze: MazeModel) {
        self.surfaces.lock().await.load(&maze);
        self.maze = Some(maze);
    }

    async fn generate(&mut self, width: u32, height: u32, algo: Option<String>) -> Result<()> {
        self.ensure_idle()?;
        self.set_status("Generating...");

        let maze = match self.service.generate(GenerateRequest { width, height, algo }).await {
            Ok(maze) => maze,
            Err(e) => {
                self.set_status("Error generating maze.");
                return Err(e);
            }
        };
        if let Err(e) = maze.validate_layout() {
            self.set_status("Error generating maze.");
            return Err(e);
        }

        let start_ok = maze.is_path(maze.start());
        self.install(maze).await;
        if start_ok {
            self.set_status("Maze generated. Click to move the start (green).");
        } else {
            self.set_status("Maze generated, but the start is on a wall. Click a path cell.");
        }
        Ok(())
    }

    async fn solve(&mut self, method: SolveMethod) -> Result<()> {
        self.ensure_idle()?;
        self.ensure_playable()?;
        let maze = self.maze.clone().ok_or(ViewerError::NoMaze)?;
        let request = SolveRequest::new(maze, method);
        self.set_status("Solving...");

        let solved = match self.service.solve(request).await {
            Ok(solved) => solved,
            Err(e) => {
                self.set_status("Error solving.");
                return Err(e);
            }
        };
        let request = PlaybackRequest::solver(solved.visited, solved.solution, self.config.step_delay);
        self.start_playback(request, "Finished!".to_string())
    }

    async fn train(&mut self, episodes: u32) -> Result<()> {
        self.ensure_idle()?;
        self.ensure_playable()?;
        self.set_status(format!("Training agent ({episodes} episodes)..."));

        let trained = match self.service.train(TrainRequest { episodes }).await {
            Ok(trained) => trained,
            Err(e) => {
                self.set_status("Error training agent.");
                return Err(e);
            }
        };
        self.set_status("Training complete. Showing the last route...");
        let request = PlaybackRequest::agent(trained.trace, self.config.step_delay);
        self.start_playback(
            request,
            format!("Agent trained for {} episodes.", trained.episodes_run),
        )
    }

    fn start_playback(&mut self, request: PlaybackRequest, done_message: String) -> Result<()> {
        match self.controller.play(self.maze.as_ref(), request) {
            Ok(handle) => {
                self.playback = Some(ActivePlayback { handle, done_message });
                Ok(())
            }
            Err(e) => {
                self.set_status(format!("Cannot start playback: {e}"));
                Err(e)
            }
        }
    }

    async fn click_canvas(&mut self, px: f32, py: f32) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }
        let Some(maze) = &self.maze else {
            return Ok(());
        };
        match Renderer2D::cell_at_pixel(maze, px, py) {
            Some(cell) => self.move_start(cell.x, cell.y).await,
            None => Ok(()),
        }
    }

    async fn move_start(&mut self, x: u32, y: u32) -> Result<()> {
        // The replay works on its own snapshot, but the visible start would drift from it
        self.ensure_idle()?;
        let Some(maze) = self.maze.as_mut() else {
            self.set_status("Generate or load a maze first.");
            return Err(ViewerError::NoMaze);
        };

        match maze.move_start(x, y) {
            Ok(_) => {
                self.surfaces.lock().await.load(maze);
                self.set_status(format!("Start moved to ({x}, {y})."));
                Ok(())
            }
            Err(e @ ViewerError::CellIsWall { .. }) => {
                self.set_status("You can't start on a wall.");
                Err(e)
            }
            Err(e) => {
                self.set_status(format!("({x}, {y}) is outside the maze."));
                Err(e)
            }
        }
    }

    async fn save(&mut self, path: PathBuf) -> Result<()> {
        let Some(maze) = &self.maze else {
            self.set_status("Nothing to save.");
            return Err(ViewerError::NoMaze);
        };
        match maze.save(&path).await {
            Ok(()) => {
                self.set_status(format!("Maze saved to {}.", path.display()));
                Ok(())
            }
            Err(e) => {
                self.set_status("Error saving file.");
                Err(e)
            }
        }
    }

    async fn load(&mut self, path: PathBuf) -> Result<()> {
        let loaded = MazeModel::load(&path)
            .await
            .and_then(|maze| maze.validate_layout().map(|()| maze));
        let maze = match loaded {
            Ok(maze) => maze,
            Err(e) => {
                self.set_status("Error loading file.");
                return Err(e);
            }
        };

        // A replay of the old maze must not keep drawing over the new one
        if let Some(ActivePlayback { handle, .. }) = self.playback.take() {
            handle.cancel();
            handle.wait().await;
        }

        let start_ok = maze.is_path(maze.start());
        self.install(maze).await;
        if start_ok {
            self.set_status("Maze loaded.");
        } else {
            self.set_status("Maze loaded, but the start is on a wall. Click a path cell.");
        }
        Ok(())
    }

    async fn toggle_view(&mut self) -> Result<()> {
        let mut surfaces = self.surfaces.lock().await;
        let view = surfaces.view().toggled();
        surfaces.set_view(view, self.maze.as_ref());
        drop(surfaces);
        self.set_status(match view {
            ViewMode::Flat => "2D view.",
            ViewMode::Scene => "3D view.",
        });
        Ok(())
    }

    async fn cancel_playback(&mut self) -> Result<()> {
        if let Some(active) = &self.playback {
            active.handle.cancel();
        }
        self.settle().await;
        Ok(())
    }
}
