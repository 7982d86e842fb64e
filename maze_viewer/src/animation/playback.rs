// animation/playback.rs - Timed, cancelable replay of visited and solution cells

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::{MarkerStyle, PlaybackFrame, PlaybackPhase, PlaybackStyle};
use crate::error_handling::{Result, ViewerError};
use crate::renderer::Surfaces;
use crate::types::{Coordinate, MazeModel};

/// Pause between solution markers in the scene view
pub const SOLUTION_REVEAL_DELAY: Duration = Duration::from_millis(20);

/// What to replay
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    pub visited: Vec<Coordinate>,
    pub solution: Vec<Coordinate>,
    pub delay: Duration,
    pub style: PlaybackStyle,
}

impl PlaybackRequest {
    pub fn solver(visited: Vec<Coordinate>, solution: Vec<Coordinate>, delay: Duration) -> Self {
        Self {
            visited,
            solution,
            delay,
            style: PlaybackStyle::Human,
        }
    }

    /// Agent traces carry no solution; they replay as visited cells only
    pub fn agent(trace: Vec<Coordinate>, delay: Duration) -> Self {
        Self {
            visited: trace,
            solution: Vec::new(),
            delay,
            style: PlaybackStyle::Agent,
        }
    }
}

/// Progress notifications, emitted after the corresponding render call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStep {
    Visited { index: usize, at: Coordinate },
    SolutionFrame { len: usize },
    SolutionMarker { index: usize, at: Coordinate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Cancelled,
}

/// Cancellation token shared between a playback task and its handle
#[derive(Debug, Clone, Default)]
pub struct PlaybackCanceller(Arc<AtomicBool>);

impl PlaybackCanceller {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Handle to one running playback
pub struct PlaybackHandle {
    canceller: PlaybackCanceller,
    phase: watch::Receiver<PlaybackPhase>,
    task: JoinHandle<PlaybackOutcome>,
}

impl PlaybackHandle {
    /// Stop before the next step; nothing is drawn after the current one
    pub fn cancel(&self) {
        self.canceller.cancel();
    }

    pub fn canceller(&self) -> PlaybackCanceller {
        self.canceller.clone()
    }

    pub fn phase(&self) -> PlaybackPhase {
        *self.phase.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn wait(self) -> PlaybackOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Playback task failed: {e}");
                PlaybackOutcome::Cancelled
            }
        }
    }
}

type StepCallback = Arc<dyn Fn(PlaybackStep) + Send + Sync>;

/// Drives replays onto the shared surfaces, one at a time
pub struct PlaybackController {
    surfaces: Arc<Mutex<Surfaces>>,
    phase: Arc<watch::Sender<PlaybackPhase>>,
    reveal_delay: Duration,
    step_callback: Option<StepCallback>,
}

impl PlaybackController {
    pub fn new(surfaces: Arc<Mutex<Surfaces>>) -> Self {
        let (phase, _) = watch::channel(PlaybackPhase::Idle);
        Self {
            surfaces,
            phase: Arc::new(phase),
            reveal_delay: SOLUTION_REVEAL_DELAY,
            step_callback: None,
        }
    }

    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Set callback invoked for every rendered step
    pub fn set_step_callback<F>(&mut self, callback: F)
    where
        F: Fn(PlaybackStep) + Send + Sync + 'static,
    {
        self.step_callback = Some(Arc::new(callback));
    }

    pub fn phase(&self) -> PlaybackPhase {
        *self.phase.borrow()
    }

    pub fn is_playing(&self) -> bool {
        self.phase() != PlaybackPhase::Idle
    }

    /// Subscribe to phase transitions
    pub fn subscribe(&self) -> watch::Receiver<PlaybackPhase> {
        self.phase.subscribe()
    }

    /// Start a replay of `request` over a snapshot of `model`.
    ///
    /// Rejected without side effects when there is no model or another replay
    /// is still running.
    pub fn play(&self, model: Option<&MazeModel>, request: PlaybackRequest) -> Result<PlaybackHandle> {
        let model = model.ok_or(ViewerError::NoMaze)?.clone();
        if self.is_playing() {
            log::debug!("Ignoring play request while a playback is running");
            return Err(ViewerError::PlaybackBusy);
        }

        log::info!(
            "Playback started: {} visited, {} solution, {:?} per step, {:?} style",
            request.visited.len(),
            request.solution.len(),
            request.delay,
            request.style
        );
        self.phase.send_replace(PlaybackPhase::Visited);

        let canceller = PlaybackCanceller::default();
        let run = PlaybackRun {
            surfaces: self.surfaces.clone(),
            phase: self.phase.clone(),
            canceller: canceller.clone(),
            reveal_delay: self.reveal_delay,
            step_callback: self.step_callback.clone(),
        };
        let phase = self.phase.subscribe();
        let task = tokio::spawn(async move {
            let outcome = run.execute(&model, &request).await;
            run.phase.send_replace(PlaybackPhase::Idle);
            log::info!("Playback finished: {outcome:?}");
            outcome
        });

        Ok(PlaybackHandle {
            canceller,
            phase,
            task,
        })
    }
}

/// State moved into a playback task
struct PlaybackRun {
    surfaces: Arc<Mutex<Surfaces>>,
    phase: Arc<watch::Sender<PlaybackPhase>>,
    canceller: PlaybackCanceller,
    reveal_delay: Duration,
    step_callback: Option<StepCallback>,
}

impl PlaybackRun {
    fn notify(&self, step: PlaybackStep) {
        if let Some(callback) = &self.step_callback {
            callback(step);
        }
    }

    async fn execute(&self, model: &MazeModel, request: &PlaybackRequest) -> PlaybackOutcome {
        self.surfaces.lock().await.active_mut().clear();

        let marker = request.style.visited_marker();
        for (index, &at) in request.visited.iter().enumerate() {
            if self.canceller.is_cancelled() {
                return PlaybackOutcome::Cancelled;
            }
            {
                let mut surfaces = self.surfaces.lock().await;
                let frame = PlaybackFrame::new(&request.visited[..=index], &[], request.style);
                surfaces.draw(model, &frame);
                surfaces.active_mut().render_incremental(&[at], marker);
            }
            self.notify(PlaybackStep::Visited { index, at });
            tokio::time::sleep(request.delay).await;
        }

        if request.style == PlaybackStyle::Agent {
            return PlaybackOutcome::Completed;
        }

        if self.canceller.is_cancelled() {
            return PlaybackOutcome::Cancelled;
        }
        self.phase.send_replace(PlaybackPhase::Solution);

        let reveal_in_scene = {
            let mut surfaces = self.surfaces.lock().await;
            let frame = PlaybackFrame::new(&request.visited, &request.solution, PlaybackStyle::Human);
            surfaces.draw(model, &frame);
            surfaces.active().reveals_incrementally()
        };
        self.notify(PlaybackStep::SolutionFrame {
            len: request.solution.len(),
        });

        if reveal_in_scene {
            for (index, &at) in request.solution.iter().enumerate() {
                if self.canceller.is_cancelled() {
                    return PlaybackOutcome::Cancelled;
                }
                self.surfaces
                    .lock()
                    .await
                    .active_mut()
                    .render_incremental(&[at], MarkerStyle::Solution);
                self.notify(PlaybackStep::SolutionMarker { index, at });
                tokio::time::sleep(self.reveal_delay).await;
            }
        }

        PlaybackOutcome::Completed
    }
}
