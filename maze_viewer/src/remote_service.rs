// remote_service.rs - Client side of the maze generation/solving/training service

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error_handling::{Result, ViewerError};
use crate::types::{Coordinate, MazeModel};

// ============= Request/Response Models =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    #[default]
    BruteForce,
    Optimized,
}

impl std::str::FromStr for SolveMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "brute_force" => Ok(SolveMethod::BruteForce),
            "optimized" => Ok(SolveMethod::Optimized),
            other => Err(format!("unknown solve method {other:?} (expected brute_force or optimized)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveRequest {
    pub maze: MazeModel,
    pub method: SolveMethod,
    pub start_x: u32,
    pub start_y: u32,
}

impl SolveRequest {
    /// Solve from the maze's current start
    pub fn new(maze: MazeModel, method: SolveMethod) -> Self {
        let start = maze.start();
        Self {
            maze,
            method,
            start_x: start.x,
            start_y: start.y,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    pub episodes: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateReply {
    status: String,
    message: Option<String>,
    maze: Option<MazeModel>,
}

#[derive(Debug, Deserialize)]
struct SolveReply {
    status: String,
    message: Option<String>,
    visited: Option<Vec<Coordinate>>,
    solution: Option<Vec<Coordinate>>,
}

#[derive(Debug, Deserialize)]
struct TrainReply {
    status: String,
    message: Option<String>,
    trace: Option<Vec<Coordinate>>,
    episodes_run: Option<u32>,
}

/// Exploration order and final path, both in the order the solver produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub visited: Vec<Coordinate>,
    pub solution: Vec<Coordinate>,
}

/// Last training episode's trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainResult {
    pub trace: Vec<Coordinate>,
    pub episodes_run: u32,
}

/// Only `"ok"` counts as success
fn ensure_ok(endpoint: &str, status: String, message: Option<String>) -> Result<()> {
    if status == "ok" {
        Ok(())
    } else {
        log::warn!("{endpoint} replied {status:?}: {}", message.as_deref().unwrap_or("-"));
        Err(ViewerError::ServiceStatus { status, message })
    }
}

fn required<T>(endpoint: &str, field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| ViewerError::malformed(format!("{endpoint} reply has no {field:?}")))
}

// ============= Service Seam =============

/// Remote collaborator that owns generation, solving and agent training
pub trait MazeService: Send + Sync {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<MazeModel>>;

    fn solve(&self, request: SolveRequest) -> BoxFuture<'_, Result<SolveResult>>;

    fn train(&self, request: TrainRequest) -> BoxFuture<'_, Result<TrainResult>>;
}

/// JSON-over-HTTP implementation
#[derive(Debug, Clone)]
pub struct HttpMazeService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMazeService {
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.service_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and decode the JSON reply, whatever the HTTP status.
    /// The service reports failures in the body's `status` field.
    async fn post<Req, Rep>(&self, endpoint: &str, body: &Req) -> Result<Rep>
    where
        Req: Serialize + ?Sized,
        Rep: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        log::debug!("POST {url}");
        let response = self.client.post(&url).json(body).send().await?;
        let http_status = response.status();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            ViewerError::malformed(format!("{endpoint} returned HTTP {http_status} with an undecodable body: {e}"))
        })
    }
}

impl MazeService for HttpMazeService {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'_, Result<MazeModel>> {
        Box::pin(async move {
            const ENDPOINT: &str = "/api/generate";
            let reply: GenerateReply = self.post(ENDPOINT, &request).await?;
            ensure_ok(ENDPOINT, reply.status, reply.message)?;
            required(ENDPOINT, "maze", reply.maze)
        })
    }

    fn solve(&self, request: SolveRequest) -> BoxFuture<'_, Result<SolveResult>> {
        Box::pin(async move {
            const ENDPOINT: &str = "/api/solve";
            let reply: SolveReply = self.post(ENDPOINT, &request).await?;
            ensure_ok(ENDPOINT, reply.status, reply.message)?;
            Ok(SolveResult {
                visited: required(ENDPOINT, "visited", reply.visited)?,
                solution: required(ENDPOINT, "solution", reply.solution)?,
            })
        })
    }

    fn train(&self, request: TrainRequest) -> BoxFuture<'_, Result<TrainResult>> {
        Box::pin(async move {
            const ENDPOINT: &str = "/api/train";
            let reply: TrainReply = self.post(ENDPOINT, &request).await?;
            ensure_ok(ENDPOINT, reply.status, reply.message)?;
            Ok(TrainResult {
                trace: required(ENDPOINT, "trace", reply.trace)?,
                episodes_run: required(ENDPOINT, "episodes_run", reply.episodes_run)?,
            })
        })
    }
}
