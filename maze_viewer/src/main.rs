// main.rs - Headless maze viewer: drives a session against the maze service and
// exports the final flat frame (PNG) and scene (JSON).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Duration;

use maze_viewer::animation::PlaybackStep;
use maze_viewer::config::DEFAULT_SERVICE_URL;
use maze_viewer::{Command, Coordinate, HttpMazeService, Session, SolveMethod, ViewerConfig};

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Base URL of the maze service
    #[arg(long, env = "MAZE_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    pub service_url: String,

    /// Load this maze JSON instead of generating one
    #[arg(short, long)]
    pub maze: Option<PathBuf>,

    /// Width of a generated maze
    #[arg(short = 'W', long, default_value = "21")]
    pub width: u32,

    /// Height of a generated maze
    #[arg(short = 'H', long, default_value = "21")]
    pub height: u32,

    /// Generator algorithm name passed to the service
    #[arg(long)]
    pub algo: Option<String>,

    /// Move the start to X,Y before solving
    #[arg(long, value_parser = parse_coordinate)]
    pub start: Option<Coordinate>,

    /// Solve with the given method (brute_force or optimized)
    #[arg(long)]
    pub solve: Option<SolveMethod>,

    /// Train the agent for this many episodes and replay its last route
    #[arg(long)]
    pub train: Option<u32>,

    /// Delay after each revealed cell, in milliseconds
    #[arg(long, env = "MAZE_STEP_DELAY_MS", default_value = "0")]
    pub delay_ms: u64,

    /// Play back in the 3D scene instead of the flat canvas
    #[arg(long)]
    pub view_3d: bool,

    /// Output image path for the final flat frame
    #[arg(short, long, default_value = "maze.png")]
    pub output: PathBuf,

    /// Write the 3D scene description as JSON
    #[arg(long)]
    pub scene_output: Option<PathBuf>,

    /// Save the maze JSON after the run
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "MAZE_SERVICE_TIMEOUT", default_value = "10")]
    pub timeout_secs: u64,
}

fn parse_coordinate(s: &str) -> std::result::Result<Coordinate, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("{v:?}: {e}"));
    Ok(Coordinate::new(parse(x)?, parse(y)?))
}

impl Args {
    fn config(&self) -> ViewerConfig {
        ViewerConfig::default()
            .with_service_url(self.service_url.clone())
            .with_step_delay(Duration::from_millis(self.delay_ms))
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
    }

    /// The run as a sequence of session commands
    fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        commands.push(match &self.maze {
            Some(path) => Command::Load { path: path.clone() },
            None => Command::Generate {
                width: self.width,
                height: self.height,
                algo: self.algo.clone(),
            },
        });
        if let Some(start) = self.start {
            commands.push(Command::MoveStart {
                x: start.x,
                y: start.y,
            });
        }
        if self.view_3d {
            commands.push(Command::ToggleView);
        }
        if let Some(episodes) = self.train {
            commands.push(Command::Train { episodes });
        }
        if let Some(method) = self.solve {
            commands.push(Command::Solve { method });
        }
        if let Some(path) = &self.save {
            commands.push(Command::Save { path: path.clone() });
        }
        commands
    }
}

async fn export(session: &Session, args: &Args) -> Result<()> {
    let surfaces = session.surfaces();
    let surfaces = surfaces.lock().await;

    surfaces
        .flat
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Flat frame saved to {}", args.output.display());

    if let Some(path) = &args.scene_output {
        let json = serde_json::to_string_pretty(&surfaces.scene.snapshot())
            .context("Failed to serialize scene")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Scene saved to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("Starting with {args:?}");

    let config = args.config();
    let service = HttpMazeService::new(&config).context("Failed to build HTTP client")?;
    let mut session = Session::new(Box::new(service), config);
    session.set_step_callback(|step| match step {
        PlaybackStep::Visited { index, at } => debug!("visited #{index} {at}"),
        PlaybackStep::SolutionFrame { len } => debug!("solution frame, {len} cells"),
        PlaybackStep::SolutionMarker { index, at } => debug!("solution marker #{index} {at}"),
    });

    for command in args.commands() {
        let label = format!("{command:?}");
        if let Err(e) = session.dispatch(command).await {
            return Err(anyhow::Error::new(e).context(format!("{label}: {}", session.status())));
        }
        if let Some(outcome) = session.settle().await {
            info!("Playback {outcome:?}");
        }
    }

    if session.maze().is_none() {
        return Err(anyhow!("No maze to export"));
    }
    export(&session, &args).await?;
    info!("{}", session.status());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("3,4"), Ok(Coordinate::new(3, 4)));
        assert_eq!(parse_coordinate(" 1 , 2 "), Ok(Coordinate::new(1, 2)));
        assert!(parse_coordinate("3").is_err());
        assert!(parse_coordinate("a,1").is_err());
    }

    #[test]
    fn test_command_order() {
        let args = Args::parse_from([
            "maze-viewer",
            "--view-3d",
            "--start",
            "1,1",
            "--solve",
            "optimized",
            "--save",
            "out.json",
        ]);
        let commands = args.commands();
        assert!(matches!(commands[0], Command::Generate { width: 21, height: 21, .. }));
        assert_eq!(commands[1], Command::MoveStart { x: 1, y: 1 });
        assert_eq!(commands[2], Command::ToggleView);
        assert_eq!(commands[3], Command::Solve { method: SolveMethod::Optimized });
        assert_eq!(commands[4], Command::Save { path: PathBuf::from("out.json") });
    }
}
