// tests/http_service.rs - HTTP client and session against a local mock maze service

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::Rgba;
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::Filter;

use maze_viewer::remote_service::{GenerateRequest, SolveRequest, TrainRequest};
use maze_viewer::{
    Command, Coordinate, HttpMazeService, MazeModel, MazeService, PlaybackOutcome, Session,
    SolveMethod, ViewerConfig, ViewerError,
};

/// Serve `routes` on an ephemeral local port and return the base URL
macro_rules! spawn_mock {
    ($routes:expr) => {{
        let (addr, server) = warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}")
    }};
}

fn corridor_json() -> Value {
    json!({
        "width": 5,
        "height": 1,
        "grid": [[0, 0, 0, 0, 0]],
        "start": [0, 0],
        "end": [4, 0]
    })
}

fn service(base_url: &str) -> HttpMazeService {
    let config = ViewerConfig::default()
        .with_service_url(base_url)
        .with_request_timeout(Duration::from_secs(5));
    HttpMazeService::new(&config).unwrap()
}

#[tokio::test]
async fn test_generate_sends_dimensions_and_decodes_maze() {
    let seen = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let routes = warp::path!("api" / "generate")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |body: Value| {
            *captured.lock().unwrap() = Some(body);
            warp::reply::json(&json!({"status": "ok", "maze": corridor_json()}))
        });
    let base = spawn_mock!(routes);

    let maze = service(&base)
        .generate(GenerateRequest {
            width: 5,
            height: 1,
            algo: Some("prim".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(maze.width, 5);
    assert_eq!(maze.start(), Coordinate::new(0, 0));
    assert_eq!(maze.end, Coordinate::new(4, 0));
    assert_eq!(
        seen.lock().unwrap().take(),
        Some(json!({"width": 5, "height": 1, "algo": "prim"}))
    );
}

#[tokio::test]
async fn test_error_status_is_reported_even_with_http_error() {
    let routes = warp::path!("api" / "generate").and(warp::post()).map(|| {
        warp::reply::with_status(
            warp::reply::json(&json!({"status": "error", "message": "Width must be odd"})),
            StatusCode::BAD_REQUEST,
        )
    });
    let base = spawn_mock!(routes);

    let err = service(&base)
        .generate(GenerateRequest {
            width: 4,
            height: 4,
            algo: None,
        })
        .await
        .unwrap_err();

    match err {
        ViewerError::ServiceStatus { status, message } => {
            assert_eq!(status, "error");
            assert_eq!(message.as_deref(), Some("Width must be odd"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_solve_preserves_service_order() {
    let seen = Arc::new(Mutex::new(None));
    let captured = seen.clone();
    let routes = warp::path!("api" / "solve")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |body: Value| {
            *captured.lock().unwrap() = Some(body);
            warp::reply::json(&json!({
                "status": "ok",
                "visited": [[0, 0], [2, 0], [1, 0], [3, 0], [4, 0]],
                "solution": [[0, 0], [1, 0], [2, 0], [3, 0], [4, 0]]
            }))
        });
    let base = spawn_mock!(routes);

    let maze: MazeModel = serde_json::from_value(corridor_json()).unwrap();
    let solved = service(&base)
        .solve(SolveRequest::new(maze, SolveMethod::BruteForce))
        .await
        .unwrap();

    let xs: Vec<u32> = solved.visited.iter().map(|c| c.x).collect();
    assert_eq!(xs, vec![0, 2, 1, 3, 4]);
    assert_eq!(solved.solution.len(), 5);

    let body = seen.lock().unwrap().take().unwrap();
    assert_eq!(body["method"], "brute_force");
    assert_eq!(body["start_x"], 0);
    assert_eq!(body["maze"]["grid"], json!([[0, 0, 0, 0, 0]]));
}

#[tokio::test]
async fn test_train_reply() {
    let routes = warp::path!("api" / "train")
        .and(warp::post())
        .and(warp::body::json())
        .map(|body: Value| {
            warp::reply::json(&json!({
                "status": "ok",
                "trace": [[0, 0], [1, 0]],
                "episodes_run": body["episodes"]
            }))
        });
    let base = spawn_mock!(routes);

    let trained = service(&base)
        .train(TrainRequest { episodes: 250 })
        .await
        .unwrap();
    assert_eq!(trained.episodes_run, 250);
    assert_eq!(trained.trace, vec![Coordinate::new(0, 0), Coordinate::new(1, 0)]);
}

#[tokio::test]
async fn test_undecodable_body_is_malformed() {
    let routes = warp::path!("api" / "train")
        .and(warp::post())
        .map(|| warp::reply::with_status("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR));
    let base = spawn_mock!(routes);

    let err = service(&base)
        .train(TrainRequest { episodes: 1 })
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::MalformedResponse { .. }), "{err:?}");
    assert!(err.is_network());
}

#[tokio::test]
async fn test_ok_without_payload_is_malformed() {
    let routes = warp::path!("api" / "generate")
        .and(warp::post())
        .map(|| warp::reply::json(&json!({"status": "ok"})));
    let base = spawn_mock!(routes);

    let err = service(&base)
        .generate(GenerateRequest {
            width: 5,
            height: 5,
            algo: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::MalformedResponse { .. }), "{err:?}");
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    // Bind then drop a listener so the port is known to be closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = service(&format!("http://{addr}"))
        .train(TrainRequest { episodes: 1 })
        .await
        .unwrap_err();
    assert!(matches!(err, ViewerError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn test_session_generate_and_solve_end_to_end() {
    let generate = warp::path!("api" / "generate")
        .and(warp::post())
        .map(|| warp::reply::json(&json!({"status": "ok", "maze": corridor_json()})));
    let solve = warp::path!("api" / "solve").and(warp::post()).map(|| {
        warp::reply::json(&json!({
            "status": "ok",
            "visited": [[0, 0], [1, 0], [2, 0], [3, 0], [4, 0]],
            "solution": [[0, 0], [1, 0], [2, 0], [3, 0], [4, 0]]
        }))
    });
    let base = spawn_mock!(generate.or(solve));

    let config = ViewerConfig::default()
        .with_service_url(base)
        .with_step_delay(Duration::ZERO)
        .with_solution_reveal_delay(Duration::ZERO);
    let service = HttpMazeService::new(&config).unwrap();
    let mut session = Session::new(Box::new(service), config);

    session
        .dispatch(Command::Generate {
            width: 5,
            height: 1,
            algo: None,
        })
        .await
        .unwrap();
    session
        .dispatch(Command::Solve {
            method: SolveMethod::Optimized,
        })
        .await
        .unwrap();
    assert_eq!(session.settle().await, Some(PlaybackOutcome::Completed));
    assert_eq!(session.status(), "Finished!");

    let surfaces = session.surfaces();
    let surfaces = surfaces.lock().await;
    let white = Rgba([255, 255, 255, 255]);
    let middle = surfaces.flat.cell_color(Coordinate::new(2, 0)).unwrap();
    assert_ne!(middle, white);
    assert_eq!(surfaces.flat.cell_color(Coordinate::new(0, 0)), Some(Rgba([0, 255, 0, 255])));
}

#[tokio::test]
async fn test_session_reports_generation_failure() {
    let routes = warp::path!("api" / "generate")
        .and(warp::post())
        .map(|| warp::reply::json(&json!({"status": "error", "message": "busy"})));
    let base = spawn_mock!(routes);

    let config = ViewerConfig::default().with_service_url(base);
    let service = HttpMazeService::new(&config).unwrap();
    let mut session = Session::new(Box::new(service), config);

    let result = session
        .dispatch(Command::Generate {
            width: 5,
            height: 5,
            algo: None,
        })
        .await;
    assert!(matches!(result, Err(ViewerError::ServiceStatus { .. })));
    assert_eq!(session.status(), "Error generating maze.");
    assert!(session.maze().is_none());
}
