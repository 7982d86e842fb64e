// renderer_3d.rs - Scene renderer: floor, instanced walls, lights and live path markers

use serde::Serialize;
use std::time::Duration;

use crate::animation::{FirstPersonCamera, MarkerStyle, MoveKey, PlaybackFrame, Vec3, EYE_HEIGHT};
use crate::renderer::{Renderer, ViewMode};
use crate::types::{Coordinate, MazeModel};

const BACKGROUND: u32 = 0x1a1a1a;
const WALL_COLOR: u32 = 0x4caf50;
const FLOOR_COLOR: u32 = 0x333333;
const WALL_SIZE: Vec3 = Vec3::new(1.0, 2.0, 1.0);
const MARKER_SIZE: f32 = 0.8;

impl MarkerStyle {
    pub fn color(self) -> u32 {
        match self {
            MarkerStyle::Visited => 0x00c8c8,
            MarkerStyle::Agent => 0x9c27b0,
            MarkerStyle::Solution => 0xffff00,
        }
    }

    /// Solution markers sit above exploration markers so they stay visible
    fn elevation(self) -> f32 {
        match self {
            MarkerStyle::Visited | MarkerStyle::Agent => 0.02,
            MarkerStyle::Solution => 0.04,
        }
    }
}

/// Everything the scene graph can hold
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneObject {
    AmbientLight {
        color: u32,
        intensity: f32,
    },
    DirectionalLight {
        color: u32,
        intensity: f32,
        position: Vec3,
    },
    Floor {
        width: f32,
        depth: f32,
        position: Vec3,
        color: u32,
    },
    /// One instanced mesh holding every wall box
    Walls {
        size: Vec3,
        color: u32,
        instances: Vec<Vec3>,
    },
    PathMarker {
        position: Vec3,
        size: f32,
        style: MarkerStyle,
        color: u32,
    },
}

impl SceneObject {
    fn is_marker(&self) -> bool {
        matches!(self, SceneObject::PathMarker { .. })
    }
}

/// Serializable view of the scene, used for export
#[derive(Debug, Clone, Serialize)]
pub struct SceneSnapshot<'a> {
    pub background: u32,
    pub active: bool,
    pub camera: &'a FirstPersonCamera,
    pub objects: &'a [SceneObject],
}

/// Keeps a scene graph equivalent to the flat view. Markers are appended during
/// playback; the base geometry only changes through `init`.
pub struct Renderer3D {
    objects: Vec<SceneObject>,
    camera: FirstPersonCamera,
    active: bool,
    pointer_locked: bool,
}

impl Renderer3D {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            camera: FirstPersonCamera::new(),
            active: false,
            pointer_locked: false,
        }
    }

    /// Tear down the current scene and rebuild it for `model`
    pub fn init(&mut self, model: &MazeModel) {
        self.objects.clear();

        self.objects.push(SceneObject::AmbientLight {
            color: 0xffffff,
            intensity: 0.6,
        });
        self.objects.push(SceneObject::DirectionalLight {
            color: 0xffffff,
            intensity: 0.8,
            position: Vec3::new(10.0, 20.0, 10.0),
        });

        let (width, depth) = (model.width as f32, model.height as f32);
        self.objects.push(SceneObject::Floor {
            width,
            depth,
            position: Vec3::new(width / 2.0, 0.0, depth / 2.0),
            color: FLOOR_COLOR,
        });

        let instances: Vec<Vec3> = model
            .walls()
            .map(|c| Vec3::cell_center(c, WALL_SIZE.y / 2.0))
            .collect();
        log::debug!(
            "Scene rebuilt: {}x{} floor, {} wall instances",
            model.width,
            model.height,
            instances.len()
        );
        self.objects.push(SceneObject::Walls {
            size: WALL_SIZE,
            color: WALL_COLOR,
            instances,
        });

        self.camera.place(Vec3::cell_center(model.start(), EYE_HEIGHT));
    }

    /// Append one marker per coordinate; cost is proportional to `coords` only
    pub fn render_incremental_path(&mut self, coords: &[Coordinate], style: MarkerStyle) {
        self.objects.extend(coords.iter().map(|&c| SceneObject::PathMarker {
            position: Vec3::cell_center(c, style.elevation()),
            size: MARKER_SIZE,
            style,
            color: style.color(),
        }));
    }

    /// Remove every path marker, keeping floor, walls and lights
    pub fn clear_paths(&mut self) {
        self.objects.retain(|object| !object.is_marker());
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn wall_instance_count(&self) -> usize {
        self.objects
            .iter()
            .map(|object| match object {
                SceneObject::Walls { instances, .. } => instances.len(),
                _ => 0,
            })
            .sum()
    }

    /// Markers in insertion order
    pub fn markers(&self) -> impl Iterator<Item = (Vec3, MarkerStyle)> + '_ {
        self.objects.iter().filter_map(|object| match object {
            SceneObject::PathMarker { position, style, .. } => Some((*position, *style)),
            _ => None,
        })
    }

    pub fn marker_count(&self) -> usize {
        self.objects.iter().filter(|object| object.is_marker()).count()
    }

    pub fn camera(&self) -> &FirstPersonCamera {
        &self.camera
    }

    pub fn snapshot(&self) -> SceneSnapshot<'_> {
        SceneSnapshot {
            background: BACKGROUND,
            active: self.active,
            camera: &self.camera,
            objects: &self.objects,
        }
    }

    // ------------------------------------------------------------------------
    // Input, independent of playback
    // ------------------------------------------------------------------------

    /// Grab the pointer for mouse look; only possible while the scene is visible
    pub fn request_pointer_lock(&mut self) -> bool {
        self.pointer_locked = self.active;
        self.pointer_locked
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn key_down(&mut self, code: &str) {
        if let Some(key) = MoveKey::from_code(code) {
            self.camera.key_down(key);
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = MoveKey::from_code(code) {
            self.camera.key_up(key);
        }
    }

    pub fn mouse_move(&mut self, dx: f32, dy: f32) {
        if self.pointer_locked {
            self.camera.look(dx, dy);
        }
    }

    /// Per-frame camera tick; a hidden scene does not move
    pub fn update(&mut self, dt: Duration) {
        if self.active {
            self.camera.update(dt);
        }
    }
}

impl Default for Renderer3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Renderer3D {
    fn view(&self) -> ViewMode {
        ViewMode::Scene
    }

    fn load(&mut self, model: &MazeModel) {
        self.init(model);
    }

    // The scene follows playback through incremental markers only
    fn draw(&mut self, _model: &MazeModel, _frame: &PlaybackFrame<'_>) {}

    fn render_incremental(&mut self, coords: &[Coordinate], style: MarkerStyle) {
        self.render_incremental_path(coords, style);
    }

    fn clear(&mut self) {
        self.clear_paths();
    }

    fn set_active(&mut self, enabled: bool) {
        self.active = enabled;
        if !enabled {
            self.pointer_locked = false;
            self.camera.release_keys();
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn reveals_incrementally(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maze(grid: Vec<Vec<u8>>, start: (u32, u32)) -> MazeModel {
        let end = Coordinate::new(grid[0].len() as u32 - 1, grid.len() as u32 - 1);
        MazeModel::new(grid, start.into(), end)
    }

    #[test]
    fn test_init_builds_base_scene() {
        let model = maze(vec![vec![0, 1, 0], vec![1, 1, 0]], (0, 0));
        let mut renderer = Renderer3D::new();
        renderer.init(&model);

        assert_eq!(renderer.wall_instance_count(), 3);
        assert_eq!(renderer.objects().len(), 4);
        assert!(renderer.objects().contains(&SceneObject::Floor {
            width: 3.0,
            depth: 2.0,
            position: Vec3::new(1.5, 0.0, 1.0),
            color: FLOOR_COLOR,
        }));
        match &renderer.objects()[3] {
            SceneObject::Walls { instances, .. } => {
                assert_eq!(instances[0], Vec3::new(1.5, 1.0, 0.5));
            }
            other => panic!("expected walls, got {other:?}"),
        }
        assert_eq!(renderer.camera().position(), Vec3::new(0.5, EYE_HEIGHT, 0.5));
    }

    #[test]
    fn test_init_is_idempotent() {
        let big = maze(vec![vec![1; 6]; 6], (0, 0));
        let small = maze(vec![vec![0, 1], vec![0, 0]], (0, 0));
        let mut renderer = Renderer3D::new();

        renderer.init(&big);
        renderer.render_incremental_path(&[Coordinate::new(0, 0)], MarkerStyle::Visited);
        renderer.init(&small);
        renderer.init(&small);

        assert_eq!(renderer.wall_instance_count(), 1);
        assert_eq!(renderer.marker_count(), 0);
        assert_eq!(renderer.objects().len(), 4);
    }

    #[test]
    fn test_markers_append_and_clear() {
        let model = maze(vec![vec![0, 0, 0]], (0, 0));
        let mut renderer = Renderer3D::new();
        renderer.init(&model);
        let base = renderer.objects().to_vec();

        renderer.render_incremental_path(&[Coordinate::new(0, 0)], MarkerStyle::Visited);
        renderer.render_incremental_path(
            &[Coordinate::new(1, 0), Coordinate::new(2, 0)],
            MarkerStyle::Solution,
        );
        let styles: Vec<_> = renderer.markers().map(|(_, style)| style).collect();
        assert_eq!(
            styles,
            vec![MarkerStyle::Visited, MarkerStyle::Solution, MarkerStyle::Solution]
        );

        renderer.clear_paths();
        assert_eq!(renderer.objects(), base.as_slice());
    }

    #[test]
    fn test_set_active_keeps_scene_and_releases_pointer() {
        let model = maze(vec![vec![0, 1, 0]], (0, 0));
        let mut renderer = Renderer3D::new();
        renderer.init(&model);

        assert!(!renderer.request_pointer_lock());
        renderer.set_active(true);
        assert!(renderer.request_pointer_lock());
        let before = renderer.objects().to_vec();

        renderer.set_active(false);
        assert!(!renderer.is_pointer_locked());
        assert_eq!(renderer.objects(), before.as_slice());
    }

    #[test]
    fn test_hidden_scene_ignores_camera_input() {
        let model = maze(vec![vec![0, 0, 0]], (0, 0));
        let mut renderer = Renderer3D::new();
        renderer.init(&model);
        renderer.key_down("KeyW");
        renderer.update(Duration::from_millis(100));
        assert_eq!(renderer.camera().position(), Vec3::new(0.5, EYE_HEIGHT, 0.5));

        renderer.set_active(true);
        renderer.key_down("KeyW");
        renderer.update(Duration::from_millis(100));
        assert!(renderer.camera().position().z < 0.5);
    }

    #[test]
    fn test_mouse_look_needs_pointer_lock() {
        let model = maze(vec![vec![0, 0, 0]], (0, 0));
        let mut renderer = Renderer3D::new();
        renderer.init(&model);
        renderer.set_active(true);

        renderer.mouse_move(100.0, 0.0);
        assert_eq!(renderer.camera().rotation(), (0.0, 0.0));

        assert!(renderer.request_pointer_lock());
        renderer.mouse_move(100.0, 0.0);
        assert!(renderer.camera().rotation().1 < 0.0);

        renderer.set_active(false);
        let (_, yaw) = renderer.camera().rotation();
        renderer.mouse_move(100.0, 0.0);
        assert_eq!(renderer.camera().rotation().1, yaw);
    }

    #[test]
    fn test_snapshot_serializes() {
        let model = maze(vec![vec![0, 1]], (0, 0));
        let mut renderer = Renderer3D::new();
        renderer.init(&model);
        renderer.render_incremental_path(&[Coordinate::new(0, 0)], MarkerStyle::Agent);

        let json = serde_json::to_value(renderer.snapshot()).unwrap();
        assert_eq!(json["objects"][0]["kind"], "ambient_light");
        assert_eq!(json["objects"][4]["kind"], "path_marker");
        assert_eq!(json["objects"][4]["style"], "agent");
    }
}
