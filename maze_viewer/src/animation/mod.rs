// animation/mod.rs - Playback sequencing and camera motion for the maze views

pub mod camera;
pub mod playback;

pub use camera::*;
pub use playback::*;

use serde::{Deserialize, Serialize};

use crate::types::Coordinate;

// ============================================================================
// PLAYBACK STATE
// ============================================================================

/// Playback state machine: `Idle -> Visited -> Solution -> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Visited,
    Solution,
}

/// Whose trace is being replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStyle {
    /// Solver exploration followed by the solution path
    Human,
    /// Agent trace, shown as a visited-only replay
    Agent,
}

impl PlaybackStyle {
    /// Marker style for cells revealed during the visited phase
    pub fn visited_marker(self) -> MarkerStyle {
        match self {
            PlaybackStyle::Human => MarkerStyle::Visited,
            PlaybackStyle::Agent => MarkerStyle::Agent,
        }
    }
}

/// Style of an incremental path marker in the 3D scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    Visited,
    Agent,
    Solution,
}

/// One instant of a replay: the revealed prefixes plus the visual style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackFrame<'a> {
    pub visited: &'a [Coordinate],
    pub solution: &'a [Coordinate],
    pub style: PlaybackStyle,
}

impl<'a> PlaybackFrame<'a> {
    pub fn new(visited: &'a [Coordinate], solution: &'a [Coordinate], style: PlaybackStyle) -> Self {
        Self {
            visited,
            solution,
            style,
        }
    }

    /// Bare maze, no overlays
    pub fn empty() -> Self {
        Self::new(&[], &[], PlaybackStyle::Human)
    }
}

// ============================================================================
// CORE MATH TYPES
// ============================================================================

/// 3D vector for scene placement and camera motion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn normalize(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > 1e-20 {
            self * (1.0 / len_sq.sqrt())
        } else {
            Vec3::zero()
        }
    }

    /// Center of a grid cell at the given height (grid y maps to scene z)
    #[inline]
    pub fn cell_center(c: Coordinate, height: f32) -> Vec3 {
        Vec3::new(c.x as f32 + 0.5, height, c.y as f32 + 0.5)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, scalar: f32) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Vec3::new(arr[0], arr[1], arr[2])
    }
}
