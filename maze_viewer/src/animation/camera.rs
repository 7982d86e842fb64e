// animation/camera.rs - First-person camera for walking through the 3D maze

use std::f32::consts::FRAC_PI_2;
use std::time::Duration;

use serde::Serialize;

use super::Vec3;

/// Eye height above the floor, matches the wall mid-height
pub const EYE_HEIGHT: f32 = 1.0;

const DAMPING: f32 = 10.0;
const ACCELERATION: f32 = 40.0;
const LOOK_SENSITIVITY: f32 = 0.002;

/// Movement keys understood by the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveKey {
    /// Map a DOM-style key code (`KeyW`, `ArrowUp`, ...) to a movement key
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "KeyW" => Some(MoveKey::Forward),
            "ArrowDown" | "KeyS" => Some(MoveKey::Backward),
            "ArrowLeft" | "KeyA" => Some(MoveKey::Left),
            "ArrowRight" | "KeyD" => Some(MoveKey::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl HeldKeys {
    fn set(&mut self, key: MoveKey, held: bool) {
        match key {
            MoveKey::Forward => self.forward = held,
            MoveKey::Backward => self.backward = held,
            MoveKey::Left => self.left = held,
            MoveKey::Right => self.right = held,
        }
    }
}

/// Free camera with damped keyboard movement and mouse look.
///
/// No collision against walls; the camera is a viewing aid only.
#[derive(Debug, Clone, Serialize)]
pub struct FirstPersonCamera {
    position: Vec3,
    /// Rotation about the vertical axis, radians
    yaw: f32,
    /// Rotation about the camera's horizontal axis, clamped to +-pi/2
    pitch: f32,
    #[serde(skip)]
    velocity: Vec3,
    #[serde(skip)]
    keys: HeldKeys,
}

impl FirstPersonCamera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            velocity: Vec3::zero(),
            keys: HeldKeys::default(),
        }
    }

    /// Teleport to `position` facing the default direction, at rest
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.velocity = Vec3::zero();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> (f32, f32) {
        (self.pitch, self.yaw)
    }

    pub fn key_down(&mut self, key: MoveKey) {
        self.keys.set(key, true);
    }

    pub fn key_up(&mut self, key: MoveKey) {
        self.keys.set(key, false);
    }

    pub fn release_keys(&mut self) {
        self.keys = HeldKeys::default();
    }

    /// Apply a mouse movement delta in pixels
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * LOOK_SENSITIVITY;
        self.pitch = (self.pitch - dy * LOOK_SENSITIVITY).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Advance the camera by `dt`
    pub fn update(&mut self, dt: Duration) {
        let dt = dt.as_secs_f32();

        self.velocity = self.velocity - self.velocity * (DAMPING * dt).min(1.0);

        let direction = Vec3::new(
            (self.keys.right as i8 - self.keys.left as i8) as f32,
            0.0,
            (self.keys.forward as i8 - self.keys.backward as i8) as f32,
        )
        .normalize();

        if self.keys.forward || self.keys.backward {
            self.velocity.z += direction.z * ACCELERATION * dt;
        }
        if self.keys.left || self.keys.right {
            self.velocity.x += direction.x * ACCELERATION * dt;
        }

        // Local frame: forward looks down -z at yaw 0
        let (sin, cos) = self.yaw.sin_cos();
        let forward = Vec3::new(-sin, 0.0, -cos);
        let right = Vec3::new(cos, 0.0, -sin);
        self.position = self.position + (forward * self.velocity.z + right * self.velocity.x) * dt;
    }
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self::new()
    }
}
