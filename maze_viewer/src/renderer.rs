// renderer.rs - Common renderer capability and the pair of views behind it

use serde::{Deserialize, Serialize};

use crate::animation::{MarkerStyle, PlaybackFrame};
use crate::renderer_2d::Renderer2D;
use crate::renderer_3d::Renderer3D;
use crate::types::{Coordinate, MazeModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Flat,
    Scene,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Flat => ViewMode::Scene,
            ViewMode::Scene => ViewMode::Flat,
        }
    }
}

/// What playback needs from a view
pub trait Renderer: Send {
    fn view(&self) -> ViewMode;

    /// Show a freshly installed maze with no overlays
    fn load(&mut self, model: &MazeModel);

    /// Render a whole frame
    fn draw(&mut self, model: &MazeModel, frame: &PlaybackFrame<'_>);

    /// Add markers for newly revealed cells without redrawing what is already shown
    fn render_incremental(&mut self, coords: &[Coordinate], style: MarkerStyle);

    /// Drop every incremental marker
    fn clear(&mut self);

    fn set_active(&mut self, enabled: bool);

    fn is_active(&self) -> bool;

    /// Whether the solution is revealed point by point rather than in one frame
    fn reveals_incrementally(&self) -> bool {
        false
    }
}

/// Both views plus the single reference to the visible one.
///
/// The flat canvas receives every frame even while hidden, so switching views
/// always shows the current replay state. The scene is built lazily, when it
/// becomes visible.
pub struct Surfaces {
    pub flat: Renderer2D,
    pub scene: Renderer3D,
    active: ViewMode,
}

impl Surfaces {
    pub fn new() -> Self {
        let mut surfaces = Self {
            flat: Renderer2D::new(),
            scene: Renderer3D::new(),
            active: ViewMode::Flat,
        };
        surfaces.flat.set_active(true);
        surfaces.scene.set_active(false);
        surfaces
    }

    pub fn view(&self) -> ViewMode {
        self.active
    }

    pub fn active(&self) -> &dyn Renderer {
        match self.active {
            ViewMode::Flat => &self.flat,
            ViewMode::Scene => &self.scene,
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn Renderer {
        match self.active {
            ViewMode::Flat => &mut self.flat,
            ViewMode::Scene => &mut self.scene,
        }
    }

    /// Make `view` the visible surface; a scene becoming visible is rebuilt for `model`
    pub fn set_view(&mut self, view: ViewMode, model: Option<&MazeModel>) {
        self.active = view;
        self.flat.set_active(view == ViewMode::Flat);
        self.scene.set_active(view == ViewMode::Scene);
        if view == ViewMode::Scene {
            if let Some(model) = model {
                self.scene.load(model);
            }
        }
        log::info!("Active view: {view:?}");
    }

    /// Show a newly installed maze on the flat canvas and, if visible, the scene
    pub fn load(&mut self, model: &MazeModel) {
        self.flat.load(model);
        if self.active == ViewMode::Scene {
            self.scene.load(model);
        }
    }

    /// Send a full frame to every view
    pub fn draw(&mut self, model: &MazeModel, frame: &PlaybackFrame<'_>) {
        self.flat.draw(model, frame);
        self.scene.draw(model, frame);
    }
}

impl Default for Surfaces {
    fn default() -> Self {
        Self::new()
    }
}
