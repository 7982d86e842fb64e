// renderer_2d.rs - Flat canvas renderer: grid, overlays and start/end markers

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;

use crate::animation::{MarkerStyle, PlaybackFrame, PlaybackStyle};
use crate::error_handling::Result;
use crate::renderer::{Renderer, ViewMode};
use crate::types::{Coordinate, MazeModel, WALL};

/// Edge length of one grid cell in canvas pixels
pub const CELL_SIZE: u32 = 20;

/// A canvas fill: opaque colors replace pixels, translucent ones composite over them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub rgb: [u8; 3],
    pub alpha: f32,
}

impl Fill {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self {
            rgb: [r, g, b],
            alpha: 1.0,
        }
    }

    pub const fn translucent(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self {
            rgb: [r, g, b],
            alpha,
        }
    }

    /// Source-over compositing onto an opaque pixel
    pub fn over(self, dst: Rgba<u8>) -> Rgba<u8> {
        let a = self.alpha.clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        Rgba([
            mix(self.rgb[0], dst[0]),
            mix(self.rgb[1], dst[1]),
            mix(self.rgb[2], dst[2]),
            255,
        ])
    }
}

// Fixed colors per semantic role
pub const WALL_FILL: Fill = Fill::opaque(0x33, 0x33, 0x33);
pub const PATH_FILL: Fill = Fill::opaque(0xff, 0xff, 0xff);
pub const VISITED_FILL: Fill = Fill::translucent(0, 200, 200, 0.5);
pub const AGENT_FILL: Fill = Fill::translucent(156, 39, 176, 0.6);
pub const SOLUTION_FILL: Fill = Fill::translucent(255, 255, 0, 0.7);
pub const START_FILL: Fill = Fill::opaque(0x00, 0xff, 0x00);
pub const END_FILL: Fill = Fill::opaque(0xff, 0x00, 0x00);

/// Paints whole frames onto an RGBA canvas. Keeps nothing but the canvas between draws.
pub struct Renderer2D {
    canvas: RgbaImage,
    active: bool,
}

impl Renderer2D {
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            active: true,
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Canvas size in pixels for a maze
    pub fn canvas_size(model: &MazeModel) -> (u32, u32) {
        (model.width * CELL_SIZE, model.height * CELL_SIZE)
    }

    /// Paint one frame. Layering, later on top: grid, visited, solution, start, end.
    pub fn draw_frame(
        &mut self,
        model: &MazeModel,
        visited: &[Coordinate],
        solution: &[Coordinate],
        style: PlaybackStyle,
    ) {
        let (width, height) = Self::canvas_size(model);
        if self.canvas.dimensions() != (width, height) {
            self.canvas = RgbaImage::new(width, height);
        }

        for (y, row) in model.grid().iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                let fill = if cell == WALL { WALL_FILL } else { PATH_FILL };
                self.fill_cell(Coordinate::new(x as u32, y as u32), fill);
            }
        }

        let visited_fill = match style {
            PlaybackStyle::Human => VISITED_FILL,
            PlaybackStyle::Agent => AGENT_FILL,
        };
        for &c in visited {
            self.fill_cell(c, visited_fill);
        }
        for &c in solution {
            self.fill_cell(c, SOLUTION_FILL);
        }

        self.fill_cell(model.start(), START_FILL);
        self.fill_cell(model.end, END_FILL);
    }

    fn fill_cell(&mut self, c: Coordinate, fill: Fill) {
        let (width, height) = self.canvas.dimensions();
        let (x0, y0) = (c.x.saturating_mul(CELL_SIZE), c.y.saturating_mul(CELL_SIZE));
        if x0 >= width || y0 >= height {
            log::debug!("Skipping overlay cell {c} outside the canvas");
            return;
        }
        for py in y0..y0 + CELL_SIZE {
            for px in x0..x0 + CELL_SIZE {
                let pixel = self.canvas.get_pixel_mut(px, py);
                *pixel = fill.over(*pixel);
            }
        }
    }

    /// Pixel color at the center of a cell, `None` outside the canvas
    pub fn cell_color(&self, c: Coordinate) -> Option<Rgba<u8>> {
        let (px, py) = (c.x * CELL_SIZE + CELL_SIZE / 2, c.y * CELL_SIZE + CELL_SIZE / 2);
        (px < self.canvas.width() && py < self.canvas.height()).then(|| *self.canvas.get_pixel(px, py))
    }

    /// Map a click position in canvas pixels to the grid cell beneath it
    pub fn cell_at_pixel(model: &MazeModel, px: f32, py: f32) -> Option<Coordinate> {
        if !px.is_finite() || !py.is_finite() || px < 0.0 || py < 0.0 {
            return None;
        }
        let c = Coordinate::new(
            (px / CELL_SIZE as f32).floor() as u32,
            (py / CELL_SIZE as f32).floor() as u32,
        );
        model.contains(c).then_some(c)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.canvas.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl Default for Renderer2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for Renderer2D {
    fn view(&self) -> ViewMode {
        ViewMode::Flat
    }

    fn load(&mut self, model: &MazeModel) {
        self.draw(model, &PlaybackFrame::empty());
    }

    fn draw(&mut self, model: &MazeModel, frame: &PlaybackFrame<'_>) {
        self.draw_frame(model, frame.visited, frame.solution, frame.style);
    }

    // Every frame is repainted from scratch, so there is nothing to append or clear
    fn render_incremental(&mut self, _coords: &[Coordinate], _style: MarkerStyle) {}

    fn clear(&mut self) {}

    fn set_active(&mut self, enabled: bool) {
        self.active = enabled;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
