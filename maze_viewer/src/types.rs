// types.rs - Shared type definitions for maze data structures
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error_handling::{Result, ViewerError};

/// Grid value for a walkable cell
pub const PATH: u8 = 0;
/// Grid value for a wall cell
pub const WALL: u8 = 1;

/// Grid coordinate, serialized as `[x, y]` to match the service payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<[u32; 2]> for Coordinate {
    fn from([x, y]: [u32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Coordinate> for [u32; 2] {
    fn from(c: Coordinate) -> [u32; 2] {
        [c.x, c.y]
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One maze as exchanged with the service and persisted to disk.
///
/// The grid is indexed `[row][col]`, i.e. `grid[y][x]`. Only `start` can change
/// after creation; the grid is replaced wholesale with the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeModel {
    pub width: u32,
    pub height: u32,
    grid: Vec<Vec<u8>>,
    start: Coordinate,
    pub end: Coordinate,
}

impl MazeModel {
    pub fn new(grid: Vec<Vec<u8>>, start: Coordinate, end: Coordinate) -> Self {
        let height = grid.len() as u32;
        let width = grid.first().map_or(0, |row| row.len() as u32);
        Self {
            width,
            height,
            grid,
            start,
            end,
        }
    }

    pub fn grid(&self) -> &[Vec<u8>] {
        &self.grid
    }

    pub fn start(&self) -> Coordinate {
        self.start
    }

    #[inline]
    pub fn contains(&self, c: Coordinate) -> bool {
        c.x < self.width && c.y < self.height
    }

    /// Cell value at `(x, y)`, `None` outside the grid
    pub fn cell(&self, x: u32, y: u32) -> Option<u8> {
        self.grid
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    pub fn is_path(&self, c: Coordinate) -> bool {
        self.cell(c.x, c.y) == Some(PATH)
    }

    pub fn wall_count(&self) -> usize {
        self.grid
            .iter()
            .map(|row| row.iter().filter(|&&cell| cell == WALL).count())
            .sum()
    }

    /// Wall cells in row-major order
    pub fn walls(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.grid.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &cell)| cell == WALL)
                .map(move |(x, _)| Coordinate::new(x as u32, y as u32))
        })
    }

    /// Full contract check: layout plus a start on a path cell
    pub fn validate(&self) -> Result<()> {
        self.validate_layout()?;
        if !self.is_path(self.start) {
            return Err(ViewerError::invalid_maze(format!(
                "start {} is on a wall",
                self.start
            )));
        }
        Ok(())
    }

    /// Everything `validate` checks except where the start sits.
    ///
    /// Mazes from the service or from disk may arrive with the start on a wall;
    /// that state is tolerated until the user moves the start.
    pub fn validate_layout(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ViewerError::invalid_maze(format!(
                "dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.grid.len() != self.height as usize {
            return Err(ViewerError::invalid_maze(format!(
                "grid has {} rows but height is {}",
                self.grid.len(),
                self.height
            )));
        }
        for (y, row) in self.grid.iter().enumerate() {
            if row.len() != self.width as usize {
                return Err(ViewerError::invalid_maze(format!(
                    "row {y} has {} cells but width is {}",
                    row.len(),
                    self.width
                )));
            }
            if let Some(x) = row.iter().position(|&cell| cell != PATH && cell != WALL) {
                return Err(ViewerError::invalid_maze(format!(
                    "cell ({x}, {y}) has value {}",
                    row[x]
                )));
            }
        }
        for (name, point) in [("start", self.start), ("end", self.end)] {
            if !self.contains(point) {
                return Err(ViewerError::invalid_maze(format!(
                    "{name} {point} is outside the {}x{} grid",
                    self.width, self.height
                )));
            }
        }
        if !self.is_path(self.end) {
            return Err(ViewerError::invalid_maze(format!(
                "end {} is on a wall",
                self.end
            )));
        }
        Ok(())
    }

    /// Move the start marker onto a path cell, returning the previous start.
    /// Walls and out-of-grid targets leave the model untouched.
    pub fn move_start(&mut self, x: u32, y: u32) -> Result<Coordinate> {
        match self.cell(x, y) {
            None => Err(ViewerError::OutOfBounds { x, y }),
            Some(WALL) => Err(ViewerError::CellIsWall { x, y }),
            Some(_) => Ok(std::mem::replace(&mut self.start, Coordinate::new(x, y))),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Write the maze as a single JSON document
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, self.to_json()?).await?;
        Ok(())
    }

    /// Read a whole JSON document written by `save` (or the web front end)
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = tokio::fs::read_to_string(path).await?;
        Self::from_json(&s)
    }
}
