//! Generic grid over the ground plane

use glam::{Vec2, Vec3};

/// Generic 2D grid with configurable cell size
///
/// Cells are laid out along world x (columns) and world z (rows); height is
/// ignored.
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub origin: Vec2,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            data: vec![T::default(); width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> Option<&T> {
        if x < self.width && z < self.height {
            Some(&self.data[z * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, z: usize) -> Option<&mut T> {
        if x < self.width && z < self.height {
            Some(&mut self.data[z * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, value: T) {
        if x < self.width && z < self.height {
            self.data[z * self.width + x] = value;
        }
    }

    /// Reset every cell to the default value
    pub fn clear(&mut self) {
        self.data.fill(T::default());
    }

    /// Convert world position to cell coordinates, clamped into the grid
    #[inline]
    pub fn world_to_cell(&self, pos: Vec3) -> (usize, usize) {
        let x = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let z = ((pos.z - self.origin.y) / self.cell_size).floor() as i32;
        (
            x.max(0).min(self.width as i32 - 1) as usize,
            z.max(0).min(self.height as i32 - 1) as usize,
        )
    }

    /// Sample grid at world position
    pub fn sample(&self, pos: Vec3) -> Option<&T> {
        let (x, z) = self.world_to_cell(pos);
        self.get(x, z)
    }

    /// Cell center in world coordinates (height 0)
    pub fn cell_center(&self, x: usize, z: usize) -> Vec3 {
        Vec3::new(
            self.origin.x + (x as f32 + 0.5) * self.cell_size,
            0.0,
            self.origin.y + (z as f32 + 0.5) * self.cell_size,
        )
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
