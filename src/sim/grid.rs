//! Wrap-around global grid
//!
//! Owns the cell values (1-9) and the hazard flags. Every coordinate is wrapped
//! into `[0, W) x [0, H)` before it touches either array.

use rand::Rng;

/// Smallest cell value
pub const MIN_VALUE: u8 = 1;
/// Largest cell value
pub const MAX_VALUE: u8 = 9;

/// Wrap a coordinate into `[0, dim)`, correcting negative inputs.
///
/// `dim` must be positive.
#[inline]
pub fn wrap(coord: i32, dim: i32) -> i32 {
    coord.rem_euclid(dim)
}

/// Prime cell values (only 2, 3, 5, 7 exist in 1-9)
#[inline]
pub fn is_prime(value: u8) -> bool {
    matches!(value, 2 | 3 | 5 | 7)
}

/// The global toroidal grid
#[derive(Debug, Clone)]
pub struct ToroidalGrid {
    width: i32,
    height: i32,
    values: Vec<u8>,
    hazards: Vec<bool>,
}

impl ToroidalGrid {
    /// Create a grid filled with `MIN_VALUE` and no hazards.
    /// Dimensions are clamped to at least 1.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.clamp(1, i32::MAX as u32) as i32;
        let height = height.clamp(1, i32::MAX as u32) as i32;
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            values: vec![MIN_VALUE; len],
            hazards: vec![false; len],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Total cell count (`W * H`)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Row-major index of any (possibly out-of-range) coordinate
    #[inline]
    pub fn index_of(&self, x: i32, y: i32) -> usize {
        let wx = wrap(x, self.width) as usize;
        let wy = wrap(y, self.height) as usize;
        wy * self.width as usize + wx
    }

    /// Coordinates of a global index, or None if out of range
    pub fn coords_of(&self, index: usize) -> Option<(i32, i32)> {
        if index >= self.len() {
            return None;
        }
        let w = self.width as usize;
        Some(((index % w) as i32, (index / w) as i32))
    }

    pub fn value_at(&self, x: i32, y: i32) -> u8 {
        self.values[self.index_of(x, y)]
    }

    /// Value at a global index (0 when out of range)
    pub fn value_at_index(&self, index: usize) -> u8 {
        self.values.get(index).copied().unwrap_or(0)
    }

    /// Write a value, clamped into `[MIN_VALUE, MAX_VALUE]`
    pub fn set_value(&mut self, x: i32, y: i32, value: u8) {
        let idx = self.index_of(x, y);
        self.values[idx] = value.clamp(MIN_VALUE, MAX_VALUE);
    }

    pub fn is_hazard(&self, index: usize) -> bool {
        self.hazards.get(index).copied().unwrap_or(false)
    }

    /// Set or clear a hazard flag. Out-of-range indices are ignored.
    pub fn set_hazard(&mut self, index: usize, active: bool) {
        if let Some(flag) = self.hazards.get_mut(index) {
            *flag = active;
        }
    }

    pub fn hazard_count(&self) -> usize {
        self.hazards.iter().filter(|&&h| h).count()
    }

    /// Global indices of every active hazard, ascending
    pub fn hazard_indices(&self) -> Vec<usize> {
        self.hazards
            .iter()
            .enumerate()
            .filter_map(|(i, &h)| h.then_some(i))
            .collect()
    }

    /// Give a single cell a fresh random value
    pub fn refresh_cell<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) {
        if let Some(v) = self.values.get_mut(index) {
            *v = rng.random_range(MIN_VALUE..=MAX_VALUE);
        }
    }

    /// Refill every cell with a uniform value in 1-9 and clear all hazards
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for v in &mut self.values {
            *v = rng.random_range(MIN_VALUE..=MAX_VALUE);
        }
        self.hazards.fill(false);
        log::debug!("Grid regenerated ({}x{})", self.width, self.height);
    }

    /// In-bounds 3x3 neighbourhood around a global index (does not wrap)
    pub fn group_3x3(&self, center: usize) -> Vec<usize> {
        let Some((cx, cy)) = self.coords_of(center) else {
            return Vec::new();
        };
        let mut group = Vec::with_capacity(9);
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                if (0..self.width).contains(&x) && (0..self.height).contains(&y) {
                    group.push(y as usize * self.width as usize + x as usize);
                }
            }
        }
        group
    }
}
