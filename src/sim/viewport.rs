//! Scrolling window into the global grid
//!
//! The viewport holds no grid data, only the top-left position plus the
//! sub-unit carry from continuous trackball input.

use glam::Vec2;

use super::grid::wrap;

/// Fixed-size window over the torus
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Window width in tiles
    pub cols: i32,
    /// Window height in tiles
    pub rows: i32,
    grid_width: i32,
    grid_height: i32,
    scroll_x: i32,
    scroll_y: i32,
    accum_x: f32,
    accum_y: f32,
}

impl Viewport {
    /// Create a window over a `grid_width x grid_height` torus, starting at
    /// the middle of the grid.
    pub fn new(cols: u32, rows: u32, grid_width: i32, grid_height: i32) -> Self {
        let grid_width = grid_width.max(1);
        let grid_height = grid_height.max(1);
        Self {
            cols: cols.clamp(1, i32::MAX as u32) as i32,
            rows: rows.clamp(1, i32::MAX as u32) as i32,
            grid_width,
            grid_height,
            scroll_x: grid_width / 2,
            scroll_y: grid_height / 2,
            accum_x: 0.0,
            accum_y: 0.0,
        }
    }

    pub fn scroll_pos(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn accumulator(&self) -> (f32, f32) {
        (self.accum_x, self.accum_y)
    }

    /// Tiles in the window
    pub fn tile_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Jump to a position (wrapped); clears the sub-unit carry
    pub fn set_scroll(&mut self, x: i32, y: i32) {
        self.scroll_x = wrap(x, self.grid_width);
        self.scroll_y = wrap(y, self.grid_height);
        self.accum_x = 0.0;
        self.accum_y = 0.0;
    }

    /// Global index of a screen tile, or None outside the window
    pub fn screen_to_global(&self, screen_index: usize) -> Option<usize> {
        if screen_index >= self.tile_count() {
            return None;
        }
        let sx = (screen_index % self.cols as usize) as i32;
        let sy = (screen_index / self.cols as usize) as i32;
        let gx = wrap(self.scroll_x + sx, self.grid_width) as usize;
        let gy = wrap(self.scroll_y + sy, self.grid_height) as usize;
        Some(gy * self.grid_width as usize + gx)
    }

    /// Global indices of every visible tile, in screen order
    pub fn visible_indices(&self) -> Vec<usize> {
        (0..self.tile_count())
            .filter_map(|i| self.screen_to_global(i))
            .collect()
    }

    /// Apply trackball input.
    ///
    /// Input is inverted and scaled into the accumulators; whole units are
    /// moved into the scroll position (truncating toward zero) and only the
    /// fractional remainder is carried. Non-finite input is ignored.
    pub fn scroll(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        let move_x = -dx * sensitivity;
        let move_y = -dy * sensitivity;
        if !move_x.is_finite() || !move_y.is_finite() {
            return;
        }
        self.accum_x += move_x;
        self.accum_y += move_y;

        let step_x = self.accum_x.trunc();
        let step_y = self.accum_y.trunc();
        self.accum_x -= step_x;
        self.accum_y -= step_y;

        self.scroll_x = wrap(self.scroll_x.wrapping_add(step_x as i32), self.grid_width);
        self.scroll_y = wrap(self.scroll_y.wrapping_add(step_y as i32), self.grid_height);
    }

    /// Fractional centre of the visible tiles in unwrapped grid space.
    ///
    /// Tile coordinates name the tile origin, so the middle of a 10-wide
    /// window is 4.5 tiles past the scroll position.
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.scroll_x as f32 + self.accum_x + (self.cols - 1) as f32 / 2.0,
            self.scroll_y as f32 + self.accum_y + (self.rows - 1) as f32 / 2.0,
        )
    }
}
