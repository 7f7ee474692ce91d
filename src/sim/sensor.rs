//! Hazard proximity sensor
//!
//! Scans an oversized window around the viewport and turns the distance to the
//! nearest hazard into a danger value (0 = nothing near, 1 = right on top).

use glam::Vec2;

use super::grid::ToroidalGrid;
use super::viewport::Viewport;
use crate::consts::{DEFAULT_SENSOR_MAX_DISTANCE, DEFAULT_SENSOR_SEARCH_MARGIN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximitySensor {
    /// Distance (tiles) at which the reading falls to zero
    pub max_distance: f32,
    /// Extra tiles scanned beyond each edge of the viewport
    pub search_margin: i32,
}

impl Default for ProximitySensor {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_SENSOR_MAX_DISTANCE,
            search_margin: DEFAULT_SENSOR_SEARCH_MARGIN,
        }
    }
}

impl ProximitySensor {
    /// Distance to the nearest hazard strictly closer than `max_distance`.
    ///
    /// Raw scan coordinates are wrapped only to look up the hazard flag; the
    /// distance is measured from the unwrapped coordinate.
    pub fn nearest_hazard_distance(&self, grid: &ToroidalGrid, viewport: &Viewport) -> Option<f32> {
        let center = viewport.center();
        let (scroll_x, scroll_y) = viewport.scroll_pos();

        let mut min_dist_sq = self.max_distance * self.max_distance;
        let mut found = false;

        let margin = self.search_margin.max(0);
        let (y_min, y_max) = (
            scroll_y.saturating_sub(margin),
            scroll_y.saturating_add(margin).saturating_add(viewport.rows),
        );
        let (x_min, x_max) = (
            scroll_x.saturating_sub(margin),
            scroll_x.saturating_add(margin).saturating_add(viewport.cols),
        );

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                if !grid.is_hazard(grid.index_of(x, y)) {
                    continue;
                }
                let dist_sq = (Vec2::new(x as f32, y as f32) - center).length_squared();
                if dist_sq < min_dist_sq {
                    min_dist_sq = dist_sq;
                    found = true;
                }
            }
        }

        found.then(|| min_dist_sq.sqrt())
    }

    /// Normalized danger reading in [0, 1]
    pub fn proximity(&self, grid: &ToroidalGrid, viewport: &Viewport) -> f32 {
        if self.max_distance <= 0.0 {
            return 0.0;
        }
        match self.nearest_hazard_distance(grid, viewport) {
            Some(distance) => (1.0 - distance / self.max_distance).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}
