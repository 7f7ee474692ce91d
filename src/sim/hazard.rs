//! Hazard placement
//!
//! Hazards are seeded one per sector so they stay evenly spread over the whole
//! torus, then consumed by drops and re-activated for difficulty escalation.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::grid::ToroidalGrid;
use crate::consts::{DEFAULT_SECTOR_MARGIN, DEFAULT_SECTOR_SIZE};

/// Sector-partitioned hazard spawner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardField {
    /// Side length of a spawn sector
    pub sector_size: u32,
    /// Minimum distance of a hazard from its sector edges
    pub edge_margin: u32,
}

impl Default for HazardField {
    fn default() -> Self {
        Self {
            sector_size: DEFAULT_SECTOR_SIZE,
            edge_margin: DEFAULT_SECTOR_MARGIN,
        }
    }
}

impl HazardField {
    pub fn new(sector_size: u32, edge_margin: u32) -> Self {
        Self {
            sector_size: sector_size.max(1),
            edge_margin,
        }
    }

    /// Number of sectors (and therefore hazards) a reseed produces
    pub fn sector_count(&self, grid: &ToroidalGrid) -> usize {
        let s = self.sector_size.max(1) as usize;
        (grid.width() as usize).div_ceil(s) * (grid.height() as usize).div_ceil(s)
    }

    /// Offset within a sector of the given extent
    fn pick_offset<R: Rng + ?Sized>(&self, extent: i32, rng: &mut R) -> i32 {
        let margin = i32::try_from(self.edge_margin).unwrap_or(i32::MAX);
        if extent > margin.saturating_mul(2) {
            rng.random_range(margin..extent - margin)
        } else {
            rng.random_range(0..extent)
        }
    }

    /// Clear all hazards and place exactly one inside every sector.
    /// Partial sectors at the right/bottom edges use their own bounds.
    pub fn reseed<R: Rng + ?Sized>(&self, grid: &mut ToroidalGrid, rng: &mut R) {
        let (width, height) = (grid.width(), grid.height());
        let sector = i32::try_from(self.sector_size.max(1)).unwrap_or(i32::MAX);

        for i in 0..grid.len() {
            grid.set_hazard(i, false);
        }

        for sy in (0..height).step_by(sector as usize) {
            let extent_y = sector.min(height - sy);
            for sx in (0..width).step_by(sector as usize) {
                let extent_x = sector.min(width - sx);
                let x = sx + self.pick_offset(extent_x, rng);
                let y = sy + self.pick_offset(extent_y, rng);
                let idx = grid.index_of(x, y);
                grid.set_hazard(idx, true);
                log::trace!("Hazard spawned at global index {}", idx);
            }
        }

        log::debug!("Seeded {} hazards", grid.hazard_count());
    }

    pub fn is_hazard(&self, grid: &ToroidalGrid, index: usize) -> bool {
        grid.is_hazard(index)
    }

    /// Consume a hazard: clear its flag and refresh the cell value.
    /// Returns false (and changes nothing) if the cell was not hazardous.
    pub fn consume<R: Rng + ?Sized>(
        &self,
        grid: &mut ToroidalGrid,
        index: usize,
        rng: &mut R,
    ) -> bool {
        if !grid.is_hazard(index) {
            return false;
        }
        grid.set_hazard(index, false);
        grid.refresh_cell(index, rng);
        true
    }

    /// Mark one uniformly chosen candidate that is not already hazardous.
    /// Returns the activated index, or None if nothing was eligible.
    pub fn activate_one<R: Rng + ?Sized>(
        &self,
        grid: &mut ToroidalGrid,
        candidates: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        let eligible: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| i < grid.len() && !grid.is_hazard(i))
            .collect();
        let chosen = *eligible.choose(rng)?;
        grid.set_hazard(chosen, true);
        Some(chosen)
    }
}
