//! Threat field: estimated hostile firepower over the map
//!
//! One grid per movement domain. Every refresh the grids are cleared and each
//! known hostile splats its combat power as a separable 2D gaussian into the
//! grids of the domains its weapons can reach. Queries take the maximum cell
//! value inside a disc, so a single-cell sample and a radius sample are on
//! the same scale as a group's summed strength.

use glam::{Vec2, Vec3};

use crate::core::config::ThreatConfig;
use crate::core::types::Tick;
use crate::engine::GameView;
use crate::military::group::Group;
use crate::spatial::Grid;
use crate::units::{DomainMask, MovementDomain};

/// Gaussian kernels are cut off this many sigmas from the center
const KERNEL_REACH: f32 = 3.0;

pub struct ThreatField {
    resolution: f32,
    width: usize,
    height: usize,
    maps: [Grid<f32>; 3],
    max_power: [f32; 3],
    spread: f32,
    min_sigma: f32,
    refresh_interval: u64,
    last_rebuild: Option<Tick>,
    hostiles: usize,
}

impl ThreatField {
    /// Allocate grids covering a `map_width` x `map_depth` playable area
    pub fn new(map_width: f32, map_depth: f32, config: &ThreatConfig) -> Self {
        let resolution = config.resolution;
        let width = ((map_width / resolution).ceil() as usize).max(1);
        let height = ((map_depth / resolution).ceil() as usize).max(1);
        let grid = Grid::new(width, height, resolution, Vec2::ZERO);
        Self {
            resolution,
            width,
            height,
            maps: [grid.clone(), grid.clone(), grid],
            max_power: [0.0; 3],
            spread: config.spread,
            min_sigma: config.min_sigma,
            refresh_interval: config.refresh_interval.max(1),
            last_rebuild: None,
            hostiles: 0,
        }
    }

    /// Rebuild if the refresh interval has elapsed; returns whether it did
    pub fn update<V: GameView + ?Sized>(&mut self, tick: Tick, view: &V) -> bool {
        let due = match self.last_rebuild {
            None => true,
            Some(last) => tick < last || tick - last >= self.refresh_interval,
        };
        if !due {
            return false;
        }
        self.rebuild(view);
        self.last_rebuild = Some(tick);
        true
    }

    /// Clear all grids and splat every known hostile
    pub fn rebuild<V: GameView + ?Sized>(&mut self, view: &V) {
        self.reset();

        let mut splatted = 0;
        for enemy in view.enemy_units() {
            let Some(unit_type) = view.unit_type(enemy) else {
                continue;
            };
            if unit_type.power <= 0.0 || unit_type.hits.is_empty() {
                continue;
            }
            let Some(pos) = view.position(enemy) else {
                continue;
            };
            let sigma = (unit_type.weapon_range * self.spread).max(self.min_sigma);
            self.add_power(pos, unit_type.power, sigma, unit_type.hits);
            splatted += 1;
        }
        self.hostiles = splatted;

        tracing::debug!(
            "Threat field rebuilt: {} hostiles, max air {:.1} surface {:.1} underwater {:.1}",
            splatted,
            self.max_power[0],
            self.max_power[1],
            self.max_power[2]
        );
    }

    /// Splat one gaussian of peak `power` centred at `pos`
    pub fn add_power(&mut self, pos: Vec3, power: f32, sigma: f32, domains: DomainMask) {
        if domains.is_empty() || power <= 0.0 || sigma <= 0.0 {
            return;
        }
        let reach = sigma * KERNEL_REACH;
        let (x0, z0) = self.maps[0].world_to_cell(pos - Vec3::new(reach, 0.0, reach));
        let (x1, z1) = self.maps[0].world_to_cell(pos + Vec3::new(reach, 0.0, reach));

        let two_sigma_sq = 2.0 * sigma * sigma;
        let gx: Vec<f32> = (x0..=x1)
            .map(|x| {
                let dx = self.maps[0].cell_center(x, 0).x - pos.x;
                (-(dx * dx) / two_sigma_sq).exp()
            })
            .collect();
        let gz: Vec<f32> = (z0..=z1)
            .map(|z| {
                let dz = self.maps[0].cell_center(0, z).z - pos.z;
                (-(dz * dz) / two_sigma_sq).exp()
            })
            .collect();

        for domain in domains.domains() {
            let idx = domain.index();
            let map = &mut self.maps[idx];
            let mut peak = self.max_power[idx];
            for (j, z) in (z0..=z1).enumerate() {
                for (i, x) in (x0..=x1).enumerate() {
                    if let Some(cell) = map.get_mut(x, z) {
                        *cell += power * gx[i] * gz[j];
                        peak = peak.max(*cell);
                    }
                }
            }
            self.max_power[idx] = peak;
        }
    }

    /// Highest threat within `radius` of `center`; `radius == 0` samples the
    /// containing cell. Positions off the map clamp to the nearest cell.
    pub fn get_threat(&self, center: Vec3, radius: f32, domain: MovementDomain) -> f32 {
        let map = &self.maps[domain.index()];
        let (cx, cz) = map.world_to_cell(center);
        if radius <= 0.0 {
            return map.get(cx, cz).copied().unwrap_or(0.0);
        }

        // Any disc wider than the grid diagonal covers every cell
        let r = ((radius / self.resolution).ceil() as i64).min((self.width + self.height) as i64);
        let (cx, cz) = (cx as i64, cz as i64);
        let x_range = (cx - r).max(0)..=(cx + r).min(self.width as i64 - 1);
        let z_range = (cz - r).max(0)..=(cz + r).min(self.height as i64 - 1);
        let mut threat = 0.0f32;
        for z in z_range {
            let dz = z - cz;
            for x in x_range.clone() {
                let dx = x - cx;
                if dx * dx + dz * dz > r * r {
                    continue;
                }
                if let Some(&value) = map.get(x as usize, z as usize) {
                    threat = threat.max(value);
                }
            }
        }
        threat
    }

    /// Threat in the domain the group moves in
    pub fn get_threat_for_group(&self, center: Vec3, radius: f32, group: &Group) -> f32 {
        self.get_threat(center, radius, group.domain())
    }

    /// Highest cell value of a domain since the last rebuild
    pub fn max_power(&self, domain: MovementDomain) -> f32 {
        self.max_power[domain.index()]
    }

    /// Grid dimensions (X, Z)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Hostiles that contributed to the last rebuild
    pub fn hostile_count(&self) -> usize {
        self.hostiles
    }

    pub fn last_rebuild(&self) -> Option<Tick> {
        self.last_rebuild
    }

    /// Raw grid of one domain
    pub fn map(&self, domain: MovementDomain) -> &Grid<f32> {
        &self.maps[domain.index()]
    }

    fn reset(&mut self) {
        for map in &mut self.maps {
            map.clear();
        }
        self.max_power = [0.0; 3];
    }
}
