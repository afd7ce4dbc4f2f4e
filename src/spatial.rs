//! Spatial partitioning for the collision broad phase.
//!
//! Provides O(k) overlap-candidate queries where k is the number of entities
//! in nearby cells, rather than O(n) for brute force. The grid is rebuilt
//! from live entities at the start of every fixed update, so entries never
//! move or leave mid-frame.

use crate::components::{BoundingBox, Faction, Position};
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Grid-based spatial partitioning structure.
///
/// Divides the play area into cells and tracks which entities are in each
/// cell, so the narrow phase only checks nearby cells.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Cell size in world units.
    pub cell_size: f32,
    /// Map from cell coordinates to the entries in that cell.
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
}

/// Entry in a spatial cell. Carries half extents so the narrow phase can
/// run AABB tests without a second component lookup.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    pub half_w: f32,
    pub half_h: f32,
    pub faction: u8, // 0 = Player, 1 = Enemy, 2 = Neutral
}

impl SpatialEntry {
    /// AABB overlap test against another entry.
    pub fn overlaps(&self, other: &SpatialEntry) -> bool {
        (self.x - other.x).abs() <= self.half_w + other.half_w
            && (self.y - other.y).abs() <= self.half_h + other.half_h
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(64.0)
    }
}

impl SpatialGrid {
    /// Create a new spatial grid with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    /// Convert world coordinates to cell coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear all entries (call at start of each frame before rebuilding).
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Insert an entity at a position.
    pub fn insert(&mut self, entity: Entity, x: f32, y: f32, half_w: f32, half_h: f32, faction: u8) {
        let cell = self.world_to_cell(x, y);
        self.cells.entry(cell).or_default().push(SpatialEntry {
            entity,
            x,
            y,
            half_w,
            half_h,
            faction,
        });
    }

    /// Candidate entries whose AABB may overlap the given box: every entry in
    /// the cells the box touches (plus the box's own reach into neighbors).
    pub fn query_overlap_candidates(
        &self,
        x: f32,
        y: f32,
        half_w: f32,
        half_h: f32,
        faction: u8,
    ) -> Vec<SpatialEntry> {
        let min_cell = self.world_to_cell(x - half_w - self.cell_size, y - half_h - self.cell_size);
        let max_cell = self.world_to_cell(x + half_w + self.cell_size, y + half_h + self.cell_size);

        let mut results = Vec::new();
        for cx in min_cell.0..=max_cell.0 {
            for cy in min_cell.1..=max_cell.1 {
                if let Some(entries) = self.cells.get(&(cx, cy)) {
                    for entry in entries {
                        if entry.faction == faction {
                            results.push(*entry);
                        }
                    }
                }
            }
        }
        results
    }
}

/// System that rebuilds the spatial grid each frame from collidable entities.
/// Particles carry no [`BoundingBox`] and never enter the grid. Bullets stay
/// out too: they query the grid for targets rather than being targets.
pub fn spatial_grid_update_system(
    mut grid: ResMut<SpatialGrid>,
    query: Query<(Entity, &Position, &BoundingBox, &Faction), Without<crate::components::Bullet>>,
) {
    grid.clear();

    for (entity, pos, bbox, faction) in query.iter() {
        grid.insert(
            entity,
            pos.x,
            pos.y,
            bbox.half_w,
            bbox.half_h,
            faction.as_index(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(x: f32, y: f32, half_w: f32, half_h: f32) -> SpatialEntry {
        SpatialEntry {
            entity: Entity::from_raw(999),
            x,
            y,
            half_w,
            half_h,
            faction: 0,
        }
    }

    #[test]
    fn test_candidates_skip_distant_cells() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(Entity::from_raw(1), 5.0, 5.0, 4.0, 4.0, 1);
        grid.insert(Entity::from_raw(2), 200.0, 200.0, 4.0, 4.0, 1);

        let near = grid.query_overlap_candidates(5.0, 5.0, 4.0, 4.0, 1);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].entity, Entity::from_raw(1));
    }

    #[test]
    fn test_candidates_filter_by_faction() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(Entity::from_raw(1), 0.0, 0.0, 4.0, 4.0, 0);
        grid.insert(Entity::from_raw(2), 5.0, 0.0, 4.0, 4.0, 1);
        grid.insert(Entity::from_raw(3), 10.0, 0.0, 4.0, 4.0, 1);

        let enemies = grid.query_overlap_candidates(5.0, 0.0, 4.0, 4.0, 1);
        assert_eq!(enemies.len(), 2);
        assert!(enemies.iter().all(|e| e.faction == 1));
    }

    #[test]
    fn test_overlap_candidates_cross_cells() {
        let mut grid = SpatialGrid::new(10.0);

        // Sits on a cell boundary; must be found from the neighboring cell.
        grid.insert(Entity::from_raw(1), 10.0, 0.0, 6.0, 6.0, 1);

        let candidates = grid.query_overlap_candidates(2.0, 0.0, 4.0, 4.0, 1);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].overlaps(&box_at(2.0, 0.0, 4.0, 4.0)));
    }

    #[test]
    fn test_clear_empties_every_cell() {
        let mut grid = SpatialGrid::new(10.0);
        grid.insert(Entity::from_raw(1), 5.0, 5.0, 4.0, 4.0, 1);
        grid.insert(Entity::from_raw(2), 95.0, 95.0, 4.0, 4.0, 1);

        grid.clear();

        assert!(grid.query_overlap_candidates(5.0, 5.0, 50.0, 50.0, 1).is_empty());
        assert!(grid.query_overlap_candidates(95.0, 95.0, 50.0, 50.0, 1).is_empty());
    }
}
