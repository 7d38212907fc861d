//! Topology: the fixed neighbor map of the layered lattice.
//!
//! Node `k` in layer `h` reaches the columns `k - r_h ..= k + r_h` of
//! layer `h + 1`, wrapping modulo the horizontal range, with
//! `r_h = ceil(a^h)`. Slots are ordered by offset, so slot `j` means the
//! same relative offset `j - r_h` for every node in the layer.
//!
//! The map never changes during a run. When the scope is wider than the
//! range, destinations repeat across slots; each slot is still its own edge.

use crate::error::{ParameterError, Result};
use crate::types::{validate_range, validate_scope};
use serde::{Deserialize, Serialize};

/// Upper bound on the cells of all neighbor tables of a lattice.
///
/// The weight store holds one cell per table cell of layers `0..L-1` and
/// the fitness field `L * R` values, so this bounds every allocation a
/// run makes up front.
pub const MAX_LATTICE_CELLS: usize = 1 << 26;

/// Neighbor slots of every node in one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborTable {
    layer: usize,
    radius: usize,
    horizontal_range: usize,
    /// Row-major `(horizontal_range, slot_count)`.
    positions: Vec<usize>,
}

impl NeighborTable {
    fn new(layer: usize, radius: usize, horizontal_range: usize) -> Self {
        let slots = 2 * radius + 1;
        let r = horizontal_range as i64;
        let mut positions = Vec::with_capacity(horizontal_range * slots);
        for k in 0..horizontal_range as i64 {
            for offset in -(radius as i64)..=(radius as i64) {
                positions.push((k + offset).rem_euclid(r) as usize);
            }
        }
        Self {
            layer,
            radius,
            horizontal_range,
            positions,
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    /// `ceil(a^h)`: how far the scope reaches on each side.
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// `S_h = 1 + 2 * radius`.
    pub fn slot_count(&self) -> usize {
        2 * self.radius + 1
    }

    pub fn horizontal_range(&self) -> usize {
        self.horizontal_range
    }

    /// `(rows, columns)` of the table, matching the layer's weight array.
    pub fn shape(&self) -> (usize, usize) {
        (self.horizontal_range, self.slot_count())
    }

    /// Relative column offset denoted by a slot.
    pub fn offset(&self, slot: usize) -> i64 {
        slot as i64 - self.radius as i64
    }

    /// Destination positions of node `k`, in slot order.
    pub fn neighbors_of(&self, k: usize) -> &[usize] {
        let s = self.slot_count();
        &self.positions[k * s..(k + 1) * s]
    }

    /// Destination position of node `k` through `slot`.
    pub fn neighbor(&self, k: usize, slot: usize) -> usize {
        self.positions[k * self.slot_count() + slot]
    }

    /// Iterate rows as `(node, destinations)`.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.positions.chunks(self.slot_count()).enumerate()
    }
}

/// Neighbor tables for every layer of a lattice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    tables: Vec<NeighborTable>,
}

impl Topology {
    pub fn layer(&self, h: usize) -> Option<&NeighborTable> {
        self.tables.get(h)
    }

    pub fn layers(&self) -> usize {
        self.tables.len()
    }

    pub fn tables(&self) -> &[NeighborTable] {
        &self.tables
    }

    /// Slot counts per layer.
    pub fn slot_counts(&self) -> Vec<usize> {
        self.tables.iter().map(NeighborTable::slot_count).collect()
    }
}

/// Scope radius `ceil(a^h)` for layer `h`.
pub fn scope_radius(a: f64, layer: usize) -> Result<usize> {
    validate_scope(a)?;
    let value = a.powf(layer as f64).ceil();
    // Keep 2r + 1 addressable.
    if !value.is_finite() || value > (u32::MAX as f64) {
        return Err(ParameterError::ScopeOverflow { layer, value }.into());
    }
    Ok(value as usize)
}

/// Build the neighbor tables for layers `0..layers`.
pub fn build_neighbors(a: f64, horizontal_range: usize, layers: usize) -> Result<Topology> {
    validate_scope(a)?;
    validate_range(horizontal_range)?;
    if layers < 1 {
        return Err(ParameterError::Layers { found: layers, min: 1 }.into());
    }

    // All radii are checked before any table is allocated.
    let radii = (0..layers)
        .map(|h| scope_radius(a, h))
        .collect::<Result<Vec<_>>>()?;

    let mut cells = 0usize;
    for (h, &r) in radii.iter().enumerate() {
        cells = r
            .checked_mul(2)
            .and_then(|d| d.checked_add(1))
            .and_then(|slots| slots.checked_mul(horizontal_range))
            .and_then(|n| cells.checked_add(n))
            .filter(|&total| total <= MAX_LATTICE_CELLS)
            .ok_or(ParameterError::LatticeTooLarge {
                layer: h,
                max: MAX_LATTICE_CELLS,
            })?;
    }

    let tables = radii
        .into_iter()
        .enumerate()
        .map(|(h, r)| NeighborTable::new(h, r, horizontal_range))
        .collect();

    Ok(Topology { tables })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_counts_follow_scope_growth() {
        let topo = build_neighbors(2.0, 64, 4).unwrap();
        assert_eq!(topo.slot_counts(), vec![3, 5, 9, 17]);

        let topo = build_neighbors(1.5, 64, 4).unwrap();
        // ceil(1), ceil(1.5), ceil(2.25), ceil(3.375)
        assert_eq!(topo.slot_counts(), vec![3, 5, 7, 9]);
    }

    #[test]
    fn table_shape_and_bounds() {
        for &(a, range, layers) in &[(2.0, 4, 3), (1.1, 7, 5), (3.0, 1, 2), (2.5, 10, 3)] {
            let topo = build_neighbors(a, range, layers).unwrap();
            assert_eq!(topo.layers(), layers);
            for table in topo.tables() {
                let (rows, cols) = table.shape();
                assert_eq!(rows, range);
                assert_eq!(cols, 1 + 2 * scope_radius(a, table.layer()).unwrap());
                for (_, row) in table.rows() {
                    assert_eq!(row.len(), cols);
                    assert!(row.iter().all(|&p| p < range));
                }
            }
        }
    }

    #[test]
    fn slots_are_translation_invariant() {
        let topo = build_neighbors(2.0, 9, 3).unwrap();
        for table in topo.tables() {
            for k in 0..9 {
                for slot in 0..table.slot_count() {
                    let expected = (k as i64 + table.offset(slot)).rem_euclid(9) as usize;
                    assert_eq!(table.neighbor(k, slot), expected);
                }
            }
        }
    }

    #[test]
    fn wraps_around_the_boundary() {
        let topo = build_neighbors(2.0, 4, 2).unwrap();
        let layer1 = topo.layer(1).unwrap();
        // radius 2 on a ring of 4: offsets -2..=2
        assert_eq!(layer1.neighbors_of(0), &[2, 3, 0, 1, 2]);
        assert_eq!(layer1.neighbors_of(3), &[1, 2, 3, 0, 1]);
    }

    #[test]
    fn centre_slot_is_own_column() {
        let topo = build_neighbors(2.0, 5, 3).unwrap();
        for table in topo.tables() {
            let centre = table.radius();
            assert_eq!(table.offset(centre), 0);
            for k in 0..5 {
                assert_eq!(table.neighbor(k, centre), k);
            }
        }
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(build_neighbors(1.0, 4, 2).unwrap_err().is_parameter());
        assert!(build_neighbors(0.5, 4, 2).unwrap_err().is_parameter());
        assert!(build_neighbors(2.0, 0, 2).unwrap_err().is_parameter());
        assert!(build_neighbors(2.0, 4, 0).unwrap_err().is_parameter());
    }

    #[test]
    fn rejects_lattice_beyond_cell_cap() {
        // Radius fits in u32 but the layer-1 table would not fit in memory.
        let err = build_neighbors(4.0e9, 1, 2).unwrap_err();
        assert!(err.is_parameter());
        assert!(matches!(
            err,
            crate::error::ArborError::Parameter(ParameterError::LatticeTooLarge { layer: 1, .. })
        ));

        // Wide ring with a small scope.
        let err = build_neighbors(2.0, usize::MAX / 2, 1).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ArborError::Parameter(ParameterError::LatticeTooLarge { layer: 0, .. })
        ));

        // One cell past the cap.
        let err = build_neighbors(2.0, MAX_LATTICE_CELLS / 3 + 1, 1).unwrap_err();
        assert!(err.is_parameter());
    }

    #[test]
    fn rejects_overflowing_scope() {
        let err = build_neighbors(10.0, 4, 12).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ArborError::Parameter(ParameterError::ScopeOverflow { layer: 10, .. })
        ));
    }
}
