//! Weight store: dense integer edge weights per layer.
//!
//! Layer `h` (for `h < L - 1`) owns a `(horizontal_range, S_h)` array,
//! every entry starting at 1. The only mutation is adding a
//! [`LayerIncrement`]: a same-shaped 0/1 array with at most one set slot
//! per row. Weights therefore stay integral and never decrease.

use crate::error::{Result, StateError};
use crate::topology::Topology;
use serde::{Deserialize, Serialize};

/// Edge weights of one layer, row-major `(rows, slots)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLayerWeights")]
pub struct LayerWeights {
    layer: usize,
    rows: usize,
    slots: usize,
    data: Vec<u64>,
}

impl LayerWeights {
    /// All-ones array.
    pub fn ones(layer: usize, rows: usize, slots: usize) -> Self {
        Self {
            layer,
            rows,
            slots,
            data: vec![1; rows * slots],
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.slots)
    }

    pub fn get(&self, node: usize, slot: usize) -> u64 {
        self.data[node * self.slots + slot]
    }

    /// Weights of one node, in slot order.
    pub fn row(&self, node: usize) -> &[u64] {
        &self.data[node * self.slots..(node + 1) * self.slots]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.data.chunks(self.slots)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.data
    }

    /// Sum of all weights in the layer.
    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }

    fn add(&mut self, inc: &LayerIncrement) -> Result<()> {
        if inc.shape() != self.shape() {
            return Err(StateError::ShapeMismatch {
                layer: self.layer,
                expected: self.shape(),
                found: inc.shape(),
            }
            .into());
        }
        for (node, chosen) in inc.choices.iter().enumerate() {
            if let Some(slot) = *chosen {
                self.data[node * self.slots + slot] += 1;
            }
        }
        Ok(())
    }
}

/// Unchecked on-disk form of [`LayerWeights`].
#[derive(Deserialize)]
struct RawLayerWeights {
    layer: usize,
    rows: usize,
    slots: usize,
    data: Vec<u64>,
}

impl TryFrom<RawLayerWeights> for LayerWeights {
    type Error = StateError;

    fn try_from(raw: RawLayerWeights) -> std::result::Result<Self, Self::Error> {
        let expected = raw.rows.checked_mul(raw.slots);
        if raw.slots == 0 || expected != Some(raw.data.len()) {
            return Err(StateError::ShapeMismatch {
                layer: raw.layer,
                expected: (raw.rows, raw.slots),
                found: (raw.data.len() / raw.slots.max(1), raw.slots),
            });
        }
        if let Some(i) = raw.data.iter().position(|&w| w == 0) {
            return Err(StateError::InvalidWeight {
                layer: raw.layer,
                node: i / raw.slots,
                slot: i % raw.slots,
                weight: 0,
            });
        }
        Ok(Self {
            layer: raw.layer,
            rows: raw.rows,
            slots: raw.slots,
            data: raw.data,
        })
    }
}

/// A 0/1 increment for one layer: at most one reinforced slot per row.
///
/// Stored as the chosen slot per row, which makes "at most one 1 per row"
/// hold by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerIncrement {
    layer: usize,
    slots: usize,
    choices: Vec<Option<usize>>,
}

impl LayerIncrement {
    /// One reinforced slot per row, as produced by the selection engine.
    pub fn from_choices(layer: usize, slots: usize, choices: &[usize]) -> Result<Self> {
        for (node, &slot) in choices.iter().enumerate() {
            if slot >= slots {
                return Err(StateError::MalformedIncrement {
                    layer,
                    node,
                    reason: format!("slot {} out of range 0..{}", slot, slots),
                }
                .into());
            }
        }
        Ok(Self {
            layer,
            slots,
            choices: choices.iter().map(|&s| Some(s)).collect(),
        })
    }

    /// Build from a dense 0/1 row-major array, rejecting rows with more than one 1.
    pub fn from_dense(layer: usize, rows: usize, slots: usize, dense: &[u8]) -> Result<Self> {
        if dense.len() != rows * slots {
            return Err(StateError::ShapeMismatch {
                layer,
                expected: (rows, slots),
                found: (dense.len() / slots.max(1), slots),
            }
            .into());
        }
        let mut choices = Vec::with_capacity(rows);
        for node in 0..rows {
            let row = &dense[node * slots..(node + 1) * slots];
            let mut chosen = None;
            for (slot, &v) in row.iter().enumerate() {
                match v {
                    0 => {}
                    1 if chosen.is_none() => chosen = Some(slot),
                    1 => {
                        return Err(StateError::MalformedIncrement {
                            layer,
                            node,
                            reason: "more than one reinforced slot".to_string(),
                        }
                        .into())
                    }
                    other => {
                        return Err(StateError::MalformedIncrement {
                            layer,
                            node,
                            reason: format!("entry {} is not 0 or 1", other),
                        }
                        .into())
                    }
                }
            }
            choices.push(chosen);
        }
        Ok(Self { layer, slots, choices })
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.choices.len(), self.slots)
    }

    /// Reinforced slot of each row, if any.
    pub fn choices(&self) -> &[Option<usize>] {
        &self.choices
    }

    /// Number of set entries.
    pub fn count(&self) -> usize {
        self.choices.iter().filter(|c| c.is_some()).count()
    }
}

/// Weight arrays for every layer with outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightStore {
    layers: Vec<LayerWeights>,
}

impl WeightStore {
    /// All-ones arrays shaped by the topology, for layers `0..layers-1`.
    pub fn new(topology: &Topology) -> Self {
        let sources = topology.layers().saturating_sub(1);
        let layers = topology.tables()[..sources]
            .iter()
            .map(|t| {
                let (rows, slots) = t.shape();
                LayerWeights::ones(t.layer(), rows, slots)
            })
            .collect();
        Self { layers }
    }

    pub fn layer(&self, h: usize) -> Option<&LayerWeights> {
        self.layers.get(h)
    }

    pub fn layers(&self) -> &[LayerWeights] {
        &self.layers
    }

    /// Number of layers holding weights (`L - 1`).
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Add an increment to its layer.
    pub fn apply(&mut self, inc: &LayerIncrement) -> Result<()> {
        let h = inc.layer();
        let layer = self
            .layers
            .get_mut(h)
            .ok_or(StateError::MissingLayer(h))?;
        layer.add(inc)
    }

    /// Deep copy of the current state.
    pub fn snapshot(&self) -> Vec<LayerWeights> {
        self.layers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::build_neighbors;

    fn store() -> WeightStore {
        WeightStore::new(&build_neighbors(2.0, 4, 3).unwrap())
    }

    #[test]
    fn initial_state_is_all_ones() {
        let store = store();
        assert_eq!(store.len(), 2);
        assert_eq!(store.layer(0).unwrap().shape(), (4, 3));
        assert_eq!(store.layer(1).unwrap().shape(), (4, 5));
        for layer in store.layers() {
            assert!(layer.as_slice().iter().all(|&w| w == 1));
        }
    }

    #[test]
    fn apply_adds_one_per_chosen_slot() {
        let mut store = store();
        let inc = LayerIncrement::from_choices(1, 5, &[0, 4, 2, 2]).unwrap();
        store.apply(&inc).unwrap();

        let layer = store.layer(1).unwrap();
        assert_eq!(layer.row(0), &[2, 1, 1, 1, 1]);
        assert_eq!(layer.row(1), &[1, 1, 1, 1, 2]);
        assert_eq!(layer.row(2), &[1, 1, 2, 1, 1]);
        assert_eq!(layer.total(), 20 + 4);
        // Other layer untouched.
        assert_eq!(store.layer(0).unwrap().total(), 12);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut store = store();
        let before = store.snapshot();
        store
            .apply(&LayerIncrement::from_choices(0, 3, &[1, 1, 1, 1]).unwrap())
            .unwrap();
        assert!(before[0].as_slice().iter().all(|&w| w == 1));
        assert_eq!(store.layer(0).unwrap().get(0, 1), 2);
    }

    #[test]
    fn dense_increment_allows_empty_rows() {
        let inc = LayerIncrement::from_dense(0, 2, 3, &[0, 1, 0, 0, 0, 0]).unwrap();
        assert_eq!(inc.choices(), &[Some(1), None]);
        assert_eq!(inc.count(), 1);
    }

    #[test]
    fn dense_increment_rejects_two_ones() {
        let err = LayerIncrement::from_dense(0, 1, 3, &[1, 0, 1]).unwrap_err();
        assert!(err.is_state());
        let err = LayerIncrement::from_dense(0, 1, 3, &[2, 0, 0]).unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn rejects_shape_mismatch_and_missing_layer() {
        let mut store = store();
        let wrong_slots = LayerIncrement::from_choices(0, 5, &[0, 0, 0, 0]).unwrap();
        assert!(matches!(
            store.apply(&wrong_slots).unwrap_err(),
            crate::error::ArborError::State(StateError::ShapeMismatch { layer: 0, .. })
        ));

        let terminal = LayerIncrement::from_choices(2, 9, &[0, 0, 0, 0]).unwrap();
        assert!(matches!(
            store.apply(&terminal).unwrap_err(),
            crate::error::ArborError::State(StateError::MissingLayer(2))
        ));
    }

    #[test]
    fn deserialization_checks_shape_and_weights() {
        let ok: LayerWeights =
            serde_json::from_str(r#"{"layer":0,"rows":2,"slots":3,"data":[1,1,2,1,3,1]}"#).unwrap();
        assert_eq!(ok.row(1), &[1, 3, 1]);

        let short = serde_json::from_str::<LayerWeights>(r#"{"layer":0,"rows":2,"slots":3,"data":[1,1,1]}"#);
        assert!(short.is_err());

        let no_slots = serde_json::from_str::<LayerWeights>(r#"{"layer":0,"rows":2,"slots":0,"data":[]}"#);
        assert!(no_slots.is_err());

        let zero = serde_json::from_str::<LayerWeights>(r#"{"layer":1,"rows":1,"slots":3,"data":[1,0,1]}"#)
            .unwrap_err();
        assert!(zero.to_string().contains("slot 1"));
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        assert!(LayerIncrement::from_choices(0, 3, &[0, 3]).unwrap_err().is_state());
    }
}
