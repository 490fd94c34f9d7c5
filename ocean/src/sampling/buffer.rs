//! Fixed-capacity storage for sample inputs and batch outputs.

use bevy::math::Vec3;
use std::sync::Arc;

use super::registry::SampleRange;

/// Three parallel arrays indexed by the registry's slot space.
///
/// Inputs live behind an `Arc` so an in-flight batch can read them without
/// copying; writers go through [`Arc::make_mut`] once the batch has finished.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    positions: Arc<Vec<Vec3>>,
    out_positions: Vec<Vec3>,
    out_normals: Vec<Vec3>,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: Arc::new(vec![Vec3::ZERO; capacity]),
            out_positions: vec![Vec3::ZERO; capacity],
            out_normals: vec![Vec3::Y; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.out_positions.len()
    }

    /// Shared handle on the inputs for a batch.
    pub(crate) fn share_inputs(&self) -> Arc<Vec<Vec3>> {
        Arc::clone(&self.positions)
    }

    pub fn inputs(&self, range: SampleRange) -> &[Vec3] {
        &self.positions[range.as_range()]
    }

    pub fn write_inputs(&mut self, range: SampleRange, samples: &[Vec3]) {
        Arc::make_mut(&mut self.positions)[range.as_range()].copy_from_slice(samples);
    }

    pub fn read_outputs(
        &self,
        range: SampleRange,
        out_positions: &mut [Vec3],
        out_normals: Option<&mut [Vec3]>,
    ) {
        out_positions.copy_from_slice(&self.out_positions[range.as_range()]);
        if let Some(out_normals) = out_normals {
            out_normals.copy_from_slice(&self.out_normals[range.as_range()]);
        }
    }

    pub(crate) fn store_outputs(&mut self, start: usize, positions: &[Vec3], normals: &[Vec3]) {
        self.out_positions[start..start + positions.len()].copy_from_slice(positions);
        self.out_normals[start..start + normals.len()].copy_from_slice(normals);
    }

    /// Moves slots `[removed.end, occupied)` down to `removed.start` and
    /// resets the vacated tail to its initial state.
    ///
    /// The next registration reuses the vacated slots, so they must never
    /// carry another consumer's results.
    pub(crate) fn compact(&mut self, removed: SampleRange, occupied: usize) {
        let positions = Arc::make_mut(&mut self.positions);
        if removed.end < occupied {
            let tail = removed.end..occupied;
            positions.copy_within(tail.clone(), removed.start);
            self.out_positions.copy_within(tail.clone(), removed.start);
            self.out_normals.copy_within(tail, removed.start);
        }

        let vacated = occupied - removed.len()..occupied;
        positions[vacated.clone()].fill(Vec3::ZERO);
        self.out_positions[vacated.clone()].fill(Vec3::ZERO);
        self.out_normals[vacated].fill(Vec3::Y);
    }
}
