//! Interval bookkeeping for the shared sample buffer.
//!
//! Every consumer owns one contiguous, fixed-length range of the buffer.
//! Live ranges always tile `[0, occupied)` without gaps: releasing a consumer
//! shifts every later range down by the released length.

use bevy_log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use super::error::SamplingError;

/// Opaque, stable handle of a sample consumer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerId(pub u64);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Half-open `[start, end)` range of buffer slots.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SampleRange {
    pub start: usize,
    pub end: usize,
}

impl SampleRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start after end");
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn overlaps(&self, other: &SampleRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone)]
pub struct SampleRegistry {
    capacity: usize,
    ranges: HashMap<ConsumerId, SampleRange>,
    /// End of the last live range; equals the sum of live range lengths.
    occupied: usize,
}

impl SampleRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ranges: HashMap::new(),
            occupied: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupied(&self) -> usize {
        self.occupied
    }

    pub fn available(&self) -> usize {
        self.capacity - self.occupied
    }

    /// Number of registered consumers.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn get(&self, id: ConsumerId) -> Option<SampleRange> {
        self.ranges.get(&id).copied()
    }

    pub fn contains(&self, id: ConsumerId) -> bool {
        self.ranges.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConsumerId, SampleRange)> + '_ {
        self.ranges.iter().map(|(id, range)| (*id, *range))
    }

    /// Looks up a consumer's range, failing with `UnknownConsumer`.
    pub fn range_of(&self, id: ConsumerId) -> Result<SampleRange, SamplingError> {
        self.get(id).ok_or(SamplingError::UnknownConsumer(id))
    }

    /// Assigns `count` slots to `id`.
    ///
    /// Registering an existing consumer again with the same count returns its
    /// current range. A different count fails with `SizeMismatch`; ranges never
    /// resize. No state changes on failure.
    pub fn register(&mut self, id: ConsumerId, count: usize) -> Result<SampleRange, SamplingError> {
        if let Some(existing) = self.get(id) {
            if existing.len() == count {
                return Ok(existing);
            }
            return Err(SamplingError::SizeMismatch {
                consumer: id,
                registered: existing.len(),
                requested: count,
            });
        }

        if count == 0 {
            return Err(SamplingError::EmptyRegistration(id));
        }

        if count > self.available() {
            return Err(SamplingError::CapacityExceeded {
                requested: count,
                available: self.available(),
            });
        }

        let range = SampleRange::new(self.occupied, self.occupied + count);
        self.ranges.insert(id, range);
        self.occupied = range.end;

        debug!(
            "Registered sample consumer {} at {:?} ({}/{} slots used)",
            id,
            range.as_range(),
            self.occupied,
            self.capacity
        );

        Ok(range)
    }

    /// Releases `id` and compacts the ranges above it.
    ///
    /// Returns the released range as it was before compaction. The caller is
    /// responsible for moving buffer contents `[removed.end, old occupied)`
    /// down to `removed.start`.
    pub fn unregister(&mut self, id: ConsumerId) -> Result<SampleRange, SamplingError> {
        let removed = self
            .ranges
            .remove(&id)
            .ok_or(SamplingError::UnknownConsumer(id))?;
        let shift = removed.len();

        for range in self.ranges.values_mut() {
            if range.start >= removed.end {
                range.start -= shift;
                range.end -= shift;
            }
        }
        self.occupied -= shift;

        debug!(
            "Released sample consumer {} from {:?} ({}/{} slots used)",
            id,
            removed.as_range(),
            self.occupied,
            self.capacity
        );

        Ok(removed)
    }
}
