//! Top-level sampling configuration.
//!
//! Everything a simulation needs to build its [`FrameScheduler`]: the wave set,
//! the wave field constants and the batch settings. Serializable so drivers
//! can load it from disk.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_POINTS_PER_TASK, DEFAULT_SAMPLE_CAPACITY, DEFAULT_SPIN_BEFORE_BLOCK};
use crate::sampling::FrameScheduler;
use crate::water::{WaveField, WaveFieldConfig, WavePreset, WaveSet};

/// What `dispatch` does while the previous batch is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchPolicy {
    /// Refuse the dispatch, count it and report `ConcurrentDispatchDropped`.
    #[default]
    Drop,
    /// Wait for the running batch, then dispatch.
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Total sample points shared by all consumers
    pub capacity: usize,
    /// Points evaluated by one task of a batch
    pub points_per_task: usize,
    pub dispatch_policy: DispatchPolicy,
    /// Completion polls before falling back to a blocking wait
    pub spin_before_block: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SAMPLE_CAPACITY,
            points_per_task: DEFAULT_POINTS_PER_TASK,
            dispatch_policy: DispatchPolicy::default(),
            spin_before_block: DEFAULT_SPIN_BEFORE_BLOCK,
        }
    }
}

impl SamplerConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_points_per_task(mut self, points_per_task: usize) -> Self {
        self.points_per_task = points_per_task.max(1);
        self
    }

    pub fn with_dispatch_policy(mut self, dispatch_policy: DispatchPolicy) -> Self {
        self.dispatch_policy = dispatch_policy;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OceanConfig {
    pub field: WaveFieldConfig,
    pub sampler: SamplerConfig,
    pub waves: WaveSet,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self::from_preset(WavePreset::default())
    }
}

impl OceanConfig {
    pub fn from_preset(preset: WavePreset) -> Self {
        Self {
            field: WaveFieldConfig::default(),
            sampler: SamplerConfig::default(),
            waves: preset.to_wave_set(),
        }
    }

    pub fn build_field(&self) -> WaveField {
        WaveField::new(self.waves.clone(), self.field)
    }

    pub fn build_scheduler(&self) -> FrameScheduler {
        FrameScheduler::new(self.build_field(), self.sampler)
    }
}
