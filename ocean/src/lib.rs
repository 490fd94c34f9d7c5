pub mod config;
pub mod constants;
pub mod floating;
pub mod sampling;
pub mod water;

pub use config::{DispatchPolicy, OceanConfig, SamplerConfig};
pub use constants::*;
pub use floating::FloatingBody;
pub use sampling::{
    ConsumerId, FrameScheduler, FrameState, FrameStats, SampleRange, SampleRegistry, SamplingError,
};
pub use water::{AccumulationMode, SurfaceSample, Wave, WaveField, WaveFieldConfig, WavePreset, WaveSet};
