//! Batched surface sampling for floating objects.
//!
//! Consumers reserve slots in a shared [`SampleBuffer`] through the
//! [`SampleRegistry`], and the [`FrameScheduler`] evaluates every occupied
//! slot once per frame on the async compute pool.

pub mod buffer;
pub mod error;
pub mod registry;
pub mod scheduler;
pub mod stats;

pub use buffer::SampleBuffer;
pub use error::SamplingError;
pub use registry::{ConsumerId, SampleRange, SampleRegistry};
pub use scheduler::FrameScheduler;
pub use stats::{FrameState, FrameStats};
