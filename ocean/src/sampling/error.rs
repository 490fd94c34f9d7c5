use std::time::Duration;

use super::registry::ConsumerId;

/// Recoverable conditions reported by the sample registry and frame scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplingError {
    #[error("sample buffer full: requested {requested} points, {available} available")]
    CapacityExceeded { requested: usize, available: usize },

    #[error("consumer {0} is not registered")]
    UnknownConsumer(ConsumerId),

    #[error("consumer {0} requested an empty sample range")]
    EmptyRegistration(ConsumerId),

    #[error("consumer {consumer} is registered with {registered} points, re-registration asked for {requested}")]
    SizeMismatch {
        consumer: ConsumerId,
        registered: usize,
        requested: usize,
    },

    #[error("consumer {consumer} owns {expected} points, got a buffer of {actual}")]
    LengthMismatch {
        consumer: ConsumerId,
        expected: usize,
        actual: usize,
    },

    #[error("dispatch dropped: batch for frame {in_flight} is still in flight")]
    ConcurrentDispatchDropped { in_flight: u64 },

    #[error("batch for frame {frame} did not finish within {waited:?}")]
    BatchTimedOut { frame: u64, waited: Duration },
}
